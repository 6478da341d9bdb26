use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::SyncError;
use crate::api::{ApiClient, ApiError, HttpTransport, Method, ReqwestTransport};
use crate::models::{ChatMessage, ChatReply, ChatRequest, ModalContent, SuggestionReply, Transcript};

pub const SUGGESTION_TITLE: &str = "AI Smart Suggestion";
pub const ANALYSIS_TITLE: &str = "AI Budget Analysis";
pub const ERROR_TITLE: &str = "AI Error";

const SUGGESTION_FALLBACK: &str = "Failed to get suggestion. Is the AI provider API key set?";
const ANALYSIS_FALLBACK: &str = "Failed to get analysis.";
const ANALYSIS_PROMPT: &str =
    "Analyze my budget based on my recorded expenses and give me brief advice.";

/// Placeholder shown while a suggestion is being generated.
pub const SUGGESTION_PENDING: &str = "Thinking...";
/// Placeholder shown while an analysis is being generated.
pub const ANALYSIS_PENDING: &str = "Analyzing your spending...";

/// A user message already in the transcript, waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    id: u64,
    epoch: u64,
    text: String,
}

/// AI endpoints plus the in-memory chat transcript.
pub struct AssistantController<T: HttpTransport = ReqwestTransport> {
    api: ApiClient<T>,
    transcript: Mutex<Transcript>,
}

impl<T: HttpTransport> AssistantController<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            transcript: Mutex::new(Transcript::new()),
        }
    }

    fn held(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks for a one-off suggestion.
    ///
    /// Failures other than a rejected session come back as an error modal
    /// rather than an `Err`; they usually mean the backend has no AI key.
    pub async fn suggest(&self) -> Result<ModalContent, SyncError> {
        let result: Result<SuggestionReply, ApiError> = self
            .api
            .send_json::<(), _>("/ai/suggest", Method::Post, None, true)
            .await;
        match result {
            Ok(reply) => Ok(ModalContent::new(SUGGESTION_TITLE, reply.suggestion)),
            Err(e) if e.is_auth() => Err(e.into()),
            Err(e) => {
                warn!("Suggestion failed: {}", e);
                Ok(ModalContent::new(ERROR_TITLE, SUGGESTION_FALLBACK))
            }
        }
    }

    /// Budget advice through the chat endpoint. Does not touch the transcript.
    pub async fn analyze(&self) -> Result<ModalContent, SyncError> {
        match self.ask(ANALYSIS_PROMPT).await {
            Ok(response) => Ok(ModalContent::new(ANALYSIS_TITLE, response)),
            Err(e) if e.is_auth() => Err(e.into()),
            Err(e) => {
                warn!("Analysis failed: {}", e);
                Ok(ModalContent::new(ERROR_TITLE, ANALYSIS_FALLBACK))
            }
        }
    }

    /// Sends a chat message.
    ///
    /// The message is echoed into the transcript before the call. If the call
    /// fails it stays there marked as failed and the error is returned;
    /// [`take_failed`](Self::take_failed) re-arms it for another [`send`](Self::send).
    pub async fn chat(&self, message: &str) -> Result<Vec<ChatMessage>, SyncError> {
        let pending = self.echo(message)?;
        self.send(pending).await
    }

    /// Appends the user message locally without sending it.
    pub fn echo(&self, message: &str) -> Result<PendingChat, SyncError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(SyncError::EmptyInput("message"));
        }

        let mut transcript = self.held();
        Ok(PendingChat {
            id: transcript.push_user(text),
            epoch: transcript.epoch(),
            text: text.to_string(),
        })
    }

    /// Re-arms the most recent failed message without appending it again.
    pub fn take_failed(&self) -> Option<PendingChat> {
        let mut transcript = self.held();
        let (id, text) = transcript
            .last_failed()
            .map(|m| (m.id, m.text.clone()))?;
        transcript.set_failed(id, false);
        Some(PendingChat {
            id,
            epoch: transcript.epoch(),
            text,
        })
    }

    /// Posts an echoed message and records the outcome in the transcript.
    pub async fn send(&self, pending: PendingChat) -> Result<Vec<ChatMessage>, SyncError> {
        let result = self.ask(&pending.text).await;

        let mut transcript = self.held();
        if transcript.epoch() != pending.epoch {
            debug!("Dropping chat reply for a cleared transcript");
            return Ok(transcript.messages().to_vec());
        }
        match result {
            Ok(response) => {
                transcript.push_assistant(response);
                Ok(transcript.messages().to_vec())
            }
            Err(e) => {
                warn!("Chat message failed: {}", e);
                transcript.set_failed(pending.id, true);
                Err(e.into())
            }
        }
    }

    async fn ask(&self, message: &str) -> Result<String, ApiError> {
        let reply: ChatReply = self
            .api
            .send_json("/ai/chat", Method::Post, Some(&ChatRequest { message }), true)
            .await?;
        Ok(reply.response)
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.held().messages().to_vec()
    }

    pub fn clear_transcript(&self) {
        self.held().clear();
    }
}
