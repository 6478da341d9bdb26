use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    /// Set on a user message whose send did not get a reply.
    pub failed: bool,
}

impl ChatMessage {
    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}

/// In-memory, append-only chat history for the active session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
    epoch: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Bumped by `clear`, so replies to requests issued before a clear can be dropped.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::User, text.into())
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::Assistant, text.into())
    }

    fn push(&mut self, role: ChatRole, text: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            failed: false,
        });
        id
    }

    pub fn set_failed(&mut self, id: u64, failed: bool) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.failed = failed;
                true
            }
            None => false,
        }
    }

    /// The most recent user message marked as failed, if any.
    pub fn last_failed(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user() && m.failed)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.epoch += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionReply {
    pub suggestion: String,
}

/// Title and body the renderer shows in the assistant pop-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub title: String,
    pub body: String,
}

impl ModalContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
