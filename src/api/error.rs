use thiserror::Error;

const MAX_PLAIN_MESSAGE_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure, timeout, or a body that is not the JSON we expected.
    #[error("Couldn't reach the server: {0}")]
    Network(String),

    /// 401/403. For bearer calls the session has already been invalidated.
    #[error("{}", .message.as_deref().unwrap_or("Your session has expired, please sign in again"))]
    Auth { status: u16, message: Option<String> },

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ApiError {
    /// Classifies a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => ApiError::Auth { status, message },
            _ => ApiError::Api {
                status,
                message: message
                    .unwrap_or_else(|| format!("Request failed with status {status}")),
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(_) => None,
            ApiError::Auth { status, .. } | ApiError::Api { status, .. } => Some(*status),
        }
    }

    /// Text suitable for showing to the user; hides transport details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Couldn't reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies contribute their `message` field; short plain-text bodies are
/// used verbatim since the backend answers most failures that way.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
    }

    if trimmed.starts_with('<') || trimmed.chars().count() > MAX_PLAIN_MESSAGE_LEN {
        return None;
    }
    Some(trimmed.to_string())
}
