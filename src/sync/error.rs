use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// The server refused credentials on a sign-in form.
    #[error("{0}")]
    Rejected(String),

    #[error("Another sign-in request is already in progress")]
    Busy,

    #[error("Failed to update stored session: {0}")]
    Storage(String),
}

impl SyncError {
    /// True when the server rejected the session on an authenticated call.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Api(e) if e.is_auth())
    }

    pub fn user_message(&self) -> String {
        match self {
            SyncError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_detected_through_api_variant() {
        let err = SyncError::from(ApiError::from_status(401, ""));
        assert!(err.is_auth());

        let err = SyncError::from(ApiError::from_status(500, ""));
        assert!(!err.is_auth());
        assert!(!SyncError::Busy.is_auth());
    }

    #[test]
    fn user_message_for_validation_errors() {
        assert_eq!(
            SyncError::EmptyInput("title").user_message(),
            "title must not be empty"
        );
        assert_eq!(
            SyncError::InvalidAmount("abc".to_string()).user_message(),
            "Invalid amount: \"abc\""
        );
    }

    #[test]
    fn user_message_for_network_errors_is_generic() {
        let err = SyncError::from(ApiError::Network("dns error".to_string()));
        assert_eq!(err.user_message(), "Couldn't reach the server");
    }
}
