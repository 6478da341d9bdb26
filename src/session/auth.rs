use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, HttpTransport, Method, ReqwestTransport};
use crate::models::{AuthMode, AuthResponse, AuthState, Credentials, User};
use crate::sync::SyncError;

use super::SessionStore;

const AUTH_FAILED: &str = "Authentication failed";

/// Sign-in lifecycle: restore, login, register, logout.
///
/// Restore, login and register share one single-flight slot on the session;
/// a second call while one is running returns [`SyncError::Busy`] without
/// touching the network.
pub struct AuthController<T: HttpTransport = ReqwestTransport> {
    api: ApiClient<T>,
}

impl<T: HttpTransport> AuthController<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Verifies the persisted token, if any.
    ///
    /// Any failure clears the token. No token means no network call.
    pub async fn restore(&self) -> Result<AuthState, SyncError> {
        let _guard = self.session().try_begin_flight().ok_or(SyncError::Busy)?;

        let token = match self.session().load_persisted().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read stored token: {:#}", e);
                self.clear_quietly().await;
                return Ok(AuthState::Unauthenticated);
            }
        };
        if token.is_none() {
            return Ok(AuthState::Unauthenticated);
        }

        match self.api.get_json::<User>("/auth/me").await {
            Ok(user) if self.session().confirm(user.clone()) => Ok(AuthState::Authenticated),
            Ok(_) => Ok(AuthState::Unauthenticated),
            Err(e) => {
                info!("Stored session is no longer valid: {}", e);
                self.clear_quietly().await;
                Ok(AuthState::Unauthenticated)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SyncError> {
        let credentials = validate_credentials(email, password)?;
        let _guard = self.session().try_begin_flight().ok_or(SyncError::Busy)?;

        let response: AuthResponse = self
            .api
            .send_json("/auth/login", Method::Post, Some(&credentials), false)
            .await
            .map_err(rejection)?;

        let user = response.user.clone();
        self.session()
            .establish(response.token, response.user)
            .await
            .map_err(|e| SyncError::Storage(format!("{:#}", e)))?;
        Ok(user)
    }

    /// Creates an account. Does not sign in; on success the caller should
    /// switch to the returned mode.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthMode, SyncError> {
        let credentials = validate_credentials(email, password)?;
        let _guard = self.session().try_begin_flight().ok_or(SyncError::Busy)?;

        let _: Value = self
            .api
            .send_json("/auth/register", Method::Post, Some(&credentials), false)
            .await
            .map_err(rejection)?;

        info!("Registered {}", credentials.email);
        Ok(AuthMode::Login)
    }

    /// Client-side sign-out. The token stays valid on the server until it expires.
    pub async fn logout(&self) -> Result<(), SyncError> {
        self.session()
            .invalidate()
            .await
            .map_err(|e| SyncError::Storage(format!("{:#}", e)))
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.session().invalidate().await {
            warn!("Failed to clear stored token: {:#}", e);
        }
    }
}

fn validate_credentials<'a>(email: &'a str, password: &'a str) -> Result<Credentials<'a>, SyncError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SyncError::EmptyInput("email"));
    }
    if password.trim().is_empty() {
        return Err(SyncError::EmptyInput("password"));
    }
    Ok(Credentials { email, password })
}

/// Sign-in forms show the server's reason; transport failures stay as-is.
fn rejection(error: ApiError) -> SyncError {
    match error {
        ApiError::Network(_) => SyncError::Api(error),
        ApiError::Auth { message, .. } => {
            SyncError::Rejected(message.unwrap_or_else(|| AUTH_FAILED.to_string()))
        }
        ApiError::Api { message, .. } => SyncError::Rejected(message),
    }
}
