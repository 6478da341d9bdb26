use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::TokenStore;
use crate::models::{AuthState, Session, User};

/// Shared handle to the current session.
///
/// Clones point at the same state. The API client, the auth flows and the
/// front-ends all hold one; nothing keeps session data in globals.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    tokens: TokenStore,
    in_flight: Arc<AtomicBool>,
}

/// Held while an auth operation runs; releases the single-flight slot on drop.
pub struct FlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl SessionStore {
    /// Opens the store. A persisted token puts the session in `Verifying`.
    pub async fn open(tokens: TokenStore) -> Result<Self> {
        let token = tokens.load().await?;
        let session = match token {
            Some(token) => Session {
                token: Some(token),
                user: None,
                state: AuthState::Verifying,
            },
            None => Session::default(),
        };

        Ok(Self {
            state: Arc::new(RwLock::new(session)),
            tokens,
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn auth_state(&self) -> AuthState {
        self.read().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Re-reads the durable slot into memory.
    ///
    /// A token moves the session to `Verifying`; no token leaves it
    /// `Unauthenticated` with nothing held.
    pub async fn load_persisted(&self) -> Result<Option<String>> {
        let token = self.tokens.load().await?;
        let mut session = self.write();
        match &token {
            Some(token) => {
                *session = Session {
                    token: Some(token.clone()),
                    user: None,
                    state: AuthState::Verifying,
                };
            }
            None => *session = Session::default(),
        }
        Ok(token)
    }

    /// Persists the token, then marks the session authenticated.
    ///
    /// If persisting fails the in-memory session is left untouched.
    pub async fn establish(&self, token: String, user: User) -> Result<()> {
        self.tokens.save(&token).await?;
        info!("Signed in as {}", user.email);
        *self.write() = Session {
            token: Some(token),
            user: Some(user),
            state: AuthState::Authenticated,
        };
        Ok(())
    }

    /// Completes verification of an already-held token.
    ///
    /// Returns false if no token is held, since a user without a token is not
    /// a valid session.
    pub fn confirm(&self, user: User) -> bool {
        let mut session = self.write();
        if session.token.is_none() {
            return false;
        }
        info!("Session verified for {}", user.email);
        session.user = Some(user);
        session.state = AuthState::Authenticated;
        true
    }

    /// Drops the session from memory and from durable storage.
    ///
    /// Memory is cleared even when removing the stored token fails.
    pub async fn invalidate(&self) -> Result<()> {
        let was = {
            let mut session = self.write();
            let was = session.state;
            *session = Session::default();
            was
        };
        if was != AuthState::Unauthenticated {
            info!("Session cleared");
        }
        self.tokens.clear().await
    }

    /// Like [`invalidate`](Self::invalidate), but only while `token` is still
    /// the held token. A rejection of a token that has since been replaced
    /// leaves the newer session alone.
    pub async fn invalidate_if(&self, token: &str) -> Result<bool> {
        {
            let mut session = self.write();
            if session.token.as_deref() != Some(token) {
                debug!("Ignoring rejection of a token no longer held");
                return Ok(false);
            }
            *session = Session::default();
        }
        info!("Session cleared");
        self.tokens.clear_if(token).await?;
        Ok(true)
    }

    /// Claims the single-flight slot for an auth operation.
    pub fn try_begin_flight(&self) -> Option<FlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(token: Option<&str>) -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let tokens = TokenStore::new(temp_dir.path().join("token"));
        if let Some(token) = token {
            tokens.save(token).await.unwrap();
        }
        (SessionStore::open(tokens).await.unwrap(), temp_dir)
    }

    #[tokio::test]
    async fn open_without_token_is_unauthenticated() {
        let (store, _temp) = open_store(None).await;
        assert_eq!(store.auth_state(), AuthState::Unauthenticated);
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn open_with_token_is_verifying() {
        let (store, _temp) = open_store(Some("t1")).await;
        assert_eq!(store.auth_state(), AuthState::Verifying);
        assert_eq!(store.token().as_deref(), Some("t1"));
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn establish_persists_and_authenticates() {
        let (store, _temp) = open_store(None).await;

        store
            .establish("t1".to_string(), User::new("u1", "a@b.com"))
            .await
            .unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().email, "a@b.com");
        assert_eq!(
            store.token_store().load().await.unwrap(),
            Some("t1".to_string())
        );
    }

    #[tokio::test]
    async fn confirm_requires_held_token() {
        let (store, _temp) = open_store(None).await;
        assert!(!store.confirm(User::new("u1", "a@b.com")));
        assert!(store.user().is_none());
        assert_eq!(store.auth_state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn confirm_completes_verification() {
        let (store, _temp) = open_store(Some("t1")).await;
        assert!(store.confirm(User::new("u1", "a@b.com")));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn invalidate_clears_memory_and_disk() {
        let (store, _temp) = open_store(None).await;
        store
            .establish("t1".to_string(), User::new("u1", "a@b.com"))
            .await
            .unwrap();

        store.invalidate().await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot, Session::default());
        assert!(!store.token_store().exists());
    }

    #[tokio::test]
    async fn invalidate_if_clears_matching_token() {
        let (store, _temp) = open_store(Some("t1")).await;

        assert!(store.invalidate_if("t1").await.unwrap());

        assert_eq!(store.snapshot(), Session::default());
        assert!(!store.token_store().exists());
    }

    #[tokio::test]
    async fn invalidate_if_ignores_replaced_token() {
        let (store, _temp) = open_store(Some("old")).await;
        store
            .establish("new".to_string(), User::new("u1", "a@b.com"))
            .await
            .unwrap();

        assert!(!store.invalidate_if("old").await.unwrap());

        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("new"));
        assert_eq!(
            store.token_store().load().await.unwrap(),
            Some("new".to_string())
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let (store, _temp) = open_store(Some("t1")).await;
        let other = store.clone();

        other.invalidate().await.unwrap();

        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn load_persisted_reflects_durable_slot() {
        let (store, _temp) = open_store(Some("t1")).await;
        store.token_store().clear().await.unwrap();

        assert_eq!(store.load_persisted().await.unwrap(), None);
        assert_eq!(store.auth_state(), AuthState::Unauthenticated);
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn flight_guard_is_single_flight() {
        let (store, _temp) = open_store(None).await;

        let guard = store.try_begin_flight();
        assert!(guard.is_some());
        assert!(store.try_begin_flight().is_none());
        assert!(store.is_in_flight());

        drop(guard);
        assert!(!store.is_in_flight());
        assert!(store.try_begin_flight().is_some());
    }
}
