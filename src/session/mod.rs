mod auth;
mod store;
mod token_store;

pub use auth::AuthController;
pub use store::SessionStore;
pub use token_store::TokenStore;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::User;
    use tempfile::TempDir;

    pub async fn empty_session() -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let tokens = TokenStore::new(temp_dir.path().join("token"));
        (SessionStore::open(tokens).await.unwrap(), temp_dir)
    }

    /// Token on disk, not yet verified.
    pub async fn verifying_session(token: &str) -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let tokens = TokenStore::new(temp_dir.path().join("token"));
        tokens.save(token).await.unwrap();
        (SessionStore::open(tokens).await.unwrap(), temp_dir)
    }

    pub async fn authenticated_session(token: &str) -> (SessionStore, TempDir) {
        let (session, temp_dir) = empty_session().await;
        session
            .establish(token.to_string(), User::new("u1", "a@b.com"))
            .await
            .unwrap();
        (session, temp_dir)
    }
}
