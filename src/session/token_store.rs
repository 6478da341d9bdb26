use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Durable single-slot storage for the bearer token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read token file: {:?}", self.path))?;
        let token = content.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    /// Replaces the slot. The token is written to a sibling file created
    /// owner-only, then renamed over the slot, so it is never readable by
    /// others and a crash never leaves a half-written token.
    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging = self.path.with_extension("tmp");
        if staging.exists() {
            fs::remove_file(&staging).await?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&staging)
            .await
            .with_context(|| format!("Failed to create token file: {:?}", staging))?;
        file.write_all(token.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to write token file: {:?}", self.path))?;

        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .with_context(|| format!("Failed to remove token file: {:?}", self.path))?;
        }
        Ok(())
    }

    /// Removes the slot only while it still holds `token`.
    pub async fn clear_if(&self, token: &str) -> Result<bool> {
        if self.load().await?.as_deref() != Some(token) {
            return Ok(false);
        }
        self.clear().await?;
        Ok(true)
    }
}
