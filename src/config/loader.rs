use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub token_path: PathBuf,
    pub request_timeout_secs: u64,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = Self::default_data_dir();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token_path: data_dir.join("token"),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_dir: data_dir.join("logs"),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_yaml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Config::default()
        };

        Ok(config.with_env_overrides())
    }

    pub fn default_config_path() -> PathBuf {
        if let Some(config_path) = std::env::var_os("PADASH_CONFIG") {
            PathBuf::from(config_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("padash")
                .join("config.yaml")
        }
    }

    fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("padash")
    }

    fn with_env_overrides(self) -> Self {
        match std::env::var("PADASH_API_BASE") {
            Ok(base) if !base.trim().is_empty() => self.with_api_base(base),
            _ => {
                let base = self.api_base.clone();
                self.with_api_base(base)
            }
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_path(mut self, token_path: PathBuf) -> Self {
        self.token_path = token_path;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_default_points_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://127.0.0.1:3000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.token_path.ends_with("padash/token"));
        assert!(config.log_dir.ends_with("padash/logs"));
    }

    #[test]
    fn config_with_api_base_trims_trailing_slashes() {
        let config = Config::default().with_api_base("https://example.com/api//");
        assert_eq!(config.api_base, "https://example.com/api");
    }

    #[test]
    fn config_with_token_path_overrides_default() {
        let config = Config::default().with_token_path(PathBuf::from("/tmp/tok"));
        assert_eq!(config.token_path, PathBuf::from("/tmp/tok"));
    }

    #[test]
    fn config_request_timeout_is_never_zero() {
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn config_loads_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml = r#"
token_path: "/tmp/padash-test/token"
request_timeout_secs: 5
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.token_path, PathBuf::from("/tmp/padash-test/token"));
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.log_dir.ends_with("padash/logs"));
    }

    #[test]
    fn config_load_rejects_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "request_timeout_secs: [not a number").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn config_load_returns_default_when_file_missing() {
        let config = Config::load(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn config_serializes_to_yaml() {
        let config = Config::default().with_api_base("http://localhost:9000/api");
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("api_base: http://localhost:9000/api"));
        assert!(yaml.contains("request_timeout_secs: 30"));
    }
}
