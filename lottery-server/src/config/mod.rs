//! Configuration module for lottery-server.
//!
//! Handles loading configuration from TOML files and CLI arguments.

pub mod file;

use crate::config::file::FileConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(file_config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.notifier.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "notifier.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if let Some(url) = &config.notifier.webhook_url
        && !matches!(url.scheme(), "http" | "https")
    {
        return Err(ConfigError::ValidationError(format!(
            "notifier.webhook_url must be http or https, got {}",
            url.scheme()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_scratch(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "lottery-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_listen_override_wins() {
        let path = write_scratch("[server]\nlisten = \"127.0.0.1:3000\"\n");
        let override_addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        let config = ConfigLoader::new(&path, Some(override_addr)).load().unwrap();
        assert_eq!(config.server.listen, override_addr);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let path = write_scratch("[notifier]\ntimeout_secs = 0\n");
        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::ValidationError(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_non_http_webhook_is_rejected() {
        let path = write_scratch("[notifier]\nwebhook_url = \"ftp://example.com/hook\"\n");
        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::ValidationError(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("lottery-config-does-not-exist.toml");
        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::IoError(_))
        ));
    }
}
