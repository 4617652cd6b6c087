use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore, DEFAULT_SERVER_URL};

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    server_url: Option<String>,
    page_size: Option<usize>,
}

pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        let config_path = config_dir.join("todo-board").join("config.json");

        Ok(Self { config_path })
    }

    #[cfg(test)]
    fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            // No config file yet: run with defaults.
            Err(_) => return Ok(AppConfig::default()),
        };

        let config_file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        Ok(AppConfig {
            server_url: config_file
                .server_url
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            page_size: config_file.page_size.unwrap_or(5),
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            server_url: Some(config.server_url.clone()),
            page_size: Some(config.page_size),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let store = FileConfigStore::with_path(
            std::env::temp_dir().join("todo-board-test-nonexistent/config.json"),
        );
        let config = tokio_test::block_on(store.load_config()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("todo-board-test-{}", std::process::id()));
        let store = FileConfigStore::with_path(dir.join("config.json"));

        let config = AppConfig {
            server_url: "http://example.test:9000".to_string(),
            page_size: 10,
        };
        store.save_config(&config).await.unwrap();
        assert_eq!(store.load_config().await.unwrap(), config);

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
