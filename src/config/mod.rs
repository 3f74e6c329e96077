use crate::config::http::HttpConfig;
use crate::config::upload::UploadConfig;
use crate::error::GitInnerError;
use serde::{Deserialize, Serialize};
use std::env::var;
use std::path::Path;
use tracing::info;

pub mod http;
pub mod upload;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Loads the configuration from `CONFIG_FILE`, or `config.toml` when the
    /// variable is unset. A missing file gives the defaults.
    pub fn load() -> Result<Self, GitInnerError> {
        let config_file_path = var("CONFIG_FILE").unwrap_or("config.toml".to_string());
        Self::load_from(&config_file_path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, GitInnerError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, GitInnerError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| GitInnerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, GitInnerError> {
        toml::to_string_pretty(self).map_err(|e| GitInnerError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), GitInnerError> {
        for item in &self.upload.refs {
            if !item.name.starts_with("refs/") || item.name.contains(char::is_whitespace) {
                return Err(GitInnerError::Config(format!(
                    "invalid ref name {:?}",
                    item.name
                )));
            }
        }
        if self.upload.progress.width == 0 {
            return Err(GitInnerError::Config("progress width must be positive".into()));
        }
        Ok(())
    }
}
