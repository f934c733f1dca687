//! Client configuration from studyflow.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up inside the state directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "studyflow.toml";

/// Environment variable overriding `backend_url`
pub const BACKEND_URL_ENV: &str = "STUDYFLOW_BACKEND_URL";

/// Client configuration from studyflow.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the study backend
    pub backend_url: String,

    /// Timeout for ordinary requests, in seconds
    pub request_timeout_secs: u64,

    /// Timeout for AI generation requests (concept text, quizzes, plans)
    pub generation_timeout_secs: u64,

    /// Delay between syllabus analysis checks, in seconds
    pub poll_interval_secs: u64,

    /// Number of analysis checks before giving up
    pub poll_max_attempts: u32,

    /// Directory holding the local key/value cache
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            generation_timeout_secs: 300,
            poll_interval_secs: 5,
            poll_max_attempts: 20,
            state_dir: PathBuf::from(".studyflow"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a studyflow.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the studyflow.toml configuration file
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;

        let config: ClientConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        Ok(config)
    }

    /// Save configuration to a studyflow.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the studyflow.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        fs::write(&path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// Resolve the effective configuration
    ///
    /// An explicit path must exist. Without one, `<state_dir>/studyflow.toml`
    /// is read when present and defaults are used otherwise. The
    /// `STUDYFLOW_BACKEND_URL` variable is applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = Self::default().state_dir.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_backend_override(&url);
        }

        Ok(config)
    }

    /// Replace the backend URL unless the override is blank
    pub fn apply_backend_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            log::debug!("Backend URL overridden from environment: {}", url);
            self.backend_url = url.trim_end_matches('/').to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Path of the key/value store file
    pub fn store_path(&self) -> PathBuf {
        self.state_dir.join("store.json")
    }
}

/// Errors that can occur when loading or saving client configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
