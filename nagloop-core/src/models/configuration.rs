//! Configuration data structures

use crate::models::{Color, DEFAULT_SENDER_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HipChat rejects sender names longer than this.
const MAX_SENDER_NAME_LEN: usize = 15;

/// Logging level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

/// Chat transport selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Hipchat,
    Telegram,
    Log,
}

/// Sink section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Override of the transport's API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// One watched GitHub repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestWatch {
    pub owner: String,
    pub repo: String,
    /// Room that receives review reminders
    pub room: String,
    #[serde(default = "default_pull_request_interval")]
    pub poll_interval_seconds: u64,
}

/// Fixed message posted on a fixed cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreeterConfig {
    pub text: String,
    pub rooms: Vec<String>,
    #[serde(default = "default_greeter_interval")]
    pub interval_seconds: u64,
}

fn default_pull_request_interval() -> u64 {
    1200
}

fn default_greeter_interval() -> u64 {
    10
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Logging verbosity level
    pub log_level: LogLevel,
    /// Name shown as the sender of every post
    pub sender_name: String,
    /// Message color
    pub color: Color,
    /// Pause before re-polling a producer that failed
    pub fault_backoff_seconds: u64,
    pub sink: SinkConfig,
    pub pull_requests: Vec<PullRequestWatch>,
    pub greeters: Vec<GreeterConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            color: Color::Purple,
            fault_backoff_seconds: 60,
            sink: SinkConfig::default(),
            pull_requests: Vec::new(),
            greeters: Vec::new(),
        }
    }
}

impl Configuration {
    /// Load configuration from file
    pub fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Configuration = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Return default configuration if file doesn't exist
            Ok(Configuration::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_dir = dirs::config_dir().ok_or("Could not determine config directory")?;
        Ok(config_dir.join("nagloop").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.sender_name.trim().is_empty() {
            errors.push("sender_name cannot be empty".to_string());
        } else if self.sender_name.chars().count() > MAX_SENDER_NAME_LEN {
            errors.push(format!(
                "sender_name cannot exceed {} characters",
                MAX_SENDER_NAME_LEN
            ));
        }

        if self.fault_backoff_seconds > 3600 {
            errors.push("fault_backoff_seconds cannot exceed 3600 (1 hour)".to_string());
        }

        if let Some(base_url) = &self.sink.base_url {
            if url::Url::parse(base_url).is_err() {
                errors.push(format!("sink.base_url is not a valid URL: {}", base_url));
            }
        }

        for (i, watch) in self.pull_requests.iter().enumerate() {
            if watch.owner.trim().is_empty() || watch.repo.trim().is_empty() {
                errors.push(format!("pull_requests[{}]: owner and repo are required", i));
            }
            if watch.room.trim().is_empty() {
                errors.push(format!("pull_requests[{}]: room is required", i));
            }
            if watch.poll_interval_seconds == 0 {
                errors.push(format!(
                    "pull_requests[{}]: poll_interval_seconds must be positive",
                    i
                ));
            }
        }

        for (i, greeter) in self.greeters.iter().enumerate() {
            if greeter.text.is_empty() {
                errors.push(format!("greeters[{}]: text is required", i));
            }
            if greeter.interval_seconds == 0 {
                errors.push(format!("greeters[{}]: interval_seconds must be positive", i));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
