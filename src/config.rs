//! Configuration Management
//!
//! Handles persistent configuration storage for vcfa-ns.

use crate::supervisor_namespace::wait::{self, WaitPolicy};
use crate::supervisor_namespace::Timeouts;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "VCFA_URL";
pub const ENV_TOKEN: &str = "VCFA_TOKEN";
pub const ENV_PROJECT: &str = "VCFA_PROJECT";

/// Wait timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Create wait; falls back to `delete_secs` when unset
    #[serde(default)]
    pub create_secs: Option<u64>,
    #[serde(default = "default_delete_secs")]
    pub delete_secs: u64,
}

fn default_delete_secs() -> u64 {
    wait::DEFAULT_TIMEOUT.as_secs()
}

fn default_poll_interval_secs() -> u64 {
    wait::POLL_INTERVAL.as_secs()
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            create_secs: None,
            delete_secs: default_delete_secs(),
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// VCFA endpoint, e.g. `https://vcfa.example.com`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for API calls
    #[serde(default)]
    pub token: Option<String>,
    /// Default Project for new Supervisor Namespaces
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            project_name: None,
            poll_interval_secs: default_poll_interval_secs(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vcfa-ns").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective endpoint (CLI > env > config)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| env_var(ENV_ENDPOINT))
            .or_else(|| self.endpoint.clone())
    }

    /// Get effective token (CLI > env > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| env_var(ENV_TOKEN))
            .or_else(|| self.token.clone())
    }

    /// Get effective default project (env > config)
    pub fn effective_project(&self) -> Option<String> {
        env_var(ENV_PROJECT).or_else(|| self.project_name.clone())
    }

    /// Polling cadence for waits
    pub fn wait_policy(&self) -> WaitPolicy {
        let interval = Duration::from_secs(self.poll_interval_secs);
        WaitPolicy {
            delay: interval,
            poll_interval: interval,
            ..WaitPolicy::default()
        }
    }

    /// Wait bounds; `cli` overrides both create and delete
    pub fn timeouts(&self, cli: Option<Duration>) -> Timeouts {
        if let Some(timeout) = cli {
            return Timeouts {
                create: Some(timeout),
                delete: timeout,
            };
        }
        Timeouts {
            create: self.timeouts.create_secs.map(Duration::from_secs),
            delete: Duration::from_secs(self.timeouts.delete_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.timeouts(None), Timeouts::default());
    }

    #[test]
    fn test_wait_policy_uses_interval() {
        let config = Config {
            poll_interval_secs: 2,
            ..Config::default()
        };
        let policy = config.wait_policy();
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(policy.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_timeouts() {
        let config: Config =
            serde_json::from_str(r#"{"timeouts": {"create_secs": 60, "delete_secs": 120}}"#).unwrap();
        let timeouts = config.timeouts(None);
        assert_eq!(timeouts.create(), Duration::from_secs(60));
        assert_eq!(timeouts.delete, Duration::from_secs(120));

        let timeouts = config.timeouts(Some(Duration::from_secs(30)));
        assert_eq!(timeouts.create(), Duration::from_secs(30));
        assert_eq!(timeouts.delete, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_wins_over_config() {
        let config = Config {
            endpoint: Some("https://from-config".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.effective_endpoint(Some("https://from-cli")).as_deref(),
            Some("https://from-cli")
        );
    }
}
