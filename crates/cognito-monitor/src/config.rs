/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed monitor configuration
[POS]:    Configuration layer - server, identity and polling setup
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use cognito_adapter::{ClientConfig, CognitoClient, Identity};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the task monitor
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Remote service connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Fallback identity registered and logged in when no valid credential exists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            role: default_role(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Fixed delay between status queries
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Entries shown when printing history; 0 shows everything
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_username() -> String {
    Identity::default().username
}

fn default_password() -> String {
    Identity::default().password
}

fn default_role() -> String {
    Identity::default().role
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_display_limit() -> usize {
    10
}

impl MonitorConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(anyhow!("poll.interval_ms must be greater than zero"));
        }
        let base_url = url::Url::parse(&self.server.base_url)
            .with_context(|| format!("invalid server.base_url: {}", self.server.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!(
                "server.base_url must be a hierarchical URL: {}",
                self.server.base_url
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.server.timeout_secs),
            connect_timeout: Duration::from_secs(self.server.connect_timeout_secs),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.identity.username.clone(),
            self.identity.password.clone(),
            self.identity.role.clone(),
        )
    }

    pub fn build_client(&self) -> Result<CognitoClient> {
        CognitoClient::with_config_and_base_url(self.client_config(), &self.server.base_url)
            .context("build cognito client")
    }
}
