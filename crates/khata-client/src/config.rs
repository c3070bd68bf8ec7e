//! # Client Configuration
//!
//! Where the backend lives and how long to wait for it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KHATA_API_URL=https://erp.example.com/api/                         │
//! │     KHATA_TIMEOUT_SECS=10                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/khata-erp/client.toml (Linux)                            │
//! │     ~/Library/Application Support/com.khata.erp/client.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api/, 30s timeout                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! base_url = "https://erp.example.com/api/"
//! timeout_secs = 30
//! user_agent = "khata/0.1.0"
//! page_size = 25
//! ```
//!
//! The CLI embeds the same table as `[api]` in `khata.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Largest page the list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 200;

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("khata/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_page_size() -> u32 {
    25
}

/// Settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the REST API; collection paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Rows requested per list page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with the TOML file, if it exists
    /// 3. Override with `KHATA_*` environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Applies `KHATA_API_URL`, `KHATA_TIMEOUT_SECS`, `KHATA_USER_AGENT`
    /// and `KHATA_PAGE_SIZE`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KHATA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.base_url = url;
        }

        if let Some(secs) = lookup("KHATA_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric KHATA_TIMEOUT_SECS"),
            }
        }

        if let Some(agent) = lookup("KHATA_USER_AGENT") {
            self.user_agent = agent;
        }

        if let Some(size) = lookup("KHATA_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(s) => self.page_size = s,
                Err(_) => warn!(value = %size, "Ignoring non-numeric KHATA_PAGE_SIZE"),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be at least 1".into(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ClientError::InvalidConfig(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "khata", "erp")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The base URL with a trailing slash, so relative joins append.
    pub fn base_url(&self) -> ClientResult<Url> {
        let mut text = self.base_url.trim().to_string();
        if !text.ends_with('/') {
            text.push('/');
        }
        Ok(Url::parse(&text)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("khata/"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://erp.example.com/api".into(),
            ..Default::default()
        };
        let url = config.base_url().unwrap();
        assert_eq!(url.as_str(), "https://erp.example.com/api/");
        assert_eq!(
            url.join("sales/invoices").unwrap().as_str(),
            "https://erp.example.com/api/sales/invoices"
        );
    }

    #[test]
    fn test_validation_failures() {
        let ws = ClientConfig {
            base_url: "ws://erp.example.com".into(),
            ..Default::default()
        };
        assert!(matches!(ws.validate(), Err(ClientError::InvalidUrl(_))));

        let garbage = ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(garbage.validate(), Err(ClientError::InvalidUrl(_))));

        let zero = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(ClientError::InvalidConfig(_))));

        let huge = ClientConfig {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("KHATA_API_URL", "https://erp.example.com/api/"),
            ("KHATA_TIMEOUT_SECS", "5"),
            ("KHATA_PAGE_SIZE", "lots"),
        ]);
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://erp.example.com/api/");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_load_partial_file() {
        let path = std::env::temp_dir().join(format!("khata-client-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "base_url = \"https://erp.example.com/api\"\ntimeout_secs = 12\n").unwrap();

        let config = ClientConfig::load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("khata-client-does-not-exist.toml");
        let config = ClientConfig::load_or_default(Some(path));
        assert_eq!(config.page_size, 25);
    }
}
