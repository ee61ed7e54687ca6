use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{RelayError, Result};

/// Environment variable that overrides the configuration artifact location.
pub const CONFIG_PATH_VAR: &str = "TRELLO_RESPONDER_CONFIG";

/// Configuration artifact looked up in the working directory by default.
pub const DEFAULT_CONFIG_PATH: &str = "config.env";

/// Template shipped with the repository, copied by the operator.
pub const CONFIG_TEMPLATE_PATH: &str = "config.dist.env";

const DEFAULT_TRELLO_API_URL: &str = "https://api.trello.com/1";
const DEFAULT_PANDORA_API_URL: &str = "http://www.pandorabots.com/pandora";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Credentials for both remote services. Loaded once, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Trello API key
    pub api_key: String,
    /// Trello API access token
    pub api_token: String,
    /// Trello member whose notifications are polled
    pub user_id: String,
    /// Pandorabots bot identifier
    pub bot_id: String,
}

// Key and token never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("bot_id", &self.bot_id)
            .finish()
    }
}

/// Process-wide configuration, built at startup and passed into the clients.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,

    /// Trello REST base URL (default: https://api.trello.com/1)
    pub trello_api_url: String,

    /// Pandorabots base URL; `talk-xml` is appended to it
    pub pandora_api_url: String,

    /// Per-request timeout applied to every HTTP call (default: 30)
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Location of the configuration artifact for this process.
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from the artifact at [`AppConfig::config_path`].
    pub fn from_env() -> Result<Self> {
        Self::from_file(&Self::config_path())
    }

    /// Load configuration from a dotenv-format file.
    ///
    /// Non-empty variables in the process environment win over the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load configuration from a dotenv-format file, layering `env` on top.
    ///
    /// An empty `env` value counts as unset, so it never hides the file.
    pub fn from_file_with_env(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if !path.is_file() {
            return Err(RelayError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| RelayError::Config(format!("cannot read {}: {e}", path.display())))?;

        let mut values = HashMap::new();
        for entry in entries {
            let (key, value) = entry
                .map_err(|e| RelayError::Config(format!("malformed {}: {e}", path.display())))?;
            values.insert(key, value);
        }

        tracing::debug!(path = %path.display(), keys = values.len(), "Loaded configuration file");

        Self::from_lookup(|key| {
            env(key)
                .filter(|v| !v.is_empty())
                .or_else(|| values.get(key).cloned())
        })
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::Config(format!("{key} is required")))
        };

        let http_timeout_secs: u64 = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| RelayError::Config("HTTP_TIMEOUT_SECS must be a valid u64".into()))?;
        if http_timeout_secs == 0 {
            return Err(RelayError::Config(
                "HTTP_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            credentials: Credentials {
                api_key: required("TRELLO_KEY")?,
                api_token: required("TRELLO_TOKEN")?,
                user_id: required("TRELLO_USER_ID")?,
                bot_id: required("PANDORA_BOT_ID")?,
            },
            trello_api_url: base_url(&lookup, "TRELLO_API_URL", DEFAULT_TRELLO_API_URL)?,
            pandora_api_url: base_url(&lookup, "PANDORA_API_URL", DEFAULT_PANDORA_API_URL)?,
            http_timeout_secs,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Read an optional base URL; it must be an absolute http(s) URL.
fn base_url(lookup: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<String> {
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    let url = Url::parse(value.trim())
        .map_err(|e| RelayError::Config(format!("{key} must be a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(RelayError::Config(format!(
            "{key} must be an http(s) URL, got {value:?}"
        )));
    }
    Ok(value.trim().to_string())
}
