//! Configuration for the azbrowse terminal browser.
//!
//! Layered loading (built-in defaults, then `config.toml`, then
//! `AZBROWSE_*` environment variables), access-token resolution, and
//! translation into the engine's [`EngineConfig`] and the client's
//! [`TransportConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use azbrowse_api::{DEFAULT_ENDPOINT, TransportConfig};
use azbrowse_core::EngineConfig;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Keyring service holding the access token.
pub const KEYRING_SERVICE: &str = "azbrowse";
/// Keyring entry name under [`KEYRING_SERVICE`].
pub const KEYRING_USER: &str = "access-token";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "no access token found: pass --token, set {env}, store one in the system keyring \
         ({KEYRING_SERVICE}/{KEYRING_USER}), or set access_token in the config file"
    )]
    NoCredentials { env: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Resource Manager endpoint root.
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds.
    pub timeout: u64,

    /// Deadline in seconds for all expanders of one expansion.
    pub expand_timeout: u64,

    /// Undelivered navigation events each bus subscriber may hold.
    pub bus_capacity: usize,

    /// `api-version` used to fetch individual resources.
    pub resource_api_version: String,

    /// Mask subscription ids and other GUIDs on screen.
    pub demo: bool,

    /// Access token (plaintext, prefer the keyring or an env var).
    pub access_token: Option<String>,

    /// Environment variable holding the access token.
    pub access_token_env: String,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout: 30,
            expand_timeout: engine.expand_timeout.as_secs(),
            bus_capacity: engine.bus_capacity,
            resource_api_version: engine.resource_api_version,
            demo: false,
            access_token: None,
            access_token_env: "AZURE_ACCESS_TOKEN".into(),
        }
    }
}

impl Config {
    /// Check values that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if self.expand_timeout == 0 {
            return Err(ConfigError::Validation {
                field: "expand_timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "bus_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.endpoint).map_err(|e| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("'{}' is not a valid URL: {e}", self.endpoint),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            expand_timeout: Duration::from_secs(self.expand_timeout),
            bus_capacity: self.bus_capacity,
            resource_api_version: self.resource_api_version.clone(),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(Duration::from_secs(self.timeout))
    }

    // ── Token resolution ─────────────────────────────────────────────

    /// Resolve the access token: CLI flag, then `access_token_env`, then
    /// the system keyring, then the plaintext config value.
    pub fn resolve_token(&self, flag: Option<&str>) -> Result<SecretString, ConfigError> {
        self.resolve_token_with(flag, |name| std::env::var(name).ok(), keyring_token)
    }

    /// [`Config::resolve_token`] with injectable env and keyring lookups.
    pub fn resolve_token_with(
        &self,
        flag: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        keyring: impl Fn() -> Option<String>,
    ) -> Result<SecretString, ConfigError> {
        if let Some(token) = flag.filter(|t| !t.is_empty()) {
            debug!("access token from command line");
            return Ok(SecretString::from(token.to_owned()));
        }
        if let Some(token) = env(&self.access_token_env).filter(|t| !t.is_empty()) {
            debug!(var = %self.access_token_env, "access token from environment");
            return Ok(SecretString::from(token));
        }
        if let Some(token) = keyring() {
            debug!("access token from keyring");
            return Ok(SecretString::from(token));
        }
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            debug!("access token from config file");
            return Ok(SecretString::from(token.clone()));
        }
        Err(ConfigError::NoCredentials {
            env: self.access_token_env.clone(),
        })
    }
}

fn keyring_token() -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .and_then(|entry| entry.get_password())
        .ok()
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file location, e.g. `~/.config/azbrowse/config.toml`.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "azbrowse", "azbrowse").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("azbrowse");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the platform config file and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing files are fine) and the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AZBROWSE_"))
        .extract()?;
    config.validate()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}
