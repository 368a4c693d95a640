//! Configuration loading and validation.
//!
//! The relay reads a TOML file (default `./config/relay.toml`). Every
//! section is optional and falls back to the defaults below. Secrets never
//! live in the file: the model API key is read from the environment
//! variable named by `model.api_key_env`.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//! allowed_origin = "http://localhost:3000"
//!
//! [db]
//! url = "sqlite:data/relay.sqlite"
//!
//! [model]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-2.5-flash"
//! api_key_env = "GEMINI_API_KEY"
//!
//! [relay]
//! log_failure = "fail"
//!
//! [client]
//! relay_url = "http://127.0.0.1:5000/api/query"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Overrides `db.url`.
pub const ENV_DATABASE_URL: &str = "RELAY_DATABASE_URL";
/// Overrides `server.bind`.
pub const ENV_BIND: &str = "RELAY_BIND";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// The single browser origin allowed by CORS.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// SQLite connection string, e.g. `sqlite:data/relay.sqlite`.
    #[serde(default = "default_db_url")]
    pub url: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

fn default_db_url() -> String {
    "sqlite:data/relay.sqlite".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Base URL of the generative language API, without trailing slash.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl ModelConfig {
    /// Full `generateContent` URL for the configured model (without key).
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!("{} environment variable not set", self.api_key_env),
        }
    }
}

/// What to do when the interaction log write fails after the model answered.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFailurePolicy {
    /// Fail the request with a 500.
    #[default]
    Fail,
    /// Log a warning and return the answer anyway.
    Ignore,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub log_failure: LogFailurePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Query endpoint used by `relay ask`.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
        }
    }
}

fn default_relay_url() -> String {
    "http://127.0.0.1:5000/api/query".to_string()
}

impl Config {
    /// All defaults, with environment overrides applied.
    pub fn minimal() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
            if !url.trim().is_empty() {
                self.db.url = url;
            }
        }
        if let Ok(bind) = std::env::var(ENV_BIND) {
            if !bind.trim().is_empty() {
                self.server.bind = bind;
            }
        }
    }
}

/// Loads the config file at `path`, or the defaults if it does not exist.
///
/// Environment overrides are applied after parsing, then the result is
/// validated.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    config.apply_env();
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }
    if config.server.allowed_origin.trim().is_empty() {
        bail!("server.allowed_origin must not be empty");
    }
    if !config.db.url.starts_with("sqlite:") {
        bail!(
            "db.url must be a sqlite connection string, got '{}'",
            config.db.url
        );
    }
    if !config.model.endpoint.starts_with("http://")
        && !config.model.endpoint.starts_with("https://")
    {
        bail!("model.endpoint must be an http(s) URL");
    }
    if config.model.model.trim().is_empty() {
        bail!("model.model must not be empty");
    }
    if config.model.api_key_env.trim().is_empty() {
        bail!("model.api_key_env must not be empty");
    }
    Ok(())
}
