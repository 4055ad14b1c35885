//! Server settings
//!
//! Layered: built-in defaults, then an optional `qa-server.toml` in the
//! working directory, then `QA_*` environment variables.

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub database_url: String,
    pub storage: StorageMode,
    pub max_connections: u32,
    pub request_timeout_secs: u64,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// `env` replaces the process environment when given
    fn build(env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("database_url", "sqlite://data/qa.db")?
            .set_default("storage", "sqlite")?
            .set_default("max_connections", 5)?
            .set_default("request_timeout_secs", 30)?
            .set_default("log_filter", "qa_server=info")?
            .set_default("log_format", "text")?
            .add_source(File::with_name("qa-server").required(false))
            .add_source(Environment::with_prefix("QA").try_parsing(true).source(env))
            .build()?
            .try_deserialize()
    }
}
