//! Environment-driven configuration, loaded once at startup. No module-level
//! mutable singletons: `AppConfig` is constructed explicitly
//! in `main` and threaded down to every collaborator that needs it.

use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::EngineResult;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    #[serde(default = "default_retrieval_base_url")]
    pub retrieval_base_url: Option<String>,

    #[serde(default = "default_snapshot_retention")]
    pub snapshot_retention: i64,
}

fn default_database_path() -> String {
    "wrldcore.db".to_string()
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    20
}

fn default_retrieval_base_url() -> Option<String> {
    None
}

fn default_snapshot_retention() -> i64 {
    10
}

impl AppConfig {
    /// Build configuration from environment variables prefixed `WRLDCORE_`
    /// (e.g. `WRLDCORE_DATABASE_PATH`), falling back to the defaults above.
    /// Callers are expected to have already called `dotenvy::dotenv().ok()`.
    pub fn from_env() -> EngineResult<Self> {
        let cfg = Config::builder()
            .set_default("database_path", default_database_path())?
            .set_default("content_dir", default_content_dir())?
            .set_default("llm_base_url", default_llm_base_url())?
            .set_default("llm_model", default_llm_model())?
            .set_default("llm_timeout_secs", default_llm_timeout_secs() as i64)?
            .set_default("snapshot_retention", default_snapshot_retention())?
            .add_source(Environment::with_prefix("WRLDCORE").try_parsing(true))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        std::env::remove_var("WRLDCORE_DATABASE_PATH");
        let cfg = AppConfig::from_env().expect("defaults alone must build a config");
        assert_eq!(cfg.database_path, "wrldcore.db");
        assert_eq!(cfg.snapshot_retention, 10);
    }
}
