//! The engine-facing error taxonomy. `RuleError` covers pure computation
//! failures; `EngineError` adds everything that can go wrong once I/O,
//! persistence, and external services enter the picture. The turn pipeline is
//! the only place allowed to catch and suppress a `SubsystemFailure` — every
//! other error kind propagates to the host.

use thiserror::Error;
use wrldcore_domain::RuleError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("insufficient {0}")]
    InsufficientResource(String),

    #[error("subsystem failure: {0}")]
    SubsystemFailure(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] sqlx::Error),

    #[error("schema failure: {0}")]
    SchemaFailure(String),

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl EngineError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// `ExternalUnavailable` is deliberately not a variant of `EngineError`: an LLM
/// or retrieval-store failure is recovered with a fallback at the call site
/// and never surfaces as a turn failure.
pub fn log_external_unavailable(service: &str, err: impl std::fmt::Display) {
    tracing::warn!(service, error = %err, "external service unavailable, falling back");
}
