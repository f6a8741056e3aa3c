//! Error kinds for pure rule evaluation.
//!
//! This is the domain-facing subset of the engine's error taxonomy: the kinds
//! that can arise from computation alone, with no database or network involved.
//! Persistence, migration, and external-service failures live in the engine
//! crate's `EngineError`, which wraps this type via `#[from]`.

use thiserror::Error;

use crate::rules::dice::DiceParseError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    #[error("invalid dice expression: {0}")]
    InvalidDiceExpression(#[from] DiceParseError),

    #[error("invalid action: {reason}")]
    InvalidAction { reason: String },

    #[error("insufficient {kind}")]
    InsufficientResource { kind: String },

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

impl RuleError {
    pub fn invalid_action(reason: impl Into<String>) -> Self {
        Self::InvalidAction {
            reason: reason.into(),
        }
    }

    pub fn insufficient(kind: impl Into<String>) -> Self {
        Self::InsufficientResource { kind: kind.into() }
    }

    pub fn invalid_state_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_action_renders_reason() {
        let err = RuleError::invalid_action("not your turn");
        assert_eq!(err.to_string(), "invalid action: not your turn");
    }

    #[test]
    fn not_found_renders_entity_and_id() {
        let err = RuleError::not_found("Character", "abc-123");
        assert!(err.to_string().contains("Character"));
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn from_dice_parse_error() {
        let err: RuleError = DiceParseError::Empty.into();
        assert!(matches!(err, RuleError::InvalidDiceExpression(_)));
    }
}
