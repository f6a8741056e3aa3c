//! One repository per entity kind. Every function is generic over
//! `sqlx::Executor` so the turn pipeline can run a sequence of repository
//! calls inside one transaction (pass `&mut *tx`) or standalone against the
//! pool (pass `store.pool()`) when atomicity with other writes isn't needed.

pub mod character;
pub mod combat;
pub mod companion;
pub mod connection;
pub mod entity;
pub mod event;
pub mod game;
pub mod housing;
pub mod intent;
pub mod inventory;
pub mod location;
pub mod progression;
pub mod quest;
pub mod region;
pub mod reputation;
pub mod shop;
pub mod snapshot;
pub mod trait_repo;

use crate::error::{EngineError, EngineResult};

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string(value).map_err(|e| EngineError::SchemaFailure(e.to_string()))
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> EngineResult<T> {
    serde_json::from_str(raw).map_err(|e| EngineError::SchemaFailure(e.to_string()))
}
