//! The relational store: one SQLite database per installation, a
//! forward-only migration chain, and one repository per entity kind. The
//! store itself is the **connection broker**: [`DataStore::transaction`]
//! yields a `sqlx::Transaction` that commits on success and rolls back on
//! any error the caller propagates.

pub mod migrations;
pub mod repos;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::EngineResult;

#[derive(Clone)]
pub struct DataStore {
    pool: SqlitePool,
}

impl DataStore {
    /// Open (creating if absent) the database at `database_path` and bring its
    /// schema up to date.
    pub async fn connect(database_path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = database_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    crate::error::EngineError::SchemaFailure(format!(
                        "could not create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
            .map_err(|e| crate::error::EngineError::SchemaFailure(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;

        migrations::run(&pool).await?;

        Ok(Self { pool })
    }

    /// An in-memory store, for tests and the `check` CLI command.
    pub async fn connect_in_memory() -> EngineResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        migrations::run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a transaction. The caller commits explicitly; dropping the
    /// transaction (e.g. via `?` propagating an error) rolls it back.
    pub async fn transaction(&self) -> EngineResult<Transaction<'_, Sqlite>> {
        Ok(self.pool.begin().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_and_migrates_in_memory() {
        let store = DataStore::connect_in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert!(count > 0);
    }
}
