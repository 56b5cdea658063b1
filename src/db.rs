//! Item persistence.
//!
//! [`ItemRepository`] is the seam handlers talk to. Two sqlx-backed
//! implementations live behind it: [`PostgresItemStore`] for deployments and
//! [`SqliteItemStore`] for single-node use and tests. Both classify driver
//! errors through [`classify`], so callers only ever see [`StoreError`].

mod postgres;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::item::Item;

pub use postgres::PostgresItemStore;
pub use sqlite::SqliteItemStore;

#[cfg(test)]
use mockall::automock;

/// Outcome of a store operation that did not succeed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live row matched. Covers both "never existed" and "already deleted".
    #[error("item not found")]
    NotFound,

    /// Another live item already uses the name.
    #[error("item name already in use")]
    Conflict,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Internal(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All live items, oldest first.
    async fn list(&self) -> StoreResult<Vec<Item>>;

    async fn get(&self, id: &str) -> StoreResult<Item>;

    async fn create(&self, name: &str, quantity: i64) -> StoreResult<Item>;

    /// Replaces the quantity and, when given, the name of a live item.
    async fn update(&self, id: &str, name: Option<String>, quantity: i64) -> StoreResult<Item>;

    async fn soft_delete(&self, id: &str) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
}

/// Identifiers arrive as path text. Anything that is not an integer cannot
/// match a row.
pub(crate) fn parse_id(id: &str) -> StoreResult<i64> {
    id.parse::<i64>().map_err(|_| StoreError::NotFound)
}

pub(crate) fn ensure_non_negative(quantity: i64) -> StoreResult<()> {
    if quantity < 0 {
        return Err(StoreError::InvalidInput(
            "quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Maps a driver error onto the store's error kinds.
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
        if db_err.is_check_violation() {
            return StoreError::InvalidInput("quantity must not be negative".to_string());
        }
    }
    StoreError::Internal(err)
}

/// Splits an embedded schema into individually executable statements,
/// dropping comment-only fragments.
pub(crate) fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}
