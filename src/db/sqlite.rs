//! SQLite-backed item store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::{
    classify, ensure_non_negative, parse_id, schema_statements, ItemRepository, StoreError,
    StoreResult,
};
use crate::models::item::Item;

const SQLITE_SCHEMA: &str = include_str!("sqlite_schema.sql");

#[derive(Clone)]
pub struct SqliteItemStore {
    pool: Pool<Sqlite>,
}

impl SqliteItemStore {
    /// Opens (creating if missing) a database file.
    pub async fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| StoreError::Internal(sqlx::Error::Io(err)))?;
        }
        Self::from_url(&format!("sqlite:{}", path.display())).await
    }

    /// Opens a `sqlite:` connection URL.
    pub async fn from_url(url: &str) -> StoreResult<Self> {
        let opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        tracing::info!(url = url, "Opening SQLite item store");

        let pool = SqlitePoolOptions::new()
            // One writer at a time; a single connection avoids "database is locked".
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the embedded schema. Safe to run on every start.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in schema_statements(SQLITE_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl ItemRepository for SqliteItemStore {
    async fn list(&self) -> StoreResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, created_at, updated_at, deleted_at, name, quantity FROM items WHERE deleted_at IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get(&self, id: &str) -> StoreResult<Item> {
        let id = parse_id(id)?;
        sqlx::query_as::<_, Item>(
            "SELECT id, created_at, updated_at, deleted_at, name, quantity FROM items WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn create(&self, name: &str, quantity: i64) -> StoreResult<Item> {
        ensure_non_negative(quantity)?;
        let now = Utc::now();

        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (created_at, updated_at, name, quantity)
            VALUES (?, ?, ?, ?)
            RETURNING id, created_at, updated_at, deleted_at, name, quantity
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(name)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update(&self, id: &str, name: Option<String>, quantity: i64) -> StoreResult<Item> {
        let id = parse_id(id)?;
        ensure_non_negative(quantity)?;

        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = COALESCE(?, name), quantity = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            RETURNING id, created_at, updated_at, deleted_at, name, quantity
            "#,
        )
        .bind(name)
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        let id = parse_id(id)?;
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
