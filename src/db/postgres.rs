//! PostgreSQL-backed item store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};

use super::{
    classify, ensure_non_negative, parse_id, schema_statements, ItemRepository, StoreError,
    StoreResult,
};
use crate::models::item::Item;

const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

#[derive(Clone)]
pub struct PostgresItemStore {
    pool: Pool<Postgres>,
}

impl PostgresItemStore {
    /// Connects with a full connection URL.
    pub async fn from_url(url: &str, max_connections: u32) -> StoreResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        tracing::info!("Connecting to PostgreSQL with connection URL");
        Self::connect(opts, max_connections).await
    }

    /// Connects with individual credentials.
    pub async fn from_params(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        database: &str,
        max_connections: u32,
    ) -> StoreResult<Self> {
        let opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .username(username)
            .password(password)
            .database(database);

        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections).await
    }

    async fn connect(opts: PgConnectOptions, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the embedded schema. Safe to run on every start.
    pub async fn migrate(&self) -> StoreResult<()> {
        // Prepared statements cannot hold more than one command.
        for statement in schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl ItemRepository for PostgresItemStore {
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
            "SELECT id, created_at, updated_at, deleted_at, name, quantity FROM items WHERE id = $1 AND deleted_at IS NULL",
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
            VALUES ($1, $1, $2, $3)
            RETURNING id, created_at, updated_at, deleted_at, name, quantity
            "#,
        )
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
            SET name = COALESCE($1, name), quantity = $2, updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
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
            "UPDATE items SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
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
