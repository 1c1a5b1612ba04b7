use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use super::kv::KeyValue;

/// Durable backend: one `kv` table, upsert on write.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value JSONB NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("ensure kv table")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValue for PgStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("kv get")?;
        Ok(row.map(|r| r.get::<Value, _>("value")))
    }

    async fn put(&self, key: &str, value: Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("kv put")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("kv delete")?;
        Ok(())
    }
}
