use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};

use super::GameStore;
use crate::models::GameId;

/// Database row for the games table.
#[derive(Debug, Clone, FromRow)]
pub struct GameRow {
    pub id: i64,
    pub payload: String,
    pub expires_at: DateTime<Utc>,
}

/// Insert or replace a game payload.
pub async fn upsert_game(
    pool: &PgPool,
    id: i64,
    payload: &str,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO games (id, payload, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE SET payload = $2, expires_at = $3
        "#,
    )
    .bind(id)
    .bind(payload)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a live game by id.
pub async fn get_game(pool: &PgPool, id: i64) -> anyhow::Result<Option<GameRow>> {
    let row = sqlx::query_as::<_, GameRow>(
        "SELECT id, payload, expires_at FROM games WHERE id = $1 AND expires_at > NOW()",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Get all live games, oldest first.
pub async fn get_live_games(pool: &PgPool) -> anyhow::Result<Vec<GameRow>> {
    let rows = sqlx::query_as::<_, GameRow>(
        "SELECT id, payload, expires_at FROM games WHERE expires_at > NOW() ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete games past their retention window.
pub async fn delete_expired_games(pool: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM games WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Postgres-backed [`GameStore`].
#[derive(Debug, Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn put(&self, id: GameId, payload: String, ttl: Duration) -> anyhow::Result<()> {
        upsert_game(&self.pool, id.as_millis(), &payload, Utc::now() + ttl).await
    }

    async fn get(&self, id: GameId) -> anyhow::Result<Option<String>> {
        Ok(get_game(&self.pool, id.as_millis()).await?.map(|row| row.payload))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<(GameId, String)>> {
        let rows = get_live_games(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| (GameId::from_millis(row.id), row.payload))
            .collect())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        delete_expired_games(&self.pool).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
