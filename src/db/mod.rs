pub mod game_repo;
pub mod memory;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::GameId;

pub use game_repo::PgGameStore;
pub use memory::MemoryGameStore;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Keyed store of serialized game payloads with per-entry retention.
///
/// `put` overwrites; `get` and `get_all` never return expired entries.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn put(&self, id: GameId, payload: String, ttl: Duration) -> anyhow::Result<()>;

    async fn get(&self, id: GameId) -> anyhow::Result<Option<String>>;

    async fn get_all(&self) -> anyhow::Result<Vec<(GameId, String)>>;

    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> anyhow::Result<u64>;

    async fn ping(&self) -> anyhow::Result<()>;
}
