use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::GameStore;
use crate::models::GameId;

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// In-process [`GameStore`], used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    entries: RwLock<BTreeMap<GameId, Entry>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn put(&self, id: GameId, payload: String, ttl: Duration) -> anyhow::Result<()> {
        let entry = Entry {
            payload,
            expires_at: Utc::now() + ttl,
        };
        self.entries.write().await.insert(id, entry);
        Ok(())
    }

    async fn get(&self, id: GameId) -> anyhow::Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .entries
            .read()
            .await
            .get(&id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.payload.clone()))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<(GameId, String)>> {
        let now = Utc::now();
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(id, entry)| (*id, entry.payload.clone()))
            .collect())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
