use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::store::{ArtifactFamily, ArtifactStore, StoreStats, StoredArtifact};

/// SQLite-backed artifact store.
///
/// ```sql
/// CREATE TABLE artifacts (
///     family TEXT PRIMARY KEY,
///     payload TEXT NOT NULL,
///     item_count INTEGER DEFAULT 0,
///     built_at TEXT NOT NULL
/// );
/// ```
///
/// One row per family, replaced in a single statement on save, so a reader
/// sees either the previous artifact or the new one.
pub struct SqliteArtifactStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteArtifactStore {
    /// Open (or create) the store at `db_path`; `":memory:"` is allowed
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS artifacts (
                family TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                item_count INTEGER DEFAULT 0,
                built_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl ArtifactStore for SqliteArtifactStore {
    async fn save(&self, family: ArtifactFamily, payload: &str, item_count: u64) -> Result<()> {
        let conn = self.conn();

        conn.execute(
            "INSERT OR REPLACE INTO artifacts (family, payload, item_count, built_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![family.as_str(), payload, item_count as i64, Utc::now().to_rfc3339()],
        )?;

        tracing::debug!("Stored '{}' artifact ({} bytes)", family.as_str(), payload.len());
        Ok(())
    }

    async fn load(&self, family: ArtifactFamily) -> Result<Option<StoredArtifact>> {
        let conn = self.conn();

        let artifact = conn
            .query_row(
                "SELECT payload, item_count, built_at FROM artifacts WHERE family = ?",
                params![family.as_str()],
                |row| {
                    let payload: String = row.get(0)?;
                    let item_count: i64 = row.get(1)?;
                    let built_at: String = row.get(2)?;
                    Ok(StoredArtifact {
                        family,
                        payload,
                        item_count: item_count.max(0) as u64,
                        built_at: parse_timestamp(&built_at),
                    })
                },
            )
            .optional()?;

        Ok(artifact)
    }

    async fn clear(&self, family: ArtifactFamily) -> Result<bool> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM artifacts WHERE family = ?", params![family.as_str()])?;
        Ok(deleted > 0)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn();

        let (total_artifacts, total_bytes): (u64, u64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(payload)), 0) FROM artifacts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(built_at), MAX(built_at) FROM artifacts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            total_artifacts,
            total_bytes,
            oldest_build: oldest.as_deref().map(parse_timestamp),
            newest_build: newest.as_deref().map(parse_timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_create() {
        let store = SqliteArtifactStore::new(":memory:").await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_artifacts, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.oldest_build.is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = SqliteArtifactStore::new(":memory:").await.unwrap();
        store.save(ArtifactFamily::Text, r#"{"v":1}"#, 12).await.unwrap();

        let loaded = store.load(ArtifactFamily::Text).await.unwrap().unwrap();
        assert_eq!(loaded.payload, r#"{"v":1}"#);
        assert_eq!(loaded.item_count, 12);
        assert_eq!(loaded.family, ArtifactFamily::Text);
    }

    #[tokio::test]
    async fn test_families_are_independent() {
        let store = SqliteArtifactStore::new(":memory:").await.unwrap();
        store.save(ArtifactFamily::Interaction, "a", 1).await.unwrap();

        assert!(store.load(ArtifactFamily::Text).await.unwrap().is_none());
        assert!(store.load(ArtifactFamily::Interaction).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let store = SqliteArtifactStore::new(":memory:").await.unwrap();
        store.save(ArtifactFamily::Text, "old", 1).await.unwrap();
        store.save(ArtifactFamily::Text, "new", 2).await.unwrap();

        let loaded = store.load(ArtifactFamily::Text).await.unwrap().unwrap();
        assert_eq!(loaded.payload, "new");

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_artifacts, 1);
        assert_eq!(stats.total_bytes, 3);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = SqliteArtifactStore::new(":memory:").await.unwrap();
        store.save(ArtifactFamily::Text, "x", 1).await.unwrap();

        assert!(store.clear(ArtifactFamily::Text).await.unwrap());
        assert!(!store.clear(ArtifactFamily::Text).await.unwrap());
        assert!(store.load(ArtifactFamily::Text).await.unwrap().is_none());
    }
}
