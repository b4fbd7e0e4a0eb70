pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use sqlite::SqliteArtifactStore;

/// The two independently rebuildable artifact families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFamily {
    /// Like matrix + user-space and place-space neighbor indices
    Interaction,
    /// Vocabulary, TF-IDF weight table and document vectors
    Text,
}

impl ArtifactFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFamily::Interaction => "interaction",
            ArtifactFamily::Text => "text",
        }
    }

    pub fn all() -> &'static [ArtifactFamily] {
        &[ArtifactFamily::Interaction, ArtifactFamily::Text]
    }
}

/// Trait for artifact persistence backends
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Replace the stored artifact of `family`
    async fn save(&self, family: ArtifactFamily, payload: &str, item_count: u64) -> Result<()>;

    /// Latest stored artifact of `family`, if any
    async fn load(&self, family: ArtifactFamily) -> Result<Option<StoredArtifact>>;

    /// Remove the artifact of `family`; returns whether one existed
    async fn clear(&self, family: ArtifactFamily) -> Result<bool>;

    /// Get store statistics
    async fn stats(&self) -> Result<StoreStats>;
}

/// Stored artifact with metadata
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub family: ArtifactFamily,
    pub payload: String,
    /// Places (text) or likes (interaction) covered by the artifact
    pub item_count: u64,
    pub built_at: chrono::DateTime<chrono::Utc>,
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub total_artifacts: u64,
    pub total_bytes: u64,
    pub oldest_build: Option<chrono::DateTime<chrono::Utc>>,
    pub newest_build: Option<chrono::DateTime<chrono::Utc>>,
}
