//! # Places Engine
//!
//! Search and recommendation core for a social places app:
//! - TF-IDF text search over place names and descriptions
//! - Collaborative-filtering recommendations from a user × place like matrix
//! - Promotion targeting through place-space nearest neighbors
//! - SQLite persistence of built artifacts, loaded on start
//! - Lock-free reads with atomic snapshot swaps on rebuild
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use places_engine::{Corpus, EngineConfig, PlacesEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = PlacesEngine::open(EngineConfig::default()).await?;
//!     engine.rebuild_all(Corpus::from_json_file("corpus.json")?).await?;
//!
//!     for place in engine.search("rooftop cocktails")? {
//!         println!("{}", place);
//!     }
//!     println!("For you: {:?}", engine.recommend("alice")?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod recommend;
pub mod search;
pub mod store;
pub mod text;

// Re-export primary types
pub use config::EngineConfig;
pub use core::{Corpus, Like, Place, PlaceId, UserId};
pub use engine::{BuildReport, LoadReport, PlacesEngine};
pub use error::{PlacesError, Result};
pub use recommend::{PromotionPlan, RecommendationSource, Recommendations};
pub use search::ScoredPlace;
pub use store::{ArtifactFamily, ArtifactStore, SqliteArtifactStore};
pub use text::{NormalizerKind, Preprocessor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
