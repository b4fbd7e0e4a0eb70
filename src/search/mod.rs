pub mod cosine;
pub mod index;
pub mod matching;
pub mod vocabulary;

use serde::{Deserialize, Serialize};

use crate::core::PlaceId;
use crate::error::Result;

pub use cosine::{cosine_similarity, CosineSearcher};
pub use index::{inverse_document_frequency, TextIndex, TextIndexBuilder, DEFAULT_TITLE_ALPHA};
pub use matching::MatchScoreSearcher;
pub use vocabulary::Vocabulary;

/// Default number of places returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Trait for text retrieval strategies over a [`TextIndex`]
pub trait Searcher: Send + Sync {
    /// Rank places for preprocessed query tokens, highest score first, at most `limit`
    fn search(&self, index: &TextIndex, tokens: &[String], limit: usize) -> Result<Vec<ScoredPlace>>;

    /// Get searcher name for logging
    fn name(&self) -> &str;
}

/// Place with its retrieval score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlace {
    pub place_id: PlaceId,
    pub score: f64,
}

impl ScoredPlace {
    pub fn new(place_id: impl Into<String>, score: f64) -> Self {
        Self {
            place_id: place_id.into(),
            score,
        }
    }
}

/// Stable descending sort; equal scores keep corpus order
pub(crate) fn sort_descending(scored: &mut [ScoredPlace]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}
