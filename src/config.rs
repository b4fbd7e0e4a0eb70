use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PlacesError, Result};
use crate::recommend::{
    DEFAULT_FALLBACK_ATTEMPTS, DEFAULT_PLACE_NEIGHBORS, DEFAULT_PROMOTION_LIMIT, DEFAULT_RECOMMEND_LIMIT,
    DEFAULT_USER_NEIGHBORS,
};
use crate::search::{DEFAULT_SEARCH_LIMIT, DEFAULT_TITLE_ALPHA};
use crate::text::NormalizerKind;

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use places_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.search_limit, 10);
/// assert_eq!(config.user_neighbors, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite artifact store path (`:memory:` for tests)
    pub db_path: String,

    /// Places returned by a text search
    pub search_limit: usize,

    /// Description share of a token's weight; names get `1 - title_alpha`
    pub title_alpha: f64,

    /// Similar users consulted per recommendation (k = user_neighbors + 1)
    pub user_neighbors: usize,

    /// Places returned by a recommendation
    pub recommend_limit: usize,

    /// Random draws before a cold-start recommendation gives up
    pub fallback_max_attempts: usize,

    /// Similar places consulted per promotion (k = place_neighbors + 1)
    pub place_neighbors: usize,

    /// Users targeted by a promotion
    pub promotion_limit: usize,

    /// Text normalizer used for indexing and queries
    pub normalizer: NormalizerKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: "places.db".to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            title_alpha: DEFAULT_TITLE_ALPHA,
            user_neighbors: DEFAULT_USER_NEIGHBORS,
            recommend_limit: DEFAULT_RECOMMEND_LIMIT,
            fallback_max_attempts: DEFAULT_FALLBACK_ATTEMPTS,
            place_neighbors: DEFAULT_PLACE_NEIGHBORS,
            promotion_limit: DEFAULT_PROMOTION_LIMIT,
            normalizer: NormalizerKind::default(),
        }
    }
}

impl EngineConfig {
    /// In-memory store, default tuning
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `PLACES_DB_PATH`, `PLACES_SEARCH_LIMIT` and
    /// `PLACES_FALLBACK_ATTEMPTS`
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup("PLACES_DB_PATH") {
            self.db_path = path;
        }
        if let Some(raw) = lookup("PLACES_SEARCH_LIMIT") {
            self.search_limit = parse_usize("PLACES_SEARCH_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("PLACES_FALLBACK_ATTEMPTS") {
            self.fallback_max_attempts = parse_usize("PLACES_FALLBACK_ATTEMPTS", &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.title_alpha) {
            return Err(PlacesError::Config(format!(
                "title_alpha must be within [0, 1], got {}",
                self.title_alpha
            )));
        }
        for (name, value) in [
            ("search_limit", self.search_limit),
            ("recommend_limit", self.recommend_limit),
            ("promotion_limit", self.promotion_limit),
            ("user_neighbors", self.user_neighbors),
            ("place_neighbors", self.place_neighbors),
        ] {
            if value == 0 {
                return Err(PlacesError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| PlacesError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
