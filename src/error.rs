use thiserror::Error;

/// Main error type for the places engine
#[derive(Error, Debug)]
pub enum PlacesError {
    /// Target has no usable interaction history, or no candidate survived the fallback
    #[error("Cold start: {0}")]
    ColdStart(String),

    /// User or place id unknown to the fitted index
    #[error("{kind} '{id}' not found in fitted index")]
    NotFound { kind: &'static str, id: String },

    /// Like edge references an id missing from the snapshot (whole build rejected)
    #[error("Inconsistent corpus: {0}")]
    InconsistentCorpus(String),

    /// Search or ranking against an empty place set
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// Query issued before any artifact of this family was published
    #[error("No '{0}' artifact has been built or loaded")]
    ArtifactMissing(&'static str),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors (corpus snapshots, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl PlacesError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        PlacesError::NotFound { kind: "user", id: id.into() }
    }

    pub fn place_not_found(id: impl Into<String>) -> Self {
        PlacesError::NotFound { kind: "place", id: id.into() }
    }

    /// True for the cold-start family of failures (unknown target or no candidates)
    pub fn is_cold_start(&self) -> bool {
        matches!(self, PlacesError::ColdStart(_) | PlacesError::NotFound { .. })
    }
}

impl From<String> for PlacesError {
    fn from(s: String) -> Self {
        PlacesError::Other(s)
    }
}

impl From<&str> for PlacesError {
    fn from(s: &str) -> Self {
        PlacesError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlacesError>;
