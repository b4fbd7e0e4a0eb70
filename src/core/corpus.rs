use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{Like, Place, UserId};
use crate::error::Result;

/// Full snapshot of users, places and like edges exported from the data store.
///
/// JSON layout:
/// ```json
/// {
///   "users": ["u1", "u2"],
///   "places": [{"id": "p1", "name": "...", "description": "..."}],
///   "likes": [{"user": "u1", "place": "p1"}]
/// }
/// ```
///
/// Order matters: users are the interaction-matrix columns and places its rows,
/// both in the order given here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Corpus {
    #[serde(default)]
    pub users: Vec<UserId>,

    #[serde(default)]
    pub places: Vec<Place>,

    #[serde(default)]
    pub likes: Vec<Like>,
}

impl Corpus {
    pub fn new(users: Vec<UserId>, places: Vec<Place>, likes: Vec<Like>) -> Self {
        Self { users, places, likes }
    }

    /// Read a snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Place ids liked by `user`, in like-record order
    pub fn likes_of<'a>(&'a self, user: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.likes
            .iter()
            .filter(move |l| l.user == user)
            .map(|l| l.place.as_str())
    }
}
