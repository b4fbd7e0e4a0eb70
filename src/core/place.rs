use serde::{Deserialize, Serialize};

/// Opaque user identifier (backing store object id)
pub type UserId = String;

/// Opaque place identifier (backing store object id)
pub type PlaceId = String;

/// A place as seen by the search and recommendation core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Place {
    /// Unique id from the data store
    pub id: PlaceId,

    /// Short display name
    #[serde(default)]
    pub name: String,

    /// Long free-text description
    #[serde(default)]
    pub description: String,
}

impl Place {
    /// Create a new Place
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// Get display string (for logging)
    pub fn display_name(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }
}

/// A like edge: `user` showed interest in `place`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Like {
    pub user: UserId,
    pub place: PlaceId,
}

impl Like {
    pub fn new(user: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            place: place.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_missing_fields_default_to_empty() {
        let place: Place = serde_json::from_str(r#"{"id": "p1"}"#).unwrap();
        assert_eq!(place.id, "p1");
        assert!(place.name.is_empty());
        assert!(place.description.is_empty());
    }

    #[test]
    fn test_display_name() {
        let place = Place::new("p1", "Café Central", "");
        assert_eq!(place.display_name(), "Café Central [p1]");
    }
}
