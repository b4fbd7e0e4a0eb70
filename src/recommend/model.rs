use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::core::Corpus;
use crate::error::{PlacesError, Result};
use crate::recommend::{InteractionMatrix, NeighborIndex, NeighborIndexBuilder};

pub const DEFAULT_USER_NEIGHBORS: usize = 4;
pub const DEFAULT_PLACE_NEIGHBORS: usize = 10;

/// Interaction artifact: the like matrix plus its two fitted neighbor indices
/// (user space for recommendations, place space for promotions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelParts", into = "ModelParts")]
pub struct InteractionModel {
    matrix: InteractionMatrix,
    user_index: NeighborIndex,
    place_index: NeighborIndex,
    built_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct ModelParts {
    matrix: InteractionMatrix,
    user_index: NeighborIndex,
    place_index: NeighborIndex,
    built_at: DateTime<Utc>,
}

impl From<InteractionModel> for ModelParts {
    fn from(model: InteractionModel) -> Self {
        Self {
            matrix: model.matrix,
            user_index: model.user_index,
            place_index: model.place_index,
            built_at: model.built_at,
        }
    }
}

/// Neighbor rows must line up with matrix columns (users) and rows (places)
impl TryFrom<ModelParts> for InteractionModel {
    type Error = PlacesError;

    fn try_from(parts: ModelParts) -> Result<Self> {
        if parts.user_index.labels() != parts.matrix.user_ids() {
            return Err(PlacesError::InconsistentCorpus(
                "user neighbor index does not match matrix users".to_string(),
            ));
        }
        if parts.place_index.labels() != parts.matrix.place_ids() {
            return Err(PlacesError::InconsistentCorpus(
                "place neighbor index does not match matrix places".to_string(),
            ));
        }
        Ok(Self {
            matrix: parts.matrix,
            user_index: parts.user_index,
            place_index: parts.place_index,
            built_at: parts.built_at,
        })
    }
}

impl InteractionModel {
    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn user_index(&self) -> &NeighborIndex {
        &self.user_index
    }

    pub fn place_index(&self) -> &NeighborIndex {
        &self.place_index
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Builds an [`InteractionModel`] from a corpus snapshot
#[derive(Debug, Clone)]
pub struct InteractionModelBuilder {
    user_neighbors: usize,
    place_neighbors: usize,
}

impl Default for InteractionModelBuilder {
    fn default() -> Self {
        Self {
            user_neighbors: DEFAULT_USER_NEIGHBORS,
            place_neighbors: DEFAULT_PLACE_NEIGHBORS,
        }
    }
}

impl InteractionModelBuilder {
    pub fn new(user_neighbors: usize, place_neighbors: usize) -> Self {
        Self {
            user_neighbors,
            place_neighbors,
        }
    }

    pub fn build(&self, corpus: &Corpus) -> Result<InteractionModel> {
        let start = Instant::now();
        let matrix = InteractionMatrix::from_corpus(corpus)?;

        let user_index = NeighborIndexBuilder::with_neighbors(self.user_neighbors)
            .fit(matrix.user_ids().to_vec(), &matrix.user_vectors())?;
        let place_index = NeighborIndexBuilder::with_neighbors(self.place_neighbors)
            .fit(matrix.place_ids().to_vec(), &matrix.place_vectors())?;

        tracing::info!(
            "Interaction model built: {} places x {} users, {} likes in {:.1}ms",
            matrix.n_places(),
            matrix.n_users(),
            matrix.like_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(InteractionModel {
            matrix,
            user_index,
            place_index,
            built_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Like, Place};

    fn corpus() -> Corpus {
        Corpus::new(
            (1..=6).map(|i| format!("u{}", i)).collect(),
            (1..=4).map(|i| Place::new(format!("p{}", i), "", "")).collect(),
            vec![
                Like::new("u1", "p1"),
                Like::new("u2", "p1"),
                Like::new("u2", "p2"),
                Like::new("u3", "p3"),
            ],
        )
    }

    #[test]
    fn test_index_sizes() {
        let model = InteractionModelBuilder::default().build(&corpus()).unwrap();
        assert_eq!(model.user_index().len(), 6);
        assert_eq!(model.place_index().len(), 4);
        assert_eq!(model.user_index().k(), 5);
        assert_eq!(model.place_index().k(), 11);
        assert_eq!(model.user_index().neighbors_of("u1").unwrap().len(), 4);
        // only 3 other places exist
        assert_eq!(model.place_index().neighbors_of("p1").unwrap().len(), 3);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let a = InteractionModelBuilder::default().build(&corpus()).unwrap();
        let b = InteractionModelBuilder::default().build(&corpus()).unwrap();
        assert_eq!(a.matrix(), b.matrix());
        assert_eq!(a.user_index(), b.user_index());
        assert_eq!(a.place_index(), b.place_index());
    }

    #[test]
    fn test_stored_model_must_match_matrix() {
        let model = InteractionModelBuilder::default().build(&corpus()).unwrap();
        let mut value = serde_json::to_value(&model).unwrap();
        let back: InteractionModel = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back.matrix(), model.matrix());

        value["place_index"]["labels"][0] = serde_json::json!("p99");
        let err = serde_json::from_value::<InteractionModel>(value).unwrap_err();
        assert!(err.to_string().contains("place neighbor index"));
    }
}
