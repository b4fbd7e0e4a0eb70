use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{PlaceId, UserId};
use crate::error::{PlacesError, Result};
use crate::recommend::InteractionModel;

pub const DEFAULT_PROMOTION_LIMIT: usize = 5;

/// User with the number of neighbor places they liked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAffinity {
    pub user: UserId,
    pub score: u32,
}

/// Promotion ready to be handed to the notification side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionPlan {
    pub place: PlaceId,
    pub requested_by: UserId,
    pub targets: Vec<UserId>,
    /// Number of users the promotion goes out to
    pub sent: usize,
    pub created_at: DateTime<Utc>,
}

/// Ranks users for a place promotion via the place-space neighbor index
#[derive(Debug, Clone)]
pub struct PromotionRanker {
    limit: usize,
}

impl Default for PromotionRanker {
    fn default() -> Self {
        Self::new(DEFAULT_PROMOTION_LIMIT)
    }
}

impl PromotionRanker {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Every user scored by how many of `place`'s nearest places they liked,
    /// highest first; ties keep matrix column order.
    pub fn affinity_scores(&self, model: &InteractionModel, place: &str) -> Result<Vec<UserAffinity>> {
        let matrix = model.matrix();
        if matrix.n_places() == 0 {
            return Err(PlacesError::EmptyCorpus("no places to promote".to_string()));
        }

        let neighbors = model
            .place_index()
            .neighbors_of(place)
            .ok_or_else(|| PlacesError::place_not_found(place))?;

        let mut scores = vec![0u32; matrix.n_users()];
        for neighbor in neighbors {
            for user in matrix.users_who_liked(neighbor.index) {
                scores[user] += 1;
            }
        }

        let mut ranked: Vec<UserAffinity> = matrix
            .user_ids()
            .iter()
            .zip(scores)
            .map(|(user, score)| UserAffinity {
                user: user.clone(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(ranked)
    }

    /// Top users to promote `place` to, never including `requesting_user`.
    ///
    /// The requester is removed before the list is cut, so the result is only
    /// short when fewer users exist.
    pub fn rank(&self, model: &InteractionModel, place: &str, requesting_user: &str) -> Result<Vec<UserId>> {
        let ranked = self.affinity_scores(model, place)?;

        Ok(ranked
            .into_iter()
            .filter(|a| a.user != requesting_user)
            .take(self.limit)
            .map(|a| a.user)
            .collect())
    }

    pub fn plan(&self, model: &InteractionModel, place: &str, requesting_user: &str) -> Result<PromotionPlan> {
        let targets = self.rank(model, place, requesting_user)?;

        tracing::info!(
            "Promotion of {} by {} targets {} users",
            place,
            requesting_user,
            targets.len()
        );

        Ok(PromotionPlan {
            place: place.to_string(),
            requested_by: requesting_user.to_string(),
            sent: targets.len(),
            targets,
            created_at: Utc::now(),
        })
    }
}
