use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{PlaceId, UserId};
use crate::error::{PlacesError, Result};
use crate::recommend::InteractionModel;

pub const DEFAULT_RECOMMEND_LIMIT: usize = 5;
pub const DEFAULT_FALLBACK_ATTEMPTS: usize = 64;

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Places liked by similar users
    Neighbors,
    /// Random unliked place (cold start)
    Fallback,
}

/// Recommendation result with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub user: UserId,
    pub places: Vec<PlaceId>,
    pub source: RecommendationSource,
}

/// User-based collaborative filter over the user-space neighbor index
#[derive(Debug, Clone)]
pub struct CollaborativeFilter {
    limit: usize,
    fallback_max_attempts: usize,
}

impl Default for CollaborativeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_RECOMMEND_LIMIT, DEFAULT_FALLBACK_ATTEMPTS)
    }
}

impl CollaborativeFilter {
    pub fn new(limit: usize, fallback_max_attempts: usize) -> Self {
        Self {
            limit,
            fallback_max_attempts,
        }
    }

    pub fn recommend(&self, model: &InteractionModel, user: &str) -> Result<Recommendations> {
        self.recommend_with_rng(model, user, &mut rand::thread_rng())
    }

    /// Places liked by the nearest users that `user` has not liked, walking
    /// neighbors closest first and each neighbor's likes in row order.
    ///
    /// Neighbors sharing no like with `user` are skipped. With no candidate
    /// left, one random unliked place is drawn, retrying at most
    /// `fallback_max_attempts` times.
    pub fn recommend_with_rng<R: Rng + ?Sized>(
        &self,
        model: &InteractionModel,
        user: &str,
        rng: &mut R,
    ) -> Result<Recommendations> {
        let matrix = model.matrix();
        if matrix.n_places() == 0 {
            return Err(PlacesError::EmptyCorpus("no places to recommend".to_string()));
        }

        let user_idx = matrix
            .user_index(user)
            .ok_or_else(|| PlacesError::user_not_found(user))?;
        let neighbors = model
            .user_index()
            .neighbors_of(user)
            .ok_or_else(|| PlacesError::user_not_found(user))?;

        let mut liked = vec![false; matrix.n_places()];
        for p in matrix.places_liked_by(user_idx) {
            liked[p] = true;
        }

        let mut picked: Vec<usize> = Vec::with_capacity(self.limit);
        'neighbors: for neighbor in neighbors.iter().filter(|n| n.distance < 1.0) {
            for place in matrix.places_liked_by(neighbor.index) {
                if picked.len() == self.limit {
                    break 'neighbors;
                }
                if !liked[place] && !picked.contains(&place) {
                    picked.push(place);
                }
            }
        }

        if !picked.is_empty() {
            tracing::debug!("Recommending {} places to {} from neighbors", picked.len(), user);
            return Ok(Recommendations {
                user: user.to_string(),
                places: picked.into_iter().map(|p| matrix.place_ids()[p].clone()).collect(),
                source: RecommendationSource::Neighbors,
            });
        }

        if liked.iter().all(|l| *l) {
            return Err(PlacesError::ColdStart(format!("user '{}' has liked every place", user)));
        }

        for _ in 0..self.fallback_max_attempts {
            let place = rng.gen_range(0..matrix.n_places());
            if !liked[place] {
                tracing::warn!("⚠️ No neighbor candidates for {}, using random fallback", user);
                return Ok(Recommendations {
                    user: user.to_string(),
                    places: vec![matrix.place_ids()[place].clone()],
                    source: RecommendationSource::Fallback,
                });
            }
        }

        Err(PlacesError::ColdStart(format!(
            "no unliked place drawn for '{}' after {} attempts",
            user, self.fallback_max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Corpus, Like, Place};
    use crate::recommend::InteractionModelBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn place_ids(n: usize) -> Vec<Place> {
        (1..=n).map(|i| Place::new(format!("p{}", i), "", "")).collect()
    }

    fn model(users: &[&str], places: usize, likes: &[(&str, &str)]) -> InteractionModel {
        let corpus = Corpus::new(
            users.iter().map(|u| u.to_string()).collect(),
            place_ids(places),
            likes.iter().map(|(u, p)| Like::new(*u, *p)).collect(),
        );
        InteractionModelBuilder::default().build(&corpus).unwrap()
    }

    #[test]
    fn test_recommends_neighbor_likes_not_already_liked() {
        let m = model(
            &["alice", "bob", "carol"],
            4,
            &[
                ("alice", "p1"),
                ("bob", "p1"),
                ("bob", "p2"),
                ("bob", "p3"),
                ("carol", "p4"),
            ],
        );

        let recs = CollaborativeFilter::default().recommend(&m, "alice").unwrap();
        assert_eq!(recs.source, RecommendationSource::Neighbors);
        assert_eq!(recs.places, vec!["p2", "p3"]);
        assert!(!recs.places.contains(&"p1".to_string()));
    }

    #[test]
    fn test_limit_respected() {
        let extra: Vec<String> = (2..=9).map(|i| format!("p{}", i)).collect();
        let mut likes = vec![("alice", "p1"), ("bob", "p1")];
        for p in &extra {
            likes.push(("bob", p.as_str()));
        }
        let m = model(&["alice", "bob"], 9, &likes);

        let recs = CollaborativeFilter::default().recommend(&m, "alice").unwrap();
        assert_eq!(recs.places.len(), 5);
        assert_eq!(recs.places, vec!["p2", "p3", "p4", "p5", "p6"]);
    }

    #[test]
    fn test_cold_start_user_gets_one_random_place() {
        let m = model(&["alice", "bob", "newbie"], 3, &[("alice", "p1"), ("bob", "p1")]);
        let mut rng = StdRng::seed_from_u64(7);

        let recs = CollaborativeFilter::default()
            .recommend_with_rng(&m, "newbie", &mut rng)
            .unwrap();
        assert_eq!(recs.source, RecommendationSource::Fallback);
        assert_eq!(recs.places.len(), 1);
    }

    #[test]
    fn test_fallback_skips_liked_places() {
        let m = model(&["solo"], 3, &[("solo", "p1"), ("solo", "p2")]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let recs = CollaborativeFilter::new(5, 1000)
                .recommend_with_rng(&m, "solo", &mut rng)
                .unwrap();
            assert_eq!(recs.places, vec!["p3"]);
        }
    }

    #[test]
    fn test_user_who_liked_everything_is_cold_start() {
        let m = model(&["fan"], 2, &[("fan", "p1"), ("fan", "p2")]);
        let err = CollaborativeFilter::default().recommend(&m, "fan").unwrap_err();
        assert!(matches!(err, PlacesError::ColdStart(_)));
    }

    #[test]
    fn test_zero_attempts_fails_with_cold_start() {
        let m = model(&["newbie"], 2, &[]);
        let err = CollaborativeFilter::new(5, 0).recommend(&m, "newbie").unwrap_err();
        assert!(matches!(err, PlacesError::ColdStart(_)));
    }

    #[test]
    fn test_unknown_user() {
        let m = model(&["alice"], 1, &[]);
        let err = CollaborativeFilter::default().recommend(&m, "mallory").unwrap_err();
        assert!(matches!(err, PlacesError::NotFound { kind: "user", .. }));
    }

    #[test]
    fn test_empty_place_set() {
        let m = model(&["alice"], 0, &[]);
        let err = CollaborativeFilter::default().recommend(&m, "alice").unwrap_err();
        assert!(matches!(err, PlacesError::EmptyCorpus(_)));
    }
}
