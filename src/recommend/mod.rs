pub mod collaborative;
pub mod knn;
pub mod matrix;
pub mod model;
pub mod promotion;

pub use collaborative::{
    CollaborativeFilter, RecommendationSource, Recommendations, DEFAULT_FALLBACK_ATTEMPTS,
    DEFAULT_RECOMMEND_LIMIT,
};
pub use knn::{cosine_distance, Neighbor, NeighborIndex, NeighborIndexBuilder};
pub use matrix::InteractionMatrix;
pub use model::{InteractionModel, InteractionModelBuilder, DEFAULT_PLACE_NEIGHBORS, DEFAULT_USER_NEIGHBORS};
pub use promotion::{PromotionPlan, PromotionRanker, UserAffinity, DEFAULT_PROMOTION_LIMIT};
