pub mod corpus;
pub mod place;

pub use corpus::Corpus;
pub use place::{Like, Place, PlaceId, UserId};
