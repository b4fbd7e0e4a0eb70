use crate::error::{PlacesError, Result};
use crate::search::{sort_descending, ScoredPlace, Searcher, TextIndex};

/// Dot product over the Euclidean norms; 0 when either vector has zero norm.
///
/// Vectors of different lengths are compared over their common prefix.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| (dot + x * y, na + x * x, nb + y * y));

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Brute-force cosine ranking of every document vector against the query vector
#[derive(Debug, Clone, Default)]
pub struct CosineSearcher;

impl CosineSearcher {
    pub fn new() -> Self {
        Self
    }
}

impl Searcher for CosineSearcher {
    fn search(&self, index: &TextIndex, tokens: &[String], limit: usize) -> Result<Vec<ScoredPlace>> {
        if index.is_empty() {
            return Err(PlacesError::EmptyCorpus("cosine search over zero places".to_string()));
        }

        let query = index.query_vector(tokens);

        let mut scored: Vec<ScoredPlace> = index
            .documents()
            .map(|(id, doc)| ScoredPlace::new(id.clone(), cosine_similarity(&query, doc)))
            .collect();

        sort_descending(&mut scored);
        scored.truncate(limit);

        Ok(scored)
    }

    fn name(&self) -> &str {
        "cosine"
    }
}
