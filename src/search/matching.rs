use std::collections::HashSet;

use crate::error::{PlacesError, Result};
use crate::search::{sort_descending, ScoredPlace, Searcher, TextIndex};

/// Matching-score retrieval: a place scores the sum of its TF-IDF weights for
/// the tokens present in the query. Places matching no query token are left out.
#[derive(Debug, Clone, Default)]
pub struct MatchScoreSearcher;

impl MatchScoreSearcher {
    pub fn new() -> Self {
        Self
    }
}

impl Searcher for MatchScoreSearcher {
    fn search(&self, index: &TextIndex, tokens: &[String], limit: usize) -> Result<Vec<ScoredPlace>> {
        if index.is_empty() {
            return Err(PlacesError::EmptyCorpus("matching-score search over zero places".to_string()));
        }

        let query: HashSet<usize> = tokens
            .iter()
            .filter_map(|t| index.vocabulary().position(t))
            .collect();

        let mut scored: Vec<ScoredPlace> = index
            .place_ids()
            .iter()
            .enumerate()
            .filter_map(|(doc, id)| {
                let mut matched = false;
                let score: f64 = index
                    .weights_at(doc)
                    .iter()
                    .filter(|(pos, _)| query.contains(pos))
                    .inspect(|_| matched = true)
                    .map(|(_, w)| w)
                    .sum();
                matched.then(|| ScoredPlace::new(id.clone(), score))
            })
            .collect();

        sort_descending(&mut scored);
        scored.truncate(limit);

        Ok(scored)
    }

    fn name(&self) -> &str {
        "matching-score"
    }
}
