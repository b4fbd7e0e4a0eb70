use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::core::{Place, PlaceId};
use crate::error::{PlacesError, Result};
use crate::search::Vocabulary;
use crate::text::Preprocessor;

/// Share of a token's weight coming from the description; names get `1 - ALPHA`
pub const DEFAULT_TITLE_ALPHA: f64 = 0.3;

/// `ln(N / (df + 1))`.
///
/// Negative for tokens present in every document; callers keep the sign.
pub fn inverse_document_frequency(corpus_size: usize, doc_freq: u32) -> f64 {
    (corpus_size as f64 / (doc_freq as f64 + 1.0)).ln()
}

/// Builds a [`TextIndex`] from the place corpus
#[derive(Debug, Clone)]
pub struct TextIndexBuilder {
    preprocessor: Preprocessor,
    alpha: f64,
}

impl TextIndexBuilder {
    pub fn new(preprocessor: Preprocessor) -> Self {
        Self {
            preprocessor,
            alpha: DEFAULT_TITLE_ALPHA,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn build(&self, places: &[Place]) -> Result<TextIndex> {
        let start = Instant::now();

        let mut seen = HashSet::with_capacity(places.len());
        for place in places {
            if !seen.insert(place.id.as_str()) {
                return Err(PlacesError::InconsistentCorpus(format!(
                    "duplicate place id '{}'",
                    place.id
                )));
            }
        }

        let fields: Vec<(Vec<String>, Vec<String>)> = places
            .iter()
            .map(|p| {
                (
                    self.preprocessor.preprocess(&p.name),
                    self.preprocessor.preprocess(&p.description),
                )
            })
            .collect();

        let vocabulary =
            Vocabulary::from_documents(fields.iter().map(|(name, desc)| name.iter().chain(desc.iter())));
        let n = places.len();

        let weights: Vec<Vec<(usize, f64)>> = fields
            .iter()
            .map(|(name, desc)| {
                let mut row: HashMap<usize, f64> = HashMap::new();
                add_field_weights(&mut row, desc, &vocabulary, n, self.alpha);
                add_field_weights(&mut row, name, &vocabulary, n, 1.0 - self.alpha);
                let mut row: Vec<(usize, f64)> = row.into_iter().collect();
                row.sort_by_key(|(pos, _)| *pos);
                row
            })
            .collect();

        let vectors: Vec<Vec<f64>> = weights
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; vocabulary.len()];
                for &(pos, w) in row {
                    dense[pos] = w;
                }
                dense
            })
            .collect();

        tracing::info!(
            "Text index built: {} places, {} terms in {:.1}ms",
            n,
            vocabulary.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(TextIndex {
            place_ids: places.iter().map(|p| p.id.clone()).collect(),
            vocabulary,
            weights,
            vectors,
            alpha: self.alpha,
            normalizer: self.preprocessor.normalizer_name().to_string(),
            built_at: Utc::now(),
        })
    }
}

/// Add `tf * idf * field_weight` for every distinct token of one field.
///
/// `tf` is normalised by the field's own token count; an empty field adds nothing.
fn add_field_weights(
    row: &mut HashMap<usize, f64>,
    tokens: &[String],
    vocabulary: &Vocabulary,
    corpus_size: usize,
    field_weight: f64,
) {
    if tokens.is_empty() {
        return;
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for token in tokens {
        if let Some(pos) = vocabulary.position(token) {
            *counts.entry(pos).or_insert(0) += 1;
        }
    }

    let len = tokens.len() as f64;
    for (pos, count) in counts {
        let tf = count as f64 / len;
        let idf = inverse_document_frequency(corpus_size, vocabulary.doc_freq_at(pos));
        *row.entry(pos).or_insert(0.0) += tf * idf * field_weight;
    }
}

/// Immutable vector-space index over the place corpus.
///
/// Holds the vocabulary, the sparse TF-IDF weight table (only tokens that
/// occur in a place) and the dense per-place document vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextIndex {
    place_ids: Vec<PlaceId>,
    vocabulary: Vocabulary,
    weights: Vec<Vec<(usize, f64)>>,
    vectors: Vec<Vec<f64>>,
    alpha: f64,
    normalizer: String,
    built_at: DateTime<Utc>,
}

impl TextIndex {
    /// Number of places (N)
    pub fn len(&self) -> usize {
        self.place_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.place_ids.is_empty()
    }

    pub fn place_ids(&self) -> &[PlaceId] {
        &self.place_ids
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Name of the normalizer the index was built with
    pub fn normalizer(&self) -> &str {
        &self.normalizer
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn idf(&self, term: &str) -> f64 {
        inverse_document_frequency(self.len(), self.vocabulary.doc_freq(term))
    }

    /// TF-IDF weight of `term` in `place_id`; `None` if the term does not occur there
    pub fn weight(&self, place_id: &str, term: &str) -> Option<f64> {
        let doc = self.place_ids.iter().position(|id| id == place_id)?;
        let pos = self.vocabulary.position(term)?;
        self.weights[doc]
            .binary_search_by_key(&pos, |(p, _)| *p)
            .ok()
            .map(|i| self.weights[doc][i].1)
    }

    /// Sparse `(coordinate, weight)` row of document `doc`
    pub fn weights_at(&self, doc: usize) -> &[(usize, f64)] {
        &self.weights[doc]
    }

    /// Dense document vector of document `doc`
    pub fn vector_at(&self, doc: usize) -> &[f64] {
        &self.vectors[doc]
    }

    pub fn documents(&self) -> impl Iterator<Item = (&PlaceId, &[f64])> {
        self.place_ids.iter().zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Dense query vector over the index vocabulary.
    ///
    /// `tf` is the token count divided by the vocabulary size (not the query
    /// length); tokens outside the vocabulary are ignored.
    pub fn query_vector(&self, tokens: &[String]) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        let vocab_size = self.vocabulary.len() as f64;

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in tokens {
            if let Some(pos) = self.vocabulary.position(token) {
                *counts.entry(pos).or_insert(0) += 1;
            }
        }

        for (pos, count) in counts {
            let tf = count as f64 / vocab_size;
            let idf = inverse_document_frequency(self.len(), self.vocabulary.doc_freq_at(pos));
            vector[pos] = tf * idf;
        }

        vector
    }
}
