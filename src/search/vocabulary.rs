use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Corpus vocabulary with document frequencies.
///
/// Term order is first-seen order over the corpus (places in corpus order,
/// name tokens before description tokens) and doubles as the coordinate
/// order of every document and query vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VocabularyParts", into = "VocabularyParts")]
pub struct Vocabulary {
    terms: Vec<String>,
    doc_freq: Vec<u32>,
    positions: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyParts {
    terms: Vec<String>,
    doc_freq: Vec<u32>,
}

impl From<VocabularyParts> for Vocabulary {
    fn from(parts: VocabularyParts) -> Self {
        let positions = parts
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self {
            terms: parts.terms,
            doc_freq: parts.doc_freq,
            positions,
        }
    }
}

impl From<Vocabulary> for VocabularyParts {
    fn from(vocab: Vocabulary) -> Self {
        Self {
            terms: vocab.terms,
            doc_freq: vocab.doc_freq,
        }
    }
}

impl Vocabulary {
    /// Count document frequencies over per-document token lists.
    ///
    /// Each document contributes at most 1 to a term's frequency.
    pub fn from_documents<'a, I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = &'a String>,
    {
        let mut vocab = Self::default();
        let mut last_seen_in: Vec<usize> = Vec::new();

        for (doc, tokens) in documents.into_iter().enumerate() {
            for token in tokens {
                let pos = match vocab.positions.get(token) {
                    Some(&pos) => pos,
                    None => {
                        let pos = vocab.terms.len();
                        vocab.terms.push(token.clone());
                        vocab.doc_freq.push(0);
                        vocab.positions.insert(token.clone(), pos);
                        last_seen_in.push(usize::MAX);
                        pos
                    }
                };
                if last_seen_in[pos] != doc {
                    last_seen_in[pos] = doc;
                    vocab.doc_freq[pos] += 1;
                }
            }
        }

        vocab
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coordinate of `term`, if it was seen in the corpus
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    /// Document frequency; 0 for unseen terms
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.position(term).map(|p| self.doc_freq[p]).unwrap_or(0)
    }

    pub fn doc_freq_at(&self, position: usize) -> u32 {
        self.doc_freq[position]
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Terms paired with their document frequency, in coordinate order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.terms.iter().map(String::as_str).zip(self.doc_freq.iter().copied())
    }
}
