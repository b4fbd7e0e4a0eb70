use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::text::{LexicalNormalizer, Normalizer, NormalizerKind, StemmingNormalizer};

/// Characters removed from every surviving token
pub const PUNCTUATION: &str = "!\"#$%&()*+-./:;<=>?@[\\]^_`{|}~\n'";

/// Deterministic text → token pipeline:
///
/// 1. NFC-normalize and split on Unicode word boundaries
/// 2. lowercase
/// 3. drop English/Spanish stopwords
/// 4. strip [`PUNCTUATION`]
/// 5. drop tokens of one character or less
/// 6. tag, dropping anything that is not an adjective/verb/noun/adverb
/// 7. lemmatize to the tagged part of speech
///
/// Output keeps input order and duplicates (term frequency depends on them).
#[derive(Clone)]
pub struct Preprocessor {
    normalizer: Arc<dyn Normalizer>,
}

impl Preprocessor {
    pub fn new(normalizer: Arc<dyn Normalizer>) -> Self {
        Self { normalizer }
    }

    pub fn from_kind(kind: NormalizerKind) -> Self {
        match kind {
            NormalizerKind::Lexical => Self::new(Arc::new(LexicalNormalizer::new())),
            NormalizerKind::Stemming => Self::new(Arc::new(StemmingNormalizer::english())),
        }
    }

    pub fn normalizer_name(&self) -> &str {
        self.normalizer.name()
    }

    pub fn preprocess(&self, text: &str) -> Vec<String> {
        let text: String = text.nfc().collect();

        text.unicode_words()
            .filter_map(|word| self.normalize_token(word))
            .collect()
    }

    fn normalize_token(&self, word: &str) -> Option<String> {
        // stopword lists spell contractions with the ASCII apostrophe
        let lower = word.to_lowercase().replace('\u{2019}', "'");

        if self.normalizer.is_stopword(&lower) {
            return None;
        }

        let stripped: String = lower.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();
        if stripped.chars().count() <= 1 {
            return None;
        }

        let pos = self.normalizer.tag(&stripped)?;
        Some(self.normalizer.lemmatize(&stripped, pos))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_kind(NormalizerKind::default())
    }
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("normalizer", &self.normalizer.name())
            .finish()
    }
}
