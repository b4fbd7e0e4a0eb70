use rust_stemmers::{Algorithm, Stemmer};

use crate::text::{stopwords, Normalizer, PartOfSpeech};

/// Snowball-stemming normalizer.
///
/// No tagger: every non-numeric token counts as a noun and is reduced with
/// the configured Snowball algorithm. Cheaper and language-agnostic, at the
/// cost of producing stems ("museum" → "museum", "dancing" → "danc") rather
/// than dictionary lemmas.
pub struct StemmingNormalizer {
    stemmer: Stemmer,
    name: &'static str,
}

impl StemmingNormalizer {
    pub fn english() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            name: "snowball-en",
        }
    }

    pub fn spanish() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::Spanish),
            name: "snowball-es",
        }
    }
}

impl Normalizer for StemmingNormalizer {
    fn is_stopword(&self, token: &str) -> bool {
        stopwords::is_stopword(token)
    }

    fn tag(&self, token: &str) -> Option<PartOfSpeech> {
        if token.chars().all(|c| c.is_numeric()) {
            None
        } else {
            Some(PartOfSpeech::Noun)
        }
    }

    fn lemmatize(&self, token: &str, _pos: PartOfSpeech) -> String {
        self.stemmer.stem(token).into_owned()
    }

    fn name(&self) -> &str {
        self.name
    }
}
