pub mod lexical;
pub mod preprocess;
pub mod stemming;
pub mod stopwords;

use serde::{Deserialize, Serialize};

pub use lexical::LexicalNormalizer;
pub use preprocess::{Preprocessor, PUNCTUATION};
pub use stemming::StemmingNormalizer;

/// Open word classes kept by the preprocessor; every other class is discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Adjective,
    Verb,
    Noun,
    Adverb,
}

/// Linguistic resources used by the preprocessor (stopwords, tagger, lemmatizer).
///
/// Implementations must be pure: the same token always yields the same answer.
pub trait Normalizer: Send + Sync {
    /// True if the lowercased token should be dropped before any other step
    fn is_stopword(&self, token: &str) -> bool;

    /// Part-of-speech tag for a lowercased, punctuation-free token.
    /// `None` means the token is not an adjective, verb, noun or adverb.
    fn tag(&self, token: &str) -> Option<PartOfSpeech>;

    /// Reduce `token` to its base form for the given part of speech
    fn lemmatize(&self, token: &str, pos: PartOfSpeech) -> String;

    /// Get normalizer name for logging
    fn name(&self) -> &str;
}

/// Which built-in normalizer the engine should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    /// Rule-based tagger + lemmatizer
    #[default]
    Lexical,
    /// Snowball stemming (English)
    Stemming,
}

impl NormalizerKind {
    /// Name reported by the normalizer this kind builds
    pub fn normalizer_name(&self) -> &'static str {
        match self {
            NormalizerKind::Lexical => "lexical",
            NormalizerKind::Stemming => "snowball-en",
        }
    }

    /// Built-in kind whose normalizer reports `name`
    pub fn from_normalizer_name(name: &str) -> Option<Self> {
        [NormalizerKind::Lexical, NormalizerKind::Stemming]
            .into_iter()
            .find(|kind| kind.normalizer_name() == name)
    }
}
