//! English and Spanish stopword lists.
//!
//! Both lists are the NLTK corpora shipped by the `stop-words` crate, lowercased.
//! Membership is tested on the lowercased token *before* punctuation stripping.

use std::collections::HashSet;
use std::sync::OnceLock;
use stop_words::{get, LANGUAGE};

fn bilingual_set() -> &'static HashSet<String> {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    SET.get_or_init(|| {
        [LANGUAGE::English, LANGUAGE::Spanish]
            .into_iter()
            .flat_map(|language| get(language).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>())
            .collect()
    })
}

/// True if `token` (already lowercased) is an English or Spanish stopword
pub fn is_stopword(token: &str) -> bool {
    bilingual_set().contains(token)
}
