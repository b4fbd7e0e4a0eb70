//! Rule-based part-of-speech tagger and lemmatizer.
//!
//! Tagging works on single lowercased tokens: closed-class words and numbers
//! are rejected, a handful of lexicons catch frequent irregular forms, and
//! suffix rules decide between verb, adverb and adjective. Everything else is
//! a noun, which is also what a statistical tagger falls back to for unknown
//! (e.g. Spanish) words.
//!
//! Lemmatization mirrors WordNet's detachment rules without a dictionary
//! lookup, plus exception tables for irregular nouns and verbs.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::text::{stopwords, Normalizer, PartOfSpeech};

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand", "million",
    "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez", "cien", "mil",
];

/// Function words that survive the stopword lists but are not open-class
const CLOSED_CLASS: &[&str] = &[
    "would", "could", "might", "must", "shall", "may", "upon", "within", "without", "among",
    "per", "via", "yet", "though", "although", "unless", "whether", "every", "either",
    "neither", "another", "many", "much", "several", "whose", "whatever", "whenever",
    "aunque", "según", "cada", "mediante", "hacia", "bajo", "tras", "cuyo", "cuya", "cuyos",
    "cuyas", "mientras", "pues",
];

const ADVERBS: &[&str] = &[
    "always", "never", "often", "also", "still", "even", "already", "soon", "almost", "quite",
    "rather", "perhaps", "together", "away", "back", "ever", "far", "later", "however",
    "sometimes", "everywhere", "nearby", "downtown", "abroad", "outside", "inside", "tonight",
    "today", "tomorrow", "yesterday",
];

const ADJECTIVES: &[&str] = &[
    "good", "great", "new", "old", "big", "small", "best", "better", "nice", "cozy", "cosy",
    "cheap", "quiet", "fresh", "local", "hot", "cold", "warm", "cool", "modern", "ancient",
    "little", "large", "long", "high", "young", "free", "full", "public", "private", "main",
    "real", "top", "historic", "organic", "classic", "traditional", "typical", "vegan",
    "authentic", "delicious", "rich", "busy", "calm", "wild", "green", "blue", "red", "white",
    "black", "golden",
];

/// `-ly` words that are not adverbs
const LY_NOUNS: &[&str] = &[
    "family", "italy", "july", "supply", "reply", "ally", "belly", "jelly", "rally", "lily",
    "holly", "assembly", "anomaly", "monopoly", "butterfly", "dragonfly",
];

const LY_ADJECTIVES: &[&str] = &[
    "friendly", "lovely", "lively", "lonely", "daily", "weekly", "monthly", "yearly", "early",
    "ugly", "costly", "elderly", "likely", "silly", "holy", "deadly", "curly", "chilly",
    "family-friendly",
];

const ING_NOUNS: &[&str] = &[
    "morning", "evening", "building", "ceiling", "wedding", "pudding", "clothing", "dumpling",
    "sibling", "darling", "everything", "something", "nothing", "anything", "beijing",
];

const ED_NON_VERBS: &[&str] = &["hundred", "sacred", "naked", "wicked", "speed", "breed"];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical", "ish"];

const VERB_SUFFIXES: &[&str] = &["ize", "ify"];

const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"), ("men", "man"), ("women", "woman"), ("feet", "foot"),
    ("teeth", "tooth"), ("mice", "mouse"), ("geese", "goose"), ("oxen", "ox"),
    ("wolves", "wolf"), ("knives", "knife"), ("leaves", "leaf"), ("lives", "life"),
    ("wives", "wife"), ("shelves", "shelf"), ("halves", "half"), ("loaves", "loaf"),
    ("thieves", "thief"), ("people", "people"), ("series", "series"), ("species", "species"),
];

const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("went", "go"), ("gone", "go"), ("ate", "eat"), ("eaten", "eat"), ("made", "make"),
    ("took", "take"), ("taken", "take"), ("found", "find"), ("built", "build"),
    ("brought", "bring"), ("bought", "buy"), ("sold", "sell"), ("told", "tell"),
    ("thought", "think"), ("saw", "see"), ("seen", "see"), ("ran", "run"), ("gave", "give"),
    ("given", "give"), ("came", "come"), ("got", "get"), ("gotten", "get"), ("left", "leave"),
    ("felt", "feel"), ("kept", "keep"), ("met", "meet"), ("paid", "pay"), ("sat", "sit"),
    ("stood", "stand"), ("wrote", "write"), ("written", "write"), ("drank", "drink"),
    ("drunk", "drink"), ("swam", "swim"), ("sang", "sing"), ("began", "begin"),
    ("begun", "begin"), ("chose", "choose"), ("chosen", "choose"), ("knew", "know"),
    ("known", "know"), ("grew", "grow"), ("grown", "grow"), ("drove", "drive"),
    ("driven", "drive"), ("rode", "ride"), ("ridden", "ride"), ("spent", "spend"),
    ("lost", "lose"), ("heard", "hear"), ("held", "hold"), ("led", "lead"), ("said", "say"),
    ("sent", "send"), ("slept", "sleep"), ("taught", "teach"), ("caught", "catch"),
    ("understood", "understand"), ("woke", "wake"), ("broke", "break"), ("broken", "break"),
    ("spoke", "speak"), ("spoken", "speak"), ("fell", "fall"), ("fallen", "fall"),
    ("flew", "fly"), ("flown", "fly"), ("threw", "throw"), ("thrown", "throw"),
    ("wore", "wear"), ("worn", "wear"),
];

struct Lexicon {
    numbers: HashSet<&'static str>,
    closed: HashSet<&'static str>,
    adverbs: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
    ly_nouns: HashSet<&'static str>,
    ly_adjectives: HashSet<&'static str>,
    ing_nouns: HashSet<&'static str>,
    ed_non_verbs: HashSet<&'static str>,
    nouns: HashMap<&'static str, &'static str>,
    verbs: HashMap<&'static str, &'static str>,
}

fn lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(|| Lexicon {
        numbers: NUMBER_WORDS.iter().copied().collect(),
        closed: CLOSED_CLASS.iter().copied().collect(),
        adverbs: ADVERBS.iter().copied().collect(),
        adjectives: ADJECTIVES.iter().copied().collect(),
        ly_nouns: LY_NOUNS.iter().copied().collect(),
        ly_adjectives: LY_ADJECTIVES.iter().copied().collect(),
        ing_nouns: ING_NOUNS.iter().copied().collect(),
        ed_non_verbs: ED_NON_VERBS.iter().copied().collect(),
        nouns: NOUN_EXCEPTIONS.iter().copied().collect(),
        verbs: VERB_EXCEPTIONS.iter().copied().collect(),
    })
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'á' | 'é' | 'í' | 'ó' | 'ú')
}

fn is_consonant(c: char) -> bool {
    c.is_alphabetic() && !is_vowel(c)
}

/// Rule-based tagger + lemmatizer over the bilingual stopword lists
#[derive(Debug, Clone, Default)]
pub struct LexicalNormalizer;

impl LexicalNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn lemmatize_noun(token: &str) -> String {
        if let Some(base) = lexicon().nouns.get(token) {
            return base.to_string();
        }
        if token.chars().count() <= 3 {
            return token.to_string();
        }
        if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
            return token.to_string();
        }
        if token.len() > 4 && token.ends_with("ies") {
            return format!("{}y", &token[..token.len() - 3]);
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if token.ends_with(suffix) {
                return token[..token.len() - 2].to_string();
            }
        }
        if let Some(stem) = token.strip_suffix('s') {
            return stem.to_string();
        }
        token.to_string()
    }

    fn lemmatize_verb(token: &str) -> String {
        if let Some(base) = lexicon().verbs.get(token) {
            return base.to_string();
        }
        if token.len() > 4 && (token.ends_with("ies") || token.ends_with("ied")) {
            return format!("{}y", &token[..token.len() - 3]);
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if token.ends_with(suffix) {
                return token[..token.len() - 2].to_string();
            }
        }
        if let Some(stem) = token.strip_suffix("ing") {
            return Self::restore_stem(token, stem);
        }
        if let Some(stem) = token.strip_suffix("ed") {
            return Self::restore_stem(token, stem);
        }
        if !token.ends_with("ss") {
            if let Some(stem) = token.strip_suffix('s') {
                return stem.to_string();
            }
        }
        token.to_string()
    }

    fn lemmatize_adjective(token: &str) -> String {
        if token.chars().count() > 5 {
            if let Some(stem) = token.strip_suffix("iest").or_else(|| token.strip_suffix("ier")) {
                return format!("{}y", stem);
            }
        }
        token.to_string()
    }

    /// Undo consonant doubling or restore a dropped final `e` after removing -ing/-ed
    fn restore_stem(token: &str, stem: &str) -> String {
        let chars: Vec<char> = stem.chars().collect();
        let n = chars.len();
        if n < 2 {
            return token.to_string();
        }

        let last = chars[n - 1];
        let prev = chars[n - 2];

        if last == prev && is_consonant(last) && !matches!(last, 'l' | 's' | 'z' | 'f') {
            return chars[..n - 1].iter().collect();
        }

        let needs_e = match last {
            'v' | 'c' => true,
            'z' => is_vowel(prev),
            'g' => matches!(prev, 'r' | 'd'),
            't' => prev == 'a' && n > 4 && is_consonant(chars[n - 3]),
            'r' => matches!(prev, 'o' | 'u' | 'i') && n > 3 && is_consonant(chars[n - 3]),
            's' => is_vowel(prev) && n >= 3,
            _ => false,
        } || (n == 2 && is_vowel(prev) && is_consonant(last))
            || (n == 3
                && is_consonant(chars[0])
                && is_vowel(chars[1])
                && is_consonant(last)
                && !matches!(last, 'w' | 'x' | 'y'));

        if needs_e {
            format!("{}e", stem)
        } else {
            stem.to_string()
        }
    }
}

impl Normalizer for LexicalNormalizer {
    fn is_stopword(&self, token: &str) -> bool {
        stopwords::is_stopword(token)
    }

    fn tag(&self, token: &str) -> Option<PartOfSpeech> {
        let lex = lexicon();
        let len = token.chars().count();

        if token.chars().all(|c| c.is_numeric() || c == ',') || lex.numbers.contains(token) {
            return None;
        }
        if lex.closed.contains(token) {
            return None;
        }
        if lex.verbs.contains_key(token) {
            return Some(PartOfSpeech::Verb);
        }
        if lex.adverbs.contains(token) {
            return Some(PartOfSpeech::Adverb);
        }
        if lex.adjectives.contains(token) || lex.ly_adjectives.contains(token) {
            return Some(PartOfSpeech::Adjective);
        }
        if lex.nouns.contains_key(token) || lex.ly_nouns.contains(token) || lex.ing_nouns.contains(token) {
            return Some(PartOfSpeech::Noun);
        }

        if len > 6 && token.ends_with("mente") {
            return Some(PartOfSpeech::Adverb);
        }
        if len > 4 && token.ends_with("ly") {
            return Some(PartOfSpeech::Adverb);
        }
        if len > 5 && token.ends_with("ing") {
            return Some(PartOfSpeech::Verb);
        }
        if len > 4 && token.ends_with("ed") && !lex.ed_non_verbs.contains(token) {
            return Some(PartOfSpeech::Verb);
        }
        if len > 5 && VERB_SUFFIXES.iter().any(|s| token.ends_with(s)) {
            return Some(PartOfSpeech::Verb);
        }
        if len > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| token.ends_with(s)) {
            return Some(PartOfSpeech::Adjective);
        }

        Some(PartOfSpeech::Noun)
    }

    fn lemmatize(&self, token: &str, pos: PartOfSpeech) -> String {
        match pos {
            PartOfSpeech::Noun => Self::lemmatize_noun(token),
            PartOfSpeech::Verb => Self::lemmatize_verb(token),
            PartOfSpeech::Adjective => Self::lemmatize_adjective(token),
            PartOfSpeech::Adverb => token.to_string(),
        }
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
