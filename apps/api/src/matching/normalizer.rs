//! Text normalizer. Turns raw résumé text into `(surface, lemma)` content tokens.
//!
//! Pure and deterministic for a given [`Lexicon`]: whitespace split, strip
//! everything that is not a word character, lower-case, lemmatize, then drop
//! stopwords, punctuation-only, empty and all-digit tokens.
//!
//! Lemmas come from the Snowball English stemmer, so they are matching keys
//! rather than dictionary words: "managing" becomes "manag" and "experience"
//! becomes "experi". That suits the trigram hash backend. Backends that model
//! whole words report [`Embedder::prefers_surface_forms`] and the semantic
//! index embeds `surface` for them instead.
//!
//! [`Embedder::prefers_surface_forms`]: crate::matching::embedding::Embedder::prefers_surface_forms

use std::collections::HashSet;
use std::fmt;

use rust_stemmers::{Algorithm, Stemmer};

/// A content token surviving normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lower-cased form as it appears in the document.
    pub surface: String,
    /// Snowball stem, the inflection-free key embedded by sub-word backends.
    pub lemma: String,
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Stopword table plus lemmatizer. Constructed once and shared by the engine.
pub struct Lexicon {
    stopwords: HashSet<&'static str>,
    stemmer: Stemmer,
}

impl Lexicon {
    pub fn english() -> Self {
        Self {
            stopwords: ENGLISH_STOPWORDS.iter().copied().collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn lemma(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }

    /// Normalizes `text` into the ordered sequence of content tokens.
    pub fn normalize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .filter_map(|raw| {
                let surface = strip_non_word(&raw.to_lowercase());
                if surface.is_empty()
                    || is_punctuation(&surface)
                    || is_digits(&surface)
                    || self.is_stopword(&surface)
                {
                    return None;
                }
                let lemma = self.lemma(&surface);
                Some(Token { surface, lemma })
            })
            .collect()
    }
}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicon")
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

/// Keeps letters, digits and underscores; everything else is dropped.
fn strip_non_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn is_punctuation(token: &str) -> bool {
    token.chars().all(|c| c == '_')
}

fn is_digits(token: &str) -> bool {
    token.chars().all(|c| c.is_numeric())
}
