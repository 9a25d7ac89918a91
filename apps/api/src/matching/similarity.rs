//! Semantic similarity index over one document's content tokens.
//!
//! Built once per résumé: every surviving lemma is embedded in a single batch.
//! Queries embed only the query word and compare it against the cached vectors.

use std::sync::Arc;

use tracing::debug;

use crate::matching::embedding::{cosine_similarity, Embedder, EmbeddingError};
use crate::matching::normalizer::{Lexicon, Token};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// A token of the indexed document together with its lemma embedding.
struct IndexedToken {
    token: Token,
    vector: Vec<f32>,
}

pub struct SemanticIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<IndexedToken>,
}

impl SemanticIndex {
    /// Normalizes `text` and embeds its lemmas. Empty or stopword-only text
    /// produces an empty index, not an error.
    pub fn build(
        text: &str,
        lexicon: &Lexicon,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, EmbeddingError> {
        let tokens = lexicon.normalize(text);
        Self::from_tokens(tokens, embedder)
    }

    pub fn from_tokens(
        tokens: Vec<Token>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, EmbeddingError> {
        if tokens.is_empty() {
            return Ok(Self {
                embedder,
                entries: Vec::new(),
            });
        }

        let surface_forms = embedder.prefers_surface_forms();
        let texts: Vec<String> = tokens
            .iter()
            .map(|t| if surface_forms { t.surface.clone() } else { t.lemma.clone() })
            .collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != tokens.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: tokens.len(),
                got: vectors.len(),
            });
        }

        debug!(
            tokens = tokens.len(),
            embedder = embedder.name(),
            dimension = embedder.dimension(),
            surface_forms,
            "semantic index built"
        );

        let entries = tokens
            .into_iter()
            .zip(vectors)
            .map(|(token, vector)| IndexedToken { token, vector })
            .collect();

        Ok(Self { embedder, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Surface forms of indexed tokens whose similarity to `word` is at least
    /// `threshold`, most similar first. Ties keep document order.
    pub fn find_synonyms(&self, word: &str, threshold: f32) -> Result<Vec<String>, EmbeddingError> {
        Ok(self
            .ranked(word)?
            .into_iter()
            .take_while(|(_, sim)| *sim >= threshold)
            .map(|(idx, _)| self.entries[idx].token.surface.clone())
            .collect())
    }

    /// True when at least one indexed token reaches `threshold`.
    pub fn has_synonym(&self, word: &str, threshold: f32) -> Result<bool, EmbeddingError> {
        Ok(self
            .ranked(word)?
            .first()
            .map_or(false, |(_, sim)| *sim >= threshold))
    }

    /// (entry index, similarity) sorted by similarity descending; stable, so
    /// equal similarities stay in document order.
    fn ranked(&self, word: &str) -> Result<Vec<(usize, f32)>, EmbeddingError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(word)?;
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(&query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use super::*;

    /// Embeds words through a fixed synonym table: every word of group `i`
    /// maps to the unit vector `e_i`, unknown words map to the zero vector.
    /// Also counts batch calls so tests can check index amortisation.
    pub struct TableEmbedder {
        groups: HashMap<String, usize>,
        dimension: usize,
        pub batch_calls: std::sync::atomic::AtomicUsize,
        surface_forms: bool,
    }

    impl TableEmbedder {
        pub fn new(groups: &[&[&str]]) -> Self {
            let mut map = HashMap::new();
            for (idx, group) in groups.iter().enumerate() {
                for word in group.iter() {
                    map.insert(word.to_string(), idx);
                }
            }
            Self {
                groups: map,
                dimension: groups.len().max(1),
                batch_calls: std::sync::atomic::AtomicUsize::new(0),
                surface_forms: false,
            }
        }

        /// Asks the index for surface forms, like a sentence model would.
        pub fn whole_words(mut self) -> Self {
            self.surface_forms = true;
            self
        }

        pub fn batch_calls(&self) -> usize {
            self.batch_calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl Embedder for TableEmbedder {
        fn name(&self) -> &'static str {
            "table"
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn prefers_surface_forms(&self) -> bool {
            self.surface_forms
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batch_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; self.dimension];
                    if let Some(idx) = self.groups.get(t.as_str()) {
                        v[*idx] = 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    /// Embeds the document batch, then fails every query afterwards.
    pub struct QueryFailingEmbedder {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl QueryFailingEmbedder {
        pub fn new() -> Self {
            Self {
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl Embedder for QueryFailingEmbedder {
        fn name(&self) -> &'static str {
            "query-failing"
        }

        fn dimension(&self) -> usize {
            1
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Ok(texts.iter().map(|_| vec![1.0]).collect())
            } else {
                Err(EmbeddingError::Inference("model offline".to_string()))
            }
        }
    }

    /// Always fails; exercises error propagation.
    pub struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn dimension(&self) -> usize {
            1
        }

        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Inference("model offline".to_string()))
        }
    }
}
