//! Embedding backends for the semantic similarity index.
//!
//! `Embedder` is the seam; `EmbeddingService` is the injectable handle the
//! engine holds. The model behind it is built once, on first use, and shared
//! by every résumé afterwards.

use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use siphasher::sip::SipHasher13;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Unknown embedding backend '{0}' (expected 'hash' or 'fastembed')")]
    UnknownBackend(String),

    #[error("Embedding backend '{0}' is not compiled into this build")]
    BackendUnavailable(&'static str),

    #[error("Failed to initialise embedding model: {0}")]
    Init(String),

    #[error("Embedding inference failed: {0}")]
    Inference(String),

    #[error("Embedding backend returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

/// Turns text into dense vectors. Implementations must be deterministic for a
/// fixed model version.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Whether document tokens should be embedded as written rather than as
    /// stems. Sentence models know "managing", not "manag".
    fn prefers_surface_forms(&self) -> bool {
        false
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            got: 0,
        })
    }
}

/// Raw cosine similarity in [-1, 1]. Zero vectors and mismatched dimensions
/// score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder: deterministic character n-gram feature hashing
// ────────────────────────────────────────────────────────────────────────────

// Changing these keys changes every vector.
const HASH_SEED_K0: u64 = 0x5eed_0f_a11_c0ffee;
const HASH_SEED_K1: u64 = 0x0dd_ba11_5ca1_ab1e;

pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Model-free embedder: hashes padded character trigrams into a fixed-size,
/// L2-normalised vector. Spelling variants ("developer" / "developers")
/// land close together; unrelated words land near zero.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, gram: &str) -> (usize, f32) {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        gram.hash(&mut hasher);
        let h = hasher.finish();
        let idx = (h % self.dimension as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.split_whitespace() {
            let padded: Vec<char> = std::iter::once('<')
                .chain(word.to_lowercase().chars())
                .chain(std::iter::once('>'))
                .collect();
            if padded.len() < 3 {
                continue;
            }
            for window in padded.windows(3) {
                let gram: String = window.iter().collect();
                let (idx, sign) = self.bucket(&gram);
                vector[idx] += sign;
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FastEmbedder: ONNX sentence model (feature = "fastembed")
// ────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "fastembed")]
pub struct FastEmbedder {
    model: fastembed::TextEmbedding,
    dimension: usize,
}

#[cfg(feature = "fastembed")]
impl FastEmbedder {
    /// Loads the model identified by its model code, e.g.
    /// `sentence-transformers/all-MiniLM-L6-v2`.
    pub fn new(model_code: &str) -> Result<Self, EmbeddingError> {
        use fastembed::{InitOptions, TextEmbedding};

        let info = TextEmbedding::list_supported_models()
            .into_iter()
            .find(|m| m.model_code.eq_ignore_ascii_case(model_code))
            .ok_or_else(|| EmbeddingError::Init(format!("unsupported model '{model_code}'")))?;

        let model = TextEmbedding::try_new(
            InitOptions::new(info.model.clone()).with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::Init(e.to_string()))?;

        Ok(Self {
            model,
            dimension: info.dim,
        })
    }
}

#[cfg(feature = "fastembed")]
impl Embedder for FastEmbedder {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn prefers_surface_forms(&self) -> bool {
        true
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingService: lazy, once-only model acquisition
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    Hash,
    FastEmbed,
}

impl FromStr for EmbedderKind {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(EmbedderKind::Hash),
            "fastembed" => Ok(EmbedderKind::FastEmbed),
            other => Err(EmbeddingError::UnknownBackend(other.to_string())),
        }
    }
}

/// Injectable owner of the embedding model. Cheap to clone; clones share the
/// same lazily-built model.
#[derive(Clone)]
pub struct EmbeddingService {
    kind: EmbedderKind,
    model_code: String,
    cell: Arc<OnceCell<Arc<dyn Embedder>>>,
}

impl EmbeddingService {
    pub fn new(kind: EmbedderKind, model_code: impl Into<String>) -> Self {
        Self {
            kind,
            model_code: model_code.into(),
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Wraps an already-built embedder; `get` never builds anything.
    #[cfg(test)]
    pub fn from_embedder(embedder: Arc<dyn Embedder>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(embedder);
        Self {
            kind: EmbedderKind::Hash,
            model_code: String::new(),
            cell: Arc::new(cell),
        }
    }

    /// The single acquisition point. Builds the model on first call; blocking.
    pub fn get(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        self.cell
            .get_or_try_init(|| build_embedder(self.kind, &self.model_code))
            .map(Arc::clone)
    }
}

fn build_embedder(kind: EmbedderKind, model_code: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match kind {
        EmbedderKind::Hash => {
            info!("Using hash embedder ({DEFAULT_HASH_DIMENSION} dims)");
            Ok(Arc::new(HashEmbedder::default()))
        }
        #[cfg(feature = "fastembed")]
        EmbedderKind::FastEmbed => {
            info!("Loading fastembed model {model_code}");
            Ok(Arc::new(FastEmbedder::new(model_code)?))
        }
        #[cfg(not(feature = "fastembed"))]
        EmbedderKind::FastEmbed => {
            let _ = model_code;
            Err(EmbeddingError::BackendUnavailable("fastembed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let a = vec![0.3, 0.4, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors_is_negative() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_and_mismatch_are_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_hash_embedder_is_deterministic_and_normalised() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("kubernetes").unwrap();
        let b = embedder.embed("kubernetes").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn test_hash_embedder_spelling_variants_are_close() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("developer").unwrap();
        let b = embedder.embed("developers").unwrap();
        let c = embedder.embed("accountant").unwrap();
        let close = cosine_similarity(&a, &b);
        let far = cosine_similarity(&a, &c);
        assert!(close > 0.7, "close similarity was {close}");
        assert!(far < close);
    }

    #[test]
    fn test_hash_embedder_batch_preserves_order_and_count() {
        let embedder = HashEmbedder::new(64);
        let texts = vec!["rust".to_string(), "go".to_string(), "java".to_string()];
        let vectors = embedder.embed_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 64));
        assert_eq!(vectors[0], embedder.embed("rust").unwrap());
    }

    #[test]
    fn test_embedder_kind_parses_case_insensitively() {
        assert_eq!("HASH".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hash);
        assert_eq!(
            "fastembed".parse::<EmbedderKind>().unwrap(),
            EmbedderKind::FastEmbed
        );
        assert!("word2vec".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_service_builds_model_once() {
        let service = EmbeddingService::new(EmbedderKind::Hash, "");
        let first = service.get().unwrap();
        let second = service.clone().get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[cfg(not(feature = "fastembed"))]
    #[test]
    fn test_fastembed_unavailable_without_feature() {
        let service = EmbeddingService::new(EmbedderKind::FastEmbed, "any");
        assert!(matches!(
            service.get(),
            Err(EmbeddingError::BackendUnavailable("fastembed"))
        ));
    }
}
