use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::matching::embedding::EmbedderKind;
use crate::matching::selection::SelectionPolicy;
use crate::matching::similarity::DEFAULT_SIMILARITY_THRESHOLD;
use crate::screening::summary::{DEFAULT_TOP_N, MAX_TOP_N};

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub similarity_threshold: f32,
    pub max_concurrent_screenings: usize,
    pub embedder: EmbedderKind,
    pub embedding_model: String,
    pub selection_policy: SelectionPolicy,
    pub top_n: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let similarity_threshold = var("SIMILARITY_THRESHOLD", &DEFAULT_SIMILARITY_THRESHOLD.to_string())
            .parse::<f32>()
            .context("SIMILARITY_THRESHOLD must be a number")?;
        ensure!(
            (0.0..=1.0).contains(&similarity_threshold),
            "SIMILARITY_THRESHOLD must be between 0 and 1, got {similarity_threshold}"
        );

        let max_concurrent_screenings = var("MAX_CONCURRENT_SCREENINGS", "4")
            .parse::<usize>()
            .context("MAX_CONCURRENT_SCREENINGS must be a positive integer")?;
        ensure!(
            max_concurrent_screenings >= 1,
            "MAX_CONCURRENT_SCREENINGS must be at least 1"
        );

        let top_n = var("TOP_N", &DEFAULT_TOP_N.to_string())
            .parse::<usize>()
            .context("TOP_N must be a positive integer")?;
        ensure!(
            (1..=MAX_TOP_N).contains(&top_n),
            "TOP_N must be between 1 and {MAX_TOP_N}, got {top_n}"
        );

        Ok(Config {
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            data_dir: PathBuf::from(var("DATA_DIR", "./data")),
            similarity_threshold,
            max_concurrent_screenings,
            embedder: var("EMBEDDER", "hash")
                .parse::<EmbedderKind>()
                .context("EMBEDDER is invalid")?,
            embedding_model: var("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            selection_policy: var("SELECTION_POLICY", "fallback")
                .parse::<SelectionPolicy>()
                .map_err(anyhow::Error::msg)
                .context("SELECTION_POLICY is invalid")?,
            top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rust_log, "info");
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert!((cfg.similarity_threshold - 0.7).abs() < 1e-6);
        assert_eq!(cfg.max_concurrent_screenings, 4);
        assert_eq!(cfg.embedder, EmbedderKind::Hash);
        assert_eq!(cfg.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(cfg.selection_policy, SelectionPolicy::FallbackToAll);
        assert_eq!(cfg.top_n, 3);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "9000"),
            ("DATA_DIR", "/srv/sieve"),
            ("SIMILARITY_THRESHOLD", "0.55"),
            ("EMBEDDER", "FastEmbed"),
            ("SELECTION_POLICY", "strict"),
            ("TOP_N", "20"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/sieve"));
        assert!((cfg.similarity_threshold - 0.55).abs() < 1e-6);
        assert_eq!(cfg.embedder, EmbedderKind::FastEmbed);
        assert_eq!(cfg.selection_policy, SelectionPolicy::RejectUnknownPosition);
        assert_eq!(cfg.top_n, 20);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("SIMILARITY_THRESHOLD", "1.5")]).is_err());
        assert!(config(&[("MAX_CONCURRENT_SCREENINGS", "0")]).is_err());
        assert!(config(&[("EMBEDDER", "word2vec")]).is_err());
        assert!(config(&[("SELECTION_POLICY", "lenient")]).is_err());
        assert!(config(&[("TOP_N", "0")]).is_err());
    }
}
