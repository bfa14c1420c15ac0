//! Deterministic feature-hashing embedding provider.
//!
//! [`HashingEmbeddingProvider`] needs no model files or network access. Each
//! lower-cased alphanumeric token is hashed into a signed bucket and the
//! resulting vector is L2-normalised, so texts sharing vocabulary end up
//! close under cosine similarity. It backs offline runs, demos and tests.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};

/// Default dimensionality for [`HashingEmbeddingProvider`].
pub const DEFAULT_HASHING_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A bag-of-words embedding provider using signed feature hashing.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing vectors of the given dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(SearchError::ConfigError(
                "hashing provider dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn hash(token: &str) -> u64 {
        token.bytes().fold(FNV_OFFSET, |acc, b| (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = Self::hash(token);
            let bucket = (hash % self.dimensions as u64) as usize;
            // Top bit picks the sign so collisions tend to cancel instead of pile up.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: DEFAULT_HASHING_DIMENSIONS }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.encode(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn output_is_deterministic_and_normalised() {
        let provider = HashingEmbeddingProvider::new(64).unwrap();
        let a = provider.embed("Diabetes mellitus and its treatment").await.unwrap();
        let b = provider.embed("Diabetes mellitus and its treatment").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn tokenisation_ignores_case_and_punctuation() {
        let provider = HashingEmbeddingProvider::default();
        let a = provider.embed("COVID-19, Treatment!").await.unwrap();
        let b = provider.embed("covid 19 treatment").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher() {
        let provider = HashingEmbeddingProvider::default();
        let query = provider.embed("diabetes treatment").await.unwrap();
        let related = provider.embed("Diabetes Management in the Elderly treatment").await.unwrap();
        let unrelated = provider.embed("Hypertension guidelines for adults").await.unwrap();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_yields_zero_vector() {
        let provider = HashingEmbeddingProvider::new(8).unwrap();
        assert_eq!(provider.embed("  ,. ").await.unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(HashingEmbeddingProvider::new(0), Err(SearchError::ConfigError(_))));
    }
}
