//! Similarity computation for embeddings.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors, or either vector has zero magnitude
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_f64(a, b)?;
    Ok(cosine_from_parts(dot, squared_norm(a), squared_norm(b)))
}

/// Dot product accumulated in f64.
pub(crate) fn dot_f64(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum())
}

/// Squared Euclidean length accumulated in f64.
pub(crate) fn squared_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}

/// Cosine similarity from an f64 dot product and squared norms.
///
/// The norms are combined under a single square root and the result is
/// clamped to [-1, 1], so a vector compared with itself scores exactly 1.0.
pub(crate) fn cosine_from_parts(dot: f64, squared_norm_a: f64, squared_norm_b: f64) -> f32 {
    if squared_norm_a == 0.0 || squared_norm_b == 0.0 {
        return 0.0;
    }
    (dot / (squared_norm_a * squared_norm_b).sqrt()).clamp(-1.0, 1.0) as f32
}

/// A similarity search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Row of the matched keyword in the catalog.
    pub index: usize,

    /// The matched keyword.
    pub keyword: String,

    /// Similarity score.
    pub score: f32,
}

impl SimilarityResult {
    /// Create a new similarity result.
    pub fn new(index: usize, keyword: impl Into<String>, score: f32) -> Self {
        Self {
            index,
            keyword: keyword.into(),
            score,
        }
    }
}

/// Indices of the `k` highest scores, best first.
///
/// Equal scores keep catalog order, so the lower index wins the last slot.
/// NaN scores rank below every real score.
pub fn top_k(scores: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();

    let key = |i: usize| {
        let s = scores[i];
        OrderedFloat(if s.is_nan() { f32::NEG_INFINITY } else { s })
    };

    // Stable sort keeps ascending index among ties.
    order.sort_by(|&a, &b| key(b).cmp(&key(a)));
    order.truncate(k);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_self_similarity_is_exactly_one() {
        // Dense, non-axis vectors where f32 accumulation drifts below 1.0.
        let mut state = 0x2545_f491_u32;
        for _ in 0..50 {
            let v: Vec<f32> = (0..1536)
                .map(|_| {
                    state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                    (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
                })
                .collect();
            assert_eq!(cosine_similarity(&v, &v).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_similarity_stays_in_range() {
        let a = vec![0.1, 0.2, 0.3];
        let b = vec![0.1, 0.2, 0.3000001];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((-1.0..=1.0).contains(&sim));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(cosine_similarity(&a, &b).is_err());
    }

    #[test]
    fn test_top_k_orders_descending() {
        let scores = [0.1, 0.9, 0.5, 0.7];
        assert_eq!(top_k(&scores, 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_top_k_ties_prefer_lower_index() {
        let scores = [0.2, 0.8, 0.8, 0.8];
        assert_eq!(top_k(&scores, 2), vec![1, 2]);
    }

    #[test]
    fn test_top_k_nan_ranks_last() {
        let scores = [f32::NAN, -0.5];
        assert_eq!(top_k(&scores, 1), vec![1]);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        assert_eq!(top_k(&[0.3], 5), vec![0]);
        assert!(top_k(&[], 5).is_empty());
    }
}
