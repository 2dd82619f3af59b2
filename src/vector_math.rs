//! Embedding vector helpers: pooling, normalization, similarity.

use ndarray::{Array2, Axis};

use crate::core::errors::RagError;

/// Mean-pool a sequence of token vectors into a single vector.
///
/// All token vectors must share one dimensionality; a mismatch is a fatal
/// configuration problem, not a per-call hiccup.
pub fn mean_pool(token_vectors: &[Vec<f32>]) -> Result<Vec<f32>, RagError> {
    let rows = token_vectors.len();
    if rows == 0 {
        return Err(RagError::Embedding("cannot pool zero token vectors".into()));
    }
    let dim = token_vectors[0].len();
    if dim == 0 {
        return Err(RagError::Embedding("token vectors must not be empty".into()));
    }
    if token_vectors.iter().any(|v| v.len() != dim) {
        return Err(RagError::Config(
            "token vectors have inconsistent dimensionality".into(),
        ));
    }

    let flat: Vec<f32> = token_vectors.iter().flatten().copied().collect();
    let matrix = Array2::from_shape_vec((rows, dim), flat)
        .map_err(|e| RagError::embedding(format!("pooling shape error: {e}")))?;
    let pooled = matrix
        .mean_axis(Axis(0))
        .ok_or_else(|| RagError::Embedding("mean pooling produced no output".into()))?;

    Ok(pooled.to_vec())
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

/// Cosine similarity of two vectors of the same dimensionality.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, RagError> {
    if a.is_empty() || b.is_empty() {
        return Err(RagError::Config("vectors must not be empty".into()));
    }
    if a.len() != b.len() {
        return Err(RagError::Config(format!(
            "vector length mismatch: {} != {}",
            a.len(),
            b.len()
        )));
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        Ok(0.0)
    } else {
        Ok((dot / denom).clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        let score = cosine_similarity(&vec, &vec).expect("cosine should work");
        assert!(approx_eq(score, 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("cosine should work");
        assert!(approx_eq(score, 0.0));
    }

    #[test]
    fn cosine_rejects_length_mismatch() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_err());
    }

    #[test]
    fn mean_pool_averages_rows() {
        let pooled = mean_pool(&[vec![1.0, 0.0], vec![3.0, 2.0]]).expect("pooling should work");
        assert!(approx_eq(pooled[0], 2.0));
        assert!(approx_eq(pooled[1], 1.0));
    }

    #[test]
    fn mean_pool_rejects_ragged_input() {
        assert!(mean_pool(&[vec![1.0, 0.0], vec![1.0]]).is_err());
    }

    #[test]
    fn normalize_yields_unit_norm() {
        let mut vec = vec![3.0, 4.0];
        l2_normalize(&mut vec);
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(approx_eq(norm, 1.0));
    }

    #[test]
    fn normalize_leaves_zero_vector_alone() {
        let mut vec = vec![0.0, 0.0];
        l2_normalize(&mut vec);
        assert_eq!(vec, vec![0.0, 0.0]);
    }
}
