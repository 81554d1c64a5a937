/// Raised when two embeddings cannot be compared at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    #[error("embedding dimension mismatch ({left} vs {right})")]
    ShapeMismatch { left: usize, right: usize },
}

/// Cosine similarity in [-1, 1].
///
/// Zero-norm vectors and vectors carrying NaN or infinite components yield 0 so a
/// single malformed embedding never aborts a ranking pass. Unequal lengths are a
/// caller defect and are reported as [`SimilarityError::ShapeMismatch`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        if !x.is_finite() || !y.is_finite() {
            return Ok(0.0);
        }
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        Ok(similarity.clamp(-1.0, 1.0))
    } else {
        Ok(0.0)
    }
}
