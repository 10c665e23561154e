//! Feature embedding
//!
//! Maps each scalar feature `x` into the two-component local vector
//! `[1 - x, x]`, turning a (batch, sites) input into a
//! (batch, sites, 2) tensor. The map is pure and has no learnable
//! parameters; NaN/Inf inputs propagate untouched.

use crate::scalar::Scalar;
use crate::types::{Tensor2, Tensor3};

/// Local (physical) dimension produced by the embedding.
pub const LOCAL_DIM: usize = 2;

/// Embed a batch of feature vectors.
///
/// Input shape (batch, sites); output shape (batch, sites, 2) with
/// component 0 holding `1 - x` and component 1 holding `x`.
///
/// For inputs in `[0, 1]` both components stay in `[0, 1]` and sum to 1.
pub fn embed<T: Scalar>(batch: &Tensor2<T>) -> Tensor3<T> {
    let n = batch.dim(0);
    let sites = batch.dim(1);
    Tensor3::from_fn([n, sites, LOCAL_DIM], |idx| {
        let x = batch[[idx[0], idx[1]]];
        if idx[2] == 0 {
            T::one() - x
        } else {
            x
        }
    })
}

/// Embed a single feature vector as a batch of one.
pub fn embed_one<T: Scalar>(features: &[T]) -> Tensor3<T> {
    let sites = features.len();
    Tensor3::from_fn([1, sites, LOCAL_DIM], |idx| {
        let x = features[idx[1]];
        if idx[2] == 0 {
            T::one() - x
        } else {
            x
        }
    })
}

/// The embedding layer. Stateless; exists so the embedder and the
/// contraction engine implement the same forward seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct Embedding;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tensor2_from_data;
    use approx::assert_relative_eq;

    #[test]
    fn test_embed_literals() {
        let batch = tensor2_from_data(vec![0.0, 1.0, 0.3], 1, 3);
        let emb = embed(&batch);
        assert_eq!(emb.dim(0), 1);
        assert_eq!(emb.dim(1), 3);
        assert_eq!(emb.dim(2), 2);

        // x = 0 -> [1, 0]
        assert_relative_eq!(emb[[0, 0, 0]], 1.0);
        assert_relative_eq!(emb[[0, 0, 1]], 0.0);
        // x = 1 -> [0, 1]
        assert_relative_eq!(emb[[0, 1, 0]], 0.0);
        assert_relative_eq!(emb[[0, 1, 1]], 1.0);
        // x = 0.3 -> [0.7, 0.3]
        assert_relative_eq!(emb[[0, 2, 0]], 0.7);
        assert_relative_eq!(emb[[0, 2, 1]], 0.3);
    }

    #[test]
    fn test_embed_components_sum_to_one() {
        let batch = tensor2_from_data(vec![0.2, 0.8, 0.5, 0.1, 0.9, 0.42], 2, 3);
        let emb = embed(&batch);
        for b in 0..2 {
            for s in 0..3 {
                assert_relative_eq!(emb[[b, s, 0]] + emb[[b, s, 1]], 1.0, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_embed_one_matches_batch() {
        let features = [0.2, 0.8, 0.5, 0.1];
        let single = embed_one(&features);
        let batch = embed(&tensor2_from_data(features.to_vec(), 1, 4));
        for s in 0..4 {
            for l in 0..2 {
                assert_relative_eq!(single[[0, s, l]], batch[[0, s, l]]);
            }
        }
    }

    #[test]
    fn test_embed_nan_propagates() {
        let batch = tensor2_from_data(vec![f64::NAN], 1, 1);
        let emb = embed(&batch);
        assert!(emb[[0, 0, 0]].is_nan());
        assert!(emb[[0, 0, 1]].is_nan());
    }
}
