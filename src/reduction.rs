//! Pairwise-product tree reduction of a matrix chain
//!
//! Reduces an ordered sequence of batched square matrices to the single
//! left-to-right product `M0 * M1 * ... * M(n-1)` per batch element.
//! [`reduce_chain`] does so in `ceil(log2 n)` rounds of pairwise batched
//! products; [`chain_product`] is the sequential reference with the same
//! contract. The tree form keeps the depth of the computation graph at
//! `O(log n)` for chains as long as half an image (392 for 28x28 input),
//! where a sequential product would be `O(n)` deep.
//!
//! Matrix multiplication is non-commutative; both functions preserve the
//! operand order of the input sequence exactly.

use crate::error::{ClassifierError, Result};
use crate::scalar::Scalar;
use crate::types::{shape_string, tensor3_zeros, Tensor3};

/// Batched matrix product of two (batch, r, r) tensors.
///
/// `out[b] = a[b] * b[b]` for every batch element. Both inputs must be
/// square and share the same shape.
pub fn matmul_batched<T: Scalar>(a: &Tensor3<T>, b: &Tensor3<T>) -> Result<Tensor3<T>> {
    let batch = a.dim(0);
    let r = a.dim(1);
    if a.dim(2) != r {
        return Err(ClassifierError::ShapeMismatch {
            what: "left matmul operand",
            expected: shape_string(&[batch, r, r]),
            got: shape_string(&[batch, r, a.dim(2)]),
        });
    }
    if b.dim(0) != batch || b.dim(1) != r || b.dim(2) != r {
        return Err(ClassifierError::ShapeMismatch {
            what: "right matmul operand",
            expected: shape_string(&[batch, r, r]),
            got: shape_string(&[b.dim(0), b.dim(1), b.dim(2)]),
        });
    }

    let mut out = tensor3_zeros(batch, r, r);
    for bi in 0..batch {
        for i in 0..r {
            for k in 0..r {
                let a_ik = a[[bi, i, k]];
                for j in 0..r {
                    out[[bi, i, j]] = out[[bi, i, j]] + a_ik * b[[bi, k, j]];
                }
            }
        }
    }
    Ok(out)
}

/// Check that every element of a chain is square and shares the shape of
/// the first, so a lone element cannot slip through unvalidated.
fn validate_chain<T: Scalar>(level: &[Tensor3<T>]) -> Result<()> {
    let first = level.first().ok_or(ClassifierError::EmptyChain)?;
    let batch = first.dim(0);
    let r = first.dim(1);
    for m in level {
        if m.dim(0) != batch || m.dim(1) != r || m.dim(2) != r {
            return Err(ClassifierError::ShapeMismatch {
                what: "chain element",
                expected: shape_string(&[batch, r, r]),
                got: shape_string(&[m.dim(0), m.dim(1), m.dim(2)]),
            });
        }
    }
    Ok(())
}

/// Reduce a chain of batched matrices to one product per batch element
/// in `ceil(log2 n)` pairwise rounds.
///
/// Each round multiplies element `2k` (left operand) with element `2k+1`
/// (right operand); an odd tail element is carried to the next round
/// unchanged, after the new products, which keeps it at the end of the
/// sequence. Rounds are sequential; the products within one round are
/// independent of each other.
pub fn reduce_chain<T: Scalar>(mut level: Vec<Tensor3<T>>) -> Result<Tensor3<T>> {
    validate_chain(&level)?;

    while level.len() > 1 {
        let tail = if level.len() % 2 == 1 {
            level.pop()
        } else {
            None
        };

        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        let mut pairs = level.into_iter();
        while let (Some(a), Some(b)) = (pairs.next(), pairs.next()) {
            next.push(matmul_batched(&a, &b)?);
        }
        if let Some(t) = tail {
            next.push(t);
        }
        level = next;
    }

    // Length-1 vector by construction
    level.pop().ok_or(ClassifierError::EmptyChain)
}

/// Sequential left-to-right chain product; same contract as
/// [`reduce_chain`] at `O(n)` depth. Kept as the reference algorithm.
pub fn chain_product<T: Scalar>(level: Vec<Tensor3<T>>) -> Result<Tensor3<T>> {
    validate_chain(&level)?;
    let mut iter = level.into_iter();
    let mut acc = iter.next().ok_or(ClassifierError::EmptyChain)?;
    for m in iter {
        acc = matmul_batched(&acc, &m)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Random (batch, r, r) tensor with entries in [-1, 1]
    fn random_batched(batch: usize, r: usize, rng: &mut ChaCha8Rng) -> Tensor3<f64> {
        let mut t = tensor3_zeros(batch, r, r);
        for b in 0..batch {
            for i in 0..r {
                for j in 0..r {
                    t[[b, i, j]] = rng.random::<f64>() * 2.0 - 1.0;
                }
            }
        }
        t
    }

    fn random_chain(n: usize, batch: usize, r: usize, seed: u64) -> Vec<Tensor3<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| random_batched(batch, r, &mut rng)).collect()
    }

    fn assert_tensors_close(a: &Tensor3<f64>, b: &Tensor3<f64>) {
        for bi in 0..a.dim(0) {
            for i in 0..a.dim(1) {
                for j in 0..a.dim(2) {
                    assert_relative_eq!(a[[bi, i, j]], b[[bi, i, j]], epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_matmul_batched_known_product() {
        // [[1, 2], [3, 4]] * [[5, 6], [7, 8]] = [[19, 22], [43, 50]]
        let a = crate::types::tensor3_from_data(vec![1.0, 2.0, 3.0, 4.0], 1, 2, 2);
        let b = crate::types::tensor3_from_data(vec![5.0, 6.0, 7.0, 8.0], 1, 2, 2);
        let c = matmul_batched(&a, &b).unwrap();
        assert_relative_eq!(c[[0, 0, 0]], 19.0);
        assert_relative_eq!(c[[0, 0, 1]], 22.0);
        assert_relative_eq!(c[[0, 1, 0]], 43.0);
        assert_relative_eq!(c[[0, 1, 1]], 50.0);
    }

    #[test]
    fn test_matmul_batched_rejects_shape_mismatch() {
        let a = crate::types::tensor3_zeros::<f64>(2, 3, 3);
        let b = crate::types::tensor3_zeros::<f64>(2, 2, 2);
        assert!(matches!(
            matmul_batched(&a, &b),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reduce_chain_rejects_empty() {
        let chain: Vec<Tensor3<f64>> = Vec::new();
        assert!(matches!(
            reduce_chain(chain),
            Err(ClassifierError::EmptyChain)
        ));
    }

    #[test]
    fn test_reduce_chain_rejects_nonsquare_singleton() {
        // A length-1 chain gets the same shape validation as longer ones.
        let chain = vec![tensor3_zeros::<f64>(1, 2, 3)];
        assert!(matches!(
            reduce_chain(chain),
            Err(ClassifierError::ShapeMismatch { what: "chain element", .. })
        ));

        let chain = vec![tensor3_zeros::<f64>(1, 2, 3)];
        assert!(matches!(
            chain_product(chain),
            Err(ClassifierError::ShapeMismatch { what: "chain element", .. })
        ));
    }

    #[test]
    fn test_reduce_chain_rejects_mixed_shapes() {
        let chain = vec![
            tensor3_zeros::<f64>(1, 3, 3),
            tensor3_zeros::<f64>(1, 2, 2),
        ];
        assert!(matches!(
            reduce_chain(chain),
            Err(ClassifierError::ShapeMismatch { what: "chain element", .. })
        ));
    }

    #[test]
    fn test_reduce_chain_single_element_is_identity_on_input() {
        let chain = random_chain(1, 2, 3, 11);
        let expected = chain[0].clone();
        let got = reduce_chain(chain).unwrap();
        assert_tensors_close(&got, &expected);
    }

    #[test]
    fn test_reduce_matches_sequential_product() {
        // Base case, one level, odd leftovers at multiple levels, and
        // exact powers of two.
        for n in [1usize, 2, 3, 4, 5, 7, 8, 16] {
            let chain = random_chain(n, 1, 3, 100 + n as u64);
            let tree = reduce_chain(chain.clone()).unwrap();
            let seq = chain_product(chain).unwrap();
            assert_tensors_close(&tree, &seq);
        }
    }

    #[test]
    fn test_reduce_matches_sequential_product_batched() {
        let chain = random_chain(5, 4, 2, 77);
        let tree = reduce_chain(chain.clone()).unwrap();
        let seq = chain_product(chain).unwrap();
        assert_tensors_close(&tree, &seq);
    }

    #[test]
    fn test_reduce_is_order_sensitive() {
        let chain = random_chain(4, 1, 3, 13);
        let mut reversed = chain.clone();
        reversed.reverse();

        let forward = reduce_chain(chain).unwrap();
        let backward = reduce_chain(reversed).unwrap();

        let mut max_diff: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                max_diff = max_diff.max((forward[[0, i, j]] - backward[[0, i, j]]).abs());
            }
        }
        assert!(
            max_diff > 1e-8,
            "reversing a random chain should change the product (diff = {max_diff})"
        );
    }
}
