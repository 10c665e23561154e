//! The MPS classifier forward pass
//!
//! Composes the feature embedder, the site-tensor bank, and the chain
//! reduction into a `(batch, S) -> (batch, C)` score function:
//!
//! 1. per-site contraction of each embedded feature against its weight
//!    matrices, giving one `r x r` matrix per site per batch element,
//! 2. tree reduction of each half-chain to a single matrix per batch
//!    element, and
//! 3. a ring contraction of (left, label tensor, right) closing all bond
//!    indices, one scalar per class.
//!
//! The engine is stateless apart from the bank, which it only reads;
//! gradient updates happen externally, strictly between passes.

use crate::bank::{MpsConfig, SiteTensorBank};
use crate::embedding::{embed, embed_one, Embedding};
use crate::error::{ClassifierError, Result};
use crate::reduction::reduce_chain;
use crate::scalar::Scalar;
use crate::types::{shape_string, tensor2_zeros, tensor3_zeros, Tensor2, Tensor3, Tensor4};

/// A differentiable transform from one tensor to another.
///
/// The embedder and the contraction engine are two independent
/// implementations of this seam; they compose by function application,
/// with no layer hierarchy.
pub trait Forward<Input> {
    /// The produced tensor type.
    type Output;

    /// Apply the transform to one batch.
    fn forward(&self, input: &Input) -> Result<Self::Output>;
}

impl<T: Scalar> Forward<Tensor2<T>> for Embedding {
    type Output = Tensor3<T>;

    fn forward(&self, input: &Tensor2<T>) -> Result<Self::Output> {
        Ok(embed(input))
    }
}

/// MPS tensor-network classifier.
///
/// Owns the learnable [`SiteTensorBank`]; all shape validation against
/// the declared dimensions happened when the bank was constructed, so a
/// forward pass only has to check its input batch.
#[derive(Debug, Clone)]
pub struct MpsClassifier<T: Scalar> {
    bank: SiteTensorBank<T>,
}

impl<T: Scalar> MpsClassifier<T> {
    /// Wrap a constructed (hence shape-valid) bank.
    pub fn new(bank: SiteTensorBank<T>) -> Self {
        Self { bank }
    }

    /// The model dimensions.
    pub fn config(&self) -> &MpsConfig {
        self.bank.config()
    }

    /// The weight bank.
    pub fn bank(&self) -> &SiteTensorBank<T> {
        &self.bank
    }

    /// Mutable weight bank, for the external optimizer.
    pub fn bank_mut(&mut self) -> &mut SiteTensorBank<T> {
        &mut self.bank
    }

    /// Score a batch of raw feature vectors.
    ///
    /// Input shape (batch, S); output shape (batch, C), unnormalized
    /// class scores for an external loss. Non-finite weights or inputs
    /// propagate into the scores unchanged.
    pub fn forward(&self, batch: &Tensor2<T>) -> Result<Tensor2<T>> {
        let config = self.bank.config();
        if batch.dim(1) != config.num_sites() {
            return Err(ClassifierError::ShapeMismatch {
                what: "input batch",
                expected: shape_string(&[batch.dim(0), config.num_sites()]),
                got: shape_string(&[batch.dim(0), batch.dim(1)]),
            });
        }
        self.forward_embedded(&embed(batch))
    }

    /// Score a batch that has already been embedded.
    ///
    /// Input shape (batch, S, d). The per-site and final contractions run
    /// only after the shape check passes.
    pub fn forward_embedded(&self, embedded: &Tensor3<T>) -> Result<Tensor2<T>> {
        let config = self.bank.config();
        let batch = embedded.dim(0);
        if embedded.dim(1) != config.num_sites() || embedded.dim(2) != config.local_dim() {
            return Err(ClassifierError::ShapeMismatch {
                what: "embedded batch",
                expected: shape_string(&[batch, config.num_sites(), config.local_dim()]),
                got: shape_string(&[batch, embedded.dim(1), embedded.dim(2)]),
            });
        }

        let half = config.half_len();
        let left_chain = site_matrices(self.bank.left(), embedded, 0);
        let right_chain = site_matrices(self.bank.right(), embedded, half);

        let left_final = reduce_chain(left_chain)?;
        let right_final = reduce_chain(right_chain)?;

        Ok(self.contract_center(&left_final, &right_final))
    }

    /// Score a single feature vector.
    pub fn forward_one(&self, features: &[T]) -> Result<Vec<T>> {
        let config = self.bank.config();
        if features.len() != config.num_sites() {
            return Err(ClassifierError::ShapeMismatch {
                what: "input features",
                expected: shape_string(&[config.num_sites()]),
                got: shape_string(&[features.len()]),
            });
        }
        let scores = self.forward_embedded(&embed_one(features))?;
        Ok((0..config.num_classes()).map(|c| scores[[0, c]]).collect())
    }

    /// Ring contraction of the two reduced half-chains against the label
    /// tensor:
    ///
    /// `score[b, c] = sum_{i,j,k} left[b,i,j] * center[c,j,k] * right[b,k,i]`
    fn contract_center(&self, left: &Tensor3<T>, right: &Tensor3<T>) -> Tensor2<T> {
        let config = self.bank.config();
        let center = self.bank.center();
        let batch = left.dim(0);
        let r = config.bond_dim();
        let c = config.num_classes();

        let mut scores = tensor2_zeros(batch, c);
        for b in 0..batch {
            for ci in 0..c {
                let mut acc = T::zero();
                for i in 0..r {
                    for j in 0..r {
                        let l_ij = left[[b, i, j]];
                        for k in 0..r {
                            acc = acc + l_ij * center[[ci, j, k]] * right[[b, k, i]];
                        }
                    }
                }
                scores[[b, ci]] = acc;
            }
        }
        scores
    }
}

impl<T: Scalar> Forward<Tensor2<T>> for MpsClassifier<T> {
    type Output = Tensor2<T>;

    fn forward(&self, input: &Tensor2<T>) -> Result<Self::Output> {
        MpsClassifier::forward(self, input)
    }
}

/// Contract each site of one half-chain against its embedded features.
///
/// `out[s][b, i, j] = sum_l weights[l, s, i, j] * embedded[b, offset + s, l]`
///
/// Returns the chain as a sequence of (batch, r, r) tensors, ready for
/// [`reduce_chain`]. The sites of one chain are independent of each
/// other; only the later reduction couples them.
fn site_matrices<T: Scalar>(
    weights: &Tensor4<T>,
    embedded: &Tensor3<T>,
    offset: usize,
) -> Vec<Tensor3<T>> {
    let d = weights.dim(0);
    let half = weights.dim(1);
    let r = weights.dim(2);
    let batch = embedded.dim(0);

    let mut chain = Vec::with_capacity(half);
    for s in 0..half {
        let mut mat = tensor3_zeros(batch, r, r);
        for b in 0..batch {
            for l in 0..d {
                let coeff = embedded[[b, offset + s, l]];
                for i in 0..r {
                    for j in 0..r {
                        mat[[b, i, j]] = mat[[b, i, j]] + coeff * weights[[l, s, i, j]];
                    }
                }
            }
        }
        chain.push(mat);
    }
    chain
}
