//! Site-tensor bank: configuration, weight storage, and initializers
//!
//! The bank owns the three learnable weight arrays of the classifier:
//! one `r x r` matrix per (local value, site) for each half of the chain,
//! and one `r x r` matrix per class for the label site. It is the only
//! mutable state of the model; the external optimizer updates it between
//! passes through the `_mut` accessors.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::embedding::LOCAL_DIM;
use crate::error::{ClassifierError, Result};
use crate::scalar::Scalar;
use crate::types::{shape_string, tensor3_zeros, tensor4_zeros, Tensor3, Tensor4};

/// Model dimensions, validated at construction.
///
/// Fields are private so every `MpsConfig` in circulation has passed
/// [`MpsConfig::new`] (or the shape inference of
/// [`SiteTensorBank::from_tensors`]); a hand-built odd-site config cannot
/// reach the engine and silently truncate the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpsConfig {
    num_sites: usize,
    local_dim: usize,
    bond_dim: usize,
    num_classes: usize,
}

impl MpsConfig {
    /// Create a configuration with the embedder's local dimension.
    ///
    /// Fails fast on an invalid combination: `num_sites` must be even and
    /// at least 2 (an odd count would silently discard a feature when the
    /// chain is split in half), `bond_dim` and `num_classes` at least 1.
    pub fn new(num_sites: usize, bond_dim: usize, num_classes: usize) -> Result<Self> {
        let config = Self {
            num_sites,
            local_dim: LOCAL_DIM,
            bond_dim,
            num_classes,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.num_sites < 2 {
            return Err(ClassifierError::ConfigError {
                parameter: "num_sites",
                value: self.num_sites,
                message: "must be at least 2",
            });
        }
        if self.num_sites % 2 != 0 {
            return Err(ClassifierError::ConfigError {
                parameter: "num_sites",
                value: self.num_sites,
                message: "must be even so the chain splits into two equal halves",
            });
        }
        if self.local_dim < 1 {
            return Err(ClassifierError::ConfigError {
                parameter: "local_dim",
                value: self.local_dim,
                message: "must be at least 1",
            });
        }
        if self.bond_dim < 1 {
            return Err(ClassifierError::ConfigError {
                parameter: "bond_dim",
                value: self.bond_dim,
                message: "must be at least 1",
            });
        }
        if self.num_classes < 1 {
            return Err(ClassifierError::ConfigError {
                parameter: "num_classes",
                value: self.num_classes,
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Total number of sites `S` (features per sample). Always even.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Local (physical) dimension `d` of the embedding.
    pub fn local_dim(&self) -> usize {
        self.local_dim
    }

    /// Bond dimension `r` of the chain.
    pub fn bond_dim(&self) -> usize {
        self.bond_dim
    }

    /// Number of output classes `C`.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Number of sites in each half of the chain.
    pub fn half_len(&self) -> usize {
        self.num_sites / 2
    }
}

/// The learnable weight tensors of the classifier.
///
/// Shapes:
/// - `left`:   (local_dim, num_sites/2, bond_dim, bond_dim)
/// - `right`:  (local_dim, num_sites/2, bond_dim, bond_dim)
/// - `center`: (num_classes, bond_dim, bond_dim)
#[derive(Debug, Clone)]
pub struct SiteTensorBank<T: Scalar> {
    config: MpsConfig,
    left: Tensor4<T>,
    right: Tensor4<T>,
    center: Tensor3<T>,
}

impl<T: Scalar> SiteTensorBank<T> {
    /// Initialize every weight i.i.d. from `N(0, std^2)`.
    ///
    /// This is the naive baseline. A chain of small random matrices
    /// contracts to (numerically) the same near-zero value for every
    /// input, so training from this point plateaus at chance accuracy.
    /// Prefer [`SiteTensorBank::near_identity`].
    pub fn random<R: Rng>(config: &MpsConfig, std: f64, rng: &mut R) -> Self {
        let h = config.half_len();
        let (d, r, c) = (config.local_dim, config.bond_dim, config.num_classes);

        let left = random_tensor4(d, h, r, std, rng);
        let right = random_tensor4(d, h, r, std, rng);
        let mut center = tensor3_zeros(c, r, r);
        for ci in 0..c {
            for i in 0..r {
                for j in 0..r {
                    center[[ci, i, j]] = gaussian(std, rng);
                }
            }
        }

        Self {
            config: *config,
            left,
            right,
            center,
        }
    }

    /// Initialize every per-site and per-class matrix as the identity plus
    /// i.i.d. `N(0, std^2)` noise (`std` around 1e-2).
    ///
    /// Near the identity, the end-to-end chain product starts near the
    /// identity map and each site's Jacobian contribution stays close to
    /// identity through every reduction round, so gradient magnitude
    /// survives the full chain depth. The initialization distribution is
    /// load-bearing: see [`SiteTensorBank::random`] for the failure mode
    /// it avoids.
    pub fn near_identity<R: Rng>(config: &MpsConfig, std: f64, rng: &mut R) -> Self {
        let mut bank = Self::random(config, std, rng);
        let h = config.half_len();
        let (d, r, c) = (config.local_dim, config.bond_dim, config.num_classes);
        for l in 0..d {
            for s in 0..h {
                for i in 0..r {
                    bank.left[[l, s, i, i]] = bank.left[[l, s, i, i]] + T::one();
                    bank.right[[l, s, i, i]] = bank.right[[l, s, i, i]] + T::one();
                }
            }
        }
        for ci in 0..c {
            for i in 0..r {
                bank.center[[ci, i, i]] = bank.center[[ci, i, i]] + T::one();
            }
        }
        bank
    }

    /// Build a bank from caller-supplied tensors, validating every shape.
    ///
    /// The configuration is inferred from `left` (which fixes `d`, `S/2`
    /// and `r`); `right` must match it exactly and `center` must be
    /// (C, r, r). All mismatches are reported here, before any forward
    /// pass can run.
    pub fn from_tensors(left: Tensor4<T>, right: Tensor4<T>, center: Tensor3<T>) -> Result<Self> {
        let d = left.dim(0);
        let h = left.dim(1);
        let r = left.dim(2);
        if left.dim(3) != r {
            return Err(ClassifierError::ShapeMismatch {
                what: "left bank",
                expected: shape_string(&[d, h, r, r]),
                got: shape_string(&[d, h, r, left.dim(3)]),
            });
        }
        let right_dims = [right.dim(0), right.dim(1), right.dim(2), right.dim(3)];
        if right_dims != [d, h, r, r] {
            return Err(ClassifierError::ShapeMismatch {
                what: "right bank",
                expected: shape_string(&[d, h, r, r]),
                got: shape_string(&right_dims),
            });
        }
        let c = center.dim(0);
        if center.dim(1) != r || center.dim(2) != r {
            return Err(ClassifierError::ShapeMismatch {
                what: "center (label) tensor",
                expected: shape_string(&[c, r, r]),
                got: shape_string(&[c, center.dim(1), center.dim(2)]),
            });
        }

        let config = MpsConfig {
            num_sites: 2 * h,
            local_dim: d,
            bond_dim: r,
            num_classes: c,
        };
        config.validate()?;

        Ok(Self {
            config,
            left,
            right,
            center,
        })
    }

    /// The validated model dimensions.
    pub fn config(&self) -> &MpsConfig {
        &self.config
    }

    /// Left-half weights, shape (d, S/2, r, r).
    pub fn left(&self) -> &Tensor4<T> {
        &self.left
    }

    /// Right-half weights, shape (d, S/2, r, r).
    pub fn right(&self) -> &Tensor4<T> {
        &self.right
    }

    /// Label tensor, shape (C, r, r).
    pub fn center(&self) -> &Tensor3<T> {
        &self.center
    }

    /// Mutable left-half weights, for the external optimizer.
    pub fn left_mut(&mut self) -> &mut Tensor4<T> {
        &mut self.left
    }

    /// Mutable right-half weights, for the external optimizer.
    pub fn right_mut(&mut self) -> &mut Tensor4<T> {
        &mut self.right
    }

    /// Mutable label tensor, for the external optimizer.
    pub fn center_mut(&mut self) -> &mut Tensor3<T> {
        &mut self.center
    }
}

fn gaussian<T: Scalar, R: Rng>(std: f64, rng: &mut R) -> T {
    let g: f64 = StandardNormal.sample(rng);
    T::from_f64(g * std)
}

fn random_tensor4<T: Scalar, R: Rng>(
    d: usize,
    h: usize,
    r: usize,
    std: f64,
    rng: &mut R,
) -> Tensor4<T> {
    let mut t = tensor4_zeros(d, h, r, r);
    for l in 0..d {
        for s in 0..h {
            for i in 0..r {
                for j in 0..r {
                    t[[l, s, i, j]] = gaussian(std, rng);
                }
            }
        }
    }
    t
}
