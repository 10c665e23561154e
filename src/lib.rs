#![warn(missing_docs)]
//! MPS tensor-network classifier core
//!
//! This crate implements the contraction layer of a supervised classifier
//! based on a Matrix Product State (MPS) tensor network:
//! - `embedding`: maps each scalar feature `x` to the local vector `[1-x, x]`
//! - `bank`: owns the learnable site tensors (left half, right half, label
//!   site) and their initializers
//! - `reduction`: log-depth pairwise-product reduction of a matrix chain
//! - `model`: the forward pass producing per-class scores
//!
//! Differentiation and optimization are external: the bank exposes mutable
//! access to its tensors and the forward pass only reads them.
//!
//! # Example
//!
//! ```
//! use mps_classifier::{MpsClassifier, MpsConfig, SiteTensorBank};
//! use mps_classifier::types::tensor2_from_data;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // 4 features, bond dimension 2, 3 classes
//! let config = MpsConfig::new(4, 2, 3).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let bank = SiteTensorBank::<f64>::near_identity(&config, 1e-2, &mut rng);
//! let model = MpsClassifier::new(bank);
//!
//! let batch = tensor2_from_data(vec![0.2, 0.8, 0.5, 0.1], 1, 4);
//! let scores = model.forward(&batch).unwrap();
//! assert_eq!(scores.dim(0), 1);
//! assert_eq!(scores.dim(1), 3);
//! ```

pub mod bank;
pub mod embedding;
pub mod error;
pub mod model;
pub mod reduction;
pub mod scalar;
pub mod types;

// Re-export main types
pub use bank::{MpsConfig, SiteTensorBank};
pub use embedding::{embed, embed_one, Embedding, LOCAL_DIM};
pub use error::{ClassifierError, Result};
pub use model::{Forward, MpsClassifier};
pub use reduction::{chain_product, matmul_batched, reduce_chain};
pub use scalar::Scalar;
pub use types::{Tensor2, Tensor3, Tensor4};
