//! Scalar trait for the contraction kernels
//!
//! The engine is generic over a minimal real scalar. Initializers sample
//! Gaussian noise in `f64` and convert through [`Scalar::from_f64`].

use num_traits::{One, Zero};

/// Minimal requirements for scalars flowing through the contraction engine.
pub trait Scalar:
    Clone
    + Copy
    + Zero
    + One
    + PartialEq
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
    + std::fmt::Debug
    + Default
    + Send
    + Sync
    + 'static
{
    /// Create from an f64 value.
    fn from_f64(val: f64) -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(val: f64) -> Self {
        val
    }
}

impl Scalar for f32 {
    #[inline]
    fn from_f64(val: f64) -> Self {
        val as f32
    }
}
