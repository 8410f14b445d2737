//! Error types shared across the crate.

use num_complex::Complex64;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "scale 2^{scale} is too small for a wavelet with {vanishing_moments} vanishing moments"
    )]
    ScaleTooSmall { scale: u32, vanishing_moments: usize },

    #[error("non-uniform samples require a bandwidth")]
    MissingBandwidth,

    #[error("boundary correction leaves no interior functions at scale 2^{scale} (p = {vanishing_moments})")]
    TooFewWavelets { scale: u32, vanishing_moments: usize },

    #[error("dimension mismatch: expected length {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Carries the best estimate reached so the caller can still inspect a
    /// degraded reconstruction.
    #[error("solver did not converge: relative residual {residual:.3e} after {iterations} iterations")]
    SolverNonConvergence {
        residual: f64,
        iterations: usize,
        estimate: Vec<Complex64>,
    },

    #[error("weight computation failed: {0}")]
    Weights(String),
}
