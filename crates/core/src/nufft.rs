//! Seam for the external non-uniform Fourier transform.
//!
//! A plan is bound at construction to one fixed node set (in [-1/2, 1/2)
//! per axis) and one fixed coefficient-grid extent. The convention, which
//! every implementation must satisfy, uses centered coefficient indexing:
//!
//! forward: `g[m] = sum_k c[k] * exp(-2 pi i * x_m * (k - N/2))`
//! adjoint: `c[k] = sum_m g[m] * exp(+2 pi i * x_m * (k - N/2))`
//!
//! `N/2` is floor division; every grid this crate builds has even extent
//! except the degenerate single-coefficient case.
//!
//! 2-D plans are the separable product with the first axis fastest in the
//! flattened coefficient slice. Forward and adjoint must be algebraic
//! adjoints of each other to working precision. Implementations may run
//! multiple threads internally but present a blocking interface.

use num_complex::Complex64;

/// A planned transform bound to fixed nodes and grid extent.
pub trait NufftTransform {
    /// Number of samples M (length of the node set).
    fn num_samples(&self) -> usize;

    /// Total number of coefficient cells (product of per-axis extents).
    fn grid_len(&self) -> usize;

    /// Evaluates the Fourier sum at every node.
    ///
    /// `coeffs` has `grid_len()` entries, `out` has `num_samples()`.
    fn forward(&self, coeffs: &[Complex64], out: &mut [Complex64]);

    /// Conjugate-transpose of [`forward`](Self::forward).
    ///
    /// `samples` has `num_samples()` entries, `out` has `grid_len()`.
    fn adjoint(&self, samples: &[Complex64], out: &mut [Complex64]);
}

/// Factory producing plans for fixed node sets.
pub trait NufftBackend {
    type Plan: NufftTransform;

    fn plan_1d(&self, nodes: &[f64], extent: usize) -> Self::Plan;

    /// `nodes_x[m]`, `nodes_y[m]` are the per-axis coordinates of sample m.
    fn plan_2d(&self, nodes_x: &[f64], nodes_y: &[f64], extent: [usize; 2]) -> Self::Plan;
}
