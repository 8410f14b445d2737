//! Per-sample phase/scale correction applied around the non-uniform
//! transform.

use std::f64::consts::PI;

use num_complex::Complex64;

/// One complex factor per sample per axis:
/// `factor[m] = interior_ft[m] * exp(-i pi xi_m)`.
///
/// The exponential compensates for the transform's centered coefficient
/// indexing; `interior_ft` is the Fourier transform of the interior scaling
/// function at the raw sample frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDiagonal {
    factors: Vec<Complex64>,
}

impl PhaseDiagonal {
    pub fn new(interior_ft: Vec<Complex64>, freqs: &[f64]) -> Self {
        assert_eq!(
            interior_ft.len(),
            freqs.len(),
            "one scaling evaluation per sample frequency"
        );
        let factors = interior_ft
            .into_iter()
            .zip(freqs)
            .map(|(ft, &xi)| ft * Complex64::from_polar(1.0, -PI * xi))
            .collect();
        Self { factors }
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    #[inline]
    pub fn factor(&self, m: usize) -> Complex64 {
        self.factors[m]
    }

    /// buf[m] *= factor[m]
    pub fn multiply(&self, buf: &mut [Complex64]) {
        assert_eq!(buf.len(), self.factors.len(), "phase length mismatch");
        for (value, factor) in buf.iter_mut().zip(&self.factors) {
            *value *= factor;
        }
    }

    /// buf[m] *= conj(factor[m])
    pub fn conj_multiply(&self, buf: &mut [Complex64]) {
        assert_eq!(buf.len(), self.factors.len(), "phase length mismatch");
        for (value, factor) in buf.iter_mut().zip(&self.factors) {
            *value *= factor.conj();
        }
    }
}
