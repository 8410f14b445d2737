//! Wavelet descriptors and the scaling-function Fourier evaluator seam.
//!
//! The operator only needs two facts about a wavelet family: its number of
//! vanishing moments and whether its basis uses boundary correction. The
//! Fourier transforms of the scaling function itself come from a
//! [`ScalingFourier`] collaborator; this module ships [`HaarFourier`], the
//! closed-form reference evaluator. Richer families plug in through the
//! same trait.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::boundary::{DenseBlock, Side};

/// Static description of a wavelet family as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wavelet {
    vanishing_moments: usize,
    boundary: bool,
}

impl Wavelet {
    pub fn new(vanishing_moments: usize, boundary: bool) -> Self {
        assert!(vanishing_moments >= 1, "wavelets have at least one vanishing moment");
        Self {
            vanishing_moments,
            boundary,
        }
    }

    pub fn haar() -> Self {
        Self::new(1, false)
    }

    /// Parses "haar" or "dbN" (N = 2..=10, boundary-corrected).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("haar") {
            return Some(Self::haar());
        }
        let digits = name.strip_prefix("db")?;
        let p: usize = digits.parse().ok()?;
        (2..=10).contains(&p).then(|| Self::new(p, true))
    }

    pub fn vanishing_moments(&self) -> usize {
        self.vanishing_moments
    }

    pub fn has_boundary(&self) -> bool {
        self.boundary
    }

    /// Smallest scale J with 2^J >= 2p - 1.
    pub fn min_scale(&self) -> u32 {
        let mut scale = 0;
        while (1usize << scale) < 2 * self.vanishing_moments - 1 {
            scale += 1;
        }
        scale
    }
}

/// Fourier transforms of scaling functions at given sample frequencies.
///
/// Both methods are deterministic, pure functions of their inputs. The
/// returned values are for the scale-J dilation, so they carry the
/// `2^(-J/2)` normalization. Boundary evaluations arrive fully phased,
/// including the translation of right-edge functions; the operator copies
/// them verbatim.
pub trait ScalingFourier {
    /// One evaluation per frequency for the interior (translation-neutral)
    /// scaling function.
    fn interior(&self, freqs: &[f64], wavelet: Wavelet, scale: u32) -> Vec<Complex64>;

    /// M x p block of boundary-function evaluations for one side.
    fn boundary(&self, freqs: &[f64], wavelet: Wavelet, scale: u32, side: Side) -> DenseBlock;
}

/// Closed-form evaluator for the Haar scaling function.
///
/// The Haar basis needs no boundary correction; the "boundary" block is the
/// phased first (or last) translate, which makes a Haar boundary operator
/// agree column-for-column with the interior-only one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaarFourier;

impl HaarFourier {
    /// 2^(-J/2) * phi_hat(xi / 2^J) for the unit-interval indicator.
    fn scale_j(freq: f64, scale: u32) -> Complex64 {
        let extent = (1u64 << scale) as f64;
        let omega = freq / extent;
        extent.sqrt().recip() * haar_hat(omega)
    }
}

impl ScalingFourier for HaarFourier {
    fn interior(&self, freqs: &[f64], wavelet: Wavelet, scale: u32) -> Vec<Complex64> {
        assert_eq!(wavelet.vanishing_moments(), 1, "Haar has one vanishing moment");
        freqs.iter().map(|&xi| Self::scale_j(xi, scale)).collect()
    }

    fn boundary(&self, freqs: &[f64], wavelet: Wavelet, scale: u32, side: Side) -> DenseBlock {
        assert_eq!(wavelet.vanishing_moments(), 1, "Haar has one vanishing moment");
        let extent = (1u64 << scale) as f64;
        let shift = match side {
            Side::Left => 0.0,
            Side::Right => extent - 1.0,
        };
        let column: Vec<Complex64> = freqs
            .iter()
            .map(|&xi| {
                Self::scale_j(xi, scale)
                    * Complex64::from_polar(1.0, -2.0 * PI * shift * xi / extent)
            })
            .collect();
        DenseBlock::new(freqs.len(), 1, column)
    }
}

/// Fourier transform of the indicator of [0, 1):
/// `exp(-i pi w) * sin(pi w) / (pi w)`.
fn haar_hat(omega: f64) -> Complex64 {
    let t = PI * omega;
    let sinc = if t.abs() < 1e-12 { 1.0 } else { t.sin() / t };
    Complex64::from_polar(sinc, -t)
}
