#![cfg(test)]

use std::f64::consts::PI;

use num_complex::Complex64;

use super::boundary::Side;
use super::wavelet::{HaarFourier, ScalingFourier, Wavelet};

#[test]
fn names_resolve_to_descriptors() {
    let haar = Wavelet::from_name("haar").unwrap();
    assert_eq!(haar.vanishing_moments(), 1);
    assert!(!haar.has_boundary());

    let db4 = Wavelet::from_name("db4").unwrap();
    assert_eq!(db4.vanishing_moments(), 4);
    assert!(db4.has_boundary());

    assert!(Wavelet::from_name("db1").is_none());
    assert!(Wavelet::from_name("db11").is_none());
    assert!(Wavelet::from_name("sym4").is_none());
}

#[test]
fn min_scale_admits_the_support() {
    assert_eq!(Wavelet::haar().min_scale(), 0);
    assert_eq!(Wavelet::new(2, true).min_scale(), 2); // 2^2 = 4 >= 3
    assert_eq!(Wavelet::new(4, true).min_scale(), 3); // 2^3 = 8 >= 7
}

#[test]
fn haar_interior_at_zero_frequency_is_the_scale_norm() {
    let values = HaarFourier.interior(&[0.0], Wavelet::haar(), 4);
    let expected = 1.0 / 4.0; // 2^(-J/2) with J = 4
    assert!((values[0] - Complex64::new(expected, 0.0)).norm() < 1e-12);
}

#[test]
fn haar_interior_magnitude_decays_as_sinc() {
    let scale = 3;
    let xi = 2.0;
    let values = HaarFourier.interior(&[xi], Wavelet::haar(), scale);
    let omega = xi / 8.0;
    let expected = (PI * omega).sin() / (PI * omega) / 8f64.sqrt();
    assert!((values[0].norm() - expected.abs()).abs() < 1e-12);
}

#[test]
fn haar_boundary_blocks_are_phased_translates() {
    let freqs = [0.5, -1.5, 3.0];
    let scale = 3;
    let wavelet = Wavelet::new(1, true);
    let interior = HaarFourier.interior(&freqs, wavelet, scale);
    let left = HaarFourier.boundary(&freqs, wavelet, scale, Side::Left);
    let right = HaarFourier.boundary(&freqs, wavelet, scale, Side::Right);

    assert_eq!(left.rows(), 3);
    assert_eq!(left.cols(), 1);
    for (m, &xi) in freqs.iter().enumerate() {
        assert!((left.get(m, 0) - interior[m]).norm() < 1e-12);
        let shift = Complex64::from_polar(1.0, -2.0 * PI * 7.0 * xi / 8.0);
        assert!((right.get(m, 0) - interior[m] * shift).norm() < 1e-12);
    }
}
