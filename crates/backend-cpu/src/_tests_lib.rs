#![cfg(test)]

use std::f64::consts::PI;

use gsamp_core::nufft::{NufftBackend, NufftTransform};
use num_complex::Complex64;

use super::CpuBackend;

fn deterministic_vector(len: usize, seed: u64) -> Vec<Complex64> {
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 1.0) * (seed as f64 + 0.5);
            Complex64::new((0.37 * t).sin(), (0.61 * t).cos())
        })
        .collect()
}

fn scattered_nodes(len: usize) -> Vec<f64> {
    // Low-discrepancy fill of [-1/2, 1/2), nowhere near the FFT grid.
    let golden = 0.618_033_988_749_894_9;
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 0.37) * golden;
            t - t.floor() - 0.5
        })
        .collect()
}

fn naive_forward_1d(nodes: &[f64], extent: usize, coeffs: &[Complex64]) -> Vec<Complex64> {
    let half = (extent / 2) as f64;
    nodes
        .iter()
        .map(|&x| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| c * Complex64::from_polar(1.0, -2.0 * PI * x * (k as f64 - half)))
                .sum()
        })
        .collect()
}

fn naive_adjoint_1d(nodes: &[f64], extent: usize, samples: &[Complex64]) -> Vec<Complex64> {
    let half = (extent / 2) as f64;
    (0..extent)
        .map(|k| {
            nodes
                .iter()
                .zip(samples)
                .map(|(&x, &g)| g * Complex64::from_polar(1.0, 2.0 * PI * x * (k as f64 - half)))
                .sum()
        })
        .collect()
}

fn inner_product(a: &[Complex64], b: &[Complex64]) -> Complex64 {
    a.iter().zip(b).map(|(lhs, rhs)| lhs.conj() * rhs).sum()
}

fn assert_vectors_close(a: &[Complex64], b: &[Complex64], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (lhs, rhs) in a.iter().zip(b) {
        assert!(
            (lhs - rhs).norm() < tol,
            "vectors differ: {lhs:?} vs {rhs:?}"
        );
    }
}

#[test]
fn fast_path_matches_direct_summation() {
    let m = 16;
    let extent = 8;
    let nodes: Vec<f64> = (0..m).map(|i| -0.5 + i as f64 / m as f64).collect();
    let plan = CpuBackend::new().plan_1d(&nodes, extent);

    let coeffs = deterministic_vector(extent, 3);
    let mut out = vec![Complex64::ZERO; m];
    plan.forward(&coeffs, &mut out);

    let expected = naive_forward_1d(&nodes, extent, &coeffs);
    assert_vectors_close(&out, &expected, 1e-10);
}

#[test]
fn fast_path_adjoint_matches_direct_summation() {
    let m = 12;
    let extent = 6;
    let nodes: Vec<f64> = (0..m).map(|i| -0.5 + i as f64 / m as f64).collect();
    let plan = CpuBackend::new().plan_1d(&nodes, extent);

    let samples = deterministic_vector(m, 9);
    let mut out = vec![Complex64::ZERO; extent];
    plan.adjoint(&samples, &mut out);

    let expected = naive_adjoint_1d(&nodes, extent, &samples);
    assert_vectors_close(&out, &expected, 1e-10);
}

#[test]
fn forward_and_adjoint_are_algebraic_adjoints_1d() {
    let extent = 10;
    let nodes = scattered_nodes(17);
    let plan = CpuBackend::new().plan_1d(&nodes, extent);

    let coeffs = deterministic_vector(extent, 5);
    let samples = deterministic_vector(nodes.len(), 11);
    let mut forward_out = vec![Complex64::ZERO; nodes.len()];
    let mut adjoint_out = vec![Complex64::ZERO; extent];
    plan.forward(&coeffs, &mut forward_out);
    plan.adjoint(&samples, &mut adjoint_out);

    let lhs = inner_product(&forward_out, &samples);
    let rhs = inner_product(&coeffs, &adjoint_out);
    assert!((lhs - rhs).norm() < 1e-9, "adjoint identity violated: {lhs} vs {rhs}");
}

#[test]
fn forward_and_adjoint_are_algebraic_adjoints_2d() {
    let extent = [4, 6];
    let nodes_x = scattered_nodes(13);
    let nodes_y: Vec<f64> = scattered_nodes(13).iter().map(|x| -x).collect();
    let plan = CpuBackend::new().plan_2d(&nodes_x, &nodes_y, extent);

    let coeffs = deterministic_vector(extent[0] * extent[1], 7);
    let samples = deterministic_vector(13, 2);
    let mut forward_out = vec![Complex64::ZERO; 13];
    let mut adjoint_out = vec![Complex64::ZERO; extent[0] * extent[1]];
    plan.forward(&coeffs, &mut forward_out);
    plan.adjoint(&samples, &mut adjoint_out);

    let lhs = inner_product(&forward_out, &samples);
    let rhs = inner_product(&coeffs, &adjoint_out);
    assert!((lhs - rhs).norm() < 1e-9, "adjoint identity violated: {lhs} vs {rhs}");
}

#[test]
fn plane_plan_is_separable() {
    let extent = [3, 5];
    let nodes_x = scattered_nodes(9);
    let nodes_y: Vec<f64> = scattered_nodes(9).iter().rev().copied().collect();
    let plan = CpuBackend::new().plan_2d(&nodes_x, &nodes_y, extent);

    // A rank-one coefficient grid c[kx, ky] = a[kx] * b[ky] must transform
    // to the product of the per-axis sums.
    let a = deterministic_vector(extent[0], 4);
    let b = deterministic_vector(extent[1], 6);
    let mut coeffs = vec![Complex64::ZERO; extent[0] * extent[1]];
    for ky in 0..extent[1] {
        for kx in 0..extent[0] {
            coeffs[ky * extent[0] + kx] = a[kx] * b[ky];
        }
    }
    let mut out = vec![Complex64::ZERO; 9];
    plan.forward(&coeffs, &mut out);

    let ax = naive_forward_1d(&nodes_x, extent[0], &a);
    let by = naive_forward_1d(&nodes_y, extent[1], &b);
    let expected: Vec<Complex64> = ax.iter().zip(&by).map(|(&u, &v)| u * v).collect();
    assert_vectors_close(&out, &expected, 1e-9);
}

#[test]
fn plan_reports_its_shape() {
    let plan = CpuBackend::new().plan_1d(&scattered_nodes(7), 12);
    assert_eq!(plan.num_samples(), 7);
    assert_eq!(plan.grid_len(), 12);

    let plan = CpuBackend::new().plan_2d(&scattered_nodes(5), &scattered_nodes(5), [4, 8]);
    assert_eq!(plan.num_samples(), 5);
    assert_eq!(plan.grid_len(), 32);
}
