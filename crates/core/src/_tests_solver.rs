#![cfg(test)]

use std::f64::consts::PI;

use num_complex::Complex64;

use super::error::Error;
use super::nufft::{NufftBackend, NufftTransform};
use super::operator::{Freq2Wave, LinearMap, OperatorSpec};
use super::samples::SampleSet;
use super::solver::{solve, SolverOptions};
use super::wavelet::{HaarFourier, Wavelet};
use super::weights::{VoronoiWeights, WeightProvider};

/// Explicit dense map, enough to drive the solver without an operator.
struct DenseMap {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl DenseMap {
    fn from_real_rows(rows: &[&[f64]]) -> Self {
        let cols = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|row| row.iter().map(|&value| Complex64::new(value, 0.0)))
            .collect();
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    fn matvec(&self, x: &[Complex64]) -> Vec<Complex64> {
        (0..self.rows)
            .map(|row| {
                x.iter()
                    .enumerate()
                    .map(|(col, &value)| self.data[row * self.cols + col] * value)
                    .sum()
            })
            .collect()
    }
}

impl LinearMap for DenseMap {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn apply(&mut self, coeffs: &[Complex64], out: &mut [Complex64]) -> Result<(), Error> {
        out.copy_from_slice(&self.matvec(coeffs));
        Ok(())
    }

    fn apply_adjoint(&mut self, samples: &[Complex64], out: &mut [Complex64]) -> Result<(), Error> {
        for (col, slot) in out.iter_mut().enumerate() {
            *slot = samples
                .iter()
                .enumerate()
                .map(|(row, &value)| self.data[row * self.cols + col].conj() * value)
                .sum();
        }
        Ok(())
    }
}

struct TestBackend;

struct TestPlan {
    nodes: Vec<f64>,
    extent: usize,
}

impl NufftBackend for TestBackend {
    type Plan = TestPlan;

    fn plan_1d(&self, nodes: &[f64], extent: usize) -> TestPlan {
        TestPlan {
            nodes: nodes.to_vec(),
            extent,
        }
    }

    fn plan_2d(&self, _nodes_x: &[f64], _nodes_y: &[f64], _extent: [usize; 2]) -> TestPlan {
        unreachable!("these tests only build 1-D operators");
    }
}

impl NufftTransform for TestPlan {
    fn num_samples(&self) -> usize {
        self.nodes.len()
    }

    fn grid_len(&self) -> usize {
        self.extent
    }

    fn forward(&self, coeffs: &[Complex64], out: &mut [Complex64]) {
        let half = (self.extent / 2) as f64;
        for (slot, &x) in out.iter_mut().zip(&self.nodes) {
            *slot = coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| c * Complex64::from_polar(1.0, -2.0 * PI * x * (k as f64 - half)))
                .sum();
        }
    }

    fn adjoint(&self, samples: &[Complex64], out: &mut [Complex64]) {
        let half = (self.extent / 2) as f64;
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self
                .nodes
                .iter()
                .zip(samples)
                .map(|(&x, &g)| g * Complex64::from_polar(1.0, 2.0 * PI * x * (k as f64 - half)))
                .sum();
        }
    }
}

fn deterministic_vector(len: usize, seed: u64) -> Vec<Complex64> {
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 1.0) * (seed as f64 + 0.5);
            Complex64::new((0.37 * t).sin(), (0.61 * t).cos())
        })
        .collect()
}

fn scattered_freqs(len: usize, band: f64) -> Vec<f64> {
    let golden = 0.618_033_988_749_894_9;
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 0.37) * golden;
            band * (2.0 * (t - t.floor()) - 1.0) * 0.97
        })
        .collect()
}

#[test]
fn consistent_system_is_solved_to_tolerance() {
    let mut map = DenseMap::from_real_rows(&[
        &[2.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0],
        &[0.0, 0.0, 0.5],
        &[0.3, 0.2, 0.1],
    ]);
    let target = deterministic_vector(3, 4);
    let b = map.matvec(&target);

    let opts = SolverOptions {
        max_iter: 50,
        tol: 1e-12,
    };
    let outcome = solve(&mut map, &b, &opts).unwrap();
    assert!(outcome.relative_residual <= 1e-12);
    for (got, want) in outcome.coefficients.iter().zip(&target) {
        assert!((got - want).norm() < 1e-9, "{got:?} vs {want:?}");
    }
}

#[test]
fn inconsistent_system_reports_the_best_estimate() {
    // Least-squares solution of [[1,0],[0,1],[1,1]] x = [1,2,0] is (0, 1)
    // with residual sqrt(3); the target can never be met, so the cap is
    // reached and the estimate rides along in the error.
    let mut map = DenseMap::from_real_rows(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
    let b = [
        Complex64::new(1.0, 0.0),
        Complex64::new(2.0, 0.0),
        Complex64::ZERO,
    ];

    let opts = SolverOptions {
        max_iter: 50,
        tol: 1e-6,
    };
    match solve(&mut map, &b, &opts) {
        Err(Error::SolverNonConvergence {
            residual,
            iterations,
            estimate,
        }) => {
            assert_eq!(iterations, 50);
            let expected = (3.0f64 / 5.0).sqrt();
            assert!((residual - expected).abs() < 1e-8);
            assert!((estimate[0] - Complex64::ZERO).norm() < 1e-8);
            assert!((estimate[1] - Complex64::new(1.0, 0.0)).norm() < 1e-8);
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
}

#[test]
fn zero_measurements_yield_the_zero_estimate() {
    let mut map = DenseMap::from_real_rows(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
    let b = vec![Complex64::ZERO; 3];
    let outcome = solve(&mut map, &b, &SolverOptions::default()).unwrap();
    assert_eq!(outcome.iterations, 0);
    assert!(outcome.coefficients.iter().all(|&c| c == Complex64::ZERO));
}

#[test]
fn measurement_length_is_checked() {
    let mut map = DenseMap::from_real_rows(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
    let b = vec![Complex64::ZERO; 2];
    assert!(matches!(
        solve(&mut map, &b, &SolverOptions::default()),
        Err(Error::DimensionMismatch {
            expected: 3,
            got: 2
        })
    ));
}

#[test]
fn non_uniform_reconstruction_recovers_known_coefficients() {
    // M = 50 scattered frequencies, bandwidth 20, J = 4 (2^4 <= 2B):
    // measurements synthesized from known coefficients must be recovered.
    let freqs = scattered_freqs(50, 8.0);
    let samples = SampleSet::One(freqs.clone());
    let spec = OperatorSpec {
        wavelet: Wavelet::haar(),
        scale: 4,
        bandwidth: Some(20.0),
    };
    let mut op =
        Freq2Wave::new(&TestBackend, &samples, spec, &HaarFourier, &VoronoiWeights).unwrap();
    assert!(!op.is_uniform());

    // apply() already carries the square-root weighting, while solve()
    // expects raw model measurements; divide the weighting back out.
    let target = deterministic_vector(16, 3);
    let mut measurements = vec![Complex64::ZERO; 50];
    op.apply(&target, &mut measurements).unwrap();
    let weights = VoronoiWeights.weights_1d(&freqs, 20.0).unwrap();
    for (value, &w) in measurements.iter_mut().zip(&weights) {
        *value /= w.sqrt();
    }

    let opts = SolverOptions {
        max_iter: 300,
        tol: 1e-9,
    };
    let outcome = op.solve(&measurements, &opts).unwrap();
    for (got, want) in outcome.coefficients.iter().zip(&target) {
        assert!((got - want).norm() < 1e-6, "{got:?} vs {want:?}");
    }
}

#[test]
fn exhausted_iteration_cap_is_an_error_with_diagnostics() {
    let samples = SampleSet::One(scattered_freqs(50, 8.0));
    let spec = OperatorSpec {
        wavelet: Wavelet::haar(),
        scale: 4,
        bandwidth: Some(20.0),
    };
    let mut op =
        Freq2Wave::new(&TestBackend, &samples, spec, &HaarFourier, &VoronoiWeights).unwrap();

    let target = deterministic_vector(16, 6);
    let mut measurements = vec![Complex64::ZERO; 50];
    op.apply(&target, &mut measurements).unwrap();

    let opts = SolverOptions {
        max_iter: 2,
        tol: 1e-14,
    };
    match op.solve(&measurements, &opts) {
        Err(Error::SolverNonConvergence {
            iterations,
            estimate,
            ..
        }) => {
            assert_eq!(iterations, 2);
            assert_eq!(estimate.len(), 16);
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
}
