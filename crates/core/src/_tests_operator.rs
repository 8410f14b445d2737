#![cfg(test)]

use std::f64::consts::PI;

use num_complex::Complex64;

use super::boundary::{DenseBlock, Side};
use super::diag::Warning;
use super::error::Error;
use super::grid::CoeffGrid;
use super::nufft::{NufftBackend, NufftTransform};
use super::operator::{Freq2Wave, OperatorSpec};
use super::samples::SampleSet;
use super::wavelet::{HaarFourier, ScalingFourier, Wavelet};
use super::weights::VoronoiWeights;

struct TestBackend;

struct TestPlan {
    nodes_x: Vec<f64>,
    nodes_y: Option<Vec<f64>>,
    extent: [usize; 2],
}

impl NufftBackend for TestBackend {
    type Plan = TestPlan;

    fn plan_1d(&self, nodes: &[f64], extent: usize) -> TestPlan {
        TestPlan {
            nodes_x: nodes.to_vec(),
            nodes_y: None,
            extent: [extent, 1],
        }
    }

    fn plan_2d(&self, nodes_x: &[f64], nodes_y: &[f64], extent: [usize; 2]) -> TestPlan {
        TestPlan {
            nodes_x: nodes_x.to_vec(),
            nodes_y: Some(nodes_y.to_vec()),
            extent,
        }
    }
}

impl NufftTransform for TestPlan {
    fn num_samples(&self) -> usize {
        self.nodes_x.len()
    }

    fn grid_len(&self) -> usize {
        self.extent[0] * self.extent[1]
    }

    fn forward(&self, coeffs: &[Complex64], out: &mut [Complex64]) {
        let [nx, ny] = self.extent;
        let half_x = (nx / 2) as f64;
        let half_y = (ny / 2) as f64;
        for (m, slot) in out.iter_mut().enumerate() {
            let x = self.nodes_x[m];
            let y = self.nodes_y.as_ref().map_or(0.0, |nodes| nodes[m]);
            let mut acc = Complex64::ZERO;
            for ky in 0..ny {
                for kx in 0..nx {
                    let angle = -2.0
                        * PI
                        * (x * (kx as f64 - half_x) + y * (ky as f64 - half_y));
                    acc += coeffs[ky * nx + kx] * Complex64::from_polar(1.0, angle);
                }
            }
            *slot = acc;
        }
    }

    fn adjoint(&self, samples: &[Complex64], out: &mut [Complex64]) {
        let [nx, ny] = self.extent;
        let half_x = (nx / 2) as f64;
        let half_y = (ny / 2) as f64;
        for ky in 0..ny {
            for kx in 0..nx {
                let mut acc = Complex64::ZERO;
                for (m, &value) in samples.iter().enumerate() {
                    let x = self.nodes_x[m];
                    let y = self.nodes_y.as_ref().map_or(0.0, |nodes| nodes[m]);
                    let angle =
                        2.0 * PI * (x * (kx as f64 - half_x) + y * (ky as f64 - half_y));
                    acc += value * Complex64::from_polar(1.0, angle);
                }
                out[ky * nx + kx] = acc;
            }
        }
    }
}

/// Deterministic stand-in for a boundary-corrected scaling evaluator with
/// p >= 2; the operator only relies on its shapes and determinism.
struct SyntheticFourier;

impl ScalingFourier for SyntheticFourier {
    fn interior(&self, freqs: &[f64], _wavelet: Wavelet, scale: u32) -> Vec<Complex64> {
        let norm = ((1u64 << scale) as f64).sqrt().recip();
        freqs
            .iter()
            .map(|&xi| {
                let magnitude = norm * (0.6 + 0.4 / (1.0 + 0.05 * xi * xi));
                Complex64::from_polar(magnitude, 0.2 * xi)
            })
            .collect()
    }

    fn boundary(&self, freqs: &[f64], wavelet: Wavelet, scale: u32, side: Side) -> DenseBlock {
        let p = wavelet.vanishing_moments();
        let norm = ((1u64 << scale) as f64).sqrt().recip();
        let sign = match side {
            Side::Left => 1.0,
            Side::Right => -1.0,
        };
        DenseBlock::from_fn(freqs.len(), p, |m, j| {
            let xi = freqs[m];
            let magnitude = norm * 0.5 / (1.0 + j as f64);
            Complex64::from_polar(magnitude, sign * (0.3 + 0.15 * j as f64) * xi + 0.1 * j as f64)
        })
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

/// Low-discrepancy frequencies strictly inside (-band, band).
fn scattered_freqs(len: usize, band: f64) -> Vec<f64> {
    let golden = 0.618_033_988_749_894_9;
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 0.37) * golden;
            band * (2.0 * (t - t.floor()) - 1.0) * 0.97
        })
        .collect()
}

fn scattered_points(len: usize, band: f64) -> Vec<[f64; 2]> {
    let xs = scattered_freqs(len, band);
    let silver = 0.414_213_562_373_095_1;
    xs.into_iter()
        .enumerate()
        .map(|(idx, x)| {
            let t = (idx as f64 + 0.71) * silver;
            [x, band * (2.0 * (t - t.floor()) - 1.0) * 0.97]
        })
        .collect()
}

fn uniform_freqs_1d() -> SampleSet {
    SampleSet::One((0..32).map(|m| -8.0 + 0.5 * m as f64).collect())
}

fn build(
    samples: &SampleSet,
    wavelet: Wavelet,
    scale: u32,
    bandwidth: Option<f64>,
) -> Result<Freq2Wave<TestBackend>, Error> {
    let fourier: Box<dyn ScalingFourier> = if wavelet.vanishing_moments() == 1 {
        Box::new(HaarFourier)
    } else {
        Box::new(SyntheticFourier)
    };
    Freq2Wave::new(
        &TestBackend,
        samples,
        OperatorSpec {
            wavelet,
            scale,
            bandwidth,
        },
        fourier.as_ref(),
        &VoronoiWeights,
    )
}

fn inner_product(a: &[Complex64], b: &[Complex64]) -> Complex64 {
    a.iter().zip(b).map(|(lhs, rhs)| lhs.conj() * rhs).sum()
}

fn assert_dense_agrees_with_apply(op: &mut Freq2Wave<TestBackend>, tol: f64) {
    let dense = op.to_dense_matrix();
    let n = op.num_coeffs();
    let m = op.num_samples();
    let mut basis = vec![Complex64::ZERO; n];
    let mut out = vec![Complex64::ZERO; m];
    for col in 0..n {
        basis.fill(Complex64::ZERO);
        basis[col] = Complex64::new(1.0, 0.0);
        op.apply(&basis, &mut out).unwrap();
        let expected = dense.column(col);
        for (row, (&got, &want)) in out.iter().zip(&expected).enumerate() {
            assert!(
                (got - want).norm() < tol,
                "column {col}, row {row}: {got:?} vs {want:?}"
            );
        }
    }
}

fn assert_adjoint_identity(op: &mut Freq2Wave<TestBackend>, tol: f64) {
    let x = deterministic_vector(op.num_coeffs(), 5);
    let v = deterministic_vector(op.num_samples(), 8);
    let mut ax = vec![Complex64::ZERO; op.num_samples()];
    let mut ahv = vec![Complex64::ZERO; op.num_coeffs()];
    op.apply(&x, &mut ax).unwrap();
    op.apply_adjoint(&v, &mut ahv).unwrap();
    let lhs = inner_product(&ax, &v);
    let rhs = inner_product(&x, &ahv);
    assert!(
        (lhs - rhs).norm() < tol,
        "adjoint identity violated: {lhs} vs {rhs}"
    );
}

// ---------------------------------------------------------------------------
// Construction and shape contract
// ---------------------------------------------------------------------------

#[test]
fn scale_below_wavelet_support_is_rejected() {
    let samples = uniform_freqs_1d();
    let result = build(&samples, Wavelet::new(3, true), 2, None);
    assert!(matches!(result, Err(Error::ScaleTooSmall { .. })));
}

#[test]
fn boundary_overlap_consuming_the_interior_is_rejected() {
    let samples = uniform_freqs_1d();
    // 2^4 - 2*2 = 12 > 0: fine.
    assert!(build(&samples, Wavelet::new(2, true), 4, None).is_ok());
    // 2^2 - 2*2 = 0: no interior left.
    let result = build(&samples, Wavelet::new(2, true), 2, None);
    assert!(matches!(result, Err(Error::TooFewWavelets { .. })));
}

#[test]
fn non_uniform_samples_without_bandwidth_are_rejected() {
    let samples = SampleSet::One(scattered_freqs(20, 10.0));
    let result = build(&samples, Wavelet::haar(), 3, None);
    assert!(matches!(result, Err(Error::MissingBandwidth)));
}

#[test]
fn shape_queries_describe_the_operator() {
    let samples = uniform_freqs_1d();
    let op = build(&samples, Wavelet::haar(), 4, None).unwrap();
    assert_eq!(op.num_samples(), 32);
    assert_eq!(op.num_coeffs(), 16);
    assert_eq!(op.shape(), CoeffGrid::One { n: 16 });
    assert_eq!(op.dimension(), 1);
    assert_eq!(op.scale(), 4);
    assert_eq!(op.vanishing_moments(), 1);
    assert!(!op.has_boundary());
    assert!(op.is_uniform());

    let samples = SampleSet::Two(scattered_points(80, 5.0));
    let op = build(&samples, Wavelet::new(2, true), 3, Some(5.0)).unwrap();
    assert_eq!(op.num_samples(), 80);
    assert_eq!(op.num_coeffs(), 64);
    assert_eq!(op.shape(), CoeffGrid::Two { nx: 8, ny: 8 });
    assert_eq!(op.dimension(), 2);
    assert!(op.has_boundary());
    assert!(!op.is_uniform());
}

#[test]
fn under_determined_systems_warn_but_construct() {
    let samples = SampleSet::One((0..8).map(|m| m as f64 - 4.0).collect());
    let op = build(&samples, Wavelet::haar(), 4, None).unwrap();
    assert!(op
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::UnderDetermined { .. })));
}

#[test]
fn scale_beyond_bandwidth_warns_but_constructs() {
    let samples = SampleSet::One(scattered_freqs(40, 5.0));
    let op = build(&samples, Wavelet::haar(), 4, Some(5.0)).unwrap();
    assert!(op
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::BandwidthExceeded { .. })));
}

#[test]
fn well_posed_construction_carries_no_warnings() {
    let samples = SampleSet::One(scattered_freqs(40, 10.0));
    let op = build(&samples, Wavelet::haar(), 4, Some(10.0)).unwrap();
    assert!(op.warnings().is_empty());
}

#[test]
fn uniform_operators_ignore_the_bandwidth() {
    let samples = uniform_freqs_1d();
    let mut plain = build(&samples, Wavelet::haar(), 4, None).unwrap();
    let mut with_bandwidth = build(&samples, Wavelet::haar(), 4, Some(7.3)).unwrap();
    assert!(plain.is_uniform() && with_bandwidth.is_uniform());

    let x = deterministic_vector(16, 3);
    let mut out_a = vec![Complex64::ZERO; 32];
    let mut out_b = vec![Complex64::ZERO; 32];
    plain.apply(&x, &mut out_a).unwrap();
    with_bandwidth.apply(&x, &mut out_b).unwrap();
    // Bit-for-bit: the weight provider is never consulted for uniform sets.
    assert_eq!(out_a, out_b);
}

#[test]
fn mismatched_shapes_are_rejected_not_truncated() {
    let samples = uniform_freqs_1d();
    let mut op = build(&samples, Wavelet::haar(), 4, None).unwrap();

    let short = vec![Complex64::ZERO; 15];
    let mut out = vec![Complex64::ZERO; 32];
    assert!(matches!(
        op.apply(&short, &mut out),
        Err(Error::DimensionMismatch {
            expected: 16,
            got: 15
        })
    ));

    let coeffs = vec![Complex64::ZERO; 16];
    let mut bad_out = vec![Complex64::ZERO; 31];
    assert!(matches!(
        op.apply(&coeffs, &mut bad_out),
        Err(Error::DimensionMismatch { .. })
    ));

    let bad_samples = vec![Complex64::ZERO; 33];
    let mut grid = vec![Complex64::ZERO; 16];
    assert!(matches!(
        op.apply_adjoint(&bad_samples, &mut grid),
        Err(Error::DimensionMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn unit_impulse_reproduces_the_scaling_evaluation() {
    // J = 4, N = 16, M = 32 uniform frequencies in [-8, 8): the first basis
    // function sits at the origin, so its column is the bare interior
    // evaluation with unit phase.
    let samples = uniform_freqs_1d();
    let freqs = samples.axis_coords(0);
    let mut op = build(&samples, Wavelet::haar(), 4, None).unwrap();

    let mut impulse = vec![Complex64::ZERO; 16];
    impulse[0] = Complex64::new(1.0, 0.0);
    let mut out = vec![Complex64::ZERO; 32];
    op.apply(&impulse, &mut out).unwrap();

    let expected = HaarFourier.interior(&freqs, Wavelet::haar(), 4);
    for (m, (&got, &want)) in out.iter().zip(&expected).enumerate() {
        assert!(
            (got - want).norm() < 1e-12,
            "sample {m}: {got:?} vs {want:?}"
        );
    }
}

#[test]
fn flattened_grid_products_match_the_documented_order() {
    // 2-D, no boundary, J = 3: apply must equal the dense matrix times the
    // grid flattened x-fastest.
    let samples = SampleSet::Two(scattered_points(20, 4.0));
    let mut op = build(&samples, Wavelet::haar(), 3, Some(4.0)).unwrap();
    let dense = op.to_dense_matrix();

    let shape = op.shape();
    let mut grid = vec![Complex64::ZERO; 64];
    for iy in 0..8 {
        for ix in 0..8 {
            let t = (ix as f64 + 1.0) * (iy as f64 + 0.7);
            grid[shape.idx(ix, iy)] = Complex64::new((0.41 * t).sin(), (0.23 * t).cos());
        }
    }
    let mut out = vec![Complex64::ZERO; 20];
    op.apply(&grid, &mut out).unwrap();
    let expected = dense.matvec(&grid);
    for (&got, &want) in out.iter().zip(&expected) {
        assert!((got - want).norm() < 1e-9, "{got:?} vs {want:?}");
    }
}

#[test]
fn haar_boundary_operator_equals_the_interior_one() {
    // With p = 1 the boundary "correction" is the unchanged edge translate,
    // so both variants materialize the same matrix.
    let samples = uniform_freqs_1d();
    let interior_op = build(&samples, Wavelet::haar(), 3, None).unwrap();
    let boundary_op = build(&samples, Wavelet::new(1, true), 3, None).unwrap();

    let a = interior_op.to_dense_matrix();
    let b = boundary_op.to_dense_matrix();
    assert_eq!(a.rows(), b.rows());
    assert_eq!(a.cols(), b.cols());
    for row in 0..a.rows() {
        for col in 0..a.cols() {
            assert!(
                (a.get(row, col) - b.get(row, col)).norm() < 1e-12,
                "entry ({row}, {col}) differs"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Dense/apply agreement and adjointness, all four kernel variants
// ---------------------------------------------------------------------------

#[test]
fn dense_agrees_with_apply_1d_interior() {
    let samples = SampleSet::One(scattered_freqs(11, 5.0));
    let mut op = build(&samples, Wavelet::haar(), 3, Some(5.0)).unwrap();
    assert_dense_agrees_with_apply(&mut op, 1e-9);
}

#[test]
fn dense_agrees_with_apply_1d_boundary() {
    let samples = SampleSet::One(scattered_freqs(9, 10.0));
    let mut op = build(&samples, Wavelet::new(2, true), 4, Some(10.0)).unwrap();
    assert_dense_agrees_with_apply(&mut op, 1e-9);

    let uniform = uniform_freqs_1d();
    let mut op = build(&uniform, Wavelet::new(2, true), 4, None).unwrap();
    assert_dense_agrees_with_apply(&mut op, 1e-9);
}

#[test]
fn dense_agrees_with_apply_2d_interior() {
    let samples = SampleSet::Two(scattered_points(10, 3.0));
    let mut op = build(&samples, Wavelet::haar(), 2, Some(3.0)).unwrap();
    assert_dense_agrees_with_apply(&mut op, 1e-9);
}

#[test]
fn dense_agrees_with_apply_2d_boundary() {
    let samples = SampleSet::Two(scattered_points(9, 5.0));
    let mut op = build(&samples, Wavelet::new(2, true), 3, Some(5.0)).unwrap();
    assert_dense_agrees_with_apply(&mut op, 1e-9);
}

#[test]
fn adjoint_identity_1d_interior() {
    let samples = SampleSet::One(scattered_freqs(13, 6.0));
    let mut op = build(&samples, Wavelet::haar(), 3, Some(6.0)).unwrap();
    assert_adjoint_identity(&mut op, 1e-9);
}

#[test]
fn adjoint_identity_1d_boundary() {
    let samples = SampleSet::One(scattered_freqs(15, 10.0));
    let mut op = build(&samples, Wavelet::new(2, true), 4, Some(10.0)).unwrap();
    assert_adjoint_identity(&mut op, 1e-9);
}

#[test]
fn adjoint_identity_2d_interior() {
    let samples = SampleSet::Two(scattered_points(14, 3.0));
    let mut op = build(&samples, Wavelet::haar(), 2, Some(3.0)).unwrap();
    assert_adjoint_identity(&mut op, 1e-9);
}

#[test]
fn adjoint_identity_2d_boundary() {
    let samples = SampleSet::Two(scattered_points(12, 5.0));
    let mut op = build(&samples, Wavelet::new(2, true), 3, Some(5.0)).unwrap();
    assert_adjoint_identity(&mut op, 1e-9);

    // The uniform grid exercises the unweighted walk as well.
    let mut points = Vec::new();
    for iy in 0..5 {
        for ix in 0..5 {
            points.push([ix as f64 - 2.0, iy as f64 - 2.0]);
        }
    }
    let mut op = build(&SampleSet::Two(points), Wavelet::new(2, true), 3, None).unwrap();
    assert!(op.is_uniform());
    assert_adjoint_identity(&mut op, 1e-9);
}
