use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gsamp_backend_cpu::CpuBackend;
use gsamp_core::{
    operator::{Freq2Wave, OperatorSpec},
    samples::SampleSet,
    solver::SolverOptions,
    wavelet::{HaarFourier, Wavelet},
    weights::VoronoiWeights,
};
use num_complex::Complex64;

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

fn bench_apply_1d(c: &mut Criterion) {
    let samples = SampleSet::One(scattered_freqs(256, 24.0));
    let spec = OperatorSpec {
        wavelet: Wavelet::haar(),
        scale: 6,
        bandwidth: Some(32.0),
    };
    let mut op = Freq2Wave::new(
        &CpuBackend::new(),
        &samples,
        spec,
        &HaarFourier,
        &VoronoiWeights,
    )
    .unwrap();
    let coeffs = deterministic_vector(64, 1);
    let mut out = vec![Complex64::ZERO; 256];
    c.bench_function("apply_1d_interior_m256_j6", |b| {
        b.iter(|| op.apply(black_box(&coeffs), &mut out).unwrap())
    });
    let samples_vec = deterministic_vector(256, 2);
    let mut grid = vec![Complex64::ZERO; 64];
    c.bench_function("adjoint_1d_interior_m256_j6", |b| {
        b.iter(|| op.apply_adjoint(black_box(&samples_vec), &mut grid).unwrap())
    });
}

fn bench_apply_2d_boundary(c: &mut Criterion) {
    let samples = SampleSet::Two(scattered_points(128, 6.0));
    let spec = OperatorSpec {
        wavelet: Wavelet::new(1, true),
        scale: 4,
        bandwidth: Some(8.0),
    };
    let mut op = Freq2Wave::new(
        &CpuBackend::new(),
        &samples,
        spec,
        &HaarFourier,
        &VoronoiWeights,
    )
    .unwrap();
    let coeffs = deterministic_vector(256, 3);
    let mut out = vec![Complex64::ZERO; 128];
    c.bench_function("apply_2d_boundary_m128_j4", |b| {
        b.iter(|| op.apply(black_box(&coeffs), &mut out).unwrap())
    });
}

fn bench_solve_uniform(c: &mut Criterion) {
    let samples = SampleSet::One((0..128).map(|m| -32.0 + 0.5 * m as f64).collect());
    let spec = OperatorSpec {
        wavelet: Wavelet::haar(),
        scale: 6,
        bandwidth: None,
    };
    let mut op = Freq2Wave::new(
        &CpuBackend::new(),
        &samples,
        spec,
        &HaarFourier,
        &VoronoiWeights,
    )
    .unwrap();
    let target = deterministic_vector(64, 4);
    let mut measurements = vec![Complex64::ZERO; 128];
    op.apply(&target, &mut measurements).unwrap();
    let opts = SolverOptions {
        max_iter: 200,
        tol: 1e-8,
    };
    c.bench_function("solve_1d_uniform_m128_j6", |b| {
        b.iter(|| op.solve(black_box(&measurements), &opts).unwrap())
    });
}

criterion_group!(
    benches,
    bench_apply_1d,
    bench_apply_2d_boundary,
    bench_solve_uniform
);
criterion_main!(benches);
