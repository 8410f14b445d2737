//! The matrix-free operator mapping wavelet coefficients to Fourier-domain
//! samples.
//!
//! [`Freq2Wave`] composes per-sample phase corrections, optional boundary
//! blocks, optional density weighting and one or more non-uniform transform
//! plans into a single M x N complex linear map. The four structural
//! variants (1-D/2-D, interior-only/boundary-corrected) live in one kernel
//! enum selected at construction and never changed.
//!
//! Apply and adjoint reuse scratch buffers owned by the operator, so both
//! take `&mut self`; concurrent solves need independent operator instances.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{
    boundary::{DenseBlock, Side},
    diag::Warning,
    error::Error,
    grid::{split_axis, CoeffGrid},
    metrics::MetricsRecorder,
    nufft::{NufftBackend, NufftTransform},
    phase::PhaseDiagonal,
    samples::{map_nodes, SampleSet},
    solver::{self, SolveOutcome, SolverOptions},
    wavelet::{ScalingFourier, Wavelet},
    weights::WeightProvider,
};

/// What the least-squares solver needs from an operator.
pub trait LinearMap {
    /// Number of samples M.
    fn rows(&self) -> usize;
    /// Number of coefficients N.
    fn cols(&self) -> usize;
    fn apply(&mut self, coeffs: &[Complex64], out: &mut [Complex64]) -> Result<(), Error>;
    fn apply_adjoint(&mut self, samples: &[Complex64], out: &mut [Complex64])
        -> Result<(), Error>;
}

/// Construction parameters for [`Freq2Wave`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorSpec {
    pub wavelet: Wavelet,
    pub scale: u32,
    /// Required for non-uniform sample sets, ignored for uniform ones.
    #[serde(default)]
    pub bandwidth: Option<f64>,
}

/// Density weighting decided once at construction.
///
/// The stored entries are square roots of the density-compensation weights,
/// applied once on forward output and once on adjoint input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Weighting {
    Uniform,
    Weighted(Vec<f64>),
}

impl Weighting {
    fn is_uniform(&self) -> bool {
        matches!(self, Weighting::Uniform)
    }

    pub(crate) fn apply(&self, buf: &mut [Complex64]) {
        if let Weighting::Weighted(w) = self {
            for (value, &wi) in buf.iter_mut().zip(w) {
                *value *= wi;
            }
        }
    }

    fn weighted_copy(&self, src: &[Complex64], dst: &mut [Complex64]) {
        dst.copy_from_slice(src);
        self.apply(dst);
    }

    pub(crate) fn factor(&self, m: usize) -> f64 {
        match self {
            Weighting::Uniform => 1.0,
            Weighting::Weighted(w) => w[m],
        }
    }
}

/// Per-axis tables shared by every kernel variant: mapped nodes kept for
/// dense materialization, and the phase diagonal.
pub(crate) struct AxisTables {
    pub(crate) extent: usize,
    pub(crate) nodes: Vec<f64>,
    pub(crate) phase: PhaseDiagonal,
}

impl AxisTables {
    /// Entry (m, k) of the implicit interior operator along this axis.
    pub(crate) fn column_value(&self, m: usize, k: usize) -> Complex64 {
        self.phase.factor(m) * unit_mode(self.nodes[m], k, self.extent)
    }
}

/// One boundary-corrected axis: interior transform plan plus the dense
/// left/right blocks.
pub(crate) struct BoundaryAxis<P> {
    /// Full per-axis coefficient count 2^J.
    pub(crate) extent: usize,
    /// Interior count 2^J - 2p.
    pub(crate) interior: usize,
    pub(crate) p: usize,
    pub(crate) nodes: Vec<f64>,
    pub(crate) phase: PhaseDiagonal,
    pub(crate) left: DenseBlock,
    pub(crate) right: DenseBlock,
    pub(crate) plan: P,
}

impl<P: NufftTransform> BoundaryAxis<P> {
    /// Full 1-D boundary apply of one coefficient line:
    /// `out = L x_left + F x_interior + R x_right`.
    fn forward_line(&self, line: &[Complex64], out: &mut [Complex64]) {
        assert_eq!(line.len(), self.extent, "line must span the full axis");
        assert_eq!(out.len(), self.phase.len(), "output must have one entry per sample");
        self.plan.forward(&line[self.p..self.p + self.interior], out);
        self.phase.multiply(out);
        self.left.matvec_acc(&line[..self.p], out);
        self.right.matvec_acc(&line[self.extent - self.p..], out);
    }

    /// Interior-only 1-D apply of one strip.
    fn forward_interior(&self, strip: &[Complex64], out: &mut [Complex64]) {
        assert_eq!(strip.len(), self.interior, "strip must span the interior");
        assert_eq!(out.len(), self.phase.len(), "output must have one entry per sample");
        self.plan.forward(strip, out);
        self.phase.multiply(out);
    }

    /// Full 1-D adjoint of one sample vector; `u` is consumed in place.
    fn adjoint_line(&self, u: &mut [Complex64], line_out: &mut [Complex64]) {
        assert_eq!(u.len(), self.phase.len(), "input must have one entry per sample");
        assert_eq!(line_out.len(), self.extent, "line must span the full axis");
        self.left.adjoint_matvec(u, &mut line_out[..self.p]);
        self.right.adjoint_matvec(u, &mut line_out[self.extent - self.p..]);
        self.phase.conj_multiply(u);
        self.plan.adjoint(u, &mut line_out[self.p..self.p + self.interior]);
    }

    /// Interior-only 1-D adjoint; `u` is consumed in place.
    fn adjoint_interior(&self, u: &mut [Complex64], strip_out: &mut [Complex64]) {
        assert_eq!(u.len(), self.phase.len(), "input must have one entry per sample");
        assert_eq!(strip_out.len(), self.interior, "strip must span the interior");
        self.phase.conj_multiply(u);
        self.plan.adjoint(u, strip_out);
    }

    /// Entry (m, k) of the implicit 1-D boundary operator.
    pub(crate) fn column_value(&self, m: usize, k: usize) -> Complex64 {
        let split = split_axis(self.extent, self.p);
        if split.low.contains(&k) {
            self.left.get(m, k)
        } else if split.high.contains(&k) {
            self.right.get(m, k - split.high.start)
        } else {
            self.phase.factor(m) * unit_mode(self.nodes[m], k - split.interior.start, self.interior)
        }
    }
}

pub(crate) enum Kernel<P> {
    Dim1 {
        tables: AxisTables,
        plan: P,
    },
    Dim1Boundary(BoundaryAxis<P>),
    Dim2 {
        plan: P,
        x: AxisTables,
        y: AxisTables,
    },
    Dim2Boundary {
        /// 2-D plan over the interior-by-interior block.
        plan: P,
        x: BoundaryAxis<P>,
        y: BoundaryAxis<P>,
    },
}

/// Matrix-free M x N map from wavelet coefficients to Fourier samples.
pub struct Freq2Wave<B: NufftBackend> {
    wavelet: Wavelet,
    scale: u32,
    samples: usize,
    pub(crate) weighting: Weighting,
    warnings: Vec<Warning>,
    pub(crate) kernel: Kernel<B::Plan>,
    // Scratch, reused across calls; never part of the logical state.
    work_m: Vec<Complex64>,
    work_m2: Vec<Complex64>,
    work_line: Vec<Complex64>,
    work_grid: Vec<Complex64>,
}

impl<B: NufftBackend> Freq2Wave<B> {
    /// Builds the operator for one sample set.
    ///
    /// Validation order: scale versus vanishing moments, under-determination
    /// warning, bandwidth/weights for non-uniform sets, interior size for
    /// boundary wavelets. Degraded-but-valid conditions are returned as
    /// [`warnings`](Self::warnings), not failures. Uniform sample sets never
    /// consult the weight provider, so their operators are independent of
    /// any supplied bandwidth.
    pub fn new(
        backend: &B,
        samples: &SampleSet,
        spec: OperatorSpec,
        fourier: &dyn ScalingFourier,
        weights: &dyn WeightProvider,
    ) -> Result<Self, Error> {
        let p = spec.wavelet.vanishing_moments();
        let extent = 1usize << spec.scale;
        if extent < 2 * p - 1 {
            return Err(Error::ScaleTooSmall {
                scale: spec.scale,
                vanishing_moments: p,
            });
        }

        let m = samples.len();
        let total = extent.pow(samples.dimension() as u32);
        let mut warnings = Vec::new();
        if total >= m {
            warnings.push(Warning::UnderDetermined {
                coefficients: total,
                samples: m,
            });
        }

        let weighting = if samples.is_uniform() {
            Weighting::Uniform
        } else {
            let bandwidth = spec.bandwidth.ok_or(Error::MissingBandwidth)?;
            let raw = match samples {
                SampleSet::One(xs) => weights.weights_1d(xs, bandwidth)?,
                SampleSet::Two(pts) => weights.weights_2d(pts, bandwidth)?,
            };
            if extent as f64 > 2.0 * bandwidth {
                warnings.push(Warning::BandwidthExceeded {
                    grid_extent: extent,
                    bandwidth,
                });
            }
            Weighting::Weighted(raw.into_iter().map(f64::sqrt).collect())
        };

        let interior = if spec.wavelet.has_boundary() {
            if extent <= 2 * p {
                return Err(Error::TooFewWavelets {
                    scale: spec.scale,
                    vanishing_moments: p,
                });
            }
            extent - 2 * p
        } else {
            extent
        };

        let kernel = match samples {
            SampleSet::One(xs) => {
                let tables = build_axis_tables(xs, spec.wavelet, spec.scale, extent, fourier);
                let plan = backend.plan_1d(&tables.nodes, interior);
                if spec.wavelet.has_boundary() {
                    Kernel::Dim1Boundary(build_boundary_axis(
                        xs,
                        tables,
                        spec.wavelet,
                        spec.scale,
                        interior,
                        fourier,
                        plan,
                    ))
                } else {
                    Kernel::Dim1 { tables, plan }
                }
            }
            SampleSet::Two(_) => {
                let xs = samples.axis_coords(0);
                let ys = samples.axis_coords(1);
                let x = build_axis_tables(&xs, spec.wavelet, spec.scale, extent, fourier);
                let y = build_axis_tables(&ys, spec.wavelet, spec.scale, extent, fourier);
                let plan = backend.plan_2d(&x.nodes, &y.nodes, [interior, interior]);
                if spec.wavelet.has_boundary() {
                    let plan_x = backend.plan_1d(&x.nodes, interior);
                    let plan_y = backend.plan_1d(&y.nodes, interior);
                    Kernel::Dim2Boundary {
                        plan,
                        x: build_boundary_axis(
                            &xs,
                            x,
                            spec.wavelet,
                            spec.scale,
                            interior,
                            fourier,
                            plan_x,
                        ),
                        y: build_boundary_axis(
                            &ys,
                            y,
                            spec.wavelet,
                            spec.scale,
                            interior,
                            fourier,
                            plan_y,
                        ),
                    }
                } else {
                    Kernel::Dim2 { plan, x, y }
                }
            }
        };

        let boundary_2d = matches!(kernel, Kernel::Dim2Boundary { .. });
        Ok(Self {
            wavelet: spec.wavelet,
            scale: spec.scale,
            samples: m,
            weighting,
            warnings,
            kernel,
            work_m: vec![Complex64::ZERO; m],
            work_m2: vec![Complex64::ZERO; if boundary_2d { m } else { 0 }],
            work_line: vec![Complex64::ZERO; if boundary_2d { extent } else { 0 }],
            work_grid: vec![Complex64::ZERO; if boundary_2d { interior * interior } else { 0 }],
        })
    }

    pub fn num_samples(&self) -> usize {
        self.samples
    }

    pub fn num_coeffs(&self) -> usize {
        self.shape().len()
    }

    pub fn shape(&self) -> CoeffGrid {
        let n = 1usize << self.scale;
        match self.kernel {
            Kernel::Dim1 { .. } | Kernel::Dim1Boundary(_) => CoeffGrid::One { n },
            Kernel::Dim2 { .. } | Kernel::Dim2Boundary { .. } => CoeffGrid::Two { nx: n, ny: n },
        }
    }

    pub fn dimension(&self) -> usize {
        self.shape().dimension()
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn wavelet(&self) -> Wavelet {
        self.wavelet
    }

    pub fn vanishing_moments(&self) -> usize {
        self.wavelet.vanishing_moments()
    }

    pub fn has_boundary(&self) -> bool {
        self.wavelet.has_boundary()
    }

    pub fn is_uniform(&self) -> bool {
        self.weighting.is_uniform()
    }

    /// Structured diagnostics collected during construction.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Evaluates the operator: coefficients -> samples.
    pub fn apply(&mut self, coeffs: &[Complex64], out: &mut [Complex64]) -> Result<(), Error> {
        check_len(coeffs.len(), self.num_coeffs())?;
        check_len(out.len(), self.num_samples())?;
        let Self {
            kernel,
            weighting,
            work_m,
            work_line,
            work_grid,
            ..
        } = self;
        match kernel {
            Kernel::Dim1 { tables, plan } => {
                plan.forward(coeffs, out);
                tables.phase.multiply(out);
            }
            Kernel::Dim1Boundary(axis) => {
                axis.forward_line(coeffs, out);
            }
            Kernel::Dim2 { plan, x, y } => {
                plan.forward(coeffs, out);
                x.phase.multiply(out);
                y.phase.multiply(out);
            }
            Kernel::Dim2Boundary { plan, x, y } => {
                let n = x.extent;
                let p = x.p;
                let interior = x.interior;
                out.fill(Complex64::ZERO);

                // Interior-by-interior block through the 2-D transform.
                for iy in 0..interior {
                    let row = (iy + p) * n + p;
                    work_grid[iy * interior..(iy + 1) * interior]
                        .copy_from_slice(&coeffs[row..row + interior]);
                }
                plan.forward(work_grid, work_m);
                x.phase.multiply(work_m);
                y.phase.multiply(work_m);
                for (slot, &value) in out.iter_mut().zip(&*work_m) {
                    *slot += value;
                }

                // Boundary columns of the first axis carry their full line
                // through the 1-D boundary apply along the second axis.
                for col in 0..p {
                    gather_line(coeffs, n, col, work_line);
                    y.forward_line(work_line, work_m);
                    x.left.col_mul_acc(col, work_m, out);
                }
                for col in 0..p {
                    gather_line(coeffs, n, n - p + col, work_line);
                    y.forward_line(work_line, work_m);
                    x.right.col_mul_acc(col, work_m, out);
                }

                // Boundary rows of the second axis contribute their interior
                // strip only; their corners are covered by the lines above.
                for col in 0..p {
                    let strip = &coeffs[col * n + p..col * n + p + interior];
                    x.forward_interior(strip, work_m);
                    y.left.col_mul_acc(col, work_m, out);
                }
                for col in 0..p {
                    let row = (n - p + col) * n;
                    let strip = &coeffs[row + p..row + p + interior];
                    x.forward_interior(strip, work_m);
                    y.right.col_mul_acc(col, work_m, out);
                }
            }
        }
        weighting.apply(out);
        Ok(())
    }

    /// Evaluates the conjugate-transpose: samples -> coefficients.
    ///
    /// The forward split is a true partition, so every region of the output
    /// is written exactly once, never summed.
    pub fn apply_adjoint(
        &mut self,
        samples: &[Complex64],
        out: &mut [Complex64],
    ) -> Result<(), Error> {
        check_len(samples.len(), self.num_samples())?;
        check_len(out.len(), self.num_coeffs())?;
        let Self {
            kernel,
            weighting,
            work_m,
            work_m2,
            work_line,
            work_grid,
            ..
        } = self;
        weighting.weighted_copy(samples, work_m);
        match kernel {
            Kernel::Dim1 { tables, plan } => {
                tables.phase.conj_multiply(work_m);
                plan.adjoint(work_m, out);
            }
            Kernel::Dim1Boundary(axis) => {
                axis.adjoint_line(work_m, out);
            }
            Kernel::Dim2 { plan, x, y } => {
                x.phase.conj_multiply(work_m);
                y.phase.conj_multiply(work_m);
                plan.adjoint(work_m, out);
            }
            Kernel::Dim2Boundary { plan, x, y } => {
                let n = x.extent;
                let p = x.p;
                let interior = x.interior;

                // Interior-by-interior block.
                work_m2.copy_from_slice(work_m);
                x.phase.conj_multiply(work_m2);
                y.phase.conj_multiply(work_m2);
                plan.adjoint(work_m2, work_grid);
                for iy in 0..interior {
                    let row = (iy + p) * n + p;
                    out[row..row + interior]
                        .copy_from_slice(&work_grid[iy * interior..(iy + 1) * interior]);
                }

                // Full lines behind the first axis's boundary columns.
                for col in 0..p {
                    x.left.conj_col_mul(col, work_m, work_m2);
                    y.adjoint_line(work_m2, work_line);
                    scatter_line(work_line, n, col, out);
                }
                for col in 0..p {
                    x.right.conj_col_mul(col, work_m, work_m2);
                    y.adjoint_line(work_m2, work_line);
                    scatter_line(work_line, n, n - p + col, out);
                }

                // Interior strips behind the second axis's boundary rows.
                for col in 0..p {
                    y.left.conj_col_mul(col, work_m, work_m2);
                    x.adjoint_interior(work_m2, &mut out[col * n + p..col * n + p + interior]);
                }
                for col in 0..p {
                    let row = (n - p + col) * n;
                    y.right.conj_col_mul(col, work_m, work_m2);
                    x.adjoint_interior(work_m2, &mut out[row + p..row + p + interior]);
                }
            }
        }
        Ok(())
    }

    /// Least-squares reconstruction of coefficients from measurements.
    pub fn solve(
        &mut self,
        measurements: &[Complex64],
        opts: &SolverOptions,
    ) -> Result<SolveOutcome, Error> {
        self.solve_with_metrics(measurements, opts, None)
    }

    pub fn solve_with_metrics(
        &mut self,
        measurements: &[Complex64],
        opts: &SolverOptions,
        metrics: Option<&MetricsRecorder>,
    ) -> Result<SolveOutcome, Error> {
        check_len(measurements.len(), self.num_samples())?;
        // Weighting was the last forward step, so measurements get it once
        // up front; apply/apply_adjoint then stay mutually adjoint.
        let mut b = measurements.to_vec();
        self.weighting.apply(&mut b);
        solver::solve_with_metrics(self, &b, opts, metrics)
    }
}

impl<B: NufftBackend> LinearMap for Freq2Wave<B> {
    fn rows(&self) -> usize {
        self.num_samples()
    }

    fn cols(&self) -> usize {
        self.num_coeffs()
    }

    fn apply(&mut self, coeffs: &[Complex64], out: &mut [Complex64]) -> Result<(), Error> {
        Freq2Wave::apply(self, coeffs, out)
    }

    fn apply_adjoint(
        &mut self,
        samples: &[Complex64],
        out: &mut [Complex64],
    ) -> Result<(), Error> {
        Freq2Wave::apply_adjoint(self, samples, out)
    }
}

fn build_axis_tables(
    freqs: &[f64],
    wavelet: Wavelet,
    scale: u32,
    extent: usize,
    fourier: &dyn ScalingFourier,
) -> AxisTables {
    let interior_ft = fourier.interior(freqs, wavelet, scale);
    assert_eq!(
        interior_ft.len(),
        freqs.len(),
        "scaling evaluator must return one value per sample"
    );
    AxisTables {
        extent,
        nodes: map_nodes(freqs, extent),
        phase: PhaseDiagonal::new(interior_ft, freqs),
    }
}

fn build_boundary_axis<P>(
    freqs: &[f64],
    tables: AxisTables,
    wavelet: Wavelet,
    scale: u32,
    interior: usize,
    fourier: &dyn ScalingFourier,
    plan: P,
) -> BoundaryAxis<P> {
    let p = wavelet.vanishing_moments();
    let left = fourier.boundary(freqs, wavelet, scale, Side::Left);
    let right = fourier.boundary(freqs, wavelet, scale, Side::Right);
    for block in [&left, &right] {
        assert_eq!(block.rows(), freqs.len(), "boundary block must have one row per sample");
        assert_eq!(block.cols(), p, "boundary block must have p columns");
    }
    BoundaryAxis {
        extent: tables.extent,
        interior,
        p,
        nodes: tables.nodes,
        phase: tables.phase,
        left,
        right,
        plan,
    }
}

/// `exp(-2 pi i * node * (k - extent/2))`, the centered transform mode.
pub(crate) fn unit_mode(node: f64, k: usize, extent: usize) -> Complex64 {
    let centered = k as f64 - (extent / 2) as f64;
    Complex64::from_polar(1.0, -2.0 * PI * node * centered)
}

fn check_len(got: usize, expected: usize) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, got })
    }
}

fn gather_line(grid: &[Complex64], width: usize, column: usize, line: &mut [Complex64]) {
    for (iy, slot) in line.iter_mut().enumerate() {
        *slot = grid[iy * width + column];
    }
}

fn scatter_line(line: &[Complex64], width: usize, column: usize, grid: &mut [Complex64]) {
    for (iy, &value) in line.iter().enumerate() {
        grid[iy * width + column] = value;
    }
}
