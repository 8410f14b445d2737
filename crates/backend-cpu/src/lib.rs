//! CPU reference adapter for the non-uniform transform seam.
//!
//! [`CpuPlan`] evaluates the centered Fourier sums exactly by direct
//! summation (O(M·N)), which makes it the ground truth the implicit
//! operator is verified against. When the 1-D nodes form the complete
//! equispaced grid `x_m = -1/2 + m/M` with `M >= N`, forward and adjoint
//! collapse to a single length-M FFT and run through rustfft instead.
//! A production gridding NUFFT can replace this backend behind the same
//! traits.

use std::f64::consts::PI;
use std::sync::Arc;

use gsamp_core::nufft::{NufftBackend, NufftTransform};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Node deviation below which the equispaced fast path is used.
const FAST_PATH_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl NufftBackend for CpuBackend {
    type Plan = CpuPlan;

    fn plan_1d(&self, nodes: &[f64], extent: usize) -> CpuPlan {
        assert!(extent > 0, "transform extent must be positive");
        let fast = FastPath::detect(nodes, extent);
        CpuPlan {
            kind: PlanKind::Line {
                nodes: nodes.to_vec(),
                extent,
                fast,
            },
        }
    }

    fn plan_2d(&self, nodes_x: &[f64], nodes_y: &[f64], extent: [usize; 2]) -> CpuPlan {
        assert_eq!(
            nodes_x.len(),
            nodes_y.len(),
            "2-D plans need one node pair per sample"
        );
        assert!(extent[0] > 0 && extent[1] > 0, "transform extent must be positive");
        CpuPlan {
            kind: PlanKind::Plane {
                nodes_x: nodes_x.to_vec(),
                nodes_y: nodes_y.to_vec(),
                extent,
            },
        }
    }
}

pub struct CpuPlan {
    kind: PlanKind,
}

enum PlanKind {
    Line {
        nodes: Vec<f64>,
        extent: usize,
        fast: Option<FastPath>,
    },
    Plane {
        nodes_x: Vec<f64>,
        nodes_y: Vec<f64>,
        extent: [usize; 2],
    },
}

struct FastPath {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FastPath {
    /// Fast path applies when the nodes are exactly the full FFT grid
    /// `-1/2 + m/M` (in order) and the coefficient extent fits inside it.
    fn detect(nodes: &[f64], extent: usize) -> Option<Self> {
        let m = nodes.len();
        if m < extent || extent % 2 != 0 {
            return None;
        }
        let step = 1.0 / m as f64;
        let on_grid = nodes
            .iter()
            .enumerate()
            .all(|(i, &x)| (x - (-0.5 + i as f64 * step)).abs() <= FAST_PATH_TOL);
        if !on_grid {
            return None;
        }
        let mut planner = FftPlanner::new();
        Some(Self {
            forward: planner.plan_fft_forward(m),
            inverse: planner.plan_fft_inverse(m),
        })
    }

    /// With `x_m = -1/2 + m/M` the centered sum becomes a plain DFT of the
    /// sign-modulated, zero-padded coefficients.
    fn forward(&self, coeffs: &[Complex64], extent: usize, out: &mut [Complex64]) {
        let m = out.len();
        let mut buf = vec![Complex64::ZERO; m];
        for (k, &value) in coeffs.iter().enumerate() {
            let centered = k as isize - (extent / 2) as isize;
            let slot = centered.rem_euclid(m as isize) as usize;
            buf[slot] = if centered % 2 == 0 { value } else { -value };
        }
        self.forward.process(&mut buf);
        out.copy_from_slice(&buf);
    }

    fn adjoint(&self, samples: &[Complex64], extent: usize, out: &mut [Complex64]) {
        let m = samples.len();
        let mut buf = samples.to_vec();
        self.inverse.process(&mut buf);
        for (k, slot) in out.iter_mut().enumerate() {
            let centered = k as isize - (extent / 2) as isize;
            let idx = centered.rem_euclid(m as isize) as usize;
            *slot = if centered % 2 == 0 { buf[idx] } else { -buf[idx] };
        }
    }
}

impl NufftTransform for CpuPlan {
    fn num_samples(&self) -> usize {
        match &self.kind {
            PlanKind::Line { nodes, .. } => nodes.len(),
            PlanKind::Plane { nodes_x, .. } => nodes_x.len(),
        }
    }

    fn grid_len(&self) -> usize {
        match &self.kind {
            PlanKind::Line { extent, .. } => *extent,
            PlanKind::Plane { extent, .. } => extent[0] * extent[1],
        }
    }

    fn forward(&self, coeffs: &[Complex64], out: &mut [Complex64]) {
        assert_eq!(coeffs.len(), self.grid_len(), "coefficient length mismatch");
        assert_eq!(out.len(), self.num_samples(), "sample length mismatch");
        match &self.kind {
            PlanKind::Line {
                nodes,
                extent,
                fast,
            } => {
                if let Some(fast) = fast {
                    fast.forward(coeffs, *extent, out);
                } else {
                    direct_forward_1d(nodes, *extent, coeffs, out);
                }
            }
            PlanKind::Plane {
                nodes_x,
                nodes_y,
                extent,
            } => direct_forward_2d(nodes_x, nodes_y, *extent, coeffs, out),
        }
    }

    fn adjoint(&self, samples: &[Complex64], out: &mut [Complex64]) {
        assert_eq!(samples.len(), self.num_samples(), "sample length mismatch");
        assert_eq!(out.len(), self.grid_len(), "coefficient length mismatch");
        match &self.kind {
            PlanKind::Line {
                nodes,
                extent,
                fast,
            } => {
                if let Some(fast) = fast {
                    fast.adjoint(samples, *extent, out);
                } else {
                    direct_adjoint_1d(nodes, *extent, samples, out);
                }
            }
            PlanKind::Plane {
                nodes_x,
                nodes_y,
                extent,
            } => direct_adjoint_2d(nodes_x, nodes_y, *extent, samples, out),
        }
    }
}

fn direct_forward_1d(nodes: &[f64], extent: usize, coeffs: &[Complex64], out: &mut [Complex64]) {
    let half = (extent / 2) as f64;
    for (slot, &x) in out.iter_mut().zip(nodes) {
        let mut acc = Complex64::ZERO;
        for (k, &value) in coeffs.iter().enumerate() {
            let angle = -2.0 * PI * x * (k as f64 - half);
            acc += value * Complex64::from_polar(1.0, angle);
        }
        *slot = acc;
    }
}

fn direct_adjoint_1d(nodes: &[f64], extent: usize, samples: &[Complex64], out: &mut [Complex64]) {
    let half = (extent / 2) as f64;
    for (k, slot) in out.iter_mut().enumerate() {
        let centered = k as f64 - half;
        let mut acc = Complex64::ZERO;
        for (&x, &value) in nodes.iter().zip(samples) {
            acc += value * Complex64::from_polar(1.0, 2.0 * PI * x * centered);
        }
        *slot = acc;
    }
}

fn direct_forward_2d(
    nodes_x: &[f64],
    nodes_y: &[f64],
    extent: [usize; 2],
    coeffs: &[Complex64],
    out: &mut [Complex64],
) {
    let [nx, ny] = extent;
    let half_x = (nx / 2) as f64;
    let half_y = (ny / 2) as f64;
    for (slot, (&x, &y)) in out.iter_mut().zip(nodes_x.iter().zip(nodes_y)) {
        let mut acc = Complex64::ZERO;
        for ky in 0..ny {
            let phase_y = y * (ky as f64 - half_y);
            for kx in 0..nx {
                let angle = -2.0 * PI * (x * (kx as f64 - half_x) + phase_y);
                acc += coeffs[ky * nx + kx] * Complex64::from_polar(1.0, angle);
            }
        }
        *slot = acc;
    }
}

fn direct_adjoint_2d(
    nodes_x: &[f64],
    nodes_y: &[f64],
    extent: [usize; 2],
    samples: &[Complex64],
    out: &mut [Complex64],
) {
    let [nx, ny] = extent;
    let half_x = (nx / 2) as f64;
    let half_y = (ny / 2) as f64;
    for ky in 0..ny {
        let centered_y = ky as f64 - half_y;
        for kx in 0..nx {
            let centered_x = kx as f64 - half_x;
            let mut acc = Complex64::ZERO;
            for ((&x, &y), &value) in nodes_x.iter().zip(nodes_y).zip(samples) {
                let angle = 2.0 * PI * (x * centered_x + y * centered_y);
                acc += value * Complex64::from_polar(1.0, angle);
            }
            out[ky * nx + kx] = acc;
        }
    }
}

#[cfg(test)]
mod _tests_lib;
