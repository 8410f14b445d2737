//! Fourier-domain sample coordinate sets.

/// Tolerance used when deciding whether a sample set lies on a uniform grid.
const UNIFORM_TOL: f64 = 1e-9;

/// A set of M sample coordinates in the Fourier domain.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleSet {
    One(Vec<f64>),
    Two(Vec<[f64; 2]>),
}

impl SampleSet {
    pub fn len(&self) -> usize {
        match self {
            SampleSet::One(xs) => xs.len(),
            SampleSet::Two(pts) => pts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        match self {
            SampleSet::One(_) => 1,
            SampleSet::Two(_) => 2,
        }
    }

    /// Coordinates of every sample along one axis, in sample order.
    pub fn axis_coords(&self, axis: usize) -> Vec<f64> {
        match self {
            SampleSet::One(xs) => {
                assert_eq!(axis, 0, "1-D sample set has a single axis");
                xs.clone()
            }
            SampleSet::Two(pts) => {
                assert!(axis < 2, "2-D sample set has two axes");
                pts.iter().map(|p| p[axis]).collect()
            }
        }
    }

    /// True when the samples form a uniform grid.
    ///
    /// 1-D sets are uniform when consecutive coordinates are equispaced in
    /// the given order. 2-D sets are uniform when the distinct per-axis
    /// coordinates are equispaced and every lattice point appears exactly
    /// once.
    pub fn is_uniform(&self) -> bool {
        match self {
            SampleSet::One(xs) => is_equispaced(xs),
            SampleSet::Two(pts) => {
                let ux = distinct_sorted(pts.iter().map(|p| p[0]));
                let uy = distinct_sorted(pts.iter().map(|p| p[1]));
                pts.len() == ux.len() * uy.len() && is_equispaced(&ux) && is_equispaced(&uy)
            }
        }
    }
}

/// Maps frequencies onto transform nodes: divides by the grid extent and
/// reduces into the periodic domain [-1/2, 1/2).
pub fn map_nodes(freqs: &[f64], extent: usize) -> Vec<f64> {
    let inv = 1.0 / extent as f64;
    freqs.iter().map(|&xi| frac_centered(xi * inv)).collect()
}

/// Reduces x modulo 1 into [-1/2, 1/2).
#[inline]
pub fn frac_centered(x: f64) -> f64 {
    x - (x + 0.5).floor()
}

fn is_equispaced(xs: &[f64]) -> bool {
    if xs.len() < 2 {
        return true;
    }
    let step = xs[1] - xs[0];
    if step <= 0.0 {
        return false;
    }
    xs.windows(2)
        .all(|w| ((w[1] - w[0]) - step).abs() <= UNIFORM_TOL * step.max(1.0))
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("sample coordinate is NaN"));
    let mut distinct: Vec<f64> = Vec::with_capacity(sorted.len());
    for value in sorted {
        match distinct.last() {
            Some(&last) if (value - last).abs() <= UNIFORM_TOL => {}
            _ => distinct.push(value),
        }
    }
    distinct
}
