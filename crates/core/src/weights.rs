//! Density-compensation weights for non-uniform sample sets.

use crate::error::Error;

/// Minimum spacing below which two samples count as coincident.
const COINCIDENT_TOL: f64 = 1e-12;

/// Collaborator computing one positive weight per sample.
///
/// Weights compensate for uneven sample density inside the band
/// `[-bandwidth, bandwidth]` (per axis). Implementations fail when the
/// bandwidth is inconsistent with the sample geometry.
pub trait WeightProvider {
    fn weights_1d(&self, freqs: &[f64], bandwidth: f64) -> Result<Vec<f64>, Error>;
    fn weights_2d(&self, points: &[[f64; 2]], bandwidth: f64) -> Result<Vec<f64>, Error>;
}

/// Voronoi-cell density weights.
///
/// In 1-D each weight is the exact width of the sample's Voronoi cell
/// clipped to the band. In 2-D the cell area is approximated by the squared
/// nearest-neighbour distance; exact planar Voronoi areas stay with an
/// external geometry collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoronoiWeights;

impl WeightProvider for VoronoiWeights {
    fn weights_1d(&self, freqs: &[f64], bandwidth: f64) -> Result<Vec<f64>, Error> {
        check_bandwidth(bandwidth)?;
        if freqs.is_empty() {
            return Err(Error::Weights("empty sample set".into()));
        }
        for &xi in freqs {
            if !xi.is_finite() || xi.abs() > bandwidth {
                return Err(Error::Weights(format!(
                    "sample frequency {xi} outside bandwidth {bandwidth}"
                )));
            }
        }
        let mut order: Vec<usize> = (0..freqs.len()).collect();
        order.sort_by(|&a, &b| {
            freqs[a]
                .partial_cmp(&freqs[b])
                .expect("sample frequency is NaN")
        });
        let mut weights = vec![0.0; freqs.len()];
        for (rank, &idx) in order.iter().enumerate() {
            let here = freqs[idx];
            let left_edge = if rank == 0 {
                -bandwidth
            } else {
                let prev = freqs[order[rank - 1]];
                if here - prev < COINCIDENT_TOL {
                    return Err(Error::Weights(format!("coincident samples at {here}")));
                }
                0.5 * (prev + here)
            };
            let right_edge = if rank + 1 == order.len() {
                bandwidth
            } else {
                0.5 * (here + freqs[order[rank + 1]])
            };
            weights[idx] = right_edge - left_edge;
        }
        Ok(weights)
    }

    fn weights_2d(&self, points: &[[f64; 2]], bandwidth: f64) -> Result<Vec<f64>, Error> {
        check_bandwidth(bandwidth)?;
        if points.len() < 2 {
            return Err(Error::Weights("2-D weights need at least two samples".into()));
        }
        for p in points {
            if !(p[0].is_finite() && p[1].is_finite())
                || p[0].abs() > bandwidth
                || p[1].abs() > bandwidth
            {
                return Err(Error::Weights(format!(
                    "sample ({}, {}) outside bandwidth {bandwidth}",
                    p[0], p[1]
                )));
            }
        }
        let mut weights = Vec::with_capacity(points.len());
        for (i, a) in points.iter().enumerate() {
            let mut nearest = f64::INFINITY;
            for (j, b) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dx = a[0] - b[0];
                let dy = a[1] - b[1];
                nearest = nearest.min(dx * dx + dy * dy);
            }
            if nearest < COINCIDENT_TOL * COINCIDENT_TOL {
                return Err(Error::Weights(format!(
                    "coincident samples at ({}, {})",
                    a[0], a[1]
                )));
            }
            weights.push(nearest);
        }
        Ok(weights)
    }
}

fn check_bandwidth(bandwidth: f64) -> Result<(), Error> {
    if bandwidth.is_finite() && bandwidth > 0.0 {
        Ok(())
    } else {
        Err(Error::Weights(format!("bandwidth {bandwidth} must be positive")))
    }
}
