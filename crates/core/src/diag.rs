//! Structured construction diagnostics.
//!
//! Conditions that degrade a reconstruction without invalidating it are
//! reported as [`Warning`] values retained on the operator, never through a
//! process-wide side channel. Callers decide whether to log them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// More unknowns than measurements; the least-squares problem is
    /// under-determined and the solver will return one of many minimizers.
    UnderDetermined {
        coefficients: usize,
        samples: usize,
    },
    /// The reconstruction scale exceeds the sample bandwidth; expect poor
    /// conditioning for non-uniform sample sets.
    BandwidthExceeded { grid_extent: usize, bandwidth: f64 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnderDetermined {
                coefficients,
                samples,
            } => write!(
                f,
                "under-determined system: {coefficients} coefficients from {samples} samples"
            ),
            Warning::BandwidthExceeded {
                grid_extent,
                bandwidth,
            } => write!(
                f,
                "grid extent {grid_extent} exceeds twice the bandwidth {bandwidth}"
            ),
        }
    }
}
