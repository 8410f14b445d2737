//! Reconstruction job configuration (TOML).
//!
//! # File Format
//!
//! ```toml
//! wavelet = "haar"
//! scale = 5
//! bandwidth = 20.0        # required for non-uniform sample sets
//!
//! [solver]
//! max_iter = 200
//! tol = 1e-6
//!
//! [metrics]
//! enabled = false
//! ```

use serde::{Deserialize, Serialize};

use crate::{metrics::MetricsConfig, operator::OperatorSpec, solver::SolverOptions, wavelet::Wavelet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Wavelet family name: "haar" or "dbN".
    pub wavelet: String,
    /// Resolution level J; the per-axis grid extent is 2^J.
    pub scale: u32,
    #[serde(default)]
    pub bandwidth: Option<f64>,
    #[serde(default)]
    pub solver: SolverOptions,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl JobConfig {
    /// Resolves the wavelet name; `None` when the name is unknown.
    pub fn operator_spec(&self) -> Option<OperatorSpec> {
        Wavelet::from_name(&self.wavelet).map(|wavelet| OperatorSpec {
            wavelet,
            scale: self.scale,
            bandwidth: self.bandwidth,
        })
    }
}
