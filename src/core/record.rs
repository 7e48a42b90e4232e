use std::time::SystemTime;

/// Scalar and per-subcarrier features derived from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub core_id: usize,
    pub timestamp: SystemTime,
    /// Mean magnitude over non-zero subcarriers
    pub mean_amplitude: f64,
    pub median_amplitude: f64,
    /// Population standard deviation of the detrended phase
    pub phase_residual_std: f64,
    pub phase_residual_variance: f64,
    pub amplitude: Vec<f64>,
    pub phase_residual: Vec<f64>,
}
