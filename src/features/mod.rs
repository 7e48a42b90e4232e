//! Per-frame feature extraction.
//!
//! Everything here is a pure function of one decoded frame; the stateful
//! sliding-window work lives in `analytics`.

pub mod correlation;
pub mod phase;

pub use correlation::{frame_correlation, scaled_correlation, CORR_SCALE, NORM_EPSILON};
pub use phase::{detrend, phase_residual, unwrap};

use num_complex::Complex64;

use crate::core::{FeatureRecord, SubcarrierFrame};

/// Compute the scalar and per-subcarrier features of one frame
pub fn extract(frame: &SubcarrierFrame) -> FeatureRecord {
    let amplitude = amplitudes(&frame.samples);
    let phase_residual = phase_residual(&frame.samples);
    let phase_residual_variance = population_variance(&phase_residual);

    FeatureRecord {
        core_id: frame.core_id,
        timestamp: frame.received_at,
        mean_amplitude: mean_nonzero(&amplitude),
        median_amplitude: median(&amplitude),
        phase_residual_std: phase_residual_variance.sqrt(),
        phase_residual_variance,
        amplitude,
        phase_residual,
    }
}

pub fn amplitudes(samples: &[Complex64]) -> Vec<f64> {
    samples.iter().map(|z| z.norm()).collect()
}

/// Mean over entries that are not exactly zero; unfilled and guard bins
/// report zero magnitude. Zero when every entry is zero.
pub fn mean_nonzero(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| **v != 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with divisor `n`
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_nonzero_skips_zero_bins() {
        assert_eq!(mean_nonzero(&[0.0, 2.0, 0.0, 4.0]), 3.0);
        assert_eq!(mean_nonzero(&[0.0, 0.0]), 0.0);
        assert_eq!(mean_nonzero(&[]), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_population_variance() {
        assert_eq!(population_variance(&[1.0, 3.0]), 1.0);
        assert_eq!(population_variance(&[5.0]), 0.0);
    }
}
