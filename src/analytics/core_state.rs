use num_complex::Complex64;
use std::time::SystemTime;

use crate::buffers::RingBuffer;
use crate::core::FeatureRecord;
use crate::features::scaled_correlation;

/// Sliding-window state of one receive core.
///
/// Mutated only by the core's receiver, always inside the store lock.
#[derive(Debug, Clone)]
pub struct CoreState {
    amplitude_history: RingBuffer<Vec<f64>>,
    phase_history: RingBuffer<Vec<f64>>,
    moving_amplitude: RingBuffer<f64>,
    moving_phase: RingBuffer<f64>,
    previous_samples: Option<Vec<Complex64>>,
    previous_phase: Option<(SystemTime, f64)>,
    frames: u64,
}

/// Mean per-subcarrier variance across the variance window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowVariance {
    pub amplitude: f64,
    pub phase: f64,
}

/// Scalars derived by one [`CoreState::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct CoreUpdate {
    pub core_id: usize,
    pub timestamp: SystemTime,
    pub amplitude_moving_average: f64,
    pub phase_moving_average: f64,
    /// `None` until two frames are buffered
    pub variance: Option<WindowVariance>,
    /// Change of phase std per second of wall-clock time
    pub phase_derivative: f64,
    /// Scaled correlation with the previous frame of this core
    pub correlation: f64,
}

impl CoreState {
    pub fn new(moving_average_window: usize, variance_window: usize) -> Self {
        Self {
            amplitude_history: RingBuffer::new(variance_window),
            phase_history: RingBuffer::new(variance_window),
            moving_amplitude: RingBuffer::new(moving_average_window),
            moving_phase: RingBuffer::new(moving_average_window),
            previous_samples: None,
            previous_phase: None,
            frames: 0,
        }
    }

    /// Frames folded into this state so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fold one frame's features into the windows and derive its scalars
    pub fn update(&mut self, samples: &[Complex64], features: &FeatureRecord) -> CoreUpdate {
        let now = features.timestamp;

        self.moving_amplitude.push(features.mean_amplitude);
        self.moving_phase.push(features.phase_residual_std);

        self.amplitude_history.push(features.amplitude.clone());
        self.phase_history.push(features.phase_residual.clone());
        let variance = if self.amplitude_history.len() >= 2 {
            Some(WindowVariance {
                amplitude: mean_subcarrier_variance(&self.amplitude_history),
                phase: mean_subcarrier_variance(&self.phase_history),
            })
        } else {
            None
        };

        let phase_derivative = match self.previous_phase {
            Some((then, previous_std)) => match now.duration_since(then) {
                Ok(dt) if !dt.is_zero() => {
                    (features.phase_residual_std - previous_std) / dt.as_secs_f64()
                }
                _ => 0.0,
            },
            None => 0.0,
        };
        self.previous_phase = Some((now, features.phase_residual_std));

        let correlation = scaled_correlation(self.previous_samples.as_deref(), samples);
        self.previous_samples = Some(samples.to_vec());
        self.frames += 1;

        CoreUpdate {
            core_id: features.core_id,
            timestamp: now,
            amplitude_moving_average: window_mean(&self.moving_amplitude),
            phase_moving_average: window_mean(&self.moving_phase),
            variance,
            phase_derivative,
            correlation,
        }
    }
}

fn window_mean(window: &RingBuffer<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Variance of each subcarrier across the buffered frames, averaged over
/// subcarriers
fn mean_subcarrier_variance(history: &RingBuffer<Vec<f64>>) -> f64 {
    let width = history.iter().map(Vec::len).min().unwrap_or(0);
    if width == 0 {
        return 0.0;
    }

    let rows = history.len() as f64;
    let total: f64 = (0..width)
        .map(|k| {
            let mean = history.iter().map(|row| row[k]).sum::<f64>() / rows;
            history.iter().map(|row| (row[k] - mean).powi(2)).sum::<f64>() / rows
        })
        .sum();
    total / width as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn features(core_id: usize, at_ms: u64, amplitude: Vec<f64>, phase_std: f64) -> FeatureRecord {
        FeatureRecord {
            core_id,
            timestamp: UNIX_EPOCH + Duration::from_millis(at_ms),
            mean_amplitude: crate::features::mean_nonzero(&amplitude),
            median_amplitude: crate::features::median(&amplitude),
            phase_residual_std: phase_std,
            phase_residual_variance: phase_std * phase_std,
            phase_residual: vec![0.0; amplitude.len()],
            amplitude,
        }
    }

    fn samples(value: f64, n: usize) -> Vec<Complex64> {
        vec![Complex64::new(value, 0.0); n]
    }

    #[test]
    fn test_moving_average_partial_then_full_window() {
        let mut state = CoreState::new(3, 2);
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut averages = Vec::new();
        for (i, v) in values.iter().enumerate() {
            let update = state.update(&samples(*v, 4), &features(0, i as u64, vec![*v; 4], 0.0));
            averages.push(update.amplitude_moving_average);
        }

        assert_eq!(averages, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_variance_needs_two_frames() {
        let mut state = CoreState::new(10, 10);
        let first = state.update(&samples(1.0, 4), &features(0, 0, vec![1.0; 4], 0.0));
        assert!(first.variance.is_none());

        let second = state.update(&samples(1.0, 4), &features(0, 10, vec![1.0; 4], 0.0));
        assert_eq!(
            second.variance,
            Some(WindowVariance {
                amplitude: 0.0,
                phase: 0.0
            })
        );
    }

    #[test]
    fn test_variance_uses_trailing_window() {
        let mut state = CoreState::new(10, 2);
        state.update(&samples(1.0, 2), &features(0, 0, vec![100.0, 100.0], 0.0));
        state.update(&samples(1.0, 2), &features(0, 1, vec![1.0, 3.0], 0.0));
        let update = state.update(&samples(1.0, 2), &features(0, 2, vec![3.0, 1.0], 0.0));

        // Window holds [1, 3] and [3, 1]: each subcarrier has variance 1
        assert_eq!(update.variance.map(|v| v.amplitude), Some(1.0));
    }

    #[test]
    fn test_phase_derivative_uses_wall_clock() {
        let mut state = CoreState::new(10, 10);
        let first = state.update(&samples(1.0, 4), &features(0, 1000, vec![1.0; 4], 0.5));
        assert_eq!(first.phase_derivative, 0.0);

        let second = state.update(&samples(1.0, 4), &features(0, 1500, vec![1.0; 4], 1.5));
        assert!((second.phase_derivative - 2.0).abs() < 1e-12);

        // No elapsed time
        let third = state.update(&samples(1.0, 4), &features(0, 1500, vec![1.0; 4], 9.0));
        assert_eq!(third.phase_derivative, 0.0);
    }

    #[test]
    fn test_correlation_against_previous_frame() {
        let mut state = CoreState::new(10, 10);
        let first = state.update(&samples(2.0, 8), &features(1, 0, vec![2.0; 8], 0.0));
        assert_eq!(first.correlation, 0.0);

        let second = state.update(&samples(2.0, 8), &features(1, 5, vec![2.0; 8], 0.0));
        assert!((second.correlation - crate::features::CORR_SCALE).abs() < 1e-6);
        assert_eq!(state.frames(), 2);
    }
}
