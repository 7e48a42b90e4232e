use csimon::core::SubcarrierFrame;
use csimon::features::{self, frame_correlation, scaled_correlation, CORR_SCALE};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::time::SystemTime;

const TOLERANCE: f64 = 1e-9;

fn frame(samples: Vec<Complex64>) -> SubcarrierFrame {
    SubcarrierFrame {
        sequence: 1,
        core_id: 0,
        stream_id: 0,
        samples,
        received_at: SystemTime::now(),
    }
}

#[test]
fn test_constant_phase_and_magnitude() {
    let amplitude = 3.5;
    let samples = vec![Complex64::from_polar(amplitude, 0.7); 64];
    let features = features::extract(&frame(samples));

    assert!((features.mean_amplitude - amplitude).abs() < TOLERANCE);
    assert!(features.phase_residual_std.abs() < TOLERANCE);
    assert!((features.median_amplitude - amplitude).abs() < TOLERANCE);
    assert_eq!(features.amplitude.len(), 64);
    assert_eq!(features.phase_residual.len(), 64);
}

#[test]
fn test_zero_bins_excluded_from_mean() {
    let mut samples = vec![Complex64::new(2.0, 0.0); 8];
    samples[0] = Complex64::new(0.0, 0.0);
    samples[7] = Complex64::new(0.0, 0.0);

    let features = features::extract(&frame(samples));
    assert!((features.mean_amplitude - 2.0).abs() < TOLERANCE);
}

#[test]
fn test_all_zero_frame() {
    let features = features::extract(&frame(vec![Complex64::new(0.0, 0.0); 16]));

    assert_eq!(features.mean_amplitude, 0.0);
    assert_eq!(features.median_amplitude, 0.0);
    assert!(features.phase_residual_std.abs() < TOLERANCE);
}

#[test]
fn test_wrapping_linear_phase_is_detrended() {
    // Phase advances 0.9 rad per subcarrier and wraps several times
    let samples: Vec<Complex64> = (0..64)
        .map(|k| Complex64::from_polar(1.0, 0.9 * k as f64 - PI))
        .collect();
    let features = features::extract(&frame(samples));

    assert!(features.phase_residual_std < 1e-9);
}

#[test]
fn test_nonlinear_phase_has_residual() {
    let samples: Vec<Complex64> = (0..64)
        .map(|k| {
            let x = k as f64 / 63.0;
            Complex64::from_polar(1.0, 2.0 * (x - 0.5).powi(2))
        })
        .collect();
    let features = features::extract(&frame(samples));

    assert!(features.phase_residual_std > 0.01);
    assert!((features.phase_residual_variance - features.phase_residual_std.powi(2)).abs() < TOLERANCE);
    let residual_mean: f64 = features.phase_residual.iter().sum::<f64>() / 64.0;
    assert!(residual_mean.abs() < 1e-9);
}

#[test]
fn test_correlation_identical_and_orthogonal() {
    let v: Vec<Complex64> = (0..64).map(|k| Complex64::new(1.0 + k as f64, -0.5)).collect();
    assert!((scaled_correlation(Some(&v), &v) - CORR_SCALE).abs() < 1e-6);

    let a: Vec<Complex64> = (0..64)
        .map(|k| if k % 2 == 0 { Complex64::new(1.0, 0.0) } else { Complex64::new(0.0, 0.0) })
        .collect();
    let b: Vec<Complex64> = (0..64)
        .map(|k| if k % 2 == 1 { Complex64::new(0.0, 1.0) } else { Complex64::new(0.0, 0.0) })
        .collect();
    assert!(frame_correlation(&a, &b) < 1e-9);
}
