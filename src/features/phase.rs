use num_complex::Complex64;
use std::f64::consts::{PI, TAU};

/// Unwrapped, linearly detrended phase of a frame
pub fn phase_residual(samples: &[Complex64]) -> Vec<f64> {
    let wrapped: Vec<f64> = samples.iter().map(|z| z.arg()).collect();
    detrend(&unwrap(&wrapped))
}

/// Remove 2π discontinuities between consecutive entries.
///
/// A jump of at least π is replaced by its equivalent in `[-π, π)`, with
/// an exact `-π` jump kept positive when the raw step was positive.
pub fn unwrap(phase: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phase.len());
    let mut correction = 0.0;

    for (i, &value) in phase.iter().enumerate() {
        if i > 0 {
            let step = value - phase[i - 1];
            if step.abs() >= PI {
                let mut wrapped_step = (step + PI).rem_euclid(TAU) - PI;
                if wrapped_step == -PI && step > 0.0 {
                    wrapped_step = PI;
                }
                correction += wrapped_step - step;
            }
        }
        unwrapped.push(value + correction);
    }

    unwrapped
}

/// Subtract the least-squares line fitted against index.
///
/// Fewer than two points have no defined slope and are returned unchanged.
pub fn detrend(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return values.to_vec();
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;
    let (mut num, mut den) = (0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = num / den;
    let intercept = y_mean - slope * x_mean;

    values
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (slope * i as f64 + intercept))
        .collect()
}
