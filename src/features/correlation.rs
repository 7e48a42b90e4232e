use num_complex::Complex64;

/// Multiplier applied to the normalized correlation so it plots on the
/// same scale as amplitudes
pub const CORR_SCALE: f64 = 1000.0;

/// Added to the norm product so zero-energy frames yield zero
pub const NORM_EPSILON: f64 = 1e-12;

/// `|<previous, current>| / (|previous| |current| + eps)`, in `[0, 1]`.
///
/// The inner product conjugates `previous`. Vectors of different length
/// are compared over their common prefix.
pub fn frame_correlation(previous: &[Complex64], current: &[Complex64]) -> f64 {
    let inner: Complex64 = previous
        .iter()
        .zip(current)
        .map(|(p, c)| p.conj() * c)
        .sum();
    inner.norm() / (norm(previous) * norm(current) + NORM_EPSILON)
}

/// Correlation against the previous frame of the same core, scaled by
/// [`CORR_SCALE`]. Zero for the first frame.
pub fn scaled_correlation(previous: Option<&[Complex64]>, current: &[Complex64]) -> f64 {
    previous.map_or(0.0, |p| frame_correlation(p, current) * CORR_SCALE)
}

fn norm(v: &[Complex64]) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_correlate_fully() {
        let v: Vec<Complex64> = (0..64).map(|k| Complex64::new(1.0, 0.1 * k as f64)).collect();
        let scaled = scaled_correlation(Some(&v), &v);
        assert!((scaled - CORR_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors() {
        let a = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let b = [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];
        assert!(frame_correlation(&a, &b) < 1e-9);
    }

    #[test]
    fn test_phase_rotation_invariant() {
        let a: Vec<Complex64> = (0..8).map(|k| Complex64::new(k as f64, 1.0)).collect();
        let rotation = Complex64::from_polar(1.0, 0.8);
        let b: Vec<Complex64> = a.iter().map(|z| z * rotation).collect();
        assert!((frame_correlation(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_norm_and_first_frame() {
        let zeros = vec![Complex64::new(0.0, 0.0); 4];
        let ones = vec![Complex64::new(1.0, 0.0); 4];
        assert_eq!(frame_correlation(&zeros, &ones), 0.0);
        assert_eq!(scaled_correlation(None, &ones), 0.0);
    }
}
