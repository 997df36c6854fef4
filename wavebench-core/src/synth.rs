//! Sinusoid synthesis and signal mixing

use std::f64::consts::PI;

/// Generate a sinusoid: s[i] = amplitude * sin(2π * freq_hz * i / sample_rate)
///
/// Samples the half-open interval [0, len/sample_rate): the first sample is
/// at t = 0 and there is no sample at t = duration. `len == 0` yields an
/// empty vector.
pub fn sine(len: usize, freq_hz: f64, amplitude: f64, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            amplitude * (2.0 * PI * freq_hz * t).sin()
        })
        .collect()
}

/// Elementwise sum of two equal-length signals
///
/// # Panics
/// Panics if the slices differ in length; the caller is responsible for
/// mixing signals of the same length and sample rate.
pub fn mix(a: &[f64], b: &[f64]) -> Vec<f64> {
    assert_eq!(a.len(), b.len(), "mixed signals must have equal length");

    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_length_matches_request() {
        for len in [0, 1, 7, 8000] {
            assert_eq!(sine(len, 440.0, 0.001, 8000.0).len(), len);
        }
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let s = sine(16, 440.0, 1.0, 8000.0);
        assert!(s[0].abs() < 1e-12);
    }

    #[test]
    fn test_sine_sample_values() {
        let s = sine(8, 1000.0, 0.5, 8000.0);

        // 1 kHz at 8 kHz: one eighth of a cycle per sample
        for (i, &v) in s.iter().enumerate() {
            let expected = 0.5 * (2.0 * PI * 1000.0 * i as f64 / 8000.0).sin();
            assert!((v - expected).abs() < 1e-12, "sample {}: {} vs {}", i, v, expected);
        }
    }

    #[test]
    fn test_sine_half_open_interval() {
        // A full period sampled half-open never repeats the t = 0 point, so
        // the sample one period in would be s[0] again only if it existed.
        let sr = 8000.0;
        let s = sine(8, 1000.0, 1.0, sr);
        // Last sample sits at 7/8 of the period, not at the period boundary
        let expected = (2.0 * PI * 7.0 / 8.0).sin();
        assert!((s[7] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_mix_is_elementwise_sum() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![0.5, -2.0, 0.25];

        let m = mix(&a, &b);

        assert_eq!(m, vec![1.5, 0.0, 3.25]);
    }

    #[test]
    fn test_mix_is_commutative() {
        let a = vec![0.1, -0.7, 0.3, 0.9];
        let b = vec![-0.4, 0.2, 0.6, -0.1];

        assert_eq!(mix(&a, &b), mix(&b, &a));
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_mix_length_mismatch_panics() {
        let _ = mix(&[1.0, 2.0], &[1.0]);
    }
}
