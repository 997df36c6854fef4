//! IIR filter application and zero-phase filtering
//!
//! Runs a designed transfer function over a whole buffer, forward and
//! backward, so the two passes cancel each other's phase shift. The entire
//! signal must be in memory; this path is not streaming-capable.

/// Apply the filter (b, a) to `x` in direct form II transposed
///
/// # Arguments
/// * `b`, `a` - Transfer-function coefficients; `a[0]` must be non-zero
/// * `x` - Input samples
/// * `zi` - Optional initial state of length `max(len(b), len(a)) - 1`
///
/// # Returns
/// Filtered output, same length as `x`
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64], zi: Option<&[f64]>) -> Vec<f64> {
    let n = b.len().max(a.len());
    let a0 = a[0];
    let bn: Vec<f64> = (0..n).map(|i| b.get(i).copied().unwrap_or(0.0) / a0).collect();
    let an: Vec<f64> = (0..n).map(|i| a.get(i).copied().unwrap_or(0.0) / a0).collect();

    let mut state = match zi {
        Some(zi) => {
            assert_eq!(zi.len(), n - 1, "initial state length must be n - 1");
            zi.to_vec()
        }
        None => vec![0.0; n - 1],
    };

    let mut y = Vec::with_capacity(x.len());
    for &xi in x {
        let yi = bn[0] * xi + state.first().copied().unwrap_or(0.0);
        for i in 0..state.len() {
            let carry = if i + 1 < state.len() { state[i + 1] } else { 0.0 };
            state[i] = bn[i + 1] * xi + carry - an[i + 1] * yi;
        }
        y.push(yi);
    }

    y
}

/// Initial filter state that makes the step response start at steady state
///
/// Solves (I - A^T) zi = B for the companion-form state matrix A, so that a
/// constant input produces a constant output from the first sample. Scaling
/// `zi` by the first input sample removes the startup transient in
/// [`filtfilt`].
pub fn lfilter_zi(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = b.len().max(a.len());
    let a0 = a[0];
    let bn: Vec<f64> = (0..n).map(|i| b.get(i).copied().unwrap_or(0.0) / a0).collect();
    let an: Vec<f64> = (0..n).map(|i| a.get(i).copied().unwrap_or(0.0) / a0).collect();

    let m = n - 1;
    if m == 0 {
        return Vec::new();
    }

    let mut mat = vec![vec![0.0; m]; m];
    let mut rhs = vec![0.0; m];
    for i in 0..m {
        for (j, cell) in mat[i].iter_mut().enumerate() {
            let mut v = if i == j { 1.0 } else { 0.0 };
            if j == 0 {
                v += an[i + 1];
            }
            if j == i + 1 {
                v -= 1.0;
            }
            *cell = v;
        }
        rhs[i] = bn[i + 1] - an[i + 1] * bn[0];
    }

    solve(mat, rhs)
}

/// Zero-phase forward-backward filtering
///
/// The signal is extended at both ends by odd reflection (pad length three
/// times the coefficient count, clamped below the signal length), filtered
/// forward, reversed, filtered again, and reversed back; both passes start
/// from scaled steady-state initial conditions. Output length equals input
/// length; an empty input yields an empty output.
pub fn filtfilt(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let ntaps = b.len().max(a.len());
    let edge = (3 * ntaps).min(n - 1);

    let mut ext = Vec::with_capacity(n + 2 * edge);
    for i in (1..=edge).rev() {
        ext.push(2.0 * x[0] - x[i]);
    }
    ext.extend_from_slice(x);
    for i in 1..=edge {
        ext.push(2.0 * x[n - 1] - x[n - 1 - i]);
    }

    let zi = lfilter_zi(b, a);
    let scaled = |v: f64| -> Vec<f64> { zi.iter().map(|&c| c * v).collect() };

    let forward = lfilter(b, a, &ext, Some(&scaled(ext[0])));

    let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = lfilter(b, a, &reversed, Some(&scaled(reversed[0])));
    reversed = backward.into_iter().rev().collect();

    reversed[edge..edge + n].to_vec()
}

/// Solve a small dense linear system by Gaussian elimination with partial
/// pivoting
fn solve(mut mat: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| mat[i][col].abs().total_cmp(&mat[j][col].abs()))
            .unwrap();
        mat.swap(col, pivot);
        rhs.swap(col, pivot);

        let head = mat[col][col];
        for row in col + 1..n {
            let factor = mat[row][col] / head;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let v = mat[col][k];
                mat[row][k] -= factor * v;
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= mat[row][k] * x[k];
        }
        x[row] = acc / mat[row][row];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::design::FilterSpec;
    use crate::synth::sine;

    const SAMPLE_RATE: f64 = 8000.0;

    /// RMS over the middle half of the signal, away from any edge effects
    fn mid_rms(x: &[f64]) -> f64 {
        let quarter = x.len() / 4;
        let mid = &x[quarter..x.len() - quarter];
        (mid.iter().map(|&v| v * v).sum::<f64>() / mid.len() as f64).sqrt()
    }

    #[test]
    fn test_lfilter_fir_moving_average() {
        let y = lfilter(&[0.5, 0.5], &[1.0], &[1.0, 2.0, 3.0, 4.0], None);

        assert_eq!(y.len(), 4);
        for (got, want) in y.iter().zip([0.5, 1.5, 2.5, 3.5]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_lfilter_first_order_recursion() {
        // y[n] = x[n] + 0.5 y[n-1]
        let y = lfilter(&[1.0], &[1.0, -0.5], &[1.0, 0.0, 0.0, 0.0], None);

        for (got, want) in y.iter().zip([1.0, 0.5, 0.25, 0.125]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_lfilter_zi_holds_steady_state() {
        let coeffs = FilterSpec::lowpass(1000.0).design(SAMPLE_RATE).unwrap();
        let zi = lfilter_zi(&coeffs.b, &coeffs.a);

        // With zi scaled by the constant input level, a DC-unity filter must
        // output that level from the very first sample
        let level = 0.7;
        let scaled: Vec<f64> = zi.iter().map(|&c| c * level).collect();
        let y = lfilter(&coeffs.b, &coeffs.a, &vec![level; 64], Some(&scaled));

        for (i, &v) in y.iter().enumerate() {
            assert!((v - level).abs() < 1e-9, "sample {}: {}", i, v);
        }
    }

    #[test]
    fn test_filtfilt_preserves_length() {
        let coeffs = FilterSpec::lowpass(1000.0).design(SAMPLE_RATE).unwrap();

        for len in [1, 5, 17, 100, 8000] {
            let x = sine(len, 440.0, 1.0, SAMPLE_RATE);
            assert_eq!(filtfilt(&coeffs.b, &coeffs.a, &x).len(), len);
        }
        assert!(filtfilt(&coeffs.b, &coeffs.a, &[]).is_empty());
    }

    #[test]
    fn test_filtfilt_is_zero_phase_in_the_passband() {
        // A tone far below the cutoff must come through aligned sample by
        // sample: the forward and backward passes cancel each other's delay
        let coeffs = FilterSpec::lowpass(2000.0).design(SAMPLE_RATE).unwrap();
        let x = sine(4000, 200.0, 1.0, SAMPLE_RATE);

        let y = filtfilt(&coeffs.b, &coeffs.a, &x);

        let quarter = x.len() / 4;
        for i in quarter..x.len() - quarter {
            assert!(
                (y[i] - x[i]).abs() < 0.01,
                "sample {}: {} vs {}",
                i,
                y[i],
                x[i]
            );
        }
    }

    #[test]
    fn test_lowpass_above_tone_keeps_amplitude() {
        // 1 s of 440 Hz at 8 kHz, low-pass at 1 kHz: the tone sits well
        // inside the passband, so less than 1% amplitude loss
        let coeffs = FilterSpec::lowpass(1000.0).design(SAMPLE_RATE).unwrap();
        let x = sine(8000, 440.0, 1.0, SAMPLE_RATE);

        let y = filtfilt(&coeffs.b, &coeffs.a, &x);

        assert_eq!(y.len(), 8000);
        let ratio = mid_rms(&y) / mid_rms(&x);
        assert!(ratio > 0.99 && ratio < 1.01, "amplitude ratio: {}", ratio);
    }

    #[test]
    fn test_lowpass_below_tone_attenuates() {
        let coeffs = FilterSpec::lowpass(100.0).design(SAMPLE_RATE).unwrap();
        let x = sine(8000, 440.0, 1.0, SAMPLE_RATE);

        let y = filtfilt(&coeffs.b, &coeffs.a, &x);

        let ratio = mid_rms(&y) / mid_rms(&x);
        assert!(ratio < 0.01, "amplitude ratio: {}", ratio);
    }

    #[test]
    fn test_bandpass_away_from_tone_attenuates() {
        // A band-pass centered at 2 kHz removes more than 90% of a
        // 440 Hz tone
        let coeffs = FilterSpec::bandpass(2000.0).design(SAMPLE_RATE).unwrap();
        let x = sine(8000, 440.0, 1.0, SAMPLE_RATE);

        let y = filtfilt(&coeffs.b, &coeffs.a, &x);

        let ratio = mid_rms(&y) / mid_rms(&x);
        assert!(ratio < 0.1, "amplitude ratio: {}", ratio);
    }
}
