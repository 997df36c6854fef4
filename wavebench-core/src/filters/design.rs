//! Butterworth IIR filter design
//!
//! Designs digital low-pass and band-pass transfer functions from the analog
//! prototype: prototype poles, frequency pre-warping, low-pass-to-low-pass or
//! low-pass-to-band-pass transformation, bilinear transform, polynomial
//! expansion.

use num_complex::Complex64;
use std::f64::consts::PI;
use thiserror::Error;

/// Filter order used for every designed filter
pub const FILTER_ORDER: usize = 5;

/// Half-width of the band-pass passband around the center frequency
pub const BAND_HALF_WIDTH_HZ: f64 = 100.0;

/// Internal sample rate the normalized design runs at before the bilinear
/// transform maps it back to the unit circle
const DESIGN_FS: f64 = 2.0;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidFrequencyError {
    #[error("frequency '{0}' is not a number")]
    NotNumeric(String),

    #[error("frequency {0} Hz must be a positive number")]
    NotPositive(f64),

    #[error("frequency {freq} Hz is at or above the Nyquist frequency {nyquist} Hz")]
    AtOrAboveNyquist { freq: f64, nyquist: f64 },

    #[error("passband {low}..{high} Hz leaves the open interval (0, {nyquist}) Hz")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },
}

/// Parse a user-entered frequency field
///
/// # Arguments
/// * `text` - Free-text frequency in Hz
pub fn parse_frequency(text: &str) -> Result<f64, InvalidFrequencyError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| InvalidFrequencyError::NotNumeric(text.trim().to_string()))
}

/// Filter passband shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    /// Single cutoff frequency in Hz
    Lowpass { cutoff_hz: f64 },

    /// Passband edges in Hz
    Bandpass { low_hz: f64, high_hz: f64 },
}

/// Specification of a filter to design
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Filter order
    pub order: usize,

    /// Passband shape and corner frequencies
    pub band: Band,
}

impl FilterSpec {
    /// Low-pass filter at the given cutoff frequency
    pub fn lowpass(cutoff_hz: f64) -> Self {
        Self {
            order: FILTER_ORDER,
            band: Band::Lowpass { cutoff_hz },
        }
    }

    /// Band-pass filter centered at the given frequency, passband
    /// [center - 100 Hz, center + 100 Hz]
    pub fn bandpass(center_hz: f64) -> Self {
        Self {
            order: FILTER_ORDER,
            band: Band::Bandpass {
                low_hz: center_hz - BAND_HALF_WIDTH_HZ,
                high_hz: center_hz + BAND_HALF_WIDTH_HZ,
            },
        }
    }

    /// Human-readable passband label for logs and figure titles
    pub fn label(&self) -> &'static str {
        match self.band {
            Band::Lowpass { .. } => "low-pass",
            Band::Bandpass { .. } => "band-pass",
        }
    }

    /// Design digital transfer-function coefficients for this spec
    ///
    /// Corner frequencies are normalized by the Nyquist frequency and must
    /// land strictly inside (0, 1); anything else is rejected, never clamped.
    pub fn design(&self, sample_rate: f64) -> Result<Coefficients, InvalidFrequencyError> {
        let nyquist = sample_rate / 2.0;

        match self.band {
            Band::Lowpass { cutoff_hz } => {
                if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
                    return Err(InvalidFrequencyError::NotPositive(cutoff_hz));
                }
                if cutoff_hz >= nyquist {
                    return Err(InvalidFrequencyError::AtOrAboveNyquist {
                        freq: cutoff_hz,
                        nyquist,
                    });
                }

                Ok(butter_lowpass(self.order, cutoff_hz / nyquist))
            }
            Band::Bandpass { low_hz, high_hz } => {
                if !low_hz.is_finite() || !high_hz.is_finite() {
                    return Err(InvalidFrequencyError::NotPositive(low_hz));
                }
                if low_hz <= 0.0 || high_hz >= nyquist {
                    return Err(InvalidFrequencyError::InvalidBand {
                        low: low_hz,
                        high: high_hz,
                        nyquist,
                    });
                }

                Ok(butter_bandpass(
                    self.order,
                    low_hz / nyquist,
                    high_hz / nyquist,
                ))
            }
        }
    }
}

/// Digital transfer-function coefficients, numerator `b` over denominator `a`
///
/// `a[0]` is always 1; `b` and `a` have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl Coefficients {
    /// Magnitude response |H(e^jw)| at the given frequency
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        let z_inv = Complex64::new(omega.cos(), -omega.sin());

        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
        };

        (eval(&self.b) / eval(&self.a)).norm()
    }
}

/// Analog Butterworth prototype poles at unit cutoff, all in the left
/// half-plane, conjugate-paired
fn prototype_poles(order: usize) -> Vec<Complex64> {
    (0..order)
        .map(|k| {
            let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64 + PI / 2.0;
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}

/// Pre-warp a normalized corner so the bilinear transform lands it back on
/// the requested digital frequency
fn prewarp(normalized: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * normalized / DESIGN_FS).tan()
}

/// Expand roots into a monic real polynomial, highest power first
///
/// Roots must come in conjugate pairs (or be real); imaginary residue is
/// rounding noise and is dropped.
fn poly(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }

    coeffs.iter().map(|c| c.re).collect()
}

/// Map analog zeros/poles/gain through the bilinear transform and expand
/// into digital (b, a) coefficients
fn bilinear_zpk(s_zeros: &[Complex64], s_poles: &[Complex64], gain: f64) -> Coefficients {
    let fs2 = 2.0 * DESIGN_FS;
    let one = Complex64::new(1.0, 0.0);

    let z_map = |s: Complex64| (fs2 + s) / (fs2 - s);

    let mut z_zeros: Vec<Complex64> = s_zeros.iter().map(|&z| z_map(z)).collect();
    let z_poles: Vec<Complex64> = s_poles.iter().map(|&p| z_map(p)).collect();

    // every analog degree the numerator is short of the denominator becomes
    // a digital zero at z = -1
    while z_zeros.len() < z_poles.len() {
        z_zeros.push(Complex64::new(-1.0, 0.0));
    }

    let num = s_zeros.iter().fold(one, |acc, &z| acc * (fs2 - z));
    let den = s_poles.iter().fold(one, |acc, &p| acc * (fs2 - p));
    let k = gain * (num / den).re;

    let b = poly(&z_zeros).iter().map(|&c| c * k).collect();
    let a = poly(&z_poles);

    Coefficients { b, a }
}

/// Digital Butterworth low-pass; `cutoff` is normalized by Nyquist, in (0, 1)
fn butter_lowpass(order: usize, cutoff: f64) -> Coefficients {
    let warped = prewarp(cutoff);

    let s_poles: Vec<Complex64> = prototype_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();
    let gain = warped.powi(order as i32);

    bilinear_zpk(&[], &s_poles, gain)
}

/// Digital Butterworth band-pass; edges are normalized by Nyquist, in (0, 1)
fn butter_bandpass(order: usize, low: f64, high: f64) -> Coefficients {
    let w1 = prewarp(low);
    let w2 = prewarp(high);
    let bw = w2 - w1;
    let w0 = (w1 * w2).sqrt();

    // low-pass-to-band-pass: each prototype pole splits into a pair around
    // the center frequency, and the numerator picks up `order` zeros at s = 0
    let mut s_poles = Vec::with_capacity(2 * order);
    for p in prototype_poles(order) {
        let scaled = p * (bw / 2.0);
        let offset = (scaled * scaled - Complex64::new(w0 * w0, 0.0)).sqrt();
        s_poles.push(scaled + offset);
        s_poles.push(scaled - offset);
    }
    let s_zeros = vec![Complex64::new(0.0, 0.0); order];
    let gain = bw.powi(order as i32);

    bilinear_zpk(&s_zeros, &s_poles, gain)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 8000.0;

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency(" 1000 "), Ok(1000.0));
        assert_eq!(parse_frequency("437.5"), Ok(437.5));
        assert!(matches!(
            parse_frequency("fast"),
            Err(InvalidFrequencyError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_frequency(""),
            Err(InvalidFrequencyError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_lowpass_rejects_cutoff_at_or_above_nyquist() {
        for cutoff in [4000.0, 4100.0, 8000.0] {
            let err = FilterSpec::lowpass(cutoff).design(SAMPLE_RATE).unwrap_err();
            assert!(matches!(
                err,
                InvalidFrequencyError::AtOrAboveNyquist { .. }
            ));
        }
    }

    #[test]
    fn test_lowpass_rejects_nonpositive_cutoff() {
        for cutoff in [0.0, -100.0, f64::NAN] {
            let err = FilterSpec::lowpass(cutoff).design(SAMPLE_RATE).unwrap_err();
            assert!(matches!(err, InvalidFrequencyError::NotPositive(_)));
        }
    }

    #[test]
    fn test_bandpass_rejects_band_outside_nyquist() {
        // low edge 50 - 100 < 0
        assert!(matches!(
            FilterSpec::bandpass(50.0).design(SAMPLE_RATE).unwrap_err(),
            InvalidFrequencyError::InvalidBand { .. }
        ));
        // high edge 3950 + 100 >= 4000
        assert!(matches!(
            FilterSpec::bandpass(3950.0).design(SAMPLE_RATE).unwrap_err(),
            InvalidFrequencyError::InvalidBand { .. }
        ));
    }

    #[test]
    fn test_lowpass_coefficient_shape() {
        let coeffs = FilterSpec::lowpass(1000.0).design(SAMPLE_RATE).unwrap();

        assert_eq!(coeffs.b.len(), FILTER_ORDER + 1);
        assert_eq!(coeffs.a.len(), FILTER_ORDER + 1);
        assert!((coeffs.a[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bandpass_coefficient_shape() {
        let coeffs = FilterSpec::bandpass(2000.0).design(SAMPLE_RATE).unwrap();

        assert_eq!(coeffs.b.len(), 2 * FILTER_ORDER + 1);
        assert_eq!(coeffs.a.len(), 2 * FILTER_ORDER + 1);
        assert!((coeffs.a[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lowpass_magnitude_response() {
        let coeffs = FilterSpec::lowpass(1000.0).design(SAMPLE_RATE).unwrap();

        // Unity at DC
        let dc: f64 = coeffs.b.iter().sum::<f64>() / coeffs.a.iter().sum::<f64>();
        assert!((dc - 1.0).abs() < 1e-9, "DC gain: {}", dc);

        // -3 dB at the cutoff (pre-warping makes this exact)
        let at_cutoff = coeffs.magnitude_at(1000.0, SAMPLE_RATE);
        assert!(
            (at_cutoff - 1.0 / 2.0_f64.sqrt()).abs() < 1e-6,
            "cutoff magnitude: {}",
            at_cutoff
        );

        // Negligible loss well below the cutoff
        let passband = coeffs.magnitude_at(440.0, SAMPLE_RATE);
        assert!(passband > 0.99, "passband magnitude: {}", passband);

        // Strong attenuation well above the cutoff
        let stopband = coeffs.magnitude_at(3500.0, SAMPLE_RATE);
        assert!(stopband < 0.01, "stopband magnitude: {}", stopband);
    }

    #[test]
    fn test_bandpass_magnitude_response() {
        let coeffs = FilterSpec::bandpass(2000.0).design(SAMPLE_RATE).unwrap();

        // Unity at the (pre-warp corrected) center of the passband
        let w0 = (prewarp(1900.0 / 4000.0) * prewarp(2100.0 / 4000.0)).sqrt();
        let center_hz = (w0 / (2.0 * DESIGN_FS)).atan() * 2.0 / PI * 4000.0;
        let at_center = coeffs.magnitude_at(center_hz, SAMPLE_RATE);
        assert!((at_center - 1.0).abs() < 1e-6, "center magnitude: {}", at_center);

        // Blocked at DC and far outside the band
        assert!(coeffs.magnitude_at(0.0, SAMPLE_RATE) < 1e-9);
        assert!(coeffs.magnitude_at(440.0, SAMPLE_RATE) < 0.01);
        assert!(coeffs.magnitude_at(3900.0, SAMPLE_RATE) < 0.01);
    }

    #[test]
    fn test_first_order_lowpass_reference() {
        // butter(1, 0.5) has the closed form b = [0.5, 0.5], a = [1, 0]
        let coeffs = butter_lowpass(1, 0.5);

        assert!((coeffs.b[0] - 0.5).abs() < 1e-12);
        assert!((coeffs.b[1] - 0.5).abs() < 1e-12);
        assert!((coeffs.a[0] - 1.0).abs() < 1e-12);
        assert!(coeffs.a[1].abs() < 1e-12);
    }

    #[test]
    fn test_spec_labels() {
        assert_eq!(FilterSpec::lowpass(1000.0).label(), "low-pass");
        assert_eq!(FilterSpec::bandpass(2000.0).label(), "band-pass");
    }
}
