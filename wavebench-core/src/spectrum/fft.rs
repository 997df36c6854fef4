//! FFT engine using realfft for real-valued signals

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::buffer::AudioBuffer;

/// FFT engine for real-valued signals
///
/// Transforms a whole signal of a fixed length and exposes the magnitude of
/// the non-negative frequency half of the spectrum.
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,
}

impl FftEngine {
    /// Create an FFT engine for signals of the given length
    ///
    /// # Panics
    /// Panics if `fft_size` is zero.
    pub fn new(fft_size: usize) -> Self {
        assert!(fft_size > 0, "FFT size must be positive");

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        Self { fft_size, r2c }
    }

    /// Compute the magnitude spectrum |X[k]| for the non-negative
    /// frequency bins, k = 0..=fft_size/2
    ///
    /// # Arguments
    /// * `signal` - Input signal; must be exactly `fft_size` samples
    pub fn compute_magnitude(&self, signal: &[f64]) -> Vec<f64> {
        assert_eq!(signal.len(), self.fft_size, "signal length must match FFT size");

        let mut input = signal.to_vec();
        let mut output = self.r2c.make_output_vec();
        self.r2c
            .process(&mut input, &mut output)
            .expect("FFT processing failed");

        output.iter().map(|c| c.norm()).collect()
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for a real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Frequency axis in Hz, from 0 up to the Nyquist frequency
    pub fn frequency_axis_hz(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.num_bins())
            .map(|bin| bin as f64 * sample_rate / self.fft_size as f64)
            .collect()
    }
}

/// Magnitude spectrum of a buffer: (frequency axis in Hz, magnitudes)
///
/// An empty buffer yields empty axes.
pub fn magnitude_spectrum(buffer: &AudioBuffer) -> (Vec<f64>, Vec<f64>) {
    if buffer.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let engine = FftEngine::new(buffer.len());
    let freqs = engine.frequency_axis_hz(buffer.sample_rate() as f64);
    let mags = engine.compute_magnitude(buffer.samples());

    (freqs, mags)
}
