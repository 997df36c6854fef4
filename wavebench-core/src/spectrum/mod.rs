//! Spectral analysis with FFT

pub mod fft;

pub use fft::{magnitude_spectrum, FftEngine};
