//! Wavebench - audio filtering workbench core
//!
//! Loads a mono WAV file, mixes in a synthesized sine tone, applies a
//! Butterworth low-pass or band-pass filter with zero-phase filtering, and
//! produces waveform/spectrum plot data, with blocking playback between
//! stages. Playback and display are injected capabilities so the whole
//! pipeline runs without audio hardware or a screen.

pub mod audio;
pub mod buffer;
pub mod filters;
pub mod plot;
pub mod session;
pub mod spectrum;
pub mod synth;

pub use buffer::AudioBuffer;
pub use session::{Outcome, Session, SessionError};
