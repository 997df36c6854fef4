//! Session state and the five user actions
//!
//! Owns the loaded signal and its derived buffers and drives each pipeline
//! stage through injected playback and display capabilities. Actions whose
//! input buffer is missing are silent no-ops, surfaced as
//! [`Outcome::Skipped`] so callers can still observe them.

use std::path::Path;

use thiserror::Error;

use crate::audio::output::{DeviceError, Player};
use crate::audio::wav::{load_wav, FileReadError};
use crate::buffer::AudioBuffer;
use crate::filters::design::{FilterSpec, InvalidFrequencyError};
use crate::filters::iir::filtfilt;
use crate::plot::{filter_figure, signal_figure, RenderError, Renderer};
use crate::synth::{mix, sine};

/// Frequency of the synthesized noise tone (A4)
pub const NOISE_FREQ_HZ: f64 = 440.0;

/// Amplitude of the synthesized noise tone
pub const NOISE_AMPLITUDE: f64 = 0.001;

/// What a session action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action ran to completion
    Completed,

    /// The action's input buffer was missing; nothing happened
    Skipped,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    FileRead(#[from] FileReadError),

    #[error(transparent)]
    InvalidFrequency(#[from] InvalidFrequencyError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One audio-processing session: a loaded signal plus its derived buffers
///
/// Failed actions leave the previous state untouched; buffers are only
/// stored once playback and rendering have succeeded.
pub struct Session {
    player: Box<dyn Player>,
    renderer: Box<dyn Renderer>,
    original: Option<AudioBuffer>,
    noisy: Option<AudioBuffer>,
    filtered: Option<AudioBuffer>,
}

impl Session {
    pub fn new(player: Box<dyn Player>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            player,
            renderer,
            original: None,
            noisy: None,
            filtered: None,
        }
    }

    /// Loaded signal, if any
    pub fn original(&self) -> Option<&AudioBuffer> {
        self.original.as_ref()
    }

    /// Noisy mix, if one has been produced
    pub fn noisy(&self) -> Option<&AudioBuffer> {
        self.noisy.as_ref()
    }

    /// Filtered signal, if one has been produced
    pub fn filtered(&self) -> Option<&AudioBuffer> {
        self.filtered.as_ref()
    }

    /// Most recently derived signal: filtered, else noisy, else original
    pub fn latest(&self) -> Option<&AudioBuffer> {
        self.filtered
            .as_ref()
            .or(self.noisy.as_ref())
            .or(self.original.as_ref())
    }

    /// Load a WAV file, play it, and show its waveform and spectrum
    ///
    /// On success the file becomes the session's original signal and every
    /// derived buffer is reset.
    pub fn show_original(&mut self, path: &Path) -> Result<Outcome, SessionError> {
        let buffer = load_wav(path)?;
        log::info!(
            "loaded '{}': {} samples at {} Hz",
            path.display(),
            buffer.len(),
            buffer.sample_rate()
        );

        self.player.play(&buffer)?;
        self.renderer.render(&signal_figure("Original audio", &buffer))?;

        self.original = Some(buffer);
        self.noisy = None;
        self.filtered = None;
        Ok(Outcome::Completed)
    }

    /// Play and show the synthesized noise tone on its own
    ///
    /// Does not modify session state.
    pub fn play_noise(&mut self) -> Result<Outcome, SessionError> {
        let Some(original) = &self.original else {
            log::debug!("no signal loaded; skipping noise playback");
            return Ok(Outcome::Skipped);
        };

        let noise = AudioBuffer::new(
            sine(
                original.len(),
                NOISE_FREQ_HZ,
                NOISE_AMPLITUDE,
                original.sample_rate() as f64,
            ),
            original.sample_rate(),
        );

        self.player.play(&noise)?;
        self.render_signal("Sine noise", &noise)?;
        Ok(Outcome::Completed)
    }

    /// Mix the noise tone into the original, play and show the result
    pub fn play_noisy(&mut self) -> Result<Outcome, SessionError> {
        let Some(original) = &self.original else {
            log::debug!("no signal loaded; skipping noisy mix");
            return Ok(Outcome::Skipped);
        };

        let noise = sine(
            original.len(),
            NOISE_FREQ_HZ,
            NOISE_AMPLITUDE,
            original.sample_rate() as f64,
        );
        let noisy = AudioBuffer::new(
            mix(original.samples(), &noise),
            original.sample_rate(),
        );

        self.player.play(&noisy)?;
        self.render_signal("Noisy signal", &noisy)?;

        self.noisy = Some(noisy);
        Ok(Outcome::Completed)
    }

    /// Low-pass filter the noisy mix at the given cutoff
    pub fn apply_lowpass(&mut self, cutoff_hz: f64) -> Result<Outcome, SessionError> {
        self.apply_filter(FilterSpec::lowpass(cutoff_hz))
    }

    /// Band-pass filter the noisy mix around the given center frequency
    pub fn apply_bandpass(&mut self, center_hz: f64) -> Result<Outcome, SessionError> {
        self.apply_filter(FilterSpec::bandpass(center_hz))
    }

    fn apply_filter(&mut self, spec: FilterSpec) -> Result<Outcome, SessionError> {
        let Some(noisy) = &self.noisy else {
            log::debug!("no noisy signal; skipping {} filter", spec.label());
            return Ok(Outcome::Skipped);
        };

        let coeffs = spec.design(noisy.sample_rate() as f64)?;
        log::info!(
            "applying {} filter, order {}",
            spec.label(),
            spec.order
        );

        let filtered = AudioBuffer::new(
            filtfilt(&coeffs.b, &coeffs.a, noisy.samples()),
            noisy.sample_rate(),
        );

        self.player.play(&filtered)?;
        self.renderer
            .render(&filter_figure(spec.label(), noisy, &filtered))?;

        self.filtered = Some(filtered);
        Ok(Outcome::Completed)
    }

    /// Render a single-signal figure; an empty signal shows nothing
    fn render_signal(&mut self, title: &str, buffer: &AudioBuffer) -> Result<(), SessionError> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.renderer.render(&signal_figure(title, buffer))?;
        Ok(())
    }
}
