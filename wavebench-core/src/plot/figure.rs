//! Plot figure data model
//!
//! A figure is what the visualizer hands to a renderer: a titled set of
//! (x, y) panels. Signal figures carry waveform + spectrum; filter figures
//! carry the before/after 2x2 grid of the original display.

use crate::buffer::AudioBuffer;
use crate::spectrum;

/// One plot panel: a titled (x, y) series with axis labels
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A complete figure; each render fully replaces the previous one
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
}

/// Time-domain panel with the time axis at 1/R spacing
fn waveform_panel(title: &str, buffer: &AudioBuffer) -> Panel {
    let rate = buffer.sample_rate() as f64;

    Panel {
        title: title.to_string(),
        xlabel: "Time [s]".to_string(),
        ylabel: "Amplitude".to_string(),
        x: (0..buffer.len()).map(|i| i as f64 / rate).collect(),
        y: buffer.samples().to_vec(),
    }
}

/// Frequency-domain panel: FFT magnitude over 0..Nyquist
fn spectrum_panel(title: &str, buffer: &AudioBuffer) -> Panel {
    let (freqs, mags) = spectrum::magnitude_spectrum(buffer);

    Panel {
        title: title.to_string(),
        xlabel: "Frequency [Hz]".to_string(),
        ylabel: "Magnitude".to_string(),
        x: freqs,
        y: mags,
    }
}

/// Waveform + spectrum figure for a single signal
pub fn signal_figure(title: &str, buffer: &AudioBuffer) -> Figure {
    Figure {
        title: title.to_string(),
        panels: vec![
            waveform_panel("Waveform", buffer),
            spectrum_panel("Spectrum", buffer),
        ],
    }
}

/// Before/after figure for a filter application
pub fn filter_figure(filter_label: &str, before: &AudioBuffer, after: &AudioBuffer) -> Figure {
    Figure {
        title: format!("{} filter", filter_label),
        panels: vec![
            waveform_panel("Waveform before filter", before),
            spectrum_panel("Spectrum before filter", before),
            waveform_panel(&format!("Waveform after {}", filter_label), after),
            spectrum_panel(&format!("Spectrum after {}", filter_label), after),
        ],
    }
}
