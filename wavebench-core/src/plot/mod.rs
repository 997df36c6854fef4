//! Plot figures and renderer capability

pub mod csv;
pub mod figure;

use thiserror::Error;

pub use csv::CsvRenderer;
pub use figure::{filter_figure, signal_figure, Figure, Panel};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write plot data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode plot data: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Display capability: consumes a figure and replaces whatever was shown
/// before it
///
/// Injected into the session so the pipeline can run and be tested without
/// a display surface.
pub trait Renderer {
    fn render(&mut self, figure: &Figure) -> Result<(), RenderError>;
}
