//! CSV plot-data renderer
//!
//! Headless stand-in for a chart display: every panel becomes one CSV file
//! of (x, y) rows in the target directory, truncated on each render so a new
//! figure fully replaces the previous plot.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Figure, RenderError, Renderer};

/// Renderer writing one CSV file per panel
pub struct CsvRenderer {
    dir: PathBuf,
}

impl CsvRenderer {
    /// Create a renderer targeting the given directory (created on demand)
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File name for a panel: `<figure>__<panel>.csv`, slugged
    fn panel_path(&self, figure: &Figure, panel_title: &str) -> PathBuf {
        self.dir
            .join(format!("{}__{}.csv", slug(&figure.title), slug(panel_title)))
    }
}

impl Renderer for CsvRenderer {
    fn render(&mut self, figure: &Figure) -> Result<(), RenderError> {
        fs::create_dir_all(&self.dir)?;

        for panel in &figure.panels {
            let path = self.panel_path(figure, &panel.title);
            let mut writer = csv::Writer::from_path(&path)?;

            writer.write_record([panel.xlabel.as_str(), panel.ylabel.as_str()])?;
            for (x, y) in panel.x.iter().zip(panel.y.iter()) {
                writer.write_record([x.to_string(), y.to_string()])?;
            }
            writer.flush()?;
        }

        log::debug!(
            "rendered '{}' ({} panels) to {}",
            figure.title,
            figure.panels.len(),
            self.dir.display()
        );

        Ok(())
    }
}

/// Lowercase, with every non-alphanumeric run collapsed to a single dash
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut dash_pending = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if dash_pending && !out.is_empty() {
                out.push('-');
            }
            dash_pending = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash_pending = true;
        }
    }

    out
}
