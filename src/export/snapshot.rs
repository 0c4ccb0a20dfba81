//! Printable HTML snapshot of markup already rendered by a display surface.
//!
//! The markup is taken verbatim from a [`ProvidesRenderableMarkup`] provider,
//! wrapped in a standalone page with a print stylesheet, and handed to a
//! [`PrintSurface`]. The hand-off is fire-and-forget: no retry, no waiting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{ArtifactKind, Clock, ExportError, RenderedArtifact};

/// Anything that can supply rendered markup for a target id.
pub trait ProvidesRenderableMarkup {
    /// Markup for `target`, or `None` if the target does not exist.
    fn markup(&self, target: &str) -> Option<String>;
}

/// Where a snapshot is sent for the user to print.
pub trait PrintSurface {
    fn open(&self, snapshot: &RenderedArtifact) -> Result<(), ExportError>;
}

/// In-memory markup keyed by target id.
#[derive(Debug, Clone, Default)]
pub struct MarkupRegistry {
    entries: HashMap<String, String>,
}

impl MarkupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: impl Into<String>, markup: impl Into<String>) {
        self.entries.insert(target.into(), markup.into());
    }

    pub fn remove(&mut self, target: &str) -> Option<String> {
        self.entries.remove(target)
    }
}

impl ProvidesRenderableMarkup for MarkupRegistry {
    fn markup(&self, target: &str) -> Option<String> {
        self.entries.get(target).cloned()
    }
}

/// Writes snapshots into a directory for an external viewer to pick up.
#[derive(Debug, Clone)]
pub struct DirectorySurface {
    dir: PathBuf,
}

impl DirectorySurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PrintSurface for DirectorySurface {
    fn open(&self, snapshot: &RenderedArtifact) -> Result<(), ExportError> {
        let unavailable = |e: std::io::Error| {
            ExportError::SurfaceUnavailable(format!("{}: {e}", self.dir.display()))
        };
        std::fs::create_dir_all(&self.dir).map_err(unavailable)?;
        let path = self.dir.join(&snapshot.file_name);
        std::fs::write(&path, &snapshot.bytes).map_err(unavailable)?;
        tracing::info!(path = %path.display(), "Print snapshot written");
        Ok(())
    }
}

const PRINT_STYLES: &str = r#"<style>
      @media print {
        body {
          font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
          line-height: 1.6;
          color: #000;
          max-width: 210mm;
          margin: 0 auto;
          padding: 20mm;
        }
        h1 { font-size: 24px; margin-bottom: 10px; }
        h2 { font-size: 20px; margin-top: 20px; margin-bottom: 10px; }
        h3 { font-size: 16px; margin-top: 15px; margin-bottom: 8px; }
        p { margin-bottom: 10px; }
        .no-print { display: none; }
        @page { size: A4; margin: 20mm; }
      }
      body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
        line-height: 1.6;
        color: #000;
        padding: 20px;
      }
      h1 { font-size: 24px; margin-bottom: 10px; }
      h2 { font-size: 20px; margin-top: 20px; margin-bottom: 10px; }
      h3 { font-size: 16px; margin-top: 15px; margin-bottom: 8px; }
    </style>"#;

/// Wrap rendered markup in a standalone printable page.
pub fn snapshot_html(markup: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>Medical Report - Print</title>\n    {PRINT_STYLES}\n  </head>\n  <body>\n{markup}\n  </body>\n</html>\n"
    )
}

/// Snapshot the markup for `target` and hand it to `surface`.
///
/// Fails with `RenderTargetMissing` if the provider has no such target and
/// with `SurfaceUnavailable` if the surface cannot be opened.
pub fn render_printable(
    provider: &dyn ProvidesRenderableMarkup,
    target: &str,
    surface: &dyn PrintSurface,
    clock: &dyn Clock,
) -> Result<RenderedArtifact, ExportError> {
    let markup = provider
        .markup(target)
        .ok_or_else(|| ExportError::RenderTargetMissing(target.to_string()))?;

    let artifact = RenderedArtifact {
        kind: ArtifactKind::HtmlSnapshot,
        file_name: format!("medical-report-print-{}.html", clock.now().timestamp_millis()),
        bytes: snapshot_html(&markup).into_bytes(),
    };

    if let Err(e) = surface.open(&artifact) {
        tracing::warn!(target_id = target, error = %e, "Print surface failed to open");
        return Err(e);
    }
    Ok(artifact)
}
