//! Report exporters: paginated PDF, DOCX, printable HTML snapshot and plain text.
//!
//! The PDF and DOCX exporters read the same [`DocumentModel`] and never mutate
//! it. Timestamps come from an injected [`Clock`] so output is reproducible.

pub mod pdf;
pub mod docx;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::report::{sanitize_file_name, DocumentModel, RawReport};

pub use docx::render_docx;
pub use pdf::{render_pdf, PageGeometry};
pub use snapshot::{
    render_printable, DirectorySurface, MarkupRegistry, PrintSurface, ProvidesRenderableMarkup,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Render target not found: {0}")]
    RenderTargetMissing(String),

    #[error("Print surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Encoding failed: {0}")]
    EncodingFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a [`RenderedArtifact`] contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    RasterDocument,
    StructuredDocument,
    HtmlSnapshot,
    PlainText,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::RasterDocument => "pdf",
            ArtifactKind::StructuredDocument => "docx",
            ArtifactKind::HtmlSnapshot => "html",
            ArtifactKind::PlainText => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ArtifactKind::RasterDocument => "application/pdf",
            ArtifactKind::StructuredDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ArtifactKind::HtmlSnapshot => "text/html",
            ArtifactKind::PlainText => "text/plain",
        }
    }
}

/// Output of one exporter call. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Source of wall-clock time for filenames and date labels.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock fixed at `millis` since the Unix epoch (clamped to the epoch if out of range).
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Human date label used in document headers, e.g. "January 15, 2025".
pub fn date_label(clock: &dyn Clock) -> String {
    clock.now().format("%B %-d, %Y").to_string()
}

/// `<sanitized-patient-name>_report_<millis>.<ext>`.
///
/// Falls back to `unknown_patient` when the name sanitizes to nothing.
pub fn report_file_name(patient_name: &str, kind: ArtifactKind, clock: &dyn Clock) -> String {
    let mut name = sanitize_file_name(patient_name);
    if name.is_empty() {
        name = sanitize_file_name(crate::report::UNKNOWN_PATIENT);
    }
    format!(
        "{name}_report_{}.{}",
        clock.now().timestamp_millis(),
        kind.extension()
    )
}

/// Verbatim text download: `medical-report-<millis>.txt`.
pub fn export_text(report: &RawReport, clock: &dyn Clock) -> RenderedArtifact {
    RenderedArtifact {
        kind: ArtifactKind::PlainText,
        file_name: format!("medical-report-{}.txt", clock.now().timestamp_millis()),
        bytes: report.text.as_bytes().to_vec(),
    }
}

/// PDF and DOCX rendered from one model.
#[derive(Debug)]
pub struct ExportBundle {
    pub pdf: RenderedArtifact,
    pub docx: RenderedArtifact,
}

/// Render the PDF and DOCX exports in parallel against a shared model.
pub fn export_documents(
    model: &DocumentModel,
    geometry: &PageGeometry,
    clock: &dyn Clock,
) -> Result<ExportBundle, ExportError> {
    let (pdf, docx) = rayon::join(
        || render_pdf(model, geometry, clock),
        || render_docx(model, clock),
    );
    Ok(ExportBundle {
        pdf: pdf?,
        docx: docx?,
    })
}
