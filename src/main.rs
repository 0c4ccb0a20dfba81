use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use clinireport_lib::config;
use clinireport_lib::export::{
    self, render_docx, render_pdf, render_printable, DirectorySurface, MarkupRegistry,
    PageGeometry, RenderedArtifact, SystemClock,
};
use clinireport_lib::report::{extract_report, model_from_report, RawReport};

/// Target id the print command registers the markup file under.
const PRINT_TARGET: &str = "report-content";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "CliniReport - clinical report metadata extraction and export",
    long_about = "Extracts structured clinical fields from generated report text and exports it as PDF, DOCX, plain text or a printable HTML snapshot."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the extracted fields of a report as JSON
    Extract {
        /// Path to the report text
        file: PathBuf,

        /// Specialty selected by the caller; overrides anything in the text
        #[arg(long, short('s'))]
        specialty: Option<String>,
    },
    /// Export a report to one or more document formats
    Export {
        /// Path to the report text
        file: PathBuf,

        #[arg(long, short('f'), value_enum, default_value_t = Format::All)]
        format: Format,

        #[arg(long, short('s'))]
        specialty: Option<String>,

        /// Directory to write artifacts to (defaults to the exports directory)
        #[arg(long, short('o'), env = config::EXPORTS_DIR_ENV)]
        out: Option<PathBuf>,
    },
    /// Wrap already-rendered report markup into a printable HTML snapshot
    Print {
        /// Path to an HTML fragment produced by the display surface
        markup: PathBuf,

        #[arg(long, short('o'), env = config::EXPORTS_DIR_ENV)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Docx,
    Txt,
    All,
}

fn main() -> Result<()> {
    clinireport_lib::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file, specialty } => {
            let report = read_report(&file, specialty)?;
            let fields = extract_report(&report);
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::Export {
            file,
            format,
            specialty,
            out,
        } => {
            let report = read_report(&file, specialty)?;
            let out = out.unwrap_or_else(config::exports_dir);
            let clock = SystemClock;
            let geometry = PageGeometry::default();
            let model = model_from_report(&report);

            let artifacts = match format {
                Format::Pdf => vec![render_pdf(&model, &geometry, &clock)?],
                Format::Docx => vec![render_docx(&model, &clock)?],
                Format::Txt => vec![export::export_text(&report, &clock)],
                Format::All => {
                    let bundle = export::export_documents(&model, &geometry, &clock)?;
                    vec![bundle.pdf, bundle.docx, export::export_text(&report, &clock)]
                }
            };
            for artifact in &artifacts {
                let path = write_artifact(&out, artifact)?;
                println!("{}", path.display());
            }
        }
        Command::Print { markup, out } => {
            let html = std::fs::read_to_string(&markup)
                .with_context(|| format!("read {}", markup.display()))?;
            let mut registry = MarkupRegistry::new();
            registry.insert(PRINT_TARGET, html);
            let surface = DirectorySurface::new(out.unwrap_or_else(config::exports_dir));

            let artifact = render_printable(&registry, PRINT_TARGET, &surface, &SystemClock)?;
            println!("{}", surface.dir().join(&artifact.file_name).display());
        }
    }
    Ok(())
}

fn read_report(path: &Path, specialty: Option<String>) -> Result<RawReport> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(RawReport { text, specialty })
}

fn write_artifact(dir: &Path, artifact: &RenderedArtifact) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), kind = ?artifact.kind, "Artifact saved");
    Ok(path)
}
