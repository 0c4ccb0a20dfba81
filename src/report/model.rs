//! Renderer-agnostic document model shared by every exporter.

use serde::{Deserialize, Serialize};

use super::blocks::parse_blocks;
use super::fields::extract_report;
use super::types::{ContentBlock, ExtractedFields, HeadingLevel, RawReport};

/// Paragraph style a section is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStyle {
    Heading1,
    Heading2,
    Bold,
    Bullet,
    Body,
    Spacer,
}

/// A span of text with uniform weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
}

impl InlineRun {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// One styled entry of the document, derived 1:1 from a [`ContentBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub style: SectionStyle,
    pub runs: Vec<InlineRun>,
}

impl Section {
    /// Concatenated run text, markup removed.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl From<&ContentBlock> for Section {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Heading { level, text } => Section {
                style: match level {
                    HeadingLevel::H1 => SectionStyle::Heading1,
                    HeadingLevel::H2 => SectionStyle::Heading2,
                },
                runs: vec![InlineRun::regular(text.clone())],
            },
            ContentBlock::BoldParagraph { text } => Section {
                style: SectionStyle::Bold,
                runs: vec![InlineRun::bold(text.clone())],
            },
            ContentBlock::BulletItem { text } => Section {
                style: SectionStyle::Bullet,
                runs: split_inline_runs(text),
            },
            ContentBlock::Paragraph { text } => Section {
                style: SectionStyle::Body,
                runs: split_inline_runs(text),
            },
            ContentBlock::Blank => Section {
                style: SectionStyle::Spacer,
                runs: Vec::new(),
            },
        }
    }
}

/// Parsed report: blocks, their styled sections, and the extracted metadata.
///
/// Built once and never mutated, so the exporters can share a reference
/// across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub fields: ExtractedFields,
    pub blocks: Vec<ContentBlock>,
    pub sections: Vec<Section>,
}

impl DocumentModel {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Attach metadata to a block list. Block content is not altered.
pub fn build_model(blocks: Vec<ContentBlock>, fields: ExtractedFields) -> DocumentModel {
    let sections = blocks.iter().map(Section::from).collect();
    DocumentModel {
        fields,
        blocks,
        sections,
    }
}

/// Extract, parse and build in one step.
pub fn model_from_report(report: &RawReport) -> DocumentModel {
    let fields = extract_report(report);
    let blocks = parse_blocks(&report.text);
    tracing::debug!(
        blocks = blocks.len(),
        specialty = %fields.specialty,
        "Built document model"
    );
    build_model(blocks, fields)
}

/// Split text on balanced `**` pairs into alternating regular/bold runs.
///
/// Text with an odd number of markers is kept verbatim as one regular run.
fn split_inline_runs(text: &str) -> Vec<InlineRun> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        return vec![InlineRun::regular(text)];
    }
    parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| InlineRun {
            text: part.to_string(),
            bold: i % 2 == 1,
        })
        .collect()
}
