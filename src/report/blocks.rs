//! Line-oriented classification of report text into [`ContentBlock`]s.
//!
//! Each physical line maps to exactly one block. There is no lookahead, and
//! blank lines are kept because the exporters use them as spacing.

use super::types::{ContentBlock, HeadingLevel};

/// Parse report text into blocks, one per physical line.
pub fn parse_blocks(text: &str) -> Vec<ContentBlock> {
    text.lines().map(classify_line).collect()
}

/// Classify a single line. Prefix tests run against the raw line.
pub fn classify_line(line: &str) -> ContentBlock {
    if line.trim().is_empty() {
        return ContentBlock::Blank;
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return ContentBlock::Heading {
            level: HeadingLevel::H2,
            text: rest.to_string(),
        };
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return ContentBlock::Heading {
            level: HeadingLevel::H1,
            text: rest.to_string(),
        };
    }
    // "**" alone or "***" would otherwise classify with an empty body
    if line.len() >= 4 && line.starts_with("**") && line.ends_with("**") {
        return ContentBlock::BoldParagraph {
            text: line.replace("**", ""),
        };
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return ContentBlock::BulletItem {
            text: rest.to_string(),
        };
    }
    ContentBlock::Paragraph {
        text: line.to_string(),
    }
}
