//! Paginated PDF export via `printpdf`.
//!
//! Layout is a pure pass ([`layout_pages`]) over the document sections that
//! tracks a vertical cursor measured from the top edge. A line is placed only
//! after checking that advancing the cursor keeps it inside the usable extent;
//! otherwise a new page is started. The placed lines are then written to PDF.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{date_label, report_file_name, ArtifactKind, Clock, ExportError, RenderedArtifact};
use crate::report::{DocumentModel, Section, SectionStyle};

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352_8;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.5;

const TITLE: &str = "Medical Report";
const TITLE_SIZE: f32 = 18.0;
const TITLE_ADVANCE: f32 = 10.0;
const GENERATED_SIZE: f32 = 10.0;
const GENERATED_ADVANCE: f32 = 15.0;
const HEADING1_SIZE: f32 = 16.0;
const HEADING2_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const BULLET_INDENT: f32 = 4.0;
const BULLET_MARKER: &str = "\u{b7} ";

/// Length of each string in the trailer `/ID` pair written by printpdf.
const TRAILER_ID_LEN: usize = 32;

/// Characters outside Latin-1 that WinAnsi still carries.
const WIN_ANSI_EXTRAS: &str = concat!(
    "\u{20ac}\u{201a}\u{192}\u{201e}\u{2026}\u{2020}\u{2021}",
    "\u{2c6}\u{2030}\u{160}\u{2039}\u{152}\u{17d}\u{2018}",
    "\u{2019}\u{201c}\u{201d}\u{2022}\u{2013}\u{2014}\u{2dc}",
    "\u{2122}\u{161}\u{203a}\u{153}\u{17e}\u{178}",
);

/// Page size, margin and line heights, all in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub heading1_height: f32,
    pub heading2_height: f32,
    pub line_height: f32,
    pub blank_gap: f32,
}

impl Default for PageGeometry {
    /// A4 portrait, 20 mm margins.
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            heading1_height: 10.0,
            heading2_height: 8.0,
            line_height: 6.0,
            blank_gap: 4.0,
        }
    }
}

impl PageGeometry {
    /// Lowest cursor position (from the top edge) a line may be placed at.
    pub fn usable_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Reject geometries that cannot hold the header plus one line of content.
    pub fn validate(&self) -> Result<(), ExportError> {
        let tallest = self
            .heading1_height
            .max(self.heading2_height)
            .max(self.line_height)
            .max(self.blank_gap);
        let values = [
            self.width,
            self.height,
            self.heading1_height,
            self.heading2_height,
            self.line_height,
            self.blank_gap,
        ];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) || self.margin < 0.0 {
            return Err(ExportError::EncodingFailure(format!(
                "invalid page geometry: {self:?}"
            )));
        }
        if self.usable_width() <= 2.0 * BULLET_INDENT {
            return Err(ExportError::EncodingFailure(
                "page too narrow for its margins".into(),
            ));
        }
        if self.usable_bottom() - self.margin < TITLE_ADVANCE + GENERATED_ADVANCE + tallest {
            return Err(ExportError::EncodingFailure(
                "page too short for header and one line".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// A single line of text fixed on a page. `y` is the baseline, measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: Weight,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

struct Layouter<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<PageLayout>,
    cursor: f32,
    substituted: usize,
    unrepresentable: usize,
}

impl<'a> Layouter<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![PageLayout::default()],
            cursor: geometry.margin,
            substituted: 0,
            unrepresentable: 0,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.geometry.margin;
    }

    /// Break the page if advancing by `advance` would pass the usable extent.
    fn ensure_room(&mut self, advance: f32) {
        let past_bottom = self.cursor + advance > self.geometry.usable_bottom();
        if past_bottom && self.cursor > self.geometry.margin {
            self.new_page();
        }
    }

    fn place(&mut self, text: String, x: f32, size: f32, weight: Weight) {
        let y = self.cursor;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text,
                x,
                y,
                size,
                weight,
            });
        }
    }

    /// Advance then place one line.
    fn line(&mut self, text: String, x: f32, advance: f32, size: f32, weight: Weight) {
        self.ensure_room(advance);
        self.cursor += advance;
        self.place(text, x, size, weight);
    }

    fn header(&mut self, generated: &str) {
        let width = self.geometry.width;
        let x = centered_x(TITLE, TITLE_SIZE, width);
        self.place(TITLE.to_string(), x, TITLE_SIZE, Weight::Bold);
        self.cursor += TITLE_ADVANCE;
        let label = format!("Generated: {generated}");
        let x = centered_x(&label, GENERATED_SIZE, width);
        self.place(label, x, GENERATED_SIZE, Weight::Regular);
        self.cursor += GENERATED_ADVANCE;
    }

    /// Section text reduced to what the builtin fonts can encode.
    fn printable_text(&mut self, section: &Section) -> String {
        let normalized = to_win_ansi(&section.plain_text());
        self.substituted += normalized.substituted;
        self.unrepresentable += normalized.unrepresentable;
        normalized.text
    }

    fn section(&mut self, section: &Section) {
        let g = self.geometry;
        match section.style {
            SectionStyle::Heading1 => {
                let text = self.printable_text(section);
                self.line(text, g.margin, g.heading1_height, HEADING1_SIZE, Weight::Bold)
            }
            SectionStyle::Heading2 => {
                let text = self.printable_text(section);
                self.line(text, g.margin, g.heading2_height, HEADING2_SIZE, Weight::Bold)
            }
            SectionStyle::Bold | SectionStyle::Body => {
                let weight = if section.runs.iter().any(|r| r.bold) {
                    Weight::Bold
                } else {
                    Weight::Regular
                };
                let max_chars = chars_per_line(g.usable_width(), BODY_SIZE);
                let text = self.printable_text(section);
                for text in wrap_text(&text, max_chars) {
                    self.line(text, g.margin, g.line_height, BODY_SIZE, weight);
                }
            }
            SectionStyle::Bullet => {
                let max_chars = chars_per_line(g.usable_width() - 2.0 * BULLET_INDENT, BODY_SIZE);
                let text = format!("{BULLET_MARKER}{}", self.printable_text(section));
                for (i, text) in wrap_text(&text, max_chars).into_iter().enumerate() {
                    // continuation lines hang under the item text
                    let indent = if i == 0 { BULLET_INDENT } else { 2.0 * BULLET_INDENT };
                    self.line(text, g.margin + indent, g.line_height, BODY_SIZE, Weight::Regular);
                }
            }
            SectionStyle::Spacer => {
                if self.cursor + g.blank_gap > g.usable_bottom() {
                    self.new_page();
                } else {
                    self.cursor += g.blank_gap;
                }
            }
        }
    }
}

/// Lay the model out onto pages. Always yields at least one page (the header).
pub fn layout_pages(
    model: &DocumentModel,
    geometry: &PageGeometry,
    generated: &str,
) -> Vec<PageLayout> {
    let mut layouter = Layouter::new(geometry);
    layouter.header(generated);
    for section in &model.sections {
        layouter.section(section);
    }

    if layouter.substituted + layouter.unrepresentable > 0 {
        tracing::warn!(
            substituted = layouter.substituted,
            unrepresentable = layouter.unrepresentable,
            "Characters outside the PDF font encoding were replaced"
        );
    }
    tracing::debug!(
        pages = layouter.pages.len(),
        lines = layouter.pages.iter().map(|p| p.lines.len()).sum::<usize>(),
        sections = model.sections.len(),
        "Layout complete"
    );
    layouter.pages
}

/// Render the model as a paginated PDF.
pub fn render_pdf(
    model: &DocumentModel,
    geometry: &PageGeometry,
    clock: &dyn Clock,
) -> Result<RenderedArtifact, ExportError> {
    geometry.validate()?;
    let pages = layout_pages(model, geometry, &date_label(clock));
    let bytes = write_pdf(&pages, geometry, &model.fields.patient_name, clock)?;

    let artifact = RenderedArtifact {
        kind: ArtifactKind::RasterDocument,
        file_name: report_file_name(
            &model.fields.patient_name,
            ArtifactKind::RasterDocument,
            clock,
        ),
        bytes,
    };
    tracing::info!(
        pages = pages.len(),
        bytes = artifact.bytes.len(),
        file = %artifact.file_name,
        "PDF report rendered"
    );
    Ok(artifact)
}

fn write_pdf(
    pages: &[PageLayout],
    geometry: &PageGeometry,
    patient_name: &str,
    clock: &dyn Clock,
) -> Result<Vec<u8>, ExportError> {
    let now = clock.now();
    let stamp = OffsetDateTime::from_unix_timestamp(now.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let title = format!("{TITLE} - {patient_name}");

    let (doc, first_page, first_layer) =
        PdfDocument::new(&title, Mm(geometry.width), Mm(geometry.height), "Layer 1");
    let doc = doc
        .with_document_id(format!("medical-report-{}", now.timestamp_millis()))
        .with_creation_date(stamp)
        .with_mod_date(stamp)
        .with_metadata_date(stamp);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::EncodingFailure(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::EncodingFailure(format!("PDF font error: {e}")))?;

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(geometry.width), Mm(geometry.height), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for line in &page.lines {
            let face: &IndirectFontRef = match line.weight {
                Weight::Regular => &font,
                Weight::Bold => &bold,
            };
            layer.use_text(
                line.text.as_str(),
                line.size,
                Mm(line.x),
                Mm(geometry.height - line.y),
                face,
            );
        }
    }

    let mut bytes = doc
        .save_to_bytes()
        .map_err(|e| ExportError::EncodingFailure(format!("PDF save error: {e}")))?;
    let token = format!("{:0>width$}", now.timestamp_millis(), width = TRAILER_ID_LEN);
    pin_trailer_id(&mut bytes, token.as_bytes())?;
    Ok(bytes)
}

/// Overwrite both strings of the trailer `/ID` pair with `token`.
///
/// printpdf fills the pair with random characters on every save. The
/// replacement has the same length, so no offset in the file moves.
fn pin_trailer_id(bytes: &mut [u8], token: &[u8]) -> Result<(), ExportError> {
    let missing = || ExportError::EncodingFailure("PDF trailer has no /ID pair".into());
    if token.len() != TRAILER_ID_LEN {
        return Err(ExportError::EncodingFailure(format!(
            "PDF trailer id must be {TRAILER_ID_LEN} bytes, got {}",
            token.len()
        )));
    }
    let start = bytes
        .windows(3)
        .rposition(|w| w == b"/ID")
        .ok_or_else(missing)?;

    let mut pos = start + 3;
    let skip_space = |pos: &mut usize| {
        while bytes.get(*pos).is_some_and(|b| b.is_ascii_whitespace()) {
            *pos += 1;
        }
    };
    skip_space(&mut pos);
    if bytes.get(pos) != Some(&b'[') {
        return Err(missing());
    }
    pos += 1;

    let mut spans = Vec::with_capacity(2);
    for _ in 0..2 {
        skip_space(&mut pos);
        let open = pos;
        let close = open + TRAILER_ID_LEN + 1;
        if bytes.get(open) != Some(&b'(') || bytes.get(close) != Some(&b')') {
            return Err(missing());
        }
        spans.push(open + 1..close);
        pos = close + 1;
    }
    for span in spans {
        bytes[span].copy_from_slice(token);
    }
    Ok(())
}

/// Text reduced to the WinAnsi repertoire of the builtin fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WinAnsiText {
    text: String,
    /// Characters swapped for an ASCII spelling with the same meaning.
    substituted: usize,
    /// Characters with no spelling, replaced by `?`.
    unrepresentable: usize,
}

fn is_win_ansi(c: char) -> bool {
    // U+00A0 and U+00AD sit in the table as plain space and hyphen
    matches!(c, ' '..='~' | '\u{a1}'..='\u{ac}' | '\u{ae}'..='\u{ff}')
        || WIN_ANSI_EXTRAS.contains(c)
}

fn ascii_spelling(c: char) -> Option<&'static str> {
    let spelling = match c {
        '\u{2265}' => ">=",
        '\u{2264}' => "<=",
        '\u{2260}' => "!=",
        '\u{2248}' => "~",
        '\u{2192}' => "->",
        '\u{2190}' => "<-",
        '\u{2212}' => "-",
        '\t' | '\u{a0}' => " ",
        '\u{ad}' => "",
        _ => return None,
    };
    Some(spelling)
}

fn to_win_ansi(text: &str) -> WinAnsiText {
    let mut out = WinAnsiText {
        text: String::with_capacity(text.len()),
        substituted: 0,
        unrepresentable: 0,
    };
    for c in text.chars() {
        if is_win_ansi(c) {
            out.text.push(c);
        } else if let Some(spelling) = ascii_spelling(c) {
            out.text.push_str(spelling);
            out.substituted += 1;
        } else {
            out.text.push('?');
            out.unrepresentable += 1;
        }
    }
    out
}

/// How many average glyphs of `size` pt fit in `width` mm.
fn chars_per_line(width: f32, size: f32) -> usize {
    let glyph = size * PT_TO_MM * AVG_CHAR_EM;
    ((width / glyph).floor() as usize).max(1)
}

fn centered_x(text: &str, size: f32, page_width: f32) -> f32 {
    let text_width = text.chars().count() as f32 * size * PT_TO_MM * AVG_CHAR_EM;
    ((page_width - text_width) / 2.0).max(0.0)
}

/// Greedy word wrap to `max_chars`. Words longer than a line are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            let piece_len = piece.len();
            if current_len > 0 && current_len + 1 + piece_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::FixedClock;
    use crate::report::{model_from_report, RawReport};
    use proptest::prelude::*;

    fn clock() -> FixedClock {
        FixedClock::from_millis(1_736_899_200_123)
    }

    fn model(text: &str) -> DocumentModel {
        model_from_report(&RawReport::new(text))
    }

    fn all_lines(pages: &[PageLayout]) -> Vec<&PlacedLine> {
        pages.iter().flat_map(|p| p.lines.iter()).collect()
    }

    #[test]
    fn empty_model_is_header_only() {
        let pages = layout_pages(&model(""), &PageGeometry::default(), "January 15, 2025");
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Medical Report", "Generated: January 15, 2025"]);
    }

    #[test]
    fn empty_model_renders_pdf() {
        let artifact = render_pdf(&model(""), &PageGeometry::default(), &clock()).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::RasterDocument);
        assert!(artifact.bytes.starts_with(b"%PDF"));
        assert_eq!(artifact.file_name, "unknown_patient_report_1736899200123.pdf");
    }

    #[test]
    fn headings_advance_before_placing() {
        let g = PageGeometry::default();
        let pages = layout_pages(&model("# Title\n## Sub"), &g, "d");
        let lines = &pages[0].lines;
        let header_end = g.margin + TITLE_ADVANCE + GENERATED_ADVANCE;
        assert_eq!(lines[2].y, header_end + g.heading1_height);
        assert_eq!(lines[2].weight, Weight::Bold);
        assert_eq!(lines[2].size, HEADING1_SIZE);
        assert_eq!(lines[3].y, header_end + g.heading1_height + g.heading2_height);
        assert_eq!(lines[3].size, HEADING2_SIZE);
    }

    #[test]
    fn blank_lines_add_gap_without_glyphs() {
        let g = PageGeometry::default();
        let pages = layout_pages(&model("a\n\nb"), &g, "d");
        let lines = &pages[0].lines;
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].y - lines[2].y, g.line_height + g.blank_gap);
    }

    #[test]
    fn bold_paragraph_is_bold() {
        let pages = layout_pages(&model("**Impression**\nplain"), &PageGeometry::default(), "d");
        assert_eq!(pages[0].lines[2].text, "Impression");
        assert_eq!(pages[0].lines[2].weight, Weight::Bold);
        assert_eq!(pages[0].lines[3].weight, Weight::Regular);
    }

    #[test]
    fn long_paragraph_wraps_within_width() {
        let g = PageGeometry::default();
        let text = "word ".repeat(200);
        let pages = layout_pages(&model(&text), &g, "d");
        let max = chars_per_line(g.usable_width(), BODY_SIZE);
        let body: Vec<&PlacedLine> = all_lines(&pages).into_iter().skip(2).collect();
        assert!(body.len() > 1);
        assert!(body.iter().all(|l| l.text.chars().count() <= max));
    }

    #[test]
    fn bullets_are_marked_indented_and_hang() {
        let g = PageGeometry::default();
        let text = format!("- {}", "finding ".repeat(40));
        let pages = layout_pages(&model(&text), &g, "d");
        let body: Vec<&PlacedLine> = all_lines(&pages).into_iter().skip(2).collect();
        assert!(body[0].text.starts_with("\u{b7} finding"));
        assert_eq!(body[0].x, g.margin + BULLET_INDENT);
        assert_eq!(body[1].x, g.margin + 2.0 * BULLET_INDENT);
        let max = chars_per_line(g.usable_width() - 2.0 * BULLET_INDENT, BODY_SIZE);
        assert!(body.iter().all(|l| l.text.chars().count() <= max));
    }

    #[test]
    fn clinical_symbols_keep_their_meaning() {
        let pages = layout_pages(
            &model("Dose 5 \u{b5}g, temp 38\u{b0}C, HbA1c \u{2265} 7% \u{2192} retest"),
            &PageGeometry::default(),
            "d",
        );
        assert_eq!(
            pages[0].lines[2].text,
            "Dose 5 \u{b5}g, temp 38\u{b0}C, HbA1c >= 7% -> retest"
        );
    }

    #[test]
    fn win_ansi_normalization_counts_replacements() {
        let out = to_win_ansi("\u{2264}5 \u{b1}2 \u{d7}3 \u{2022} \u{4e2d}\u{1f600}\tx");
        assert_eq!(out.text, "<=5 \u{b1}2 \u{d7}3 \u{2022} ?? x");
        assert_eq!(out.substituted, 2);
        assert_eq!(out.unrepresentable, 2);

        let plain = to_win_ansi("Caf\u{e9} \u{2013} na\u{ef}ve");
        assert_eq!(plain.text, "Caf\u{e9} \u{2013} na\u{ef}ve");
        assert_eq!(plain.substituted + plain.unrepresentable, 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn layout_log(text: &str) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            layout_pages(&model(text), &PageGeometry::default(), "d");
        });
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn layout_logs_stats_and_replacements() {
        let log = layout_log("HbA1c \u{2265} 7%\n\u{4e2d}");
        assert!(log.contains("Layout complete"));
        assert!(log.contains("pages=1"));
        assert!(log.contains("lines=4"));
        assert!(log.contains("substituted=1"));
        assert!(log.contains("unrepresentable=1"));

        let clean = layout_log("plain text");
        assert!(clean.contains("Layout complete"));
        assert!(!clean.contains("were replaced"));
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let m = model("Patient Name: Jane\n## A\n- b");
        let g = PageGeometry::default();
        let a = render_pdf(&m, &g, &clock()).unwrap();
        let b = render_pdf(&m, &g, &clock()).unwrap();
        assert_eq!(a.bytes, b.bytes);

        let later = render_pdf(&m, &g, &FixedClock::from_millis(1_736_899_260_000)).unwrap();
        assert_ne!(a.bytes, later.bytes);
    }

    #[test]
    fn trailer_id_is_pinned_to_token() {
        let random = "A".repeat(TRAILER_ID_LEN);
        let other = "B".repeat(TRAILER_ID_LEN);
        let token = "0".repeat(TRAILER_ID_LEN);
        let mut bytes = format!("xref\ntrailer\n<</ID [({random}) ({other})]/Root 1 0 R>>")
            .into_bytes();
        pin_trailer_id(&mut bytes, token.as_bytes()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(&format!("/ID [({token}) ({token})]")));

        let mut no_id = b"trailer<</Root 1 0 R>>".to_vec();
        assert!(matches!(
            pin_trailer_id(&mut no_id, token.as_bytes()),
            Err(ExportError::EncodingFailure(_))
        ));
    }

    #[test]
    fn long_report_spans_pages_within_extent() {
        let g = PageGeometry::default();
        let text = (0..200)
            .map(|i| format!("Line {i} of the clinical narrative"))
            .collect::<Vec<_>>()
            .join("\n");
        let pages = layout_pages(&model(&text), &g, "d");
        assert!(pages.len() > 1);
        for page in &pages {
            for line in &page.lines {
                assert!(line.y <= g.usable_bottom(), "line at {} overflows", line.y);
            }
        }
        let rendered = render_pdf(&model(&text), &g, &clock()).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn new_page_restarts_at_top_margin() {
        let g = PageGeometry::default();
        let text = vec!["x"; 100].join("\n");
        let pages = layout_pages(&model(&text), &g, "d");
        assert_eq!(pages[1].lines[0].y, g.margin + g.line_height);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("ab cd ef", 5), vec!["ab cd", "ef"]);
        assert_eq!(wrap_text("", 5), vec![""]);
    }

    #[test]
    fn geometry_validation() {
        assert!(PageGeometry::default().validate().is_ok());
        let short = PageGeometry {
            height: 60.0,
            ..Default::default()
        };
        assert!(matches!(short.validate(), Err(ExportError::EncodingFailure(_))));
        let narrow = PageGeometry {
            width: 48.0,
            ..Default::default()
        };
        assert!(narrow.validate().is_err());
        let nan = PageGeometry {
            line_height: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn invalid_geometry_fails_render() {
        let g = PageGeometry {
            height: 10.0,
            ..Default::default()
        };
        assert!(render_pdf(&model("a"), &g, &clock()).is_err());
    }

    proptest! {
        #[test]
        fn cursor_never_exceeds_usable_extent(
            lines in proptest::collection::vec("(## |# |- |\\*\\*)?[a-z ]{0,120}", 0..120),
            height in 120.0f32..400.0,
        ) {
            let g = PageGeometry { height, ..Default::default() };
            let pages = layout_pages(&model(&lines.join("\n")), &g, "d");
            for page in &pages {
                for line in &page.lines {
                    prop_assert!(line.y <= g.usable_bottom());
                }
            }
        }

        #[test]
        fn shorter_pages_never_reduce_page_count(
            lines in proptest::collection::vec("(## |# |- )?[a-z ]{0,120}", 0..120),
            tall in 150.0f32..400.0,
            shrink in 0.0f32..30.0,
        ) {
            let text = lines.join("\n");
            let m = model(&text);
            let big = PageGeometry { height: tall, ..Default::default() };
            let small = PageGeometry { height: tall - shrink, ..Default::default() };
            let big_pages = layout_pages(&m, &big, "d").len();
            let small_pages = layout_pages(&m, &small, "d").len();
            prop_assert!(small_pages >= big_pages);
        }
    }
}
