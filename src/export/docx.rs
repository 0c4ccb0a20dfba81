//! DOCX export: a minimal WordprocessingML package written with `zip`.
//!
//! Block styles map 1:1 onto Word paragraph styles, so Word handles reflow
//! and pagination itself.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime as ZipDateTime, ZipWriter};

use super::{date_label, report_file_name, ArtifactKind, Clock, ExportError, RenderedArtifact};
use crate::report::{DocumentModel, ExtractedFields, InlineRun, Section, SectionStyle};

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Paragraph spacing in twentieths of a point.
struct Spacing {
    before: u32,
    after: u32,
}

const fn spacing(before: u32, after: u32) -> Spacing {
    Spacing { before, after }
}

fn section_spacing(style: SectionStyle) -> Spacing {
    match style {
        SectionStyle::Heading1 => spacing(400, 200),
        SectionStyle::Heading2 => spacing(300, 200),
        SectionStyle::Bold | SectionStyle::Bullet => spacing(0, 100),
        SectionStyle::Body | SectionStyle::Spacer => spacing(0, 150),
    }
}

/// Render the model as a DOCX package.
///
/// The front matter (title, patient, specialty, date) comes from the
/// extracted fields, not from the block list.
pub fn render_docx(
    model: &DocumentModel,
    clock: &dyn Clock,
) -> Result<RenderedArtifact, ExportError> {
    let date = date_label(clock);
    let document = document_xml(model, &date);
    let core = core_xml(&model.fields, &clock.now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    let bytes = write_package(&document, &core, clock)?;

    let artifact = RenderedArtifact {
        kind: ArtifactKind::StructuredDocument,
        file_name: report_file_name(
            &model.fields.patient_name,
            ArtifactKind::StructuredDocument,
            clock,
        ),
        bytes,
    };
    tracing::info!(
        paragraphs = model.sections.len() + 4,
        bytes = artifact.bytes.len(),
        file = %artifact.file_name,
        "DOCX report rendered"
    );
    Ok(artifact)
}

fn document_xml(model: &DocumentModel, date: &str) -> String {
    let fields = &model.fields;
    let mut body = String::new();

    // Front matter
    paragraph(
        &mut body,
        Some("Title"),
        spacing(0, 400),
        false,
        &[InlineRun::regular("MEDICAL REPORT")],
    );
    labeled(&mut body, "Patient Name: ", &fields.patient_name, spacing(0, 200));
    labeled(&mut body, "Specialty: ", &fields.specialty, spacing(0, 200));
    labeled(&mut body, "Date: ", date, spacing(0, 400));

    for section in &model.sections {
        section_paragraph(&mut body, section);
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="{ns}"><w:body>{body}"#,
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/>"#,
            r#"</w:sectPr></w:body></w:document>"#
        ),
        ns = WORD_NS,
        body = body
    )
}

fn labeled(out: &mut String, label: &str, value: &str, space: Spacing) {
    paragraph(
        out,
        None,
        space,
        false,
        &[InlineRun::bold(label), InlineRun::regular(value)],
    );
}

fn section_paragraph(out: &mut String, section: &Section) {
    let space = section_spacing(section.style);
    match section.style {
        SectionStyle::Heading1 => paragraph(out, Some("Heading1"), space, false, &section.runs),
        SectionStyle::Heading2 => paragraph(out, Some("Heading2"), space, false, &section.runs),
        SectionStyle::Bold | SectionStyle::Body => {
            paragraph(out, None, space, false, &section.runs)
        }
        SectionStyle::Bullet => paragraph(out, Some("ListParagraph"), space, true, &section.runs),
        SectionStyle::Spacer => paragraph(out, None, space, false, &[]),
    }
}

fn paragraph(
    out: &mut String,
    style: Option<&str>,
    space: Spacing,
    bullet: bool,
    runs: &[InlineRun],
) {
    out.push_str("<w:p><w:pPr>");
    if let Some(style) = style {
        let _ = write!(out, r#"<w:pStyle w:val="{style}"/>"#);
    }
    if bullet {
        out.push_str(r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr>"#);
    }
    let _ = write!(
        out,
        r#"<w:spacing w:before="{}" w:after="{}"/>"#,
        space.before, space.after
    );
    out.push_str("</w:pPr>");
    for run in runs {
        out.push_str("<w:r>");
        if run.bold {
            out.push_str("<w:rPr><w:b/></w:rPr>");
        }
        let _ = write!(
            out,
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape(xml_safe(&run.text).as_str())
        );
        out.push_str("</w:r>");
    }
    out.push_str("</w:p>");
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn core_xml(fields: &ExtractedFields, created: &str) -> String {
    let title = format!("Medical Report - {}", fields.patient_name);
    let keywords = fields.icd10_codes.join(", ");
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title>",
            "<dc:subject>{subject}</dc:subject>",
            "<cp:keywords>{keywords}</cp:keywords>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        title = escape(xml_safe(&title).as_str()),
        subject = escape(xml_safe(&fields.specialty).as_str()),
        keywords = escape(xml_safe(&keywords).as_str()),
        created = created,
    )
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#
}

fn rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#
}

fn word_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#
}

fn styles_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Title">
    <w:name w:val="Title"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:jc w:val="center"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="36"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="ListParagraph">
    <w:name w:val="List Paragraph"/>
    <w:basedOn w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:ind w:left="720"/></w:pPr>
  </w:style>
</w:styles>"#
}

fn numbering_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="bullet"/>
      <w:lvlText w:val="&#8226;"/>
      <w:lvlJc w:val="left"/>
      <w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr>
    </w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#
}

fn write_package(document: &str, core: &str, clock: &dyn Clock) -> Result<Vec<u8>, ExportError> {
    let encoding = |e: zip::result::ZipError| {
        ExportError::EncodingFailure(format!("DOCX container error: {e}"))
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip_timestamp(clock));

    let parts: [(&str, &str); 7] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", rels_xml()),
        ("docProps/core.xml", core),
        ("word/document.xml", document),
        ("word/styles.xml", styles_xml()),
        ("word/numbering.xml", numbering_xml()),
        ("word/_rels/document.xml.rels", word_rels_xml()),
    ];
    for (name, content) in parts {
        zip.start_file(name, opt).map_err(encoding)?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish().map_err(encoding)?;
    Ok(cursor.into_inner())
}

/// Entry timestamp from the injected clock, so identical input gives identical bytes.
fn zip_timestamp(clock: &dyn Clock) -> ZipDateTime {
    use chrono::{Datelike, Timelike};

    let now = clock.now();
    let converted = u16::try_from(now.year()).ok().and_then(|year| {
        ZipDateTime::from_date_and_time(
            year,
            now.month() as u8,
            now.day() as u8,
            now.hour() as u8,
            now.minute() as u8,
            now.second() as u8,
        )
        .ok()
    });
    // Zip dates start in 1980
    converted.unwrap_or_default()
}
