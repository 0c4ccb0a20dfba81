//! Pattern-based extraction of clinical fields from generated report text.
//!
//! Each field is a first-match-wins, case-insensitive pattern over the whole
//! text. A field that does not match is absent, never an error.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{ExtractedFields, RawReport, DEFAULT_SPECIALTY, UNKNOWN_PATIENT};

static PATIENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Patient Name|Full Patient Name|Full Name):[ \t]*([^\r\n]+)")
        .expect("Invalid patient name pattern")
});

static SPECIALTY_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(.*?)\s+Report\]").expect("Invalid specialty bracket pattern")
});

static SPECIALTY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Specialty:[ \t]*([^\r\n]+)").expect("Invalid specialty label pattern")
});

static MRN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bMRN[:\s]+([A-Z0-9]+)").expect("Invalid MRN pattern"));

static AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAge:\s*(\d+)").expect("Invalid age pattern"));

static GENDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bGender:\s*(\w+)").expect("Invalid gender pattern"));

static DIAGNOSIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Primary Diagnosis:[ \t]*([^\r\n]+)").expect("Invalid diagnosis pattern")
});

static EXAM_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Date of Examination:[ \t]*([^\r\n]+)").expect("Invalid exam date pattern")
});

static ICD10: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ICD-10:\s*([A-Z0-9.]+)").expect("Invalid ICD-10 pattern"));

/// Extract fields from report text with no caller-supplied specialty.
pub fn extract_fields(text: &str) -> ExtractedFields {
    extract_with_specialty(text, None)
}

/// Extract fields from a [`RawReport`], honoring its specialty override.
pub fn extract_report(report: &RawReport) -> ExtractedFields {
    extract_with_specialty(&report.text, report.specialty.as_deref())
}

/// Extract every field. Total: absent matches yield `None` or an empty list.
pub fn extract_with_specialty(text: &str, specialty_override: Option<&str>) -> ExtractedFields {
    ExtractedFields {
        patient_name: first_capture(&PATIENT_NAME, text)
            .unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
        patient_mrn: first_capture(&MRN, text),
        patient_age: first_capture(&AGE, text).and_then(|age| age.parse::<u32>().ok()),
        patient_gender: first_capture(&GENDER, text),
        diagnosis: first_capture(&DIAGNOSIS, text),
        exam_date: first_capture(&EXAM_DATE, text),
        icd10_codes: all_captures(&ICD10, text),
        specialty: resolve_specialty(text, specialty_override),
    }
}

/// Resolve the report specialty.
///
/// Precedence: caller override, then a `[<Specialty> Report]` tag, then a
/// `Specialty:` label, then [`DEFAULT_SPECIALTY`]. A blank override counts as
/// no override.
pub fn resolve_specialty(text: &str, specialty_override: Option<&str>) -> String {
    if let Some(specialty) = specialty_override.map(str::trim).filter(|s| !s.is_empty()) {
        return specialty.to_string();
    }
    first_capture(&SPECIALTY_BRACKET, text)
        .or_else(|| first_capture(&SPECIALTY_LABEL, text))
        .unwrap_or_else(|| DEFAULT_SPECIALTY.to_string())
}

/// First non-empty trimmed capture group 1.
fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Every capture group 1, in order of appearance, duplicates kept.
fn all_captures(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
