use serde::{Deserialize, Serialize};

/// Sentinel patient name used when no name label is present.
pub const UNKNOWN_PATIENT: &str = "Unknown Patient";

/// Specialty used when neither the caller nor the text names one.
pub const DEFAULT_SPECIALTY: &str = "General";

/// A generated report as received from the upstream generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReport {
    pub text: String,
    /// Specialty selected by the caller. Takes precedence over anything in the text.
    pub specialty: Option<String>,
}

impl RawReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            specialty: None,
        }
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }
}

/// Structured clinical metadata pulled out of report text.
///
/// Serialized field names are the ones the storage collaborator expects;
/// absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub patient_name: String,
    #[serde(rename = "patientMRN")]
    pub patient_mrn: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_gender: Option<String>,
    pub diagnosis: Option<String>,
    pub exam_date: Option<String>,
    pub icd10_codes: Vec<String>,
    pub specialty: String,
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self {
            patient_name: UNKNOWN_PATIENT.to_string(),
            patient_mrn: None,
            patient_age: None,
            patient_gender: None,
            diagnosis: None,
            exam_date: None,
            icd10_codes: Vec::new(),
            specialty: DEFAULT_SPECIALTY.to_string(),
        }
    }
}

impl ExtractedFields {
    /// True when the name came from the text rather than the sentinel.
    pub fn has_patient_name(&self) -> bool {
        self.patient_name != UNKNOWN_PATIENT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
}

/// One classified line of report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { level: HeadingLevel, text: String },
    BoldParagraph { text: String },
    BulletItem { text: String },
    Paragraph { text: String },
    Blank,
}

impl ContentBlock {
    /// Text carried by the block, without markup. `None` for `Blank`.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentBlock::Heading { text, .. }
            | ContentBlock::BoldParagraph { text }
            | ContentBlock::BulletItem { text }
            | ContentBlock::Paragraph { text } => Some(text),
            ContentBlock::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ContentBlock::Blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fields_use_sentinels() {
        let fields = ExtractedFields::default();
        assert_eq!(fields.patient_name, "Unknown Patient");
        assert_eq!(fields.specialty, "General");
        assert!(!fields.has_patient_name());
        assert!(fields.icd10_codes.is_empty());
    }

    #[test]
    fn fields_serialize_with_storage_names() {
        let fields = ExtractedFields {
            patient_name: "Jane Doe".into(),
            patient_mrn: Some("AB123".into()),
            patient_age: Some(45),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["patientName"], "Jane Doe");
        assert_eq!(json["patientMRN"], "AB123");
        assert_eq!(json["patientAge"], 45);
        assert!(json["patientGender"].is_null());
        assert!(json["examDate"].is_null());
        assert_eq!(json["icd10Codes"], serde_json::json!([]));
        assert_eq!(json["specialty"], "General");
    }

    #[test]
    fn fields_roundtrip_through_json() {
        let fields = ExtractedFields {
            patient_name: "A".into(),
            icd10_codes: vec!["H35.31".into()],
            ..Default::default()
        };
        let json = serde_json::to_string(&fields).unwrap();
        let back: ExtractedFields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn blank_block_has_no_text() {
        assert_eq!(ContentBlock::Blank.text(), None);
        assert!(ContentBlock::Blank.is_blank());
        let p = ContentBlock::Paragraph { text: "x".into() };
        assert_eq!(p.text(), Some("x"));
        assert!(!p.is_blank());
    }

    #[test]
    fn raw_report_builder_sets_specialty() {
        let raw = RawReport::new("text").with_specialty("Cardiology");
        assert_eq!(raw.specialty.as_deref(), Some("Cardiology"));
        assert_eq!(raw.text, "text");
    }
}
