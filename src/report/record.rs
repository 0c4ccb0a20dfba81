//! Row shape handed to the storage collaborator when a report is saved.

use serde::{Deserialize, Serialize};

use super::types::{ExtractedFields, RawReport};

/// Persisted report row. Column names match the hosted `reports` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub patient_name: String,
    pub patient_mrn: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_gender: Option<String>,
    pub specialty: String,
    pub report_type: String,
    pub report_content: String,
    pub diagnosis: Option<String>,
    /// `None` when the report cites no codes.
    pub icd10_codes: Option<Vec<String>>,
    pub exam_date: Option<String>,
}

impl ReportRecord {
    /// Build the row for a report. `patient_name` is the name confirmed by the
    /// user at save time, which may differ from the extracted one.
    pub fn new(report: &RawReport, fields: &ExtractedFields, patient_name: &str) -> Self {
        Self {
            patient_name: patient_name.trim().to_string(),
            patient_mrn: fields.patient_mrn.clone(),
            patient_age: fields.patient_age,
            patient_gender: fields.patient_gender.clone(),
            specialty: fields.specialty.clone(),
            report_type: fields.specialty.clone(),
            report_content: report.text.clone(),
            diagnosis: fields.diagnosis.clone(),
            icd10_codes: (!fields.icd10_codes.is_empty()).then(|| fields.icd10_codes.clone()),
            exam_date: fields.exam_date.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::extract_report;

    #[test]
    fn record_copies_extracted_fields() {
        let raw = RawReport::new("Patient Name: Jane Doe\nMRN: AB123\nICD-10: H35.31")
            .with_specialty("Ophthalmology");
        let fields = extract_report(&raw);
        let record = ReportRecord::new(&raw, &fields, " Jane  Doe ");

        assert_eq!(record.patient_name, "Jane  Doe");
        assert_eq!(record.patient_mrn.as_deref(), Some("AB123"));
        assert_eq!(record.specialty, "Ophthalmology");
        assert_eq!(record.report_type, "Ophthalmology");
        assert_eq!(record.report_content, raw.text);
        assert_eq!(record.icd10_codes, Some(vec!["H35.31".to_string()]));
    }

    #[test]
    fn no_codes_serialize_as_null() {
        let raw = RawReport::new("");
        let fields = extract_report(&raw);
        let record = ReportRecord::new(&raw, &fields, "X");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["icd10_codes"].is_null());
        assert!(json["patient_mrn"].is_null());
        assert_eq!(json["specialty"], "General");
    }
}
