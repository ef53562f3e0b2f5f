use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::ProcessedRecord;

/// Stable error taxonomy keys exposed to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingRequiredField,
    InvalidFieldValueType,
    InvalidByRegex,
    InvalidEnumValue,
    /// Declarative rule violations.
    InvalidByScript,
    /// Record does not match any registered sample key.
    UnregisteredData,
    /// Child row whose parent key does not exist in the parent table.
    OrphanRecord,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::InvalidFieldValueType => "INVALID_FIELD_VALUE_TYPE",
            ErrorKind::InvalidByRegex => "INVALID_BY_REGEX",
            ErrorKind::InvalidEnumValue => "INVALID_ENUM_VALUE",
            ErrorKind::InvalidByScript => "INVALID_BY_SCRIPT",
            ErrorKind::UnregisteredData => "UNREGISTERED_DATA",
            ErrorKind::OrphanRecord => "ORPHAN_RECORD",
        }
    }
}

/// One recoverable validation finding.
///
/// `row_index` refers to the original file (1-based, header on line 1) and is
/// `None` for submission-scoped errors such as orphans and rule violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Absent for rule violations, which are not tied to a single field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,
}

/// A non-validation fault (I/O, storage) captured without failing the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Per-file outcome of schema plus referential validation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidationStatus {
    pub filename: String,
    pub schema_name: String,
    pub processed_records: Vec<ProcessedRecord>,
    pub validation_errors: Vec<ValidationError>,
}

impl FileValidationStatus {
    pub fn new(filename: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            schema_name: schema_name.into(),
            processed_records: Vec::new(),
            validation_errors: Vec::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.validation_errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.validation_errors.is_empty()
    }
}

/// Consolidated report for one validation run. Built fresh per run; never
/// persisted by this core.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionValidationReport {
    pub files: Vec<FileValidationStatus>,
    pub global_errors: Vec<ValidationError>,
    pub system_errors: Vec<SystemError>,
}

impl SubmissionValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.global_errors.is_empty() || self.files.iter().any(FileValidationStatus::has_errors)
    }

    pub fn error_count(&self) -> usize {
        self.global_errors.len()
            + self
                .files
                .iter()
                .map(FileValidationStatus::error_count)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_taxonomy_keys() {
        let json = serde_json::to_value(ErrorKind::InvalidByRegex).unwrap();
        assert_eq!(json, "INVALID_BY_REGEX");
        let json = serde_json::to_value(ErrorKind::InvalidFieldValueType).unwrap();
        assert_eq!(json, "INVALID_FIELD_VALUE_TYPE");
        assert_eq!(ErrorKind::UnregisteredData.as_str(), "UNREGISTERED_DATA");
    }

    #[test]
    fn report_counts_span_files_and_global_errors() {
        let mut status = FileValidationStatus::new("donor.tsv", "donor");
        status.validation_errors.push(ValidationError {
            kind: ErrorKind::MissingRequiredField,
            field_name: Some("study_id".to_string()),
            row_index: Some(2),
            message: "study_id is required".to_string(),
            info: Value::Null,
        });

        let report = SubmissionValidationReport {
            files: vec![status],
            global_errors: vec![ValidationError {
                kind: ErrorKind::OrphanRecord,
                field_name: Some("submitter_participant_id".to_string()),
                row_index: None,
                message: "orphan".to_string(),
                info: Value::Null,
            }],
            system_errors: Vec::new(),
        };

        assert!(report.has_errors());
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn row_index_is_omitted_when_absent() {
        let error = ValidationError {
            kind: ErrorKind::OrphanRecord,
            field_name: Some("submitter_diagnosis_id".to_string()),
            row_index: None,
            message: "orphan".to_string(),
            info: Value::Null,
        };
        let json = serde_json::to_value(&error).unwrap();
        assert!(json.get("rowIndex").is_none());
    }
}
