use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use cds_model::{
    ErrorKind, HEADER_OFFSET, Record, SAMPLE_KEY_FIELDS, SampleRegistry, ValidationError,
};

use crate::error::Result;

/// Check raw records against the registered sample keys of a submission.
///
/// Records are keyed by the dictionary's declared column names. The check
/// runs over the intersection of those columns with the registration-key
/// fields: each record must match at least one registered key on every
/// intersecting field, otherwise one error is emitted for that row naming
/// the offending field combination.
pub fn validate_registered(
    records: &[Record],
    submission_id: &str,
    registry: &dyn SampleRegistry,
    row_offset: usize,
) -> Result<Vec<ValidationError>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };

    // Key fields present in this file, in canonical key order.
    let key_fields: Vec<&str> = SAMPLE_KEY_FIELDS
        .iter()
        .copied()
        .filter(|field| first.contains_key(*field))
        .collect();
    if key_fields.is_empty() {
        return Ok(Vec::new());
    }
    let combination = key_fields.join(", ");

    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let parts: BTreeMap<String, String> = key_fields
            .iter()
            .map(|field| {
                let value = record.get(*field).map(String::as_str).unwrap_or("");
                (field.to_string(), value.trim().to_string())
            })
            .collect();

        if !registry.exists_for_submission(submission_id, &parts)? {
            errors.push(ValidationError {
                kind: ErrorKind::UnregisteredData,
                field_name: Some(combination.clone()),
                row_index: Some(idx + row_offset + HEADER_OFFSET),
                message: format!(
                    "No registered sample matches the submitted values for [{combination}]."
                ),
                info: json!(parts),
            });
        }
    }

    debug!(
        submission_id,
        records = records.len(),
        unregistered = errors.len(),
        "checked records against registered samples"
    );
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use cds_model::{InMemorySampleRegistry, SampleRegistrationKey};

    use super::*;

    fn registered_key() -> SampleRegistrationKey {
        SampleRegistrationKey {
            study_id: "ST0001".to_string(),
            submitter_participant_id: "PT00001".to_string(),
            submitter_biospecimen_id: "BS00001".to_string(),
            submitter_sample_id: "SA00001".to_string(),
            sample_type: "Total DNA".to_string(),
        }
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn registered_record_round_trips_clean() {
        let registry = InMemorySampleRegistry::new();
        registry.register("17", registered_key());

        let records = vec![record(&[
            ("study_id", "ST0001"),
            ("submitter_participant_id", "PT00001"),
            ("submitter_biospecimen_id", "BS00001"),
            ("submitter_sample_id", "SA00001"),
            ("sample_type", "Total DNA"),
        ])];

        let errors = validate_registered(&records, "17", &registry, 0).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn altering_one_field_yields_exactly_one_error_naming_the_combination() {
        let registry = InMemorySampleRegistry::new();
        registry.register("17", registered_key());

        let records = vec![record(&[
            ("study_id", "ST0001"),
            ("submitter_participant_id", "PT00001"),
            ("submitter_biospecimen_id", "BS00001"),
            ("submitter_sample_id", "SA00002"),
            ("sample_type", "Total DNA"),
        ])];

        let errors = validate_registered(&records, "17", &registry, 0).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnregisteredData);
        assert_eq!(errors[0].row_index, Some(2));
        let combination = errors[0].field_name.as_deref().unwrap();
        assert!(combination.contains("submitter_sample_id"));
        assert!(combination.contains("study_id"));
    }

    #[test]
    fn only_intersecting_fields_are_probed() {
        let registry = InMemorySampleRegistry::new();
        registry.register("17", registered_key());

        // A clinical file carrying only two of the key columns.
        let records = vec![record(&[
            ("study_id", "ST0001"),
            ("submitter_participant_id", "PT00001"),
            ("date_of_birth", "1980-01-01"),
        ])];

        let errors = validate_registered(&records, "17", &registry, 0).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn file_without_key_columns_is_skipped() {
        let registry = InMemorySampleRegistry::new();
        let records = vec![record(&[("date_of_birth", "1980-01-01")])];
        let errors = validate_registered(&records, "17", &registry, 0).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn row_offset_is_applied() {
        let registry = InMemorySampleRegistry::new();
        let records = vec![record(&[("study_id", "ST0404")])];
        let errors = validate_registered(&records, "17", &registry, 10).unwrap();
        assert_eq!(errors[0].row_index, Some(12));
    }
}
