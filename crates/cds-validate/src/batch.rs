use tracing::{debug, warn};

use cds_model::{Dictionary, FileValidationStatus, Record, SampleRegistry};

use crate::error::Result;
use crate::record::validate_records;
use crate::referential::validate_registered;

/// Records per chunk. Bounds the work between error-budget checks; not a
/// tuning knob exposed to callers.
pub(crate) const CHUNK_SIZE: usize = 500;

/// Per-call options for one file's batch run.
pub struct BatchOptions<'a> {
    /// Absent for first-time registration files, which have no referential
    /// context yet.
    pub submission_id: Option<&'a str>,
    /// This file's share of the submission error budget.
    pub error_allotment: usize,
}

/// A file's share of a global error threshold split across `file_count`
/// files. Unused budget is not rebalanced between files.
pub fn per_file_allotment(global_threshold: usize, file_count: usize) -> usize {
    if file_count == 0 {
        global_threshold
    } else {
        global_threshold.div_ceil(file_count)
    }
}

/// Validate one file's parsed entries in fixed-size chunks.
///
/// Chunks run strictly in order; after each chunk the accumulated error
/// count is compared against the allotment and processing stops once it is
/// reached. Errors found in the chunk that crosses the threshold are kept:
/// the budget bounds cost, not correctness. Row indices are computed from
/// the chunk offset, so the reported positions are identical for any chunk
/// size.
pub fn validate_file_entries(
    filename: &str,
    schema_name: &str,
    entries: &[Record],
    dictionary: &Dictionary,
    registry: &dyn SampleRegistry,
    options: &BatchOptions<'_>,
) -> Result<FileValidationStatus> {
    validate_file_entries_chunked(
        filename,
        schema_name,
        entries,
        dictionary,
        registry,
        options,
        CHUNK_SIZE,
    )
}

pub(crate) fn validate_file_entries_chunked(
    filename: &str,
    schema_name: &str,
    entries: &[Record],
    dictionary: &Dictionary,
    registry: &dyn SampleRegistry,
    options: &BatchOptions<'_>,
    chunk_size: usize,
) -> Result<FileValidationStatus> {
    let chunk_size = chunk_size.max(1);
    let mut status = FileValidationStatus::new(filename, schema_name);

    for (chunk_idx, chunk) in entries.chunks(chunk_size).enumerate() {
        let row_offset = chunk_idx * chunk_size;

        // Schema and referential results for the same chunk are independent;
        // both are merged before the budget check.
        let batch = validate_records(schema_name, chunk, dictionary, row_offset)?;
        status.processed_records.extend(batch.processed);
        status.validation_errors.extend(batch.errors);

        if let Some(submission_id) = options.submission_id {
            let referential = validate_registered(chunk, submission_id, registry, row_offset)?;
            status.validation_errors.extend(referential);
        }

        if status.validation_errors.len() >= options.error_allotment {
            warn!(
                filename,
                errors = status.validation_errors.len(),
                allotment = options.error_allotment,
                "error budget reached, skipping remaining chunks"
            );
            break;
        }
    }

    debug!(
        filename,
        schema = schema_name,
        errors = status.validation_errors.len(),
        "file validation finished"
    );
    Ok(status)
}

#[cfg(test)]
mod tests {
    use cds_model::{
        Dictionary, ErrorKind, Field, InMemorySampleRegistry, Restrictions, Schema, ValueType,
    };

    use super::*;

    fn dictionary() -> Dictionary {
        Dictionary {
            name: "clinical-dictionary".to_string(),
            version: "5.12".to_string(),
            schemas: vec![Schema {
                name: "donor".to_string(),
                description: None,
                fields: vec![Field {
                    name: "study_id".to_string(),
                    value_type: ValueType::String,
                    is_array: false,
                    restrictions: Some(Restrictions {
                        required: true,
                        ..Restrictions::default()
                    }),
                }],
            }],
        }
    }

    fn entries(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|value| {
                let mut record = Record::new();
                record.insert("study_id".to_string(), value.to_string());
                record
            })
            .collect()
    }

    fn options(allotment: usize) -> BatchOptions<'static> {
        BatchOptions {
            submission_id: None,
            error_allotment: allotment,
        }
    }

    #[test]
    fn per_file_allotment_is_ceiling_division() {
        assert_eq!(per_file_allotment(200, 3), 67);
        assert_eq!(per_file_allotment(200, 4), 50);
        assert_eq!(per_file_allotment(1, 3), 1);
        assert_eq!(per_file_allotment(100, 0), 100);
    }

    #[test]
    fn row_indices_are_stable_across_chunk_sizes() {
        let registry = InMemorySampleRegistry::new();
        let dictionary = dictionary();
        // Errors on body rows 1 and 3 (file lines 3 and 5).
        let entries = entries(&["ST0001", "", "ST0002", ""]);

        let by_one = validate_file_entries_chunked(
            "donor.tsv",
            "donor",
            &entries,
            &dictionary,
            &registry,
            &options(usize::MAX),
            1,
        )
        .unwrap();
        let by_hundred = validate_file_entries_chunked(
            "donor.tsv",
            "donor",
            &entries,
            &dictionary,
            &registry,
            &options(usize::MAX),
            100,
        )
        .unwrap();

        let rows =
            |status: &FileValidationStatus| -> Vec<Option<usize>> {
                status.validation_errors.iter().map(|e| e.row_index).collect()
            };
        assert_eq!(rows(&by_one), vec![Some(3), Some(5)]);
        assert_eq!(rows(&by_one), rows(&by_hundred));
    }

    #[test]
    fn orchestrator_stops_between_chunks_once_budget_is_reached() {
        let registry = InMemorySampleRegistry::new();
        let dictionary = dictionary();
        // Every row errors; chunk size 2 with an allotment of 3 must finish
        // the crossing chunk (4 errors) and then stop.
        let entries = entries(&["", "", "", "", "", "", "", ""]);

        let status = validate_file_entries_chunked(
            "donor.tsv",
            "donor",
            &entries,
            &dictionary,
            &registry,
            &options(3),
            2,
        )
        .unwrap();

        assert_eq!(status.validation_errors.len(), 4);
        assert!(
            status
                .validation_errors
                .iter()
                .all(|e| e.kind == ErrorKind::MissingRequiredField)
        );
        // Records from processed chunks are still returned.
        assert_eq!(status.processed_records.len(), 4);
    }

    #[test]
    fn clean_file_processes_every_chunk() {
        let registry = InMemorySampleRegistry::new();
        let dictionary = dictionary();
        let entries = entries(&["ST0001", "ST0002", "ST0003"]);

        let status = validate_file_entries_chunked(
            "donor.tsv",
            "donor",
            &entries,
            &dictionary,
            &registry,
            &options(10),
            2,
        )
        .unwrap();

        assert!(status.validation_errors.is_empty());
        assert_eq!(status.processed_records.len(), 3);
    }
}
