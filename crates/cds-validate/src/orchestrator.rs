use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, error, info};

use cds_dictionary::select_schema;
use cds_ingest::{file_name_of, parse_tsv, table_from_records};
use cds_model::{
    Dictionary, ErrorKind, FileValidationStatus, ProcessedRecord, SampleRegistrationKey,
    SampleRegistry, SubmissionValidationReport, SystemError, Table, ValidationError,
};
use cds_rules::{RuleCache, RuleEngine, RuleFailure};
use cds_store::ObjectStore;

use crate::assemble::assemble_studies;
use crate::batch::{BatchOptions, per_file_allotment, validate_file_entries};
use crate::entity;
use crate::error::{Result, ValidateError};
use crate::orphan::find_orphans;

/// Parent/child join passes run during cross-validation.
const ORPHAN_PASSES: &[(&str, &str, &str)] = &[
    (entity::DIAGNOSIS, entity::TREATMENT, "submitter_diagnosis_id"),
    (entity::DIAGNOSIS, entity::FOLLOW_UP, "submitter_diagnosis_id"),
    (
        entity::PARTICIPANT,
        entity::BIOSPECIMEN,
        "submitter_participant_id",
    ),
    (
        entity::PARTICIPANT,
        entity::DIAGNOSIS,
        "submitter_participant_id",
    ),
    (
        entity::PARTICIPANT,
        entity::FAMILY_RELATIONSHIP,
        "submitter_family_id",
    ),
    (
        entity::PARTICIPANT,
        entity::FAMILY_HISTORY,
        "submitter_participant_id",
    ),
    (
        entity::PARTICIPANT,
        entity::EXPOSURE,
        "submitter_participant_id",
    ),
];

/// Construction-scoped configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Store prefix under which submitted data files live, extended with the
    /// submission id (`<data_prefix>/<submission_id>/<filename>`).
    pub data_prefix: String,
    /// Store prefix under which rule files live, extended with the
    /// dictionary version.
    pub rules_prefix: String,
    /// Global error budget for one validation run, split across files.
    pub error_threshold: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            data_prefix: "clinical-data".to_string(),
            rules_prefix: "rules".to_string(),
            error_threshold: 1000,
        }
    }
}

/// Top-level coordinator: per-file validation plus whole-submission
/// cross-validation. Owns the rule cache, so rule sets load once per
/// dictionary version for the orchestrator's lifetime.
pub struct SubmissionValidator<S, R> {
    store: S,
    registry: R,
    rules: RuleCache,
    config: ValidationConfig,
}

impl<S: ObjectStore, R: SampleRegistry> SubmissionValidator<S, R> {
    pub fn new(store: S, registry: R, config: ValidationConfig) -> Self {
        Self {
            store,
            registry,
            rules: RuleCache::new(),
            config,
        }
    }

    /// Validate one uploaded file against the dictionary.
    ///
    /// `submission_id` is absent for first-time registration files, which
    /// have no referential context yet. Failing to resolve a schema is fatal
    /// here: no meaningful partial status exists for an unidentified file.
    pub fn validate_file(
        &self,
        filename: &str,
        content: &str,
        dictionary: &Dictionary,
        submission_id: Option<&str>,
    ) -> Result<FileValidationStatus> {
        let schema_name = select_schema(filename, dictionary)?;
        let entries = parse_tsv(content)?;
        validate_file_entries(
            filename,
            &schema_name,
            &entries,
            dictionary,
            &self.registry,
            &BatchOptions {
                submission_id,
                error_allotment: self.config.error_threshold,
            },
        )
    }

    /// Persist a submitted file under the submission's data prefix.
    ///
    /// Storage failures are returned as structured system errors rather than
    /// failing the request: validation results remain useful even when
    /// persistence does not.
    pub fn store_submitted_file(
        &self,
        submission_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Vec<SystemError> {
        let path = format!("{}/{submission_id}/{filename}", self.config.data_prefix);
        match self.store.put(&path, bytes) {
            Ok(()) => Vec::new(),
            Err(err) => {
                error!(%path, %err, "failed to store submitted file");
                vec![SystemError {
                    code: "STORAGE_FAILURE".to_string(),
                    message: err.to_string(),
                    path: Some(path),
                }]
            }
        }
    }

    /// Re-validate every stored file of a submission and cross-validate the
    /// whole: orphan joins plus the declarative rule set over assembled
    /// study facts.
    pub fn validate_submission(
        &self,
        submission_id: &str,
        dictionary: &Dictionary,
    ) -> Result<SubmissionValidationReport> {
        info!(submission_id, version = %dictionary.version, "cross-validating submission");
        let mut report = SubmissionValidationReport::default();

        let rules = self
            .rules
            .get_or_load(&self.store, &self.config.rules_prefix, &dictionary.version);

        let prefix = format!("{}/{submission_id}", self.config.data_prefix);
        let files = self.store.list_files(&prefix)?;
        let allotment = per_file_allotment(self.config.error_threshold, files.len());

        let mut tables: BTreeMap<String, Table> = BTreeMap::new();
        for file in &files {
            match self.load_and_validate(file, dictionary, submission_id, allotment) {
                Ok((status, schema_name, table)) => {
                    report.files.push(status);
                    tables.insert(schema_name, table);
                }
                Err(err) => {
                    // One broken file must not take the submission down.
                    error!(%file, %err, "failed to load file");
                    report.system_errors.push(SystemError {
                        code: "FILE_LOAD_FAILURE".to_string(),
                        message: err.to_string(),
                        path: Some(file.clone()),
                    });
                }
            }
        }

        ensure_minimum_entities(&tables)?;

        for &(parent, child, join_key) in ORPHAN_PASSES {
            report.global_errors.extend(find_orphans(
                tables.get(parent),
                tables.get(child),
                join_key,
                child,
            ));
        }

        if !rules.is_empty() {
            let engine = RuleEngine::new(rules.as_ref().clone());
            let facts = assemble_studies(&tables);
            debug!(facts = facts.len(), "evaluating rule set");
            report
                .global_errors
                .extend(engine.run_all(&facts).into_iter().map(rule_violation));
        }

        Ok(report)
    }

    fn load_and_validate(
        &self,
        file: &str,
        dictionary: &Dictionary,
        submission_id: &str,
        allotment: usize,
    ) -> Result<(FileValidationStatus, String, Table)> {
        let content = self.store.read_to_string(file)?;
        let filename = file_name_of(file);
        let schema_name = select_schema(filename, dictionary)?;
        let entries = parse_tsv(&content)?;

        let status = validate_file_entries(
            filename,
            &schema_name,
            &entries,
            dictionary,
            &self.registry,
            &BatchOptions {
                submission_id: Some(submission_id),
                error_allotment: allotment,
            },
        )?;

        let key = schema_name.to_lowercase();
        let table = table_from_records(&key, &entries);
        Ok((status, key, table))
    }
}

/// Registration keys carried by a validated registration file.
pub fn registration_keys(records: &[ProcessedRecord]) -> Vec<SampleRegistrationKey> {
    records.iter().map(SampleRegistrationKey::from_processed).collect()
}

/// Serialize a report to pretty JSON next to other run artifacts.
pub fn write_report_json(
    output_dir: &Path,
    report: &SubmissionValidationReport,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("validation_report.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}

fn ensure_minimum_entities(tables: &BTreeMap<String, Table>) -> Result<()> {
    let mut missing: Vec<&str> = [entity::STUDY, entity::PARTICIPANT, entity::BIOSPECIMEN]
        .into_iter()
        .filter(|name| !tables.contains_key(*name))
        .collect();
    if !tables.contains_key(entity::PHENOTYPE) && !tables.contains_key(entity::DIAGNOSIS) {
        missing.push("phenotype or diagnosis");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::MissingData(missing.join(", ")))
    }
}

fn rule_violation(failure: RuleFailure) -> ValidationError {
    ValidationError {
        kind: ErrorKind::InvalidByScript,
        field_name: None,
        row_index: None,
        message: format!("{} : {}", failure.rule_name, failure.event_type),
        info: json!({
            "conditions": failure.conditions,
            "result": failure.result,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cds_model::TypedValue;

    use super::*;

    #[test]
    fn minimum_entity_check_names_what_is_missing() {
        let mut tables = BTreeMap::new();
        tables.insert(
            entity::STUDY.to_string(),
            Table::new(entity::STUDY, Vec::new()),
        );

        let err = ensure_minimum_entities(&tables).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("participant"));
        assert!(message.contains("biospecimen"));
        assert!(message.contains("phenotype or diagnosis"));
    }

    #[test]
    fn phenotype_satisfies_the_clinical_requirement() {
        let mut tables = BTreeMap::new();
        for name in [
            entity::STUDY,
            entity::PARTICIPANT,
            entity::BIOSPECIMEN,
            entity::PHENOTYPE,
        ] {
            tables.insert(name.to_string(), Table::new(name, Vec::new()));
        }
        assert!(ensure_minimum_entities(&tables).is_ok());
    }

    #[test]
    fn registration_keys_come_from_processed_text_cells() {
        let mut record = ProcessedRecord::new();
        record.insert("study_id".to_string(), TypedValue::Text("ST0001".into()));
        record.insert(
            "submitter_sample_id".to_string(),
            TypedValue::Text("SA1".into()),
        );

        let keys = registration_keys(&[record]);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].study_id, "ST0001");
        assert_eq!(keys[0].submitter_sample_id, "SA1");
    }
}
