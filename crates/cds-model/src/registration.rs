use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{ProcessedRecord, Record, TypedValue};

/// Dictionary column names that compose a sample registration key, in
/// canonical order.
pub const SAMPLE_KEY_FIELDS: &[&str] = &[
    "study_id",
    "submitter_participant_id",
    "submitter_biospecimen_id",
    "submitter_sample_id",
    "sample_type",
];

/// Composite key identifying one previously registered biological sample.
/// Immutable once validated in; scoped to a single submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRegistrationKey {
    pub study_id: String,
    pub submitter_participant_id: String,
    pub submitter_biospecimen_id: String,
    pub submitter_sample_id: String,
    pub sample_type: String,
}

impl SampleRegistrationKey {
    /// Build a key from a raw record keyed by dictionary column names.
    /// Missing columns become empty strings; registration-file validation
    /// has already rejected those rows.
    pub fn from_record(record: &Record) -> Self {
        let get = |name: &str| {
            record
                .get(name)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            study_id: get("study_id"),
            submitter_participant_id: get("submitter_participant_id"),
            submitter_biospecimen_id: get("submitter_biospecimen_id"),
            submitter_sample_id: get("submitter_sample_id"),
            sample_type: get("sample_type"),
        }
    }

    /// Build a key from a processed (type-coerced) registration record.
    pub fn from_processed(record: &ProcessedRecord) -> Self {
        let get = |name: &str| match record.get(name) {
            Some(TypedValue::Text(value)) => value.trim().to_string(),
            _ => String::new(),
        };
        Self {
            study_id: get("study_id"),
            submitter_participant_id: get("submitter_participant_id"),
            submitter_biospecimen_id: get("submitter_biospecimen_id"),
            submitter_sample_id: get("submitter_sample_id"),
            sample_type: get("sample_type"),
        }
    }

    /// Value of one key field by its dictionary column name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "study_id" => Some(&self.study_id),
            "submitter_participant_id" => Some(&self.submitter_participant_id),
            "submitter_biospecimen_id" => Some(&self.submitter_biospecimen_id),
            "submitter_sample_id" => Some(&self.submitter_sample_id),
            "sample_type" => Some(&self.sample_type),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("sample registry backend failure: {0}")]
    Backend(String),
}

/// Narrow interface over the store of previously registered sample keys.
///
/// `parts` holds the key fields present in the submitted file; a key matches
/// when every provided field equals the registered value.
pub trait SampleRegistry {
    fn exists_for_submission(
        &self,
        submission_id: &str,
        parts: &BTreeMap<String, String>,
    ) -> Result<bool, RegistryError>;
}

/// In-memory registry, usable as an embedded backend and in tests.
#[derive(Debug, Default)]
pub struct InMemorySampleRegistry {
    keys: RwLock<HashMap<String, Vec<SampleRegistrationKey>>>,
}

impl InMemorySampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, submission_id: &str, key: SampleRegistrationKey) {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.entry(submission_id.to_string()).or_default().push(key);
    }

    pub fn register_all<I>(&self, submission_id: &str, new_keys: I)
    where
        I: IntoIterator<Item = SampleRegistrationKey>,
    {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.entry(submission_id.to_string())
            .or_default()
            .extend(new_keys);
    }

    pub fn count_for_submission(&self, submission_id: &str) -> usize {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(submission_id).map_or(0, Vec::len)
    }
}

impl SampleRegistry for InMemorySampleRegistry {
    fn exists_for_submission(
        &self,
        submission_id: &str,
        parts: &BTreeMap<String, String>,
    ) -> Result<bool, RegistryError> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        let Some(registered) = keys.get(submission_id) else {
            return Ok(false);
        };
        Ok(registered.iter().any(|key| {
            parts
                .iter()
                .all(|(name, value)| key.field(name) == Some(value.trim()))
        }))
    }
}
