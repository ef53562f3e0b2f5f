use std::collections::BTreeSet;

use serde_json::json;
use tracing::debug;

use cds_model::{ErrorKind, Table, ValidationError};

/// Detect child rows whose join-key value has no match in the parent table.
///
/// Join semantics: the child side is what is being checked for orphan-hood.
/// An empty parent table orphans every child row; an empty child table
/// yields nothing. Either table being absent (not submitted) short-circuits
/// to zero errors; absence-of-data is the caller's precondition check, not
/// this detector's.
pub fn find_orphans(
    parent: Option<&Table>,
    child: Option<&Table>,
    join_key: &str,
    entity: &str,
) -> Vec<ValidationError> {
    let (Some(parent), Some(child)) = (parent, child) else {
        return Vec::new();
    };

    let parent_keys: BTreeSet<&str> = parent.column_values(join_key).map(str::trim).collect();

    let mut errors = Vec::new();
    for row in &child.rows {
        let key = row.get(join_key).map(|value| value.trim()).unwrap_or("");
        if !parent_keys.contains(key) {
            errors.push(ValidationError {
                kind: ErrorKind::OrphanRecord,
                field_name: Some(join_key.to_string()),
                row_index: None,
                message: format!("Orphan record of type {entity} was found."),
                info: json!(row),
            });
        }
    }

    debug!(
        entity,
        join_key,
        orphans = errors.len(),
        "orphan detection finished"
    );
    errors
}

#[cfg(test)]
mod tests {
    use cds_model::Record;

    use super::*;

    fn table(entity: &str, join_key: &str, keys: &[&str]) -> Table {
        let rows: Vec<Record> = keys
            .iter()
            .map(|key| {
                let mut row = Record::new();
                row.insert(join_key.to_string(), key.to_string());
                row.insert("other_column".to_string(), "x".to_string());
                row
            })
            .collect();
        Table::from_records(entity, rows)
    }

    #[test]
    fn unmatched_children_are_orphans() {
        let parent = table("diagnosis", "submitter_diagnosis_id", &["DX1", "DX2"]);
        let child = table("treatment", "submitter_diagnosis_id", &["DX1", "DX9"]);

        let errors = find_orphans(
            Some(&parent),
            Some(&child),
            "submitter_diagnosis_id",
            "treatment",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::OrphanRecord);
        assert_eq!(errors[0].field_name.as_deref(), Some("submitter_diagnosis_id"));
        assert!(errors[0].row_index.is_none());
        assert_eq!(errors[0].info["submitter_diagnosis_id"], "DX9");
    }

    #[test]
    fn empty_parent_orphans_every_child_row() {
        let parent = table("diagnosis", "submitter_diagnosis_id", &[]);
        let child = table("treatment", "submitter_diagnosis_id", &["DX1", "DX2"]);

        let errors = find_orphans(
            Some(&parent),
            Some(&child),
            "submitter_diagnosis_id",
            "treatment",
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn empty_child_yields_no_errors() {
        let parent = table("diagnosis", "submitter_diagnosis_id", &["DX1"]);
        let child = table("treatment", "submitter_diagnosis_id", &[]);

        let errors = find_orphans(
            Some(&parent),
            Some(&child),
            "submitter_diagnosis_id",
            "treatment",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn absent_tables_short_circuit() {
        let child = table("treatment", "submitter_diagnosis_id", &["DX1"]);
        assert!(find_orphans(None, Some(&child), "submitter_diagnosis_id", "treatment").is_empty());
        assert!(find_orphans(Some(&child), None, "submitter_diagnosis_id", "treatment").is_empty());
        assert!(find_orphans(None, None, "submitter_diagnosis_id", "treatment").is_empty());
    }
}
