use std::collections::BTreeMap;

use serde_json::{Map, Value};

use cds_model::{Table, is_blank};

use crate::entity;

type JsonRow = Map<String, Value>;

/// Assemble submitted tables into one fact per study.
///
/// Each fact is `{ "study": { ...study columns, "participants": [...] } }`
/// with the nested shape participants → { biospecimens → samples, family,
/// family_history, exposures, diagnoses → { treatments, follow_ups } }.
/// Tables that were not submitted contribute empty lists so fact shapes are
/// uniform for rule evaluation.
pub fn assemble_studies(tables: &BTreeMap<String, Table>) -> Vec<Value> {
    let rows = |name: &str| tables.get(name).map(table_rows);

    let mut biospecimens = rows(entity::BIOSPECIMEN).unwrap_or_default();
    biospecimens = nest(
        biospecimens,
        rows(entity::SAMPLE_REGISTRATION).as_deref(),
        "submitter_biospecimen_id",
        "samples",
        &["study_id", "submitter_participant_id"],
    );

    let mut diagnoses = rows(entity::DIAGNOSIS).unwrap_or_default();
    diagnoses = nest(
        diagnoses,
        rows(entity::TREATMENT).as_deref(),
        "submitter_diagnosis_id",
        "treatments",
        &["study_id", "submitter_participant_id"],
    );
    diagnoses = nest(
        diagnoses,
        rows(entity::FOLLOW_UP).as_deref(),
        "submitter_diagnosis_id",
        "follow_ups",
        &["study_id", "submitter_participant_id"],
    );

    let mut participants = rows(entity::PARTICIPANT).unwrap_or_default();
    participants = nest(
        participants,
        Some(biospecimens.as_slice()),
        "submitter_participant_id",
        "biospecimens",
        &["study_id"],
    );
    participants = nest(
        participants,
        rows(entity::FAMILY_RELATIONSHIP).as_deref(),
        "submitter_family_id",
        "family",
        &["study_id"],
    );
    participants = nest(
        participants,
        rows(entity::FAMILY_HISTORY).as_deref(),
        "submitter_participant_id",
        "family_history",
        &["study_id"],
    );
    participants = nest(
        participants,
        rows(entity::EXPOSURE).as_deref(),
        "submitter_participant_id",
        "exposures",
        &["study_id"],
    );
    participants = nest(
        participants,
        Some(diagnoses.as_slice()),
        "submitter_participant_id",
        "diagnoses",
        &["study_id"],
    );

    let studies = nest(
        rows(entity::STUDY).unwrap_or_default(),
        Some(participants.as_slice()),
        "study_id",
        "participants",
        &[],
    );

    studies
        .into_iter()
        .map(|study| {
            let mut fact = Map::new();
            fact.insert("study".to_string(), Value::Object(study));
            Value::Object(fact)
        })
        .collect()
}

/// Left outer join of `parents` with `children` on `join_key`, grouped by
/// the parent's key and collapsed into the parent row plus an embedded
/// `nested_name` list.
///
/// Parent rows sharing a key collapse into the first row of the group. The
/// nested copies lose the join key and `drop_columns` to avoid duplicating
/// parent context. A group with zero matching children gets an empty list,
/// never a missing key; an absent child table (`None`) behaves as an empty
/// one so the output shape stays uniform.
fn nest(
    parents: Vec<JsonRow>,
    children: Option<&[JsonRow]>,
    join_key: &str,
    nested_name: &str,
    drop_columns: &[&str],
) -> Vec<JsonRow> {
    // Hash index over the child side, probed once per parent group.
    let mut child_index: BTreeMap<&str, Vec<&JsonRow>> = BTreeMap::new();
    if let Some(children) = children {
        for child in children {
            if let Some(key) = string_cell(child, join_key)
                && !is_blank(key)
            {
                child_index.entry(key).or_default().push(child);
            }
        }
    }

    let mut seen_keys: Vec<String> = Vec::new();
    let mut grouped: Vec<JsonRow> = Vec::new();

    for mut parent in parents {
        let key = string_cell(&parent, join_key)
            .filter(|key| !is_blank(key))
            .map(str::to_string);

        if let Some(key) = &key {
            if seen_keys.iter().any(|seen| seen == key) {
                continue;
            }
            seen_keys.push(key.clone());
        }

        let nested: Vec<Value> = key
            .as_deref()
            .and_then(|key| child_index.get(key))
            .map(|matches| {
                matches
                    .iter()
                    .map(|child| {
                        let mut copy = (*child).clone();
                        copy.remove(join_key);
                        for column in drop_columns {
                            copy.remove(*column);
                        }
                        Value::Object(copy)
                    })
                    .collect()
            })
            .unwrap_or_default();

        parent.insert(nested_name.to_string(), Value::Array(nested));
        grouped.push(parent);
    }

    grouped
}

fn table_rows(table: &Table) -> Vec<JsonRow> {
    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(column, value)| (column.clone(), Value::String(value.clone())))
                .collect()
        })
        .collect()
}

fn string_cell<'a>(row: &'a JsonRow, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}
