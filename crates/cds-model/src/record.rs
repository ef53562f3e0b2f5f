use std::collections::BTreeMap;

use serde::Serialize;

/// One parsed row from an uploaded file: raw header name to raw string value.
///
/// Row index convention: body index 0 corresponds to file line 2 (the header
/// occupies line 1), so errors report `body_index + 2`.
pub type Record = BTreeMap<String, String>;

/// Offset added to a record's body index to obtain its original file line.
pub const HEADER_OFFSET: usize = 2;

/// A coerced field value produced by schema validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Flag(bool),
    TextArray(Vec<String>),
}

/// A record after type coercion against its schema.
pub type ProcessedRecord = BTreeMap<String, TypedValue>;

/// True when a raw cell is absent for validation purposes.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
