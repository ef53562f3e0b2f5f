use std::collections::HashMap;

use regex::Regex;
use serde_json::json;
use tracing::debug;

use cds_model::{
    Dictionary, ErrorKind, Field, HEADER_OFFSET, ProcessedRecord, Record, TypedValue,
    ValidationError, ValueType, is_blank,
};

use crate::error::{Result, ValidateError};

/// Delimiter for array-of-string cells in raw files.
const ARRAY_DELIMITER: char = ';';

/// Outcome of validating one batch of records against a schema.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub processed: Vec<ProcessedRecord>,
    pub errors: Vec<ValidationError>,
}

/// Validate records against one schema of the dictionary.
///
/// Records are independent of one another; each error is tagged with
/// `row_index = index_within_batch + row_offset + 2` so chunked invocations
/// keep original-file provenance. A malformed record contributes errors but
/// never aborts the batch; only a system fault (unknown schema, invalid
/// regex restriction) returns `Err`.
pub fn validate_records(
    schema_name: &str,
    records: &[Record],
    dictionary: &Dictionary,
    row_offset: usize,
) -> Result<BatchResult> {
    let schema = dictionary
        .schema(schema_name)
        .ok_or_else(|| ValidateError::UnknownSchema(schema_name.to_string()))?;

    // Regex restrictions compile once per batch.
    let mut regexes: HashMap<&str, Regex> = HashMap::new();
    for field in &schema.fields {
        if let Some(pattern) = field.regex() {
            let compiled = Regex::new(pattern).map_err(|source| ValidateError::BadRegex {
                field: field.name.clone(),
                source,
            })?;
            regexes.insert(field.name.as_str(), compiled);
        }
    }

    let mut result = BatchResult::default();
    for (idx, record) in records.iter().enumerate() {
        let row_index = idx + row_offset + HEADER_OFFSET;
        let mut processed = ProcessedRecord::new();
        for field in &schema.fields {
            validate_field(
                field,
                record,
                row_index,
                regexes.get(field.name.as_str()),
                &mut processed,
                &mut result.errors,
            );
        }
        result.processed.push(processed);
    }

    debug!(
        schema = schema_name,
        records = records.len(),
        errors = result.errors.len(),
        "validated record batch"
    );
    Ok(result)
}

fn validate_field(
    field: &Field,
    record: &Record,
    row_index: usize,
    regex: Option<&Regex>,
    processed: &mut ProcessedRecord,
    errors: &mut Vec<ValidationError>,
) {
    let raw = record.get(&field.name).map(String::as_str).unwrap_or("");
    if is_blank(raw) {
        if field.is_required() {
            errors.push(field_error(
                ErrorKind::MissingRequiredField,
                field,
                row_index,
                format!("{} is a required field.", field.name),
                json!({ "value": raw }),
            ));
        }
        return;
    }
    let raw = raw.trim();

    if field.is_array {
        let elements: Vec<String> = raw
            .split(ARRAY_DELIMITER)
            .map(str::trim)
            .filter(|element| !element.is_empty())
            .map(str::to_string)
            .collect();
        for element in &elements {
            check_text(field, element, row_index, regex, errors);
        }
        processed.insert(field.name.clone(), TypedValue::TextArray(elements));
        return;
    }

    match field.value_type {
        ValueType::String => {
            check_text(field, raw, row_index, regex, errors);
            processed.insert(field.name.clone(), TypedValue::Text(raw.to_string()));
        }
        ValueType::Number => match raw.parse::<f64>() {
            Ok(value) => {
                processed.insert(field.name.clone(), TypedValue::Number(value));
            }
            Err(_) => errors.push(field_error(
                ErrorKind::InvalidFieldValueType,
                field,
                row_index,
                format!("{} must be a number.", field.name),
                json!({ "value": raw }),
            )),
        },
        ValueType::Boolean => match parse_boolean(raw) {
            Some(value) => {
                processed.insert(field.name.clone(), TypedValue::Flag(value));
            }
            None => errors.push(field_error(
                ErrorKind::InvalidFieldValueType,
                field,
                row_index,
                format!("{} must be a boolean.", field.name),
                json!({ "value": raw }),
            )),
        },
    }
}

/// Regex and code-list checks for one text value (a scalar cell or one
/// element of a pre-split array).
fn check_text(
    field: &Field,
    value: &str,
    row_index: usize,
    regex: Option<&Regex>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(regex) = regex
        && !regex.is_match(value)
    {
        errors.push(field_error(
            ErrorKind::InvalidByRegex,
            field,
            row_index,
            format!(
                "{} does not match the expected format: {}",
                field.name,
                regex.as_str()
            ),
            json!({ "value": value, "regex": regex.as_str() }),
        ));
    }
    if let Some(code_list) = field.code_list()
        && !code_list.iter().any(|code| code == value)
    {
        errors.push(field_error(
            ErrorKind::InvalidEnumValue,
            field,
            row_index,
            format!("{} holds a value that is not in the allowed code list.", field.name),
            json!({ "value": value }),
        ));
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn field_error(
    kind: ErrorKind,
    field: &Field,
    row_index: usize,
    message: String,
    info: serde_json::Value,
) -> ValidationError {
    ValidationError {
        kind,
        field_name: Some(field.name.clone()),
        row_index: Some(row_index),
        message,
        info,
    }
}
