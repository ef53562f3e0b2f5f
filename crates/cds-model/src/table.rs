use serde::Serialize;

use crate::record::{Record, is_blank};

/// In-memory tabular form of one parsed file, keyed logically by whichever
/// column the caller joins on.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub entity: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(entity: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            entity: entity.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from parsed records; column order follows the first
    /// record's keys.
    pub fn from_records(entity: impl Into<String>, rows: Vec<Record>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            entity: entity.into(),
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-blank values of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).map(String::as_str))
            .filter(|value| !is_blank(value))
    }
}
