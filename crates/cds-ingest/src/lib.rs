//! Tabular ingestion.
//!
//! Submitted clinical-data files are tab-separated with one header row.
//! Parsing produces raw string records keyed by header name; typing happens
//! later against the selected schema.

mod tsv;

pub use tsv::{IngestError, file_name_of, parse_tsv, table_from_records};
