use cds_model::{Record, Table, is_blank};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed tabular content: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse tab-separated content into raw records.
///
/// The first row is the header. Cell values are trimmed; empty lines are
/// skipped by the reader. Body index 0 corresponds to file line 2.
pub fn parse_tsv(content: &str) -> Result<Vec<Record>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = row.get(idx).unwrap_or("").trim();
            record.insert(header.trim().to_string(), value.to_string());
        }
        records.push(record);
    }

    debug!(rows = records.len(), "parsed tabular content");
    Ok(records)
}

/// Build an in-memory table from parsed records, dropping rows that are
/// entirely blank (they carry no joinable data).
pub fn table_from_records(entity: &str, records: &[Record]) -> Table {
    let rows: Vec<Record> = records
        .iter()
        .filter(|record| record.values().any(|value| !is_blank(value)))
        .cloned()
        .collect();
    Table::from_records(entity, rows)
}

/// File name portion of a stored object path (after the last `/`).
pub fn file_name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_keyed_records() {
        let content = "study_id\tsubmitter_participant_id\nST0001\tPT1\nST0001\tPT2\n";
        let records = parse_tsv(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("submitter_participant_id").unwrap(), "PT2");
    }

    #[test]
    fn trims_cells_and_tolerates_short_rows() {
        let content = "study_id\tsex\nST0001\t female \nST0002\n";
        let records = parse_tsv(content).unwrap();
        assert_eq!(records[0].get("sex").unwrap(), "female");
        assert_eq!(records[1].get("sex").unwrap(), "");
    }

    #[test]
    fn table_drops_fully_blank_rows() {
        let content = "study_id\tsex\nST0001\tfemale\n\t\n";
        let records = parse_tsv(content).unwrap();
        assert_eq!(records.len(), 2);

        let table = table_from_records("donor", &records);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn file_name_is_last_path_segment() {
        assert_eq!(
            file_name_of("clinical-data/u1.tmp/17/donor.tsv"),
            "donor.tsv"
        );
        assert_eq!(file_name_of("donor.tsv"), "donor.tsv");
    }
}
