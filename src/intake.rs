use std::str::FromStr;

use thiserror::Error;

use crate::models::{Cell, Column, DatasetCategory, Table};

/// Upload validation and CSV parsing failures. Every variant is a
/// client-correctable input error and maps to HTTP 400; the display
/// strings are the user-visible messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("No file selected")]
    EmptyFilename,
    #[error("File must be a CSV")]
    NotCsv,
    #[error("Invalid dataset type. Must be kepler, k2, or tess")]
    InvalidDatasetType,
    #[error("CSV file is empty")]
    EmptyCsv,
    #[error("Invalid CSV format")]
    MalformedCsv(String),
}

/// Check the uploaded filename. `None` means no file part was present
/// in the form at all. The `.csv` suffix check is case-sensitive.
pub fn validate_filename(filename: Option<&str>) -> Result<(), IntakeError> {
    let filename = filename.ok_or(IntakeError::MissingFile)?;
    if filename.is_empty() {
        return Err(IntakeError::EmptyFilename);
    }
    if !filename.ends_with(".csv") {
        return Err(IntakeError::NotCsv);
    }
    Ok(())
}

/// Resolve the `dataset_type` form field against the known categories.
pub fn parse_dataset_type(raw: &str) -> Result<DatasetCategory, IntakeError> {
    DatasetCategory::from_str(raw).map_err(|_| IntakeError::InvalidDatasetType)
}

/// Parse uploaded bytes as UTF-8 CSV text with a header row.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, IntakeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IntakeError::MalformedCsv(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(IntakeError::EmptyCsv);
    }

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| IntakeError::MalformedCsv(e.to_string()))?;

    let mut columns: Vec<Column> = headers
        .iter()
        .map(|h| Column {
            name: h.to_string(),
            cells: Vec::new(),
        })
        .collect();

    for record in reader.records() {
        let record = record.map_err(|e| IntakeError::MalformedCsv(e.to_string()))?;
        for (idx, field) in record.iter().enumerate() {
            columns[idx].cells.push(guess_cell(field));
        }
    }

    Ok(Table { columns })
}

/// Infer a cell's scalar type from its textual form. Integers win over
/// floats; "NaN"/"inf" parse as floats here and are nulled at the JSON
/// boundary.
fn guess_cell(s: &str) -> Cell {
    if s.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    if s == "true" || s == "false" {
        return Cell::Bool(s == "true");
    }
    Cell::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_validation() {
        assert_eq!(validate_filename(None), Err(IntakeError::MissingFile));
        assert_eq!(validate_filename(Some("")), Err(IntakeError::EmptyFilename));
        assert_eq!(validate_filename(Some("data.txt")), Err(IntakeError::NotCsv));
        // Suffix check is case-sensitive.
        assert_eq!(validate_filename(Some("DATA.CSV")), Err(IntakeError::NotCsv));
        assert_eq!(validate_filename(Some("koi_cumulative.csv")), Ok(()));
    }

    #[test]
    fn test_dataset_type_parsing() {
        assert_eq!(parse_dataset_type("kepler"), Ok(DatasetCategory::Kepler));
        assert_eq!(parse_dataset_type("KEPLER"), Ok(DatasetCategory::Kepler));
        assert_eq!(parse_dataset_type("mars"), Err(IntakeError::InvalidDatasetType));
        assert_eq!(parse_dataset_type(""), Err(IntakeError::InvalidDatasetType));
    }

    #[test]
    fn test_parse_csv_columns_and_types() {
        let table = parse_csv(b"name,period,snr,habitable\nKOI-1,3.52,,true\nKOI-2,x,NaN,false\n")
            .unwrap();
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[0].name, "name");
        assert_eq!(
            table.columns[0].cells,
            vec![Cell::Text("KOI-1".into()), Cell::Text("KOI-2".into())]
        );
        assert_eq!(table.columns[1].cells[0], Cell::Float(3.52));
        assert_eq!(table.columns[1].cells[1], Cell::Text("x".into()));
        assert_eq!(table.columns[2].cells[0], Cell::Null);
        assert!(matches!(table.columns[2].cells[1], Cell::Float(f) if f.is_nan()));
        assert_eq!(table.columns[3].cells[0], Cell::Bool(true));
    }

    #[test]
    fn test_parse_csv_integer_vs_float() {
        let table = parse_csv(b"a\n42\n42.0\n").unwrap();
        assert_eq!(table.columns[0].cells, vec![Cell::Int(42), Cell::Float(42.0)]);
    }

    #[test]
    fn test_empty_and_malformed_are_distinct() {
        assert_eq!(parse_csv(b""), Err(IntakeError::EmptyCsv));
        assert_eq!(parse_csv(b"  \n \n"), Err(IntakeError::EmptyCsv));

        // Ragged row: three fields under a two-column header.
        let err = parse_csv(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, IntakeError::MalformedCsv(_)));

        let err = parse_csv(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, IntakeError::MalformedCsv(_)));
    }

    #[test]
    fn test_header_only_csv_yields_empty_columns() {
        let table = parse_csv(b"a,b,c\n").unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.row_count(), 0);
    }
}
