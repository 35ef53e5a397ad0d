//! CSV ingest and validation.
//!
//! Turns an `x,y` CSV into a validated `SampleSet`.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};

use crate::domain::SampleSet;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated samples + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub samples: SampleSet,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load `x,y` samples from a CSV file.
///
/// Columns are matched by header name (case-insensitive, BOM-tolerant). Rows
/// whose values fail to parse or are not finite are skipped and reported.
pub fn load_samples_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_samples(file)?;
    info!(
        "loaded {} of {} rows from {}",
        data.rows_used,
        data.rows_read,
        path.display()
    );
    Ok(data)
}

/// Parse `x,y` samples from any CSV reader.
pub fn read_samples<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let x_col = required_column(&header_map, "x")?;
    let y_col = required_column(&header_map, "y")?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, x_col, y_col) {
            Ok((xv, yv)) => {
                x.push(xv);
                y.push(yv);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!("skipping CSV line {}: {}", err.line, err.message);
    }

    let rows_used = x.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows found in CSV input."));
    }

    let samples = SampleSet::with_min_points(x, y, 1)?;

    Ok(IngestedData {
        samples,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a UTF-8 BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn required_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn parse_row(record: &StringRecord, x_col: usize, y_col: usize) -> Result<(f64, f64), String> {
    let x = parse_value(record, x_col, "x")?;
    let y = parse_value(record, y_col, "y")?;
    Ok((x, y))
}

fn parse_value(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value."))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_columns_by_name_in_any_order() {
        let csv = "label,Y,x\na,2.0,1.0\nb,4.0,2.0\n";
        let data = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(data.samples.x(), &[1.0, 2.0]);
        assert_eq!(data.samples.y(), &[2.0, 4.0]);
        assert_eq!(data.rows_read, 2);
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "x,y\n1,2\nfoo,3\n3,\n4,NaN\n5,10\n";
        let data = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.rows_read, 5);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(data.row_errors[0].message.contains("Invalid `x`"));
    }

    #[test]
    fn strips_bom_from_first_header() {
        let csv = "\u{feff}x,y\n1,2\n";
        let data = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(data.samples.len(), 1);
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let err = read_samples("x,z\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`y`"));
    }

    #[test]
    fn no_valid_rows_is_a_validation_error() {
        let err = read_samples("x,y\na,b\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
