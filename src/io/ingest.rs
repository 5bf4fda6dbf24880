//! CSV point ingest.
//!
//! Turns a loosely formatted CSV into a list of `(x, y)` points:
//! - the header row is optional; a first row whose leading fields are not
//!   numbers is taken as the header
//! - columns named `x` and `y` (case-insensitive) are used when present,
//!   otherwise the first two numeric columns of the first data row
//! - rows that fail to parse are skipped and reported, never fatal

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::Point;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file.
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed points + skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedPoints {
    pub points: Vec<Point>,
    pub row_errors: Vec<RowError>,
    /// Data rows seen (the header is not counted).
    pub rows_read: usize,
}

/// Which columns hold `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Columns {
    Fixed { x: usize, y: usize },
    /// Decided by the first data row.
    FirstNumeric,
}

/// Load points from a CSV file.
pub fn load_points(path: &Path) -> Result<IngestedPoints, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_points(file)?;
    debug!(
        path = %path.display(),
        rows = ingested.rows_read,
        points = ingested.points.len(),
        "csv loaded"
    );
    Ok(ingested)
}

/// Parse points from any CSV source.
pub fn read_points<R: Read>(source: R) -> Result<IngestedPoints, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(source);

    let mut columns = None;
    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                row_errors.push(RowError {
                    line: error_line(&e).unwrap_or(idx + 1),
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record_line(&record).unwrap_or(idx + 1);

        let cols = match columns {
            Some(cols) => cols,
            None => {
                let cols = resolve_columns(&record)?;
                columns = Some(cols);
                if !looks_numeric(&record) {
                    // Header row.
                    continue;
                }
                cols
            }
        };
        rows_read += 1;

        let cols = match cols {
            Columns::Fixed { .. } => cols,
            Columns::FirstNumeric => match first_numeric_pair(&record) {
                Some((x, y)) => {
                    let fixed = Columns::Fixed { x, y };
                    columns = Some(fixed);
                    fixed
                }
                None => {
                    row_errors.push(RowError {
                        line,
                        message: "Row has fewer than two numeric fields.".to_string(),
                    });
                    continue;
                }
            },
        };

        match parse_row(&record, cols) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "skipped unparseable CSV rows");
        for err in &row_errors {
            debug!(line = err.line, message = %err.message, "skipped row");
        }
    }

    if points.is_empty() {
        return Err(AppError::new(3, "No valid (x, y) rows found in CSV."));
    }

    Ok(IngestedPoints {
        points,
        row_errors,
        rows_read,
    })
}

fn record_line(record: &StringRecord) -> Option<usize> {
    record.position().map(|p| p.line() as usize)
}

fn error_line(err: &csv::Error) -> Option<usize> {
    err.position().map(|p| p.line() as usize)
}

/// Look at the first record: a header names the columns, a data row means
/// there is no header at all.
fn resolve_columns(first: &StringRecord) -> Result<Columns, AppError> {
    if looks_numeric(first) {
        return Ok(Columns::FirstNumeric);
    }

    let header_map = build_header_map(first);
    match (header_map.get("x"), header_map.get("y")) {
        (Some(&x), Some(&y)) => Ok(Columns::Fixed { x, y }),
        (Some(_), None) => Err(AppError::new(2, "CSV has an `x` column but no `y` column.")),
        (None, Some(_)) => Err(AppError::new(2, "CSV has a `y` column but no `x` column.")),
        (None, None) => Ok(Columns::FirstNumeric),
    }
}

fn looks_numeric(record: &StringRecord) -> bool {
    record.len() >= 2 && record.iter().take(2).all(|f| f.parse::<f64>().is_ok())
}

fn first_numeric_pair(record: &StringRecord) -> Option<(usize, usize)> {
    let mut numeric = record
        .iter()
        .enumerate()
        .filter(|(_, f)| parse_f64(f).is_some())
        .map(|(i, _)| i);
    Some((numeric.next()?, numeric.next()?))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, cols: Columns) -> Result<Point, String> {
    let Columns::Fixed { x, y } = cols else {
        return Err("Columns not resolved.".to_string());
    };
    let x = get_f64(record, x, "x")?;
    let y = get_f64(record, y, "y")?;
    Ok(Point::new(x, y))
}

fn get_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value."))?;
    parse_f64(raw).ok_or_else(|| format!("Invalid `{name}` value '{raw}'."))
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read(csv: &str) -> IngestedPoints {
        read_points(csv.as_bytes()).unwrap()
    }

    #[test]
    fn headerless_rows_use_the_first_two_columns() {
        let got = read("1,2\n3.5,-4\n");
        assert_eq!(got.points, vec![Point::new(1.0, 2.0), Point::new(3.5, -4.0)]);
        assert_eq!(got.rows_read, 2);
        assert!(got.row_errors.is_empty());
    }

    #[test]
    fn named_columns_win_over_position() {
        let got = read("id,y,x\na,10,1\nb,20,2\n");
        assert_eq!(got.points, vec![Point::new(1.0, 10.0), Point::new(2.0, 20.0)]);
    }

    #[test]
    fn header_without_xy_uses_first_numeric_columns() {
        let got = read("\u{feff}Name,Tenor,Value\nfoo, 1.5 , 3\nbar,2,4\n");
        assert_eq!(got.points, vec![Point::new(1.5, 3.0), Point::new(2.0, 4.0)]);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let got = read("x,y\n1,1\noops,2\n3\n4,inf\n5,5\n");
        assert_eq!(got.points, vec![Point::new(1.0, 1.0), Point::new(5.0, 5.0)]);
        assert_eq!(got.rows_read, 5);

        let lines: Vec<usize> = got.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(got.row_errors[0].message.contains("`x`"), "{:?}", got.row_errors[0]);
    }

    #[test]
    fn one_sided_header_is_a_usage_error() {
        let err = read_points("x,value\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_input_has_no_points() {
        let err = read_points("x,y\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "0,1").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "2,5").unwrap();

        let got = load_points(file.path()).unwrap();
        assert_eq!(got.points, vec![Point::new(0.0, 1.0), Point::new(2.0, 5.0)]);

        let missing = load_points(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);
    }
}
