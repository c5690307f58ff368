// 📒 Ledger Table - delimited text in, delimited text out
// Original cells are kept as raw strings so they round-trip unchanged.

use crate::error::{CorrectionError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// LEDGER ENTRY
// ============================================================================

/// One bookkeeping line: the account label and its amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account_label: String,

    /// Finite; negative for credits
    pub amount: f64,
}

impl LedgerEntry {
    pub fn new(account_label: impl Into<String>, amount: f64) -> Self {
        LedgerEntry {
            account_label: account_label.into(),
            amount,
        }
    }
}

// ============================================================================
// LEDGER TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl LedgerTable {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        LedgerTable { headers, records }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// First column whose trimmed header equals `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| normalize_header(h) == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column, in row order
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Drop every column matching one of `names`; returns the headers removed
    pub fn remove_columns(&mut self, names: &[&str]) -> Vec<String> {
        let doomed: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| names.contains(&normalize_header(h)))
            .map(|(i, _)| i)
            .collect();

        if doomed.is_empty() {
            return Vec::new();
        }

        let keep = |i: &usize| !doomed.contains(i);

        let removed = doomed.iter().map(|&i| self.headers[i].clone()).collect();

        self.headers = take_indices(&self.headers, keep);
        self.records = self
            .records
            .iter()
            .map(|r| take_indices(r, keep))
            .collect();

        removed
    }

    /// Append a column; `values` must have one cell per row
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.records.len());
        self.headers.push(name.to_string());
        for (record, value) in self.records.iter_mut().zip(values) {
            record.push(value);
        }
    }
}

fn take_indices(cells: &[String], keep: impl Fn(&usize) -> bool) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(i))
        .map(|(_, c)| c.clone())
        .collect()
}

/// Header cell as used for name matching
pub fn normalize_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

/// Decode delimited bytes (header row + data rows) into a table
pub fn decode_csv(bytes: &[u8], delimiter: u8) -> Result<LedgerTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(decode_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| normalize_header(h).is_empty()) {
        return Err(CorrectionError::Decode {
            line: 1,
            message: "no header row found".to_string(),
        });
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(decode_error)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(LedgerTable { headers, records })
}

/// Read and decode a delimited file
pub fn load_csv(path: &Path, delimiter: u8) -> Result<LedgerTable> {
    let bytes = fs::read(path)?;
    decode_csv(&bytes, delimiter)
}

/// Encode a table using the given delimiter, quoting only where needed
pub fn encode_csv(table: &LedgerTable, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&table.headers).map_err(encode_error)?;
    for record in &table.records {
        writer.write_record(record).map_err(encode_error)?;
    }

    writer.into_inner().map_err(|e| {
        CorrectionError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })
}

/// Encode and write a table to disk
pub fn write_csv(path: &Path, table: &LedgerTable, delimiter: u8) -> Result<()> {
    let bytes = encode_csv(table, delimiter)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn decode_error(err: csv::Error) -> CorrectionError {
    let line = err.position().map(|p| p.line()).unwrap_or(1);

    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        csv::ErrorKind::Utf8 { .. } => "input is not valid UTF-8".to_string(),
        _ => err.to_string(),
    };

    CorrectionError::Decode { line, message }
}

fn encode_error(err: csv::Error) -> CorrectionError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => CorrectionError::Io(io),
        other => CorrectionError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{:?}", other),
        )),
    }
}

// ============================================================================
// AMOUNTS
// ============================================================================

/// Parse an amount cell; `None` unless it is a finite number
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Shortest round-trip text; integral values keep one decimal ("80.0")
pub fn format_amount(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_basic() {
        let table =
            decode_csv(b"Grootboekrekening,Bedrag (EUR)\nHuur,100.00\nAuto,50\n", b',').unwrap();

        assert_eq!(table.headers, vec!["Grootboekrekening", "Bedrag (EUR)"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.records[0], vec!["Huur", "100.00"]);
        assert_eq!(table.column_index("Bedrag (EUR)"), Some(1));
    }

    #[test]
    fn test_decode_semicolon_and_quotes() {
        let input = "Datum;Grootboekrekening;Bedrag (EUR)\n2024-01-02;\"Huur; kantoor\";1250\n";
        let table = decode_csv(input.as_bytes(), b';').unwrap();

        assert_eq!(table.records[0][1], "Huur; kantoor");
    }

    #[test]
    fn test_decode_header_whitespace_and_bom() {
        let input = "\u{feff} Grootboekrekening , Bedrag (EUR)\nX,1\n";
        let table = decode_csv(input.as_bytes(), b',').unwrap();

        assert_eq!(table.column_index("Grootboekrekening"), Some(0));
        assert_eq!(table.column_index("Bedrag (EUR)"), Some(1));
    }

    #[test]
    fn test_decode_empty_input() {
        let err = decode_csv(b"", b',').unwrap_err();
        assert_eq!(err.code(), "DECODE_ERROR");
    }

    #[test]
    fn test_decode_ragged_row() {
        let err = decode_csv(b"a,b\n1,2\n3\n", b',').unwrap_err();

        match err {
            CorrectionError::Decode { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 2 fields, found 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_csv(b"a,b\n\xff\xfe,1\n", b',').unwrap_err();
        assert!(matches!(err, CorrectionError::Decode { .. }));
    }

    #[test]
    fn test_encode_preserves_cells() {
        let table = LedgerTable::new(
            vec!["Grootboekrekening".to_string(), "Bedrag (EUR)".to_string()],
            vec![vec!["Huur, kantoor".to_string(), "100.00".to_string()]],
        );

        let bytes = encode_csv(&table, b',').unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Grootboekrekening,Bedrag (EUR)\n\"Huur, kantoor\",100.00\n"
        );
    }

    #[test]
    fn test_remove_and_push_columns() {
        let mut table = LedgerTable::new(
            vec!["a".to_string(), "x".to_string(), "b".to_string()],
            vec![vec!["1".to_string(), "9".to_string(), "2".to_string()]],
        );

        let removed = table.remove_columns(&["x", "missing"]);
        assert_eq!(removed, vec!["x".to_string()]);
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.records[0], vec!["1", "2"]);

        table.push_column("c", vec!["3".to_string()]);
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.column(2), vec!["3"]);
    }

    #[test]
    fn test_load_and_write_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Grootboekrekening,Bedrag (EUR)\nHuur,10\n").unwrap();

        let table = load_csv(file.path(), b',').unwrap();
        assert_eq!(table.row_count(), 1);

        let out = tempfile::NamedTempFile::new().unwrap();
        write_csv(out.path(), &table, b',').unwrap();
        let written = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(written, "Grootboekrekening,Bedrag (EUR)\nHuur,10\n");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv"), b',').unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100.00"), Some(100.0));
        assert_eq!(parse_amount(" -20.5 "), Some(-20.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(80.0), "80.0");
        assert_eq!(format_amount(0.0), "0.0");
        assert_eq!(format_amount(-20.0), "-20.0");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.1 + 0.2), "0.30000000000000004");
    }
}
