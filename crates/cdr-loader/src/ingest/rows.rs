//! Row encoding for the data lines of an extract file
//!
//! Fields are split on every comma; there is no escaping and no multi-line
//! field support. A field that contains a double quote is a string value
//! with its quotes removed, so `""` is the empty string. A bare empty field
//! is NULL.

use chrono::Local;

use super::models::RowValues;
use crate::error::{IngestError, Result};

/// 1-based file line of the first data row (two header lines precede it)
pub const FIRST_DATA_LINE: usize = 3;

/// Encode a single raw field
pub fn encode_field(raw: &str) -> Option<String> {
    if raw.contains('"') {
        Some(raw.replace('"', ""))
    } else if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Encode one data line
pub fn encode_line(line: &str) -> RowValues {
    line.split(',').map(encode_field).collect()
}

/// Encode every data line, requiring each to carry `column_count` fields.
///
/// A single malformed row fails the whole file; nothing is skipped.
pub fn encode_rows(column_count: usize, lines: &[&str], file: &str) -> Result<Vec<RowValues>> {
    let mut rows = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let values = encode_line(line);
        if values.len() != column_count {
            return Err(IngestError::RowShape {
                timestamp: Local::now(),
                file: file.to_string(),
                line: index + FIRST_DATA_LINE,
                expected: column_count,
                found: values.len(),
            });
        }
        rows.push(values);
    }

    Ok(rows)
}
