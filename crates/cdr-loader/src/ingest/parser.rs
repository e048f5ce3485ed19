//! Extract file parser
//!
//! Turns the text of one extract file into the pair of statements the driver
//! executes inside that file's transaction.
//!
//! # File Format
//! ```text
//! "cdrRecordType","pkid","callingPartyNumber"
//! INTEGER,UNIQUEIDENTIFIER,VARCHAR(50)
//! 1,"0b4ab0e6-93b1-4c3a-9f1c-1b5c2d2f8d10","1001"
//! ```
//! Lines end with `\n` (a trailing `\r` is ignored). A single trailing empty
//! line is the file's terminating newline and is dropped.

use tracing::debug;

use super::rows::encode_rows;
use super::schema::{infer_columns, is_plain_identifier, TypeTranslator};
use super::statement::{CreateTableStatement, InsertStatement};
use crate::error::{IngestError, Result};

/// Statements derived from one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub create: CreateTableStatement,
    pub insert: InsertStatement,
}

/// Parser for extract files
#[derive(Debug, Clone)]
pub struct ExtractParser {
    translator: TypeTranslator,
}

impl ExtractParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            translator: TypeTranslator::new()?,
        })
    }

    /// Parse `content` of the file named `file` into statements against `table`
    pub fn parse(&self, content: &str, file: &str, table: &str) -> Result<LoadPlan> {
        if !is_plain_identifier(table) {
            return Err(IngestError::InvalidIdentifier {
                file: file.to_string(),
                identifier: table.to_string(),
            });
        }

        let mut lines: Vec<&str> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        let name_line = header_line(&lines, 0, file)?;
        let type_line = header_line(&lines, 1, file)?;
        let columns = infer_columns(&self.translator, name_line, type_line, file)?;

        lines.drain(..2);
        if lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let rows = encode_rows(columns.len(), &lines, file)?;
        debug!(
            file = %file,
            table = %table,
            columns = columns.len(),
            rows = rows.len(),
            "Parsed extract file"
        );

        Ok(LoadPlan {
            create: CreateTableStatement::new(table, columns.clone()),
            insert: InsertStatement::new(table, columns, rows),
        })
    }
}

fn header_line<'a>(lines: &[&'a str], index: usize, file: &str) -> Result<&'a str> {
    match lines.get(index) {
        Some(&line) if !line.trim().is_empty() => Ok(line),
        _ => Err(IngestError::MissingHeader {
            file: file.to_string(),
            line: index + 1,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parser() -> ExtractParser {
        ExtractParser::new().unwrap()
    }

    #[test]
    fn test_parse_uuid_and_varchar() {
        let content = "id,name\nUNIQUEIDENTIFIER,VARCHAR\n\"abc-123\",\"Bob\"\n";
        let plan = parser().parse(content, "cdr_1", "cdr").unwrap();

        let create = plan.create.sql();
        assert!(create.contains("id UUID"));
        assert!(create.contains("name VARCHAR"));
        assert!(plan.insert.literal_sql().contains("('abc-123','Bob')"));
        assert_eq!(plan.insert.row_count(), 1);
    }

    #[test]
    fn test_parse_crlf_lines() {
        let content = "a,b\r\nINTEGER,INTEGER\r\n1,2\r\n3,4\r\n";
        let plan = parser().parse(content, "cmr_1", "cmr").unwrap();
        assert_eq!(plan.insert.row_count(), 2);
        assert_eq!(
            plan.insert.rows()[1],
            vec![Some("3".to_string()), Some("4".to_string())]
        );
    }

    #[test]
    fn test_only_one_trailing_empty_line_is_dropped() {
        let content = "a,b\nINTEGER,INTEGER\n1,2\n\n";
        let err = parser().parse(content, "cdr_1", "cdr").unwrap_err();
        assert!(matches!(err, IngestError::RowShape { line: 4, .. }));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let plan = parser()
            .parse("a,b\nINTEGER,TEXT\n", "cdr_1", "cdr")
            .unwrap();
        assert!(plan.insert.is_empty());

        let plan = parser().parse("a,b\nINTEGER,TEXT", "cdr_1", "cdr").unwrap();
        assert!(plan.insert.is_empty());
    }

    #[test]
    fn test_missing_header_lines() {
        let err = parser().parse("", "cdr_1", "cdr").unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader { line: 1, .. }));

        let err = parser().parse("a,b\n", "cdr_1", "cdr").unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader { line: 2, .. }));

        let err = parser().parse("a,b", "cdr_1", "cdr").unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader { line: 2, .. }));
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let err = parser()
            .parse("a\nTEXT\nx\n", "cdr_1", "cdr; DROP TABLE cmr")
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidIdentifier { .. }));
    }
}
