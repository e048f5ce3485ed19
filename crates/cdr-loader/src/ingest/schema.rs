//! Schema inference from the two header lines of an extract file
//!
//! Line 1 holds the column names, line 2 the source type of each column.
//! Source types come from the exporting SQL Server and are translated to
//! PostgreSQL names:
//!
//! - `UNIQUEIDENTIFIER` (whole token) becomes `UUID`
//! - `INTEGER` / `INT` (every occurrence) becomes `BIGINT`, since observed
//!   values overflow 32 bits
//!
//! Both rules match case-insensitively and are idempotent.

use regex::Regex;

use super::models::{Column, ColumnSpec};
use crate::error::{IngestError, Result};

pub const SOURCE_UUID_TYPE: &str = "UNIQUEIDENTIFIER";
pub const STORE_UUID_TYPE: &str = "UUID";
pub const STORE_INTEGER_TYPE: &str = "BIGINT";

/// Longest identifier PostgreSQL keeps without truncation
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Whether `name` can be spliced into DDL as a bare identifier
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && name.len() <= MAX_IDENTIFIER_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Translates source type tokens and validates the result
#[derive(Debug, Clone)]
pub struct TypeTranslator {
    integer_pattern: Regex,
    type_pattern: Regex,
}

impl TypeTranslator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            integer_pattern: Regex::new(r"(?i)\bINT(?:EGER)?\b")?,
            // NAME [(n[,m])] [[]], with multi-word names limited to known types
            type_pattern: Regex::new(
                r"(?i)^(?:DOUBLE PRECISION|CHARACTER VARYING|BIT VARYING|TIME(?:STAMP)? WITH(?:OUT)? TIME ZONE|[A-Z][A-Z0-9_]*)(?:\(\s*\d+(?:\s*,\s*\d+)?\s*\))?(?:\[\])?$",
            )?,
        })
    }

    /// Map one source type token to its store type
    pub fn translate(&self, token: &str) -> String {
        let token = token.trim();
        if token.eq_ignore_ascii_case(SOURCE_UUID_TYPE) {
            return STORE_UUID_TYPE.to_string();
        }
        self.integer_pattern
            .replace_all(token, STORE_INTEGER_TYPE)
            .into_owned()
    }

    pub fn is_valid_type(&self, store_type: &str) -> bool {
        self.type_pattern.is_match(store_type)
    }
}

/// Derive the column spec from the name line and the type line
pub fn infer_columns(
    translator: &TypeTranslator,
    name_line: &str,
    type_line: &str,
    file: &str,
) -> Result<ColumnSpec> {
    let names: Vec<String> = name_line
        .replace('"', "")
        .split(',')
        .map(|name| name.trim().to_string())
        .collect();

    let types: Vec<String> = type_line
        .replace('"', "")
        .split(',')
        .map(|token| translator.translate(token))
        .collect();

    if names.len() != types.len() {
        return Err(IngestError::HeaderShape {
            file: file.to_string(),
            names: names.len(),
            types: types.len(),
        });
    }

    let mut columns = Vec::with_capacity(names.len());
    for (name, store_type) in names.into_iter().zip(types) {
        if !is_plain_identifier(&name) {
            return Err(IngestError::InvalidIdentifier {
                file: file.to_string(),
                identifier: name,
            });
        }
        if !translator.is_valid_type(&store_type) {
            return Err(IngestError::InvalidType {
                file: file.to_string(),
                column: name,
                store_type,
            });
        }
        columns.push(Column::new(name, store_type));
    }

    Ok(ColumnSpec::new(columns))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn translator() -> TypeTranslator {
        TypeTranslator::new().unwrap()
    }

    #[test]
    fn test_translate_identifier_type() {
        let t = translator();
        assert_eq!(t.translate("UNIQUEIDENTIFIER"), "UUID");
        assert_eq!(t.translate("uniqueidentifier"), "UUID");
        assert_eq!(t.translate(" UNIQUEIDENTIFIER "), "UUID");
        // whole-token match only
        assert_eq!(t.translate("UNIQUEIDENTIFIER[]"), "UNIQUEIDENTIFIER[]");
    }

    #[test]
    fn test_translate_integer_type() {
        let t = translator();
        assert_eq!(t.translate("INTEGER"), "BIGINT");
        assert_eq!(t.translate("integer"), "BIGINT");
        assert_eq!(t.translate("INT"), "BIGINT");
        assert_eq!(t.translate("INTEGER[]"), "BIGINT[]");
        assert_eq!(t.translate("VARCHAR(50)"), "VARCHAR(50)");
        assert_eq!(t.translate("SMALLINT"), "SMALLINT");
        assert_eq!(t.translate("INTERVAL"), "INTERVAL");
    }

    #[test]
    fn test_translate_is_idempotent() {
        let t = translator();
        for token in [
            "UNIQUEIDENTIFIER",
            "INTEGER",
            "INT",
            "BIGINT",
            "VARCHAR(128)",
            "integer[]",
            "DOUBLE PRECISION",
        ] {
            let once = t.translate(token);
            assert_eq!(t.translate(&once), once, "token {}", token);
        }
    }

    #[test]
    fn test_is_plain_identifier() {
        assert!(is_plain_identifier("globalCallID_callId"));
        assert!(is_plain_identifier("_pkid"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("1st"));
        assert!(!is_plain_identifier("name; DROP TABLE cdr"));
        assert!(!is_plain_identifier("with space"));
        assert!(!is_plain_identifier(&"a".repeat(MAX_IDENTIFIER_LEN + 1)));
    }

    #[test]
    fn test_valid_types() {
        let t = translator();
        for store_type in [
            "BIGINT",
            "VARCHAR(50)",
            "NUMERIC(10, 2)",
            "TEXT[]",
            "double precision",
            "CHARACTER VARYING(64)",
            "TIMESTAMP WITH TIME ZONE",
            "TIME WITHOUT TIME ZONE",
        ] {
            assert!(t.is_valid_type(store_type), "type {}", store_type);
        }
    }

    #[test]
    fn test_constraint_text_is_not_a_type() {
        let t = translator();
        for store_type in [
            "VARCHAR NOT NULL",
            "BIGINT PRIMARY KEY",
            "TEXT UNIQUE",
            "UUID DEFAULT gen_random_uuid()",
            "VARCHAR(50) COLLATE C",
        ] {
            assert!(!t.is_valid_type(store_type), "type {}", store_type);
        }

        let err = infer_columns(&t, "id,name", "INTEGER,VARCHAR NOT NULL", "cdr_1").unwrap_err();
        match err {
            IngestError::InvalidType {
                column, store_type, ..
            } => {
                assert_eq!(column, "name");
                assert_eq!(store_type, "VARCHAR NOT NULL");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_infer_columns_strips_quotes() {
        let spec = infer_columns(
            &translator(),
            r#""cdrRecordType","pkid","origIpAddr""#,
            "INTEGER,UNIQUEIDENTIFIER,VARCHAR(50)",
            "cdr_1",
        )
        .unwrap();

        let pairs: Vec<(&str, &str)> = spec
            .iter()
            .map(|c| (c.name.as_str(), c.store_type.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("cdrRecordType", "BIGINT"),
                ("pkid", "UUID"),
                ("origIpAddr", "VARCHAR(50)")
            ]
        );
    }

    #[test]
    fn test_infer_columns_count_mismatch() {
        let err = infer_columns(&translator(), "a,b,c", "INTEGER,INTEGER", "cmr_1").unwrap_err();
        assert!(matches!(
            err,
            IngestError::HeaderShape {
                names: 3,
                types: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_infer_columns_rejects_injection() {
        let err = infer_columns(
            &translator(),
            "id,name",
            "UUID,VARCHAR); DROP TABLE cdr; --",
            "cdr_1",
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::InvalidType { .. }));

        let err = infer_columns(&translator(), "id,na-me", "UUID,TEXT", "cdr_1").unwrap_err();
        assert!(matches!(err, IngestError::InvalidIdentifier { .. }));
    }
}
