//! Domain types for extract ingestion

use std::path::PathBuf;
use std::time::Duration;

/// Length of the file-name prefix that selects the record type
pub const RECORD_PREFIX_LEN: usize = 3;

/// Classification of an extract file, taken from its file-name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Call detail records, files named `cdr*`
    CallDetail,
    /// Call management records, files named `cmr*`
    CallManagement,
}

impl RecordType {
    pub const ALL: [RecordType; 2] = [RecordType::CallDetail, RecordType::CallManagement];

    pub fn prefix(self) -> &'static str {
        match self {
            RecordType::CallDetail => "cdr",
            RecordType::CallManagement => "cmr",
        }
    }

    /// Classify a file name by its first three characters
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let prefix = file_name.get(..RECORD_PREFIX_LEN)?;
        Self::ALL.into_iter().find(|rt| rt.prefix() == prefix)
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// An extract file found in the scan directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_name: String,
    pub record_type: RecordType,
}

/// One inferred column: name from header line 1, store type from line 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub store_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, store_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_type: store_type.into(),
        }
    }
}

/// Ordered column list inferred from a file header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSpec {
    columns: Vec<Column>,
}

impl ColumnSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl<'a> IntoIterator for &'a ColumnSpec {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Field values of one data row; `None` is SQL NULL
pub type RowValues = Vec<Option<String>>;

/// Outcome of one committed and archived file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResult {
    pub file_name: String,
    pub table_name: String,
    pub rows_inserted: u64,
    pub table_created: bool,
    pub archived_to: PathBuf,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Sum of rows inserted across committed files
    pub total_entries: u64,
    /// Number of committed files
    pub parsed_files: usize,
    pub elapsed: Duration,
    pub results: Vec<IngestResult>,
}

impl RunSummary {
    pub fn record(&mut self, result: IngestResult) {
        self.total_entries += result.rows_inserted;
        self.parsed_files += 1;
        self.results.push(result);
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_from_file_name() {
        assert_eq!(
            RecordType::from_file_name("cdr_StandAloneCluster_01_201901011200_1"),
            Some(RecordType::CallDetail)
        );
        assert_eq!(
            RecordType::from_file_name("cmr_StandAloneCluster_01_201901011200_1"),
            Some(RecordType::CallManagement)
        );
        assert_eq!(RecordType::from_file_name("CDR_upper"), None);
        assert_eq!(RecordType::from_file_name("cd"), None);
        assert_eq!(RecordType::from_file_name("xyz_1"), None);
    }

    #[test]
    fn test_summary_accumulates() {
        let mut summary = RunSummary::default();
        for rows in [3, 0, 5] {
            summary.record(IngestResult {
                file_name: format!("cdr_{}", rows),
                table_name: "cdr".to_string(),
                rows_inserted: rows,
                table_created: false,
                archived_to: PathBuf::from("archive"),
            });
        }
        assert_eq!(summary.total_entries, 8);
        assert_eq!(summary.parsed_files, 3);
    }
}
