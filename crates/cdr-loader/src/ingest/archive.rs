//! Date-partitioned archive for committed extract files
//!
//! Files move to `<archive root>/<YYYY>/<MM>/<file name>`, where the date is
//! the wall-clock date at the moment of archiving.

use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Moves processed files under an archive root
#[derive(Debug, Clone)]
pub struct Archiver {
    root: PathBuf,
}

impl Archiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<YYYY>/<MM>` for `date`
    pub fn partition_for(&self, date: &impl Datelike) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }

    /// Archive `path` under today's partition
    pub async fn archive(&self, path: &Path) -> Result<PathBuf> {
        self.archive_on(path, &Local::now()).await
    }

    /// Archive `path` under the partition for `date`
    pub async fn archive_on(&self, path: &Path, date: &impl Datelike) -> Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            IngestError::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

        let partition = self.partition_for(date);
        tokio::fs::create_dir_all(&partition)
            .await
            .map_err(|e| IngestError::filesystem(&partition, e))?;

        let destination = partition.join(file_name);
        tokio::fs::rename(path, &destination)
            .await
            .map_err(|e| IngestError::filesystem(path, e))?;

        debug!(
            from = %path.display(),
            to = %destination.display(),
            "Archived file"
        );
        Ok(destination)
    }
}
