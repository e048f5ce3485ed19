//! Ingestion driver
//!
//! One run lists the scan directory once and processes the recognized
//! extract files strictly one after another:
//!
//! 1. Classify: skip directories, names with an extension and unknown prefixes
//! 2. Parse: infer the schema, encode rows, build statements
//! 3. Begin, create, insert, commit (rollback and abort on any failure)
//! 4. Archive the committed file
//! 5. Accumulate totals
//!
//! Any error ends the run. Files committed before the failure stay committed
//! and archived; the failing file and everything after it stay in place.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::archive::Archiver;
use super::models::{DiscoveredFile, IngestResult, RecordType, RunSummary};
use super::parser::{ExtractParser, LoadPlan};
use super::store::StoreSession;
use crate::config::Config;
use crate::error::{IngestError, Result, StatementStage};

/// Classify a directory entry, returning its record type if it should be loaded
pub fn classify(file_name: &str, is_dir: bool) -> Option<RecordType> {
    if is_dir || Path::new(file_name).extension().is_some() {
        return None;
    }
    RecordType::from_file_name(file_name)
}

/// List the extract files in `scan_path`, ordered by file name
pub async fn discover(scan_path: &Path) -> Result<Vec<DiscoveredFile>> {
    let mut entries = tokio::fs::read_dir(scan_path)
        .await
        .map_err(|e| IngestError::filesystem(scan_path, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| IngestError::filesystem(scan_path, e))?
    {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let metadata = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| IngestError::filesystem(&path, e))?;

        match classify(&file_name, metadata.is_dir()) {
            Some(record_type) => files.push(DiscoveredFile {
                path,
                file_name,
                record_type,
            }),
            None => debug!(file = %file_name, "Skipping entry"),
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Sequential loader over one store session
pub struct Ingestor<S> {
    config: Config,
    session: S,
    parser: ExtractParser,
    archiver: Archiver,
}

impl<S: StoreSession> Ingestor<S> {
    pub fn new(config: Config, session: S) -> Result<Self> {
        let archiver = Archiver::new(config.archive_root());
        Ok(Self {
            config,
            session,
            parser: ExtractParser::new()?,
            archiver,
        })
    }

    /// Process every extract file, then release the session.
    pub async fn run(mut self) -> Result<RunSummary> {
        let started = Instant::now();
        info!(scan_path = %self.config.scan_path.display(), "Scanning for extract files");

        let outcome = self.process_all(started).await;

        if let Err(e) = self.session.close().await {
            warn!(error = %e, "Failed to close store session");
        }

        let mut summary = outcome?;
        summary.elapsed = started.elapsed();

        info!(
            total_entries = summary.total_entries,
            parsed_files = summary.parsed_files,
            elapsed_secs = summary.elapsed_secs(),
            "Inserted {} entries from {} files in {:.3} seconds",
            summary.total_entries,
            summary.parsed_files,
            summary.elapsed_secs()
        );
        info!("Done");

        Ok(summary)
    }

    async fn process_all(&mut self, started: Instant) -> Result<RunSummary> {
        let files = discover(&self.config.scan_path).await?;
        debug!(count = files.len(), "Discovered extract files");

        let mut summary = RunSummary::default();
        for file in &files {
            let result = self.process_file(file).await?;
            if result.table_created {
                info!(table = %result.table_name, "Created table {}", result.table_name);
            }
            let rows = result.rows_inserted;
            summary.record(result);

            info!(
                file = %file.file_name,
                rows,
                elapsed_secs = started.elapsed().as_secs_f64(),
                total_entries = summary.total_entries,
                "Inserted {} entries from {}",
                rows,
                file.file_name
            );
        }

        Ok(summary)
    }

    async fn process_file(&mut self, file: &DiscoveredFile) -> Result<IngestResult> {
        let content = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|e| IngestError::filesystem(&file.path, e))?;

        let table = self.config.table_for(file.record_type).to_string();
        let plan = self
            .parser
            .parse(&content, &file.file_name, &table)
            .inspect_err(|e| error!(file = %file.file_name, error = %e, "Failed to parse extract file"))?;

        let (table_created, rows_inserted) = self.apply(&plan, &file.file_name).await?;

        let archived_to = self
            .archiver
            .archive(&file.path)
            .await
            .inspect_err(|e| error!(file = %file.file_name, error = %e, "Failed to archive file"))?;

        Ok(IngestResult {
            file_name: file.file_name.clone(),
            table_name: table,
            rows_inserted,
            table_created,
            archived_to,
        })
    }

    /// Run the plan inside one transaction, rolling back on failure
    async fn apply(&mut self, plan: &LoadPlan, file_name: &str) -> Result<(bool, u64)> {
        self.session
            .begin()
            .await
            .map_err(|e| IngestError::statement(file_name, StatementStage::Begin, e))?;

        match self.execute(plan).await {
            Ok(outcome) => Ok(outcome),
            Err((stage, source)) => {
                error!(
                    file = %file_name,
                    stage = %stage,
                    error = %source,
                    "Unable to insert content from file: {}",
                    file_name
                );
                match stage {
                    StatementStage::Create => error!(statement = %plan.create, "Failed statement"),
                    StatementStage::Insert => {
                        debug!(statement = %plan.insert.literal_sql(), "Failed statement")
                    },
                    StatementStage::Begin | StatementStage::Commit => {},
                }

                if let Err(e) = self.session.rollback().await {
                    error!(file = %file_name, error = %e, "Rollback failed");
                }
                Err(IngestError::statement(file_name, stage, source))
            },
        }
    }

    async fn execute(
        &mut self,
        plan: &LoadPlan,
    ) -> std::result::Result<(bool, u64), (StatementStage, sqlx::Error)> {
        let created = self
            .session
            .create_table(&plan.create)
            .await
            .map_err(|e| (StatementStage::Create, e))?;

        let rows = if plan.insert.is_empty() {
            0
        } else {
            self.session
                .insert(&plan.insert)
                .await
                .map_err(|e| (StatementStage::Insert, e))?
        };

        self.session
            .commit()
            .await
            .map_err(|e| (StatementStage::Commit, e))?;

        Ok((created, rows))
    }
}
