use std::fs::{self, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ArchiveConfig;
use crate::store::DailySummary;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to write archive file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

pub trait SummaryArchive: Send + Sync {
    /// When `false` expired summaries are deleted without being read.
    fn is_enabled(&self) -> bool {
        true
    }

    fn export(
        &self,
        cutoff: NaiveDate,
        summaries: &[DailySummary],
    ) -> impl Future<Output = Result<(), ArchiveError>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoArchive;

impl SummaryArchive for NoArchive {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn export(
        &self,
        _cutoff: NaiveDate,
        _summaries: &[DailySummary],
    ) -> Result<(), ArchiveError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonlArchive {
    dir: PathBuf,
}

impl JsonlArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_for(&self, cutoff: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("summaries-{}.jsonl", cutoff.format("%Y-%m-%d")))
    }
}

impl SummaryArchive for JsonlArchive {
    async fn export(
        &self,
        cutoff: NaiveDate,
        summaries: &[DailySummary],
    ) -> Result<(), ArchiveError> {
        if summaries.is_empty() {
            return Ok(());
        }

        let path = self.file_for(cutoff);
        append_json_lines(&self.dir, &path, summaries).map_err(|source| ArchiveError::Write {
            path: path.display().to_string(),
            source,
        })?;

        log::info!(
            "summary_archive_exported path={} records={}",
            path.display(),
            summaries.len()
        );
        Ok(())
    }
}

fn append_json_lines(
    dir: &Path,
    path: &Path,
    summaries: &[DailySummary],
) -> Result<(), std::io::Error> {
    fs::create_dir_all(dir)?;
    let mut buffer = Vec::new();
    for summary in summaries {
        serde_json::to_writer(&mut buffer, summary).map_err(std::io::Error::other)?;
        buffer.push(b'\n');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&buffer)?;
    file.sync_data()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub enum ActiveArchive {
    Discard(NoArchive),
    Jsonl(JsonlArchive),
}

impl ActiveArchive {
    pub fn from_config(config: &ArchiveConfig) -> Self {
        if config.enabled {
            Self::Jsonl(JsonlArchive::new(&config.dir))
        } else {
            Self::Discard(NoArchive)
        }
    }
}

impl SummaryArchive for ActiveArchive {
    fn is_enabled(&self) -> bool {
        match self {
            ActiveArchive::Discard(archive) => archive.is_enabled(),
            ActiveArchive::Jsonl(archive) => archive.is_enabled(),
        }
    }

    async fn export(
        &self,
        cutoff: NaiveDate,
        summaries: &[DailySummary],
    ) -> Result<(), ArchiveError> {
        match self {
            ActiveArchive::Discard(archive) => archive.export(cutoff, summaries).await,
            ActiveArchive::Jsonl(archive) => archive.export(cutoff, summaries).await,
        }
    }
}
