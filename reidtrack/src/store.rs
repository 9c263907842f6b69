//! Session id issuance and session record persistence

use crate::config::StorageConfig;
use crate::error::{ReidError, Result};
use crate::session::SessionRecord;
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_PREFIX: &str = "session_";
const RECORD_EXTENSION: &str = ".json";

/// Source of monotonically increasing session ids
pub trait SessionCounter: Send {
    fn next(&mut self) -> Result<u64>;
}

/// Destination for ended session records
pub trait RecordSink: Send {
    fn persist(&mut self, record: &SessionRecord) -> Result<()>;
}

/// Counter kept in a plain-text file so ids keep increasing across restarts.
/// Assumes a single writer.
#[derive(Debug, Clone)]
pub struct FileSessionCounter {
    path: PathBuf,
}

impl FileSessionCounter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value, creating the file with 0 when it does not exist yet
    pub fn read(&self) -> Result<u64> {
        if !self.path.exists() {
            self.write(0)?;
        }
        let contents = fs::read_to_string(&self.path)?;
        contents
            .trim()
            .parse::<u64>()
            .map_err(|e| ReidError::CorruptCounter(format!("{}: {}", self.path.display(), e)))
    }

    fn write(&self, value: u64) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, value.to_string())?;
        Ok(())
    }
}

impl SessionCounter for FileSessionCounter {
    fn next(&mut self) -> Result<u64> {
        let next = self.read()? + 1;
        self.write(next)?;
        Ok(next)
    }
}

/// In-process counter for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryCounter {
    current: u64,
}

impl MemoryCounter {
    pub fn starting_at(current: u64) -> Self {
        Self { current }
    }

    pub fn current(&self) -> u64 {
        self.current
    }
}

impl SessionCounter for MemoryCounter {
    fn next(&mut self) -> Result<u64> {
        self.current += 1;
        Ok(self.current)
    }
}

/// Writes one pretty-printed JSON file per record and keeps at most
/// `rolling_window` of them, deleting the oldest first.
#[derive(Debug, Clone)]
pub struct RecordStore {
    output_dir: PathBuf,
    rolling_window: usize,
    failed_evictions: usize,
}

impl RecordStore {
    pub fn new<P: Into<PathBuf>>(output_dir: P, rolling_window: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            rolling_window,
            failed_evictions: 0,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.output_dir.clone(), config.rolling_window))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Deletions that failed so far
    pub fn failed_evictions(&self) -> usize {
        self.failed_evictions
    }

    /// `session_0000042.json`
    pub fn file_name(session_id: u64) -> String {
        format!("{}{:07}{}", RECORD_PREFIX, session_id, RECORD_EXTENSION)
    }

    pub fn record_path(&self, session_id: u64) -> PathBuf {
        self.output_dir.join(Self::file_name(session_id))
    }

    /// Session id encoded in a record file name, `None` for any other file
    pub fn parse_id(path: &Path) -> Option<u64> {
        path.file_name()?
            .to_str()?
            .strip_prefix(RECORD_PREFIX)?
            .strip_suffix(RECORD_EXTENSION)?
            .parse()
            .ok()
    }

    /// Record files currently on disk, oldest first.
    ///
    /// Ordered by the parsed id, so ids past seven digits still sort after
    /// the padded ones.
    pub fn list_records(&self) -> Result<Vec<PathBuf>> {
        if !self.output_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(u64, PathBuf)> = fs::read_dir(&self.output_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| Self::parse_id(&path).map(|id| (id, path)))
            .collect();
        files.sort();
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    pub fn load(&self, session_id: u64) -> Result<SessionRecord> {
        let contents = fs::read_to_string(self.record_path(session_id))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Delete the oldest records beyond the rolling window. Failures are logged.
    pub fn enforce_retention(&mut self) -> Result<usize> {
        let files = self.list_records()?;
        if files.len() <= self.rolling_window {
            return Ok(0);
        }

        let excess = files.len() - self.rolling_window;
        let mut removed = 0;
        for path in files.iter().take(excess) {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    self.failed_evictions += 1;
                    log::warn!("Failed to remove old record {}: {}", path.display(), e);
                }
            }
        }
        log::debug!("Evicted {} of {} excess records", removed, excess);
        Ok(removed)
    }
}

impl RecordSink for RecordStore {
    fn persist(&mut self, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.record_path(record.session_id);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        log::debug!("Wrote {}", path.display());

        if let Err(e) = self.enforce_retention() {
            log::warn!("Retention pass over {} failed: {}", self.output_dir.display(), e);
        }
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSink {
    pub records: Vec<SessionRecord>,
}

impl RecordSink for MemoryRecordSink {
    fn persist(&mut self, record: &SessionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
