//! Append-only feedback log.
//!
//! One JSON object per line. Each append holds the in-process mutex and an
//! advisory exclusive lock on the log file across write + sync, so writers
//! in this process and in other processes sharing the path never interleave.
//! The OS drops the file lock if the holder dies.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{FeedbackOutcome, FeedbackRecord};

#[derive(Error, Debug)]
pub enum FeedbackStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

pub struct FeedbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one feedback record, stamped with the current UTC time.
    pub fn append(
        &self,
        request_id: &str,
        edits: &str,
        outcome: FeedbackOutcome,
        notes: Option<&str>,
    ) -> Result<FeedbackRecord, FeedbackStoreError> {
        let record = FeedbackRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: request_id.to_string(),
            edits: edits.to_string(),
            outcome,
            notes: notes.map(str::to_string),
        };
        self.append_record(&record)?;
        tracing::info!(request_id, outcome = %outcome, "Stored feedback");
        Ok(record)
    }

    pub fn append_record(&self, record: &FeedbackRecord) -> Result<(), FeedbackStoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| FeedbackStoreError::LockPoisoned)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut file_lock = fd_lock::RwLock::new(file);
        let mut locked = file_lock.write()?;
        locked.write_all(&line)?;
        locked.sync_data()?;
        Ok(())
    }

    /// Number of lines in the log; 0 when the log is missing or unreadable.
    pub fn count(&self) -> usize {
        match fs::File::open(&self.path) {
            Ok(file) => BufReader::new(file).lines().map_while(Result::ok).count(),
            Err(_) => 0,
        }
    }

    /// All stored records, skipping lines that fail to parse.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<FeedbackRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed feedback line"),
            }
        }
        Ok(records)
    }
}
