//! Session log storage for SysSentinel
//!
//! A JSONL file sink: one file per run, one event per line. This is a
//! sample consumer of the event stream, not detector state - nothing is
//! ever read back.

use crate::dispatch::EventSink;
use crate::error::{CoreError, StorageError};
use crate::event::Event;
use chrono::Local;
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trait for event storage implementations
pub trait EventStorage: Send {
    /// Write an event to storage
    fn write_event(&mut self, event: &Event) -> Result<(), CoreError>;
    /// Flush buffered data to disk
    fn flush(&mut self) -> Result<(), CoreError>;
    /// Get the storage file path
    fn path(&self) -> &PathBuf;
}

/// Per-run JSONL event log.
///
/// File name: `session-{timestamp}-{short uuid}.jsonl`
pub struct SessionLog {
    session_id: String,
    file_path: PathBuf,
    writer: BufWriter<File>,
    event_count: usize,
}

impl SessionLog {
    /// Create a new session log under `log_dir`, creating the directory
    /// if needed
    pub fn new(log_dir: &Path) -> Result<Self, CoreError> {
        if !log_dir.exists() {
            std::fs::create_dir_all(log_dir).map_err(|e| StorageError::CreateDir {
                path: log_dir.to_path_buf(),
                source: e,
            })?;
        }

        let session_id = format!(
            "{}-{}",
            Local::now().format("%Y%m%d-%H%M%S"),
            &uuid::Uuid::new_v4().to_string()[..8]
        );
        let file_path = log_dir.join(format!("session-{}.jsonl", session_id));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .map_err(|e| StorageError::OpenFile {
                path: file_path.clone(),
                source: e,
            })?;

        Ok(Self {
            session_id,
            file_path,
            writer: BufWriter::new(file),
            event_count: 0,
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Number of events written so far
    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

impl EventStorage for SessionLog {
    fn write_event(&mut self, event: &Event) -> Result<(), CoreError> {
        let json = serde_json::to_string(event).map_err(StorageError::Serialize)?;
        writeln!(self.writer, "{}", json).map_err(StorageError::Write)?;
        self.event_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        self.writer.flush().map_err(StorageError::Flush)?;
        Ok(())
    }

    fn path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl EventSink for SessionLog {
    fn accept(&mut self, event: Event) {
        // Keep the file current for tailing; failures stay local to the sink.
        let result = self
            .write_event(&event)
            .and_then(|_| EventStorage::flush(self));
        if let Err(e) = result {
            warn!("session log write failed: {}", e);
        }
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Remove session logs older than `retention_days`, returning how many
/// were deleted. A retention of 0 means no limit.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> Result<usize, CoreError> {
    if retention_days == 0 || !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let mut removed = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("session-") || !name.ends_with(".jsonl") {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        if let Some(age) = age {
            if age > cutoff && std::fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
    }

    Ok(removed)
}
