//! Append-only audit trail of tool calls, one JSON object per line.
//!
//! The file is opened per append so that [`AuditLog::rotate`] can move it
//! away without coordinating with open handles.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AideError, AideResult};
use crate::state::cleanup::backup_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: String,
    pub level: AuditLevel,
    pub operation: String,
    pub request: Value,
    pub result: Value,
}

pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Errors are returned for callers that care;
    /// tool handlers use [`AuditLog::record`] instead.
    pub fn append(
        &self,
        level: AuditLevel,
        operation: &str,
        request: &Value,
        result: &Value,
    ) -> AideResult<AuditEntry> {
        let entry = AuditEntry {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            level,
            operation: operation.to_string(),
            request: request.clone(),
            result: result.clone(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AideError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AideError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| AideError::io(&self.path, e))?;
        Ok(entry)
    }

    /// Append, logging a warning on failure instead of returning it.
    pub fn record(&self, level: AuditLevel, operation: &str, request: &Value, result: &Value) {
        if let Err(err) = self.append(level, operation, request, result) {
            tracing::warn!(operation, error = %err, "failed to write audit entry");
        }
    }

    /// Entries currently in the log, oldest first. Malformed lines are skipped.
    pub fn entries(&self) -> AideResult<Vec<AuditEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AideError::io(&self.path, e)),
        };
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }

    /// Move the log to `backups_dir/audit-<ts>.jsonl` and start an empty one.
    /// Returns the backup path, or `None` when there was no log to move.
    pub fn rotate(&self, backups_dir: &Path) -> AideResult<Option<PathBuf>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.path.exists() {
            return Ok(None);
        }
        fs::create_dir_all(backups_dir).map_err(|e| AideError::io(backups_dir, e))?;
        let backup = backup_path(backups_dir, "audit", "jsonl");
        fs::rename(&self.path, &backup).map_err(|e| AideError::io(&self.path, e))?;
        fs::write(&self.path, b"").map_err(|e| AideError::io(&self.path, e))?;
        tracing::info!(backup = %backup.display(), "audit log rotated");
        Ok(Some(backup))
    }
}
