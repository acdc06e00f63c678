//! File-backed audit log.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::trace;

use crate::{MemoryError, MemoryResult};

/// Line written after every record.
pub const RECORD_SEPARATOR: &str = "---";

/// Trait implemented by audit logs.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one raw completion followed by the separator line.
    async fn append(&self, raw: &str) -> MemoryResult<()>;

    /// Returns every record, oldest first.
    async fn records(&self) -> MemoryResult<Vec<String>>;
}

/// Audit log appending to a plain text file.
///
/// Appends are serialized through a mutex so concurrent generations never
/// interleave their records.
#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    file: Mutex<fs::File>,
}

impl FileAuditLog {
    /// Opens (or creates) the log file at the provided path.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Io`] if the parent directory or file cannot be
    /// created.
    pub async fn open(path: impl Into<PathBuf>) -> MemoryResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| MemoryError::io(parent, err))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|err| MemoryError::io(&path, err))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the underlying path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditLog for FileAuditLog {
    async fn append(&self, raw: &str) -> MemoryResult<()> {
        let record = format_record(raw);
        let mut guard = self.file.lock().await;
        guard
            .write_all(record.as_bytes())
            .await
            .map_err(|err| MemoryError::io(&self.path, err))?;
        guard
            .flush()
            .await
            .map_err(|err| MemoryError::io(&self.path, err))?;
        trace!(path = %self.path.display(), bytes = record.len(), "audit record appended");
        Ok(())
    }

    async fn records(&self) -> MemoryResult<Vec<String>> {
        let _guard = self.file.lock().await;
        let data = fs::read(&self.path)
            .await
            .map_err(|err| MemoryError::io(&self.path, err))?;
        let text = String::from_utf8(data).map_err(|_| MemoryError::Encoding {
            path: self.path.clone(),
        })?;
        Ok(parse_records(&text))
    }
}

pub(crate) fn format_record(raw: &str) -> String {
    format!("{raw}\n{RECORD_SEPARATOR}\n")
}

/// Splits log text into records. A record that itself contains a separator
/// line is indistinguishable from two records.
pub(crate) fn parse_records(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let delimiter = format!("\n{RECORD_SEPARATOR}\n");
    let body = text.strip_suffix(delimiter.as_str()).unwrap_or(text);
    body.split(delimiter.as_str()).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("chatter-audit-{}", Uuid::new_v4()));
        path.push("responses.txt");
        path
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let path = temp_path();
        let log = FileAuditLog::open(&path).await.unwrap();

        for raw in ["Me: \"hi\"\nBot: \"hey\"", "second", ""] {
            log.append(raw).await.unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Me: \"hi\"\nBot: \"hey\"\n---\nsecond\n---\n\n---\n");

        let records = log.records().await.unwrap();
        assert_eq!(records, vec!["Me: \"hi\"\nBot: \"hey\"", "second", ""]);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn reopening_appends_instead_of_truncating() {
        let path = temp_path();
        FileAuditLog::open(&path)
            .await
            .unwrap()
            .append("one")
            .await
            .unwrap();

        let log = FileAuditLog::open(&path).await.unwrap();
        log.append("two").await.unwrap();
        assert_eq!(log.records().await.unwrap(), vec!["one", "two"]);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn empty_log_has_no_records() {
        assert!(parse_records("").is_empty());
    }
}
