//! In-process audit log used by tests and offline runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::journal::{AuditLog, format_record, parse_records};
use crate::MemoryResult;

/// Audit log kept in memory, using the same text encoding as the file log.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    buffer: Mutex<String>,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw encoded contents.
    pub async fn contents(&self) -> String {
        self.buffer.lock().await.clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, raw: &str) -> MemoryResult<()> {
        self.buffer.lock().await.push_str(&format_record(raw));
        Ok(())
    }

    async fn records(&self) -> MemoryResult<Vec<String>> {
        Ok(parse_records(&self.buffer.lock().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_records_in_order() {
        let log = MemoryAuditLog::new();
        log.append("a").await.unwrap();
        log.append("b\nc").await.unwrap();

        assert_eq!(log.contents().await, "a\n---\nb\nc\n---\n");
        assert_eq!(log.records().await.unwrap(), vec!["a", "b\nc"]);
    }
}
