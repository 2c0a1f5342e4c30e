//! In-Memory Feedback Store Implementation

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::ports::{FeedbackRecord, SessionStorePort, StoreError};

/// 内存反馈存储，每个会话一条
pub struct InMemoryFeedbackStore {
    records: Mutex<Vec<FeedbackRecord>>,
    fail_writes: AtomicBool,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 让后续写入全部失败
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryFeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorePort for InMemoryFeedbackStore {
    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("write rejected".to_string()));
        }

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.iter().any(|r| r.session_id == record.session_id) {
            return Err(StoreError::AlreadyExists(record.session_id.to_string()));
        }
        records.push(record.clone());
        tracing::debug!(session_id = %record.session_id, "Feedback stored in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{SessionContext, SessionId};
    use serde_json::json;

    fn record(id: &str) -> FeedbackRecord {
        let context = SessionContext::new(
            SessionId::new(id).unwrap(),
            "Ken",
            "ken@example.com",
            "Systems Programmer",
            vec![],
        );
        FeedbackRecord::new(&context, json!({"summary": "ok"}))
    }

    #[tokio::test]
    async fn test_one_record_per_session() {
        let store = InMemoryFeedbackStore::new();
        store.append_feedback(&record("iv-1")).await.unwrap();
        assert!(matches!(
            store.append_feedback(&record("iv-1")).await,
            Err(StoreError::AlreadyExists(_))
        ));
        store.append_feedback(&record("iv-2")).await.unwrap();
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = InMemoryFeedbackStore::new();
        store.fail_writes(true);
        assert!(store.append_feedback(&record("iv-1")).await.is_err());
        assert!(store.records().is_empty());
    }
}
