//! Session Store Port - 反馈记录持久化
//!
//! 只追加写入，每个会话一条记录；本模块不需要读取路径

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::session::{SessionContext, SessionId};

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Feedback already recorded for session: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 反馈记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub session_id: SessionId,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_position: String,
    pub feedback: serde_json::Value,
    /// 由招聘方人工确认，写入时总是 false
    pub recommended: bool,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(context: &SessionContext, feedback: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: context.session_id.clone(),
            candidate_name: context.candidate_name.clone(),
            candidate_email: context.candidate_email.clone(),
            job_position: context.job_position.clone(),
            feedback,
            recommended: false,
            created_at: Utc::now(),
        }
    }
}

/// Session Store Port
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// 追加一条反馈记录
    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<(), StoreError>;
}
