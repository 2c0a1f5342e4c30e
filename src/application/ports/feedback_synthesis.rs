//! Feedback Synthesis Port - 反馈合成服务抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::feedback::{FeedbackError, FeedbackReport};
use crate::domain::session::{SessionId, Transcript};

/// 反馈合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub session_id: SessionId,
    pub transcript: Transcript,
    pub job_position: String,
    pub job_description: Option<String>,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// 原始评分 payload，原样持久化
    pub payload: serde_json::Value,
    pub report: FeedbackReport,
}

/// Feedback Synthesis Port
#[async_trait]
pub trait FeedbackSynthesisPort: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
