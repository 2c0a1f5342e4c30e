//! Presence Classifier Port - 人脸检测模型抽象
//!
//! 模型异步加载，每个会话加载一次

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::attention::{DetectedSubject, Frame};

/// 检测模型错误
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to load classifier: {0}")]
    LoadFailed(String),

    #[error("Estimation failed: {0}")]
    EstimateFailed(String),
}

/// 已加载的检测模型
#[async_trait]
pub trait PresenceModelPort: Send + Sync {
    /// 检测单帧中的人脸
    async fn estimate(&self, frame: &Frame) -> Result<Vec<DetectedSubject>, ClassifierError>;
}

/// 检测模型加载器
#[async_trait]
pub trait PresenceClassifierLoaderPort: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn PresenceModelPort>, ClassifierError>;
}
