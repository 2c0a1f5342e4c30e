//! Session Registry Port - 活动会话登记
//!
//! 宿主挂载会话视图时登记编排器，卸载时移除

use std::sync::Arc;
use thiserror::Error;

use crate::application::session::SessionOrchestrator;

/// Session Registry 错误
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),
}

/// Session Registry Port
pub trait SessionRegistryPort: Send + Sync {
    /// 登记会话
    fn register(&self, orchestrator: Arc<SessionOrchestrator>) -> Result<(), RegistryError>;

    /// 获取会话
    fn get(&self, id: &str) -> Result<Arc<SessionOrchestrator>, RegistryError>;

    /// 移除会话
    fn remove(&self, id: &str) -> Result<Arc<SessionOrchestrator>, RegistryError>;

    /// 检查会话是否已登记
    fn is_registered(&self, id: &str) -> bool;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
