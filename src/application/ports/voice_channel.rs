//! Voice Channel Port - 对话式语音通话抽象
//!
//! 定义语音供应商的抽象接口，传输协议由具体适配器决定

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::session::{SessionId, Utterance};

/// 语音通话错误
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Failed to start call: {0}")]
    StartFailed(String),

    #[error("Failed to stop call: {0}")]
    StopFailed(String),

    #[error("Voice session already closed")]
    Closed,

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// 供应商推送的事件
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    /// 通话已建立
    Started,
    /// 累计对话快照（非增量）
    Transcript(Vec<Utterance>),
    /// 远端（AI 面试官）是否正在说话
    SpeakingChanged(bool),
    /// 通话结束
    Ended,
    /// 供应商非致命错误
    Error(String),
}

/// 事件发送端
pub type VoiceEventSender = mpsc::UnboundedSender<VoiceEvent>;

/// 供应商/模型选择
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    pub provider: String,
    pub model: String,
}

/// 语音转写配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriberSelection {
    pub provider: String,
    pub model: String,
    pub language: String,
}

/// 语音合成配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub provider: String,
    pub voice_id: String,
}

/// 通话配置（由 SessionContext 通过模板替换生成）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub name: String,
    pub first_message: String,
    pub transcriber: TranscriberSelection,
    pub voice: VoiceSelection,
    pub model: ProviderSelection,
    pub system_prompt: String,
}

/// Voice Channel Port
///
/// 通话开始后，事件通过 `events` 推送，直到供应商结束或调用 `stop`
#[async_trait]
pub trait VoiceChannelPort: Send + Sync {
    /// 开始通话
    async fn start(&self, config: AssistantConfig, events: VoiceEventSender) -> Result<(), VoiceError>;

    /// 结束通话
    ///
    /// 实现可能在内部同步推送 `Ended` 事件
    async fn stop(&self) -> Result<(), VoiceError>;
}

/// 每个会话创建独立的供应商句柄
pub trait VoiceChannelFactoryPort: Send + Sync {
    fn create(&self, session_id: &SessionId) -> Arc<dyn VoiceChannelPort>;
}
