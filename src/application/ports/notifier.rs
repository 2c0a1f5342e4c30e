//! Session Notifier Port - 向宿主界面推送提示与状态

use serde::{Deserialize, Serialize};

use crate::domain::session::{SessionId, SessionPhase};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 可关闭的界面提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Session Notifier Port
///
/// 所有方法都不能阻塞，调用方可能处于收尾流程中
pub trait SessionNotifierPort: Send + Sync {
    /// 推送提示
    fn notice(&self, session_id: &SessionId, notice: Notice);

    /// 会话阶段变化
    fn phase_changed(&self, session_id: &SessionId, phase: SessionPhase);

    /// 会话结束，宿主应跳转到完成页
    fn completed(&self, session_id: &SessionId);

    /// 会话已关闭且不会再有通知，可释放该会话的通道
    fn release(&self, _session_id: &SessionId) {}
}
