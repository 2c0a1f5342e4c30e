//! Session Context - 生命周期

use serde::{Deserialize, Serialize};

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// 已创建，尚未开始
    Idle,
    /// 正在建立语音通话
    Connecting,
    /// 通话进行中
    Active,
    /// 正在执行收尾流程
    Stopping,
    /// 已完成
    Completed,
    /// 启动失败
    Failed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Active => "active",
            SessionPhase::Stopping => "stopping",
            SessionPhase::Completed => "completed",
            SessionPhase::Failed => "failed",
        }
    }

    /// 对话记录与摄像头分析只在这两个阶段生效
    pub fn is_live(&self) -> bool {
        matches!(self, SessionPhase::Connecting | SessionPhase::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 终止原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum TerminationReason {
    /// 候选人点击挂断
    Manual,
    /// 语音供应商结束通话
    RemoteEnded,
    /// 切换页面次数超限
    FocusViolationsExceeded,
    /// 摄像头或检测模型运行期故障
    DeviceError(String),
    /// 候选人口头要求结束
    SpokenEndRequest,
    /// 启动阶段无法建立通话
    SetupFailed(String),
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Manual => "manual",
            TerminationReason::RemoteEnded => "remote-ended",
            TerminationReason::FocusViolationsExceeded => "focus-violations-exceeded",
            TerminationReason::DeviceError(_) => "device-error",
            TerminationReason::SpokenEndRequest => "spoken-end-request",
            TerminationReason::SetupFailed(_) => "setup-failed",
        }
    }

    /// 收尾完成后进入的阶段
    pub fn final_phase(&self) -> SessionPhase {
        match self {
            TerminationReason::SetupFailed(_) => SessionPhase::Failed,
            _ => SessionPhase::Completed,
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::DeviceError(detail) | TerminationReason::SetupFailed(detail) => {
                write!(f, "{}: {}", self.as_str(), detail)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(SessionPhase::Connecting.is_live());
        assert!(SessionPhase::Active.is_live());
        assert!(!SessionPhase::Stopping.is_live());
        assert!(SessionPhase::Failed.is_terminal());
        assert!(!SessionPhase::Idle.is_terminal());
    }

    #[test]
    fn test_final_phase() {
        assert_eq!(TerminationReason::Manual.final_phase(), SessionPhase::Completed);
        assert_eq!(
            TerminationReason::SetupFailed("no mic".into()).final_phase(),
            SessionPhase::Failed
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(TerminationReason::RemoteEnded.to_string(), "remote-ended");
        assert_eq!(
            TerminationReason::DeviceError("camera lost".into()).to_string(),
            "device-error: camera lost"
        );
    }
}
