//! Interview Commands - 面试会话命令

use crate::domain::focus::FocusNotice;
use crate::domain::session::{SessionContext, SessionPhase};

/// 开始面试命令 - 创建并登记编排器
#[derive(Debug, Clone)]
pub struct BeginInterviewCommand {
    pub context: SessionContext,
}

/// 开始面试响应
#[derive(Debug, Clone)]
pub struct BeginInterviewResponse {
    pub session_id: String,
    pub phase: SessionPhase,
}

/// 挂断命令
#[derive(Debug, Clone)]
pub struct EndInterviewCommand {
    pub session_id: String,
}

/// 挂断响应
#[derive(Debug, Clone)]
pub struct EndInterviewResponse {
    pub session_id: String,
    /// 本次请求是否触发了终止（重复挂断为 false）
    pub accepted: bool,
}

/// 页面可见性变化命令
#[derive(Debug, Clone)]
pub struct ReportVisibilityCommand {
    pub session_id: String,
    pub hidden: bool,
}

/// 页面可见性变化响应
#[derive(Debug, Clone)]
pub struct ReportVisibilityResponse {
    pub session_id: String,
    /// 会话不在进行中时为 None
    pub notice: Option<FocusNotice>,
    pub violations: u32,
}

/// 关闭会话命令 - 宿主卸载会话视图
#[derive(Debug, Clone)]
pub struct CloseSessionCommand {
    pub session_id: String,
}

/// 关闭会话响应
#[derive(Debug, Clone)]
pub struct CloseSessionResponse {
    pub session_id: String,
    /// 关闭时是否仍需终止会话
    pub terminated: bool,
}
