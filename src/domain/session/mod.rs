//! Session Context - 面试会话限界上下文
//!
//! 职责:
//! - 会话输入（候选人、岗位、题目）
//! - 对话记录（transcript）
//! - 会话阶段与终止原因
//! - 计时显示格式

mod context;
mod errors;
mod phase;
mod transcript;

pub use context::{InterviewQuestion, SessionContext, SessionId};
pub use errors::SessionContextError;
pub use phase::{SessionPhase, TerminationReason};
pub use transcript::{format_elapsed, SpeakerRole, Transcript, Utterance};
