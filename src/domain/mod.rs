//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Session Context: 会话输入与对话记录
//! - Attention Context: 摄像头在场/注意力判定
//! - Feedback Context: 反馈报告与模型输出解析
//!
//! 以及页面焦点监控 (focus)

pub mod attention;
pub mod feedback;
pub mod focus;
pub mod session;
