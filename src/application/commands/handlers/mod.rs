//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod interview_command_handlers;

pub use interview_command_handlers::*;
