//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（VoiceChannel、Camera、PresenceClassifier、FeedbackSynthesis 等）
//! - session: 会话编排器及其后台资源
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod session;

// Re-exports
pub use commands::{
    handlers::{
        BeginInterviewHandler, CloseSessionHandler, EndInterviewHandler, ReportVisibilityHandler,
    },
    BeginInterviewCommand, BeginInterviewResponse, CloseSessionCommand, CloseSessionResponse,
    EndInterviewCommand, EndInterviewResponse, ReportVisibilityCommand, ReportVisibilityResponse,
};

pub use error::ApplicationError;

pub use queries::{
    handlers::{GetSessionStateHandler, ListSessionsHandler},
    GetSessionStateQuery, ListSessionsQuery,
};

pub use session::{
    SessionDependencies, SessionOrchestrator, SessionServices, SessionSettings, SessionSnapshot,
};
