//! Interview Session - 会话编排
//!
//! - orchestrator: 会话生命周期与终止收尾
//! - voice_session / frame_loop / clock: 编排器独占的后台资源
//! - feedback_pipeline: 对话记录到反馈记录

mod assistant;
mod attention_monitor;
mod clock;
mod feedback_pipeline;
mod frame_loop;
mod handle;
mod orchestrator;
mod services;
mod settings;
mod state;
mod voice_session;

pub use assistant::{
    AssistantTemplate, DEFAULT_ASSISTANT_NAME, DEFAULT_FIRST_MESSAGE, DEFAULT_SYSTEM_PROMPT,
};
pub use attention_monitor::{AttentionMonitor, PresenceClassifier};
pub use clock::start_clock;
pub use feedback_pipeline::{FeedbackOutcome, FeedbackPipeline};
pub use frame_loop::{start_frame_loop, FrameOutcome};
pub use handle::LoopHandle;
pub use orchestrator::{SessionDependencies, SessionOrchestrator};
pub use services::SessionServices;
pub use settings::SessionSettings;
pub use state::{PresenceMonitoring, ResourceReport, SessionSnapshot, SessionState};
pub use voice_session::VoiceSession;
