//! 会话可变状态与只读快照

use serde::{Deserialize, Serialize};

use crate::domain::attention::AttentionReading;
use crate::domain::focus::FocusWatcher;
use crate::domain::session::{format_elapsed, SessionId, SessionPhase, TerminationReason, Transcript};

/// 摄像头分析可用性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PresenceMonitoring {
    Initializing,
    Running,
    /// 摄像头或模型不可用，会话降级为纯语音
    Unavailable(String),
}

/// 编排器内部状态
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub elapsed_seconds: u64,
    pub transcript: Transcript,
    pub focus: FocusWatcher,
    pub attention: Option<AttentionReading>,
    pub presence: PresenceMonitoring,
    pub remote_speaking: bool,
    pub termination: Option<TerminationReason>,
    pub consecutive_frame_errors: u32,
}

impl SessionState {
    pub fn new(focus_violation_limit: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            elapsed_seconds: 0,
            transcript: Transcript::new(),
            focus: FocusWatcher::new(focus_violation_limit),
            attention: None,
            presence: PresenceMonitoring::Initializing,
            remote_speaking: false,
            termination: None,
            consecutive_frame_errors: 0,
        }
    }
}

/// 供界面展示的快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub elapsed_seconds: u64,
    pub elapsed_display: String,
    pub transcript: Transcript,
    pub focus_violation_count: u32,
    pub attention: Option<AttentionReading>,
    pub presence: PresenceMonitoring,
    pub remote_speaking: bool,
    pub stop_requested: bool,
    pub termination_reason: Option<TerminationReason>,
    pub feedback_dispatched: bool,
}

impl SessionSnapshot {
    pub(crate) fn capture(
        session_id: &SessionId,
        state: &SessionState,
        stop_requested: bool,
        feedback_dispatched: bool,
    ) -> Self {
        Self {
            session_id: session_id.clone(),
            phase: state.phase,
            elapsed_seconds: state.elapsed_seconds,
            elapsed_display: format_elapsed(state.elapsed_seconds),
            transcript: state.transcript.clone(),
            focus_violation_count: state.focus.violations(),
            attention: state.attention.clone(),
            presence: state.presence.clone(),
            remote_speaking: state.remote_speaking,
            stop_requested,
            termination_reason: state.termination.clone(),
            feedback_dispatched,
        }
    }
}

/// 资源占用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub camera_stream_held: bool,
    pub frame_loop_running: bool,
    pub clock_running: bool,
    pub voice_connected: bool,
    pub voice_events_running: bool,
    pub visibility_listener_running: bool,
}

impl ResourceReport {
    pub fn all_released(&self) -> bool {
        !(self.camera_stream_held
            || self.frame_loop_running
            || self.clock_running
            || self.voice_connected
            || self.voice_events_running
            || self.visibility_listener_running)
    }
}
