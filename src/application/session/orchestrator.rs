//! Session Orchestrator - 单次面试会话的生命周期编排
//!
//! 同时驱动语音通话、摄像头帧分析、页面焦点监控和计时器。
//!
//! 所有终止触发（挂断、远端结束、焦点违规、设备故障、口头结束）都经过
//! `request_termination`：第一步对 `stop_requested` 做原子 test-and-set，
//! 之后到达的触发直接返回。收尾流程按固定顺序执行且每一步相互隔离：
//! 停止语音 → 取消帧循环 → 释放摄像头 → 清除计时器 → 反馈流水线 → Completed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{mpsc, watch};

use super::{
    start_clock, start_frame_loop, AttentionMonitor, FeedbackPipeline, FrameOutcome, LoopHandle,
    PresenceClassifier, PresenceMonitoring, ResourceReport, SessionSettings, SessionSnapshot,
    SessionState, VoiceSession,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    CameraPort, FeedbackSynthesisPort, MediaStreamPort, Notice, PresenceClassifierLoaderPort,
    SessionNotifierPort, SessionStorePort, VoiceChannelPort, VoiceError, VoiceEvent,
};
use crate::domain::focus::FocusNotice;
use crate::domain::session::{SessionContext, SessionId, SessionPhase, TerminationReason, Transcript};

/// 编排器依赖的外部协作方
#[derive(Clone)]
pub struct SessionDependencies {
    pub voice: Arc<dyn VoiceChannelPort>,
    pub camera: Arc<dyn CameraPort>,
    pub classifier: Arc<dyn PresenceClassifierLoaderPort>,
    pub synthesis: Arc<dyn FeedbackSynthesisPort>,
    pub store: Arc<dyn SessionStorePort>,
    pub notifier: Arc<dyn SessionNotifierPort>,
}

/// 编排器独占的资源
#[derive(Default)]
struct SessionResources {
    stream: Option<Arc<dyn MediaStreamPort>>,
    frame_loop: LoopHandle,
    clock: LoopHandle,
    voice_events: LoopHandle,
    visibility: LoopHandle,
    /// 收尾流程已开始，之后获取到的资源要立即释放
    released: bool,
}

pub struct SessionOrchestrator {
    context: Arc<SessionContext>,
    settings: SessionSettings,
    voice: VoiceSession,
    camera: Arc<dyn CameraPort>,
    classifier: Arc<dyn PresenceClassifierLoaderPort>,
    feedback: FeedbackPipeline,
    notifier: Arc<dyn SessionNotifierPort>,
    stop_requested: AtomicBool,
    /// 宿主已卸载视图，会话结束后释放通知通道
    closed: AtomicBool,
    state: Mutex<SessionState>,
    resources: Mutex<SessionResources>,
    phase_tx: watch::Sender<SessionPhase>,
    weak_self: Weak<SessionOrchestrator>,
}

impl SessionOrchestrator {
    /// 创建处于 Idle 阶段的编排器
    pub fn new(
        context: SessionContext,
        dependencies: SessionDependencies,
        settings: SessionSettings,
    ) -> Arc<Self> {
        let SessionDependencies {
            voice,
            camera,
            classifier,
            synthesis,
            store,
            notifier,
        } = dependencies;
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);

        Arc::new_cyclic(|weak_self| Self {
            voice: VoiceSession::new(context.session_id.clone(), voice),
            feedback: FeedbackPipeline::new(synthesis, store, notifier.clone()),
            state: Mutex::new(SessionState::new(settings.focus_violation_limit)),
            resources: Mutex::new(SessionResources::default()),
            context: Arc::new(context),
            settings,
            camera,
            classifier,
            notifier,
            stop_requested: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            phase_tx,
            weak_self: weak_self.clone(),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.context.session_id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn resources(&self) -> MutexGuard<'_, SessionResources> {
        self.resources.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase
    }

    /// 在持有状态锁时切换阶段，保证通知顺序与状态一致
    fn set_phase(&self, state: &mut SessionState, phase: SessionPhase) {
        let from = state.phase;
        state.phase = phase;
        self.phase_tx.send_replace(phase);
        self.notifier.phase_changed(self.session_id(), phase);
        tracing::debug!(
            session_id = %self.session_id(),
            from = from.as_str(),
            to = phase.as_str(),
            "Session phase changed"
        );
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notice(self.session_id(), notice);
    }

    /// 开始面试：Idle → Connecting
    ///
    /// 并发地启动语音通话和摄像头分析。摄像头/模型失败只会降级；
    /// 语音通话无法建立时会话进入 Failed 并返回错误
    pub async fn begin(&self) -> Result<(), ApplicationError> {
        self.context
            .validate()
            .map_err(|e| ApplicationError::validation(e.to_string()))?;

        {
            let mut state = self.state();
            if state.phase != SessionPhase::Idle || self.closed.load(Ordering::SeqCst) {
                return Err(ApplicationError::invalid_state(format!(
                    "Session {} cannot begin from phase {}",
                    self.session_id(),
                    state.phase
                )));
            }
            self.set_phase(&mut state, SessionPhase::Connecting);
        }

        tracing::info!(
            session_id = %self.session_id(),
            job_position = %self.context.job_position,
            questions = self.context.questions.len(),
            "Interview session connecting"
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.attach_voice_events(events_rx);

        let assistant = self.settings.assistant.render(&self.context);
        let (_, voice_result) = tokio::join!(
            self.start_presence_monitoring(),
            self.voice.start(assistant, events_tx),
        );

        match voice_result {
            Ok(()) => Ok(()),
            Err(VoiceError::Closed) => {
                tracing::info!(
                    session_id = %self.session_id(),
                    "Session terminated while connecting"
                );
                Ok(())
            }
            Err(e) if self.is_stop_requested() => {
                tracing::info!(
                    session_id = %self.session_id(),
                    error = %e,
                    "Voice call failed to start after termination was requested"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %self.session_id(), error = %e, "Failed to start voice call");
                if !self.request_termination(TerminationReason::SetupFailed(e.to_string())) {
                    tracing::info!(
                        session_id = %self.session_id(),
                        "Session already stopping, start failure not reported"
                    );
                    return Ok(());
                }
                self.notify(Notice::error("Could not start the interview call"));
                Err(ApplicationError::ExternalServiceError(e.to_string()))
            }
        }
    }

    fn attach_voice_events(&self, mut events: mpsc::UnboundedReceiver<VoiceEvent>) {
        let weak = self.weak_self.clone();
        let mut resources = self.resources();
        if resources.released {
            return;
        }
        resources.voice_events = LoopHandle::spawn("voice-events", move |token| async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };
                let Some(orchestrator) = weak.upgrade() else {
                    break;
                };
                orchestrator.handle_voice_event(event);
            }
        });
    }

    /// 订阅宿主的页面可见性通知（true 表示页面被隐藏）
    pub fn watch_visibility(&self, mut changes: mpsc::Receiver<bool>) {
        let weak = self.weak_self.clone();
        let mut resources = self.resources();
        if resources.released {
            return;
        }
        resources.visibility = LoopHandle::spawn("visibility", move |token| async move {
            loop {
                let hidden = tokio::select! {
                    _ = token.cancelled() => break,
                    change = changes.recv() => match change {
                        Some(hidden) => hidden,
                        None => break,
                    },
                };
                let Some(orchestrator) = weak.upgrade() else {
                    break;
                };
                orchestrator.handle_visibility_change(hidden);
            }
        });
    }

    async fn start_presence_monitoring(&self) {
        let (stream, classifier) = tokio::join!(
            self.camera.acquire(),
            PresenceClassifier::load(self.classifier.as_ref(), self.settings.min_confidence),
        );

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(session_id = %self.session_id(), error = %e, "Camera unavailable, continuing voice-only");
                self.notify(Notice::error(
                    "Could not initialize camera. Please check permissions.",
                ));
                self.state().presence = PresenceMonitoring::Unavailable(e.to_string());
                return;
            }
        };

        let monitor = match classifier {
            Ok(classifier) => Some(AttentionMonitor::new(classifier, self.settings.thresholds)),
            Err(e) => {
                tracing::warn!(session_id = %self.session_id(), error = %e, "Presence classifier unavailable");
                self.notify(Notice::warning("Face detection is unavailable for this session."));
                self.state().presence = PresenceMonitoring::Unavailable(e.to_string());
                None
            }
        };

        let (adopted, analyzing) = {
            let mut resources = self.resources();
            if resources.released {
                (false, false)
            } else {
                let analyzing = monitor.is_some();
                if let Some(monitor) = monitor {
                    let weak = self.weak_self.clone();
                    resources.frame_loop = start_frame_loop(
                        stream.clone(),
                        monitor,
                        self.settings.frame_interval,
                        move |outcome| match weak.upgrade() {
                            Some(orchestrator) => orchestrator.handle_frame_outcome(outcome),
                            None => false,
                        },
                    );
                }
                resources.stream = Some(stream.clone());
                (true, analyzing)
            }
        };

        if adopted {
            if analyzing {
                self.state().presence = PresenceMonitoring::Running;
            }
            tracing::info!(session_id = %self.session_id(), analyzing, "Camera stream acquired");
        } else {
            tracing::debug!(
                session_id = %self.session_id(),
                "Camera acquired after teardown started, releasing immediately"
            );
            if let Err(e) = stream.stop_tracks().await {
                tracing::warn!(session_id = %self.session_id(), error = %e, "Failed to stop camera stream");
            }
        }
    }

    /// 处理一帧分析结果，返回 false 时帧循环结束
    fn handle_frame_outcome(&self, outcome: FrameOutcome) -> bool {
        if self.is_stop_requested() {
            return false;
        }

        let failure = {
            let mut state = self.state();
            match outcome {
                FrameOutcome::Reading(reading) => {
                    state.consecutive_frame_errors = 0;
                    let changed = state
                        .attention
                        .as_ref()
                        .map_or(true, |previous| previous.status != reading.status);
                    if changed {
                        tracing::debug!(
                            session_id = %self.session_id(),
                            status = reading.status.as_str(),
                            "Attention status changed"
                        );
                    }
                    state.attention = Some(reading);
                    None
                }
                FrameOutcome::Failed(error) => {
                    state.consecutive_frame_errors += 1;
                    tracing::debug!(
                        session_id = %self.session_id(),
                        error = %error,
                        consecutive = state.consecutive_frame_errors,
                        "Frame analysis failed"
                    );
                    (state.consecutive_frame_errors >= self.settings.max_consecutive_frame_errors)
                        .then_some(error)
                }
            }
        };

        match failure {
            Some(error) => {
                tracing::warn!(session_id = %self.session_id(), error = %error, "Camera or classifier failed repeatedly");
                self.notify(Notice::error("Camera stopped responding. Ending interview."));
                self.request_termination(TerminationReason::DeviceError(error));
                false
            }
            None => true,
        }
    }

    /// 处理语音供应商事件
    pub fn handle_voice_event(&self, event: VoiceEvent) {
        match event {
            VoiceEvent::Started => self.enter_active(),
            VoiceEvent::Transcript(snapshot) => self.replace_transcript(snapshot),
            VoiceEvent::SpeakingChanged(remote_speaking) => {
                self.state().remote_speaking = remote_speaking;
            }
            VoiceEvent::Ended => {
                tracing::info!(session_id = %self.session_id(), "Voice call ended by provider");
                self.notify(Notice::info("Interview has ended."));
                self.request_termination(TerminationReason::RemoteEnded);
            }
            VoiceEvent::Error(message) => {
                tracing::warn!(session_id = %self.session_id(), error = %message, "Voice provider error");
                self.notify(Notice::warning(format!("Voice connection issue: {}", message)));
            }
        }
    }

    fn enter_active(&self) {
        {
            let mut state = self.state();
            if state.phase != SessionPhase::Connecting || self.is_stop_requested() {
                tracing::debug!(
                    session_id = %self.session_id(),
                    phase = state.phase.as_str(),
                    "Ignoring call start outside Connecting"
                );
                return;
            }
            state.elapsed_seconds = 0;
            self.set_phase(&mut state, SessionPhase::Active);
        }

        tracing::info!(session_id = %self.session_id(), "Call connected");
        self.notify(Notice::info("Call connected"));

        let weak = self.weak_self.clone();
        let mut resources = self.resources();
        if !resources.released {
            resources.clock = start_clock(self.settings.clock_tick, move || {
                if let Some(orchestrator) = weak.upgrade() {
                    orchestrator.tick();
                }
            });
        }
    }

    fn tick(&self) {
        let mut state = self.state();
        if state.phase == SessionPhase::Active {
            state.elapsed_seconds += 1;
        }
    }

    fn replace_transcript(&self, snapshot: Vec<crate::domain::session::Utterance>) {
        let end_requested = {
            let mut state = self.state();
            if !state.phase.is_live() || self.is_stop_requested() {
                tracing::debug!(
                    session_id = %self.session_id(),
                    phase = state.phase.as_str(),
                    "Ignoring transcript update after session stopped"
                );
                return;
            }
            state.transcript = Transcript::from_snapshot(snapshot);
            state
                .transcript
                .last_candidate_utterance()
                .is_some_and(|u| self.settings.is_end_request(&u.text))
        };

        if end_requested {
            tracing::info!(session_id = %self.session_id(), "Candidate asked to end the interview");
            self.request_termination(TerminationReason::SpokenEndRequest);
        }
    }

    /// 处理一次页面可见性变化
    pub fn handle_visibility_change(&self, hidden: bool) -> Option<FocusNotice> {
        let notice = {
            let mut state = self.state();
            if !state.phase.is_live() || self.is_stop_requested() {
                return None;
            }
            state.focus.observe(hidden)
        };

        match notice {
            FocusNotice::Warning { count, limit } => {
                tracing::info!(session_id = %self.session_id(), count, limit, "Focus lost");
                self.notify(Notice::warning(notice.message()));
            }
            FocusNotice::LimitExceeded { count, limit } => {
                tracing::warn!(session_id = %self.session_id(), count, limit, "Focus violation limit reached");
                self.notify(Notice::error(notice.message()));
                self.request_termination(TerminationReason::FocusViolationsExceeded);
            }
            FocusNotice::WelcomeBack => self.notify(Notice::info(notice.message())),
        }
        Some(notice)
    }

    /// 请求终止会话
    ///
    /// 只有第一次调用生效并返回 true；收尾流程在后台任务中执行，
    /// 因此必须在 tokio runtime 内调用
    pub fn request_termination(&self, reason: TerminationReason) -> bool {
        // 与 begin 的 Idle → Connecting 在同一把锁下判断
        let transcript = {
            let mut state = self.state();
            if state.phase == SessionPhase::Idle {
                tracing::debug!(
                    session_id = %self.session_id(),
                    reason = %reason,
                    "Session not started, ignoring termination"
                );
                return false;
            }
            if self
                .stop_requested
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                tracing::debug!(
                    session_id = %self.session_id(),
                    reason = %reason,
                    "Termination already requested, ignoring"
                );
                return false;
            }
            state.termination = Some(reason.clone());
            self.set_phase(&mut state, SessionPhase::Stopping);
            state.transcript.clone()
        };

        tracing::info!(
            session_id = %self.session_id(),
            reason = %reason,
            utterances = transcript.len(),
            "Session termination requested"
        );
        self.notify(Notice::info("Ending interview..."));

        if let Some(orchestrator) = self.weak_self.upgrade() {
            tokio::spawn(async move {
                orchestrator.teardown(reason, transcript).await;
            });
        }
        true
    }

    async fn teardown(&self, reason: TerminationReason, transcript: Transcript) {
        let session_id = self.session_id();
        self.resources().released = true;

        // 1. 语音
        self.voice.stop().await;

        // 2. 帧循环
        self.resources().frame_loop.cancel();

        // 3. 摄像头
        let stream = self.resources().stream.take();
        if let Some(stream) = stream {
            match stream.stop_tracks().await {
                Ok(()) => tracing::debug!(session_id = %session_id, "Camera stream released"),
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Failed to stop camera stream")
                }
            }
        }

        // 4. 计时器与事件监听
        {
            let mut resources = self.resources();
            resources.clock.cancel();
            resources.voice_events.cancel();
            resources.visibility.cancel();
        }

        // 5. 反馈
        let outcome = self.feedback.dispatch(&transcript, &self.context).await;

        // 6. 结束
        let final_phase = reason.final_phase();
        {
            let mut state = self.state();
            self.set_phase(&mut state, final_phase);
        }

        tracing::info!(
            session_id = %session_id,
            reason = %reason,
            phase = final_phase.as_str(),
            feedback = ?outcome,
            "Session teardown completed"
        );

        if self.closed.load(Ordering::SeqCst) {
            self.notifier.release(session_id);
        }
    }

    /// 宿主卸载视图
    ///
    /// 仍在进行的会话按手动挂断处理，返回是否由本次调用触发终止。
    /// 通知通道在会话结束后释放；未开始的会话之后也不能再 `begin`
    pub fn close(&self) -> bool {
        self.closed.store(true, Ordering::SeqCst);

        let phase = self.phase();
        if phase == SessionPhase::Idle || phase.is_terminal() {
            self.notifier.release(self.session_id());
            return false;
        }

        let terminated = self.request_termination(TerminationReason::Manual);
        // 收尾可能在读取阶段之后才完成
        if self.phase().is_terminal() {
            self.notifier.release(self.session_id());
        }
        terminated
    }

    /// 等待会话进入 Completed 或 Failed
    pub async fn wait_until_settled(&self) -> SessionPhase {
        self.wait_for(|phase| phase.is_terminal()).await
    }

    /// 等待满足条件的阶段
    pub async fn wait_for(&self, mut predicate: impl FnMut(&SessionPhase) -> bool) -> SessionPhase {
        let mut rx = self.phase_tx.subscribe();
        let result = rx.wait_for(|phase| predicate(phase)).await.map(|phase| *phase);
        result.unwrap_or_else(|_| self.phase())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot::capture(
            self.session_id(),
            &state,
            self.is_stop_requested(),
            self.feedback.is_dispatched(),
        )
    }

    pub fn resource_report(&self) -> ResourceReport {
        let resources = self.resources();
        ResourceReport {
            camera_stream_held: resources.stream.is_some(),
            frame_loop_running: resources.frame_loop.is_running(),
            clock_running: resources.clock.is_running(),
            voice_connected: self.voice.is_connected(),
            voice_events_running: resources.voice_events.is_running(),
            visibility_listener_running: resources.visibility.is_running(),
        }
    }
}
