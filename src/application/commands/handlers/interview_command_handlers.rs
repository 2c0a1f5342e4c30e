//! Interview Command Handlers

use std::sync::Arc;

use crate::application::commands::interview_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SessionRegistryPort;
use crate::application::session::SessionServices;
use crate::domain::session::TerminationReason;

/// BeginInterview Handler - 创建、登记并启动会话
pub struct BeginInterviewHandler {
    services: SessionServices,
    registry: Arc<dyn SessionRegistryPort>,
}

impl BeginInterviewHandler {
    pub fn new(services: SessionServices, registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { services, registry }
    }

    /// 语音通话无法建立时返回错误，会话保留在登记表中（阶段为 Failed）
    pub async fn handle(
        &self,
        cmd: BeginInterviewCommand,
    ) -> Result<BeginInterviewResponse, ApplicationError> {
        cmd.context.validate()?;
        let session_id = cmd.context.session_id.to_string();

        if self.registry.is_registered(&session_id) {
            return Err(ApplicationError::invalid_state(format!(
                "Session already exists: {}",
                session_id
            )));
        }

        let orchestrator = self.services.create_orchestrator(cmd.context);
        self.registry.register(orchestrator.clone())?;

        orchestrator.begin().await?;

        tracing::info!(session_id = %session_id, "Interview begun");

        Ok(BeginInterviewResponse {
            session_id,
            phase: orchestrator.phase(),
        })
    }
}

/// EndInterview Handler - 候选人主动挂断
pub struct EndInterviewHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl EndInterviewHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        cmd: EndInterviewCommand,
    ) -> Result<EndInterviewResponse, ApplicationError> {
        let orchestrator = self.registry.get(&cmd.session_id)?;
        let accepted = orchestrator.request_termination(TerminationReason::Manual);

        tracing::info!(session_id = %cmd.session_id, accepted, "End interview requested");

        Ok(EndInterviewResponse {
            session_id: cmd.session_id,
            accepted,
        })
    }
}

/// ReportVisibility Handler - 转发宿主的页面可见性变化
pub struct ReportVisibilityHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl ReportVisibilityHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        cmd: ReportVisibilityCommand,
    ) -> Result<ReportVisibilityResponse, ApplicationError> {
        let orchestrator = self.registry.get(&cmd.session_id)?;
        let notice = orchestrator.handle_visibility_change(cmd.hidden);
        let violations = orchestrator.snapshot().focus_violation_count;

        Ok(ReportVisibilityResponse {
            session_id: cmd.session_id,
            notice,
            violations,
        })
    }
}

/// CloseSession Handler - 视图卸载
pub struct CloseSessionHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl CloseSessionHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        cmd: CloseSessionCommand,
    ) -> Result<CloseSessionResponse, ApplicationError> {
        let orchestrator = self.registry.remove(&cmd.session_id)?;

        // 收尾任务持有编排器，移出登记表后仍会执行完
        let terminated = orchestrator.close();

        tracing::info!(session_id = %cmd.session_id, terminated, "Session closed");

        Ok(CloseSessionResponse {
            session_id: cmd.session_id,
            terminated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::SessionSettings;
    use crate::domain::focus::FocusNotice;
    use crate::domain::session::{InterviewQuestion, SessionContext, SessionId, SessionPhase};
    use crate::infrastructure::adapters::camera::SyntheticCamera;
    use crate::infrastructure::adapters::classifier::{
        aligned_subject, FixedClassifierLoader, FixedPresenceModel,
    };
    use crate::infrastructure::adapters::synthesis::FakeSynthesisClient;
    use crate::application::ports::VoiceEvent;
    use crate::domain::session::Utterance;
    use crate::infrastructure::adapters::voice::{
        ScriptStep, ScriptedVoiceConfig, ScriptedVoiceFactory,
    };
    use crate::infrastructure::events::{EventPublisher, SessionEvent};
    use crate::infrastructure::memory::{InMemoryFeedbackStore, InMemorySessionRegistry};

    /// 接通后推送对话记录，但不会自行结束
    fn connected(turns: Vec<Utterance>) -> ScriptedVoiceConfig {
        let mut script = vec![ScriptStep::after_millis(5, VoiceEvent::Started)];
        if !turns.is_empty() {
            script.push(ScriptStep::after_millis(0, VoiceEvent::Transcript(turns)));
        }
        ScriptedVoiceConfig {
            script,
            ..Default::default()
        }
    }

    struct Fixture {
        registry: Arc<InMemorySessionRegistry>,
        publisher: Arc<EventPublisher>,
        store: Arc<InMemoryFeedbackStore>,
        voice: Arc<ScriptedVoiceFactory>,
        begin: BeginInterviewHandler,
    }

    fn fixture(voice: ScriptedVoiceConfig) -> Fixture {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let store = Arc::new(InMemoryFeedbackStore::new());
        let voice = Arc::new(ScriptedVoiceFactory::new(voice));
        let publisher = Arc::new(EventPublisher::new());
        let services = SessionServices {
            voice_factory: voice.clone(),
            camera: Arc::new(SyntheticCamera::default()),
            classifier: Arc::new(FixedClassifierLoader::new(Arc::new(
                FixedPresenceModel::new(vec![aligned_subject()]),
            ))),
            synthesis: Arc::new(FakeSynthesisClient::new()),
            store: store.clone(),
            notifier: publisher.clone(),
            settings: SessionSettings::default(),
        };
        Fixture {
            begin: BeginInterviewHandler::new(services, registry.clone()),
            registry,
            publisher,
            store,
            voice,
        }
    }

    fn context(id: &str) -> SessionContext {
        SessionContext::new(
            SessionId::new(id).unwrap(),
            "Linus",
            "linus@example.com",
            "Kernel Engineer",
            vec![InterviewQuestion::new("How does the scheduler pick the next task?")],
        )
    }

    #[tokio::test]
    async fn test_begin_registers_session() {
        let f = fixture(ScriptedVoiceConfig::default());
        let response = f
            .begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-1"),
            })
            .await
            .unwrap();

        assert_eq!(response.session_id, "iv-cmd-1");
        assert_eq!(response.phase, SessionPhase::Connecting);
        assert!(f.registry.is_registered("iv-cmd-1"));

        let duplicate = f
            .begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-1"),
            })
            .await;
        assert!(matches!(duplicate, Err(ApplicationError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_begin_rejects_invalid_context() {
        let f = fixture(ScriptedVoiceConfig::default());
        let mut ctx = context("iv-cmd-2");
        ctx.candidate_name = "  ".to_string();

        let result = f.begin.handle(BeginInterviewCommand { context: ctx }).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert!(!f.registry.is_registered("iv-cmd-2"));
    }

    #[tokio::test]
    async fn test_end_interview_is_idempotent() {
        let f = fixture(connected(vec![
            Utterance::assistant("Hello"),
            Utterance::candidate("Hi there"),
        ]));
        f.begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-3"),
            })
            .await
            .unwrap();
        let orchestrator = f.registry.get("iv-cmd-3").unwrap();
        orchestrator
            .wait_for(|phase| *phase == SessionPhase::Active)
            .await;

        let end = EndInterviewHandler::new(f.registry.clone());
        let first = end
            .handle(EndInterviewCommand {
                session_id: "iv-cmd-3".to_string(),
            })
            .await
            .unwrap();
        let second = end
            .handle(EndInterviewCommand {
                session_id: "iv-cmd-3".to_string(),
            })
            .await
            .unwrap();

        assert!(first.accepted);
        assert!(!second.accepted);
        assert_eq!(orchestrator.wait_until_settled().await, SessionPhase::Completed);
        assert_eq!(f.voice.channel("iv-cmd-3").unwrap().stop_calls(), 1);
    }

    #[tokio::test]
    async fn test_visibility_reports_and_close() {
        let f = fixture(connected(vec![]));
        f.begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-4"),
            })
            .await
            .unwrap();
        let orchestrator = f.registry.get("iv-cmd-4").unwrap();
        orchestrator
            .wait_for(|phase| *phase == SessionPhase::Active)
            .await;

        let visibility = ReportVisibilityHandler::new(f.registry.clone());
        let response = visibility
            .handle(ReportVisibilityCommand {
                session_id: "iv-cmd-4".to_string(),
                hidden: true,
            })
            .await
            .unwrap();
        assert_eq!(response.notice, Some(FocusNotice::Warning { count: 1, limit: 3 }));
        assert_eq!(response.violations, 1);

        let close = CloseSessionHandler::new(f.registry.clone());
        let closed = close
            .handle(CloseSessionCommand {
                session_id: "iv-cmd-4".to_string(),
            })
            .await
            .unwrap();
        assert!(closed.terminated);
        assert!(!f.registry.is_registered("iv-cmd-4"));
        assert_eq!(orchestrator.wait_until_settled().await, SessionPhase::Completed);
        // 没有对话内容时不生成反馈
        assert!(f.store.records().is_empty());
    }

    #[tokio::test]
    async fn test_close_releases_event_channel_after_teardown() {
        let f = fixture(connected(vec![
            Utterance::assistant("Hello"),
            Utterance::candidate("Hi there"),
        ]));
        let mut events = f.publisher.register_session("iv-cmd-5");
        f.begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-5"),
            })
            .await
            .unwrap();
        let orchestrator = f.registry.get("iv-cmd-5").unwrap();
        orchestrator
            .wait_for(|phase| *phase == SessionPhase::Active)
            .await;

        let closed = CloseSessionHandler::new(f.registry.clone())
            .handle(CloseSessionCommand {
                session_id: "iv-cmd-5".to_string(),
            })
            .await
            .unwrap();
        assert!(closed.terminated);
        assert_eq!(orchestrator.wait_until_settled().await, SessionPhase::Completed);
        assert!(f.publisher.subscribe("iv-cmd-5").is_none());

        // 通道释放前的事件仍然送达
        let mut completed = false;
        while let Ok(event) = events.recv().await {
            if matches!(event, SessionEvent::Completed { .. }) {
                completed = true;
            }
        }
        assert!(completed);
        assert_eq!(f.store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_close_settled_session_releases_channel() {
        let f = fixture(ScriptedVoiceConfig {
            fail_start: true,
            ..Default::default()
        });
        f.publisher.register_session("iv-cmd-6");
        let result = f
            .begin
            .handle(BeginInterviewCommand {
                context: context("iv-cmd-6"),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ExternalServiceError(_))));

        let orchestrator = f.registry.get("iv-cmd-6").unwrap();
        assert_eq!(orchestrator.wait_until_settled().await, SessionPhase::Failed);
        // 尚未关闭，通道保留给宿主
        assert!(f.publisher.subscribe("iv-cmd-6").is_some());

        let closed = CloseSessionHandler::new(f.registry.clone())
            .handle(CloseSessionCommand {
                session_id: "iv-cmd-6".to_string(),
            })
            .await
            .unwrap();
        assert!(!closed.terminated);
        assert!(f.publisher.subscribe("iv-cmd-6").is_none());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let f = fixture(ScriptedVoiceConfig::default());
        let end = EndInterviewHandler::new(f.registry.clone());
        let result = end
            .handle(EndInterviewCommand {
                session_id: "missing".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
