//! Voice Session Adapter - 语音通话句柄
//!
//! 独占持有供应商句柄；`stop` 可重复调用，也可在 `start` 完成前调用，
//! 错误只记录日志不向上抛出

use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::{AssistantConfig, VoiceChannelPort, VoiceError, VoiceEventSender};
use crate::domain::session::SessionId;

#[derive(Default)]
struct HandleSlot {
    provider: Option<Arc<dyn VoiceChannelPort>>,
    closed: bool,
}

pub struct VoiceSession {
    session_id: SessionId,
    provider: Arc<dyn VoiceChannelPort>,
    slot: Mutex<HandleSlot>,
}

impl VoiceSession {
    pub fn new(session_id: SessionId, provider: Arc<dyn VoiceChannelPort>) -> Self {
        Self {
            session_id,
            provider,
            slot: Mutex::new(HandleSlot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, HandleSlot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 开始通话
    ///
    /// 若 `stop` 在启动过程中被调用，启动完成后会立即再次停止并返回 `Closed`
    pub async fn start(
        &self,
        config: AssistantConfig,
        events: VoiceEventSender,
    ) -> Result<(), VoiceError> {
        {
            let mut slot = self.slot();
            if slot.closed {
                return Err(VoiceError::Closed);
            }
            slot.provider = Some(self.provider.clone());
        }

        tracing::debug!(
            session_id = %self.session_id,
            assistant = %config.name,
            "Starting voice call"
        );

        if let Err(e) = self.provider.start(config, events).await {
            self.slot().provider = None;
            return Err(e);
        }

        if self.is_closed() {
            tracing::debug!(
                session_id = %self.session_id,
                "Voice session closed while starting, stopping provider again"
            );
            if let Err(e) = self.provider.stop().await {
                tracing::warn!(session_id = %self.session_id, error = %e, "Failed to stop voice provider");
            }
            return Err(VoiceError::Closed);
        }

        Ok(())
    }

    /// 结束通话
    pub async fn stop(&self) {
        let provider = {
            let mut slot = self.slot();
            slot.closed = true;
            slot.provider.take()
        };

        let Some(provider) = provider else {
            tracing::debug!(session_id = %self.session_id, "Voice session not connected, nothing to stop");
            return;
        };

        match provider.stop().await {
            Ok(()) => tracing::info!(session_id = %self.session_id, "Voice call stopped"),
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "Failed to stop voice provider")
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.slot().closed
    }

    pub fn is_connected(&self) -> bool {
        self.slot().provider.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::AssistantTemplate;
    use crate::domain::session::{SessionContext, SessionId};
    use crate::infrastructure::adapters::voice::{ScriptedVoiceChannel, ScriptedVoiceConfig};
    use tokio::sync::mpsc;

    fn config() -> AssistantConfig {
        let context = SessionContext::new(
            SessionId::new("iv-3").unwrap(),
            "Alan",
            "alan@example.com",
            "Researcher",
            vec![],
        );
        AssistantTemplate::default().render(&context)
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let provider = Arc::new(ScriptedVoiceChannel::new(ScriptedVoiceConfig::default()));
        let session = VoiceSession::new(SessionId::new("iv-3").unwrap(), provider.clone());

        session.stop().await;
        session.stop().await;
        assert_eq!(provider.stop_calls(), 0);

        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(session.start(config(), tx).await, Err(VoiceError::Closed)));
        assert_eq!(provider.start_calls(), 0);
    }

    #[tokio::test]
    async fn test_stop_twice_calls_provider_once() {
        let provider = Arc::new(ScriptedVoiceChannel::new(ScriptedVoiceConfig::default()));
        let session = VoiceSession::new(SessionId::new("iv-3").unwrap(), provider.clone());

        let (tx, _rx) = mpsc::unbounded_channel();
        session.start(config(), tx).await.unwrap();
        assert!(session.is_connected());

        session.stop().await;
        session.stop().await;
        assert_eq!(provider.stop_calls(), 1);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_stop_error_is_swallowed() {
        let provider = Arc::new(ScriptedVoiceChannel::new(ScriptedVoiceConfig {
            fail_stop: true,
            ..Default::default()
        }));
        let session = VoiceSession::new(SessionId::new("iv-3").unwrap(), provider.clone());

        let (tx, _rx) = mpsc::unbounded_channel();
        session.start(config(), tx).await.unwrap();
        session.stop().await;
        assert_eq!(provider.stop_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_start_releases_handle() {
        let provider = Arc::new(ScriptedVoiceChannel::new(ScriptedVoiceConfig {
            fail_start: true,
            ..Default::default()
        }));
        let session = VoiceSession::new(SessionId::new("iv-3").unwrap(), provider.clone());

        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(session.start(config(), tx).await.is_err());
        assert!(!session.is_connected());

        session.stop().await;
        assert_eq!(provider.stop_calls(), 0);
    }
}
