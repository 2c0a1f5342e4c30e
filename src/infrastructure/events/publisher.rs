//! Event Publisher Implementation
//!
//! 会话事件推送实现：每个会话一个广播通道，另有一个全局通道汇总所有会话

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{Notice, NoticeLevel, SessionNotifierPort};
use crate::domain::session::{SessionId, SessionPhase};

/// 会话事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    /// 界面提示
    Notice {
        session_id: String,
        level: NoticeLevel,
        message: String,
    },
    /// 阶段变更
    PhaseChanged {
        session_id: String,
        phase: SessionPhase,
    },
    /// 会话结束，宿主可跳转到完成页
    Completed { session_id: String },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Notice { session_id, .. }
            | SessionEvent::PhaseChanged { session_id, .. }
            | SessionEvent::Completed { session_id } => session_id,
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<SessionEvent>>,
    global_channel: broadcast::Sender<SessionEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(256);
        Self {
            session_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅所有会话的事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<SessionEvent> {
        self.global_channel.subscribe()
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<SessionEvent> {
        if let Some(sender) = self.session_channels.get(session_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.session_channels.insert(session_id.to_string(), tx);
        rx
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<SessionEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    fn publish(&self, event: SessionEvent) {
        if let Some(sender) = self.session_channels.get(event.session_id()) {
            if let Err(e) = sender.send(event.clone()) {
                tracing::debug!(
                    session_id = %event.session_id(),
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
        // 没有全局订阅者是常态
        let _ = self.global_channel.send(event);
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionNotifierPort for EventPublisher {
    fn notice(&self, session_id: &SessionId, notice: Notice) {
        tracing::debug!(
            session_id = %session_id,
            level = ?notice.level,
            message = %notice.message,
            "Session notice"
        );
        self.publish(SessionEvent::Notice {
            session_id: session_id.to_string(),
            level: notice.level,
            message: notice.message,
        });
    }

    fn phase_changed(&self, session_id: &SessionId, phase: SessionPhase) {
        self.publish(SessionEvent::PhaseChanged {
            session_id: session_id.to_string(),
            phase,
        });
    }

    fn completed(&self, session_id: &SessionId) {
        self.publish(SessionEvent::Completed {
            session_id: session_id.to_string(),
        });
    }

    fn release(&self, session_id: &SessionId) {
        self.unregister_session(session_id.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_events_are_routed() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.register_session("iv-1");
        let mut global = publisher.subscribe_global();

        let id = SessionId::new("iv-1").unwrap();
        let other = SessionId::new("iv-2").unwrap();
        publisher.notice(&other, Notice::info("not for iv-1"));
        publisher.phase_changed(&id, SessionPhase::Active);

        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::PhaseChanged {
                session_id: "iv-1".to_string(),
                phase: SessionPhase::Active,
            }
        );
        assert_eq!(global.recv().await.unwrap().session_id(), "iv-2");
        assert_eq!(global.recv().await.unwrap().session_id(), "iv-1");
    }

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::Completed {
            session_id: "iv-1".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Completed");
        assert_eq!(json["data"]["session_id"], "iv-1");
    }

    #[tokio::test]
    async fn test_release_keeps_buffered_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.register_session("iv-1");
        let id = SessionId::new("iv-1").unwrap();

        publisher.completed(&id);
        publisher.release(&id);

        assert!(publisher.subscribe("iv-1").is_none());
        assert!(matches!(rx.recv().await, Ok(SessionEvent::Completed { .. })));
        assert!(rx.recv().await.is_err());
    }

    #[test]
    fn test_unregistered_session_has_no_receiver() {
        let publisher = EventPublisher::new();
        publisher.register_session("iv-1");
        publisher.unregister_session("iv-1");
        assert!(publisher.subscribe("iv-1").is_none());
    }
}
