//! In-Memory Session Registry Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{RegistryError, SessionRegistryPort};
use crate::application::session::SessionOrchestrator;

/// 内存会话登记表
pub struct InMemorySessionRegistry {
    sessions: DashMap<String, Arc<SessionOrchestrator>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistryPort for InMemorySessionRegistry {
    fn register(&self, orchestrator: Arc<SessionOrchestrator>) -> Result<(), RegistryError> {
        let session_id = orchestrator.session_id().as_str().to_string();
        match self.sessions.entry(session_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(RegistryError::AlreadyExists(session_id))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(orchestrator);
                tracing::info!(session_id = %session_id, "Session registered");
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Arc<SessionOrchestrator>, RegistryError> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn remove(&self, id: &str) -> Result<Arc<SessionOrchestrator>, RegistryError> {
        self.sessions
            .remove(id)
            .map(|(_, orchestrator)| {
                tracing::info!(session_id = %id, "Session removed");
                orchestrator
            })
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn is_registered(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::{SessionDependencies, SessionSettings};
    use crate::domain::session::{SessionContext, SessionId};
    use crate::infrastructure::adapters::camera::SyntheticCamera;
    use crate::infrastructure::adapters::classifier::{FixedClassifierLoader, FixedPresenceModel};
    use crate::infrastructure::adapters::synthesis::FakeSynthesisClient;
    use crate::infrastructure::adapters::voice::{ScriptedVoiceChannel, ScriptedVoiceConfig};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryFeedbackStore;

    fn orchestrator(id: &str) -> Arc<SessionOrchestrator> {
        let context = SessionContext::new(
            SessionId::new(id).unwrap(),
            "Grace",
            "grace@example.com",
            "Backend Engineer",
            vec![],
        );
        let dependencies = SessionDependencies {
            voice: Arc::new(ScriptedVoiceChannel::new(ScriptedVoiceConfig::default())),
            camera: Arc::new(SyntheticCamera::default()),
            classifier: Arc::new(FixedClassifierLoader::new(Arc::new(
                FixedPresenceModel::new(vec![]),
            ))),
            synthesis: Arc::new(FakeSynthesisClient::new()),
            store: Arc::new(InMemoryFeedbackStore::new()),
            notifier: Arc::new(EventPublisher::new()),
        };
        SessionOrchestrator::new(context, dependencies, SessionSettings::default())
    }

    #[test]
    fn test_session_lifecycle() {
        let registry = InMemorySessionRegistry::new();

        // Register
        assert!(registry.register(orchestrator("iv-1")).is_ok());
        assert!(matches!(
            registry.register(orchestrator("iv-1")),
            Err(RegistryError::AlreadyExists(_))
        ));

        // Get
        let session = registry.get("iv-1").unwrap();
        assert_eq!(session.session_id().as_str(), "iv-1");
        assert!(registry.is_registered("iv-1"));
        assert_eq!(registry.list_all(), vec!["iv-1".to_string()]);

        // Remove
        assert!(registry.remove("iv-1").is_ok());
        assert!(!registry.is_registered("iv-1"));
        assert!(matches!(registry.get("iv-1"), Err(RegistryError::NotFound(_))));
    }
}
