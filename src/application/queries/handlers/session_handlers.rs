//! Session Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SessionRegistryPort;
use crate::application::queries::{GetSessionStateQuery, ListSessionsQuery};
use crate::application::session::SessionSnapshot;

/// GetSessionState Handler
pub struct GetSessionStateHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl GetSessionStateHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        query: GetSessionStateQuery,
    ) -> Result<SessionSnapshot, ApplicationError> {
        let orchestrator = self.registry.get(&query.session_id)?;
        Ok(orchestrator.snapshot())
    }
}

/// ListSessions Handler
pub struct ListSessionsHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl ListSessionsHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, _query: ListSessionsQuery) -> Result<Vec<SessionSnapshot>, ApplicationError> {
        let mut snapshots: Vec<SessionSnapshot> = self
            .registry
            .list_all()
            .iter()
            .filter_map(|id| self.registry.get(id).ok())
            .map(|orchestrator| orchestrator.snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.session_id.as_str().cmp(b.session_id.as_str()));
        Ok(snapshots)
    }
}
