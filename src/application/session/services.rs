//! 会话共享依赖
//!
//! 语音通道按会话新建，其余协作方在会话之间共享

use std::sync::Arc;

use super::{SessionDependencies, SessionOrchestrator, SessionSettings};
use crate::application::ports::{
    CameraPort, FeedbackSynthesisPort, PresenceClassifierLoaderPort, SessionNotifierPort,
    SessionStorePort, VoiceChannelFactoryPort,
};
use crate::domain::session::SessionContext;

#[derive(Clone)]
pub struct SessionServices {
    pub voice_factory: Arc<dyn VoiceChannelFactoryPort>,
    pub camera: Arc<dyn CameraPort>,
    pub classifier: Arc<dyn PresenceClassifierLoaderPort>,
    pub synthesis: Arc<dyn FeedbackSynthesisPort>,
    pub store: Arc<dyn SessionStorePort>,
    pub notifier: Arc<dyn SessionNotifierPort>,
    pub settings: SessionSettings,
}

impl SessionServices {
    /// 为一次面试创建编排器
    pub fn create_orchestrator(&self, context: SessionContext) -> Arc<SessionOrchestrator> {
        let dependencies = SessionDependencies {
            voice: self.voice_factory.create(&context.session_id),
            camera: self.camera.clone(),
            classifier: self.classifier.clone(),
            synthesis: self.synthesis.clone(),
            store: self.store.clone(),
            notifier: self.notifier.clone(),
        };
        SessionOrchestrator::new(context, dependencies, self.settings.clone())
    }
}
