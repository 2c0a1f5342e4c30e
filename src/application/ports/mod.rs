//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod camera;
mod feedback_synthesis;
mod notifier;
mod presence_classifier;
mod session_registry;
mod session_store;
mod voice_channel;

pub use camera::{CameraError, CameraPort, MediaStreamPort};
pub use feedback_synthesis::{
    FeedbackSynthesisPort, SynthesisError, SynthesisRequest, SynthesisResult,
};
pub use notifier::{Notice, NoticeLevel, SessionNotifierPort};
pub use presence_classifier::{ClassifierError, PresenceClassifierLoaderPort, PresenceModelPort};
pub use session_registry::{RegistryError, SessionRegistryPort};
pub use session_store::{FeedbackRecord, SessionStorePort, StoreError};
pub use voice_channel::{
    AssistantConfig, ProviderSelection, TranscriberSelection, VoiceChannelFactoryPort,
    VoiceChannelPort, VoiceError, VoiceEvent, VoiceEventSender, VoiceSelection,
};
