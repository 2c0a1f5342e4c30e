//! Events - 会话事件推送

mod publisher;

pub use publisher::{EventPublisher, SessionEvent};
