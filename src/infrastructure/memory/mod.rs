//! Memory Layer - In-Memory State Management
//!
//! 活动会话登记表与内存反馈存储

mod feedback_store;
mod session_registry;

pub use feedback_store::InMemoryFeedbackStore;
pub use session_registry::InMemorySessionRegistry;
