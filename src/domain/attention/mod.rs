//! Attention Context - 注意力/在场检测
//!
//! 职责:
//! - 视频帧与检测结果的值对象
//! - 单帧注意力判定策略

mod policy;
mod value_objects;

pub use policy::{classify, AttentionReading, AttentionStatus, AttentionThresholds};
pub use value_objects::{BoundingBox, DetectedSubject, FaceLandmarks, Frame, Point};
