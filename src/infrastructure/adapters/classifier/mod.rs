//! Classifier Adapter - 人脸检测模型实现

mod fixed_classifier;

pub use fixed_classifier::{aligned_subject, FixedClassifierLoader, FixedPresenceModel};
