//! Attention Monitor - 单帧注意力分析
//!
//! 包装已加载的检测模型（Visual Presence Classifier Adapter），
//! 过滤低置信度结果后交给领域策略判定

use std::sync::Arc;

use crate::application::ports::{
    ClassifierError, PresenceClassifierLoaderPort, PresenceModelPort,
};
use crate::domain::attention::{
    classify, AttentionReading, AttentionThresholds, DetectedSubject, Frame,
};

/// 检测模型适配器
#[derive(Clone)]
pub struct PresenceClassifier {
    model: Arc<dyn PresenceModelPort>,
    min_confidence: f32,
}

impl PresenceClassifier {
    /// 异步加载模型
    pub async fn load(
        loader: &dyn PresenceClassifierLoaderPort,
        min_confidence: f32,
    ) -> Result<Self, ClassifierError> {
        let model = loader.load().await?;
        Ok(Self::new(model, min_confidence))
    }

    pub fn new(model: Arc<dyn PresenceModelPort>, min_confidence: f32) -> Self {
        Self {
            model,
            min_confidence,
        }
    }

    /// 检测单帧，丢弃置信度低于下限的对象
    pub async fn estimate(&self, frame: &Frame) -> Result<Vec<DetectedSubject>, ClassifierError> {
        let subjects = self.model.estimate(frame).await?;
        Ok(subjects
            .into_iter()
            .filter(|s| s.confidence >= self.min_confidence)
            .collect())
    }
}

/// 注意力监控
#[derive(Clone)]
pub struct AttentionMonitor {
    classifier: PresenceClassifier,
    thresholds: AttentionThresholds,
}

impl AttentionMonitor {
    pub fn new(classifier: PresenceClassifier, thresholds: AttentionThresholds) -> Self {
        Self {
            classifier,
            thresholds,
        }
    }

    pub async fn analyze(&self, frame: &Frame) -> Result<AttentionReading, ClassifierError> {
        let subjects = self.classifier.estimate(frame).await?;
        Ok(classify(&subjects, &self.thresholds))
    }
}
