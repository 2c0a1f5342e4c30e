//! Fixed Presence Model - 返回固定检测结果的模型
//!
//! 检测结果可在运行中替换，用于演示和测试注意力判定

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{ClassifierError, PresenceClassifierLoaderPort, PresenceModelPort};
use crate::domain::attention::{BoundingBox, DetectedSubject, FaceLandmarks, Frame, Point};

/// 一张正对镜头的人脸
pub fn aligned_subject() -> DetectedSubject {
    DetectedSubject {
        bounds: BoundingBox {
            top_left: Point::new(100.0, 80.0),
            bottom_right: Point::new(220.0, 230.0),
        },
        landmarks: FaceLandmarks {
            right_eye: Point::new(130.0, 130.0),
            left_eye: Point::new(190.0, 132.0),
            nose: Point::new(161.0, 165.0),
        },
        confidence: 0.97,
    }
}

pub struct FixedPresenceModel {
    subjects: Mutex<Vec<DetectedSubject>>,
    failure: Option<String>,
}

impl FixedPresenceModel {
    pub fn new(subjects: Vec<DetectedSubject>) -> Self {
        Self {
            subjects: Mutex::new(subjects),
            failure: None,
        }
    }

    /// 每次检测都失败
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            subjects: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn set_subjects(&self, subjects: Vec<DetectedSubject>) {
        *self.subjects.lock().unwrap_or_else(|e| e.into_inner()) = subjects;
    }
}

#[async_trait]
impl PresenceModelPort for FixedPresenceModel {
    async fn estimate(&self, _frame: &Frame) -> Result<Vec<DetectedSubject>, ClassifierError> {
        if let Some(message) = &self.failure {
            return Err(ClassifierError::EstimateFailed(message.clone()));
        }
        Ok(self
            .subjects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

/// 加载 FixedPresenceModel 的 loader
pub struct FixedClassifierLoader {
    model: Arc<FixedPresenceModel>,
    load_delay: Duration,
    failure: Option<String>,
}

impl FixedClassifierLoader {
    pub fn new(model: Arc<FixedPresenceModel>) -> Self {
        Self {
            model,
            load_delay: Duration::ZERO,
            failure: None,
        }
    }

    /// 加载总是失败
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            model: Arc::new(FixedPresenceModel::new(Vec::new())),
            load_delay: Duration::ZERO,
            failure: Some(message.into()),
        }
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn model(&self) -> Arc<FixedPresenceModel> {
        self.model.clone()
    }
}

#[async_trait]
impl PresenceClassifierLoaderPort for FixedClassifierLoader {
    async fn load(&self) -> Result<Arc<dyn PresenceModelPort>, ClassifierError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(ClassifierError::LoadFailed(message.clone()));
        }
        tracing::debug!("FixedClassifierLoader: model ready");
        Ok(self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attention::{classify, AttentionStatus, AttentionThresholds};

    #[test]
    fn test_aligned_subject_is_within_thresholds() {
        let reading = classify(&[aligned_subject()], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::Aligned);
    }

    #[tokio::test]
    async fn test_subjects_can_be_replaced() {
        let loader = FixedClassifierLoader::new(Arc::new(FixedPresenceModel::new(vec![
            aligned_subject(),
        ])));
        let model = loader.load().await.unwrap();
        let frame = Frame::blank(4, 4, 0);
        assert_eq!(model.estimate(&frame).await.unwrap().len(), 1);

        loader.model().set_subjects(vec![]);
        assert!(model.estimate(&frame).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_loader() {
        let loader = FixedClassifierLoader::failing("weights missing");
        assert!(matches!(loader.load().await, Err(ClassifierError::LoadFailed(_))));
    }
}
