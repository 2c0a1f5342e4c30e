//! Attention Context - 判定策略
//!
//! 每帧独立重算，不做滞后处理；结果仅用于提示，不会终止会话

use serde::{Deserialize, Serialize};

use super::DetectedSubject;

/// 注意力状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionStatus {
    Aligned,
    NoSubject,
    MultipleSubjects,
    Misaligned,
}

impl AttentionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionStatus::Aligned => "aligned",
            AttentionStatus::NoSubject => "no_subject",
            AttentionStatus::MultipleSubjects => "multiple_subjects",
            AttentionStatus::Misaligned => "misaligned",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AttentionStatus::Aligned => "face aligned",
            AttentionStatus::NoSubject => "no face detected",
            AttentionStatus::MultipleSubjects => "multiple faces detected",
            AttentionStatus::Misaligned => "look at the camera",
        }
    }
}

/// 单帧判定结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionReading {
    pub status: AttentionStatus,
    pub message: String,
    pub subject_count: usize,
}

impl AttentionReading {
    fn new(status: AttentionStatus, subject_count: usize) -> Self {
        Self {
            status,
            message: status.message().to_string(),
            subject_count,
        }
    }
}

/// 对齐阈值（像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionThresholds {
    pub max_eye_level_difference: f32,
    pub max_nose_offset: f32,
}

impl Default for AttentionThresholds {
    fn default() -> Self {
        Self {
            max_eye_level_difference: 10.0,
            max_nose_offset: 20.0,
        }
    }
}

/// 根据检测结果计算注意力状态
pub fn classify(subjects: &[DetectedSubject], thresholds: &AttentionThresholds) -> AttentionReading {
    match subjects {
        [] => AttentionReading::new(AttentionStatus::NoSubject, 0),
        [subject] => {
            let landmarks = &subject.landmarks;
            let misaligned = landmarks.eye_level_difference() > thresholds.max_eye_level_difference
                || landmarks.nose_offset() > thresholds.max_nose_offset;
            let status = if misaligned {
                AttentionStatus::Misaligned
            } else {
                AttentionStatus::Aligned
            };
            AttentionReading::new(status, 1)
        }
        many => AttentionReading::new(AttentionStatus::MultipleSubjects, many.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attention::{BoundingBox, FaceLandmarks, Point};

    fn subject(right_eye: (f32, f32), left_eye: (f32, f32), nose: (f32, f32)) -> DetectedSubject {
        DetectedSubject {
            bounds: BoundingBox {
                top_left: Point::new(0.0, 0.0),
                bottom_right: Point::new(200.0, 200.0),
            },
            landmarks: FaceLandmarks {
                right_eye: Point::new(right_eye.0, right_eye.1),
                left_eye: Point::new(left_eye.0, left_eye.1),
                nose: Point::new(nose.0, nose.1),
            },
            confidence: 0.99,
        }
    }

    fn aligned() -> DetectedSubject {
        subject((80.0, 90.0), (120.0, 90.0), (100.0, 120.0))
    }

    #[test]
    fn test_no_subject() {
        let reading = classify(&[], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::NoSubject);
        assert_eq!(reading.message, "no face detected");
    }

    #[test]
    fn test_multiple_subjects() {
        let reading = classify(&[aligned(), aligned()], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::MultipleSubjects);
        assert_eq!(reading.subject_count, 2);
        assert_eq!(reading.message, "multiple faces detected");
    }

    #[test]
    fn test_aligned_with_zero_metrics() {
        let reading = classify(&[aligned()], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::Aligned);
    }

    #[test]
    fn test_eye_level_above_threshold() {
        let tilted = subject((80.0, 90.0), (120.0, 101.0), (100.0, 120.0));
        let reading = classify(&[tilted], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::Misaligned);
        assert_eq!(reading.message, "look at the camera");
    }

    #[test]
    fn test_nose_offset_above_threshold() {
        let turned = subject((80.0, 90.0), (120.0, 90.0), (125.0, 120.0));
        let reading = classify(&[turned], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::Misaligned);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let edge = subject((80.0, 90.0), (120.0, 100.0), (120.0, 120.0));
        let reading = classify(&[edge], &AttentionThresholds::default());
        assert_eq!(reading.status, AttentionStatus::Aligned);
    }
}
