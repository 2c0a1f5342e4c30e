//! Fake Synthesis Client - 用于测试的反馈合成客户端
//!
//! 不调用任何模型，按对话长度返回固定评分

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    FeedbackSynthesisPort, SynthesisError, SynthesisRequest, SynthesisResult,
};
use crate::domain::feedback::parse_feedback_payload;

pub struct FakeSynthesisClient {
    delay: Duration,
    failure: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeSynthesisClient {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            failure: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 每次合成都返回服务错误
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// 模拟推理延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 收到的请求
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for FakeSynthesisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackSynthesisPort for FakeSynthesisClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            session_id = %request.session_id,
            utterances = request.transcript.len(),
            "FakeSynthesisClient: returning fixed feedback"
        );

        let utterances = request.transcript.len();
        let job_position = request.job_position.clone();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(SynthesisError::ServiceError(message.clone()));
        }

        let score = (utterances.min(10) as f32).max(1.0);
        let output = json!({
            "feedback": {
                "rating": {
                    "technicalSkills": score,
                    "communication": score,
                    "problemSolving": score,
                    "experience": score
                },
                "summary": format!("Candidate answered {} turns for the {} role.", utterances, job_position),
                "Recommendation": if score >= 6.0 { "Yes" } else { "No" },
                "RecommendationMsg": "Generated without a language model."
            }
        });

        let (payload, report) = parse_feedback_payload(&output.to_string())?;
        Ok(SynthesisResult { payload, report })
    }
}
