//! HTTP Synthesis Client - 调用 OpenAI 兼容的 Chat Completions 服务
//!
//! 实现 FeedbackSynthesisPort，把对话记录交给大模型生成评分
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [{"role": "user", "content": "..."}]}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    FeedbackSynthesisPort, SynthesisError, SynthesisRequest, SynthesisResult,
};
use crate::domain::feedback::{feedback_prompt, parse_feedback_payload};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP Synthesis 客户端配置
#[derive(Debug, Clone)]
pub struct HttpSynthesisClientConfig {
    /// 服务基础 URL（不含 /chat/completions）
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误时的重试次数
    pub max_retries: u32,
}

impl Default for HttpSynthesisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemma-3n-e2b-it:free".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
            max_retries: 0,
        }
    }
}

pub struct HttpSynthesisClient {
    client: Client,
    config: HttpSynthesisClientConfig,
}

impl HttpSynthesisClient {
    pub fn new(config: HttpSynthesisClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &str) -> Result<String, SynthesisError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::NetworkError(format!(
                        "Cannot connect to synthesis service: {}",
                        e
                    ))
                } else {
                    SynthesisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SynthesisError::InvalidResponse("Completion has no content".to_string()))
    }
}

#[async_trait]
impl FeedbackSynthesisPort for HttpSynthesisClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        let conversation = request.transcript.to_conversation_json();
        let prompt = feedback_prompt(&request.job_position, &conversation);

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            session_id = %request.session_id,
            utterances = request.transcript.len(),
            "Sending feedback synthesis request"
        );

        let mut attempt = 0;
        let content = loop {
            match self.complete(&prompt).await {
                Ok(content) => break content,
                Err(e @ (SynthesisError::NetworkError(_) | SynthesisError::Timeout))
                    if attempt < self.config.max_retries =>
                {
                    attempt += 1;
                    tracing::warn!(
                        session_id = %request.session_id,
                        attempt,
                        error = %e,
                        "Feedback synthesis request failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        };

        let (payload, report) = parse_feedback_payload(&content)?;

        tracing::debug!(
            session_id = %request.session_id,
            recommended = report.is_recommended(),
            "Feedback synthesis completed"
        );

        Ok(SynthesisResult { payload, report })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.models_url())
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let client = HttpSynthesisClient::new(HttpSynthesisClientConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_completion_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"feedback\":{}}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"feedback\":{}}")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let client = HttpSynthesisClient::new(HttpSynthesisClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let result = client.complete("hello").await;
        assert!(matches!(
            result,
            Err(SynthesisError::NetworkError(_)) | Err(SynthesisError::Timeout)
        ));
    }
}
