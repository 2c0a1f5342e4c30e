//! Session Context - Transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 发言方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    /// AI 面试官
    Assistant,
    /// 候选人
    #[serde(alias = "user")]
    Candidate,
    /// 系统 prompt（不计入对话记录）
    System,
}

impl SpeakerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Assistant => "assistant",
            SpeakerRole::Candidate => "candidate",
            SpeakerRole::System => "system",
        }
    }
}

/// 一次发言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub role: SpeakerRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    pub fn new(role: SpeakerRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(SpeakerRole::Assistant, text)
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self::new(SpeakerRole::Candidate, text)
    }
}

/// 对话记录
///
/// 供应商推送的是累计快照，因此这里只支持整体替换
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Utterance>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从累计快照构建，丢弃 system 消息
    pub fn from_snapshot(utterances: Vec<Utterance>) -> Self {
        Self(
            utterances
                .into_iter()
                .filter(|u| u.role != SpeakerRole::System && !u.text.trim().is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.0
    }

    /// 最近一次候选人发言
    pub fn last_candidate_utterance(&self) -> Option<&Utterance> {
        self.0
            .iter()
            .rev()
            .find(|u| u.role == SpeakerRole::Candidate)
    }

    /// `{role, content}` 形式的对话数组，交给反馈合成服务
    pub fn to_conversation_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.0
                .iter()
                .map(|u| {
                    serde_json::json!({
                        "role": u.role.as_str(),
                        "content": u.text,
                    })
                })
                .collect(),
        )
    }
}

/// 秒数格式化为 HH:MM:SS
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
