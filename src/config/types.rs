//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{ProviderSelection, TranscriberSelection, VoiceSelection};
use crate::application::session::{
    AssistantTemplate, SessionSettings, DEFAULT_ASSISTANT_NAME, DEFAULT_FIRST_MESSAGE,
    DEFAULT_SYSTEM_PROMPT,
};
use crate::domain::attention::AttentionThresholds;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 注意力检测配置
    #[serde(default)]
    pub attention: AttentionConfig,

    /// 语音通话配置
    #[serde(default)]
    pub voice: VoiceConfig,

    /// 反馈合成服务配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 编排器运行参数
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            focus_violation_limit: self.session.focus_violation_limit,
            clock_tick: Duration::from_millis(self.session.clock_tick_ms),
            frame_interval: Duration::from_millis(self.attention.frame_interval_ms),
            thresholds: AttentionThresholds {
                max_eye_level_difference: self.attention.max_eye_level_difference,
                max_nose_offset: self.attention.max_nose_offset,
            },
            min_confidence: self.attention.min_confidence,
            max_consecutive_frame_errors: self.attention.max_consecutive_frame_errors,
            assistant: self.voice.assistant_template(),
            end_phrases: self.voice.end_phrases.clone(),
            end_on_spoken_request: self.voice.end_on_spoken_request,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 切出页面次数上限
    #[serde(default = "default_focus_violation_limit")]
    pub focus_violation_limit: u32,

    /// 计时周期（毫秒）
    #[serde(default = "default_clock_tick_ms")]
    pub clock_tick_ms: u64,
}

fn default_focus_violation_limit() -> u32 {
    3
}

fn default_clock_tick_ms() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus_violation_limit: default_focus_violation_limit(),
            clock_tick_ms: default_clock_tick_ms(),
        }
    }
}

/// 注意力检测配置
#[derive(Debug, Clone, Deserialize)]
pub struct AttentionConfig {
    /// 两眼高度差上限（像素）
    #[serde(default = "default_max_eye_level_difference")]
    pub max_eye_level_difference: f32,

    /// 鼻尖水平偏移上限（像素）
    #[serde(default = "default_max_nose_offset")]
    pub max_nose_offset: f32,

    /// 帧分析间隔（毫秒）
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// 检测置信度下限
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// 连续帧失败次数上限
    #[serde(default = "default_max_consecutive_frame_errors")]
    pub max_consecutive_frame_errors: u32,
}

fn default_max_eye_level_difference() -> f32 {
    10.0
}

fn default_max_nose_offset() -> f32 {
    20.0
}

fn default_frame_interval_ms() -> u64 {
    100
}

fn default_min_confidence() -> f32 {
    0.5
}

fn default_max_consecutive_frame_errors() -> u32 {
    30
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            max_eye_level_difference: default_max_eye_level_difference(),
            max_nose_offset: default_max_nose_offset(),
            frame_interval_ms: default_frame_interval_ms(),
            min_confidence: default_min_confidence(),
            max_consecutive_frame_errors: default_max_consecutive_frame_errors(),
        }
    }
}

/// 语音通话配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// 面试官名称
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    #[serde(default = "default_transcriber_provider")]
    pub transcriber_provider: String,

    #[serde(default = "default_transcriber_model")]
    pub transcriber_model: String,

    #[serde(default = "default_transcriber_language")]
    pub transcriber_language: String,

    #[serde(default = "default_voice_provider")]
    pub voice_provider: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_model_provider")]
    pub model_provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// 开场白模板，未设置时使用内置模板
    #[serde(default)]
    pub first_message: Option<String>,

    /// 系统 prompt 模板，未设置时使用内置模板
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// 候选人口头结束面试的短语
    #[serde(default = "default_end_phrases")]
    pub end_phrases: Vec<String>,

    /// 是否响应口头结束请求
    #[serde(default = "default_end_on_spoken_request")]
    pub end_on_spoken_request: bool,
}

fn default_assistant_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_string()
}

fn default_transcriber_provider() -> String {
    "deepgram".to_string()
}

fn default_transcriber_model() -> String {
    "nova-2".to_string()
}

fn default_transcriber_language() -> String {
    "en-US".to_string()
}

fn default_voice_provider() -> String {
    "playht".to_string()
}

fn default_voice_id() -> String {
    "jennifer".to_string()
}

fn default_model_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_end_phrases() -> Vec<String> {
    vec!["end interview".to_string(), "end the interview".to_string()]
}

fn default_end_on_spoken_request() -> bool {
    true
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            transcriber_provider: default_transcriber_provider(),
            transcriber_model: default_transcriber_model(),
            transcriber_language: default_transcriber_language(),
            voice_provider: default_voice_provider(),
            voice_id: default_voice_id(),
            model_provider: default_model_provider(),
            model: default_model(),
            first_message: None,
            system_prompt: None,
            end_phrases: default_end_phrases(),
            end_on_spoken_request: default_end_on_spoken_request(),
        }
    }
}

impl VoiceConfig {
    pub fn assistant_template(&self) -> AssistantTemplate {
        AssistantTemplate {
            name: self.assistant_name.clone(),
            first_message: self
                .first_message
                .clone()
                .unwrap_or_else(|| DEFAULT_FIRST_MESSAGE.to_string()),
            system_prompt: self
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            transcriber: TranscriberSelection {
                provider: self.transcriber_provider.clone(),
                model: self.transcriber_model.clone(),
                language: self.transcriber_language.clone(),
            },
            voice: VoiceSelection {
                provider: self.voice_provider.clone(),
                voice_id: self.voice_id.clone(),
            },
            model: ProviderSelection {
                provider: self.model_provider.clone(),
                model: self.model.clone(),
            },
        }
    }
}

/// 反馈合成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// OpenAI 兼容服务基础 URL
    #[serde(default = "default_synthesis_url")]
    pub url: String,

    #[serde(default = "default_synthesis_model")]
    pub model: String,

    /// 为空时使用本地 fake 客户端
    #[serde(default)]
    pub api_key: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_synthesis_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_synthesis_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_synthesis_model() -> String {
    "google/gemma-3n-e2b-it:free".to_string()
}

fn default_synthesis_timeout() -> u64 {
    60
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            url: default_synthesis_url(),
            model: default_synthesis_model(),
            api_key: String::new(),
            timeout_secs: default_synthesis_timeout(),
            max_retries: 0,
        }
    }
}

impl SynthesisConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// 日志用的脱敏 key
    pub fn masked_api_key(&self) -> String {
        if !self.has_api_key() {
            return "<not set>".to_string();
        }
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{}****", visible)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/viva.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
