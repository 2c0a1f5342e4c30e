//! 编排器运行参数

use std::time::Duration;

use super::AssistantTemplate;
use crate::domain::attention::AttentionThresholds;
use crate::domain::focus::DEFAULT_FOCUS_VIOLATION_LIMIT;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// 切出页面次数上限
    pub focus_violation_limit: u32,
    /// 计时周期
    pub clock_tick: Duration,
    /// 帧分析间隔
    pub frame_interval: Duration,
    pub thresholds: AttentionThresholds,
    /// 检测置信度下限
    pub min_confidence: f32,
    /// 连续帧失败次数达到该值时终止会话
    pub max_consecutive_frame_errors: u32,
    pub assistant: AssistantTemplate,
    /// 候选人说出这些短语时结束面试（不区分大小写）
    pub end_phrases: Vec<String>,
    pub end_on_spoken_request: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            focus_violation_limit: DEFAULT_FOCUS_VIOLATION_LIMIT,
            clock_tick: Duration::from_secs(1),
            frame_interval: Duration::from_millis(100),
            thresholds: AttentionThresholds::default(),
            min_confidence: 0.5,
            max_consecutive_frame_errors: 30,
            assistant: AssistantTemplate::default(),
            end_phrases: vec!["end interview".to_string(), "end the interview".to_string()],
            end_on_spoken_request: true,
        }
    }
}

impl SessionSettings {
    /// 文本中是否包含结束短语
    pub fn is_end_request(&self, text: &str) -> bool {
        if !self.end_on_spoken_request {
            return false;
        }
        let text = text.to_lowercase();
        self.end_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .any(|p| !p.is_empty() && text.contains(&p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_request_matching() {
        let settings = SessionSettings::default();
        assert!(settings.is_end_request("Okay, please END INTERVIEW now"));
        assert!(!settings.is_end_request("I'd like to end this answer here"));

        let disabled = SessionSettings {
            end_on_spoken_request: false,
            ..Default::default()
        };
        assert!(!disabled.is_end_request("end interview"));
    }
}
