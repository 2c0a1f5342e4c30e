//! Feedback Context - 合成结果

use serde::{Deserialize, Serialize};

/// 分项评分（0-10）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default)]
    pub technical_skills: f32,
    #[serde(default)]
    pub communication: f32,
    #[serde(default)]
    pub problem_solving: f32,
    #[serde(default)]
    pub experience: f32,
}

impl Rating {
    pub fn average(&self) -> f32 {
        (self.technical_skills + self.communication + self.problem_solving + self.experience) / 4.0
    }
}

/// 反馈报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    #[serde(default)]
    pub rating: Rating,
    #[serde(default, alias = "summery")]
    pub summary: String,
    #[serde(default, rename = "Recommendation")]
    pub recommendation: String,
    #[serde(default, rename = "RecommendationMsg")]
    pub recommendation_msg: String,
}

impl FeedbackReport {
    /// 模型给出的录用倾向；只有明确的 "no" 视为不推荐
    pub fn is_recommended(&self) -> bool {
        !self.recommendation.trim().eq_ignore_ascii_case("no")
    }
}

/// 反馈合成 prompt
pub fn feedback_prompt(job_position: &str, conversation: &serde_json::Value) -> String {
    format!(
        r#"{conversation}

Based on this interview conversation between the assistant and the candidate for the {job_position} role,
give feedback on the candidate's performance. Rate technical skills, communication, problem solving
and experience out of 10, summarize the interview in 3 lines and state whether the candidate is
recommended for hire together with a one line message. Use this JSON shape:
{{
  "feedback": {{
    "rating": {{
      "technicalSkills": 0,
      "communication": 0,
      "problemSolving": 0,
      "experience": 0
    }},
    "summary": "<in 3 lines>",
    "Recommendation": "<Yes or No>",
    "RecommendationMsg": "<one line message>"
  }}
}}

IMPORTANT:
Return ONLY valid JSON. No explanation text. No markdown. No commentary.
Your entire response MUST be 100% valid JSON."#,
        conversation = conversation,
        job_position = job_position,
    )
}
