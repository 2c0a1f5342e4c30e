//! Feedback Context - 面试反馈
//!
//! 职责:
//! - 合成结果的结构（评分、总结、录用建议）
//! - 从模型输出中提取 JSON
//! - 反馈 prompt 文本

mod errors;
mod extract;
mod report;

pub use errors::FeedbackError;
pub use extract::{extract_json_object, parse_feedback_payload};
pub use report::{feedback_prompt, FeedbackReport, Rating};
