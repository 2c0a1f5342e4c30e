//! 模型输出解析
//!
//! 模型被要求只返回 JSON，但实际输出可能带有 markdown 代码块或解释文字

use serde_json::Value;

use super::{FeedbackError, FeedbackReport};

/// 返回文本中第一个完整的 JSON 对象（原样切片）
pub fn extract_json_object(text: &str) -> Option<&str> {
    for (start, _) in text.match_indices('{') {
        let candidate = &text[start..];
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(Value::Object(_))) = stream.next() {
            let end = start + stream.byte_offset();
            return Some(&text[start..end]);
        }
    }
    None
}

/// 解析合成服务输出
///
/// 返回原始 payload（去掉 `feedback` 外层包裹）和结构化报告
pub fn parse_feedback_payload(text: &str) -> Result<(Value, FeedbackReport), FeedbackError> {
    let raw = extract_json_object(text).ok_or(FeedbackError::NoJsonObject)?;
    let mut value: Value =
        serde_json::from_str(raw).map_err(|e| FeedbackError::InvalidShape(e.to_string()))?;

    if let Some(inner) = value.get("feedback").filter(|v| v.is_object()).cloned() {
        value = inner;
    }

    let report: FeedbackReport = serde_json::from_value(value.clone())
        .map_err(|e| FeedbackError::InvalidShape(e.to_string()))?;
    Ok((value, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_extract_from_surrounding_text() {
        let text = "Sure! Here is the feedback:\n```json\n{\"a\": {\"b\": 2}}\n```\nGood luck.";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_extract_skips_malformed_prefix() {
        let text = "{not json} then {\"ok\": true} and {\"second\": 1}";
        assert_eq!(extract_json_object(text), Some("{\"ok\": true}"));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ unterminated"), None);
    }

    #[test]
    fn test_parse_unwraps_feedback_envelope() {
        let text = r#"Result: {"feedback": {"rating": {"technicalSkills": 7, "communication": 8,
            "problemSolving": 6, "experience": 5}, "summery": "Solid basics.",
            "Recommendation": "Yes", "RecommendationMsg": "Proceed to onsite."}}"#;
        let (payload, report) = parse_feedback_payload(text).unwrap();
        assert!(payload.get("feedback").is_none());
        assert_eq!(report.rating.communication, 8.0);
        assert_eq!(report.summary, "Solid basics.");
        assert!(report.is_recommended());
    }

    #[test]
    fn test_parse_without_json_fails() {
        assert!(matches!(
            parse_feedback_payload("I cannot help with that."),
            Err(FeedbackError::NoJsonObject)
        ));
    }
}
