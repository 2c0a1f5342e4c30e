//! Session Context - 会话输入

use serde::{Deserialize, Serialize};

use super::SessionContextError;

/// 会话标识（即面试 ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, SessionContextError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SessionContextError::EmptySessionId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 预先准备的面试题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    /// 题目类型（Technical / Behavioral ...），仅用于展示
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl InterviewQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            kind: None,
        }
    }
}

/// 会话上下文
///
/// 创建后不可变，由宿主应用持有，编排器只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: SessionId,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_position: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub questions: Vec<InterviewQuestion>,
}

impl SessionContext {
    pub fn new(
        session_id: SessionId,
        candidate_name: impl Into<String>,
        candidate_email: impl Into<String>,
        job_position: impl Into<String>,
        questions: Vec<InterviewQuestion>,
    ) -> Self {
        Self {
            session_id,
            candidate_name: candidate_name.into(),
            candidate_email: candidate_email.into(),
            job_position: job_position.into(),
            job_description: None,
            questions,
        }
    }

    pub fn with_job_description(mut self, description: impl Into<String>) -> Self {
        self.job_description = Some(description.into());
        self
    }

    /// 校验上下文是否可以开始面试
    pub fn validate(&self) -> Result<(), SessionContextError> {
        if self.session_id.as_str().trim().is_empty() {
            return Err(SessionContextError::EmptySessionId);
        }
        if self.candidate_name.trim().is_empty() {
            return Err(SessionContextError::EmptyCandidateName);
        }
        if self.job_position.trim().is_empty() {
            return Err(SessionContextError::EmptyJobPosition);
        }
        if let Some(index) = self
            .questions
            .iter()
            .position(|q| q.question.trim().is_empty())
        {
            return Err(SessionContextError::BlankQuestion(index));
        }
        Ok(())
    }

    /// 题目列表，逗号分隔（用于 prompt 模板替换）
    pub fn question_list(&self) -> String {
        self.questions
            .iter()
            .map(|q| q.question.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SessionContext {
        SessionContext::new(
            SessionId::new("iv-1").unwrap(),
            "Ada",
            "ada@example.com",
            "Backend Engineer",
            vec![
                InterviewQuestion::new("Explain ownership"),
                InterviewQuestion::new(" Describe a hard bug "),
            ],
        )
    }

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::new("  ").is_err());
        assert_eq!(SessionId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_question_list_is_comma_joined() {
        assert_eq!(
            context().question_list(),
            "Explain ownership, Describe a hard bug"
        );
    }

    #[test]
    fn test_validate() {
        assert!(context().validate().is_ok());

        let mut ctx = context();
        ctx.job_position = String::new();
        assert!(matches!(
            ctx.validate(),
            Err(SessionContextError::EmptyJobPosition)
        ));

        let mut ctx = context();
        ctx.questions.push(InterviewQuestion::new(""));
        assert!(matches!(
            ctx.validate(),
            Err(SessionContextError::BlankQuestion(2))
        ));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "sessionId": "iv-9",
            "candidateName": "Lin",
            "candidateEmail": "lin@example.com",
            "jobPosition": "SRE",
            "questions": [{"question": "What is an SLO?", "type": "Technical"}]
        }"#;
        let ctx: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.session_id.as_str(), "iv-9");
        assert_eq!(ctx.questions[0].kind.as_deref(), Some("Technical"));
        assert!(ctx.job_description.is_none());
    }
}
