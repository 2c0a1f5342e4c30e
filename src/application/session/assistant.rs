//! 通话配置模板
//!
//! 支持的占位符: `{{candidate}}` `{{role}}` `{{questions}}` `{{job_description}}`

use crate::application::ports::{
    AssistantConfig, ProviderSelection, TranscriberSelection, VoiceSelection,
};
use crate::domain::session::SessionContext;

pub const DEFAULT_ASSISTANT_NAME: &str = "AI Recruiter";

pub const DEFAULT_FIRST_MESSAGE: &str = "Hi {{candidate}}, thanks for joining. I'll be conducting your interview today for the {{role}} position. Are you ready to begin?";

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a senior interviewer running a voice interview for the {{role}} role.
Role description: {{job_description}}

Core questions, ask them one by one and wait for each answer:
{{questions}}

Rules:
- Ask one or two short follow-up questions after each answer to check the reasoning.
- Never explain or hint at the correct answer. If the candidate does not know, say "Okay, let's move on."
- Keep a neutral, courteous tone and keep your turns short.
- After the last question, ask whether the candidate has questions about the role and answer briefly.
- Close with: "Thank you for your time today. Our recruiting team will be in touch regarding the next steps." Do not give feedback on performance, then end the call."#;

/// 通话配置模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTemplate {
    pub name: String,
    pub first_message: String,
    pub system_prompt: String,
    pub transcriber: TranscriberSelection,
    pub voice: VoiceSelection,
    pub model: ProviderSelection,
}

impl Default for AssistantTemplate {
    fn default() -> Self {
        Self {
            name: DEFAULT_ASSISTANT_NAME.to_string(),
            first_message: DEFAULT_FIRST_MESSAGE.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            transcriber: TranscriberSelection {
                provider: "deepgram".to_string(),
                model: "nova-2".to_string(),
                language: "en-US".to_string(),
            },
            voice: VoiceSelection {
                provider: "playht".to_string(),
                voice_id: "jennifer".to_string(),
            },
            model: ProviderSelection {
                provider: "openai".to_string(),
                model: "gpt-4".to_string(),
            },
        }
    }
}

impl AssistantTemplate {
    /// 用会话上下文填充模板
    pub fn render(&self, context: &SessionContext) -> AssistantConfig {
        AssistantConfig {
            name: self.name.clone(),
            first_message: substitute(&self.first_message, context),
            transcriber: self.transcriber.clone(),
            voice: self.voice.clone(),
            model: self.model.clone(),
            system_prompt: substitute(&self.system_prompt, context).trim().to_string(),
        }
    }
}

fn substitute(template: &str, context: &SessionContext) -> String {
    let description = context
        .job_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("not provided");
    template
        .replace("{{candidate}}", context.candidate_name.trim())
        .replace("{{role}}", context.job_position.trim())
        .replace("{{questions}}", &context.question_list())
        .replace("{{job_description}}", description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{InterviewQuestion, SessionId};

    fn context() -> SessionContext {
        SessionContext::new(
            SessionId::new("iv-2").unwrap(),
            "Grace",
            "grace@example.com",
            "Compiler Engineer",
            vec![
                InterviewQuestion::new("What is SSA form?"),
                InterviewQuestion::new("How does register allocation work?"),
            ],
        )
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let config = AssistantTemplate::default().render(&context());
        assert!(config.first_message.starts_with("Hi Grace,"));
        assert!(config.first_message.contains("Compiler Engineer position"));
        assert!(config
            .system_prompt
            .contains("What is SSA form?, How does register allocation work?"));
        assert!(config.system_prompt.contains("Role description: not provided"));
        assert!(!config.system_prompt.contains("{{"));
    }

    #[test]
    fn test_render_keeps_provider_selection() {
        let config = AssistantTemplate::default().render(&context());
        assert_eq!(config.name, "AI Recruiter");
        assert_eq!(config.transcriber.model, "nova-2");
        assert_eq!(config.voice.voice_id, "jennifer");
        assert_eq!(config.model.provider, "openai");
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = AssistantTemplate::default().render(&context().with_job_description("LLVM"));
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("firstMessage").is_some());
        assert!(json["systemPrompt"].as_str().unwrap().contains("LLVM"));
        assert_eq!(json["voice"]["voiceId"], "jennifer");
    }
}
