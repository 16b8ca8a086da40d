//! Grammar and improvement-suggestion review of a single section's text.
//!
//! Both calls are best effort: a gateway or JSON failure is logged and the
//! section simply gets an empty list, so one flaky review never sinks a report.

use async_trait::async_trait;
use tracing::error;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::cv::{GrammarError, Suggestion};
use crate::scoring::prompts::{GRAMMAR_PROMPT_TEMPLATE, SUGGESTIONS_PROMPT_TEMPLATE};
use crate::scoring::sections::Section;

pub const MAX_SUGGESTIONS: usize = 3;

/// Reviews section text for language issues and improvements.
///
/// Carried by the scoring pipeline as `&dyn SectionReviewer`.
#[async_trait]
pub trait SectionReviewer: Send + Sync {
    async fn grammar_errors(&self, text: &str) -> Vec<GrammarError>;

    /// At most `MAX_SUGGESTIONS` items.
    async fn suggestions(&self, section: Section, text: &str) -> Vec<Suggestion>;
}

/// Reviewer backed by the language-model gateway.
#[derive(Clone)]
pub struct LlmReviewer {
    llm: LlmClient,
}

impl LlmReviewer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SectionReviewer for LlmReviewer {
    async fn grammar_errors(&self, text: &str) -> Vec<GrammarError> {
        if text.trim().is_empty() {
            return vec![];
        }

        let prompt = GRAMMAR_PROMPT_TEMPLATE
            .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
            .replace("{text}", text);

        match self.llm.call_json::<Vec<GrammarError>>(&prompt).await {
            Ok(errors) => errors,
            Err(e) => {
                error!("Error checking grammar: {e}");
                vec![]
            }
        }
    }

    async fn suggestions(&self, section: Section, text: &str) -> Vec<Suggestion> {
        if text.trim().is_empty() {
            return vec![];
        }

        let prompt = SUGGESTIONS_PROMPT_TEMPLATE
            .replace("{section}", section.label())
            .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
            .replace("{text}", text);

        match self.llm.call_json::<Vec<Suggestion>>(&prompt).await {
            Ok(mut suggestions) => {
                suggestions.truncate(MAX_SUGGESTIONS);
                suggestions
            }
            Err(e) => {
                error!("Error generating suggestions for {section}: {e}");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{client, ScriptedBackend};
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_empty_text_skips_gateway() {
        let backend = ScriptedBackend::new(|_, _| Ok("[]".to_string()));
        let reviewer = LlmReviewer::new(client(backend.clone(), &["m"]));

        assert!(reviewer.grammar_errors("   ").await.is_empty());
        assert!(reviewer.suggestions(Section::Skills, "").await.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_grammar_errors_parsed() {
        let backend = ScriptedBackend::new(|_, _| {
            Ok(r#"[{"location": "line 2", "type": "Grammar", "description": "tense", "suggestion": "led"}]"#
                .to_string())
        });
        let reviewer = LlmReviewer::new(client(backend, &["m"]));

        let errors = reviewer.grammar_errors("I lead the team last year").await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, "Grammar");
        assert_eq!(errors[0].suggestion, "led");
    }

    #[tokio::test]
    async fn test_suggestions_truncated_to_three() {
        let backend = ScriptedBackend::new(|_, prompt| {
            assert!(prompt.contains("(section: Work Experience)"));
            Ok(r#"[{"issue": "a", "suggestion": "1"}, {"issue": "b", "suggestion": "2"},
                  {"issue": "c", "suggestion": "3"}, {"issue": "d", "suggestion": "4"}]"#
                .to_string())
        });
        let reviewer = LlmReviewer::new(client(backend, &["m"]));

        let suggestions = reviewer
            .suggestions(Section::WorkExperience, "Did things")
            .await;
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[2].issue, "c");
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty_lists() {
        let backend = ScriptedBackend::new(|_, _| Err(LlmError::EmptyContent));
        let reviewer = LlmReviewer::new(client(backend, &["m"]));
        assert!(reviewer.grammar_errors("text").await.is_empty());

        let backend = ScriptedBackend::new(|_, _| Ok("not json".to_string()));
        let reviewer = LlmReviewer::new(client(backend, &["m"]));
        assert!(reviewer.suggestions(Section::Summary, "text").await.is_empty());
    }
}
