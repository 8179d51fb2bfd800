use crate::error::Result;
use crate::models::quiz::Quiz;
use crate::prompts::PromptTemplate;
use crate::services::completion_service::{CompletionClient, CompletionParams, TokenUsage};
use serde::Serialize;
use std::sync::Arc;

/// Free-text evaluation of a quiz, presented verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Review(String);

impl Review {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct ReviewOutput {
    pub review: Review,
    pub usage: Option<TokenUsage>,
}

#[derive(Clone)]
pub struct QuizReviewer {
    client: Arc<dyn CompletionClient>,
    template: PromptTemplate,
    params: CompletionParams,
}

impl QuizReviewer {
    pub fn new(client: Arc<dyn CompletionClient>, params: CompletionParams) -> Self {
        Self {
            client,
            template: PromptTemplate::review(),
            params,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// One round trip, no retry.
    pub async fn review(&self, quiz: &Quiz, subject: &str, tone: &str) -> Result<ReviewOutput> {
        let quiz_json = serde_json::to_string(quiz)?;
        let prompt = self.template.render(&[
            ("subject", subject),
            ("tone", tone),
            ("quiz", &quiz_json),
        ])?;

        tracing::info!(questions = quiz.len(), "requesting quiz review");
        let completion = self.client.complete(&prompt, &self.params).await?;

        Ok(ReviewOutput {
            review: Review::new(completion.text.trim()),
            usage: completion.usage,
        })
    }
}
