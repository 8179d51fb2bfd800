use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::request::GenerationRequest;
use crate::prompts::PromptTemplate;
use crate::services::completion_service::{CompletionClient, CompletionParams, TokenUsage};
use crate::services::quiz_parser::parse_quiz;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    Malformed { attempt: u32, reason: String },
    TooFew { attempt: u32, got: usize, wanted: usize },
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Exactly `request.count()` questions.
    pub quiz: Quiz,
    pub attempts: u32,
    pub failures: Vec<AttemptFailure>,
    pub usage: TokenUsage,
}

#[derive(Clone)]
pub struct QuizGenerator {
    client: Arc<dyn CompletionClient>,
    template: PromptTemplate,
    params: CompletionParams,
    max_attempts: u32,
}

impl QuizGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, params: CompletionParams, max_attempts: u32) -> Self {
        Self {
            client,
            template: PromptTemplate::generation(),
            params,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn render_prompt(&self, request: &GenerationRequest) -> Result<String> {
        let number = request.count().to_string();
        self.template.render(&[
            ("text", request.text()),
            ("number", &number),
            ("subject", request.subject()),
            ("tone", request.tone()),
        ])
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        self.generate_observed(request, |_| Ok(())).await
    }

    /// Requests quizzes until one parses with at least `request.count()` questions.
    /// Malformed or short replies are retried with the same prompt; transport
    /// failures are returned immediately. `on_failure` sees each rejected
    /// attempt before the next request is sent.
    pub async fn generate_observed<F>(
        &self,
        request: &GenerationRequest,
        mut on_failure: F,
    ) -> Result<GenerationOutput>
    where
        F: FnMut(&AttemptFailure) -> Result<()> + Send,
    {
        let prompt = self.render_prompt(request)?;
        let wanted = request.count();
        let mut failures = Vec::new();
        let mut usage = TokenUsage::default();

        for attempt in 1..=self.max_attempts {
            tracing::info!(attempt, max_attempts = self.max_attempts, wanted, "requesting quiz generation");
            let completion = self.client.complete(&prompt, &self.params).await?;
            if let Some(u) = completion.usage {
                usage += u;
            }

            let failure = match parse_quiz(&completion.text) {
                Ok(mut quiz) if quiz.len() >= wanted => {
                    if quiz.len() > wanted {
                        tracing::info!(got = quiz.len(), wanted, "truncating quiz to requested count");
                    }
                    quiz.truncate(wanted);
                    return Ok(GenerationOutput {
                        quiz,
                        attempts: attempt,
                        failures,
                        usage,
                    });
                }
                Ok(quiz) => {
                    tracing::warn!(
                        attempt,
                        got = quiz.len(),
                        wanted,
                        raw = %completion.text,
                        "model returned too few questions, retrying"
                    );
                    AttemptFailure::TooFew {
                        attempt,
                        got: quiz.len(),
                        wanted,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        raw = %completion.text,
                        "model reply could not be parsed, retrying"
                    );
                    AttemptFailure::Malformed {
                        attempt,
                        reason: e.to_string(),
                    }
                }
            };
            on_failure(&failure)?;
            failures.push(failure);
        }

        tracing::error!(attempts = self.max_attempts, "quiz generation exhausted");
        Err(Error::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}
