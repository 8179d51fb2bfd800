use crate::config::Config;
use crate::dto::quiz_dto::{Submission, SubmissionOutcome};
use crate::error::{Error, Result};
use crate::models::request::GenerationRequest;
use crate::models::submission::{SubmissionState, SubmissionTracker};
use crate::services::completion_service::{CompletionClient, CompletionParams};
use crate::services::document_service::load_document;
use crate::services::generation_service::QuizGenerator;
use crate::services::presentation_service::QuizTable;
use crate::services::review_service::QuizReviewer;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

/// Runs one submission end to end: extract, generate, review, tabulate.
/// Holds no per-submission state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct QuizPipeline {
    generator: QuizGenerator,
    reviewer: QuizReviewer,
    timeout: Duration,
}

impl QuizPipeline {
    pub fn new(generator: QuizGenerator, reviewer: QuizReviewer, timeout: Duration) -> Self {
        Self {
            generator,
            reviewer,
            timeout,
        }
    }

    pub fn from_config(config: &Config, client: Arc<dyn CompletionClient>) -> Self {
        let params = CompletionParams::from_config(config);
        let generator =
            QuizGenerator::new(client.clone(), params.clone(), config.max_generation_attempts);
        let reviewer = QuizReviewer::new(client, params);
        Self::new(generator, reviewer, config.submission_timeout())
    }

    pub async fn run(&self, submission: Submission) -> Result<SubmissionOutcome> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("submission", submission_id = %id);

        async move {
            let mut tracker = SubmissionTracker::new(id);
            self.execute(submission, &mut tracker).await
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        submission: Submission,
        tracker: &mut SubmissionTracker,
    ) -> Result<SubmissionOutcome> {
        let result = tokio::time::timeout(self.timeout, self.drive(submission, tracker)).await;

        match result {
            Ok(Ok(outcome)) => {
                tracing::info!(attempts = outcome.attempts, "submission reviewed");
                Ok(outcome)
            }
            Ok(Err(e)) => {
                let state = tracker.state();
                tracker.fail();
                tracing::error!(error = ?e, %state, history = ?tracker.history(), "submission failed");
                Err(e)
            }
            Err(_) => {
                let state = tracker.state();
                tracker.fail();
                tracing::error!(%state, history = ?tracker.history(), "submission timed out");
                Err(Error::Timeout(self.timeout))
            }
        }
    }

    async fn drive(
        &self,
        submission: Submission,
        tracker: &mut SubmissionTracker,
    ) -> Result<SubmissionOutcome> {
        tracker.advance(SubmissionState::Submitted)?;
        submission.validate()?;

        tracker.advance(SubmissionState::Extracting)?;
        let text = load_document(&submission.file_name, submission.data).await?;
        let request =
            GenerationRequest::new(text, submission.mcq_count, submission.subject, submission.tone)?;

        tracker.advance(SubmissionState::Generating)?;
        let generation = self
            .generator
            .generate_observed(&request, |_| {
                // A failure after an earlier one means the retry ran.
                if tracker.state() == SubmissionState::ParseFailed {
                    tracker.advance(SubmissionState::Generating)?;
                }
                tracker.advance(SubmissionState::ParseFailed)
            })
            .await?;
        if tracker.state() == SubmissionState::ParseFailed {
            tracker.advance(SubmissionState::Generating)?;
        }
        tracker.advance(SubmissionState::Validated)?;

        let table = QuizTable::from(&generation.quiz);
        tracing::debug!("accepted quiz:\n{}", table.to_text());

        tracker.advance(SubmissionState::Reviewing)?;
        let review = self
            .reviewer
            .review(&generation.quiz, request.subject(), request.tone())
            .await?;
        tracker.advance(SubmissionState::Reviewed)?;

        let mut usage = generation.usage;
        if let Some(u) = review.usage {
            usage += u;
        }

        Ok(SubmissionOutcome {
            submission_id: tracker.id(),
            quiz: generation.quiz,
            table,
            review: review.review,
            usage,
            attempts: generation.attempts,
            history: tracker.history().to_vec(),
        })
    }
}
