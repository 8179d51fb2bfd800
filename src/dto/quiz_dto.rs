use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::submission::SubmissionState;
use crate::services::completion_service::TokenUsage;
use crate::services::presentation_service::{FormValues, QuizTable};
use crate::services::review_service::Review;
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// Form fields as they arrive; anything may be missing.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub file_name: Option<String>,
    pub data: Option<Bytes>,
    pub mcq_count: Option<String>,
    pub subject: Option<String>,
    pub tone: Option<String>,
}

impl SubmissionForm {
    pub fn form_values(&self) -> FormValues {
        FormValues {
            mcq_count: self
                .mcq_count
                .as_deref()
                .and_then(|c| c.trim().parse().ok()),
            subject: self.subject.clone().unwrap_or_default(),
            tone: self.tone.clone().unwrap_or_default(),
        }
    }

    pub fn into_submission(self) -> Result<Submission> {
        let file_name = self
            .file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::BadRequest("Please upload a PDF or txt file".into()))?;
        let data = self
            .data
            .ok_or_else(|| Error::BadRequest("Please upload a PDF or txt file".into()))?;
        let mcq_count = self
            .mcq_count
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::BadRequest("No. of MCQs is required".into()))?
            .parse::<usize>()
            .map_err(|_| Error::BadRequest("No. of MCQs must be a whole number".into()))?;
        let subject = required_text(self.subject, "Subject")?;
        let tone = required_text(self.tone, "Complexity level")?;

        Ok(Submission {
            file_name,
            data,
            mcq_count,
            subject,
            tone,
        })
    }
}

fn required_text(value: Option<String>, label: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::BadRequest(format!("{} is required", label)))
}

/// A complete submission, checked before any file is read.
#[derive(Debug, Clone, Validate)]
pub struct Submission {
    pub file_name: String,
    pub data: Bytes,
    #[validate(range(min = 3, max = 50, message = "number of MCQs must be between 3 and 50"))]
    pub mcq_count: usize,
    #[validate(length(min = 1, max = 20, message = "subject must be 1 to 20 characters"))]
    pub subject: String,
    #[validate(length(min = 1, max = 20, message = "tone must be 1 to 20 characters"))]
    pub tone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub quiz: Quiz,
    pub table: QuizTable,
    pub review: Review,
    pub usage: TokenUsage,
    pub attempts: u32,
    pub history: Vec<SubmissionState>,
}
