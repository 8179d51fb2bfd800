use crate::error::Result;
use validator::Validate;

/// Parameters of one generation round trip. Built once per submission and
/// never modified, so every retry sends the same prompt.
#[derive(Debug, Clone, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "the document contains no extractable text"))]
    text: String,
    #[validate(range(min = 3, max = 50, message = "number of MCQs must be between 3 and 50"))]
    count: usize,
    #[validate(length(min = 1, max = 20, message = "subject must be 1 to 20 characters"))]
    subject: String,
    #[validate(length(min = 1, max = 20, message = "tone must be 1 to 20 characters"))]
    tone: String,
}

impl GenerationRequest {
    pub fn new(
        text: impl Into<String>,
        count: usize,
        subject: impl Into<String>,
        tone: impl Into<String>,
    ) -> Result<Self> {
        let request = Self {
            text: text.into(),
            count,
            subject: subject.into().trim().to_string(),
            tone: tone.into().trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }
}
