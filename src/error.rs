use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Parse error: {message}")]
    Parse {
        raw: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("Remote call error: {0}")]
    RemoteCall(String),

    #[error("Remote call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn parse(raw: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Parse {
            raw: raw.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn malformed(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            raw: raw.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Extraction(_) => StatusCode::BAD_REQUEST,
            Error::Multipart(err) => err.status(),
            Error::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::GenerationExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::RemoteCall(_) => StatusCode::BAD_GATEWAY,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to put in front of the user. Raw model replies, upstream
    /// bodies and internal errors stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(_) => {
                "OpenAI API key is missing. Please check your .env file.".to_string()
            }
            Error::BadRequest(msg) => msg.clone(),
            Error::Validation(err) => format!("Invalid input: {}", err),
            Error::UnsupportedFormat(_) => {
                "Unsupported file format: only PDF and text files are supported.".to_string()
            }
            Error::Extraction(msg) => format!("Could not read the uploaded file: {}", msg),
            Error::Multipart(_) => "The submitted form could not be read.".to_string(),
            Error::GenerationExhausted { attempts } => format!(
                "No valid MCQs were generated after {} attempts. Please try again.",
                attempts
            ),
            Error::Parse { .. } => {
                "The model returned a reply that could not be parsed.".to_string()
            }
            Error::RemoteCall(_) => {
                "The language model service could not be reached. Please try again later."
                    .to_string()
            }
            Error::Timeout(_) => "The language model took too long to respond.".to_string(),
            _ => "An unexpected error occurred".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = Json(json!({ "error": self.user_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::UnsupportedFormat("docx".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            Error::GenerationExhausted { attempts: 3 }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::RemoteCall("boom".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(Error::Timeout(std::time::Duration::from_secs(5)).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            Error::Timeout(std::time::Duration::from_millis(250)).to_string(),
            "Remote call timed out after 250ms"
        );
        assert_eq!(
            Error::Config("missing".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn user_message_hides_raw_reply_and_upstream_detail() {
        let parse = Error::malformed("{\"secret\": tru", "truncated");
        assert!(!parse.user_message().contains("secret"));

        let remote = Error::RemoteCall("401 Unauthorized: invalid key sk-abc".into());
        assert!(!remote.user_message().contains("sk-abc"));
    }

    #[test]
    fn parse_error_keeps_raw_text_and_source() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::parse("not json", source);
        match err {
            Error::Parse { raw, source, .. } => {
                assert_eq!(raw, "not json");
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
