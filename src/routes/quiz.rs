use crate::dto::quiz_dto::{SubmissionForm, SubmissionOutcome};
use crate::error::{Error, Result};
use crate::services::presentation_service::{render_page, FormValues, PageView};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
    Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let error = state.pipeline().err().map(|e| e.user_message());
    Html(render_page(&PageView {
        error,
        ..Default::default()
    }))
}

/// HTML flow: failures are rendered as a banner above the populated form.
pub async fn submit_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (form_values, result) = match read_form(multipart).await {
        Ok(form) => {
            let values = form.form_values();
            (values, run_submission(&state, form).await)
        }
        Err(e) => (FormValues::default(), Err(e)),
    };

    match result {
        Ok(outcome) => Html(render_page(&PageView {
            form: form_values,
            error: None,
            table: Some(&outcome.table),
            review: Some(&outcome.review),
            usage: Some(outcome.usage),
        }))
        .into_response(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(error = ?e, "quiz submission failed");
            } else {
                tracing::warn!(error = %e, "quiz submission rejected");
            }
            let page = render_page(&PageView {
                form: form_values,
                error: Some(e.user_message()),
                ..Default::default()
            });
            (status, Html(page)).into_response()
        }
    }
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmissionOutcome>> {
    let form = read_form(multipart).await?;
    let outcome = run_submission(&state, form).await?;
    Ok(Json(outcome))
}

async fn run_submission(state: &AppState, form: SubmissionForm) -> Result<SubmissionOutcome> {
    let pipeline = state.pipeline()?;
    let submission = form.into_submission()?;
    pipeline.run(submission).await
}

async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.data = Some(field.bytes().await.map_err(Error::Multipart)?);
            }
            "mcq_count" => form.mcq_count = Some(field.text().await.map_err(Error::Multipart)?),
            "subject" => form.subject = Some(field.text().await.map_err(Error::Multipart)?),
            "tone" => form.tone = Some(field.text().await.map_err(Error::Multipart)?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}
