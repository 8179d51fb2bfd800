use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use mcq_generator::{
    config::Config,
    error::Result,
    routes,
    services::completion_service::{Completion, CompletionClient, CompletionParams},
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

const BOUNDARY: &str = "mcq-test-boundary";

const SUN_QUIZ: &str = r#"Here is your quiz:
```json
{"quiz": [
  {"mcq": "What is the sun?", "options": {"a": "A star", "b": "A planet", "c": "A moon", "d": "A comet"}, "answer": "a"},
  {"mcq": "What does the sun give off?", "options": {"a": "Darkness", "b": "Light", "c": "Water", "d": "Ice"}, "answer": "b"},
  {"mcq": "Where is the sun?", "options": {"a": "In the ocean", "b": "On Earth", "c": "At the center of the solar system", "d": "On the Moon"}, "answer": "c"},
  {"mcq": "Is the sun hot?", "options": {"a": "No", "b": "Only at night", "c": "Never", "d": "Yes"}, "answer": "d"}
]}
```"#;

/// Replays canned replies in order, repeating the last one.
struct ScriptedClient {
    replies: Vec<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str, _params: &CompletionParams) -> Result<Completion> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .get(idx)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_default();
        Ok(Completion::from_text(reply))
    }
}

fn app_with(client: Arc<ScriptedClient>, config: Config) -> Router {
    routes::app(AppState::with_client(config, client))
}

fn app(client: Arc<ScriptedClient>) -> Router {
    app_with(client, Config::default())
}

fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn submit(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn sun_submission(file_name: &str, count: &str) -> Vec<u8> {
    multipart_body(
        Some((file_name, b"The sun is a star.")),
        &[("mcq_count", count), ("subject", "Science"), ("tone", "Simple")],
    )
}

async fn json_body(res: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn text_upload_produces_quiz_table_and_review() {
    let client = ScriptedClient::new(&[SUN_QUIZ, "\n  A clear quiz for beginners.  \n"]);
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "3")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;

    let quiz = body["quiz"]["quiz"].as_array().unwrap();
    assert_eq!(quiz.len(), 3);
    for question in quiz {
        let answer = question["answer"].as_str().unwrap();
        assert!(["a", "b", "c", "d"].contains(&answer));
        assert!(question["options"][answer].is_string());
    }
    let table = body["table"].as_array().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table[0]["Question"], "What is the sun?");
    assert_eq!(table[2]["Answer"], "c");
    assert_eq!(body["review"], "A clear quiz for beginners.");
    assert_eq!(body["attempts"], 1);
    assert_eq!(client.calls(), 2);

    let prompts = client.prompts.lock().unwrap();
    assert!(prompts[0].contains("The sun is a star."));
    assert!(prompts[1].contains("What is the sun?"));
}

#[tokio::test]
async fn unsupported_extension_is_rejected_without_model_calls() {
    let client = ScriptedClient::new(&[SUN_QUIZ]);
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", sun_submission("notes.docx", "3")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("Unsupported file format"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unparseable_replies_exhaust_attempts() {
    let client = ScriptedClient::new(&["not json"]);
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "3")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("after 3 attempts"));
    assert!(!message.contains("not json"));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn short_reply_is_retried_and_history_records_it() {
    let short = r#"{"quiz": [{"mcq": "Only one?", "options": {"a": "1", "b": "2", "c": "3", "d": "4"}, "answer": "a"}]}"#;
    let client = ScriptedClient::new(&[short, SUN_QUIZ, "Fine."]);
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "4")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["quiz"]["quiz"].as_array().unwrap().len(), 4);
    assert_eq!(body["attempts"], 2);

    let history: Vec<&str> = body["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(history.first(), Some(&"idle"));
    assert!(history.contains(&"parse_failed"));
    assert_eq!(history.last(), Some(&"reviewed"));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn form_submission_renders_table_and_review() {
    let client = ScriptedClient::new(&[SUN_QUIZ, "Well balanced <b>quiz</b>."]);
    let res = app(client)
        .oneshot(submit("/quizzes", sun_submission("sun.txt", "3")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let html = text_body(res).await;
    assert!(html.contains("<th>Option D</th>"));
    assert_eq!(html.matches("<tr>").count(), 4);
    assert!(html.contains("Well balanced &lt;b&gt;quiz&lt;/b&gt;."));
    assert!(html.contains("Total Tokens:"));
    assert!(!html.contains("role=\"alert\""));
}

#[tokio::test]
async fn form_failure_shows_banner_and_keeps_values() {
    let client = ScriptedClient::new(&[SUN_QUIZ]);
    let res = app(client.clone())
        .oneshot(submit("/quizzes", sun_submission("slides.pptx", "5")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let html = text_body(res).await;
    assert!(html.contains("role=\"alert\">Unsupported file format"));
    assert!(html.contains("value=\"Science\""));
    assert!(html.contains("value=\"5\""));
    assert!(!html.contains("<table"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn out_of_range_count_is_rejected() {
    let client = ScriptedClient::new(&[SUN_QUIZ]);
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "51")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_file_is_a_bad_request() {
    let client = ScriptedClient::new(&[SUN_QUIZ]);
    let body = multipart_body(
        None,
        &[("mcq_count", "3"), ("subject", "Science"), ("tone", "Simple")],
    );
    let res = app(client.clone())
        .oneshot(submit("/api/quizzes", body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_api_key_disables_generation() {
    let state = AppState::new(Config::default()).unwrap();
    assert!(state.pipeline.is_none());
    let app = routes::app(state);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = text_body(res).await;
    assert!(html.contains("OpenAI API key is missing"));

    let res = app
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "3")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn submissions_are_throttled() {
    let client = ScriptedClient::new(&[SUN_QUIZ]);
    let config = Config {
        submit_rps: 1,
        ..Config::default()
    };
    let app = app_with(client, config);

    let first = app
        .clone()
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "0")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app
        .clone()
        .oneshot(submit("/api/quizzes", sun_submission("sun.txt", "0")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_generator_readiness() {
    let res = app(ScriptedClient::new(&[SUN_QUIZ]))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["generator_ready"], true);
}
