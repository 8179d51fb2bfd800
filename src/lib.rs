pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod services;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    completion_service::{CompletionClient, OpenAiClient},
    submission_service::QuizPipeline,
};
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no API key is configured; the form still renders, submissions fail.
    pub pipeline: Option<Arc<QuizPipeline>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = match config.require_api_key().map(str::to_string) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(error = %e, "quiz generation disabled");
                return Ok(Self {
                    config: Arc::new(config),
                    pipeline: None,
                });
            }
        };

        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("http client: {}", e)))?;
        let client = OpenAiClient::new(api_key, config.openai_base_url.clone(), http_client);

        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let pipeline = QuizPipeline::from_config(&config, client);
        Self {
            config: Arc::new(config),
            pipeline: Some(Arc::new(pipeline)),
        }
    }

    pub fn pipeline(&self) -> Result<&QuizPipeline> {
        self.pipeline
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".into()))
    }
}
