use crate::infrastructure::template::ChatTemplate;
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

// Fixed decoding parameters for every round of the loop.
pub const MAX_OUTPUT_TOKENS: u32 = 1500;
pub const TEMPERATURE: f32 = 0.8;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("inference engine returned invalid response: {0}")]
    InvalidResponse(String),
}

/// Opaque inference boundary: an ordered conversation in, one raw completion
/// string out. The completion may still carry chat-template artifacts that
/// the template's extractor strips.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;
}

/// Ollama-backed provider. Renders the conversation with the configured chat
/// template client-side and submits it as a raw prompt, so template handling
/// stays under our control rather than the server's.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    template: ChatTemplate,
    n_threads: u32,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        template: ChatTemplate,
        n_threads: u32,
    ) -> Self {
        Self::with_client(base_url, model, template, n_threads, Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        model: impl Into<String>,
        template: ChatTemplate,
        n_threads: u32,
        client: Client,
    ) -> Self {
        Self {
            http: client,
            base_url: base_url.into(),
            model: model.into(),
            template,
            n_threads,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{trimmed}/{path}")
    }
}

#[async_trait]
impl InferenceProvider for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.endpoint("/api/generate");
        let prompt = self.template.render(messages);
        info!(
            model = self.model.as_str(),
            url = %url,
            turns = messages.len(),
            template = self.template.name(),
            "Sending completion request to inference engine"
        );
        let response: GenerateResponse = self
            .http
            .post(url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                raw: true,
                stream: false,
                options: GenerateOptions {
                    num_predict: MAX_OUTPUT_TOKENS,
                    temperature: TEMPERATURE,
                    num_thread: self.n_threads,
                },
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Received completion from inference engine");

        response
            .response
            .ok_or_else(|| ModelError::InvalidResponse("missing response field".into()))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    num_thread: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}
