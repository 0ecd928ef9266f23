use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::token::IamTokenManager;
use super::{GptError, TransportError};
use crate::config::GptConfig;

/// Near-deterministic sampling for extraction work.
const TEMPERATURE: f64 = 0.1;

/// Timeout for one completion round trip.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Completion endpoint abstraction (allows mocking the model).
pub trait CompletionClient {
    /// One completion call: the prompt goes up, the top alternative's text
    /// comes back verbatim. No post-processing here.
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GptError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GptError> {
        (**self).complete(prompt, max_tokens)
    }
}

/// HTTP client for the YandexGPT completion endpoint.
pub struct YandexGptClient {
    endpoint: String,
    folder_id: String,
    model_uri: String,
    tokens: Arc<IamTokenManager>,
    http: reqwest::blocking::Client,
}

impl YandexGptClient {
    pub fn new(config: &GptConfig, tokens: Arc<IamTokenManager>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: config.completion_endpoint.clone(),
            folder_id: config.folder_id.clone(),
            model_uri: config.model_uri(),
            tokens,
            http,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: &'a str,
    completion_options: CompletionOptions,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    text: String,
}

impl CompletionClient for YandexGptClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GptError> {
        let token = self.tokens.token()?;

        let body = CompletionRequest {
            model_uri: &self.model_uri,
            completion_options: CompletionOptions {
                stream: false,
                temperature: TEMPERATURE,
                max_tokens,
            },
            messages: vec![Message {
                role: "user",
                text: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&token)
            .header("x-folder-id", &self.folder_id)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    TransportError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    TransportError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: CompletionResponse = response
            .json()
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        let first = parsed
            .result
            .alternatives
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::MalformedResponse("empty alternatives array".into()))?;

        Ok(first.message.text)
    }
}

/// Mock completion client for tests — fixed response or fixed failure,
/// counts invocations.
pub struct MockCompletionClient {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Respond(String),
    Fail { status: u16, body: String },
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: MockOutcome::Respond(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            outcome: MockOutcome::Fail {
                status,
                body: body.to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, GptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::Fail { status, body } => Err(TransportError::Status {
                status: *status,
                body: body.clone(),
            }
            .into()),
        }
    }
}
