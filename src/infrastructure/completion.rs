//! Chat-completion client for OpenAI-compatible APIs

use std::thread;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Errors from talking to the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("No API key given and OPENAI_API_KEY is not set")]
    MissingApiKey,
}

impl CompletionError {
    /// True for failures that a (different) API key would fix.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CompletionError::MissingApiKey | CompletionError::Http { status: 401 | 403 }
        )
    }
}

/// Completion operations as a trait, so services can run against a mock.
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the completion text.
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Builder for [`OpenAiClient`].
#[derive(Debug, Default)]
pub struct OpenAiClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
}

impl OpenAiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the client. The API key falls back to the `OPENAI_API_KEY`
    /// environment variable; everything else falls back to the module
    /// defaults.
    pub fn build(self) -> Result<OpenAiClient, CompletionError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var(API_KEY_ENV_VAR).map_err(|_| CompletionError::MissingApiKey)?,
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(CompletionError::Network)?;

        Ok(OpenAiClient {
            client,
            base_url,
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: self.top_p.unwrap_or(DEFAULT_TOP_P),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

/// Synchronous client for the `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn builder() -> OpenAiClientBuilder {
        OpenAiClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn complete_internal(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "top_p": self.top_p,
        });

        retry_with_backoff(|| {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .map_err(classify_send_error)?;

            let status = response.status();
            if !status.is_success() {
                // Client errors usually carry a message worth showing; server
                // errors go through the retryable Http variant.
                if status.is_client_error() {
                    if let Some(message) = response
                        .json::<serde_json::Value>()
                        .ok()
                        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                    {
                        return Err(CompletionError::Api { message });
                    }
                }
                return Err(CompletionError::Http {
                    status: status.as_u16(),
                });
            }

            let json: serde_json::Value = response.json().map_err(CompletionError::Network)?;
            json["choices"][0]["message"]["content"]
                .as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    CompletionError::MalformedResponse(
                        "missing choices[0].message.content".to_string(),
                    )
                })
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.complete_internal(prompt)
    }
}

fn classify_send_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout(error)
    } else {
        CompletionError::Network(error)
    }
}

/// Retry an operation up to three extra times with 1s/2s/4s delays. Only
/// transient failures (network, timeout, HTTP 5xx) are retried.
pub fn retry_with_backoff<F, T>(mut f: F) -> Result<T, CompletionError>
where
    F: FnMut() -> Result<T, CompletionError>,
{
    const DELAYS: [u64; 3] = [1, 2, 4]; // seconds

    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) => {
            if !should_retry(&e) {
                return Err(e);
            }
            e
        }
    };

    for &delay_secs in &DELAYS {
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

fn should_retry(error: &CompletionError) -> bool {
    match error {
        CompletionError::Network(_) => true,
        CompletionError::Timeout(_) => true,
        CompletionError::Http { status } => *status >= 500 && *status < 600,
        CompletionError::Api { .. } => false,
        CompletionError::MalformedResponse(_) => false,
        CompletionError::InvalidUrl(_) => false,
        CompletionError::MissingApiKey => false,
    }
}
