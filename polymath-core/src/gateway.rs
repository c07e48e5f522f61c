//! Model gateway — OpenAI-compatible chat completions client.
//!
//! Defines the `ModelGateway` trait for one-shot prompt round trips, an
//! implementation over reqwest for any endpoint following the OpenAI chat
//! completions format (x.ai Grok by default), and a mock for tests.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{ConfigError, GatewayError, PolymathError};
use crate::prompt::{Prompt, Sampling};

/// One completion request: a system/user prompt pair plus sampling parameters.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

impl GatewayRequest {
    /// Pair a built prompt with its kind's sampling parameters.
    pub fn from_prompt(prompt: Prompt, sampling: Sampling) -> Self {
        Self {
            system_prompt: prompt.system,
            user_prompt: prompt.user,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        }
    }
}

/// Token accounting for one round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// The first completion's text content, unmodified, plus usage metadata.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Trait for model gateways. One blocking round trip per call; no retry or
/// streaming is part of the contract (retries, when configured, stay behind
/// the implementation and never change the exposed error kinds).
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Perform one completion round trip.
    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, PolymathError>;

    /// Return the configured model name.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible gateway over reqwest.
pub struct OpenAiGateway {
    client: Client,
    config: LlmConfig,
}

impl OpenAiGateway {
    /// Create a new gateway from configuration.
    ///
    /// The API key is NOT resolved here: absence of the credential surfaces
    /// as a `ConfigError` on the first call, not at construction.
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    /// Resolve the API key from config or the configured environment variable.
    fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var(&self.config.api_key_env).ok())
            .ok_or_else(|| ConfigError::EnvVarMissing {
                var: self.config.api_key_env.clone(),
            })
    }

    /// Build the chat completions request body.
    fn build_body(&self, request: &GatewayRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "temperature": request.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Parse an OpenAI-format response body into a GatewayResponse.
    fn parse_response(body: &Value, model: &str) -> Result<GatewayResponse, GatewayError> {
        let text = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(GatewayError::EmptyCompletion)?
            .to_string();

        let usage_obj = body.get("usage");
        let usage = TokenUsage {
            input_tokens: usage_obj
                .and_then(|u| u.get("prompt_tokens"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0) as usize,
            output_tokens: usage_obj
                .and_then(|u| u.get("completion_tokens"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0) as usize,
        };

        let resp_model = body
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(model)
            .to_string();

        Ok(GatewayResponse {
            text,
            model: resp_model,
            usage,
        })
    }

    /// Map an HTTP status code to the appropriate GatewayError.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> GatewayError {
        match status.as_u16() {
            401 => {
                debug!(body = %body, "authentication failed (401)");
                GatewayError::AuthFailed {
                    provider: "OpenAI-compatible".to_string(),
                }
            }
            429 => {
                // Try to extract "try again in Xs" from the error message
                let retry_secs = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| {
                        v.get("error")?
                            .get("message")?
                            .as_str()
                            .map(|s| s.to_string())
                    })
                    .and_then(|msg| {
                        msg.rsplit("in ")
                            .next()
                            .and_then(|s| s.trim_end_matches('s').parse::<u64>().ok())
                    })
                    .unwrap_or(5);
                GatewayError::RateLimited {
                    retry_after_secs: retry_secs,
                }
            }
            _ => GatewayError::ApiRequest {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            },
        }
    }

    /// One request/response exchange with the endpoint.
    async fn try_request(
        &self,
        api_key: &str,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(request);

        debug!(url = %url, model = %self.config.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Connection {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| GatewayError::Connection {
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &response_body));
        }

        let json: Value =
            serde_json::from_str(&response_body).map_err(|e| GatewayError::ApiRequest {
                message: format!("invalid JSON in response: {e}"),
            })?;

        Self::parse_response(&json, &self.config.model)
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, PolymathError> {
        let api_key = self.resolve_api_key()?;

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                warn!(
                    attempt = attempt,
                    max_retries = self.config.max_retries,
                    "retrying completion request"
                );
            }
            match self.try_request(&api_key, &request).await {
                Ok(response) => return Ok(response),
                Err(e) => last_error = Some(e),
            }
        }

        // max_retries defaults to 0, so the loop above always ran at least once
        Err(last_error
            .unwrap_or(GatewayError::EmptyCompletion)
            .into())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// A mock gateway returning queued responses, for tests.
///
/// Queued entries are served in order; an empty queue yields a placeholder
/// text response. Failures can be queued to exercise error paths.
pub struct MockGateway {
    model: String,
    responses: std::sync::Mutex<Vec<Result<String, GatewayError>>>,
    requests: std::sync::Mutex<Vec<GatewayRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a MockGateway that always returns the given text.
    pub fn with_response(text: &str) -> Self {
        let gateway = Self::new();
        for _ in 0..20 {
            gateway.queue_response(text);
        }
        gateway
    }

    /// Queue a text response for the next `complete` call.
    pub fn queue_response(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push(Ok(text.to_string()));
    }

    /// Queue a failure for the next `complete` call.
    pub fn queue_failure(&self, error: GatewayError) {
        self.responses.lock().unwrap().push(Err(error));
    }

    /// Requests observed so far, in call order.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, PolymathError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.is_empty() {
            Ok("{}".to_string())
        } else {
            responses.remove(0)
        };
        match next {
            Ok(text) => Ok(GatewayResponse {
                text,
                model: self.model.clone(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
