//! Inference client: send the rendered prompt to the generation endpoint.
//!
//! The client is thin: prompt wording lives in
//! [`crate::prompts`] and all output interpretation in
//! [`crate::pipeline::answer`]. This module only moves bytes over HTTP.
//!
//! ## Timeouts
//!
//! [`InferenceClient::generate`] takes an explicit `timeout`. `None` waits for
//! as long as the endpoint takes, so a hung endpoint holds the request open
//! until the caller gives up. Dropping the returned future cancels the call.
//!
//! There is no retry and no backoff: one call, one answer or one error.

use crate::config::ServerConfig;
use crate::error::PdfQaError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A text-generation backend.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Generate a completion for `prompt` and return the raw generated text.
    async fn generate(&self, prompt: &str, timeout: Option<Duration>)
        -> Result<String, PdfQaError>;
}

/// Sampling options forwarded to Ollama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    /// Always `false`: the whole completion is returned in one body.
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

/// The fields of Ollama's reply this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationResponse {
    /// Generated text. Treated as empty when absent.
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Nanoseconds, as reported by Ollama.
    #[serde(default)]
    pub total_duration: Option<u64>,
}

/// [`InferenceClient`] for Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Build a client from the endpoint, model and temperature in `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut client = Self::new(&config.inference_url, &config.model);
        client.temperature = config.temperature;
        client
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request body sent for `prompt`.
    pub fn request_for(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: self.temperature.map(|t| GenerationOptions {
                temperature: Some(t),
            }),
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<String, PdfQaError> {
        let start = Instant::now();
        let payload = self.request_for(prompt);
        debug!(
            "Calling {} with model '{}' ({} prompt chars)",
            self.url,
            payload.model,
            payload.prompt.len()
        );

        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e, timeout))?;
        let status = response.status();
        debug!("Inference endpoint responded with {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e, timeout))?;
        debug!("Inference response body: {}", body);

        if !status.is_success() {
            return Err(PdfQaError::InferenceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerationResponse = serde_json::from_str(&body)
            .map_err(|e| PdfQaError::InvalidInferenceResponse(e.to_string()))?;

        info!(
            "Generated {} chars in {:?} ({} prompt tokens, {} output tokens)",
            parsed.response.len(),
            start.elapsed(),
            parsed.prompt_eval_count.unwrap_or(0),
            parsed.eval_count.unwrap_or(0)
        );

        Ok(parsed.response.trim().to_string())
    }
}

impl OllamaClient {
    fn map_send_error(&self, e: reqwest::Error, timeout: Option<Duration>) -> PdfQaError {
        match timeout {
            Some(t) if e.is_timeout() => PdfQaError::InferenceTimeout { timeout: t },
            _ => PdfQaError::InferenceUnavailable {
                url: self.url.clone(),
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let client = OllamaClient::new("http://localhost:11434/api/generate", "deepseek-r1:1.5b");
        let body = serde_json::to_value(client.request_for("hi")).unwrap();
        assert_eq!(
            body,
            json!({"model": "deepseek-r1:1.5b", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn temperature_goes_into_options() {
        let client = OllamaClient::new("http://x/api/generate", "m").with_temperature(0.2);
        let body = serde_json::to_value(client.request_for("hi")).unwrap();
        let t = body["options"]["temperature"].as_f64().unwrap();
        assert!((t - 0.2).abs() < 1e-6);
    }

    #[test]
    fn from_config_uses_configured_endpoint() {
        let config = ServerConfig::builder()
            .inference_url("http://gpu-box:11434/api/generate")
            .model("llama3.2")
            .build()
            .unwrap();
        let client = OllamaClient::from_config(&config);
        assert_eq!(client.url(), "http://gpu-box:11434/api/generate");
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn missing_response_field_is_empty() {
        let r: GenerationResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(r.response, "");
    }
}
