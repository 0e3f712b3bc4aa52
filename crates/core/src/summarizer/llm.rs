//! LLM clients used to narrate mission findings.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for LLM calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("empty completion")]
    Empty,
}

impl LlmError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A single-turn completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 400,
            temperature: 0.3,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: LlmUsage,
    pub model: String,
}

/// A text-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name, e.g. "anthropic" or "ollama".
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

// ============================================================================
// Anthropic
// ============================================================================

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl AnthropicClient {
    pub const DEFAULT_API_BASE: &'static str = "https://api.anthropic.com";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            model: model.into(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .collect();

        Ok(CompletionResponse {
            text,
            usage: LlmUsage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
            model: parsed.model,
        })
    }
}

// ============================================================================
// Ollama
// ============================================================================

/// Client for a local Ollama server. No API key required.
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl OllamaClient {
    pub const DEFAULT_API_BASE: &'static str = "http://localhost:11434";

    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            model: model.into(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    eval_count: u32,
    #[serde(default)]
    prompt_eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: request.prompt,
            system: request.system,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.api_base))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(CompletionResponse {
            text: parsed.response,
            usage: LlmUsage {
                input_tokens: parsed.prompt_eval_count,
                output_tokens: parsed.eval_count,
            },
            model: parsed.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Findings")
            .with_system("Summarize")
            .with_max_tokens(200)
            .with_temperature(0.0);

        assert_eq!(request.prompt, "Findings");
        assert_eq!(request.system.as_deref(), Some("Summarize"));
        assert_eq!(request.max_tokens, 200);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_client_identity() {
        let anthropic = AnthropicClient::new(
            "key",
            "claude-3-5-haiku-latest",
            Duration::from_secs(5),
        );
        assert_eq!(anthropic.provider(), "anthropic");
        assert_eq!(anthropic.api_base, AnthropicClient::DEFAULT_API_BASE);

        let ollama = OllamaClient::new("llama3", Duration::from_secs(5))
            .with_api_base("http://gpu-box:11434");
        assert_eq!(ollama.provider(), "ollama");
        assert_eq!(ollama.model(), "llama3");
        assert_eq!(ollama.api_base, "http://gpu-box:11434");
    }

    #[test]
    fn test_anthropic_request_serialization() {
        let request = AnthropicRequest {
            model: "claude-3-5-haiku-latest",
            max_tokens: 400,
            system: Some("Be brief".to_string()),
            messages: vec![AnthropicMessage {
                role: "user",
                content: "[CRITICAL] Driver at risk".to_string(),
            }],
            temperature: 0.3,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["system"], "Be brief");
        assert_eq!(json["max_tokens"], 400);
    }

    #[test]
    fn test_ollama_request_serialization() {
        let request = OllamaRequest {
            model: "llama3",
            prompt: "Hello".to_string(),
            system: None,
            stream: false,
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 100,
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"num_predict\":100"));
        assert!(!json.contains("\"system\""));
    }
}
