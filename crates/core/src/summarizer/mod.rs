//! Narrative summaries for finished missions.
//!
//! The mission orchestrator makes exactly one [`Summarizer::summarize`] call per
//! run. Any error (or a timeout enforced by the caller) is absorbed there and
//! replaced with a templated summary, so implementations are free to fail.

mod config;
pub mod llm;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::metrics;
use crate::mission::{MissionFinding, MissionType};

pub use config::{LlmProvider, SummarizerConfig};
pub use llm::{AnthropicClient, CompletionRequest, LlmClient, LlmError, OllamaClient};

/// Instruction sent with every summary request.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a fleet safety analyst briefing a fleet manager. \
Write a 3-5 sentence spoken-style executive summary of the findings below. \
Name specific drivers and numbers. \
End with the single most important next action.";

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("summarizer not configured")]
    NotConfigured,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("summarizer returned an empty summary")]
    EmptySummary,

    #[error("invalid summarizer configuration: {0}")]
    InvalidConfig(String),
}

/// Input to a summary call.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub mission_type: MissionType,
    pub display_name: String,
    /// One `[SEVERITY] title: detail` line per finding.
    pub transcript: String,
    pub system: String,
}

impl SummaryRequest {
    pub fn from_findings(mission_type: MissionType, findings: &[MissionFinding]) -> Self {
        let transcript = findings
            .iter()
            .map(|f| {
                format!(
                    "[{}] {}: {}",
                    f.severity.as_str().to_uppercase(),
                    f.title,
                    f.detail
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            mission_type,
            display_name: mission_type.display_name().to_string(),
            transcript,
            system: SUMMARY_SYSTEM_PROMPT.to_string(),
        }
    }

    fn prompt(&self) -> String {
        format!(
            "Mission: {}\n\nFindings:\n{}",
            self.display_name, self.transcript
        )
    }
}

/// Turns a finding transcript into a short narrative.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError>;
}

/// Summarizer backed by an LLM client.
pub struct LlmSummarizer<C: LlmClient> {
    client: C,
    max_tokens: u32,
}

impl<C: LlmClient> LlmSummarizer<C> {
    pub fn new(client: C, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

#[async_trait]
impl<C: LlmClient + 'static> Summarizer for LlmSummarizer<C> {
    fn name(&self) -> &str {
        self.client.provider()
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        let completion = CompletionRequest::new(request.prompt())
            .with_system(request.system.clone())
            .with_max_tokens(self.max_tokens);

        let provider = self.client.provider();
        let response = match self.client.complete(completion).await {
            Ok(response) => response,
            Err(e) => {
                metrics::LLM_REQUESTS
                    .with_label_values(&[provider, "error"])
                    .inc();
                return Err(e.into());
            }
        };
        metrics::LLM_REQUESTS
            .with_label_values(&[provider, "success"])
            .inc();
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(u64::from(response.usage.input_tokens));
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(u64::from(response.usage.output_tokens));

        let text = response.text.trim();
        if text.is_empty() {
            return Err(SummarizerError::EmptySummary);
        }
        Ok(text.to_string())
    }
}

/// Used when no LLM is configured. Always fails, so the templated summary wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSummarizer;

#[async_trait]
impl Summarizer for NoopSummarizer {
    fn name(&self) -> &str {
        "none"
    }

    async fn summarize(&self, _request: &SummaryRequest) -> Result<String, SummarizerError> {
        Err(SummarizerError::NotConfigured)
    }
}

/// Build the summarizer described by `config`.
pub fn create_summarizer(
    config: Option<&SummarizerConfig>,
) -> Result<Arc<dyn Summarizer>, SummarizerError> {
    let Some(config) = config else {
        info!("No summarizer configured, missions will use templated summaries");
        return Ok(Arc::new(NoopSummarizer));
    };

    let timeout = Duration::from_secs(config.timeout_secs);
    let summarizer: Arc<dyn Summarizer> = match config.provider {
        LlmProvider::Anthropic => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                SummarizerError::InvalidConfig("anthropic requires api_key".to_string())
            })?;
            let mut client = AnthropicClient::new(api_key, &config.model, timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(LlmSummarizer::new(client, config.max_tokens))
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model, timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(LlmSummarizer::new(client, config.max_tokens))
        }
    };

    info!(
        provider = summarizer.name(),
        model = %config.model,
        "Summarizer configured"
    );
    Ok(summarizer)
}
