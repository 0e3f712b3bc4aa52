//! Summarizer configuration.

use serde::{Deserialize, Serialize};

/// LLM provider backing the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Anthropic Messages API.
    Anthropic,
    /// Local Ollama instance.
    Ollama,
}

/// Summarizer configuration. Absent means missions use the templated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Required for Anthropic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (proxies or a remote Ollama).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    400
}

fn default_timeout() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            provider = "ollama"
            model = "llama3"
        "#;
        let config: SummarizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.max_tokens, 400);
        assert_eq!(config.timeout_secs, 15);
        assert!(config.api_key.is_none());
    }
}
