//! Mock summarizer for testing.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::summarizer::{Summarizer, SummarizerError, SummaryRequest};

/// Mock implementation of the Summarizer trait.
///
/// Provides controllable behavior for testing:
/// - Return a canned summary
/// - Fail every call
/// - Delay before answering (to exercise the summary timeout)
/// - Record every request for assertions
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    response: String,
    fail: bool,
    delay: Option<Duration>,
    requests: Arc<RwLock<Vec<SummaryRequest>>>,
}

impl MockSummarizer {
    /// A summarizer that answers every request with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fail: false,
            delay: None,
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A summarizer whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<SummaryRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(SummarizerError::Llm(crate::summarizer::LlmError::Api {
                status: 503,
                message: "mock summarizer failure".to_string(),
            }));
        }
        Ok(self.response.clone())
    }
}
