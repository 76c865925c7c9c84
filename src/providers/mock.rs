/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Answers every numbered line with a tagged echo
 * - `MockProvider::intermittent(n)` - Fails every Nth request with a retryable error
 * - `MockProvider::truncated(n)` - Answers but drops the last N lines
 * - `MockProvider::failing()` - Always fails with a non-retryable error
 * - `MockProvider::empty()` - Answers with an empty body
 * - `MockProvider::slow(ms)` - Answers like a working mock after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::prompts::split_marker;

/// Tag put in front of every echoed line by a working mock
pub const MOCK_TRANSLATION_TAG: &str = "[TRANSLATED] ";

/// Mock request for testing
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// Rendered system prompt
    pub system: String,
    /// Numbered user message
    pub prompt: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The reply body
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with one line per input line
    Working,
    /// Fails every Nth request (1-based) with a connection error
    Intermittent { fail_every: usize },
    /// Succeeds but leaves out the last `missing` lines
    Truncated { missing: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
    /// Succeeds after sleeping
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: AtomicUsize,
    /// Every request received, in order
    requests: Mutex<Vec<MockRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that answers with `missing` lines too few
    pub fn truncated(missing: usize) -> Self {
        Self::new(MockBehavior::Truncated { missing })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a working mock that waits `delay_ms` before every answer
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Echo each numbered prompt line back with the translation tag
    pub fn echo_numbered(prompt: &str) -> Vec<String> {
        prompt
            .lines()
            .filter_map(split_marker)
            .map(|(number, text)| format!("[{}] {}{}", number, MOCK_TRANSLATION_TAG, text))
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: MockRequest) -> Result<MockResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        let lines = match self.behavior {
            MockBehavior::Working => Self::echo_numbered(&request.prompt),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    return Err(ProviderError::ConnectionError(format!(
                        "Simulated intermittent failure on request {}",
                        count
                    )));
                }
                Self::echo_numbered(&request.prompt)
            }
            MockBehavior::Truncated { missing } => {
                let mut lines = Self::echo_numbered(&request.prompt);
                lines.truncate(lines.len().saturating_sub(missing));
                lines
            }
            MockBehavior::Failing => {
                return Err(ProviderError::RequestFailed("Simulated provider failure".to_string()));
            }
            MockBehavior::Empty => Vec::new(),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Self::echo_numbered(&request.prompt)
            }
        };

        Ok(MockResponse { text: lines.join("\n") })
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}
