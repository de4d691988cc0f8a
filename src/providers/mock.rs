/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::echo()` - Returns the prompt body with a prefix
 * - `MockProvider::fixed()` - Always returns the same marker
 * - `MockProvider::sequence()` - Returns scripted responses in order
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Every call is recorded so tests can inspect prompts and parameters.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ComputeDevice, ModelProvider};
use crate::summarization::{GenerationParameters, SUMMARIZE_PREFIX};

/// One recorded `generate` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The prompt as received
    pub prompt: String,
    /// The decoding controls as received
    pub params: GenerationParameters,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns `"[SUMMARY] <prompt body>"`
    Echo,
    /// Returns the same text for every call
    Fixed(String),
    /// Returns the scripted responses in order, repeating the last one
    Sequence(Vec<String>),
    /// Always fails with a generation error
    Failing,
    /// Fails on the Nth call (1-based), succeeds with `Echo` otherwise
    FailOnCall(usize),
    /// Returns no text, which surfaces as a generation error
    Empty,
}

/// Mock provider for testing summarization behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded calls, in order
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a mock that echoes the prompt body
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that always returns `marker`
    pub fn fixed(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fixed(marker.into()))
    }

    /// Create a mock that returns `responses` in order
    pub fn sequence<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::Sequence(responses.into_iter().map(Into::into).collect()))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails on the given 1-based call
    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall(call))
    }

    /// Create a mock that returns empty output
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator, applied to the prompt body
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `generate` calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of all recorded calls
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Prompts of all recorded calls
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.prompt.clone()).collect()
    }

    /// The most recent recorded call
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }

    fn echo_text(&self, prompt: &str) -> String {
        let body = prompt.strip_prefix(SUMMARIZE_PREFIX).unwrap_or(prompt);
        match self.custom_response {
            Some(generator) => generator(body),
            None => format!("[SUMMARY] {}", body),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            call_count: Arc::clone(&self.call_count),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> Result<String, ProviderError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            params: *params,
        });

        let text = match &self.behavior {
            MockBehavior::Echo => self.echo_text(prompt),
            MockBehavior::Fixed(marker) => marker.clone(),
            MockBehavior::Sequence(responses) => responses
                .get(count)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default(),
            MockBehavior::Failing => {
                return Err(ProviderError::Generation("Simulated provider failure".to_string()));
            }
            MockBehavior::FailOnCall(n) => {
                if count + 1 == *n {
                    return Err(ProviderError::Generation(format!(
                        "Simulated failure (call #{})",
                        count + 1
                    )));
                }
                self.echo_text(prompt)
            }
            MockBehavior::Empty => String::new(),
        };

        if text.trim().is_empty() {
            return Err(ProviderError::Generation("Model produced no output".to_string()));
        }

        Ok(text)
    }

    fn device(&self) -> ComputeDevice {
        ComputeDevice::Cpu
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}
