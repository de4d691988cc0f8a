/*!
 * Model provider implementations.
 *
 * This module contains the generation backends the summarizer can drive:
 * - T5: a local sequence-to-sequence model executed with candle
 * - Mock: a deterministic in-process provider for tests and dry runs
 *
 * Supporting modules:
 * - `hub`: fetching and caching model files
 * - `beam`: backend-independent beam search
 */

use async_trait::async_trait;
use std::fmt::{self, Debug};

use crate::errors::ProviderError;
use crate::summarization::GenerationParameters;

/// Compute device a provider is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    /// General-purpose processor
    Cpu,
    /// CUDA accelerator with the given ordinal
    Cuda(usize),
}

impl ComputeDevice {
    /// Whether this device is an accelerator
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

/// Common trait for all text-to-text generation backends
///
/// A provider is constructed once per process and shared by reference;
/// implementations must not keep per-call state that changes results
/// across calls.
#[async_trait]
pub trait ModelProvider: Send + Sync + Debug {
    /// Generate text for `prompt` under the given decoding controls
    ///
    /// # Arguments
    /// * `prompt` - Full prompt, including any instruction marker
    /// * `params` - Decoding controls for this call
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - Decoded text with special tokens stripped
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> Result<String, ProviderError>;

    /// The device this provider runs on
    fn device(&self) -> ComputeDevice;

    /// Identifier of the loaded model
    fn model_id(&self) -> &str;
}

pub mod beam;
pub mod hub;
pub mod mock;
pub mod t5;
