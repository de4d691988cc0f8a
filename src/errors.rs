/*!
 * Error types for the digestr application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with a model provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The model, its tokenizer or its configuration could not be fetched or loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single generation call produced no usable output
    #[error("Generation failed: {0}")]
    Generation(String),
}

impl ProviderError {
    /// Whether this error means the provider can never serve a request
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

/// Errors that can occur while summarizing a document
#[derive(Error, Debug)]
pub enum SummarizeError {
    /// The document contains no words
    #[error("Input text is empty")]
    EmptyInput,

    /// Summarizing one segment failed
    #[error("Segment {} of {total} failed: {source}", .index + 1)]
    Segment {
        /// Zero-based segment index
        index: usize,
        /// Number of segments in the document
        total: usize,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The final reduction call failed
    #[error("Final reduction failed: {source}")]
    Reduce {
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },
}

impl SummarizeError {
    /// The provider error behind this failure, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::EmptyInput => None,
            Self::Segment { source, .. } | Self::Reduce { source } => Some(source),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from summarization
    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),
}

// Utility functions for error conversion

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
