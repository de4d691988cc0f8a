/*!
 * # digestr - chunk-and-reduce document summarization
 *
 * A Rust library for summarizing documents of arbitrary length with a
 * sequence-to-sequence model whose input window is bounded.
 *
 * ## Features
 *
 * - Split a document into fixed-size word windows
 * - Summarize each window, then summarize the joined partial summaries
 * - Run a pretrained T5 checkpoint locally (CPU or CUDA) with candle
 * - Download and cache model files from a model repository
 * - Deterministic mock provider for tests and dry runs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `summarization`: The summarization pipeline:
 *   - `summarization::core`: The chunk-and-reduce summarizer
 *   - `summarization::segments`: Word-window segmentation
 *   - `summarization::params`: Generation parameter policy and prompt marker
 * - `providers`: Text generation back-ends:
 *   - `providers::t5`: Local T5 inference
 *   - `providers::beam`: Beam search decoding
 *   - `providers::hub`: Model file download and cache
 *   - `providers::mock`: Scriptable provider for tests
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod providers;
pub mod summarization;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SummarizeError};
pub use providers::{ComputeDevice, ModelProvider};
pub use summarization::{GenerationParameters, Summarizer, SummarizerOptions};
