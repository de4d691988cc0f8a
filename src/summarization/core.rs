/*!
 * Core chunk-and-reduce summarization.
 *
 * The document is segmented, each segment is summarized in order, and the
 * partial summaries are joined and summarized once more into the final
 * summary. A document that fits in one segment still takes both passes.
 */

use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::SummarizeError;
use crate::providers::ModelProvider;

use super::params::{build_prompt, REDUCE_PARAMS, SEGMENT_PARAMS};
use super::segments::{count_segments, segments, word_count, DEFAULT_MAX_WORDS};

/// Options controlling the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizerOptions {
    /// Maximum number of words per segment
    pub max_words: usize,
}

impl Default for SummarizerOptions {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl SummarizerOptions {
    /// Create options from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_words: config.summarizer.max_words,
        }
    }
}

/// Chunk-and-reduce summarizer over a shared model provider
#[derive(Debug, Clone)]
pub struct Summarizer {
    provider: Arc<dyn ModelProvider>,
    options: SummarizerOptions,
}

impl Summarizer {
    /// Create a summarizer using `provider`, which the caller keeps owning
    pub fn new(provider: Arc<dyn ModelProvider>, options: SummarizerOptions) -> Self {
        Self { provider, options }
    }

    /// Create a summarizer with default options
    pub fn with_defaults(provider: Arc<dyn ModelProvider>) -> Self {
        Self::new(provider, SummarizerOptions::default())
    }

    /// The options in effect
    pub fn options(&self) -> SummarizerOptions {
        self.options
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// Number of `generate` calls summarizing `text` will issue
    pub fn planned_calls(&self, text: &str) -> usize {
        match count_segments(word_count(text), self.options.max_words) {
            0 => 0,
            n => n + 1,
        }
    }

    /// Summarize `text` into a single final summary
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.summarize_with_progress(text, |_, _| {}).await
    }

    /// Summarize `text`, reporting `(completed_calls, total_calls)` after each model call
    pub async fn summarize_with_progress<F>(&self, text: &str, progress: F) -> Result<String, SummarizeError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let max_words = self.options.max_words;
        let total_segments = count_segments(word_count(text), max_words);
        if total_segments == 0 {
            return Err(SummarizeError::EmptyInput);
        }

        let total_calls = total_segments + 1;
        let start_time = Instant::now();
        let mut partials = Vec::with_capacity(total_segments);

        for segment in segments(text, max_words) {
            debug!(
                "Summarizing segment {} of {} ({} words)",
                segment.index + 1,
                total_segments,
                segment.word_count()
            );

            let prompt = build_prompt(&segment.text());
            let partial = self
                .provider
                .generate(&prompt, &SEGMENT_PARAMS)
                .await
                .map_err(|source| {
                    error!("Segment {} of {} failed: {}", segment.index + 1, total_segments, source);
                    SummarizeError::Segment {
                        index: segment.index,
                        total: total_segments,
                        source,
                    }
                })?;

            partials.push(partial);
            progress(partials.len(), total_calls);
        }

        let reduce_prompt = build_prompt(&partials.join(" "));
        debug!("Reducing {} partial summaries", partials.len());

        let summary = self
            .provider
            .generate(&reduce_prompt, &REDUCE_PARAMS)
            .await
            .map_err(|source| {
                error!("Final reduction failed: {}", source);
                SummarizeError::Reduce { source }
            })?;
        progress(total_calls, total_calls);

        info!(
            "Summarized {} segment(s) with {} in {:.2}s",
            total_segments,
            self.provider.model_id(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(summary)
    }
}
