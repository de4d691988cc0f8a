use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;

use crate::app_config::Config;
use crate::errors::{AppError, SummarizeError};
use crate::providers::mock::MockProvider;
use crate::providers::t5::T5Provider;
use crate::providers::ModelProvider;
use crate::summarization::{Summarizer, SummarizerOptions};

// @module: Application controller for document summarization

/// Main application controller for summarizing documents
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        Ok(Self { config })
    }

    /// The configuration in effect
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the document at `input`, or standard input when it is `None` or `-`
    pub async fn read_input(input: Option<&Path>) -> Result<String, AppError> {
        match input {
            Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::File(format!("Failed to read input file {}: {}", path.display(), e))),
            _ => {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                Ok(text)
            }
        }
    }

    /// Load the model provider described by the configuration
    ///
    /// With `dry_run` the echo mock is used instead, so the pipeline can be
    /// exercised without downloading or loading any weights.
    pub async fn load_provider(&self, dry_run: bool) -> Result<Arc<dyn ModelProvider>, AppError> {
        if dry_run {
            info!("Dry run: using the echo provider instead of {}", self.config.model.repo);
            return Ok(Arc::new(MockProvider::echo()));
        }

        info!("Loading model {} ({})", self.config.model.repo, self.config.model.revision);
        let provider = T5Provider::load(&self.config.model).await?;
        Ok(Arc::new(provider))
    }

    /// Summarize `text` with `provider`, showing progress over the generation calls
    pub async fn summarize_text(&self, provider: Arc<dyn ModelProvider>, text: &str) -> Result<String, AppError> {
        let start_time = Instant::now();
        info!("Article length: {} characters", text.chars().count());

        let summarizer = Summarizer::new(provider, SummarizerOptions::from_config(&self.config));
        let planned_calls = summarizer.planned_calls(text);
        debug!(
            "Planned {} generation calls on {}",
            planned_calls,
            summarizer.provider().device()
        );

        let progress_bar = ProgressBar::new(planned_calls as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} calls ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Summarizing");

        let pb = progress_bar.clone();
        let result = summarizer
            .summarize_with_progress(text, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let summary = result?;
        info!("Summary length: {} characters", summary.chars().count());
        info!("Summarization completed in {}.", Self::format_duration(start_time.elapsed()));

        Ok(summary)
    }

    /// Run the whole workflow: read the input, load the provider and summarize
    ///
    /// Empty input is rejected before any model is loaded.
    pub async fn run(&self, input: Option<&Path>, dry_run: bool) -> Result<String, AppError> {
        let text = Self::read_input(input).await?;
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput.into());
        }

        let provider = self.load_provider(dry_run).await?;
        self.summarize_text(provider, &text).await
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
