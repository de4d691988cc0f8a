/*!
 * Integration tests for the full summarization pipeline.
 *
 * Runs realistic documents through the summarizer with scripted providers,
 * and through a real T5 checkpoint when one can be downloaded.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use digestr::app_config::{Config, ModelConfig};
use digestr::providers::mock::MockProvider;
use digestr::providers::t5::T5Provider;
use digestr::summarization::{Summarizer, SummarizerOptions};
use crate::common;

#[tokio::test]
async fn test_pipeline_withLongDocument_shouldReduceAllSegments() {
    let provider = MockProvider::echo().with_custom_response(|body| {
        format!("<{}>", body.split_whitespace().count())
    });
    let options = SummarizerOptions::from_config(&Config::default());
    let summarizer = Summarizer::new(common::shared(&provider), options);
    let text = common::numbered_document(1450);

    let summary = summarizer.summarize(&text).await.unwrap();

    // 600 + 600 + 250 words, then the three partials
    assert_eq!(
        provider.prompts().last().map(String::as_str),
        Some("summarize: <600> <600> <250>")
    );
    assert_eq!(summary, "<3>");
}

#[tokio::test]
async fn test_pipeline_sharedProvider_shouldServeSeveralSummarizers() {
    let provider = MockProvider::fixed("M");
    let shared = common::shared(&provider);
    let small = Summarizer::new(Arc::clone(&shared), SummarizerOptions { max_words: 2 });
    let large = Summarizer::new(shared, SummarizerOptions { max_words: 100 });
    let text = common::numbered_document(6);

    small.summarize(&text).await.unwrap();
    large.summarize(&text).await.unwrap();

    // 3 + 1 calls, then 1 + 1 calls
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_pipeline_progress_shouldCountUpToTotal() {
    let provider = MockProvider::echo();
    let summarizer = Summarizer::new(common::shared(&provider), SummarizerOptions { max_words: 10 });
    let text = common::sample_article();
    let expected = summarizer.planned_calls(&text);
    let last = AtomicUsize::new(0);

    summarizer
        .summarize_with_progress(&text, |done, total| {
            assert_eq!(total, expected);
            assert_eq!(done, last.load(Ordering::SeqCst) + 1);
            last.store(done, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(last.load(Ordering::SeqCst), expected);
    assert_eq!(provider.call_count(), expected);
}

#[tokio::test]
#[ignore = "Requires downloading the t5-small checkpoint"]
async fn test_pipeline_withT5Small_shouldProduceShortSummary() {
    let config = ModelConfig {
        repo: "google-t5/t5-small".to_string(),
        force_cpu: true,
        ..ModelConfig::default()
    };
    let provider = T5Provider::load(&config).await.unwrap();
    let summarizer = Summarizer::new(Arc::new(provider), SummarizerOptions { max_words: 40 });
    let text = common::sample_article();

    let summary = summarizer.summarize(&text).await.unwrap();

    assert!(!summary.trim().is_empty());
    assert!(summary.chars().count() < text.chars().count());
}
