/*!
 * Tests for the chunk-and-reduce summarizer against mock providers
 */

use digestr::errors::{ProviderError, SummarizeError};
use digestr::providers::mock::MockProvider;
use digestr::summarization::{
    count_segments, word_count, Summarizer, SummarizerOptions, REDUCE_PARAMS, SEGMENT_PARAMS,
};
use crate::common;

fn summarizer(provider: &MockProvider, max_words: usize) -> Summarizer {
    Summarizer::new(common::shared(provider), SummarizerOptions { max_words })
}

#[tokio::test]
async fn test_summarize_shouldCallOncePerSegmentPlusReduce() {
    for words in [1, 599, 600, 601, 1800, 1801] {
        let provider = MockProvider::fixed("M");
        let text = common::numbered_document(words);

        summarizer(&provider, 600).summarize(&text).await.unwrap();

        assert_eq!(
            provider.call_count(),
            count_segments(word_count(&text), 600) + 1,
            "{} words",
            words
        );
    }
}

#[tokio::test]
async fn test_summarize_withFixedMarker_shouldReduceJoinedMarkers() {
    let provider = MockProvider::fixed("M");
    let text = common::numbered_document(1500);

    let summary = summarizer(&provider, 600).summarize(&text).await.unwrap();

    assert_eq!(summary, "M");
    let last = provider.last_call().unwrap();
    assert_eq!(last.prompt, "summarize: M M M");
    assert_eq!(last.params, REDUCE_PARAMS);
}

#[tokio::test]
async fn test_summarize_shouldPreserveSegmentOrder() {
    let provider = MockProvider::sequence(["A", "B", "C", "final"]);
    let text = common::numbered_document(9);

    let summary = summarizer(&provider, 3).summarize(&text).await.unwrap();

    assert_eq!(summary, "final");
    assert_eq!(provider.last_call().unwrap().prompt, "summarize: A B C");
}

#[tokio::test]
async fn test_summarize_segmentPromptsShouldCarryMarkerAndWords() {
    let provider = MockProvider::echo();
    let text = "one  two\nthree four\tfive";

    summarizer(&provider, 2).summarize(text).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls[0].prompt, "summarize: one two");
    assert_eq!(calls[1].prompt, "summarize: three four");
    assert_eq!(calls[2].prompt, "summarize: five");
    assert!(calls[..3].iter().all(|c| c.params == SEGMENT_PARAMS));
}

#[tokio::test]
async fn test_summarize_withShortDocument_shouldStillTakeTwoPasses() {
    let provider = MockProvider::echo();
    let summary = summarizer(&provider, 600)
        .summarize("A short note.")
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(summary, "[SUMMARY] [SUMMARY] A short note.");
}

#[tokio::test]
async fn test_summarize_repeatedCalls_shouldBeIndependent() {
    let provider = MockProvider::echo();
    let summarizer = summarizer(&provider, 4);
    let text = common::sample_article();

    let first = summarizer.summarize(&text).await.unwrap();
    let calls_after_first = provider.call_count();
    let second = summarizer.summarize(&text).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), calls_after_first * 2);
}

#[tokio::test]
async fn test_summarize_withEmptyInput_shouldFailWithoutCalls() {
    let provider = MockProvider::echo();
    let result = summarizer(&provider, 600).summarize("").await;

    assert!(matches!(result, Err(SummarizeError::EmptyInput)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_withFailingProvider_shouldFailOnFirstSegment() {
    let provider = MockProvider::failing();
    let result = summarizer(&provider, 600).summarize("some words").await;

    assert!(matches!(result, Err(SummarizeError::Segment { index: 0, total: 1, .. })));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_summarize_withEmptyGeneration_shouldSurfaceProviderError() {
    let provider = MockProvider::empty();
    let result = summarizer(&provider, 600).summarize("some words").await;

    match result {
        Err(err) => assert!(matches!(err.provider_error(), Some(ProviderError::Generation(_)))),
        Ok(summary) => panic!("expected failure, got {:?}", summary),
    }
}

#[tokio::test]
async fn test_summarize_withCustomResponse_shouldFeedItToReduce() {
    fn first_word(body: &str) -> String {
        body.split_whitespace().next().unwrap_or("?").to_string()
    }
    let provider = MockProvider::echo().with_custom_response(first_word);
    let text = common::numbered_document(10);

    let summary = summarizer(&provider, 4).summarize(&text).await.unwrap();

    assert_eq!(provider.last_call().unwrap().prompt, "summarize: w0 w4 w8");
    assert_eq!(summary, "w0");
}

#[tokio::test]
async fn test_summarizer_withDefaults_shouldUseSixHundredWords() {
    let provider = MockProvider::fixed("M");
    let summarizer = Summarizer::with_defaults(common::shared(&provider));

    assert_eq!(summarizer.options().max_words, 600);
    assert_eq!(summarizer.planned_calls(&common::numbered_document(1200)), 3);
    assert_eq!(summarizer.planned_calls("   "), 0);
}
