/*!
 * Tests for the mock provider used throughout the suite
 */

use digestr::errors::ProviderError;
use digestr::providers::mock::{MockBehavior, MockProvider};
use digestr::providers::{ComputeDevice, ModelProvider};
use digestr::summarization::{REDUCE_PARAMS, SEGMENT_PARAMS};

#[tokio::test]
async fn test_echo_shouldStripPromptMarker() {
    let provider = MockProvider::echo();
    let text = provider.generate("summarize: hello world", &SEGMENT_PARAMS).await.unwrap();
    assert_eq!(text, "[SUMMARY] hello world");
}

#[tokio::test]
async fn test_sequence_shouldRepeatLastResponse() {
    let provider = MockProvider::sequence(["first", "second"]);
    let mut outputs = Vec::new();
    for _ in 0..3 {
        outputs.push(provider.generate("summarize: x", &SEGMENT_PARAMS).await.unwrap());
    }
    assert_eq!(outputs, vec!["first", "second", "second"]);
}

#[tokio::test]
async fn test_failOnCall_shouldFailOnlyThatCall() {
    let provider = MockProvider::fail_on_call(2);
    assert!(provider.generate("summarize: a", &SEGMENT_PARAMS).await.is_ok());
    assert!(matches!(
        provider.generate("summarize: b", &SEGMENT_PARAMS).await,
        Err(ProviderError::Generation(_))
    ));
    assert!(provider.generate("summarize: c", &REDUCE_PARAMS).await.is_ok());
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_clone_shouldShareRecordedCalls() {
    let provider = MockProvider::new(MockBehavior::Fixed("ok".to_string()));
    let handle = provider.clone();

    provider.generate("summarize: a", &REDUCE_PARAMS).await.unwrap();

    assert_eq!(handle.call_count(), 1);
    let call = handle.last_call().unwrap();
    assert_eq!(call.prompt, "summarize: a");
    assert_eq!(call.params, REDUCE_PARAMS);
}

#[test]
fn test_mock_shouldReportCpuDevice() {
    let provider = MockProvider::echo();
    assert_eq!(provider.device(), ComputeDevice::Cpu);
    assert!(!provider.device().is_accelerator());
    assert_eq!(provider.model_id(), "mock");
}
