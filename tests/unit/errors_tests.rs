/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use digestr::errors::{AppError, ProviderError, SummarizeError};

#[test]
fn test_providerError_modelUnavailable_shouldDisplayCorrectly() {
    let error = ProviderError::ModelUnavailable("weights missing".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Model unavailable"));
    assert!(display.contains("weights missing"));
    assert!(error.is_fatal());
}

#[test]
fn test_providerError_generation_shouldNotBeFatal() {
    let error = ProviderError::Generation("empty output".to_string());
    assert!(format!("{}", error).contains("Generation failed"));
    assert!(!error.is_fatal());
}

#[test]
fn test_summarizeError_segment_shouldDisplayOneBasedPosition() {
    let error = SummarizeError::Segment {
        index: 1,
        total: 3,
        source: ProviderError::Generation("boom".to_string()),
    };
    let display = format!("{}", error);
    assert!(display.contains("Segment 2 of 3"));
    assert!(display.contains("boom"));
    assert!(error.source().is_some());
}

#[test]
fn test_summarizeError_providerError_shouldExposeSource() {
    let reduce = SummarizeError::Reduce {
        source: ProviderError::ModelUnavailable("gone".to_string()),
    };
    assert!(matches!(reduce.provider_error(), Some(ProviderError::ModelUnavailable(_))));
    assert!(SummarizeError::EmptyInput.provider_error().is_none());
}

#[test]
fn test_appError_fromSummarizeError_shouldWrapCorrectly() {
    let app_error: AppError = SummarizeError::EmptyInput.into();
    assert!(matches!(app_error, AppError::Summarize(SummarizeError::EmptyInput)));
    assert!(format!("{}", app_error).contains("Input text is empty"));
}

#[test]
fn test_appError_fromProviderError_shouldWrapCorrectly() {
    let app_error: AppError = ProviderError::Generation("x".to_string()).into();
    assert!(matches!(app_error, AppError::Provider(ProviderError::Generation(_))));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(ref msg) if msg.contains("no such file")));
}
