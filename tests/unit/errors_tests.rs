/*!
 * Tests for the error taxonomy
 */

use subreflow::errors::{AppError, ProviderError, SubtitleError, TranslationError};

/// Test which provider failures are worth retrying
#[test]
fn test_is_retryable_shouldSeparateTransientFailures() {
    assert!(ProviderError::ConnectionError("refused".into()).is_retryable());
    assert!(ProviderError::Timeout("30s".into()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("429".into()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 502, message: String::new() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: String::new() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("bad key".into()).is_retryable());
    assert!(!ProviderError::ParseError("eof".into()).is_retryable());
    assert!(!ProviderError::RequestFailed("bad url".into()).is_retryable());
}

/// Test error conversion chains
#[test]
fn test_error_conversions_shouldWrapSources() {
    let translation: TranslationError = ProviderError::Timeout("slow".into()).into();
    assert!(matches!(translation, TranslationError::Provider(ProviderError::Timeout(_))));

    let app: AppError = translation.into();
    assert!(app.to_string().starts_with("Translation error: Provider error: Request timed out"));

    let app: AppError = SubtitleError::InvalidTimestamp("1:2".into()).into();
    assert!(matches!(app, AppError::Subtitle(_)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));
}

/// Test the time range message
#[test]
fn test_invalid_time_range_display_shouldNameBothInstants() {
    let err = SubtitleError::InvalidTimeRange { start_ms: 2000, end_ms: 1000 };
    assert_eq!(err.to_string(), "Invalid time range: end 1000 ms is before start 2000 ms");
}
