/*!
 * Tests for the SRT timecode codec
 */

use subreflow::errors::SubtitleError;
use subreflow::timecode::{format_range, format_timestamp, parse_range, parse_timestamp, to_ms};

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5_025_678);
    assert_eq!(format_timestamp(ms), ts);
}

/// Test the round trip over a spread of clock components
#[test]
fn test_timestamp_roundTrip_withComponentSpread_shouldRecoverInstant() {
    for (h, m, s, ms) in [(0, 0, 0, 0), (0, 59, 59, 999), (9, 5, 7, 1), (23, 0, 30, 500), (99, 59, 59, 999)] {
        let instant = to_ms(h, m, s, ms).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(instant)).unwrap(), instant);
    }
}

/// Test that more than 99 hours still round-trips
#[test]
fn test_format_timestamp_withOver99Hours_shouldWidenHours() {
    let instant = to_ms(123, 4, 5, 6).unwrap();
    let formatted = format_timestamp(instant);
    assert_eq!(formatted, "123:04:05,006");
    assert_eq!(parse_timestamp(&formatted).unwrap(), instant);
}

/// Test range parsing
#[test]
fn test_parse_range_withValidLine_shouldReturnBothInstants() {
    let (start, end) = parse_range("00:00:01,000 --> 00:00:04,250").unwrap();
    assert_eq!(start, 1000);
    assert_eq!(end, 4250);
    assert_eq!(format_range(start, end), "00:00:01,000 --> 00:00:04,250");
}

/// Test that grammar violations are explicit errors
#[test]
fn test_parse_range_withBadGrammar_shouldFail() {
    for line in ["00:00:01.000 --> 00:00:02,000", "0:00:01,000 --> 00:00:02,000", "00:00:01,000 -> 00:00:02,000", ""] {
        assert!(
            matches!(parse_range(line), Err(SubtitleError::InvalidTimecode(_))),
            "expected InvalidTimecode for {:?}",
            line
        );
    }
}

/// Test that a reversed range is rejected
#[test]
fn test_parse_range_withEndBeforeStart_shouldReturnTimeRangeError() {
    assert_eq!(
        parse_range("00:00:05,000 --> 00:00:04,000"),
        Err(SubtitleError::InvalidTimeRange { start_ms: 5000, end_ms: 4000 })
    );
}

/// Test out-of-range clock components
#[test]
fn test_parse_timestamp_withSixtySeconds_shouldFail() {
    assert!(parse_timestamp("00:00:60,000").is_err());
    assert!(parse_timestamp("00:60:00,000").is_err());
}

/// Test that an hour field too large for a millisecond instant is rejected
#[test]
fn test_parse_timestamp_withOverflowingHours_shouldFail() {
    assert_eq!(to_ms(u64::MAX / 1000, 0, 0, 0), None);
    assert!(matches!(
        parse_timestamp("5124095576031:00:00,000"),
        Err(SubtitleError::InvalidTimestamp(_))
    ));
    assert!(matches!(
        parse_range("5124095576031:00:00,000 --> 5124095576031:00:00,001"),
        Err(SubtitleError::InvalidTimecode(_))
    ));
}
