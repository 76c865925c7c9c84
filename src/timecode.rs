/*!
 * SRT timecode codec.
 *
 * Converts between millisecond instants and the fixed-width `HH:MM:SS,mmm`
 * notation, and between `(start, end)` pairs and the
 * `HH:MM:SS,mmm --> HH:MM:SS,mmm` range line. Parsing never yields a
 * sentinel value: a line that does not match the grammar is an
 * [`SubtitleError::InvalidTimecode`].
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Literal separator between the two instants of a range line
pub const RANGE_SEPARATOR: &str = " --> ";

// Hours are two digits in practice; wider values appear only past 99 hours.
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

static RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{2,}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2},\d{3})\s*$").unwrap()
});

/// Build a millisecond instant from its clock components, `None` on overflow
pub fn to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
        .checked_add(millis)
}

/// Parse a single `HH:MM:SS,mmm` timestamp
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

    let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;
    let component = |idx: usize| -> Result<u64, SubtitleError> {
        caps[idx].parse::<u64>().map_err(|_| invalid())
    };

    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;
    let millis = component(4)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    to_ms(hours, minutes, seconds, millis).ok_or_else(invalid)
}

/// Format a millisecond instant as `HH:MM:SS,mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse a `HH:MM:SS,mmm --> HH:MM:SS,mmm` range line into `(start_ms, end_ms)`
pub fn parse_range(line: &str) -> Result<(u64, u64), SubtitleError> {
    let caps = RANGE_REGEX
        .captures(line)
        .ok_or_else(|| SubtitleError::InvalidTimecode(line.to_string()))?;

    let start_ms = parse_timestamp(&caps[1])
        .map_err(|_| SubtitleError::InvalidTimecode(line.to_string()))?;
    let end_ms = parse_timestamp(&caps[2])
        .map_err(|_| SubtitleError::InvalidTimecode(line.to_string()))?;

    if end_ms < start_ms {
        return Err(SubtitleError::InvalidTimeRange { start_ms, end_ms });
    }

    Ok((start_ms, end_ms))
}

/// Format a `(start, end)` pair as a range line
pub fn format_range(start_ms: u64, end_ms: u64) -> String {
    format!(
        "{}{}{}",
        format_timestamp(start_ms),
        RANGE_SEPARATOR,
        format_timestamp(end_ms)
    )
}
