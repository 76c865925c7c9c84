/*!
 * Sentence-boundary merging.
 *
 * Folds runs of captions that are fragments of one sentence into a single
 * caption. The fold is one left-to-right pass with a single accumulating
 * entry; a decision is never revisited. `next` is absorbed into `current`
 * only when every gate passes:
 *
 * 1. the gap `next.start - current.end` lies in `[0, max_gap_ms]`
 * 2. `current` does not already end a sentence
 * 3. `next.end - current.start <= max_duration_ms`
 * 4. `chars(current) + chars(next) <= max_chars`
 */

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::app_config::MergeConfig;
use crate::subtitle_processor::{self, SubtitleEntry};

// Closing quotes and brackets allowed after a terminal mark.
const CLOSERS: &str = r#"["'”’」』）)»]"#;

static TERMINAL_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"[.!?。！？]{}?$", CLOSERS)).unwrap()
});

static ELLIPSIS_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\.{{3,}}|…+|⋯+|．{{3,}}|。{{3,}}){}?$", CLOSERS)).unwrap()
});

/// Why a pair of adjacent entries was not merged
#[derive(Debug, Clone, PartialEq)]
pub enum MergeBlock {
    /// `next` starts before `current` ends
    Overlap { overlap_ms: u64 },
    /// Silence between the two exceeds the gap limit
    Gap { gap_ms: u64 },
    /// `current` already ends in sentence-terminal punctuation
    SentenceComplete,
    /// Merged span would exceed the duration limit
    Duration { merged_ms: u64 },
    /// Merged text would exceed the length limit
    Length { merged_chars: usize },
}

impl fmt::Display for MergeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { overlap_ms } => write!(f, "overlap of {} ms", overlap_ms),
            Self::Gap { gap_ms } => write!(f, "gap of {} ms", gap_ms),
            Self::SentenceComplete => write!(f, "sentence already complete"),
            Self::Duration { merged_ms } => write!(f, "merged span of {} ms", merged_ms),
            Self::Length { merged_chars } => write!(f, "merged length of {} chars", merged_chars),
        }
    }
}

/// Whether `text` ends in a sentence-terminal mark.
///
/// A trailing ellipsis counts as terminal only when `ellipsis_is_terminal`.
pub fn is_sentence_terminal(text: &str, ellipsis_is_terminal: bool) -> bool {
    let trimmed = text.trim();
    if ELLIPSIS_END.is_match(trimmed) {
        return ellipsis_is_terminal;
    }
    TERMINAL_END.is_match(trimmed)
}

/// First gate that blocks folding `next` into `current`, if any
pub fn merge_blocker(current: &SubtitleEntry, next: &SubtitleEntry, config: &MergeConfig) -> Option<MergeBlock> {
    if next.start_ms() < current.end_ms() {
        return Some(MergeBlock::Overlap {
            overlap_ms: current.end_ms() - next.start_ms(),
        });
    }

    let gap_ms = next.start_ms() - current.end_ms();
    if gap_ms > config.max_gap_ms {
        return Some(MergeBlock::Gap { gap_ms });
    }

    if is_sentence_terminal(&current.text, config.ellipsis_is_terminal) {
        return Some(MergeBlock::SentenceComplete);
    }

    let merged_ms = next.end_ms() - current.start_ms();
    if merged_ms > config.max_duration_ms {
        return Some(MergeBlock::Duration { merged_ms });
    }

    let merged_chars = current.char_len() + next.char_len();
    if merged_chars > config.max_chars {
        return Some(MergeBlock::Length { merged_chars });
    }

    None
}

// @folds: `next` into `current`; the gap gate guarantees next.end >= current.start
fn absorb(current: &mut SubtitleEntry, next: &SubtitleEntry) -> bool {
    if current.set_end(next.end_ms()).is_err() {
        return false;
    }
    current.text = format!("{} {}", current.text, next.text);
    true
}

/// Merge sentence fragments and renumber the result densely from 1
pub fn merge_entries(entries: &[SubtitleEntry], config: &MergeConfig) -> Vec<SubtitleEntry> {
    let mut iter = entries.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::with_capacity(entries.len());
    let mut current = first.clone();

    for next in iter {
        let folded = match merge_blocker(&current, next, config) {
            None => absorb(&mut current, next),
            Some(reason) => {
                trace!("Entry {} starts a new caption: {}", next.index, reason);
                false
            }
        };

        if !folded {
            merged.push(std::mem::replace(&mut current, next.clone()));
        }
    }
    merged.push(current);

    subtitle_processor::renumber(&mut merged);
    debug!("Sentence merge: {} entries -> {} entries", entries.len(), merged.len());
    merged
}
