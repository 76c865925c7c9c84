use std::fmt;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::timecode;

// @module: Subtitle parsing, serialization and entry model

// @const: Blank-line block separator
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").unwrap()
});

// @struct: Single subtitle entry
//
// The timecode string is derived from the two instants and is only ever
// rewritten through `set_span`, so it cannot drift from them.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Display order, 1-based
    pub index: usize,

    // @field: Caption text, lines joined with '\n'
    pub text: String,

    start_ms: u64,
    end_ms: u64,
    timecode: String,
}

impl SubtitleEntry {
    /// Create an entry, rejecting an end instant before the start instant
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Result<Self, SubtitleError> {
        if end_ms < start_ms {
            return Err(SubtitleError::InvalidTimeRange { start_ms, end_ms });
        }

        Ok(Self {
            index,
            text: text.into(),
            start_ms,
            end_ms,
            timecode: timecode::format_range(start_ms, end_ms),
        })
    }

    /// Start instant in milliseconds
    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// End instant in milliseconds
    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    /// Display duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Cached `HH:MM:SS,mmm --> HH:MM:SS,mmm` line for the current span
    pub fn timecode(&self) -> &str {
        &self.timecode
    }

    /// Move both bounds and regenerate the timecode
    pub fn set_span(&mut self, start_ms: u64, end_ms: u64) -> Result<(), SubtitleError> {
        if end_ms < start_ms {
            return Err(SubtitleError::InvalidTimeRange { start_ms, end_ms });
        }
        self.start_ms = start_ms;
        self.end_ms = end_ms;
        self.timecode = timecode::format_range(start_ms, end_ms);
        Ok(())
    }

    /// Move the end bound, keeping the start
    pub fn set_end(&mut self, end_ms: u64) -> Result<(), SubtitleError> {
        self.set_span(self.start_ms, end_ms)
    }

    /// Text length in Unicode scalar values
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Display lines of the caption
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

impl fmt::Display for SubtitleEntry {
    // Text lines are written without trailing whitespace and blank lines are
    // skipped, which is exactly what `parse` reads back.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{}", self.index, self.timecode)?;
        for line in self.text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Parse raw SRT content into entries.
///
/// Blocks are separated by blank lines. A block needs an index line, a
/// timecode line and at least one text line; anything else is dropped
/// without failing the parse.
pub fn parse(content: &str) -> Vec<SubtitleEntry> {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let trimmed = normalized.trim();

    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    let mut dropped = 0;

    for block in BLOCK_SEPARATOR.split(trimmed) {
        match parse_block(block) {
            Some(entry) => entries.push(entry),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} malformed subtitle block(s)", dropped);
    }

    entries
}

// @parses: One blank-line delimited block
fn parse_block(block: &str) -> Option<SubtitleEntry> {
    let lines: Vec<&str> = block.trim().split('\n').map(str::trim_end).collect();
    if lines.len() < 3 {
        debug!("Skipping block with {} line(s): {:?}", lines.len(), lines.first());
        return None;
    }

    let index = match lines[0].trim().parse::<usize>() {
        Ok(index) => index,
        Err(_) => {
            debug!("Skipping block with non-numeric index line: {}", lines[0]);
            return None;
        }
    };

    let (start_ms, end_ms) = match timecode::parse_range(lines[1]) {
        Ok(range) => range,
        Err(e) => {
            debug!("Skipping block {}: {}", index, e);
            return None;
        }
    };

    let text = lines[2..].join("\n");
    SubtitleEntry::new(index, start_ms, end_ms, text).ok()
}

/// Serialize entries as SRT: `index\ntimecode\ntext` blocks separated by a
/// blank line, always ending with a newline.
pub fn serialize(entries: &[SubtitleEntry]) -> String {
    let mut out = entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

/// Assign dense 1-based indices in sequence order
pub fn renumber(entries: &mut [SubtitleEntry]) {
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.index = i + 1;
    }
}

/// Collection of subtitle entries with the file they came from
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Ordered subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty collection
    pub fn new(source_file: PathBuf) -> Self {
        Self {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Create a collection from already parsed entries
    pub fn with_entries(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        Self { source_file, entries }
    }

    /// Parse SRT content held in memory
    pub fn parse_srt_string(source_file: PathBuf, content: &str) -> Self {
        Self::with_entries(source_file, parse(content))
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let collection = Self::parse_srt_string(path.to_path_buf(), &content);

        if collection.entries.is_empty() {
            warn!("No subtitle entries found in {:?}", path);
        }

        Ok(collection)
    }

    /// Render the collection as SRT text
    pub fn to_srt_string(&self) -> String {
        serialize(&self.entries)
    }

    /// Write the collection to an SRT file, creating parent directories
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
