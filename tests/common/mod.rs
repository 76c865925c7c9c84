/*!
 * Common test utilities for the subreflow test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subreflow::app_config::Config;
use subreflow::subtitle_processor::SubtitleEntry;


/// Fragmented track: entries 1-2 form one sentence, 3 stands alone, 4-5 form one sentence
pub const FRAGMENTED_SRT: &str = "1
00:00:01,000 --> 00:00:02,000
<i>So I was thinking</i>

2
00:00:02,100 --> 00:00:03,500
we could go tomorrow.

3
00:00:05,000 --> 00:00:06,000
[door slams]
Okay!

4
00:00:06,200 --> 00:00:07,000
Maybe after

5
00:00:07,100 --> 00:00:08,000
lunch?
";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the fragmented sample subtitle file
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, FRAGMENTED_SRT)
}

/// Build an entry, panicking on an invalid span
pub fn entry(index: usize, start_ms: u64, end_ms: u64, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(index, start_ms, end_ms, text).unwrap()
}

/// Route library logs through the test harness; safe to call from every test
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default config without the inter-batch pause or retry backoff
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.translation.common.batch_delay_ms = 0;
    config.translation.common.retry_backoff_ms = 1;
    config
}
