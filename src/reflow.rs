/*!
 * Timing reflow after translation.
 *
 * Each caption keeps its start instant; its duration is rescaled by the
 * ratio of translated to original text length and clamped to
 * `[min_duration_ms, original * max_stretch]`. When the upper bound falls
 * below the floor the floor wins. Lengths are measured on the flattened
 * single-line form that is sent for translation.
 */

use log::debug;

use crate::app_config::ReflowConfig;
use crate::subtitle_processor::SubtitleEntry;
use crate::translation::prompts::flatten_text;

/// Rescaled display duration for a caption of `original_ms`
pub fn reflow_duration(original_ms: u64, original_chars: usize, translated_chars: usize, config: &ReflowConfig) -> u64 {
    let ratio = if original_chars == 0 {
        1.0
    } else {
        translated_chars as f64 / original_chars as f64
    };

    let scaled = (original_ms as f64 * ratio).round() as u64;
    let upper = ((original_ms as f64 * config.max_stretch).round() as u64).max(config.min_duration_ms);

    scaled.clamp(config.min_duration_ms, upper)
}

/// Replace each entry's text with its translation and rescale its end time.
///
/// `translations` is positional. A missing or blank translation keeps the
/// original text, which gives a ratio of 1.
pub fn reflow_entries(entries: &[SubtitleEntry], translations: &[String], config: &ReflowConfig) -> Vec<SubtitleEntry> {
    let mut stretched = 0;
    let mut shrunk = 0;

    let reflowed = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = translations
                .get(i)
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .unwrap_or(entry.text.as_str())
                .to_string();

            let mut out = entry.clone();
            if config.enabled {
                let duration = reflow_duration(
                    entry.duration_ms(),
                    flatten_text(&entry.text).chars().count(),
                    flatten_text(&text).chars().count(),
                    config,
                );
                match duration.cmp(&entry.duration_ms()) {
                    std::cmp::Ordering::Greater => stretched += 1,
                    std::cmp::Ordering::Less => shrunk += 1,
                    std::cmp::Ordering::Equal => {}
                }
                // start + duration >= start, so the span is always valid
                let _ = out.set_end(entry.start_ms() + duration);
            }
            out.text = text;
            out
        })
        .collect();

    debug!(
        "Timing reflow: {} entries, {} stretched, {} shrunk",
        entries.len(),
        stretched,
        shrunk
    );
    reflowed
}
