/*!
 * Numbered batch prompts.
 *
 * A batch of subtitle texts travels to the model as one user message with a
 * `[k] text` line per entry, and the reply is read back line by line.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a leading `[k]`, `k.` or `k)` marker and captures the rest of the line
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[(\d+)\]|(\d+)[.)](?:\s|$))\s*(.*)$").unwrap()
});

/// Fill the `{source_language}` and `{target_language}` placeholders of a system prompt
pub fn render_system_prompt(template: &str, source_language: &str, target_language: &str) -> String {
    template
        .replace("{source_language}", source_language)
        .replace("{target_language}", target_language)
}

/// Join the trimmed, non-blank lines of a caption with single spaces
pub fn flatten_text(text: &str) -> String {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Build the user message for a batch, one `[k] text` line per entry (1-based).
///
/// Line breaks inside an entry are flattened to spaces so every entry stays on one line.
pub fn build_numbered_request(texts: &[String]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[{}] {}", i + 1, flatten_text(text)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a line into its marker number and remaining text, if it carries a marker
pub fn split_marker(line: &str) -> Option<(usize, &str)> {
    let caps = MARKER_REGEX.captures(line)?;
    let number = caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()?;
    let rest = caps.get(3).map_or("", |m| m.as_str());
    Some((number, rest.trim()))
}

/// Read a model reply back into one string per returned line, in order.
///
/// Blank lines are skipped, leading markers are stripped and a line without a
/// marker is kept verbatim.
pub fn parse_numbered_response(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| match split_marker(line) {
            Some((_, text)) => text.to_string(),
            None => line.to_string(),
        })
        .collect()
}
