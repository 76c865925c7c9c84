/*!
 * Caption text sanitizing.
 *
 * Strips markup and annotation noise before sentence merging and
 * translation, in this order:
 * 1. angle-bracket markup (`<i>`, `<font color="...">`)
 * 2. brace style overrides (`{\an8}`, `{\i1}`)
 * 3. square-bracket annotations (`[door slams]`, `[MUSIC]`)
 * 4. musical note glyphs
 *
 * Each line is then trimmed, runs of spaces collapse to one and lines left
 * empty are dropped. The operation is idempotent.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered removal patterns
static NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // HTML-like tags
        Regex::new(r"<[^>]*>").unwrap(),
        // SSA/ASS override blocks
        Regex::new(r"\{[^}]*\}").unwrap(),
        // Sound effect and speaker annotations
        Regex::new(r"\[[^\]]*\]").unwrap(),
        // Music glyphs
        Regex::new(r"[♪♫♬♩]").unwrap(),
    ]
});

static INNER_WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t\u{00a0}\u{3000}]+").unwrap()
});

/// Remove markup and annotations from caption text
pub fn sanitize(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in NOISE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    cleaned
        .lines()
        .map(|line| INNER_WHITESPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
