/*!
 * Bilingual ASS (Advanced SubStation Alpha) export.
 *
 * Writes the merged source captions and their translations into one v4.00+
 * script with a style per language, ready to be handed to a renderer that
 * burns both tracks into a video.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;

/// Style name for the source-language track
pub const SOURCE_STYLE: &str = "Source";

/// Style name for the translated track
pub const TRANSLATION_STYLE: &str = "Translation";

static ASS_MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>|\{[^}]*\}").unwrap()
});

const SCRIPT_HEADER: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 1920
PlayResY: 1080

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
";

const EVENTS_HEADER: &str = "
[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Format milliseconds as an ASS timestamp `H:MM:SS.cc` (centiseconds, truncated)
pub fn format_ass_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Strip override blocks and markup, turning line breaks into `\N`
pub fn clean_ass_text(text: &str) -> String {
    ASS_MARKUP_REGEX
        .replace_all(text, "")
        .lines()
        .collect::<Vec<_>>()
        .join("\\N")
}

fn style_line(name: &str, margin_v: u32) -> String {
    format!(
        "Style: {},Arial,36,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,1,0,0,0,100,100,0,0,1,2,1,2,10,10,{},1\n",
        name, margin_v
    )
}

fn dialogue_line(entry: &SubtitleEntry, style: &str) -> String {
    format!(
        "Dialogue: 0,{},{},{},,0,0,0,,{}",
        format_ass_timestamp(entry.start_ms()),
        format_ass_timestamp(entry.end_ms()),
        style,
        clean_ass_text(&entry.text)
    )
}

/// Build a two-track ASS script.
///
/// Entries are paired by position; only the first `min(source.len(), translated.len())`
/// pairs are written.
pub fn build_bilingual_ass(source: &[SubtitleEntry], translated: &[SubtitleEntry]) -> String {
    let mut script = String::from(SCRIPT_HEADER);
    script.push_str(&style_line(SOURCE_STYLE, 20));
    script.push_str(&style_line(TRANSLATION_STYLE, 50));
    script.push_str(EVENTS_HEADER);

    let events: Vec<String> = source
        .iter()
        .zip(translated.iter())
        .flat_map(|(src, dst)| [dialogue_line(src, SOURCE_STYLE), dialogue_line(dst, TRANSLATION_STYLE)])
        .collect();

    script.push_str(&events.join("\n"));
    if !events.is_empty() {
        script.push('\n');
    }
    script
}
