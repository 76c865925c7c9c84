/*!
 * Tests for the bilingual ASS writer
 */

use subreflow::ass_export::{build_bilingual_ass, SOURCE_STYLE, TRANSLATION_STYLE};
use crate::common::entry;

/// Test the script layout with one pair of captions
#[test]
fn test_build_bilingual_ass_shouldWriteHeaderStylesAndEvents() {
    let source = vec![entry(1, 1000, 3500, "So I was thinking\nwe could go.")];
    let translated = vec![entry(1, 1000, 3000, "我在想我们可以去。")];

    let script = build_bilingual_ass(&source, &translated);

    assert!(script.starts_with("[Script Info]\nScriptType: v4.00+\nPlayResX: 1920\nPlayResY: 1080\n"));
    assert!(script.contains(&format!("Style: {},Arial,36,", SOURCE_STYLE)));
    assert!(script.contains(&format!("Style: {},Arial,36,", TRANSLATION_STYLE)));
    assert!(script.contains("[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n"));
    assert!(script.contains("Dialogue: 0,0:00:01.00,0:00:03.50,Source,,0,0,0,,So I was thinking\\Nwe could go.\n"));
    assert!(script.ends_with("Dialogue: 0,0:00:01.00,0:00:03.00,Translation,,0,0,0,,我在想我们可以去。\n"));
}

/// Test that the translated track sits higher than the source track
#[test]
fn test_build_bilingual_ass_shouldUseDistinctVerticalMargins() {
    let script = build_bilingual_ass(&[], &[]);

    let source_style = script.lines().find(|l| l.starts_with("Style: Source,")).unwrap();
    let translation_style = script.lines().find(|l| l.starts_with("Style: Translation,")).unwrap();
    assert!(source_style.ends_with(",20,1"));
    assert!(translation_style.ends_with(",50,1"));
    assert!(!script.contains("Dialogue:"));
}

/// Test that only positional pairs are written
#[test]
fn test_build_bilingual_ass_withUnevenTracks_shouldZip() {
    let source = vec![entry(1, 0, 1000, "One"), entry(2, 2000, 3000, "Two")];
    let translated = vec![entry(1, 0, 1000, "Eins")];

    let script = build_bilingual_ass(&source, &translated);

    assert_eq!(script.matches("Dialogue:").count(), 2);
    assert!(!script.contains("Two"));
}

/// Test that leftover markup never reaches the script
#[test]
fn test_build_bilingual_ass_withMarkup_shouldStripIt() {
    let source = vec![entry(1, 0, 1000, "<b>Bold</b> {\\pos(1,1)}text")];
    let translated = vec![entry(1, 0, 1000, "<i>Fett</i>")];

    let script = build_bilingual_ass(&source, &translated);

    assert!(script.contains(",,Bold text\n"));
    assert!(script.contains(",,Fett\n"));
    assert!(!script.contains("<b>"));
}
