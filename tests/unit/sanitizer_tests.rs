/*!
 * Tests for caption text sanitizing
 */

use subreflow::sanitizer::sanitize;

/// Test removal of every noise kind
#[test]
fn test_sanitize_withAllNoiseKinds_shouldStripThem() {
    let raw = "<i>{\\an8}♪ Hello</i> [MUSIC] world ♫";
    assert_eq!(sanitize(raw), "Hello world");
}

/// Test that lines left empty are dropped but real lines stay separate
#[test]
fn test_sanitize_withAnnotationOnlyLine_shouldDropLine() {
    assert_eq!(sanitize("[door slams]\nOkay!"), "Okay!");
    assert_eq!(sanitize("  first  \n\n second "), "first\nsecond");
}

/// Test that pure noise becomes empty text
#[test]
fn test_sanitize_withOnlyNoise_shouldReturnEmpty() {
    assert_eq!(sanitize("<b></b> [APPLAUSE] ♪♪"), "");
}

/// Test idempotency across several inputs
#[test]
fn test_sanitize_appliedTwice_shouldEqualAppliedOnce() {
    for raw in ["<font color=\"red\">Hi</font>", "a  \u{3000} b", "[x] {y} <z> ♬", "plain text.", "line\n  \nline"] {
        let once = sanitize(raw);
        assert_eq!(sanitize(&once), once, "not idempotent for {:?}", raw);
    }
}
