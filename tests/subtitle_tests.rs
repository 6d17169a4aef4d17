//! File-level tests for loading, merging and saving segment lists.

use dubsync::config::OutputFormat;
use dubsync::error::DubsyncError;
use dubsync::pipeline::prepare_segments;
use dubsync::subtitle::{load_segments, save_segments, validate_segments};
use tempfile::TempDir;

const TRANSCRIPT: &str = "\
1
00:00:00,000 --> 00:00:00,800
Hi

2
00:00:00,900 --> 00:00:02,100
there my good old friend,

3
00:00:02,500 --> 00:00:05,000
<b>how</b> have you been all this time?

4
not a timing line
ignored
";

#[test]
fn test_load_merge_save_srt() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("talk.srt");
    std::fs::write(&input, TRANSCRIPT).unwrap();

    let segments = load_segments(&input).unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[2].text, "how have you been all this time?");
    assert!(validate_segments(&segments).valid);

    let merged = prepare_segments(segments, 5);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "Hi there my good old friend,");
    assert_eq!(merged[0].start, 0.0);
    assert!((merged[0].end - 2.1).abs() < 1e-9);

    let output = dir.path().join("nested").join("talk_merged.srt");
    save_segments(&merged, &output, OutputFormat::Srt).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("1\n00:00:00,000 --> 00:00:02,100\nHi there my good old friend,\n\n2\n"));

    let reloaded = load_segments(&output).unwrap();
    assert_eq!(reloaded, merged);
}

#[test]
fn test_json_segments_keep_original_text() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("segments.json");

    let source = load_segments_from_str(TRANSCRIPT, &dir);
    let translated: Vec<_> = source
        .iter()
        .map(|s| s.translated(format!("[de] {}", s.text)))
        .collect();

    save_segments(&translated, &output, OutputFormat::Json).unwrap();
    let reloaded = load_segments(&output).unwrap();

    assert_eq!(reloaded, translated);
    assert_eq!(reloaded[0].original_text.as_deref(), Some("Hi"));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("talk.vtt");
    std::fs::write(&input, "WEBVTT\n").unwrap();

    assert!(matches!(
        load_segments(&input),
        Err(DubsyncError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_file_without_valid_blocks() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.srt");
    std::fs::write(&input, "garbage\n\nmore garbage\n").unwrap();

    assert!(matches!(
        load_segments(&input),
        Err(DubsyncError::NoSegmentsFound(_))
    ));
}

fn load_segments_from_str(content: &str, dir: &TempDir) -> Vec<dubsync::subtitle::Segment> {
    let path = dir.path().join("source.srt");
    std::fs::write(&path, content).unwrap();
    load_segments(&path).unwrap()
}
