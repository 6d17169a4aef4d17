pub mod concat;
pub mod probe;
pub mod stretch;

pub use concat::concatenate_wavs;
pub use probe::{get_audio_duration, wav_duration};
pub use stretch::{RubberbandStretcher, TimeStretcher};

use crate::error::{DubsyncError, Result};
use std::path::Path;

pub const SUPPORTED_VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
pub const SUPPORTED_AUDIO_FORMATS: &[&str] = &["mp3", "wav", "m4a", "flac"];

fn check_media_file(path: &Path, kind: &str, supported: &[&str]) -> Result<()> {
    if !path.exists() {
        return Err(DubsyncError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !supported.contains(&extension.as_str()) {
        return Err(DubsyncError::UnsupportedFormat(format!(
            "{kind} file {} (supported: {})",
            path.display(),
            supported.join(", ")
        )));
    }

    Ok(())
}

/// Check that a video file exists and has a supported container extension.
pub fn validate_video_file(path: &Path) -> Result<()> {
    check_media_file(path, "video", SUPPORTED_VIDEO_FORMATS)
}

/// Check that an audio file exists and has a supported extension.
pub fn validate_audio_file(path: &Path) -> Result<()> {
    check_media_file(path, "audio", SUPPORTED_AUDIO_FORMATS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("clip.WAV");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&wav, b"").unwrap();
        std::fs::write(&txt, b"").unwrap();

        assert!(validate_audio_file(&wav).is_ok());
        assert!(matches!(
            validate_audio_file(&txt),
            Err(DubsyncError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_audio_file(&dir.path().join("missing.mp3")),
            Err(DubsyncError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_video_file() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mkv");
        std::fs::write(&video, b"").unwrap();

        assert!(validate_video_file(&video).is_ok());
        assert!(validate_audio_file(&video).is_err());
    }
}
