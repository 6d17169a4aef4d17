use std::path::Path;
use std::process::Command;

use hound::WavReader;
use tracing::debug;

use crate::error::{DubsyncError, Result};

/// Duration of a WAV file in seconds, read from its header.
pub fn wav_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(DubsyncError::AudioProbe(format!(
            "{} reports a sample rate of 0",
            path.display()
        )));
    }
    // `duration()` counts frames, independent of channel count.
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Audio duration in seconds.
///
/// WAV files are measured from their header; anything else goes through FFprobe.
pub fn get_audio_duration(input: &Path) -> Result<f64> {
    if !input.exists() {
        return Err(DubsyncError::FileNotFound(input.display().to_string()));
    }

    let is_wav = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    if is_wav {
        match wav_duration(input) {
            Ok(duration) => return Ok(duration),
            Err(e) => debug!("WAV header read failed for {:?}, trying FFprobe: {}", input, e),
        }
    }

    ffprobe_duration(input)
}

fn ffprobe_duration(input: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| DubsyncError::ToolNotFound {
            tool: "ffprobe".to_string(),
            hint: format!("failed to run FFprobe: {e}"),
        })?;

    if !output.status.success() {
        return Err(DubsyncError::ToolFailed {
            tool: "ffprobe".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration_secs: f64 = duration_str.trim().parse().map_err(|e| {
        DubsyncError::AudioProbe(format!(
            "Failed to parse duration '{}': {e}",
            duration_str.trim()
        ))
    })?;

    Ok(duration_secs)
}
