use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubsyncError {
    #[error("Invalid timestamp format: {0}")]
    Timestamp(String),

    #[error("No valid subtitles found in {0}")]
    NoSegmentsFound(String),

    #[error("Number of audio files ({audio_files}) must match number of segments ({segments})")]
    SegmentCountMismatch { audio_files: usize, segments: usize },

    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    #[error("{tool} not found: {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("Audio probe failed: {0}")]
    AudioProbe(String),

    #[error("Forced alignment failed: {0}")]
    Alignment(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, DubsyncError>;
