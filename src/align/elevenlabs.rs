use crate::align::{Alignment, ForcedAligner};
use crate::error::{DubsyncError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// ElevenLabs API base URL.
const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Forced alignment endpoint, relative to the base URL.
const FORCED_ALIGNMENT_PATH: &str = "/v1/forced-alignment";

/// Maximum attempts for API calls.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// Client for the ElevenLabs forced-alignment API.
pub struct ElevenLabsAligner {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Message { message: String },
    Text(String),
    Other(serde_json::Value),
}

impl std::fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorDetail::Message { message } => write!(f, "{message}"),
            ApiErrorDetail::Text(text) => write!(f, "{text}"),
            ApiErrorDetail::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Failure of a single attempt; client errors are not worth retrying.
enum AttemptError {
    Fatal(DubsyncError),
    Retryable(DubsyncError),
}

impl ElevenLabsAligner {
    /// Create a client. Without an API key the aligner reports itself unavailable.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: ELEVENLABS_API_URL.to_string(),
            max_retries: MAX_RETRIES,
        }
    }

    /// Point the client at a different host (e.g. a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    async fn build_form(&self, audio_path: &Path, transcript: &str) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DubsyncError::FileNotFound(audio_path.display().to_string())
            } else {
                DubsyncError::Io(e)
            }
        })?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            _ => "application/octet-stream",
        };

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str(mime_type)?;

        Ok(Form::new()
            .part("file", file_part)
            .text("text", transcript.to_string()))
    }

    async fn call_api(&self, api_key: &str, form: Form) -> std::result::Result<Alignment, AttemptError> {
        let url = format!("{}{}", self.base_url, FORCED_ALIGNMENT_PATH);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(DubsyncError::Alignment(e.to_string())))?;

        let status = response.status();
        debug!("Forced alignment response status: {}", status);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AttemptError::Retryable(DubsyncError::Alignment(e.to_string())))?;
            return serde_json::from_str::<Alignment>(&body)
                .map_err(|e| AttemptError::Fatal(DubsyncError::Json(e)));
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
            Ok(api_error) => api_error.detail.to_string(),
            Err(_) => error_body,
        };
        let error = DubsyncError::Api(format!("ElevenLabs API error ({status}): {message}"));

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            Err(AttemptError::Fatal(error))
        } else {
            Err(AttemptError::Retryable(error))
        }
    }
}

#[async_trait]
impl ForcedAligner for ElevenLabsAligner {
    async fn align(&self, audio_path: &Path, transcript: &str) -> Result<Alignment> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DubsyncError::Config(
                "ELEVENLABS_API_KEY not set. Export it with: export ELEVENLABS_API_KEY=...".to_string(),
            )
        })?;

        debug!(
            "Requesting forced alignment for {:?} ({} chars of transcript)",
            audio_path,
            transcript.len()
        );

        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            // The form is consumed by each request, so rebuild it per attempt.
            let form = self.build_form(audio_path, transcript).await?;

            match self.call_api(api_key, form).await {
                Ok(alignment) => {
                    debug!("Forced alignment returned {} words", alignment.words.len());
                    return Ok(alignment);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(e)) => {
                    warn!("Forced alignment attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DubsyncError::Alignment("Unknown error".to_string())))
    }

    fn name(&self) -> &'static str {
        "ElevenLabs forced alignment"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_follows_api_key() {
        assert!(ElevenLabsAligner::new(Some("key".to_string())).is_available());
        assert!(!ElevenLabsAligner::new(None).is_available());
        assert!(!ElevenLabsAligner::new(Some("  ".to_string())).is_available());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let aligner = ElevenLabsAligner::new(None).with_base_url("http://localhost:1234/");
        assert_eq!(aligner.base_url, "http://localhost:1234");
    }

    #[tokio::test]
    async fn test_align_without_key_is_config_error() {
        let aligner = ElevenLabsAligner::new(None);
        let result = aligner.align(Path::new("/tmp/whatever.wav"), "Hello").await;
        assert!(matches!(result, Err(DubsyncError::Config(_))));
    }

    #[tokio::test]
    async fn test_align_missing_file() {
        let aligner = ElevenLabsAligner::new(Some("key".to_string()));
        let result = aligner
            .align(Path::new("/nonexistent/audio.wav"), "Hello")
            .await;
        assert!(matches!(result, Err(DubsyncError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_alignment_response() {
        let body = r#"{
            "characters": [{"text": "H", "start": 0.0, "end": 0.1}],
            "words": [
                {"text": "Hello", "start": 0.0, "end": 0.5, "loss": 0.01},
                {"text": "world", "start": 0.6, "end": 1.1, "loss": 0.02}
            ],
            "loss": 0.015
        }"#;

        let alignment: Alignment = serde_json::from_str(body).unwrap();
        assert_eq!(alignment.words.len(), 2);
        assert_eq!(alignment.words[1].text, "world");
        assert_eq!(alignment.words[1].loss, Some(0.02));
        assert_eq!(alignment.loss, Some(0.015));
    }

    #[test]
    fn test_error_detail_display() {
        let parsed: ApiErrorResponse =
            serde_json::from_str(r#"{"detail": {"status": "invalid_api_key", "message": "Bad key"}}"#)
                .unwrap();
        assert_eq!(parsed.detail.to_string(), "Bad key");

        let parsed: ApiErrorResponse = serde_json::from_str(r#"{"detail": "Not found"}"#).unwrap();
        assert_eq!(parsed.detail.to_string(), "Not found");
    }
}
