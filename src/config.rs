use crate::error::{DubsyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Segments whose word count is at or below this are absorbed into the next one.
pub const DEFAULT_MIN_WORDS: usize = 5;

/// Overall duration drift (in percent) above which a mismatch is reported.
pub const DEFAULT_MISMATCH_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Srt,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'srt' or 'json'", s)),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Json => "json",
        }
    }

    /// Guess the segment-list format from a file extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub elevenlabs_api_key: Option<String>,
    pub min_words: usize,
    pub mismatch_threshold_percent: f64,
    pub concurrency: usize,
    pub rubberband_path: String,
    pub word_level_timing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            min_words: DEFAULT_MIN_WORDS,
            mismatch_threshold_percent: DEFAULT_MISMATCH_THRESHOLD,
            concurrency: 1,
            rubberband_path: "rubberband".to_string(),
            word_level_timing: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    DubsyncError::Config(format!("{}: {e}", config_path.display()))
                })?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
            if !key.is_empty() {
                self.elevenlabs_api_key = Some(key);
            }
        }
        if let Ok(min_words) = std::env::var("DUBSYNC_MIN_WORDS") {
            if let Ok(n) = min_words.parse() {
                self.min_words = n;
            }
        }
        if let Ok(threshold) = std::env::var("DUBSYNC_MISMATCH_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.mismatch_threshold_percent = t;
            }
        }
        if let Ok(concurrency) = std::env::var("DUBSYNC_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
        if let Ok(path) = std::env::var("DUBSYNC_RUBBERBAND") {
            self.rubberband_path = path;
        }
        if let Ok(flag) = std::env::var("DUBSYNC_WORD_LEVEL") {
            self.word_level_timing = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(DubsyncError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if !self.mismatch_threshold_percent.is_finite() || self.mismatch_threshold_percent < 0.0 {
            return Err(DubsyncError::Config(format!(
                "Mismatch threshold must be a non-negative percentage, got {}",
                self.mismatch_threshold_percent
            )));
        }

        if self.rubberband_path.trim().is_empty() {
            return Err(DubsyncError::Config(
                "rubberband_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dubsync").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("srt".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("vtt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(std::path::Path::new("subs/movie.srt")),
            Some(OutputFormat::Srt)
        );
        assert_eq!(
            OutputFormat::from_path(std::path::Path::new("segments.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_path(std::path::Path::new("noext")), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.min_words, 5);
        assert_eq!(config.mismatch_threshold_percent, 5.0);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.rubberband_path, "rubberband");
        assert!(!config.word_level_timing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = Config {
            mismatch_threshold_percent: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_word_level_without_key_is_valid() {
        let config = Config {
            word_level_timing: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("min_words = 3\n").unwrap();
        assert_eq!(config.min_words, 3);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.mismatch_threshold_percent, 5.0);
    }
}
