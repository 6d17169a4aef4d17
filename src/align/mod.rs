pub mod elevenlabs;
pub mod words;

pub use elevenlabs::ElevenLabsAligner;
pub use words::{
    align_by_proportional_timing, align_translated_words, align_words_exactly,
    create_word_level_segments,
};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing for a single word as reported by forced alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Alignment confidence reported by the service; carried, never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Forced-alignment response. Only `words` is consumed downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub words: Vec<WordTiming>,
    #[serde(default)]
    pub characters: Vec<CharacterTiming>,
    #[serde(default)]
    pub loss: Option<f64>,
}

/// A translated word placed on the original timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// The paired original word, or empty when timing was distributed proportionally.
    pub original_word: String,
}

/// An external service mapping transcript words onto audio timing.
#[async_trait]
pub trait ForcedAligner: Send + Sync {
    async fn align(&self, audio_path: &Path, transcript: &str) -> Result<Alignment>;
    fn name(&self) -> &'static str;
    /// Whether the service can be called at all (credentials present, etc.).
    fn is_available(&self) -> bool;
}
