use crate::align::{align_translated_words, AlignedWord, ForcedAligner};
use crate::audio::TimeStretcher;
use crate::config::Config;
use crate::error::Result;
use crate::subtitle::{join_text, merge_segments, Segment};
use crate::sync::{
    merge_time_aligned_segments, DurationMismatch, ReconcileOptions, SegmentLevelStrategy,
    StrategyFallback, TimingStrategy, WordLevelStrategy,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for the timing synchronization pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Segments with this many words or fewer are merged into their successor.
    pub min_words: usize,
    /// Overall drift (percent) above which the result is flagged.
    pub mismatch_threshold_percent: f64,
    /// Try forced alignment before falling back to segment timing.
    pub word_level_timing: bool,
    /// Number of clips stretched concurrently.
    pub concurrency: usize,
    /// Show progress bars.
    pub show_progress: bool,
    /// Keep stretched clips here instead of a temporary directory.
    pub keep_stretched: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_words: config.min_words,
            mismatch_threshold_percent: config.mismatch_threshold_percent,
            word_level_timing: config.word_level_timing,
            concurrency: config.concurrency,
            show_progress: true,
            keep_stretched: None,
        }
    }
}

/// Everything the synchronization step consumes for one video.
#[derive(Debug, Clone)]
pub struct SyncRequest<'a> {
    /// Segments before translation; their text is sent to forced alignment.
    pub original_segments: &'a [Segment],
    /// Translated segments, one per synthesized clip.
    pub translated_segments: &'a [Segment],
    /// Synthesized clip per translated segment, in order.
    pub audio_files: &'a [PathBuf],
    /// Original speech audio, needed for word-level timing only.
    pub original_audio: Option<&'a Path>,
    /// Duration of the original video/audio, in seconds.
    pub original_duration: f64,
    /// Where the merged track is written.
    pub output: &'a Path,
}

/// Statistics from the synchronization run.
#[derive(Debug, Clone)]
pub struct SyncStats {
    pub total_time: Duration,
    pub alignment_time: Duration,
    pub stretch_time: Duration,
    pub segments: usize,
    pub aligned_words: usize,
}

/// Result of the synchronization pipeline.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub output_path: PathBuf,
    pub mismatch: DurationMismatch,
    /// Timing strategy that produced the stretch targets.
    pub strategy: &'static str,
    pub fallbacks: Vec<StrategyFallback>,
    pub stats: SyncStats,
}

/// Merge short transcript segments ahead of translation and synthesis.
pub fn prepare_segments(segments: Vec<Segment>, min_words: usize) -> Vec<Segment> {
    if segments.len() <= 1 {
        return segments;
    }
    let before = segments.len();
    let merged = merge_segments(segments, min_words);
    info!("Merged segments: {} → {}", before, merged.len());
    merged
}

/// Word timing for the translated text, or `None` when it cannot be obtained.
///
/// Every failure here is recoverable: the caller degrades to segment timing.
pub async fn word_alignment(
    aligner: Option<&dyn ForcedAligner>,
    original_audio: Option<&Path>,
    original_segments: &[Segment],
    translated_segments: &[Segment],
) -> Option<Vec<AlignedWord>> {
    let Some(aligner) = aligner.filter(|a| a.is_available()) else {
        warn!("Forced alignment not available, using segment-level timing");
        return None;
    };
    let Some(audio) = original_audio else {
        warn!("No original audio for forced alignment, using segment-level timing");
        return None;
    };

    let original_text = join_text(original_segments);
    match aligner.align(audio, &original_text).await {
        Ok(alignment) => {
            info!(
                "Got forced alignment for {} words from {}",
                alignment.words.len(),
                aligner.name()
            );
            let translated_text = join_text(translated_segments);
            let aligned = align_translated_words(&alignment.words, &translated_text);
            info!("Aligned {} translated words", aligned.len());
            Some(aligned)
        }
        Err(e) => {
            warn!("Word-level alignment failed: {}", e);
            None
        }
    }
}

/// Stretch synthesized clips onto the original timeline and report the drift.
///
/// Drift above the configured threshold is logged, never returned as an error.
pub async fn synchronize(
    request: SyncRequest<'_>,
    aligner: Option<&dyn ForcedAligner>,
    stretcher: &dyn TimeStretcher,
    config: &PipelineConfig,
) -> Result<SyncResult> {
    let start_time = Instant::now();

    let alignment_start = Instant::now();
    let aligned = if config.word_level_timing {
        info!("Using word-level timing with forced alignment...");
        word_alignment(
            aligner,
            request.original_audio,
            request.original_segments,
            request.translated_segments,
        )
        .await
        .unwrap_or_default()
    } else {
        Vec::new()
    };
    let alignment_time = alignment_start.elapsed();

    let word_level = WordLevelStrategy::new(&aligned);
    let strategies: Vec<&dyn TimingStrategy> = if config.word_level_timing {
        vec![&word_level as &dyn TimingStrategy, &SegmentLevelStrategy]
    } else {
        vec![&SegmentLevelStrategy as &dyn TimingStrategy]
    };

    let options = ReconcileOptions {
        concurrency: config.concurrency,
        show_progress: config.show_progress,
        keep_dir: config.keep_stretched.clone(),
    };

    let stretch_start = Instant::now();
    let reconciled = merge_time_aligned_segments(
        request.audio_files,
        request.translated_segments,
        request.output,
        stretcher,
        &strategies,
        &options,
    )
    .await?;
    let stretch_time = stretch_start.elapsed();

    let mismatch = DurationMismatch::new(
        request.original_duration,
        reconciled.duration,
        config.mismatch_threshold_percent,
    );
    info!(
        "Duration difference: {:.2}s ({:.1}%)",
        mismatch.difference, mismatch.percentage
    );
    if mismatch.needs_adjustment {
        warn!(
            "Large duration mismatch detected: {:.1}% exceeds {:.1}%",
            mismatch.percentage, config.mismatch_threshold_percent
        );
    }
    debug!("Timing strategy: {}", reconciled.strategy);

    Ok(SyncResult {
        output_path: reconciled.output_path,
        mismatch,
        strategy: reconciled.strategy,
        fallbacks: reconciled.fallbacks,
        stats: SyncStats {
            total_time: start_time.elapsed(),
            alignment_time,
            stretch_time,
            segments: request.translated_segments.len(),
            aligned_words: aligned.len(),
        },
    })
}

/// Print a summary of the synchronization results.
pub fn print_summary(result: &SyncResult) {
    let m = &result.mismatch;
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                   Audio Synchronization Complete               ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:              {}", result.output_path.display());
    println!("  Segments:            {}", result.stats.segments);
    println!("  Timing:              {}", result.strategy);
    for fallback in &result.fallbacks {
        println!("    skipped {}: {}", fallback.strategy, fallback.reason);
    }
    println!("  Original duration:   {:.2}s", m.original_duration);
    println!("  Translated duration: {:.2}s", m.new_duration);
    println!(
        "  Difference:          {:.2}s ({:.1}%)",
        m.difference, m.percentage
    );
    println!();
    println!(
        "  Took {:.2}s (alignment {:.2}s, stretching {:.2}s)",
        result.stats.total_time.as_secs_f64(),
        result.stats.alignment_time.as_secs_f64(),
        result.stats.stretch_time.as_secs_f64()
    );
    if m.needs_adjustment {
        println!();
        println!("  ⚠ Large duration mismatch detected");
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
