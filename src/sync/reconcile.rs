use crate::audio::{concatenate_wavs, get_audio_duration, TimeStretcher};
use crate::error::{DubsyncError, Result};
use crate::subtitle::Segment;
use crate::sync::strategy::{plan_targets, StrategyFallback, TimingStrategy};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Options for the stretch-and-concatenate step.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Number of clips stretched at the same time.
    pub concurrency: usize,
    /// Show a progress bar while stretching.
    pub show_progress: bool,
    /// Keep stretched clips in this directory instead of a temporary one.
    pub keep_dir: Option<PathBuf>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            show_progress: false,
            keep_dir: None,
        }
    }
}

/// Outcome of reconciling synthesized clips with segment timing.
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    pub output_path: PathBuf,
    /// Name of the timing strategy that produced the targets.
    pub strategy: &'static str,
    /// Strategies that were tried first and could not plan.
    pub fallbacks: Vec<StrategyFallback>,
    /// Target duration per segment, in seconds.
    pub targets: Vec<f64>,
    /// Duration of the concatenated track, in seconds.
    pub duration: f64,
}

/// One clip's stretch job.
struct StretchJob<'a> {
    index: usize,
    input: &'a Path,
    output: PathBuf,
    target: f64,
}

/// Stretch each clip to its segment's target duration and concatenate them in order.
///
/// `audio_files[i]` is the synthesized clip for `segments[i]`; the counts must
/// match. Targets come from the first of `strategies` that can plan; list a
/// segment-level strategy last so there is always a plan for well-formed segments.
pub async fn merge_time_aligned_segments(
    audio_files: &[PathBuf],
    segments: &[Segment],
    output: &Path,
    stretcher: &dyn TimeStretcher,
    strategies: &[&dyn TimingStrategy],
    options: &ReconcileOptions,
) -> Result<ReconcileResult> {
    if audio_files.len() != segments.len() {
        return Err(DubsyncError::SegmentCountMismatch {
            audio_files: audio_files.len(),
            segments: segments.len(),
        });
    }

    if !stretcher.is_available().await {
        return Err(DubsyncError::ToolNotFound {
            tool: stretcher.name().to_string(),
            hint: "time-stretch executable is not available".to_string(),
        });
    }

    let plan = plan_targets(strategies, segments)?;
    for fallback in &plan.fallbacks {
        warn!(
            "{} timing unavailable ({}), falling back",
            fallback.strategy, fallback.reason
        );
    }
    info!(
        "Stretching {} clips using {} timing",
        audio_files.len(),
        plan.strategy
    );

    // Stretched clips live next to the output unless the caller wants them kept.
    let temp_dir;
    let work_dir = match &options.keep_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => {
            let parent = match output.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&parent)?;
            temp_dir = tempfile::Builder::new()
                .prefix("stretched_segments")
                .tempdir_in(&parent)?;
            temp_dir.path().to_path_buf()
        }
    };

    let jobs: Vec<StretchJob> = audio_files
        .iter()
        .zip(&plan.targets)
        .enumerate()
        .map(|(index, (input, &target))| StretchJob {
            index,
            input,
            output: work_dir.join(format!("stretched_{index:04}.wav")),
            target,
        })
        .collect();

    let stretched = stretch_all(jobs, stretcher, options).await?;
    let duration = concatenate_wavs(&stretched, output)?;

    info!("Merged {} clips into {:?} ({:.2}s)", stretched.len(), output, duration);

    Ok(ReconcileResult {
        output_path: output.to_path_buf(),
        strategy: plan.strategy,
        fallbacks: plan.fallbacks,
        targets: plan.targets,
        duration,
    })
}

/// Run stretch jobs with bounded concurrency; returns outputs in job order.
async fn stretch_all(
    jobs: Vec<StretchJob<'_>>,
    stretcher: &dyn TimeStretcher,
    options: &ReconcileOptions,
) -> Result<Vec<PathBuf>> {
    let total = jobs.len();

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clips ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let semaphore = Semaphore::new(options.concurrency.max(1));
    let mut futures = FuturesUnordered::new();

    for job in jobs {
        let semaphore = &semaphore;
        let pb = progress_bar.clone();

        futures.push(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| DubsyncError::Io(std::io::Error::other(e)))?;

            let current = get_audio_duration(job.input)?;
            if !(current.is_finite() && current > 0.0) {
                return Err(DubsyncError::AudioProbe(format!(
                    "{} has zero duration",
                    job.input.display()
                )));
            }

            let ratio = job.target / current;
            debug!(
                "Clip {}: {:.3}s -> {:.3}s (ratio {:.4})",
                job.index, current, job.target, ratio
            );
            stretcher.stretch(job.input, &job.output, ratio).await?;

            if let Some(ref pb) = pb {
                pb.inc(1);
            }
            Ok::<_, DubsyncError>((job.index, job.output))
        });
    }

    let mut results: Vec<(usize, PathBuf)> = Vec::with_capacity(total);
    while let Some(result) = futures.next().await {
        // A failed stretch would leave a hole in the timeline, so stop here.
        results.push(result?);
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Stretching complete");
    }

    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::strategy::SegmentLevelStrategy;
    use async_trait::async_trait;

    struct NeverCalled;

    #[async_trait]
    impl TimeStretcher for NeverCalled {
        async fn stretch(&self, _: &Path, _: &Path, _: f64) -> Result<()> {
            panic!("stretch should not run");
        }

        fn name(&self) -> &'static str {
            "never"
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    struct Missing;

    #[async_trait]
    impl TimeStretcher for Missing {
        async fn stretch(&self, _: &Path, _: &Path, _: f64) -> Result<()> {
            unreachable!()
        }

        fn name(&self) -> &'static str {
            "missing"
        }

        async fn is_available(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_fatal() {
        let files = vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")];
        let segments = vec![Segment::new(0, 0.0, 1.0, "only one")];

        let result = merge_time_aligned_segments(
            &files,
            &segments,
            Path::new("out.wav"),
            &NeverCalled,
            &[&SegmentLevelStrategy],
            &ReconcileOptions::default(),
        )
        .await;

        match result {
            Err(DubsyncError::SegmentCountMismatch {
                audio_files,
                segments,
            }) => {
                assert_eq!(audio_files, 2);
                assert_eq!(segments, 1);
            }
            other => panic!("Expected SegmentCountMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unavailable_stretcher_is_fatal() {
        let files = vec![PathBuf::from("a.wav")];
        let segments = vec![Segment::new(0, 0.0, 1.0, "one")];

        let result = merge_time_aligned_segments(
            &files,
            &segments,
            Path::new("out.wav"),
            &Missing,
            &[&SegmentLevelStrategy],
            &ReconcileOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(DubsyncError::ToolNotFound { .. })));
    }
}
