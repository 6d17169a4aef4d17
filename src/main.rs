use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dubsync::align::{align_translated_words, Alignment, ElevenLabsAligner, ForcedAligner};
use dubsync::audio::{
    get_audio_duration, validate_audio_file, validate_video_file, RubberbandStretcher,
};
use dubsync::config::{Config, OutputFormat};
use dubsync::pipeline::{prepare_segments, print_summary, synchronize, PipelineConfig, SyncRequest};
use dubsync::subtitle::{load_segments, save_segments, validate_segments};
use dubsync::sync::{calculate_speed_factor, DurationMismatch};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dubsync")]
#[command(version, about = "Timing synchronization for translated video dubbing")]
#[command(long_about = "Validate and merge subtitle timing, align translated words, and stretch synthesized speech onto the original timeline.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and validate a subtitle file
    Validate {
        /// Input .srt or .json segment list
        input: PathBuf,
    },

    /// Merge short segments so each has enough words for natural synthesis
    Merge {
        /// Input .srt or .json segment list
        input: PathBuf,

        /// Output file (defaults to <input>_merged with the output format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Segments with this many words or fewer absorb the next one
        #[arg(long)]
        min_words: Option<usize>,

        /// Output format: srt, json
        #[arg(short, long, default_value = "srt")]
        format: String,
    },

    /// Place translated words on the timing of the original words
    Align {
        /// Forced alignment response (JSON with a "words" array)
        #[arg(long)]
        words: PathBuf,

        /// Translated text
        #[arg(long)]
        text: String,
    },

    /// Stretch synthesized clips to segment timing and merge them into one track
    Stitch {
        /// Translated segments (.srt or .json), one per clip
        #[arg(long)]
        segments: PathBuf,

        /// Synthesized clips, in segment order
        #[arg(long, num_args = 1.., required = true)]
        clips: Vec<PathBuf>,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Duration of the original video in seconds
        #[arg(long, conflicts_with = "original_media")]
        original_duration: Option<f64>,

        /// Original video/audio to measure the duration from
        #[arg(long)]
        original_media: Option<PathBuf>,

        /// Use forced alignment for word-level timing
        #[arg(long)]
        word_level: bool,

        /// Original (untranslated) segments, sent to forced alignment
        #[arg(long)]
        original_segments: Option<PathBuf>,

        /// Original speech audio, sent to forced alignment
        #[arg(long)]
        original_audio: Option<PathBuf>,

        /// Number of clips stretched concurrently
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Keep stretched clips in this directory
        #[arg(long)]
        keep_stretched: Option<PathBuf>,
    },

    /// Report the drift between an original and a new duration
    Mismatch {
        /// Original duration in seconds
        original: f64,

        /// New duration in seconds
        new: f64,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path, format: &OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!(
        "{}_merged.{}",
        stem.to_string_lossy(),
        format.extension()
    ));
    output
}

fn print_mismatch(mismatch: &DurationMismatch) {
    println!("Original duration:   {:.2}s", mismatch.original_duration);
    println!("New duration:        {:.2}s", mismatch.new_duration);
    println!(
        "Difference:          {:.2}s ({:.1}%)",
        mismatch.difference, mismatch.percentage
    );
    println!("Needs adjustment:    {}", mismatch.needs_adjustment);
    if let Ok(factor) = calculate_speed_factor(mismatch.original_duration, mismatch.new_duration) {
        println!("Speed factor:        {:.4}", factor);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load and validate configuration
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    match cli.command {
        Command::Validate { input } => {
            let segments = load_segments(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let report = validate_segments(&segments);

            info!("Parsed {} segments from {}", segments.len(), input.display());
            for warning in &report.warnings {
                warn!("{}", warning);
            }
            for error in &report.errors {
                println!("error: {}", error);
            }
            if !report.valid {
                anyhow::bail!("{} has {} timing errors", input.display(), report.errors.len());
            }
            println!("{}: valid ({} warnings)", input.display(), report.warnings.len());
        }

        Command::Merge {
            input,
            output,
            min_words,
            format,
        } => {
            let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let output = output.unwrap_or_else(|| derive_output_path(&input, &format));
            let min_words = min_words.unwrap_or(config.min_words);

            let segments = load_segments(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let merged = prepare_segments(segments, min_words);

            save_segments(&merged, &output, format)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {} segments to {}", merged.len(), output.display());
        }

        Command::Align { words, text } => {
            let content = std::fs::read_to_string(&words)
                .with_context(|| format!("Failed to read {}", words.display()))?;
            let alignment: Alignment =
                serde_json::from_str(&content).context("Invalid alignment JSON")?;

            let aligned = align_translated_words(&alignment.words, &text);
            println!("{}", serde_json::to_string_pretty(&aligned)?);
        }

        Command::Stitch {
            segments,
            clips,
            output,
            original_duration,
            original_media,
            word_level,
            original_segments,
            original_audio,
            concurrency,
            keep_stretched,
        } => {
            for clip in &clips {
                validate_audio_file(clip)?;
            }
            if let Some(audio) = &original_audio {
                validate_audio_file(audio)?;
            }

            let translated = load_segments(&segments)
                .with_context(|| format!("Failed to read {}", segments.display()))?;
            let originals = match &original_segments {
                Some(path) => load_segments(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => translated.clone(),
            };

            let original_duration = match (original_duration, &original_media) {
                (Some(d), _) => d,
                (None, Some(media)) => {
                    validate_video_file(media).or_else(|_| validate_audio_file(media))?;
                    get_audio_duration(media)
                        .with_context(|| format!("Failed to measure {}", media.display()))?
                }
                (None, None) => anyhow::bail!("Pass --original-duration or --original-media"),
            };

            let mut pipeline_config = PipelineConfig::from_config(&config);
            pipeline_config.word_level_timing |= word_level;
            pipeline_config.keep_stretched = keep_stretched;
            if let Some(c) = concurrency {
                if c == 0 {
                    anyhow::bail!("Concurrency must be greater than 0");
                }
                pipeline_config.concurrency = c;
            }

            let stretcher = RubberbandStretcher::new(config.rubberband_path.clone());
            let aligner = ElevenLabsAligner::new(config.elevenlabs_api_key.clone());

            info!("Segments: {}", translated.len());
            info!("Clips:    {}", clips.len());
            info!("Output:   {}", output.display());

            let request = SyncRequest {
                original_segments: &originals,
                translated_segments: &translated,
                audio_files: &clips,
                original_audio: original_audio.as_deref(),
                original_duration,
                output: &output,
            };

            let result = synchronize(
                request,
                Some(&aligner as &dyn ForcedAligner),
                &stretcher,
                &pipeline_config,
            )
            .await
            .context("Synchronization failed")?;

            print_summary(&result);
        }

        Command::Mismatch { original, new } => {
            let mismatch = DurationMismatch::new(original, new, config.mismatch_threshold_percent);
            print_mismatch(&mismatch);
        }
    }

    Ok(())
}
