use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{DubsyncError, Result};

/// Concatenate WAV files in order into `output`. Returns the total duration in seconds.
///
/// All inputs must share channel count, sample rate and sample format.
pub fn concatenate_wavs(inputs: &[PathBuf], output: &Path) -> Result<f64> {
    let first = inputs
        .first()
        .ok_or_else(|| DubsyncError::AudioProbe("No audio clips to concatenate".to_string()))?;
    let spec = WavReader::open(first)?.spec();

    // Check every clip before the output file is created.
    for input in &inputs[1..] {
        check_compatible(&spec, &WavReader::open(input)?.spec(), input)?;
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WavWriter::create(output, spec)?;
    let mut frames: u64 = 0;

    for input in inputs {
        let mut reader = WavReader::open(input)?;
        frames += reader.duration() as u64;

        match spec.sample_format {
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }
    }

    writer.finalize()?;

    let duration = frames as f64 / spec.sample_rate as f64;
    debug!(
        "Concatenated {} clips into {:?} ({:.2}s)",
        inputs.len(),
        output,
        duration
    );
    Ok(duration)
}

fn check_compatible(expected: &WavSpec, actual: &WavSpec, path: &Path) -> Result<()> {
    if expected.channels != actual.channels
        || expected.sample_rate != actual.sample_rate
        || expected.bits_per_sample != actual.bits_per_sample
        || expected.sample_format != actual.sample_format
    {
        return Err(DubsyncError::AudioProbe(format!(
            "{} has format {}ch/{}Hz/{}bit, expected {}ch/{}Hz/{}bit",
            path.display(),
            actual.channels,
            actual.sample_rate,
            actual.bits_per_sample,
            expected.channels,
            expected.sample_rate,
            expected.bits_per_sample
        )));
    }
    Ok(())
}
