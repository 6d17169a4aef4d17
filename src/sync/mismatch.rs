use crate::config::DEFAULT_MISMATCH_THRESHOLD;
use crate::error::{DubsyncError, Result};
use crate::subtitle::Segment;
use serde::Serialize;

/// Drift between the original and the dubbed track. Read-only report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationMismatch {
    pub original_duration: f64,
    pub new_duration: f64,
    /// `new - original`, in seconds.
    pub difference: f64,
    /// Difference relative to the original, in percent; 0 when the original is 0.
    pub percentage: f64,
    pub needs_adjustment: bool,
}

impl DurationMismatch {
    pub fn new(original_duration: f64, new_duration: f64, threshold_percent: f64) -> Self {
        let difference = new_duration - original_duration;
        let percentage = if original_duration > 0.0 {
            difference / original_duration * 100.0
        } else {
            0.0
        };

        Self {
            original_duration,
            new_duration,
            difference,
            percentage,
            needs_adjustment: percentage.abs() > threshold_percent,
        }
    }

    /// Whether the drift is strictly larger than `threshold_percent`.
    pub fn exceeds(&self, threshold_percent: f64) -> bool {
        self.percentage.abs() > threshold_percent
    }
}

/// Mismatch report with the default 5% threshold.
pub fn calculate_mismatch(original_duration: f64, new_duration: f64) -> DurationMismatch {
    DurationMismatch::new(original_duration, new_duration, DEFAULT_MISMATCH_THRESHOLD)
}

/// A segment rescaled onto a new total duration, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedSegment {
    pub segment: Segment,
    pub original_start: f64,
    pub original_end: f64,
}

/// Scale every segment's timing by `new_duration / original_duration`.
///
/// Timing is left untouched when the original duration is 0.
pub fn adjust_segment_timing(
    segments: &[Segment],
    original_duration: f64,
    new_duration: f64,
) -> Vec<AdjustedSegment> {
    let ratio = if original_duration == 0.0 {
        1.0
    } else {
        new_duration / original_duration
    };

    segments
        .iter()
        .map(|segment| {
            let mut scaled = segment.clone();
            scaled.start = segment.start * ratio;
            scaled.end = segment.end * ratio;
            AdjustedSegment {
                segment: scaled,
                original_start: segment.start,
                original_end: segment.end,
            }
        })
        .collect()
}

/// Playback speed that fits the original duration into the new one (1.0 = unchanged).
pub fn calculate_speed_factor(original_duration: f64, new_duration: f64) -> Result<f64> {
    if new_duration <= 0.0 {
        return Err(DubsyncError::AudioProbe(format!(
            "cannot compute speed factor for a new duration of {new_duration}s"
        )));
    }
    Ok(original_duration / new_duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_five_percent_does_not_trigger() {
        let mismatch = calculate_mismatch(60.0, 63.0);
        assert!((mismatch.percentage - 5.0).abs() < 1e-9);
        assert!(!mismatch.needs_adjustment);
    }

    #[test]
    fn test_large_mismatch_triggers() {
        let mismatch = calculate_mismatch(60.0, 70.0);
        assert!((mismatch.percentage - 16.666_666).abs() < 1e-3);
        assert!((mismatch.difference - 10.0).abs() < 1e-9);
        assert!(mismatch.needs_adjustment);
    }

    #[test]
    fn test_shorter_output_is_negative() {
        let mismatch = calculate_mismatch(100.0, 90.0);
        assert!((mismatch.percentage + 10.0).abs() < 1e-9);
        assert!(mismatch.needs_adjustment);
    }

    #[test]
    fn test_zero_original_duration() {
        let mismatch = calculate_mismatch(0.0, 12.0);
        assert_eq!(mismatch.percentage, 0.0);
        assert_eq!(mismatch.difference, 12.0);
        assert!(!mismatch.needs_adjustment);
    }

    #[test]
    fn test_custom_threshold() {
        let mismatch = DurationMismatch::new(100.0, 103.0, 2.0);
        assert!(mismatch.needs_adjustment);
        assert!(!mismatch.exceeds(3.0));
        assert!(mismatch.exceeds(2.5));
    }

    #[test]
    fn test_adjust_segment_timing() {
        let segments = vec![Segment::new(0, 1.0, 2.0, "a"), Segment::new(1, 2.0, 4.0, "b")];

        let adjusted = adjust_segment_timing(&segments, 10.0, 15.0);

        assert_eq!(adjusted[0].segment.start, 1.5);
        assert_eq!(adjusted[0].segment.end, 3.0);
        assert_eq!(adjusted[1].segment.end, 6.0);
        assert_eq!(adjusted[1].original_start, 2.0);
        assert_eq!(adjusted[1].original_end, 4.0);
    }

    #[test]
    fn test_adjust_segment_timing_zero_original() {
        let segments = vec![Segment::new(0, 1.0, 2.0, "a")];
        let adjusted = adjust_segment_timing(&segments, 0.0, 15.0);
        assert_eq!(adjusted[0].segment, segments[0]);
    }

    #[test]
    fn test_speed_factor() {
        assert_eq!(calculate_speed_factor(60.0, 30.0).unwrap(), 2.0);
        assert!(calculate_speed_factor(60.0, 0.0).is_err());
    }
}
