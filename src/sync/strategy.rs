//! Per-segment target durations, chosen from an ordered list of strategies.
//!
//! Each strategy either produces one target duration per segment or explains
//! why it cannot. The first strategy that plans successfully wins; the reasons
//! given by the ones before it are kept so callers can report the degrade path.

use crate::align::AlignedWord;
use crate::error::{DubsyncError, Result};
use crate::subtitle::Segment;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// One target duration (seconds) per segment, in segment order.
    Planned(Vec<f64>),
    Unavailable(String),
}

pub trait TimingStrategy {
    fn name(&self) -> &'static str;
    fn plan(&self, segments: &[Segment]) -> StrategyOutcome;
}

/// Targets taken from translated-word timing on the original timeline.
///
/// Aligned words are handed out to segments in order, as many as each
/// segment's text has words; the segment's target spans its first word's
/// start to its last word's end.
pub struct WordLevelStrategy<'a> {
    words: &'a [AlignedWord],
}

impl<'a> WordLevelStrategy<'a> {
    pub fn new(words: &'a [AlignedWord]) -> Self {
        Self { words }
    }
}

impl TimingStrategy for WordLevelStrategy<'_> {
    fn name(&self) -> &'static str {
        "word-level"
    }

    fn plan(&self, segments: &[Segment]) -> StrategyOutcome {
        if self.words.is_empty() {
            return StrategyOutcome::Unavailable("no word-level alignment available".to_string());
        }

        let expected: usize = segments.iter().map(Segment::word_count).sum();
        if expected != self.words.len() {
            return StrategyOutcome::Unavailable(format!(
                "{} aligned words for {} words of segment text",
                self.words.len(),
                expected
            ));
        }

        let mut remaining = self.words;
        let mut targets = Vec::with_capacity(segments.len());

        for segment in segments {
            let (own, rest) = remaining.split_at(segment.word_count());
            remaining = rest;

            let (Some(first), Some(last)) = (own.first(), own.last()) else {
                return StrategyOutcome::Unavailable(format!(
                    "segment {} has no words to align",
                    segment.id
                ));
            };

            let target = last.end - first.start;
            if !(target.is_finite() && target > 0.0) {
                return StrategyOutcome::Unavailable(format!(
                    "segment {} spans {target}s of aligned words",
                    segment.id
                ));
            }
            targets.push(target);
        }

        StrategyOutcome::Planned(targets)
    }
}

/// Targets equal to each segment's own `end - start`.
pub struct SegmentLevelStrategy;

impl TimingStrategy for SegmentLevelStrategy {
    fn name(&self) -> &'static str {
        "segment-level"
    }

    fn plan(&self, segments: &[Segment]) -> StrategyOutcome {
        let mut targets = Vec::with_capacity(segments.len());
        for segment in segments {
            let target = segment.duration();
            if !(target.is_finite() && target > 0.0) {
                return StrategyOutcome::Unavailable(format!(
                    "segment {} has non-positive duration {target}s",
                    segment.id
                ));
            }
            targets.push(target);
        }
        StrategyOutcome::Planned(targets)
    }
}

/// A strategy that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFallback {
    pub strategy: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingPlan {
    pub strategy: &'static str,
    pub targets: Vec<f64>,
    pub fallbacks: Vec<StrategyFallback>,
}

/// Evaluate strategies in priority order and keep the first successful plan.
pub fn plan_targets(strategies: &[&dyn TimingStrategy], segments: &[Segment]) -> Result<TimingPlan> {
    let mut fallbacks = Vec::new();

    for strategy in strategies {
        match strategy.plan(segments) {
            StrategyOutcome::Planned(targets) => {
                return Ok(TimingPlan {
                    strategy: strategy.name(),
                    targets,
                    fallbacks,
                });
            }
            StrategyOutcome::Unavailable(reason) => fallbacks.push(StrategyFallback {
                strategy: strategy.name(),
                reason,
            }),
        }
    }

    let reasons = fallbacks
        .iter()
        .map(|f| format!("{}: {}", f.strategy, f.reason))
        .collect::<Vec<_>>()
        .join("; ");
    Err(DubsyncError::InvalidSegment(format!(
        "no timing strategy could plan target durations ({reasons})"
    )))
}
