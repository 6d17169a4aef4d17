pub mod mismatch;
pub mod reconcile;
pub mod strategy;

pub use mismatch::{
    adjust_segment_timing, calculate_mismatch, calculate_speed_factor, AdjustedSegment,
    DurationMismatch,
};
pub use reconcile::{merge_time_aligned_segments, ReconcileOptions, ReconcileResult};
pub use strategy::{
    plan_targets, SegmentLevelStrategy, StrategyFallback, StrategyOutcome, TimingPlan,
    TimingStrategy, WordLevelStrategy,
};
