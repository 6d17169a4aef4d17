// JSON segment list, the interchange format between pipeline stages
use super::merge::renumber;
use super::{Segment, SegmentFormatter};
use crate::error::{DubsyncError, Result};
use std::path::Path;

pub struct JsonFormatter;

impl SegmentFormatter for JsonFormatter {
    fn format(&self, segments: &[Segment]) -> String {
        serde_json::to_string_pretty(segments).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Parse a JSON array of segments. Ids are reassigned by position.
pub fn parse_segments_json(content: &str) -> Result<Vec<Segment>> {
    let segments: Vec<Segment> = serde_json::from_str(content)?;
    Ok(renumber(segments))
}

pub fn load_segments_json(path: &Path) -> Result<Vec<Segment>> {
    if !path.exists() {
        return Err(DubsyncError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_segments_json(&content)
}
