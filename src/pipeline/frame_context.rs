// src/pipeline/frame_context.rs
//
// Per-tick input and result. One FrameDetections in, one TickResult out;
// every stage of a tick reads from the same frame instead of cached values.

use crate::types::{Detection, OccupancySnapshot};
use serde::{Deserialize, Serialize};

/// One frame of detector/tracker output, as read from the replay stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    pub frame_index: u64,
    pub timestamp_ms: f64,
    #[serde(default)]
    pub frame_width: u32,
    #[serde(default)]
    pub frame_height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(frame_index: u64, timestamp_ms: f64, frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_index,
            timestamp_ms,
            frame_width,
            frame_height,
            detections: Vec::new(),
        }
    }

    pub fn with_detections(mut self, detections: Vec<Detection>) -> Self {
        self.detections = detections;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub frame_index: u64,
    pub timestamp_ms: f64,
    /// False for stride-skipped frames
    pub processed: bool,
    /// Kept detections per table after dedup, index 0 = table 1
    pub per_table: Vec<Vec<Detection>>,
    /// Per-table counts fed to the smoother; `None` on skipped frames
    pub raw_counts: Option<Vec<u32>>,
    /// Smoothed, held counts as of this tick
    pub snapshot: OccupancySnapshot,
    pub people_inside: u64,
}
