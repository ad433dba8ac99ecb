// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub assignment: AssignmentConfig,
    pub smoothing: SmoothingConfig,
    pub tables: TablesConfig,
    pub processing: ProcessingConfig,
    pub calibration: CalibrationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections scoring below this are dropped before assignment
    pub confidence_threshold: f32,
    /// Minimum bbox area as a fraction of the frame area
    pub min_box_area_ratio: f32,
    /// IoU at or above which two boxes at one table are the same person
    pub dedup_iou_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.35,
            min_box_area_ratio: 0.0005,
            dedup_iou_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Anchor points up to this many pixels outside a table polygon still count
    pub roi_margin_px: f64,
    /// How long a track keeps its last table when geometry fails to match
    pub track_ttl_seconds: f64,
    /// Entry-line side memory is dropped for tracks unseen this long
    pub entry_track_stale_seconds: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            roi_margin_px: 8.0,
            track_ttl_seconds: 1.5,
            entry_track_stale_seconds: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub window_size: usize,
    pub confirm_frames: u32,
    /// Keep showing the last non-zero count this long after it drops to zero.
    /// Zero or negative disables the hold.
    pub hold_seconds: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            confirm_frames: 3,
            hold_seconds: 2.0,
        }
    }
}

/// One physical column of tables, as an inclusive range of 1-based table ids
/// listed top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingColumn {
    pub first: usize,
    pub last: usize,
}

impl SeatingColumn {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Seats per table. Non-positive disables overflow redistribution.
    pub capacity: i32,
    pub layout: Vec<SeatingColumn>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            layout: crate::occupancy::DEFAULT_LAYOUT.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Run assignment on every Nth frame; the others are empty ticks
    pub frame_stride: u64,
    pub report_interval_seconds: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            frame_stride: 1,
            report_interval_seconds: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub path: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            path: "calibration.yaml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "table_occupancy=info".to_string(),
        }
    }
}

// ============================================================================
// GEOMETRY VALUE TYPES
// ============================================================================

/// Integer pixel coordinate. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Table region, implicitly closed. Fewer than 3 points is accepted but
/// never contains anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }
}

impl From<Vec<(i32, i32)>> for Polygon {
    fn from(pts: Vec<(i32, i32)>) -> Self {
        Self::new(pts.into_iter().map(Point::from).collect())
    }
}

/// Axis-aligned box in pixels. Construction normalizes corner order so
/// `x1 <= x2` and `y1 <= y2` always hold. Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Integer center, computed from truncated corners.
    pub fn center(&self) -> Point {
        let (x1, y1, x2, y2) = self.truncated();
        Point::new(
            ((x1 as f64 + x2 as f64) / 2.0) as i32,
            ((y1 as f64 + y2 as f64) / 2.0) as i32,
        )
    }

    /// Corners truncated toward zero to whole pixels.
    pub fn truncated(&self) -> (i32, i32, i32, i32) {
        (self.x1 as i32, self.y1 as i32, self.x2 as i32, self.y2 as i32)
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(b: [f32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

// ============================================================================
// DETECTIONS
// ============================================================================

/// Persistent tracker identity, stable across frames for one person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f32,
    #[serde(default)]
    pub track_id: Option<TrackId>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32) -> Self {
        Self {
            bbox,
            score,
            track_id: None,
        }
    }

    pub fn tracked(bbox: BoundingBox, score: f32, track_id: i64) -> Self {
        Self {
            bbox,
            score,
            track_id: Some(TrackId(track_id)),
        }
    }
}

/// Doorway reference: a line plus a point known to lie on the room side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    pub line: [Point; 2],
    pub inside_ref: Point,
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Per-table counts for one tick. Index 0 is table 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancySnapshot {
    counts: Vec<u32>,
}

impl OccupancySnapshot {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Build from signed counts, clamping negatives to zero.
    pub fn from_signed(counts: &[i64]) -> Self {
        Self::new(
            counts
                .iter()
                .map(|&c| c.clamp(0, u32::MAX as i64) as u32)
                .collect(),
        )
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Count for a 1-based table id.
    pub fn get(&self, table_id: usize) -> Option<u32> {
        table_id
            .checked_sub(1)
            .and_then(|idx| self.counts.get(idx).copied())
    }
}
