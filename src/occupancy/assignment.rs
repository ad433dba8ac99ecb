// src/occupancy/assignment.rs
//
// Assigns each person detection of a frame to at most one table region.
//
// Design:
//   - Low-confidence and tiny boxes are dropped up front
//   - Geometry first (anchor points vs. table polygons, see geometry.rs)
//   - Tracked people keep their last table for a short TTL when geometry
//     fails, which bridges one-frame occlusion or boundary flicker
//   - Bindings live only in memory and expire after the TTL

use crate::geometry::best_roi_for_box;
use crate::types::{Config, Detection, Polygon, TrackId};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct AssignmentParams {
    pub confidence_threshold: f32,
    /// bbox_area / frame_area below this is discarded
    pub min_box_area_ratio: f32,
    pub roi_margin_px: f64,
    pub track_ttl_ms: f64,
}

impl Default for AssignmentParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AssignmentParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            confidence_threshold: config.detection.confidence_threshold,
            min_box_area_ratio: config.detection.min_box_area_ratio,
            roi_margin_px: config.assignment.roi_margin_px,
            track_ttl_ms: config.assignment.track_ttl_seconds * 1000.0,
        }
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Last table a tracked person was assigned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackTableBinding {
    /// 0-based table index
    pub table: usize,
    pub bound_at_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FrameAssignment {
    /// Assigned detections per table, index 0 = table 1
    pub per_table: Vec<Vec<Detection>>,
    /// Detections that passed the confidence/area filter
    pub accepted: Vec<Detection>,
    pub filtered: usize,
    pub unassigned: usize,
    pub sticky: usize,
}

impl FrameAssignment {
    pub fn assigned_count(&self) -> usize {
        self.per_table.iter().map(Vec::len).sum()
    }
}

// ============================================================================
// ASSIGNER
// ============================================================================

pub struct TableAssigner {
    params: AssignmentParams,
    bindings: HashMap<TrackId, TrackTableBinding>,
}

impl TableAssigner {
    pub fn new(params: AssignmentParams) -> Self {
        Self {
            params,
            bindings: HashMap::new(),
        }
    }

    pub fn binding(&self, track_id: TrackId) -> Option<&TrackTableBinding> {
        self.bindings.get(&track_id)
    }

    pub fn active_bindings(&self) -> usize {
        self.bindings.len()
    }

    /// Confidence floor and minimum-area filter. A zero-area frame disables
    /// the area check.
    pub fn accepts(&self, det: &Detection, frame_width: u32, frame_height: u32) -> bool {
        if det.score < self.params.confidence_threshold {
            return false;
        }
        let frame_area = frame_width as f64 * frame_height as f64;
        if frame_area > 0.0 {
            let ratio = det.bbox.area() as f64 / frame_area;
            if ratio < self.params.min_box_area_ratio as f64 {
                return false;
            }
        }
        true
    }

    pub fn assign(
        &mut self,
        regions: &[Polygon],
        detections: &[Detection],
        frame_width: u32,
        frame_height: u32,
        now_ms: f64,
    ) -> FrameAssignment {
        let mut out = FrameAssignment {
            per_table: vec![Vec::new(); regions.len()],
            ..Default::default()
        };

        for det in detections {
            if !self.accepts(det, frame_width, frame_height) {
                out.filtered += 1;
                continue;
            }
            out.accepted.push(*det);

            let table = match best_roi_for_box(regions, &det.bbox, self.params.roi_margin_px) {
                Some(idx) => Some(idx),
                None => {
                    let sticky = self.sticky_table(det, regions.len(), now_ms);
                    if let Some(idx) = sticky {
                        out.sticky += 1;
                        debug!(
                            "Track {:?} kept on table {} (no geometric match)",
                            det.track_id,
                            idx + 1
                        );
                    }
                    sticky
                }
            };

            match table {
                Some(idx) => {
                    out.per_table[idx].push(*det);
                    if let Some(track_id) = det.track_id {
                        self.bindings.insert(
                            track_id,
                            TrackTableBinding {
                                table: idx,
                                bound_at_ms: now_ms,
                            },
                        );
                    }
                }
                None => out.unassigned += 1,
            }
        }

        self.expire(now_ms);
        out
    }

    fn sticky_table(&self, det: &Detection, n_tables: usize, now_ms: f64) -> Option<usize> {
        let binding = self.bindings.get(&det.track_id?)?;
        let fresh = now_ms - binding.bound_at_ms <= self.params.track_ttl_ms;
        (fresh && binding.table < n_tables).then_some(binding.table)
    }

    fn expire(&mut self, now_ms: f64) {
        let ttl = self.params.track_ttl_ms;
        self.bindings.retain(|_, b| now_ms - b.bound_at_ms <= ttl);
    }
}
