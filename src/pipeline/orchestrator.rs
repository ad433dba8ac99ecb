// src/pipeline/orchestrator.rs
//
// Owns every piece of per-table and per-track state and runs one tick per
// frame:
//
//   detections → assignment → dedup per table → counts → smoother
//                     └── accepted tracked detections → entry counter
//
// A tick either completes or returns an error before the smoother is
// touched; there is no partial update of the table set.

use crate::calibration::Calibration;
use crate::error::{OccupancyError, Result};
use crate::occupancy::{
    dedup_detections, AssignmentParams, EntryCounter, TableAssigner, TableCountSmoother,
};
use crate::pipeline::frame_context::{FrameDetections, TickResult};
use crate::pipeline::metrics::{PipelineMetrics, TickStats};
use crate::report::OccupancyReport;
use crate::types::{Config, OccupancySnapshot, Polygon};
use chrono::{DateTime, Local};
use std::time::Instant;
use tracing::{debug, info};

pub struct OccupancyPipeline {
    config: Config,
    regions: Vec<Polygon>,
    assigner: TableAssigner,
    smoother: TableCountSmoother,
    entry_counter: EntryCounter,
    metrics: PipelineMetrics,
}

impl OccupancyPipeline {
    pub fn new(config: Config, calibration: Calibration) -> Result<Self> {
        config.validate()?;
        calibration.validate()?;

        let n_tables = calibration.table_count();
        let assigner = TableAssigner::new(AssignmentParams::from_config(&config));
        let smoother = TableCountSmoother::from_config(n_tables, &config.smoothing);
        let entry_counter = EntryCounter::new(
            calibration.entry,
            config.assignment.entry_track_stale_seconds,
        );

        info!(
            "✓ Pipeline ready: {} tables, window={}, confirm={}, hold={:.1}s, stride={}",
            n_tables,
            config.smoothing.window_size,
            config.smoothing.confirm_frames,
            config.smoothing.hold_seconds,
            config.processing.frame_stride
        );

        Ok(Self {
            config,
            regions: calibration.tables,
            assigner,
            smoother,
            entry_counter,
            metrics: PipelineMetrics::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table_count(&self) -> usize {
        self.regions.len()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn people_inside(&self) -> u64 {
        self.entry_counter.people_inside()
    }

    pub fn smoother(&self) -> &TableCountSmoother {
        &self.smoother
    }

    pub fn process(&mut self, frame: &FrameDetections) -> Result<TickResult> {
        let started = Instant::now();
        let now_ms = frame.timestamp_ms;

        if frame.frame_index % self.config.processing.frame_stride != 0 {
            self.smoother.update(None, now_ms)?;
            self.metrics.record_skipped();
            return Ok(TickResult {
                frame_index: frame.frame_index,
                timestamp_ms: now_ms,
                processed: false,
                per_table: vec![Vec::new(); self.regions.len()],
                raw_counts: None,
                snapshot: self.smoother.current(now_ms),
                people_inside: self.entry_counter.people_inside(),
            });
        }

        let assignment = self.assigner.assign(
            &self.regions,
            &frame.detections,
            frame.frame_width,
            frame.frame_height,
            now_ms,
        );

        let iou_threshold = self.config.detection.dedup_iou_threshold;
        let mut suppressed = 0usize;
        let per_table: Vec<_> = assignment
            .per_table
            .iter()
            .map(|dets| {
                let kept = dedup_detections(dets, iou_threshold);
                suppressed += dets.len() - kept.len();
                kept
            })
            .collect();
        let raw_counts: Vec<u32> = per_table.iter().map(|k| k.len() as u32).collect();

        self.smoother.update(Some(raw_counts.as_slice()), now_ms)?;
        let crossings = self.entry_counter.update(&assignment.accepted, now_ms);

        if assignment.filtered > 0 || suppressed > 0 {
            debug!(
                "Frame {}: {} filtered, {} unassigned, {} sticky, {} duplicates",
                frame.frame_index,
                assignment.filtered,
                assignment.unassigned,
                assignment.sticky,
                suppressed
            );
        }

        self.metrics.record_processed(&TickStats {
            detections: frame.detections.len(),
            filtered: assignment.filtered,
            unassigned: assignment.unassigned,
            sticky: assignment.sticky,
            duplicates: suppressed,
            entered: crossings.entered,
            exited: crossings.exited,
            duration_us: started.elapsed().as_micros() as u64,
        });

        Ok(TickResult {
            frame_index: frame.frame_index,
            timestamp_ms: now_ms,
            processed: true,
            per_table,
            raw_counts: Some(raw_counts),
            snapshot: self.smoother.current(now_ms),
            people_inside: self.entry_counter.people_inside(),
        })
    }

    /// Report for a snapshot produced by this pipeline, stamped with `now`.
    pub fn report(
        &self,
        snapshot: &OccupancySnapshot,
        now: DateTime<Local>,
    ) -> Result<OccupancyReport> {
        if snapshot.len() != self.regions.len() {
            return Err(OccupancyError::InvalidInput {
                expected: self.regions.len(),
                got: snapshot.len(),
            });
        }
        Ok(OccupancyReport::build(
            snapshot,
            self.config.tables.capacity,
            &self.config.tables.layout,
            self.entry_counter.people_inside(),
            now,
        ))
    }
}
