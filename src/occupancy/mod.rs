// src/occupancy/mod.rs

pub mod assignment;
pub mod dedup;
pub mod entry_counter;
pub mod redistribution;
pub mod smoother;

pub use assignment::{AssignmentParams, FrameAssignment, TableAssigner, TrackTableBinding};
pub use dedup::{dedup_boxes_by_iou, dedup_detections};
pub use entry_counter::{CrossingUpdate, EntryCounter, Side};
pub use redistribution::{redistribute_overflow, DEFAULT_LAYOUT};
pub use smoother::{mode_or_median, TableCountSmoother, TableSmoothingState};
