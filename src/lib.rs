// src/lib.rs

pub mod calibration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod occupancy;
pub mod pipeline;
pub mod report;
pub mod types;

pub use calibration::Calibration;
pub use error::{OccupancyError, Result};
pub use pipeline::{FrameDetections, OccupancyPipeline, TickResult};
pub use report::{OccupancyReport, TableState, TableStatus};
pub use types::{BoundingBox, Config, Detection, OccupancySnapshot, Point, Polygon, TrackId};
