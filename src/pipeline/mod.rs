// src/pipeline/mod.rs

pub mod frame_context;
pub mod metrics;
pub mod orchestrator;

pub use frame_context::{FrameDetections, TickResult};
pub use metrics::{CounterValues, MetricsSummary, PipelineMetrics, TickStats};
pub use orchestrator::OccupancyPipeline;
