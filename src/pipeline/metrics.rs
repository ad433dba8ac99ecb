// src/pipeline/metrics.rs
//
// Pipeline counters. One shared block of relaxed atomics: clones of
// PipelineMetrics point at the same block, so the reporting side can read
// while the tick loop writes.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

macro_rules! counter_block {
    ($($name:ident),* $(,)?) => {
        #[derive(Debug, Default)]
        struct Counters {
            $($name: AtomicU64,)*
        }

        /// Point-in-time copy of every counter.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
        pub struct CounterValues {
            $(pub $name: u64,)*
        }

        impl Counters {
            fn read(&self) -> CounterValues {
                CounterValues {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counter_block! {
    ticks_total,
    ticks_processed,
    ticks_skipped,
    detections_seen,
    detections_filtered,
    detections_unassigned,
    sticky_assignments,
    duplicates_suppressed,
    entries,
    exits,
    last_tick_us,
}

/// What one processed tick contributed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    pub detections: usize,
    pub filtered: usize,
    pub unassigned: usize,
    pub sticky: usize,
    pub duplicates: usize,
    pub entered: u32,
    pub exited: u32,
    pub duration_us: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    counters: Arc<Counters>,
    started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            started_at: Instant::now(),
        }
    }

    /// Stride-skipped frame.
    pub fn record_skipped(&self) {
        let c = &self.counters;
        c.ticks_total.fetch_add(1, Ordering::Relaxed);
        c.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self, stats: &TickStats) {
        let c = &self.counters;
        let add = |counter: &AtomicU64, n: u64| {
            counter.fetch_add(n, Ordering::Relaxed);
        };
        add(&c.ticks_total, 1);
        add(&c.ticks_processed, 1);
        add(&c.detections_seen, stats.detections as u64);
        add(&c.detections_filtered, stats.filtered as u64);
        add(&c.detections_unassigned, stats.unassigned as u64);
        add(&c.sticky_assignments, stats.sticky as u64);
        add(&c.duplicates_suppressed, stats.duplicates as u64);
        add(&c.entries, stats.entered as u64);
        add(&c.exits, stats.exited as u64);
        c.last_tick_us.store(stats.duration_us, Ordering::Relaxed);
    }

    pub fn counters(&self) -> CounterValues {
        self.counters.read()
    }

    pub fn summary(&self) -> MetricsSummary {
        let counters = self.counters.read();
        let elapsed_secs = self.started_at.elapsed().as_secs_f64();
        let ticks_per_sec = if elapsed_secs > 0.01 {
            counters.ticks_total as f64 / elapsed_secs
        } else {
            0.0
        };
        MetricsSummary {
            counters,
            ticks_per_sec,
            elapsed_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    #[serde(flatten)]
    pub counters: CounterValues,
    pub ticks_per_sec: f64,
    pub elapsed_secs: f64,
}
