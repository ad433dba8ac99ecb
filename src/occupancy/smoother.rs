// src/occupancy/smoother.rs
//
// Per-table temporal filter for raw people counts.
//
// Two stages:
//   1. Mode of a sliding window of raw counts (median of the window when
//      several values share the top frequency).
//   2. The smoothed value must repeat for `confirm_frames` consecutive ticks
//      before it replaces the stable count.
//
// Reads apply a zero-hold on top: when the stable count drops to 0 the last
// non-zero value keeps being reported for `hold_seconds`, so a brief full
// occlusion does not flash the table as empty.

use crate::error::{OccupancyError, Result};
use crate::types::{OccupancySnapshot, SmoothingConfig};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Filter state for a single table.
#[derive(Debug, Clone, Default)]
pub struct TableSmoothingState {
    recent: VecDeque<u32>,
    stable: u32,
    pending_target: u32,
    /// 0 = no change in flight
    pending_streak: u32,
    /// (timestamp_ms, count) of the last update that left a non-zero stable count
    last_nonzero: Option<(f64, u32)>,
}

impl TableSmoothingState {
    pub fn stable(&self) -> u32 {
        self.stable
    }

    pub fn pending(&self) -> Option<(u32, u32)> {
        (self.pending_streak > 0).then_some((self.pending_target, self.pending_streak))
    }

    pub fn history(&self) -> &VecDeque<u32> {
        &self.recent
    }
}

pub struct TableCountSmoother {
    tables: Vec<TableSmoothingState>,
    window_size: usize,
    confirm_frames: u32,
    hold_ms: f64,
}

impl TableCountSmoother {
    /// Window and confirmation are clamped to at least 1.
    pub fn new(n_tables: usize, window_size: usize, confirm_frames: u32, hold_seconds: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            tables: (0..n_tables)
                .map(|_| TableSmoothingState {
                    recent: VecDeque::with_capacity(window_size + 1),
                    ..Default::default()
                })
                .collect(),
            window_size,
            confirm_frames: confirm_frames.max(1),
            hold_ms: hold_seconds * 1000.0,
        }
    }

    pub fn from_config(n_tables: usize, config: &SmoothingConfig) -> Self {
        Self::new(
            n_tables,
            config.window_size,
            config.confirm_frames,
            config.hold_seconds,
        )
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, index: usize) -> Option<&TableSmoothingState> {
        self.tables.get(index)
    }

    /// Fold one tick of raw counts into every table.
    ///
    /// `None` means no data this tick and leaves all state untouched. A slice
    /// whose length differs from the table count is rejected before any
    /// table is modified.
    pub fn update(&mut self, raw_counts: Option<&[u32]>, now_ms: f64) -> Result<()> {
        let Some(raw_counts) = raw_counts else {
            return Ok(());
        };
        if raw_counts.len() != self.tables.len() {
            return Err(OccupancyError::InvalidInput {
                expected: self.tables.len(),
                got: raw_counts.len(),
            });
        }

        for (idx, (state, &raw)) in self.tables.iter_mut().zip(raw_counts).enumerate() {
            state.recent.push_back(raw);
            while state.recent.len() > self.window_size {
                state.recent.pop_front();
            }

            let smoothed = mode_or_median(&state.recent);

            if smoothed == state.stable {
                state.pending_streak = 0;
                state.pending_target = smoothed;
            } else {
                if state.pending_target != smoothed {
                    state.pending_target = smoothed;
                    state.pending_streak = 1;
                } else {
                    state.pending_streak += 1;
                }

                if state.pending_streak >= self.confirm_frames {
                    debug!(
                        "Table {} count confirmed: {} → {}",
                        idx + 1,
                        state.stable,
                        smoothed
                    );
                    state.stable = smoothed;
                    state.pending_streak = 0;
                }
            }

            if state.stable > 0 {
                state.last_nonzero = Some((now_ms, state.stable));
            }
        }

        Ok(())
    }

    /// Display counts at `now_ms`. Never mutates filter state.
    pub fn current(&self, now_ms: f64) -> OccupancySnapshot {
        OccupancySnapshot::new(
            self.tables
                .iter()
                .map(|state| self.displayed(state, now_ms))
                .collect(),
        )
    }

    fn displayed(&self, state: &TableSmoothingState, now_ms: f64) -> u32 {
        if state.stable > 0 {
            return state.stable;
        }
        match state.last_nonzero {
            Some((ts, count)) if self.hold_ms > 0.0 && now_ms - ts <= self.hold_ms => count,
            _ => 0,
        }
    }

    /// Confirmed counts without the zero-hold.
    pub fn stable_counts(&self) -> Vec<u32> {
        self.tables.iter().map(|s| s.stable).collect()
    }
}

/// Most frequent value; on a frequency tie, `sorted[len / 2]` of the whole
/// window (the upper of the two middle values for even lengths).
pub fn mode_or_median(values: &VecDeque<u32>) -> u32 {
    if values.is_empty() {
        return 0;
    }

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let best_freq = counts.values().copied().max().unwrap_or(0);
    let mut modes = counts
        .iter()
        .filter(|&(_, &freq)| freq == best_freq)
        .map(|(&v, _)| v);

    match (modes.next(), modes.next()) {
        (Some(only), None) => only,
        _ => {
            let mut sorted: Vec<u32> = values.iter().copied().collect();
            sorted.sort_unstable();
            sorted[sorted.len() / 2]
        }
    }
}
