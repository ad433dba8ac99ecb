// src/report.rs
//
// Status report handed to consumers: redistributed per-table counts, a
// traffic-light state per table, and room aggregates.

use crate::occupancy::redistribute_overflow;
use crate::types::{OccupancySnapshot, SeatingColumn};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableState {
    #[serde(rename = "green")]
    Empty,
    #[serde(rename = "yellow")]
    Partial,
    #[serde(rename = "red")]
    Full,
}

impl TableState {
    pub fn classify(occupied: u32, capacity: u32) -> Self {
        if occupied == 0 {
            TableState::Empty
        } else if occupied < capacity {
            TableState::Partial
        } else {
            TableState::Full
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableState::Empty => "green",
            TableState::Partial => "yellow",
            TableState::Full => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table_id: usize,
    pub occupied: u32,
    pub capacity: u32,
    #[serde(rename = "status_color")]
    pub status: TableState,
}

impl TableStatus {
    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }

    pub fn is_overbooked(&self) -> bool {
        self.occupied > self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub overall_inside: u64,
    pub total_occupied: u64,
    pub total_capacity: u64,
    pub total_free: u64,
    pub free_tables: usize,
    pub tables: Vec<TableStatus>,
    pub last_update: String,
}

impl OccupancyReport {
    pub fn build(
        snapshot: &OccupancySnapshot,
        capacity: i32,
        layout: &[SeatingColumn],
        people_inside: u64,
        now: DateTime<Local>,
    ) -> Self {
        let displayed = redistribute_overflow(snapshot.counts(), capacity, layout);
        let per_table_capacity = capacity.max(0) as u32;

        let tables: Vec<TableStatus> = displayed
            .iter()
            .enumerate()
            .map(|(idx, &occupied)| TableStatus {
                table_id: idx + 1,
                occupied,
                capacity: per_table_capacity,
                status: TableState::classify(occupied, per_table_capacity),
            })
            .collect();

        let total_occupied: u64 = tables.iter().map(|t| t.occupied as u64).sum();
        let total_capacity = tables.len() as u64 * per_table_capacity as u64;
        let free_tables = tables
            .iter()
            .filter(|t| t.status == TableState::Empty)
            .count();

        Self {
            overall_inside: people_inside,
            total_occupied,
            total_capacity,
            total_free: total_capacity.saturating_sub(total_occupied),
            free_tables,
            tables,
            last_update: now.format(LAST_UPDATE_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn log_table(&self) {
        info!("--- Occupancy report {} ---", self.last_update);
        info!(
            "People inside: {} | occupied seats: {}/{} | free tables: {}",
            self.overall_inside, self.total_occupied, self.total_capacity, self.free_tables
        );
        info!("{:<6} | {:<8} | {:<8} | {:<6}", "Table", "Occupied", "Free", "Status");
        for t in &self.tables {
            let occupied = if t.is_overbooked() {
                format!("{} (!)", t.occupied)
            } else {
                t.occupied.to_string()
            };
            info!(
                "#{:<5} | {:<8} | {:<8} | {:<6}",
                t.table_id,
                occupied,
                t.free(),
                t.status.as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::DEFAULT_LAYOUT;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(TableState::classify(0, 3), TableState::Empty);
        assert_eq!(TableState::classify(1, 3), TableState::Partial);
        assert_eq!(TableState::classify(3, 3), TableState::Full);
        assert_eq!(TableState::classify(5, 3), TableState::Full);
        assert_eq!(TableState::classify(0, 0), TableState::Empty);
        assert_eq!(TableState::classify(1, 0), TableState::Full);
    }

    #[test]
    fn test_console_label_matches_payload_color() {
        for state in [TableState::Empty, TableState::Partial, TableState::Full] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn test_build_redistributes_and_aggregates() {
        let mut counts = vec![0; 20];
        counts[0] = 5;
        counts[18] = 9;
        let snapshot = OccupancySnapshot::new(counts);
        let report = OccupancyReport::build(&snapshot, 3, &DEFAULT_LAYOUT, 11, at_noon());

        assert_eq!(report.tables.len(), 20);
        assert_eq!(report.tables[0].occupied, 3);
        assert_eq!(report.tables[0].status, TableState::Full);
        assert_eq!(report.tables[1].occupied, 2);
        assert_eq!(report.tables[1].status, TableState::Partial);
        // outside both columns, shown as-is
        assert_eq!(report.tables[18].occupied, 9);
        assert!(report.tables[18].is_overbooked());

        assert_eq!(report.overall_inside, 11);
        assert_eq!(report.total_occupied, 14);
        assert_eq!(report.total_capacity, 60);
        assert_eq!(report.total_free, 46);
        assert_eq!(report.free_tables, 17);
        assert_eq!(report.last_update, "2024-05-17 12:30:05");
    }

    #[test]
    fn test_free_is_floored_at_zero() {
        let snapshot = OccupancySnapshot::new(vec![9, 9]);
        let report = OccupancyReport::build(&snapshot, 3, &DEFAULT_LAYOUT, 0, at_noon());
        assert_eq!(report.total_capacity, 6);
        assert_eq!(report.total_occupied, 18);
        assert_eq!(report.total_free, 0);
        assert_eq!(report.tables[0].free(), 0);
    }

    #[test]
    fn test_non_positive_capacity() {
        let snapshot = OccupancySnapshot::new(vec![2, 0]);
        let report = OccupancyReport::build(&snapshot, -1, &DEFAULT_LAYOUT, 0, at_noon());
        assert_eq!(report.total_capacity, 0);
        assert_eq!(report.tables[0].occupied, 2);
        assert_eq!(report.tables[0].capacity, 0);
        assert_eq!(report.free_tables, 1);
    }

    #[test]
    fn test_json_payload_uses_traffic_light_colors() {
        let snapshot = OccupancySnapshot::new(vec![0, 1, 3]);
        let report = OccupancyReport::build(&snapshot, 3, &DEFAULT_LAYOUT, 4, at_noon());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["overall_inside"], 4);
        assert_eq!(value["total_capacity"], 9);
        assert_eq!(value["tables"][0]["status_color"], "green");
        assert_eq!(value["tables"][1]["status_color"], "yellow");
        assert_eq!(value["tables"][2]["status_color"], "red");
        assert_eq!(value["tables"][2]["table_id"], 3);
    }
}
