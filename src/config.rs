// src/config.rs

use crate::error::OccupancyError;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), OccupancyError> {
        let d = &self.detection;
        for (name, v) in [
            ("detection.confidence_threshold", d.confidence_threshold),
            ("detection.min_box_area_ratio", d.min_box_area_ratio),
            ("detection.dedup_iou_threshold", d.dedup_iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(OccupancyError::Config(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }

        let a = &self.assignment;
        for (name, v) in [
            ("assignment.roi_margin_px", a.roi_margin_px),
            ("assignment.track_ttl_seconds", a.track_ttl_seconds),
            ("assignment.entry_track_stale_seconds", a.entry_track_stale_seconds),
            ("smoothing.hold_seconds", self.smoothing.hold_seconds),
            ("processing.report_interval_seconds", self.processing.report_interval_seconds),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(OccupancyError::Config(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }

        if self.processing.frame_stride == 0 {
            return Err(OccupancyError::Config(
                "processing.frame_stride must be at least 1".to_string(),
            ));
        }

        let mut columns = self.tables.layout.clone();
        columns.sort_by_key(|c| c.first);
        for c in &columns {
            if c.first == 0 || c.first > c.last {
                return Err(OccupancyError::Config(format!(
                    "tables.layout column {}..={} is not a valid 1-based range",
                    c.first, c.last
                )));
            }
        }
        for pair in columns.windows(2) {
            if pair[1].first <= pair[0].last {
                return Err(OccupancyError::Config(format!(
                    "tables.layout columns {}..={} and {}..={} overlap",
                    pair[0].first, pair[0].last, pair[1].first, pair[1].last
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeatingColumn;

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = "smoothing:\n  window_size: 7\ntables:\n  capacity: 4\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.smoothing.window_size, 7);
        assert_eq!(config.smoothing.confirm_frames, 3);
        assert_eq!(config.tables.capacity, 4);
        assert_eq!(config.tables.layout.len(), 2);
        assert_eq!(config.processing.frame_stride, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_stride() {
        let mut config = Config::default();
        config.processing.frame_stride = 0;
        assert!(matches!(config.validate(), Err(OccupancyError::Config(_))));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let mut config = Config::default();
        config.detection.dedup_iou_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overlapping_columns() {
        let mut config = Config::default();
        config.tables.layout = vec![SeatingColumn::new(1, 10), SeatingColumn::new(10, 18)];
        assert!(config.validate().is_err());

        config.tables.layout = vec![SeatingColumn::new(5, 2)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_capacity_is_accepted() {
        let mut config = Config::default();
        config.tables.capacity = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_parses() {
        let config: Config = serde_yaml::from_str(include_str!("../config.yaml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.tables.layout, vec![SeatingColumn::new(1, 10), SeatingColumn::new(11, 18)]);
    }
}
