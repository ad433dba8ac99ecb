// src/calibration.rs
//
// Table polygons and the doorway line, produced by the calibration tools and
// read once at startup. Table order in the file defines table ids 1..N.
//
//   tables:
//     - [[120, 340], [410, 330], [420, 520], [110, 530]]
//     - ...
//   entry:
//     line: [[900, 80], [900, 700]]
//     inside_ref: [600, 400]

use crate::error::OccupancyError;
use crate::types::{EntryLine, Polygon};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub tables: Vec<Polygon>,
    #[serde(default)]
    pub entry: Option<EntryLine>,
}

impl Calibration {
    /// Loads YAML, or JSON when the file extension is `.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading calibration {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let calibration: Calibration = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing calibration {}", path.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing calibration {}", path.display()))?
        };

        calibration.validate()?;
        info!(
            "✓ Calibration loaded: {} tables, entry line {}",
            calibration.table_count(),
            if calibration.entry.is_some() { "present" } else { "absent" }
        );
        Ok(calibration)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let calibration: Calibration = serde_yaml::from_str(yaml).context("parsing calibration")?;
        calibration.validate()?;
        Ok(calibration)
    }

    /// Zero tables is an error. Degenerate polygons are kept (they never
    /// register anyone) but logged.
    pub fn validate(&self) -> std::result::Result<(), OccupancyError> {
        if self.tables.is_empty() {
            return Err(OccupancyError::Calibration(
                "no table regions defined".to_string(),
            ));
        }
        for (idx, polygon) in self.tables.iter().enumerate() {
            if polygon.is_degenerate() {
                warn!(
                    "Table {} has {} points (need at least 3), it will never register occupancy",
                    idx + 1,
                    polygon.len()
                );
            }
        }
        Ok(())
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use std::io::Write;

    const SAMPLE: &str = "
tables:
  - [[0, 0], [100, 0], [100, 100], [0, 100]]
  - [[200, 0], [300, 0], [300, 100]]
entry:
  line: [[500, 0], [500, 400]]
  inside_ref: [300, 200]
";

    #[test]
    fn test_parses_tables_and_entry() {
        let cal = Calibration::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(cal.table_count(), 2);
        assert_eq!(cal.tables[1].len(), 3);
        let entry = cal.entry.unwrap();
        assert_eq!(entry.line[1], Point::new(500, 400));
        assert_eq!(entry.inside_ref, Point::new(300, 200));
    }

    #[test]
    fn test_entry_is_optional() {
        let cal = Calibration::from_yaml_str("tables:\n  - [[0, 0], [1, 0], [1, 1]]\n").unwrap();
        assert!(cal.entry.is_none());
    }

    #[test]
    fn test_rejects_empty_tables() {
        assert!(Calibration::from_yaml_str("tables: []\n").is_err());
    }

    #[test]
    fn test_accepts_degenerate_polygon() {
        let cal = Calibration::from_yaml_str("tables:\n  - [[0, 0], [10, 10]]\n").unwrap();
        assert!(cal.tables[0].is_degenerate());
    }

    #[test]
    fn test_load_json_by_extension() {
        let dir = std::env::temp_dir().join(format!("table-occupancy-cal-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calibration.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(f, r#"{{"tables": [[[0,0],[10,0],[10,10],[0,10]]]}}"#).unwrap();
        drop(f);

        let cal = Calibration::load(&path).unwrap();
        assert_eq!(cal.table_count(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Calibration::load("/nonexistent/calibration.yaml").is_err());
    }

    #[test]
    fn test_shipped_calibration_parses() {
        let cal = Calibration::from_yaml_str(include_str!("../calibration.yaml")).unwrap();
        assert_eq!(cal.table_count(), 20);
        assert!(cal.entry.is_some());
    }
}
