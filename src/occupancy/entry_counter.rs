// src/occupancy/entry_counter.rs
//
// Room-level head count from tracked people crossing the doorway line.
//
// The inside of the room is whichever side of the line the calibration's
// reference point lies on. Each track remembers the side its box center was
// last seen on; a flip to the inside counts an entry, a flip to the outside
// counts an exit. The running total never goes below zero.

use crate::geometry::line_side;
use crate::types::{Detection, EntryLine, Point, TrackId};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Inside,
    Outside,
}

#[derive(Debug, Clone, Copy)]
struct TrackSide {
    side: Side,
    last_seen_ms: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossingUpdate {
    pub entered: u32,
    pub exited: u32,
}

pub struct EntryCounter {
    line: Option<[Point; 2]>,
    inside_sign: i128,
    stale_ms: f64,
    tracks: HashMap<TrackId, TrackSide>,
    inside: u64,
}

impl EntryCounter {
    /// `None` or a zero-length line gives an inert counter that always
    /// reports 0.
    pub fn new(entry: Option<EntryLine>, stale_seconds: f64) -> Self {
        let (line, inside_sign) = match entry {
            Some(e) if e.line[0] == e.line[1] => {
                warn!("Entry line has zero length, room counter disabled");
                (None, 1)
            }
            Some(e) => {
                let sign = if line_side(&e.line, e.inside_ref) > 0 { 1 } else { -1 };
                (Some(e.line), sign)
            }
            None => (None, 1),
        };

        Self {
            line,
            inside_sign,
            stale_ms: stale_seconds * 1000.0,
            tracks: HashMap::new(),
            inside: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.line.is_some()
    }

    pub fn people_inside(&self) -> u64 {
        self.inside
    }

    pub fn tracked(&self) -> usize {
        self.tracks.len()
    }

    pub fn side_of(&self, track_id: TrackId) -> Option<Side> {
        self.tracks.get(&track_id).map(|t| t.side)
    }

    /// Feed one tick's accepted detections. Untracked detections are ignored.
    pub fn update(&mut self, detections: &[Detection], now_ms: f64) -> CrossingUpdate {
        let mut result = CrossingUpdate::default();
        let Some(line) = self.line else {
            return result;
        };

        for det in detections {
            let Some(track_id) = det.track_id else {
                continue;
            };
            let raw = line_side(&line, det.bbox.center());
            let side = if raw * self.inside_sign > 0 {
                Side::Inside
            } else {
                Side::Outside
            };

            match self.tracks.get_mut(&track_id) {
                None => {
                    self.tracks.insert(
                        track_id,
                        TrackSide {
                            side,
                            last_seen_ms: now_ms,
                        },
                    );
                }
                Some(state) => {
                    state.last_seen_ms = now_ms;
                    if state.side != side {
                        state.side = side;
                        match side {
                            Side::Inside => {
                                self.inside += 1;
                                result.entered += 1;
                                debug!("Track {} entered, inside={}", track_id.0, self.inside);
                            }
                            Side::Outside => {
                                self.inside = self.inside.saturating_sub(1);
                                result.exited += 1;
                                debug!("Track {} left, inside={}", track_id.0, self.inside);
                            }
                        }
                    }
                }
            }
        }

        let stale = self.stale_ms;
        self.tracks.retain(|_, t| now_ms - t.last_seen_ms <= stale);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    // Vertical doorway at x = 100, room to the right
    fn door() -> EntryLine {
        EntryLine {
            line: [Point::new(100, 0), Point::new(100, 400)],
            inside_ref: Point::new(300, 200),
        }
    }

    fn person(track: i64, cx: f32) -> Detection {
        Detection::tracked(BoundingBox::new(cx - 10.0, 180.0, cx + 10.0, 220.0), 0.9, track)
    }

    #[test]
    fn test_first_sighting_does_not_count() {
        let mut c = EntryCounter::new(Some(door()), 30.0);
        let up = c.update(&[person(1, 200.0), person(2, 50.0)], 0.0);
        assert_eq!(up, CrossingUpdate::default());
        assert_eq!(c.people_inside(), 0);
        assert_eq!(c.side_of(TrackId(1)), Some(Side::Inside));
        assert_eq!(c.side_of(TrackId(2)), Some(Side::Outside));
    }

    #[test]
    fn test_entry_and_exit() {
        let mut c = EntryCounter::new(Some(door()), 30.0);
        c.update(&[person(1, 50.0)], 0.0);
        let up = c.update(&[person(1, 150.0)], 100.0);
        assert_eq!(up.entered, 1);
        assert_eq!(c.people_inside(), 1);

        let up = c.update(&[person(1, 60.0)], 200.0);
        assert_eq!(up.exited, 1);
        assert_eq!(c.people_inside(), 0);
    }

    #[test]
    fn test_count_clamped_at_zero() {
        let mut c = EntryCounter::new(Some(door()), 30.0);
        c.update(&[person(1, 200.0)], 0.0);
        c.update(&[person(1, 50.0)], 100.0);
        assert_eq!(c.people_inside(), 0);
    }

    #[test]
    fn test_inside_reference_flips_orientation() {
        let mut flipped = door();
        flipped.inside_ref = Point::new(20, 200);
        let mut c = EntryCounter::new(Some(flipped), 30.0);
        c.update(&[person(1, 200.0)], 0.0);
        c.update(&[person(1, 50.0)], 100.0);
        assert_eq!(c.people_inside(), 1);
    }

    #[test]
    fn test_point_on_line_counts_as_outside() {
        let mut c = EntryCounter::new(Some(door()), 30.0);
        c.update(&[person(1, 100.0)], 0.0);
        assert_eq!(c.side_of(TrackId(1)), Some(Side::Outside));
    }

    #[test]
    fn test_untracked_detections_ignored() {
        let mut c = EntryCounter::new(Some(door()), 30.0);
        let det = Detection::new(BoundingBox::new(140.0, 180.0, 160.0, 220.0), 0.9);
        c.update(&[det], 0.0);
        assert_eq!(c.tracked(), 0);
    }

    #[test]
    fn test_stale_tracks_forgotten() {
        let mut c = EntryCounter::new(Some(door()), 1.0);
        c.update(&[person(1, 50.0)], 0.0);
        c.update(&[], 1500.0);
        assert_eq!(c.tracked(), 0);
        // re-appearing inside is a fresh first sighting
        c.update(&[person(1, 200.0)], 1600.0);
        assert_eq!(c.people_inside(), 0);
    }

    #[test]
    fn test_inert_without_line() {
        let mut c = EntryCounter::new(None, 30.0);
        assert!(!c.is_active());
        c.update(&[person(1, 50.0)], 0.0);
        c.update(&[person(1, 200.0)], 100.0);
        assert_eq!(c.people_inside(), 0);

        let degenerate = EntryLine {
            line: [Point::new(5, 5), Point::new(5, 5)],
            inside_ref: Point::new(0, 0),
        };
        assert!(!EntryCounter::new(Some(degenerate), 30.0).is_active());
    }
}
