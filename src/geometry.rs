// src/geometry.rs
//
// Pure geometry used to decide which table a detected person belongs to.
//
// Table membership is judged from a handful of anchor points sampled in the
// lower part of the person's bbox (feet / seat contact), not the centroid.
// Each anchor is tested against the table polygon with a pixel margin so a
// box that lands a few pixels outside the calibrated outline still counts.

use crate::types::{BoundingBox, Point, Polygon};

// ============================================================================
// POLYGON TESTS
// ============================================================================

/// Ray-casting parity test. Polygons with fewer than 3 points contain nothing.
pub fn point_in_polygon(polygon: &Polygon, point: Point) -> bool {
    let pts = polygon.points();
    if pts.len() < 3 {
        return false;
    }

    let x = point.x as f64;
    let y = point.y as f64;
    let mut inside = false;

    let mut prev = pts[pts.len() - 1];
    for &cur in pts {
        let (x1, y1) = (prev.x as f64, prev.y as f64);
        let (x2, y2) = (cur.x as f64, cur.y as f64);

        // y1 != y2 whenever the edge straddles the ray, so no division by zero
        if (y1 > y) != (y2 > y) {
            let x_cross = (x2 - x1) * (y - y1) / (y2 - y1) + x1;
            if x < x_cross {
                inside = !inside;
            }
        }
        prev = cur;
    }

    inside
}

/// Euclidean distance from `p` to the segment `a`-`b`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);

    let abx = bx - ax;
    let aby = by - ay;
    let len2 = abx * abx + aby * aby;
    if len2 <= 0.0 {
        return (px - ax).hypot(py - ay);
    }

    let t = (((px - ax) * abx + (py - ay) * aby) / len2).clamp(0.0, 1.0);
    let cx = ax + t * abx;
    let cy = ay + t * aby;
    (px - cx).hypot(py - cy)
}

/// Distance to the nearest polygon edge, positive inside and negative outside.
/// Polygons with fewer than 2 points are always "infinitely outside".
pub fn signed_distance_to_polygon(polygon: &Polygon, point: Point) -> f64 {
    let pts = polygon.points();
    if pts.len() < 2 {
        return f64::NEG_INFINITY;
    }

    let mut min_dist = f64::INFINITY;
    let mut prev = pts[pts.len() - 1];
    for &cur in pts {
        min_dist = min_dist.min(point_to_segment_distance(point, prev, cur));
        prev = cur;
    }

    if point_in_polygon(polygon, point) {
        min_dist
    } else {
        -min_dist
    }
}

/// Inside, or outside by no more than `margin_px`. Degenerate polygons never
/// match, whatever the margin.
pub fn is_in_roi(polygon: &Polygon, point: Point, margin_px: f64) -> bool {
    !polygon.is_degenerate() && signed_distance_to_polygon(polygon, point) >= -margin_px
}

/// Signed side of `point` relative to the directed line (cross product).
/// Zero means on the line. Widened to i128 so any pair of i32 points fits.
pub fn line_side(line: &[Point; 2], point: Point) -> i128 {
    let (x1, y1) = (line[0].x as i128, line[0].y as i128);
    let (x2, y2) = (line[1].x as i128, line[1].y as i128);
    let (px, py) = (point.x as i128, point.y as i128);
    (px - x1) * (y2 - y1) - (py - y1) * (x2 - x1)
}

// ============================================================================
// BBOX HELPERS
// ============================================================================

/// Up to 8 distinct points biased to the bottom of the box: the center, the
/// quarter/center/three-quarter columns at 80% and 90% height, and the
/// bottom-center. Order is fixed; duplicates from tiny boxes are removed.
pub fn bbox_anchor_points(bbox: &BoundingBox) -> Vec<Point> {
    let (x1, y1, x2, y2) = bbox.truncated();
    let c = bbox.center();
    // i64 span: saturated corners at i32::MIN/MAX must not overflow
    let w = (x2 as i64 - x1 as i64).max(1) as f64;
    let h = (y2 as i64 - y1 as i64).max(1) as f64;
    let offset = |base: i32, frac: f64, span: f64| -> i32 {
        (base as i64 + (frac * span) as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };

    let y80 = offset(y1, 0.80, h);
    let y90 = offset(y1, 0.90, h);
    let x25 = offset(x1, 0.25, w);
    let x75 = offset(x1, 0.75, w);

    let candidates = [
        Point::new(c.x, c.y),
        Point::new(c.x, y80),
        Point::new(c.x, y90),
        Point::new(x25, y80),
        Point::new(x75, y80),
        Point::new(x25, y90),
        Point::new(x75, y90),
        Point::new(c.x, y2),
    ];

    let mut unique: Vec<Point> = Vec::with_capacity(candidates.len());
    for p in candidates {
        if !unique.contains(&p) {
            unique.push(p);
        }
    }
    unique
}

/// Intersection over union, 0 when the union has no area.
pub fn bbox_iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);
    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    (inter / union).clamp(0.0, 1.0)
}

// ============================================================================
// REGION SELECTION
// ============================================================================

/// Index of the region containing the most anchor points of `bbox`; ties go
/// to the larger summed signed distance (deeper inside), then to the lower
/// index. `None` when no anchor lands in any region.
pub fn best_roi_for_box(regions: &[Polygon], bbox: &BoundingBox, margin_px: f64) -> Option<usize> {
    let anchors = bbox_anchor_points(bbox);

    let mut best: Option<(usize, usize, f64)> = None; // (idx, in_count, dist_sum)
    for (idx, region) in regions.iter().enumerate() {
        if region.is_degenerate() {
            continue;
        }
        let mut in_count = 0usize;
        let mut dist_sum = 0.0f64;
        for &p in &anchors {
            let dist = signed_distance_to_polygon(region, p);
            if dist >= -margin_px {
                in_count += 1;
                dist_sum += dist;
            }
        }
        if in_count == 0 {
            continue;
        }

        let better = match best {
            None => true,
            Some((_, best_count, best_sum)) => {
                in_count > best_count || (in_count == best_count && dist_sum > best_sum)
            }
        };
        if better {
            best = Some((idx, in_count, dist_sum));
        }
    }

    best.map(|(idx, _, _)| idx)
}
