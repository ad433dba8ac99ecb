// src/occupancy/dedup.rs
//
// Greedy IoU suppression of duplicate person boxes at one table.
// Highest score first; a box is dropped if it overlaps any already-kept box
// at or above the threshold. Approximate, but duplicate boxes on the same
// seated person are the dominant failure and this handles them.

use crate::geometry::bbox_iou;
use crate::types::{BoundingBox, Detection};

/// Indices of the boxes to keep, in descending score order. Missing scores
/// count as 1.0; equal scores keep input order.
pub fn dedup_boxes_by_iou(
    boxes: &[BoundingBox],
    scores: Option<&[f32]>,
    iou_threshold: f32,
) -> Vec<usize> {
    let score_of = |i: usize| scores.and_then(|s| s.get(i).copied()).unwrap_or(1.0);

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| score_of(b).total_cmp(&score_of(a)));

    let mut keep: Vec<usize> = Vec::with_capacity(boxes.len());
    for i in order {
        let duplicate = keep
            .iter()
            .any(|&j| bbox_iou(&boxes[i], &boxes[j]) >= iou_threshold);
        if !duplicate {
            keep.push(i);
        }
    }
    keep
}

/// Kept detections for one table, highest score first.
pub fn dedup_detections(detections: &[Detection], iou_threshold: f32) -> Vec<Detection> {
    let boxes: Vec<BoundingBox> = detections.iter().map(|d| d.bbox).collect();
    let scores: Vec<f32> = detections.iter().map(|d| d.score).collect();
    dedup_boxes_by_iou(&boxes, Some(scores.as_slice()), iou_threshold)
        .into_iter()
        .map(|i| detections[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn test_keeps_highest_score_and_far_box() {
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(1.0, 1.0, 9.0, 9.0), // heavy overlap with box 0
            bbox(20.0, 20.0, 30.0, 30.0),
        ];
        let keep = dedup_boxes_by_iou(&boxes, Some(&[0.9, 0.2, 0.5][..]), 0.6);
        assert_eq!(keep, vec![0, 2]);
    }

    #[test]
    fn test_lower_score_wins_when_better_box_is_second() {
        let boxes = [bbox(1.0, 1.0, 9.0, 9.0), bbox(0.0, 0.0, 10.0, 10.0)];
        let keep = dedup_boxes_by_iou(&boxes, Some(&[0.3, 0.8][..]), 0.6);
        assert_eq!(keep, vec![1]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // IoU exactly 0.5
        let boxes = [bbox(0.0, 0.0, 10.0, 10.0), bbox(0.0, 0.0, 10.0, 5.0)];
        assert_eq!(dedup_boxes_by_iou(&boxes, None, 0.5), vec![0]);
        assert_eq!(dedup_boxes_by_iou(&boxes, None, 0.51), vec![0, 1]);
    }

    #[test]
    fn test_missing_scores_keep_input_order() {
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(0.5, 0.5, 10.0, 10.0),
            bbox(50.0, 50.0, 60.0, 60.0),
        ];
        assert_eq!(dedup_boxes_by_iou(&boxes, None, 0.6), vec![0, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_boxes_by_iou(&[], None, 0.6).is_empty());
        assert!(dedup_detections(&[], 0.6).is_empty());
    }

    #[test]
    fn test_dedup_detections_returns_survivors() {
        let dets = [
            Detection::new(bbox(0.0, 0.0, 10.0, 10.0), 0.4),
            Detection::tracked(bbox(0.0, 0.0, 10.0, 9.5), 0.7, 12),
            Detection::new(bbox(40.0, 0.0, 50.0, 10.0), 0.5),
        ];
        let kept = dedup_detections(&dets, 0.6);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.7);
        assert_eq!(kept[1].score, 0.5);
    }

    #[test]
    fn test_chain_of_overlaps_is_greedy() {
        // a overlaps b, b overlaps c, a does not overlap c: b is suppressed,
        // c survives because only kept boxes suppress
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(3.0, 0.0, 13.0, 10.0),
            bbox(6.0, 0.0, 16.0, 10.0),
        ];
        let keep = dedup_boxes_by_iou(&boxes, Some(&[0.9, 0.8, 0.7][..]), 0.5);
        assert_eq!(keep, vec![0, 2]);
    }
}
