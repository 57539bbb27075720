//! Matching utilities for multi-object tracking.

use crate::tracker::rect::{Rect, iou_batch};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundary between the first (confident) and second (permissive) matching pass.
const HIGH_CONFIDENCE_IOU: f32 = 0.5;

/// Detection input for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Class label reported by the detector
    pub label: String,
    /// Detection confidence score in [0, 1]
    pub confidence: f32,
    /// Bounding box in TLBR format (x1, y1, x2, y2)
    pub bbox: Rect,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
        }
    }

    pub fn from_rect(label: impl Into<String>, confidence: f32, bbox: Rect) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// Check that the detection is well-formed.
    ///
    /// The tracker drops malformed detections one at a time rather than
    /// failing the frame; callers that need a hard signal can validate
    /// before submitting.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !self.bbox.is_finite() {
            return Err(DetectionError::NonFiniteBox(self.bbox.to_tlbr()));
        }
        if self.bbox.width <= 0.0 || self.bbox.height <= 0.0 {
            return Err(DetectionError::EmptyBox(self.bbox.to_tlbr()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DetectionError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }
}

/// A malformed detection. Local to the one detection that failed; never
/// aborts the frame or the tracking session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("bounding box has non-finite coordinates: {0:?}")]
    NonFiniteBox([f32; 4]),
    #[error("bounding box is empty or inverted: {0:?}")]
    EmptyBox([f32; 4]),
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

/// Outcome of matching one frame's detections against the active tracks.
///
/// Indices partition both sides: every track index lands in `matches` or
/// `unmatched_tracks`, every detection index in `matches` or
/// `unmatched_detections`.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Match current-frame detection boxes against active track boxes.
///
/// Two-pass greedy on the pairwise IoU matrix: the first pass accepts pairs
/// above `HIGH_CONFIDENCE_IOU`, the second accepts the remaining pairs above
/// `iou_threshold`. Within a pass, pairs are taken in descending IoU order
/// and a pair is accepted only if neither index has been consumed. Equal IoU
/// falls back to ascending (track, detection) index order so the outcome is
/// reproducible.
pub fn match_frame(track_boxes: &[Rect], det_boxes: &[Rect], iou_threshold: f32) -> AssignmentResult {
    let num_tracks = track_boxes.len();
    let num_detections = det_boxes.len();

    if num_tracks == 0 || num_detections == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_tracks).collect(),
            unmatched_detections: (0..num_detections).collect(),
        };
    }

    let ious = iou_batch(track_boxes, det_boxes);

    let mut used_tracks = vec![false; num_tracks];
    let mut used_detections = vec![false; num_detections];
    let mut matches = Vec::new();

    // First pass: confident matches
    greedy_pass(
        &ious,
        |iou| iou > HIGH_CONFIDENCE_IOU,
        &mut used_tracks,
        &mut used_detections,
        &mut matches,
    );

    // Second pass: permissive matches among what is left
    greedy_pass(
        &ious,
        |iou| iou > iou_threshold && iou <= HIGH_CONFIDENCE_IOU,
        &mut used_tracks,
        &mut used_detections,
        &mut matches,
    );

    let unmatched_tracks = unconsumed(&used_tracks);
    let unmatched_detections = unconsumed(&used_detections);

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

fn greedy_pass(
    ious: &Array2<f32>,
    accept: impl Fn(f32) -> bool,
    used_tracks: &mut [bool],
    used_detections: &mut [bool],
    matches: &mut Vec<(usize, usize)>,
) {
    let mut candidates: Vec<(usize, usize, f32)> = ious
        .indexed_iter()
        .filter(|&(_, &iou)| accept(iou))
        .map(|((i, j), &iou)| (i, j, iou))
        .collect();

    candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));

    for (track_idx, det_idx, _) in candidates {
        if !used_tracks[track_idx] && !used_detections[det_idx] {
            used_tracks[track_idx] = true;
            used_detections[det_idx] = true;
            matches.push((track_idx, det_idx));
        }
    }
}

fn unconsumed(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { None } else { Some(i) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(coords: &[[f32; 4]]) -> Vec<Rect> {
        coords
            .iter()
            .map(|&[x1, y1, x2, y2]| Rect::from_tlbr(x1, y1, x2, y2))
            .collect()
    }

    #[test]
    fn test_no_tracks_all_detections_unmatched() {
        let result = match_frame(&[], &boxes(&[[0.0, 0.0, 10.0, 10.0]]), 0.2);
        assert!(result.matches.is_empty());
        assert!(result.unmatched_tracks.is_empty());
        assert_eq!(result.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_no_detections_all_tracks_unmatched() {
        let result = match_frame(&boxes(&[[0.0, 0.0, 10.0, 10.0]]), &[], 0.2);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_identical_boxes_match() {
        let tracks = boxes(&[[0.0, 0.0, 100.0, 100.0]]);
        let dets = boxes(&[[0.0, 0.0, 100.0, 100.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert!(result.unmatched_tracks.is_empty());
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_disjoint_boxes_do_not_match() {
        let tracks = boxes(&[[0.0, 0.0, 10.0, 10.0]]);
        let dets = boxes(&[[500.0, 500.0, 510.0, 510.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert_eq!(result.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_highest_iou_wins_contention() {
        // Track 0 overlaps detection 0 heavily, track 1 overlaps it less;
        // track 1 must be left for the second detection.
        let tracks = boxes(&[[0.0, 0.0, 100.0, 100.0], [40.0, 0.0, 140.0, 100.0]]);
        let dets = boxes(&[[5.0, 0.0, 105.0, 100.0], [60.0, 0.0, 160.0, 100.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert!(result.matches.contains(&(0, 0)));
        assert!(result.matches.contains(&(1, 1)));
    }

    #[test]
    fn test_second_pass_picks_up_moderate_overlap() {
        // IoU here is about 0.33: below the confident pass, above the default
        // threshold.
        let tracks = boxes(&[[0.0, 0.0, 100.0, 100.0]]);
        let dets = boxes(&[[50.0, 0.0, 150.0, 100.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert_eq!(result.matches, vec![(0, 0)]);
    }

    #[test]
    fn test_below_threshold_stays_unmatched() {
        // IoU of about 0.05 stays below the 0.2 default.
        let tracks = boxes(&[[0.0, 0.0, 100.0, 100.0]]);
        let dets = boxes(&[[90.0, 90.0, 190.0, 190.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_partition_property() {
        let tracks = boxes(&[
            [0.0, 0.0, 50.0, 50.0],
            [100.0, 100.0, 150.0, 150.0],
            [300.0, 300.0, 350.0, 350.0],
        ]);
        let dets = boxes(&[
            [5.0, 5.0, 55.0, 55.0],
            [100.0, 100.0, 150.0, 150.0],
            [700.0, 700.0, 750.0, 750.0],
            [710.0, 700.0, 760.0, 750.0],
        ]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert_eq!(result.matches.len() + result.unmatched_tracks.len(), tracks.len());
        assert_eq!(result.matches.len() + result.unmatched_detections.len(), dets.len());
    }

    #[test]
    fn test_equal_iou_tie_breaks_by_index_order() {
        // Two identical tracks compete for two identical detections; the
        // assignment must come out in row-major order every run.
        let tracks = boxes(&[[0.0, 0.0, 100.0, 100.0], [0.0, 0.0, 100.0, 100.0]]);
        let dets = boxes(&[[0.0, 0.0, 100.0, 100.0], [0.0, 0.0, 100.0, 100.0]]);
        let result = match_frame(&tracks, &dets, 0.2);
        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let det = Detection::new("car", 0.9, 10.0, 10.0, 50.0, 50.0);
        assert!(det.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_box() {
        let det = Detection::new("car", 0.9, 50.0, 10.0, 10.0, 50.0);
        assert_eq!(
            det.validate(),
            Err(DetectionError::EmptyBox([50.0, 10.0, 10.0, 50.0]))
        );
    }

    #[test]
    fn test_validate_rejects_non_finite_box() {
        let det = Detection::new("car", 0.9, f32::NAN, 10.0, 50.0, 50.0);
        assert!(matches!(det.validate(), Err(DetectionError::NonFiniteBox(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let det = Detection::new("car", 1.5, 10.0, 10.0, 50.0, 50.0);
        assert_eq!(
            det.validate(),
            Err(DetectionError::ConfidenceOutOfRange(1.5))
        );
        let det = Detection::new("car", f32::NAN, 10.0, 10.0, 50.0, 50.0);
        assert!(matches!(
            det.validate(),
            Err(DetectionError::ConfidenceOutOfRange(_))
        ));
    }
}
