//! Main object tracking algorithm: stable identity assignment across frames
//! and unique-object frequency counting.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::tracker::frequency::{DebugInfo, FrequencyAggregator, TrackingSummary};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::policy::{self, CountDecision};
use crate::tracker::rect::Rect;
use crate::tracker::track::{LifespanRecord, TrackedObject};
use crate::tracker::track_state::TrackState;

/// Configuration for the ObjectTracker. All tunables are fixed at
/// construction; nothing is re-read at runtime.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Frames a track may go unmatched before it is evicted
    pub max_disappeared: u32,
    /// Minimum IoU for the permissive matching pass
    pub iou_threshold: f32,
    /// Minimum center distance between distinct objects of one class
    pub spatial_threshold: f32,
    /// How many frames back a lost track can still claim a re-detection
    pub recovery_window: u32,
    /// Window, in frames, for the burst limit below
    pub burst_window: u32,
    /// Maximum new objects of one class accepted within the burst window
    pub burst_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_disappeared: 30,
            iou_threshold: 0.2,
            spatial_threshold: 100.0,
            recovery_window: 10,
            burst_window: 5,
            burst_limit: 3,
        }
    }
}

/// Per-frame output for one track matched in the current frame.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResult {
    pub track_id: u64,
    pub label: String,
    pub confidence: f32,
    pub bbox: Rect,
}

/// Multi-object identity tracker with duplicate-free frequency counting.
///
/// One instance per video job, advanced one `update` call per frame in
/// display order. Strictly sequential and synchronous: no locking, no I/O,
/// cost bounded by active tracks × frame detections.
pub struct ObjectTracker {
    config: TrackerConfig,
    frame_count: u32,
    next_track_id: u64,
    tracked_objects: BTreeMap<u64, TrackedObject>,
    disappeared_counts: BTreeMap<u64, u32>,
    lifespans: BTreeMap<u64, LifespanRecord>,
    counted_ids: BTreeSet<u64>,
    class_track_history: BTreeMap<String, BTreeSet<u64>>,
    frequencies: FrequencyAggregator,
    rejected_detections: u64,
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> Self {
        info!(
            iou_threshold = config.iou_threshold,
            max_disappeared = config.max_disappeared,
            spatial_threshold = config.spatial_threshold,
            "object tracker initialized"
        );
        Self {
            config,
            frame_count: 0,
            next_track_id: 1,
            tracked_objects: BTreeMap::new(),
            disappeared_counts: BTreeMap::new(),
            lifespans: BTreeMap::new(),
            counted_ids: BTreeSet::new(),
            class_track_history: BTreeMap::new(),
            frequencies: FrequencyAggregator::new(),
            rejected_detections: 0,
        }
    }

    /// Advance the tracker by one frame.
    ///
    /// Must be called exactly once per frame, in display order. Returns the
    /// tracks matched in this frame, in ascending track-id order, each with
    /// its stable id. Malformed detections are dropped individually (logged
    /// at warn level) and never abort the frame.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<TrackingResult> {
        self.frame_count += 1;

        let detections = self.validate_detections(detections);
        if detections.is_empty() {
            // Nothing matched this frame: every active track ages by one.
            self.age_all_tracks();
            self.evict_lost_tracks();
            return Vec::new();
        }

        // Step 1: pair detections with active tracks, oldest id first.
        let track_ids: Vec<u64> = self.tracked_objects.keys().copied().collect();
        let track_boxes: Vec<Rect> = self.tracked_objects.values().map(|t| t.bbox).collect();
        let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::match_frame(&track_boxes, &det_boxes, self.config.iou_threshold);

        // Step 2: refresh matched tracks.
        for (track_idx, det_idx) in matches {
            let track_id = track_ids[track_idx];
            let det = &detections[det_idx];
            if let Some(track) = self.tracked_objects.get_mut(&track_id) {
                track.update(det.bbox, det.confidence, self.frame_count);
            }
            self.disappeared_counts.insert(track_id, 0);
        }

        // Step 3: age tracks that went unmatched.
        for track_idx in unmatched_tracks {
            let track_id = track_ids[track_idx];
            if let Some(count) = self.disappeared_counts.get_mut(&track_id) {
                *count += 1;
            }
        }

        // Step 4: start new tracks for unmatched detections, in input order.
        for det_idx in unmatched_detections {
            self.create_track(&detections[det_idx]);
        }

        // Step 5: evict anything lost for too long.
        self.evict_lost_tracks();

        self.frame_output()
    }

    /// Per-class unique-object counts. Side-effect free.
    pub fn get_frequency_statistics(&self) -> BTreeMap<String, u64> {
        self.frequencies.snapshot()
    }

    /// Aggregate view over the session so far. Side-effect free.
    pub fn get_tracking_summary(&self) -> TrackingSummary {
        self.frequencies
            .summarize(self.tracked_objects.len(), self.frame_count)
    }

    /// Detailed state snapshot for introspection and tests.
    pub fn get_debug_info(&self) -> DebugInfo {
        DebugInfo {
            active_tracks: self.tracked_objects.len(),
            total_unique_objects: self.frequencies.total(),
            frames_processed: self.frame_count,
            class_frequencies: self.frequencies.snapshot(),
            class_track_counts: self
                .class_track_history
                .iter()
                .map(|(label, ids)| (label.clone(), ids.len()))
                .collect(),
            active_track_ids: self.tracked_objects.keys().copied().collect(),
            disappeared_counts: self.disappeared_counts.clone(),
            rejected_detections: self.rejected_detections,
            spatial_threshold: self.config.spatial_threshold,
        }
    }

    /// Lifecycle state of a track id, or None if the id was never issued.
    pub fn track_state(&self, track_id: u64) -> Option<TrackState> {
        if self.tracked_objects.contains_key(&track_id) {
            let stale = self
                .disappeared_counts
                .get(&track_id)
                .is_some_and(|&count| count > 0);
            Some(if stale { TrackState::Stale } else { TrackState::Active })
        } else if self.lifespans.contains_key(&track_id) {
            Some(TrackState::Evicted)
        } else {
            None
        }
    }

    /// Clear all state for reuse on a new video. The only code path that
    /// resets the frame counter and id sequence.
    pub fn reset(&mut self) {
        self.tracked_objects.clear();
        self.disappeared_counts.clear();
        self.lifespans.clear();
        self.counted_ids.clear();
        self.class_track_history.clear();
        self.frequencies.clear();
        self.rejected_detections = 0;
        self.next_track_id = 1;
        self.frame_count = 0;
        info!("object tracker reset");
    }

    fn validate_detections(&mut self, detections: Vec<Detection>) -> Vec<Detection> {
        let mut valid = Vec::with_capacity(detections.len());
        for det in detections {
            match det.validate() {
                Ok(()) => valid.push(det),
                Err(err) => {
                    self.rejected_detections += 1;
                    warn!(label = %det.label, %err, "dropping malformed detection");
                }
            }
        }
        valid
    }

    fn age_all_tracks(&mut self) {
        for count in self.disappeared_counts.values_mut() {
            *count += 1;
        }
    }

    fn create_track(&mut self, detection: &Detection) -> u64 {
        let track_id = self.next_track_id;
        self.next_track_id += 1;

        let track = TrackedObject::new(track_id, detection, self.frame_count);
        let center = track.center;

        // Decide counting before the track enters the active set, so it
        // cannot suppress itself.
        let decision = policy::evaluate_new_track(
            &self.config,
            &detection.label,
            center,
            self.frame_count,
            &self.tracked_objects,
            &self.lifespans,
        );
        let counted = decision.counts();
        match &decision {
            CountDecision::Unique => {
                let total = self.frequencies.record(&detection.label);
                self.counted_ids.insert(track_id);
                info!(label = %detection.label, track_id, total, "new unique object");
            }
            CountDecision::RecoveredTrack { evicted_id, distance } => {
                debug!(
                    label = %detection.label,
                    track_id,
                    evicted_id,
                    distance,
                    "close to a recently lost track, not counted"
                );
            }
            CountDecision::NearActiveTrack { track_id: nearby_id, distance } => {
                debug!(
                    label = %detection.label,
                    track_id,
                    nearby_id,
                    distance,
                    "duplicate of an active track, not counted"
                );
            }
            CountDecision::BurstLimited { recent } => {
                debug!(
                    label = %detection.label,
                    track_id,
                    recent,
                    "burst of new objects, not counted"
                );
            }
        }

        self.tracked_objects.insert(track_id, track);
        self.disappeared_counts.insert(track_id, 0);
        self.lifespans.insert(
            track_id,
            LifespanRecord {
                label: detection.label.clone(),
                birth_frame: self.frame_count,
                counted,
                birth_center: center,
            },
        );
        self.class_track_history
            .entry(detection.label.clone())
            .or_default()
            .insert(track_id);

        track_id
    }

    fn evict_lost_tracks(&mut self) {
        let lost: Vec<u64> = self
            .disappeared_counts
            .iter()
            .filter(|&(_, &count)| count > self.config.max_disappeared)
            .map(|(&track_id, _)| track_id)
            .collect();

        for track_id in lost {
            if let Some(track) = self.tracked_objects.remove(&track_id) {
                info!(track_id, label = %track.label, "evicting lost track");
            }
            self.disappeared_counts.remove(&track_id);
            // The lifespan record stays: the recovery window needs it.
        }
    }

    fn frame_output(&self) -> Vec<TrackingResult> {
        self.tracked_objects
            .values()
            .filter(|track| {
                self.disappeared_counts
                    .get(&track.track_id)
                    .is_some_and(|&count| count == 0)
            })
            .map(|track| TrackingResult {
                track_id: track.track_id,
                label: track.label.clone(),
                confidence: track.confidence,
                bbox: track.bbox,
            })
            .collect()
    }
}
