//! Tracked object identity and its permanent lifespan record.

use serde::{Deserialize, Serialize};

use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;

/// One physical object with a stable identity across frames.
///
/// Owned exclusively by the tracker: created for an unmatched detection,
/// refreshed on every successful match, removed once its disappearance
/// counter exceeds the configured maximum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Unique track identifier, assigned once and never reused
    pub track_id: u64,
    /// Class label reported by the detector
    pub label: String,
    /// Latest detection confidence
    pub confidence: f32,
    /// Latest bounding box
    pub bbox: Rect,
    /// Center of the latest bounding box
    pub center: (f32, f32),
    /// Frame the track was created in
    pub first_seen_frame: u32,
    /// Frame the track was last matched in
    pub last_seen_frame: u32,
    /// Number of frames with a successful match
    pub frames_tracked: u32,
}

impl TrackedObject {
    pub(crate) fn new(track_id: u64, detection: &Detection, frame: u32) -> Self {
        Self {
            track_id,
            label: detection.label.clone(),
            confidence: detection.confidence,
            bbox: detection.bbox,
            center: detection.bbox.center(),
            first_seen_frame: frame,
            last_seen_frame: frame,
            frames_tracked: 1,
        }
    }

    /// Refresh position and confidence after a successful match.
    pub(crate) fn update(&mut self, bbox: Rect, confidence: f32, frame: u32) {
        self.bbox = bbox;
        self.confidence = confidence;
        self.center = bbox.center();
        self.last_seen_frame = frame;
        self.frames_tracked += 1;
    }
}

/// Permanent metadata about a track identity.
///
/// Created exactly once when the track is, and retained after the track is
/// evicted so the recovery-window check can recognize re-detections of
/// recently lost objects. Nothing here is ever rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifespanRecord {
    /// Class label of the track
    pub label: String,
    /// Frame the track was created in
    pub birth_frame: u32,
    /// Whether the track was counted as a new unique object
    pub counted: bool,
    /// Box center at creation time
    pub birth_center: (f32, f32),
}
