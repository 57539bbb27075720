//! Duplicate suppression for newly created tracks.
//!
//! Decides whether a brand-new track represents a genuinely new physical
//! object or a re-detection of one the tracker already knows about. This is
//! a spatial heuristic, not a proof of identity: it trades occasional over-
//! or under-counting for locality, never looking beyond the recent lifespan
//! records and the currently active tracks.

use std::collections::BTreeMap;

use crate::tracker::object_tracker::TrackerConfig;
use crate::tracker::track::{LifespanRecord, TrackedObject};

/// Outcome of evaluating a newly created track. Only `Unique` counts toward
/// the per-class frequency.
#[derive(Debug, Clone, PartialEq)]
pub enum CountDecision {
    /// Genuinely new object
    Unique,
    /// Re-detection of a counted track that was recently lost nearby
    RecoveredTrack { evicted_id: u64, distance: f32 },
    /// Duplicate detection of an object already being tracked nearby
    NearActiveTrack { track_id: u64, distance: f32 },
    /// Too many new objects of this class in a short burst
    BurstLimited { recent: usize },
}

impl CountDecision {
    pub fn counts(&self) -> bool {
        matches!(self, CountDecision::Unique)
    }
}

/// Evaluate a track that is about to be created, before it enters the active
/// set. Checks run in order and the first hit wins.
pub fn evaluate_new_track(
    config: &TrackerConfig,
    label: &str,
    center: (f32, f32),
    frame: u32,
    active_tracks: &BTreeMap<u64, TrackedObject>,
    lifespans: &BTreeMap<u64, LifespanRecord>,
) -> CountDecision {
    // Check 1: a counted track of the same class, no longer active, born
    // within the recovery window and close to this detection is treated as
    // the same object recovering from a tracking gap.
    let recovery_cutoff = frame.saturating_sub(config.recovery_window);
    for (&track_id, record) in lifespans {
        if record.label == label
            && record.counted
            && !active_tracks.contains_key(&track_id)
            && record.birth_frame >= recovery_cutoff
        {
            let distance = center_distance(center, record.birth_center);
            if distance < config.spatial_threshold {
                return CountDecision::RecoveredTrack {
                    evicted_id: track_id,
                    distance,
                };
            }
        }
    }

    // Check 2: an active track of the same class is already nearby.
    for (&track_id, track) in active_tracks {
        if track.label == label {
            let distance = center_distance(center, track.center);
            if distance < config.spatial_threshold {
                return CountDecision::NearActiveTrack { track_id, distance };
            }
        }
    }

    // Check 3: detector flicker can spawn many spurious tracks at once; cap
    // how many new objects of one class are accepted in a short window.
    let recent = lifespans
        .values()
        .filter(|record| {
            record.label == label
                && record.counted
                && frame - record.birth_frame < config.burst_window
        })
        .count();
    if recent >= config.burst_limit {
        return CountDecision::BurstLimited { recent };
    }

    CountDecision::Unique
}

fn center_distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
