//! Multi-object identity tracking with unique-object frequency counting.
//!
//! Given a time-ordered stream of per-frame detections (class label,
//! confidence, bounding box) from an external detector, the tracker assigns
//! each physical object a stable identity across frames, tolerates brief
//! detection drop-outs and box jitter, and maintains per-class counts of
//! *distinct* objects rather than raw detection tallies.
//!
//! # Example
//!
//! ```
//! use freqtrack_rs::{Detection, ObjectTracker, TrackerConfig};
//!
//! let mut tracker = ObjectTracker::new(TrackerConfig::default());
//!
//! // One frame: the detector saw a car.
//! let tracks = tracker.update(vec![Detection::new("car", 0.9, 100.0, 100.0, 200.0, 200.0)]);
//! assert_eq!(tracks.len(), 1);
//!
//! // Next frame: the same car, slightly moved, keeps its id.
//! let tracks = tracker.update(vec![Detection::new("car", 0.8, 105.0, 105.0, 205.0, 205.0)]);
//! assert_eq!(tracks[0].track_id, 1);
//!
//! assert_eq!(tracker.get_frequency_statistics().get("car"), Some(&1));
//! ```
//!
//! Each video job owns its own `ObjectTracker`; instances share no state, so
//! a worker pool can run many jobs in parallel without synchronization.

pub mod integration;
pub mod tracker;

pub use integration::{DetectionSource, TrackerPipeline};
pub use tracker::{Detection, ObjectTracker, TrackerConfig, TrackingResult, TrackingSummary};
