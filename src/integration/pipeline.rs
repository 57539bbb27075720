//! TrackerPipeline for combining detection with tracking.

use crate::tracker::{ObjectTracker, TrackerConfig, TrackingResult, TrackingSummary};

use super::DetectionSource;

/// A combined pipeline that bundles detection inference with identity
/// tracking and frequency counting.
///
/// This struct provides a convenient way to run end-to-end counting by
/// combining any `DetectionSource` with the `ObjectTracker`.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: ObjectTracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self {
            detector,
            tracker: ObjectTracker::new(config),
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }

    /// Process a single frame and return the tracks matched in it.
    ///
    /// Runs detection on the input image, then advances the tracker by one
    /// frame with the detected objects.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// The current frame's `TrackingResult`s, or a detection error.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackingResult>, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        Ok(self.tracker.update(detections))
    }

    /// Aggregate view over the tracking session so far.
    pub fn summary(&self) -> TrackingSummary {
        self.tracker.get_tracking_summary()
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut ObjectTracker {
        &mut self.tracker
    }
}
