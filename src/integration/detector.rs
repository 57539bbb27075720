//! Trait and output conventions for object detection inference backends.

use crate::tracker::Detection;

use super::DetectionBuilder;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
///
/// # Example
///
/// ```ignore
/// use freqtrack_rs::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return labeled detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// A vector of `Detection` objects, or an error.
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// One raw box as a detection backend reports it, before conversion into the
/// tracker's coordinate convention.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Bounding box; interpretation depends on the `DetectorOutput` variant
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class label
    pub label: String,
}

/// A detector pass's output, tagged by the box convention the backend emits.
///
/// Backends disagree on how boxes are reported; rather than probing the
/// shape of each result at runtime, the caller names the convention up front
/// and each variant has its own extraction arm.
#[derive(Debug, Clone)]
pub enum DetectorOutput {
    /// Corner coordinates: `[x1, y1, x2, y2]` in pixels
    CornerBoxes(Vec<RawDetection>),
    /// Center and size: `[cx, cy, w, h]` in pixels
    CenterBoxes(Vec<RawDetection>),
    /// Corner coordinates normalized to [0, 1], scaled by the frame size
    NormalizedBoxes {
        detections: Vec<RawDetection>,
        frame_width: f32,
        frame_height: f32,
    },
}

impl IntoDetections for DetectorOutput {
    fn into_detections(self) -> Vec<Detection> {
        match self {
            DetectorOutput::CornerBoxes(raw) => raw.into_iter().map(from_corner).collect(),
            DetectorOutput::CenterBoxes(raw) => raw.into_iter().map(from_center).collect(),
            DetectorOutput::NormalizedBoxes {
                detections,
                frame_width,
                frame_height,
            } => detections
                .into_iter()
                .map(|raw| from_normalized(raw, frame_width, frame_height))
                .collect(),
        }
    }
}

fn from_corner(raw: RawDetection) -> Detection {
    let [x1, y1, x2, y2] = raw.bbox;
    DetectionBuilder::new()
        .label(raw.label)
        .confidence(raw.score)
        .tlbr(x1, y1, x2, y2)
        .build()
}

fn from_center(raw: RawDetection) -> Detection {
    let [cx, cy, w, h] = raw.bbox;
    DetectionBuilder::new()
        .label(raw.label)
        .confidence(raw.score)
        .xywh(cx, cy, w, h)
        .build()
}

fn from_normalized(raw: RawDetection, frame_width: f32, frame_height: f32) -> Detection {
    let [x1, y1, x2, y2] = raw.bbox;
    DetectionBuilder::new()
        .label(raw.label)
        .confidence(raw.score)
        .tlbr(
            x1 * frame_width,
            y1 * frame_height,
            x2 * frame_width,
            y2 * frame_height,
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(label: &str, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            bbox,
            score: 0.8,
            label: label.to_owned(),
        }
    }

    #[test]
    fn test_corner_boxes_pass_through() {
        let output = DetectorOutput::CornerBoxes(vec![raw("car", [10.0, 20.0, 50.0, 80.0])]);
        let dets = output.into_detections();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "car");
        assert_eq!(dets[0].bbox.to_tlbr(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_center_boxes_convert_to_corners() {
        let output = DetectorOutput::CenterBoxes(vec![raw("person", [100.0, 100.0, 40.0, 80.0])]);
        let dets = output.into_detections();
        assert_eq!(dets[0].bbox.to_tlbr(), [80.0, 60.0, 120.0, 140.0]);
    }

    #[test]
    fn test_normalized_boxes_scale_to_frame() {
        let output = DetectorOutput::NormalizedBoxes {
            detections: vec![raw("car", [0.25, 0.5, 0.75, 1.0])],
            frame_width: 640.0,
            frame_height: 480.0,
        };
        let dets = output.into_detections();
        assert_eq!(dets[0].bbox.to_tlbr(), [160.0, 240.0, 480.0, 480.0]);
    }
}
