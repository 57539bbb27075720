mod frequency;
mod matching;
mod object_tracker;
mod policy;
mod rect;
mod track;
mod track_state;

pub use frequency::{ClassShare, DebugInfo, FrequencyAggregator, TrackingSummary};
pub use matching::{Detection, DetectionError};
pub use object_tracker::{ObjectTracker, TrackerConfig, TrackingResult};
pub use rect::Rect;
pub use track::{LifespanRecord, TrackedObject};
pub use track_state::TrackState;
