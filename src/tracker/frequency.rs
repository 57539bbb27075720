//! Per-class unique-object frequency bookkeeping.

use std::collections::BTreeMap;

use serde::Serialize;

/// Maintains per-class unique-object counts.
///
/// Pure bookkeeping: the tracker decides *whether* a new track counts, this
/// records the outcome and renders the summary views.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAggregator {
    counts: BTreeMap<String, u64>,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one new unique object of the given class and return the
    /// updated per-class total.
    pub(crate) fn record(&mut self, label: &str) -> u64 {
        let count = self.counts.entry(label.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    /// Read-only snapshot of class → unique count.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts.clone()
    }

    /// Total unique objects across all classes.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }

    /// Render the summary view over the current counts.
    pub(crate) fn summarize(&self, active_tracks: usize, frames_processed: u32) -> TrackingSummary {
        let total = self.total();
        let class_distribution = self
            .counts
            .iter()
            .map(|(label, &count)| {
                let percentage = if total > 0 {
                    round2(count as f64 / total as f64 * 100.0)
                } else {
                    0.0
                };
                (label.clone(), ClassShare { count, percentage })
            })
            .collect();

        TrackingSummary {
            total_unique_objects: total,
            active_tracks,
            frames_processed,
            unique_object_frequencies: self.counts.clone(),
            class_distribution,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate view over a tracking session.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingSummary {
    pub total_unique_objects: u64,
    pub active_tracks: usize,
    pub frames_processed: u32,
    pub unique_object_frequencies: BTreeMap<String, u64>,
    pub class_distribution: BTreeMap<String, ClassShare>,
}

/// One class's share of the unique-object total.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassShare {
    pub count: u64,
    /// Percentage of the total, rounded to two decimals; 0 when the total is 0
    pub percentage: f64,
}

/// Introspection snapshot of the tracker state, for debugging and tests.
/// Not meant to drive control flow.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub active_tracks: usize,
    pub total_unique_objects: u64,
    pub frames_processed: u32,
    pub class_frequencies: BTreeMap<String, u64>,
    pub class_track_counts: BTreeMap<String, usize>,
    pub active_track_ids: Vec<u64>,
    pub disappeared_counts: BTreeMap<u64, u32>,
    pub rejected_detections: u64,
    pub spatial_threshold: f32,
}
