/// Track state enumeration for object tracking lifecycle.
///
/// A track moves Active ⇄ Stale while it is in the active set and ends in
/// Evicted once its disappearance counter exceeds the configured maximum.
/// Nothing leaves Evicted; a later detection at the same location starts a
/// new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Matched in the current frame
    #[default]
    Active,
    /// Missed one or more recent frames, still within the eviction budget
    Stale,
    /// Removed from the active set; only the lifespan record remains
    Evicted,
}
