//! Per-identity Kalman state cache.
//!
//! The filter is a recursive estimator — it needs the previous state it
//! computed, but there are many tracked objects and only one shared filter
//! instance. This cache owns the per-identity `(state, covariance)` pairs and
//! swaps them in and out of the filter around each predict/update.
//!
//! Exactly one entry exists per live identity. `save` always overwrites in
//! full and resets the unseen counter; eviction of an unknown id is a no-op.

use crate::types::{ObjectId, StateCov, StateVec};
use crate::ukf::MotionFilter;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Cached filter state for one persistent identity.
#[derive(Clone, Debug)]
pub struct TrackedState {
    /// Last filtered state [x, y, vx, vy]
    pub state: StateVec,
    /// Last filtered covariance
    pub cov: StateCov,
    /// Consecutive update cycles this identity went unseen
    pub frames_not_seen: u32,
}

/// Map from persistent identity to its last Kalman state. One cache exists
/// per object class.
#[derive(Clone, Debug, Default)]
pub struct KalmanCache {
    entries: HashMap<ObjectId, TrackedState>,
}

impl KalmanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedState> {
        self.entries.get(&id)
    }

    /// Load the stored state for `id` into the filter. A miss cold-starts the
    /// filter at `[x, y, 0, 0]` with a fresh identity covariance; the filter's
    /// configured noise defaults apply either way.
    pub fn load_for_predict(&self, id: ObjectId, x: f64, y: f64, filter: &mut MotionFilter) {
        match self.entries.get(&id) {
            Some(entry) => filter.set_state(entry.state, entry.cov),
            None => {
                debug!(%id, x, y, "cold-starting kalman state for new identity");
                filter.set_state(StateVec::new(x, y, 0.0, 0.0), StateCov::identity());
            }
        }
    }

    /// Store the filter's current state under `id`, creating the entry if
    /// absent. A saved identity was just seen, so its unseen counter resets.
    pub fn save(&mut self, id: ObjectId, filter: &MotionFilter) {
        self.entries.insert(
            id,
            TrackedState {
                state: filter.state,
                cov: filter.cov,
                frames_not_seen: 0,
            },
        );
    }

    /// Increment the unseen counter for `id`; returns the new count, or `None`
    /// if the id is not cached.
    pub fn mark_unseen(&mut self, id: ObjectId) -> Option<u32> {
        self.entries.get_mut(&id).map(|entry| {
            entry.frames_not_seen += 1;
            entry.frames_not_seen
        })
    }

    /// Remove `id`. Removing a nonexistent id is a no-op.
    pub fn evict(&mut self, id: ObjectId) {
        self.entries.remove(&id);
    }

    /// Snapshot of all live identity keys.
    pub fn keys(&self) -> HashSet<ObjectId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ukf::UkfConfig;
    use approx::assert_abs_diff_eq;

    #[test]
    fn save_and_get_roundtrip() {
        let mut cache = KalmanCache::new();
        let mut filter = MotionFilter::new(UkfConfig::default());
        filter.set_state(StateVec::new(1.0, 2.0, 3.0, 4.0), StateCov::identity());
        cache.save(ObjectId(10), &filter);

        let entry = cache.get(ObjectId(10)).unwrap();
        assert_eq!(entry.state, StateVec::new(1.0, 2.0, 3.0, 4.0));
        assert!(cache.get(ObjectId(99)).is_none());
    }

    #[test]
    fn save_always_overwrites_in_full() {
        let mut cache = KalmanCache::new();
        let mut filter = MotionFilter::new(UkfConfig::default());
        filter.set_state(StateVec::new(1.0, 2.0, 3.0, 4.0), StateCov::identity());
        cache.save(ObjectId(10), &filter);
        cache.mark_unseen(ObjectId(10));

        filter.set_state(StateVec::new(4.0, 5.0, 6.0, 7.0), StateCov::identity() * 2.0);
        cache.save(ObjectId(10), &filter);

        let entry = cache.get(ObjectId(10)).unwrap();
        assert_eq!(entry.state, StateVec::new(4.0, 5.0, 6.0, 7.0));
        assert_eq!(entry.frames_not_seen, 0, "save resets the unseen counter");
    }

    #[test]
    fn miss_cold_starts_with_zero_velocity() {
        let cache = KalmanCache::new();
        let mut filter = MotionFilter::new(UkfConfig::default());
        cache.load_for_predict(ObjectId(5), 120.0, 40.0, &mut filter);
        assert_abs_diff_eq!(filter.state[0], 120.0);
        assert_abs_diff_eq!(filter.state[1], 40.0);
        assert_abs_diff_eq!(filter.state[2], 0.0);
        assert_abs_diff_eq!(filter.state[3], 0.0);
        assert_eq!(filter.cov, StateCov::identity());
    }

    #[test]
    fn hit_restores_the_saved_state() {
        let mut cache = KalmanCache::new();
        let mut filter = MotionFilter::new(UkfConfig::default());
        filter.set_state(StateVec::new(9.0, 8.0, 7.0, 6.0), StateCov::identity() * 3.0);
        cache.save(ObjectId(2), &filter);

        filter.set_state(StateVec::zeros(), StateCov::identity());
        cache.load_for_predict(ObjectId(2), 0.0, 0.0, &mut filter);
        assert_eq!(filter.state, StateVec::new(9.0, 8.0, 7.0, 6.0));
        assert_eq!(filter.cov, StateCov::identity() * 3.0);
    }

    #[test]
    fn evict_unknown_is_a_no_op() {
        let mut cache = KalmanCache::new();
        cache.evict(ObjectId(42));
        assert!(cache.is_empty());
    }

    #[test]
    fn mark_unseen_counts_and_keys_snapshot() {
        let mut cache = KalmanCache::new();
        let filter = MotionFilter::new(UkfConfig::default());
        cache.save(ObjectId(1), &filter);
        cache.save(ObjectId(2), &filter);

        assert_eq!(cache.mark_unseen(ObjectId(1)), Some(1));
        assert_eq!(cache.mark_unseen(ObjectId(1)), Some(2));
        assert_eq!(cache.mark_unseen(ObjectId(7)), None);

        let keys = cache.keys();
        assert!(keys.contains(&ObjectId(1)) && keys.contains(&ObjectId(2)));
        assert_eq!(cache.len(), 2);
    }
}
