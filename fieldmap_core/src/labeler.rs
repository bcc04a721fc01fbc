//! Identity resolution: rewrites camera-local detection ids to persistent
//! identities by matching against cached Kalman states.
//!
//! # Algorithm, per batch
//! 1. Every local id gets the source's fixed offset — two cameras can never
//!    collide on raw ids before reconciliation.
//! 2. A detection whose offset id is already cached keeps it (and claims that
//!    identity for this cycle).
//! 3. Each remaining detection searches the not-yet-claimed same-class
//!    entries for the nearest one within its kinematic feasibility radius.
//!    Greedy in detection order, at most one-to-one — not a global optimum.
//! 4. Entries claimed by nobody age; entries unseen past the limit are
//!    evicted.
//! 5. Detections matching nothing keep their offset id and become new
//!    identities on the next cache save.
//!
//! Matching is purely positional: the appearance `features` vector rides
//! along untouched.

use crate::kalman_cache::KalmanCache;
use crate::types::{Detection, ObjectClassConfig, ObjectId};
use std::collections::HashSet;
use tracing::warn;

/// Tuning for identity persistence.
#[derive(Clone, Debug)]
pub struct LabelingConfig {
    /// Cycles an identity may go unseen before eviction
    pub max_frames_not_seen: u32,
    /// Flat slack added to every feasibility radius, cm — absorbs measurement
    /// noise for slow or stationary objects
    pub safety_margin: f64,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            max_frames_not_seen: 60, // around 2-3 sec at camera rate
            safety_margin: 10.0,
        }
    }
}

/// Result of resolving one batch.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Input detections with persistent ids, in input order. Detections with
    /// an invalid class are dropped.
    pub detections: Vec<Detection>,
    /// Count of detections dropped for an out-of-range class index
    pub skipped: usize,
    /// Identities evicted by this cycle's aging sweep
    pub evicted: usize,
}

/// Stateless resolver; all tracking state lives in the per-class caches.
#[derive(Clone, Debug, Default)]
pub struct IdentityResolver {
    pub config: LabelingConfig,
}

impl IdentityResolver {
    pub fn new(config: LabelingConfig) -> Self {
        Self { config }
    }

    /// Resolve one camera batch against the per-class caches. Returns a new
    /// detection list; the input is untouched. `dt` is the update-cycle
    /// period in seconds.
    ///
    /// `caches` and `classes` are parallel: one cache per configured class.
    pub fn resolve(
        &self,
        caches: &mut [KalmanCache],
        classes: &[ObjectClassConfig],
        detections: &[Detection],
        id_offset: u64,
        dt: f64,
    ) -> Resolution {
        let mut unseen: Vec<HashSet<ObjectId>> = caches.iter().map(|c| c.keys()).collect();
        let mut resolved: Vec<Detection> = Vec::with_capacity(detections.len());
        let mut pending: Vec<usize> = Vec::new();
        let mut skipped = 0usize;

        // Pass 1: offset ids, separate direct cache hits from the rest.
        for det in detections {
            let class_idx = det.class.0 as usize;
            if class_idx >= caches.len() {
                warn!(class = %det.class, id = %det.id, "invalid class index, skipping detection");
                skipped += 1;
                continue;
            }
            let mut det = det.clone();
            det.id = ObjectId(det.id.0 + id_offset);
            if caches[class_idx].get(det.id).is_some() {
                unseen[class_idx].remove(&det.id);
            } else {
                pending.push(resolved.len());
            }
            resolved.push(det);
        }

        // Pass 2: nearest kinematically-feasible entry for each new detection.
        for idx in pending {
            let det = &mut resolved[idx];
            let class_idx = det.class.0 as usize;
            let class = &classes[class_idx];
            let (dx, dy) = det.xy();

            let mut best: Option<(ObjectId, f64)> = None;
            for &key in &unseen[class_idx] {
                let Some(entry) = caches[class_idx].get(key) else {
                    continue;
                };
                // Effective gap since this entry was last seen — an occluded
                // object has drifted for more than one tick.
                let gap = dt * (entry.frames_not_seen + 1) as f64;
                let (ex, ey, vx, vy) = (entry.state[0], entry.state[1], entry.state[2], entry.state[3]);
                let px = ex + vx * gap;
                let py = ey + vy * gap;
                let dist = ((dx - px).powi(2) + (dy - py).powi(2)).sqrt();
                let speed = (vx * vx + vy * vy).sqrt().min(class.max_speed);
                let max_range =
                    speed * gap + 0.5 * class.max_accel * gap * gap + self.config.safety_margin;
                if dist < max_range && best.map_or(true, |(_, bd)| dist < bd) {
                    best = Some((key, dist));
                }
            }

            if let Some((key, _)) = best {
                det.id = key;
                unseen[class_idx].remove(&key);
            }
        }

        // Pass 3: age everything nobody claimed, evict the long-gone.
        let mut evicted = 0usize;
        for (class_idx, keys) in unseen.iter().enumerate() {
            for &key in keys {
                if let Some(count) = caches[class_idx].mark_unseen(key) {
                    if count > self.config.max_frames_not_seen {
                        caches[class_idx].evict(key);
                        evicted += 1;
                    }
                }
            }
        }

        Resolution {
            detections: resolved,
            skipped,
            evicted,
        }
    }

    /// Age every cached identity one cycle and evict the long-gone. Used on
    /// ticks where no source delivered a batch, so identities from a dead
    /// source still expire. Returns the eviction count.
    pub fn age_all(&self, caches: &mut [KalmanCache]) -> usize {
        let mut evicted = 0usize;
        for cache in caches.iter_mut() {
            for key in cache.keys() {
                if let Some(count) = cache.mark_unseen(key) {
                    if count > self.config.max_frames_not_seen {
                        cache.evict(key);
                        evicted += 1;
                    }
                }
            }
        }
        evicted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
