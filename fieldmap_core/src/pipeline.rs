//! Pipeline orchestrator: the full perception cycle for one update tick.
//!
//! # Processing steps per tick
//! 1. Dissipate every class grid (decay-then-accumulate ordering)
//! 2. Drain the per-source latest-batch slots
//! 3. Resolve persistent identities for each batch
//! 4. Per detection: load cached state → UKF predict+update → save state
//! 5. Stamp the filtered position into the class's occupancy grid
//!
//! Single-threaded and tick-driven by design: sources deliver batches
//! asynchronously via [`FieldPipeline::submit_batch`], but all mutation of the
//! grids and caches happens inside [`FieldPipeline::process_tick`] on the one
//! owning loop. The struct is intentionally not `Sync`-protected — callers
//! with multiple producer threads serialize onto that loop.

use crate::grid::{GeometryError, GridGeometry};
use crate::kalman_cache::KalmanCache;
use crate::labeler::{IdentityResolver, LabelingConfig};
use crate::probmap::{BlobCandidate, DecayModel, MapSnapshot, ProbMap};
use crate::types::{ClassId, DetectionBatch, MeasVec, ObjectClassConfig, SourceId};
use crate::ukf::{MotionFilter, UkfConfig};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the perception pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Field extent along world X, cm
    pub field_width: f64,
    /// Field extent along world Y, cm
    pub field_height: f64,
    /// Grid cell size, cm
    pub resolution: f64,
    /// Tracked object classes; index = ClassId
    pub classes: Vec<ObjectClassConfig>,
    /// EMA blend weight for new evidence
    pub alpha: f64,
    /// Per-second multiplicative decay
    pub decay_factor: f64,
    pub decay_model: DecayModel,
    pub ukf: UkfConfig,
    pub labeling: LabelingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            // 54'3" × 26'5" field in cm, 5 cm cells
            field_width: 1755.0,
            field_height: 805.0,
            resolution: 5.0,
            classes: vec![
                ObjectClassConfig::robot(),
                ObjectClassConfig::game_piece("game_piece"),
            ],
            alpha: 0.8,
            decay_factor: 0.9,
            decay_model: DecayModel::default(),
            ukf: UkfConfig::default(),
            labeling: LabelingConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Counters and timings for one tick.
#[derive(Clone, Debug, Default)]
pub struct TickOutput {
    /// Batches drained and processed this tick
    pub batches_processed: usize,
    /// Detections that went through the filter and into the map
    pub detections_tracked: usize,
    /// Identities created this tick (no cache hit, no feasible match)
    pub new_identities: usize,
    /// Detections dropped for an invalid class index
    pub skipped_detections: usize,
    /// Identities evicted by the aging sweeps
    pub evicted_identities: usize,
    /// Timings in microseconds
    pub timing_dissipate_us: u64,
    pub timing_resolve_us: u64,
    pub timing_filter_us: u64,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Owns the per-class grids and caches, the shared motion filter, and the
/// per-source batch slots.
pub struct FieldPipeline {
    pub config: PipelineConfig,
    map: ProbMap,
    caches: Vec<KalmanCache>,
    filter: MotionFilter,
    resolver: IdentityResolver,
    /// Latest unprocessed batch per source
    pending: HashMap<SourceId, DetectionBatch>,
    /// Highest sequence number accepted per source
    last_seq: HashMap<SourceId, u64>,
}

impl FieldPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, GeometryError> {
        let geom = GridGeometry::new(config.field_width, config.field_height, config.resolution)?;
        let map = ProbMap::new(
            geom,
            config.classes.clone(),
            config.alpha,
            config.decay_factor,
            config.decay_model,
        );
        let caches = config.classes.iter().map(|_| KalmanCache::new()).collect();
        let filter = MotionFilter::new(config.ukf.clone());
        let resolver = IdentityResolver::new(config.labeling.clone());
        Ok(Self {
            config,
            map,
            caches,
            filter,
            resolver,
            pending: HashMap::new(),
            last_seq: HashMap::new(),
        })
    }

    /// Offer a batch from a source. Accepted only when its sequence counter
    /// advances past everything already seen from that source; a stale or
    /// duplicate batch is dropped. Returns whether the batch was accepted.
    pub fn submit_batch(&mut self, batch: DetectionBatch) -> bool {
        let last = self.last_seq.get(&batch.source).copied();
        if last.is_some_and(|seq| batch.seq <= seq) {
            debug!(source = %batch.source, seq = batch.seq, "stale batch, dropping");
            return false;
        }
        self.last_seq.insert(batch.source, batch.seq);
        self.pending.insert(batch.source, batch);
        true
    }

    /// Run one update cycle. `dt` is the elapsed time since the previous tick
    /// in seconds.
    pub fn process_tick(&mut self, dt: f64) -> TickOutput {
        let mut out = TickOutput::default();

        // Decay before accumulating this tick's evidence.
        let t0 = Instant::now();
        self.map.dissipate(dt);
        out.timing_dissipate_us = t0.elapsed().as_micros() as u64;

        // Drain the per-source slots; process in source order so a tick's
        // outcome does not depend on hash iteration.
        let mut batches: Vec<DetectionBatch> = self.pending.drain().map(|(_, b)| b).collect();
        batches.sort_by_key(|b| b.source);

        if batches.is_empty() {
            // No source reported this tick — identities still age.
            out.evicted_identities += self.resolver.age_all(&mut self.caches);
            return out;
        }

        for batch in batches {
            let t0 = Instant::now();
            let resolution = self.resolver.resolve(
                &mut self.caches,
                &self.config.classes,
                &batch.detections,
                batch.id_offset,
                dt,
            );
            out.timing_resolve_us += t0.elapsed().as_micros() as u64;
            out.skipped_detections += resolution.skipped;
            out.evicted_identities += resolution.evicted;

            let t0 = Instant::now();
            for det in &resolution.detections {
                let class_idx = det.class.0 as usize;
                let (x, y) = det.xy();
                let cache = &mut self.caches[class_idx];
                if cache.get(det.id).is_none() {
                    out.new_identities += 1;
                }

                cache.load_for_predict(det.id, x, y, &mut self.filter);
                let filtered = self.filter.predict_and_update(&MeasVec::new(x, y), dt);
                cache.save(det.id, &self.filter);

                self.map
                    .insert_detection(det.class, filtered[0], filtered[1], det.confidence);
                out.detections_tracked += 1;
            }
            out.timing_filter_us += t0.elapsed().as_micros() as u64;
            out.batches_processed += 1;
        }

        out
    }

    /// The occupancy map, for read-side queries.
    pub fn map(&self) -> &ProbMap {
        &self.map
    }

    /// The Kalman cache for one class, if configured.
    pub fn cache(&self, class: ClassId) -> Option<&KalmanCache> {
        self.caches.get(class.0 as usize)
    }

    /// Convenience: obstacle/target candidates for one class.
    pub fn candidates(&self, class: ClassId, threshold: f64) -> Vec<BlobCandidate> {
        self.map.all_above_threshold(class, threshold)
    }

    /// Dense snapshot of every class grid.
    pub fn snapshot(&self) -> MapSnapshot {
        self.map.snapshot()
    }

    /// Wipe grids, identities and sequence state (operator command).
    pub fn reset(&mut self) {
        self.map.clear_all();
        for cache in &mut self.caches {
            cache.clear();
        }
        self.pending.clear();
        self.last_seq.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Detection;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            field_width: 400.0,
            field_height: 400.0,
            resolution: 1.0,
            ..PipelineConfig::default()
        }
    }

    fn batch(source: u32, offset: u64, seq: u64, dets: Vec<Detection>) -> DetectionBatch {
        DetectionBatch {
            source: SourceId(source),
            id_offset: offset,
            seq,
            timestamp: seq as f64 * 0.1,
            detections: dets,
        }
    }

    #[test]
    fn tracked_detection_lands_in_the_map() {
        let mut pipeline = FieldPipeline::new(small_config()).unwrap();
        pipeline.submit_batch(batch(
            0,
            0,
            1,
            vec![Detection::new(0, [200.0, 200.0, 0.0], 0.9, ClassId(0))],
        ));
        let out = pipeline.process_tick(0.1);
        assert_eq!(out.batches_processed, 1);
        assert_eq!(out.detections_tracked, 1);
        assert_eq!(out.new_identities, 1);

        let (x, y, conf) = pipeline.map().highest(ClassId(0));
        assert!((x - 200.0).abs() <= 5.0 && (y - 200.0).abs() <= 5.0);
        assert!(conf > 0.0);
    }

    #[test]
    fn stale_and_duplicate_batches_are_dropped() {
        let mut pipeline = FieldPipeline::new(small_config()).unwrap();
        assert!(pipeline.submit_batch(batch(0, 0, 5, vec![])));
        assert!(!pipeline.submit_batch(batch(0, 0, 5, vec![])), "duplicate seq");
        assert!(!pipeline.submit_batch(batch(0, 0, 3, vec![])), "stale seq");
        assert!(pipeline.submit_batch(batch(0, 0, 6, vec![])));
        // A second source has its own counter
        assert!(pipeline.submit_batch(batch(1, 1000, 1, vec![])));
        let out = pipeline.process_tick(0.1);
        // Only the latest batch per source survives the slot
        assert_eq!(out.batches_processed, 2);
    }

    #[test]
    fn identity_persists_across_ticks() {
        let mut pipeline = FieldPipeline::new(small_config()).unwrap();
        for seq in 1..=5u64 {
            // Local tracker renumbers every frame; position is stable.
            pipeline.submit_batch(batch(
                0,
                0,
                seq,
                vec![Detection::new(seq * 10, [150.0, 150.0, 0.0], 0.9, ClassId(0))],
            ));
            pipeline.process_tick(0.1);
        }
        let cache = pipeline.cache(ClassId(0)).unwrap();
        assert_eq!(cache.len(), 1, "one physical object, one identity");
    }

    #[test]
    fn filtered_state_carries_velocity() {
        let mut pipeline = FieldPipeline::new(small_config()).unwrap();
        // Object moving 10 cm per tick along x with a steady local id.
        for seq in 1..=20u64 {
            let x = 100.0 + seq as f64 * 10.0;
            pipeline.submit_batch(batch(
                0,
                0,
                seq,
                vec![Detection::new(4, [x, 200.0, 0.0], 0.9, ClassId(0))],
            ));
            pipeline.process_tick(1.0);
        }
        let cache = pipeline.cache(ClassId(0)).unwrap();
        let entry = cache.get(crate::types::ObjectId(4)).unwrap();
        assert!(
            entry.state[2] > 5.0,
            "velocity estimate {} should approach 10 cm/s",
            entry.state[2]
        );
    }

    #[test]
    fn unseen_identities_age_and_evict() {
        let mut config = small_config();
        config.labeling.max_frames_not_seen = 2;
        let mut pipeline = FieldPipeline::new(config).unwrap();

        pipeline.submit_batch(batch(
            0,
            0,
            1,
            vec![Detection::new(0, [100.0, 100.0, 0.0], 0.9, ClassId(0))],
        ));
        pipeline.process_tick(0.1);
        assert_eq!(pipeline.cache(ClassId(0)).unwrap().len(), 1);

        // Empty batches keep the tick running with nothing seen.
        let mut total_evicted = 0;
        for seq in 2..=5u64 {
            pipeline.submit_batch(batch(0, 0, seq, vec![]));
            total_evicted += pipeline.process_tick(0.1).evicted_identities;
        }
        assert_eq!(total_evicted, 1);
        assert!(pipeline.cache(ClassId(0)).unwrap().is_empty());
    }

    #[test]
    fn dead_source_identities_still_expire() {
        let mut config = small_config();
        config.labeling.max_frames_not_seen = 2;
        let mut pipeline = FieldPipeline::new(config).unwrap();
        pipeline.submit_batch(batch(
            0,
            0,
            1,
            vec![Detection::new(0, [100.0, 100.0, 0.0], 0.9, ClassId(0))],
        ));
        pipeline.process_tick(0.1);

        // The source goes completely silent — no batches at all.
        let mut total_evicted = 0;
        for _ in 0..4 {
            total_evicted += pipeline.process_tick(0.1).evicted_identities;
        }
        assert_eq!(total_evicted, 1);
        assert!(pipeline.cache(ClassId(0)).unwrap().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut pipeline = FieldPipeline::new(small_config()).unwrap();
        pipeline.submit_batch(batch(
            0,
            0,
            1,
            vec![Detection::new(0, [100.0, 100.0, 0.0], 0.9, ClassId(0))],
        ));
        pipeline.process_tick(0.1);
        pipeline.reset();

        assert_eq!(pipeline.map().highest(ClassId(0)), (0.0, 0.0, 0.0));
        assert!(pipeline.cache(ClassId(0)).unwrap().is_empty());
        // Sequence state resets too: seq 1 is fresh again.
        assert!(pipeline.submit_batch(batch(0, 0, 1, vec![])));
    }
}
