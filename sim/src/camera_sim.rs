//! Camera detection simulator.
//!
//! Generates asynchronous detection batches with:
//! - a per-camera view rectangle (objects outside it are never reported)
//! - miss probability (1 − P_D)
//! - uniform position noise
//! - stable camera-local ids, simulating the per-camera frame tracker
//! - a monotonically increasing per-source sequence counter

use crate::objects::FieldObject;
use fieldmap_core::types::{Detection, DetectionBatch, ObjectId, SourceId};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One configured camera in the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimCamera {
    pub source: SourceId,
    /// Fixed id offset applied downstream by the labeler
    pub id_offset: u64,
    /// View rectangle, world cm: (min_x, min_y) .. (max_x, max_y)
    pub view_min: (f64, f64),
    pub view_max: (f64, f64),
    /// Probability an in-view object is actually detected
    pub p_detection: f64,
    /// Position noise half-width, cm
    pub pos_noise: f64,
    /// Batches per second
    pub refresh_rate: f64,
    /// Next scheduled capture time
    next_scan_time: f64,
    seq: u64,
    /// Ground-truth id → camera-local id, stable while the object stays in view
    #[serde(skip)]
    local_ids: HashMap<u64, u64>,
    next_local_id: u64,
}

impl SimCamera {
    pub fn new(
        source: u32,
        id_offset: u64,
        view_min: (f64, f64),
        view_max: (f64, f64),
        p_detection: f64,
        pos_noise: f64,
        refresh_rate: f64,
    ) -> Self {
        Self {
            source: SourceId(source),
            id_offset,
            view_min,
            view_max,
            p_detection,
            pos_noise,
            refresh_rate,
            next_scan_time: 0.0,
            seq: 0,
            local_ids: HashMap::new(),
            next_local_id: 0,
        }
    }

    fn should_scan(&self, t: f64) -> bool {
        t >= self.next_scan_time
    }

    fn advance_schedule(&mut self) {
        self.next_scan_time += 1.0 / self.refresh_rate;
    }

    fn in_view(&self, x: f64, y: f64) -> bool {
        x >= self.view_min.0 && x <= self.view_max.0 && y >= self.view_min.1 && y <= self.view_max.1
    }

    fn local_id_for(&mut self, truth_id: u64) -> u64 {
        if let Some(&id) = self.local_ids.get(&truth_id) {
            return id;
        }
        let id = self.next_local_id;
        self.next_local_id += 1;
        self.local_ids.insert(truth_id, id);
        id
    }
}

/// Generates detection batches from a set of field objects.
pub struct CameraSimulator {
    pub cameras: Vec<SimCamera>,
    rng: ChaCha8Rng,
}

impl CameraSimulator {
    pub fn new(cameras: Vec<SimCamera>, seed: u64) -> Self {
        Self {
            cameras,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate all batches that should fire at or before `sim_time`.
    pub fn generate_batches(
        &mut self,
        objects: &[FieldObject],
        sim_time: f64,
    ) -> Vec<DetectionBatch> {
        let mut batches = Vec::new();

        for camera in &mut self.cameras {
            if !camera.should_scan(sim_time) {
                continue;
            }
            let scan_time = camera.next_scan_time;
            camera.advance_schedule();

            let mut detections = Vec::new();
            for obj in objects {
                if !obj.is_active(scan_time) {
                    continue;
                }
                let (ox, oy) = obj.pos();
                if !camera.in_view(ox, oy) {
                    continue;
                }
                if self.rng.gen::<f64>() > camera.p_detection {
                    continue;
                }

                let noise = camera.pos_noise;
                let nx = ox + self.rng.gen::<f64>() * noise * 2.0 - noise;
                let ny = oy + self.rng.gen::<f64>() * noise * 2.0 - noise;
                let confidence = 0.7 + 0.3 * self.rng.gen::<f64>();

                let local_id = camera.local_id_for(obj.id);
                detections.push(Detection {
                    id: ObjectId(local_id),
                    position: [nx, ny, 0.0],
                    confidence,
                    class: obj.class,
                    features: Vec::new(),
                });
            }

            camera.seq += 1;
            batches.push(DetectionBatch {
                source: camera.source,
                id_offset: camera.id_offset,
                seq: camera.seq,
                timestamp: scan_time,
                detections,
            });
        }

        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::MotionSpec;
    use fieldmap_core::types::ClassId;

    fn full_field_camera() -> SimCamera {
        SimCamera::new(0, 0, (0.0, 0.0), (1755.0, 805.0), 1.0, 0.0, 10.0)
    }

    #[test]
    fn batches_carry_increasing_sequence_numbers() {
        let objects = vec![FieldObject::new(
            0,
            ClassId(0),
            [100.0, 100.0, 0.0, 0.0],
            MotionSpec::Stationary,
        )];
        let mut sim = CameraSimulator::new(vec![full_field_camera()], 7);
        let b1 = sim.generate_batches(&objects, 0.0);
        let b2 = sim.generate_batches(&objects, 0.2);
        assert_eq!(b1.len(), 1);
        assert!(b2[0].seq > b1[0].seq);
    }

    #[test]
    fn local_ids_are_stable_per_object() {
        let objects = vec![
            FieldObject::new(10, ClassId(0), [100.0, 100.0, 0.0, 0.0], MotionSpec::Stationary),
            FieldObject::new(11, ClassId(0), [500.0, 400.0, 0.0, 0.0], MotionSpec::Stationary),
        ];
        let mut sim = CameraSimulator::new(vec![full_field_camera()], 7);
        let b1 = sim.generate_batches(&objects, 0.0);
        let b2 = sim.generate_batches(&objects, 0.2);
        let ids1: Vec<_> = b1[0].detections.iter().map(|d| d.id).collect();
        let ids2: Vec<_> = b2[0].detections.iter().map(|d| d.id).collect();
        assert_eq!(ids1, ids2);
    }

    #[test]
    fn out_of_view_objects_are_not_reported() {
        let objects = vec![FieldObject::new(
            0,
            ClassId(0),
            [1700.0, 700.0, 0.0, 0.0],
            MotionSpec::Stationary,
        )];
        let mut camera = full_field_camera();
        camera.view_max = (800.0, 805.0);
        let mut sim = CameraSimulator::new(vec![camera], 7);
        let batches = sim.generate_batches(&objects, 0.0);
        assert!(batches[0].detections.is_empty());
    }
}
