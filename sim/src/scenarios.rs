//! Scenario definitions.
//!
//! Each scenario is a named configuration of field objects and cameras.
//! All scenarios are deterministic given the same seed.

use crate::{
    camera_sim::SimCamera,
    objects::{FieldObject, MotionSpec},
};
use fieldmap_core::types::ClassId;
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// 2 robots + 2 game pieces, one full-field camera
    Simple,
    /// 4 robots crossing paths mid-field
    Crossing,
    /// A robot that disappears behind an obstruction and reappears
    Occlusion,
    /// Two half-field cameras with distinct id offsets
    TwoCameras,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub sim_dt: f64,   // simulation step (s)
    /// Field extent (x, y) in cm
    pub field: (f64, f64),
    pub objects: Vec<FieldObject>,
    pub cameras: Vec<SimCamera>,
}

const FIELD: (f64, f64) = (1755.0, 805.0);

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Simple => Self::simple(seed),
            ScenarioKind::Crossing => Self::crossing(seed),
            ScenarioKind::Occlusion => Self::occlusion(seed),
            ScenarioKind::TwoCameras => Self::two_cameras(seed),
        }
    }

    fn full_field_camera(source: u32, id_offset: u64) -> SimCamera {
        SimCamera::new(source, id_offset, (0.0, 0.0), FIELD, 0.95, 4.0, 10.0)
    }

    fn simple(seed: u64) -> Self {
        let objects = vec![
            FieldObject::new(
                0,
                ClassId(0),
                [200.0, 200.0, 60.0, 0.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(
                1,
                ClassId(0),
                [1500.0, 600.0, -40.0, -20.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(2, ClassId(1), [700.0, 300.0, 0.0, 0.0], MotionSpec::Stationary),
            FieldObject::new(3, ClassId(1), [1100.0, 500.0, 0.0, 0.0], MotionSpec::Stationary),
        ];
        Self {
            name: "simple".to_string(),
            seed,
            duration: 20.0,
            sim_dt: 0.1,
            field: FIELD,
            objects,
            cameras: vec![Self::full_field_camera(0, 0)],
        }
    }

    fn crossing(seed: u64) -> Self {
        let objects = vec![
            FieldObject::new(
                0,
                ClassId(0),
                [100.0, 400.0, 120.0, 0.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(
                1,
                ClassId(0),
                [1650.0, 400.0, -120.0, 0.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(
                2,
                ClassId(0),
                [877.0, 100.0, 0.0, 80.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(
                3,
                ClassId(0),
                [877.0, 700.0, 0.0, -80.0],
                MotionSpec::ConstantVelocity,
            ),
        ];
        Self {
            name: "crossing".to_string(),
            seed,
            duration: 12.0,
            sim_dt: 0.1,
            field: FIELD,
            objects,
            cameras: vec![Self::full_field_camera(0, 0)],
        }
    }

    fn occlusion(seed: u64) -> Self {
        // One moving robot that vanishes for two seconds mid-run: the tracker
        // should hold its identity through the gap.
        let mut hidden = FieldObject::new(
            0,
            ClassId(0),
            [300.0, 400.0, 80.0, 0.0],
            MotionSpec::ConstantVelocity,
        );
        hidden.disappear_at = Some(4.0);
        // Same trajectory, fresh ground-truth id: the camera will hand it a
        // new local id, forcing the re-identification path.
        let mut reappeared = hidden.clone();
        reappeared.id = 1;
        reappeared.appear_at = Some(6.0);
        reappeared.disappear_at = None;

        Self {
            name: "occlusion".to_string(),
            seed,
            duration: 10.0,
            sim_dt: 0.1,
            field: FIELD,
            objects: vec![hidden, reappeared],
            cameras: vec![Self::full_field_camera(0, 0)],
        }
    }

    fn two_cameras(seed: u64) -> Self {
        let objects = vec![
            FieldObject::new(
                0,
                ClassId(0),
                [400.0, 400.0, 30.0, 10.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(
                1,
                ClassId(0),
                [1300.0, 400.0, -30.0, -10.0],
                MotionSpec::ConstantVelocity,
            ),
            FieldObject::new(2, ClassId(1), [877.0, 400.0, 0.0, 0.0], MotionSpec::Stationary),
        ];
        // Overlapping halves; disjoint id offsets keep raw ids from colliding.
        let left = SimCamera::new(0, 0, (0.0, 0.0), (1000.0, 805.0), 0.9, 4.0, 10.0);
        let right = SimCamera::new(1, 1000, (755.0, 0.0), (1755.0, 805.0), 0.9, 4.0, 10.0);
        Self {
            name: "two_cameras".to_string(),
            seed,
            duration: 15.0,
            sim_dt: 0.1,
            field: FIELD,
            objects,
            cameras: vec![left, right],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_builds() {
        for kind in [
            ScenarioKind::Simple,
            ScenarioKind::Crossing,
            ScenarioKind::Occlusion,
            ScenarioKind::TwoCameras,
        ] {
            let scenario = Scenario::build(kind, 42);
            assert!(!scenario.objects.is_empty());
            assert!(!scenario.cameras.is_empty());
            assert!(scenario.duration > 0.0);
        }
    }

    #[test]
    fn two_camera_offsets_are_disjoint() {
        let scenario = Scenario::build(ScenarioKind::TwoCameras, 1);
        let offsets: Vec<u64> = scenario.cameras.iter().map(|c| c.id_offset).collect();
        assert_ne!(offsets[0], offsets[1]);
    }
}
