//! `sim` — Field scenario simulator: object trajectories, camera batches, replay.

pub mod camera_sim;
pub mod objects;
pub mod replay;
pub mod scenarios;

pub use camera_sim::{CameraSimulator, SimCamera};
pub use objects::{FieldObject, MotionSpec};
pub use replay::{load_replay, save_replay, ReplayLog};
pub use scenarios::{Scenario, ScenarioKind};
