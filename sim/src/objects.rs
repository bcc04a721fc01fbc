//! Simulated field objects and state propagation.
//!
//! Each object has a true 4-DOF state [px, py, vx, vy] and a `MotionSpec`
//! describing how it moves. The scenario steps each object forward in time.

use fieldmap_core::types::ClassId;
use serde::{Deserialize, Serialize};

/// Describes object motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Parked game piece or disabled robot.
    Stationary,
    /// Constant velocity: no acceleration.
    ConstantVelocity,
    /// Waypoint tracker: velocity re-aims toward the next waypoint.
    Waypoints {
        /// List of (t, x, y) waypoints, sorted by time
        waypoints: Vec<[f64; 3]>,
        speed: f64,
    },
}

/// A simulated object with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldObject {
    /// Unique ground-truth id (used for replay logs, not visible to tracking)
    pub id: u64,
    pub class: ClassId,
    /// True state [px, py, vx, vy] in cm / cm·s⁻¹
    pub state: [f64; 4],
    pub motion: MotionSpec,
    /// Object is hidden before this time (delayed entry)
    pub appear_at: Option<f64>,
    /// Object is hidden after this time (occlusion / removal)
    pub disappear_at: Option<f64>,
}

impl FieldObject {
    pub fn new(id: u64, class: ClassId, state: [f64; 4], motion: MotionSpec) -> Self {
        Self {
            id,
            class,
            state,
            motion,
            appear_at: None,
            disappear_at: None,
        }
    }

    /// Propagate true state by `dt` seconds, clamped to the field rectangle.
    pub fn step(&mut self, t: f64, dt: f64, field: (f64, f64)) {
        let s = &mut self.state;
        match &self.motion {
            MotionSpec::Stationary => {}
            MotionSpec::ConstantVelocity => {
                s[0] += s[2] * dt;
                s[1] += s[3] * dt;
            }
            MotionSpec::Waypoints { waypoints, speed } => {
                let target = waypoints.iter().find(|wp| wp[0] >= t);
                if let Some(wp) = target {
                    let dx = wp[1] - s[0];
                    let dy = wp[2] - s[1];
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist > 1.0 {
                        s[2] = speed * dx / dist;
                        s[3] = speed * dy / dist;
                    } else {
                        s[2] = 0.0;
                        s[3] = 0.0;
                    }
                }
                s[0] += s[2] * dt;
                s[1] += s[3] * dt;
            }
        }
        // Keep objects on the field; a wall stop also kills that velocity axis.
        if s[0] < 0.0 || s[0] > field.0 {
            s[0] = s[0].clamp(0.0, field.0);
            s[2] = 0.0;
        }
        if s[1] < 0.0 || s[1] > field.1 {
            s[1] = s[1].clamp(0.0, field.1);
            s[3] = 0.0;
        }
    }

    /// True if the object is visible at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        if let Some(appear) = self.appear_at {
            if t < appear {
                return false;
            }
        }
        if let Some(disappear) = self.disappear_at {
            if t >= disappear {
                return false;
            }
        }
        true
    }

    pub fn pos(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }
}
