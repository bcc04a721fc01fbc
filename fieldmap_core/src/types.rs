//! Fundamental types used across the entire workspace.

use nalgebra::{Matrix2, Matrix4, Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: use f64 throughout for numerical precision in the Kalman filter.
// All world-unit quantities are centimeters (field-relative frame).
// ---------------------------------------------------------------------------

/// 4-DOF state vector: [px, py, vx, vy]
pub type StateVec = Vector4<f64>;

/// 4×4 state covariance matrix
pub type StateCov = Matrix4<f64>;

/// 2D position measurement vector [px, py]
pub type MeasVec = Vector2<f64>;

/// 2×2 measurement noise covariance
pub type MeasCov = Matrix2<f64>;

// ---------------------------------------------------------------------------
// Identifier types — newtype wrappers so IDs are never confused at compile time
// ---------------------------------------------------------------------------

/// Persistent object identity. Local per-camera ids become persistent ids by
/// adding the camera's fixed id offset and surviving re-identification.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(pub u64);

/// One detection source (a camera + its inference worker).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SourceId(pub u32);

/// Index into the configured object-class list ("robot", game piece types).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClassId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// A single object detection from one camera frame.
///
/// `id` is locally scoped to the producing camera until the identity resolver
/// rewrites it to a persistent identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detection {
    /// Camera-local id (persistent after identity resolution)
    pub id: ObjectId,
    /// World-frame centroid [x, y, z] in cm. z is carried through but ignored
    /// by the 2D map.
    pub position: [f64; 3],
    /// Detection confidence in (0, 1]
    pub confidence: f64,
    /// Which object class this detection belongs to
    pub class: ClassId,
    /// Appearance embedding from the inference model. Carried for downstream
    /// consumers; not consulted by identity matching.
    pub features: Vec<f32>,
}

impl Detection {
    pub fn new(id: u64, position: [f64; 3], confidence: f64, class: ClassId) -> Self {
        Self {
            id: ObjectId(id),
            position,
            confidence,
            class,
            features: Vec::new(),
        }
    }

    /// 2D position in world units.
    pub fn xy(&self) -> (f64, f64) {
        (self.position[0], self.position[1])
    }
}

// ---------------------------------------------------------------------------
// DetectionBatch — a timestamped batch of detections from one source
// ---------------------------------------------------------------------------

/// A batch of detections from one camera at a given time.
///
/// `seq` increases monotonically per source; the pipeline only accepts a batch
/// when the counter advances, so a slow source simply contributes nothing new
/// that tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub source: SourceId,
    /// Fixed id offset for this camera — keeps raw id spaces disjoint across
    /// sources before reconciliation.
    pub id_offset: u64,
    /// Monotonically increasing per-source sequence counter
    pub seq: u64,
    /// Capture timestamp in seconds
    pub timestamp: f64,
    pub detections: Vec<Detection>,
}

// ---------------------------------------------------------------------------
// Object class configuration
// ---------------------------------------------------------------------------

/// Static per-class parameters: map footprint and kinematic envelope.
///
/// The footprint sizes the stamped Gaussian blob; the kinematic limits bound
/// the feasibility radius used for re-identification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectClassConfig {
    pub name: String,
    /// Footprint extent along world X, in cm
    pub footprint_w: f64,
    /// Footprint extent along world Y, in cm
    pub footprint_h: f64,
    /// Maximum plausible speed, cm/s
    pub max_speed: f64,
    /// Maximum plausible acceleration, cm/s²
    pub max_accel: f64,
}

impl ObjectClassConfig {
    /// A competition robot: 75×75 cm frame, up to 300 cm/s and 150 cm/s².
    pub fn robot() -> Self {
        Self {
            name: "robot".to_string(),
            footprint_w: 75.0,
            footprint_h: 75.0,
            max_speed: 300.0,
            max_accel: 150.0,
        }
    }

    /// A passive game piece: 35×35 cm, assumed not self-propelled.
    pub fn game_piece(name: &str) -> Self {
        Self {
            name: name.to_string(),
            footprint_w: 35.0,
            footprint_h: 35.0,
            max_speed: 200.0,
            max_accel: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_accessors() {
        let det = Detection::new(3, [120.0, 45.0, 0.0], 0.9, ClassId(1));
        assert_eq!(det.xy(), (120.0, 45.0));
        assert_eq!(det.id, ObjectId(3));
    }

    #[test]
    fn batch_roundtrips_through_json() {
        let batch = DetectionBatch {
            source: SourceId(2),
            id_offset: 60,
            seq: 41,
            timestamp: 12.5,
            detections: vec![Detection::new(0, [10.0, 20.0, 0.0], 0.8, ClassId(0))],
        };
        let json = serde_json::to_string(&batch).unwrap();
        let back: DetectionBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, batch.source);
        assert_eq!(back.seq, 41);
        assert_eq!(back.detections.len(), 1);
    }
}
