//! `fieldmap_core` — Probabilistic occupancy mapping and object tracking.
//!
//! # Module layout
//! - [`types`]        — Fundamental types (IDs, detections, state vectors)
//! - [`grid`]         — World ↔ grid coordinate mapping (the one axis-swap site)
//! - `stamp`          — Gaussian blob stamping with clipping and EMA blending
//! - [`probmap`]      — Per-class occupancy grids: insertion, decay, queries
//! - `contour`        — Threshold → connected components → enclosing circles
//! - [`ukf`]          — Constant-velocity Unscented Kalman Filter
//! - [`kalman_cache`] — Per-identity filter state cache
//! - [`labeler`]      — Identity resolution across camera sources
//! - [`pipeline`]     — Full tick orchestrator

pub mod grid;
pub mod kalman_cache;
pub mod labeler;
pub mod pipeline;
pub mod probmap;
pub mod types;
pub mod ukf;

mod contour;
mod stamp;

pub use grid::{GeometryError, GridGeometry};
pub use kalman_cache::{KalmanCache, TrackedState};
pub use labeler::{IdentityResolver, LabelingConfig, Resolution};
pub use pipeline::{FieldPipeline, PipelineConfig, TickOutput};
pub use probmap::{BlobCandidate, DecayModel, MapSnapshot, OccupancyGrid, ProbMap};
pub use types::{
    ClassId, Detection, DetectionBatch, MeasVec, ObjectClassConfig, ObjectId, SourceId, StateCov,
    StateVec,
};
pub use ukf::{MotionFilter, UkfConfig};
