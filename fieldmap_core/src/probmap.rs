//! Per-class probabilistic occupancy grids.
//!
//! One [`OccupancyGrid`] exists per tracked object class; all grids share one
//! [`GridGeometry`]. Cells hold accumulated confidence as non-negative f64 —
//! not strictly bounded to [0, 1], though queries and the heatmap export clamp
//! to that range.
//!
//! Every query handles "nothing above threshold" by returning an empty list or
//! a zero tuple. Absence of detections is a normal, frequent state here, not
//! an error.

use crate::contour::extract_blobs;
use crate::grid::GridGeometry;
use crate::stamp::stamp_blob;
use crate::types::{ClassId, ObjectClassConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// How heat leaves the grid over time.
///
/// `Exponential` is a pure per-cell multiply — strictly monotone everywhere.
/// `Diffusive` additionally blurs probability into neighboring cells before
/// applying the confidence decay, modeling positional uncertainty growth; the
/// peak and total mass strictly decrease, while cells adjacent to a peak can
/// gain from the blur.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayModel {
    Exponential,
    #[default]
    Diffusive,
}

/// Normalized 1D diffusion kernel, applied along rows then columns.
const DIFFUSION_KERNEL: [f64; 5] = [0.05, 0.2, 0.5, 0.2, 0.05];

/// One discrete object candidate recovered from the heat map, world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobCandidate {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// OccupancyGrid — one class's heat map
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    geom: GridGeometry,
    cells: Vec<f64>,
    alpha: f64,
    decay_factor: f64,
    decay_model: DecayModel,
}

impl OccupancyGrid {
    pub fn new(geom: GridGeometry, alpha: f64, decay_factor: f64, decay_model: DecayModel) -> Self {
        Self {
            cells: vec![0.0; geom.cell_count()],
            geom,
            alpha,
            decay_factor,
            decay_model,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geom
    }

    /// Read-only view of the raw cell data (row-major).
    #[inline]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Stamp one detection footprint at `(x, y)` world units.
    pub fn insert(&mut self, x: f64, y: f64, footprint_w: f64, footprint_h: f64, confidence: f64) {
        if !confidence.is_finite() || confidence <= 0.0 {
            warn!(x, y, confidence, "non-positive confidence, dropping detection");
            return;
        }
        let confidence = if confidence > 1.0 {
            warn!(x, y, confidence, "confidence above 1.0, clamping");
            1.0
        } else {
            confidence
        };
        stamp_blob(
            &mut self.cells,
            &self.geom,
            self.alpha,
            x,
            y,
            footprint_w,
            footprint_h,
            confidence,
        );
    }

    /// Apply time-scaled decay to every cell. `elapsed` is in seconds.
    pub fn dissipate(&mut self, elapsed: f64) {
        if elapsed <= 0.0 {
            return;
        }
        let factor = self.decay_factor.powf(elapsed);
        match self.decay_model {
            DecayModel::Exponential => {
                for v in &mut self.cells {
                    *v *= factor;
                }
            }
            DecayModel::Diffusive => self.diffuse(factor),
        }
    }

    /// Separable convolution with the normalized diffusion kernel (zero
    /// padding at the boundary), then one amplitude multiply by `factor`.
    fn diffuse(&mut self, factor: f64) {
        let rows = self.geom.rows();
        let cols = self.geom.cols();
        let half = (DIFFUSION_KERNEL.len() / 2) as isize;
        let mut tmp = vec![0.0f64; self.cells.len()];

        // Along the row axis
        for r in 0..rows {
            for c in 0..cols {
                let mut acc = 0.0;
                for (k, w) in DIFFUSION_KERNEL.iter().enumerate() {
                    let rr = r as isize + k as isize - half;
                    if rr >= 0 && rr < rows as isize {
                        acc += w * self.cells[rr as usize * cols + c];
                    }
                }
                tmp[r * cols + c] = acc;
            }
        }
        // Along the column axis, folding in the decay factor
        for r in 0..rows {
            for c in 0..cols {
                let mut acc = 0.0;
                for (k, w) in DIFFUSION_KERNEL.iter().enumerate() {
                    let cc = c as isize + k as isize - half;
                    if cc >= 0 && cc < cols as isize {
                        acc += w * tmp[r * cols + cc as usize];
                    }
                }
                self.cells[r * cols + c] = acc * factor;
            }
        }
    }

    /// Argmax over the whole grid, `(x, y, confidence)` in world units.
    pub fn highest(&self) -> (f64, f64, f64) {
        let (mut best_idx, mut best) = (0usize, f64::MIN);
        for (i, &v) in self.cells.iter().enumerate() {
            if v > best {
                best = v;
                best_idx = i;
            }
        }
        let (x, y) = self
            .geom
            .to_world(best_idx / self.geom.cols(), best_idx % self.geom.cols());
        (x, y, best.max(0.0))
    }

    /// Argmax restricted to cells at or above `threshold`; zero tuple when
    /// nothing qualifies.
    pub fn highest_above(&self, threshold: f64) -> (f64, f64, f64) {
        let (x, y, v) = self.highest();
        if v >= threshold {
            (x, y, v)
        } else {
            (0.0, 0.0, 0.0)
        }
    }

    /// Argmax within a world-unit window centered at `(x, y)`. The window is
    /// clipped to the grid; a window entirely off-grid yields the zero tuple.
    pub fn highest_in_window(&self, x: f64, y: f64, window_w: f64, window_h: f64) -> (f64, f64, f64) {
        self.window_argmax(x, y, window_w, window_h, f64::MIN)
    }

    /// Windowed argmax with a minimum threshold.
    pub fn highest_in_window_above(
        &self,
        x: f64,
        y: f64,
        window_w: f64,
        window_h: f64,
        threshold: f64,
    ) -> (f64, f64, f64) {
        self.window_argmax(x, y, window_w, window_h, threshold)
    }

    fn window_argmax(
        &self,
        x: f64,
        y: f64,
        window_w: f64,
        window_h: f64,
        threshold: f64,
    ) -> (f64, f64, f64) {
        let Some((r0, r1, c0, c1)) = self.geom.clip_window(x, y, window_w, window_h) else {
            warn!(x, y, window_w, window_h, "query window misses the grid");
            return (0.0, 0.0, 0.0);
        };
        let cols = self.geom.cols();
        let mut best: Option<(usize, usize, f64)> = None;
        for r in r0..r1 {
            for c in c0..c1 {
                let v = self.cells[r * cols + c];
                if v >= threshold && best.map_or(true, |(_, _, bv)| v > bv) {
                    best = Some((r, c, v));
                }
            }
        }
        match best {
            Some((r, c, v)) => {
                let (wx, wy) = self.geom.to_world(r, c);
                (wx, wy, v)
            }
            None => (0.0, 0.0, 0.0),
        }
    }

    /// Threshold the grid, extract connected regions, and return one candidate
    /// per region with its minimum enclosing circle. World units throughout.
    pub fn all_above_threshold(&self, threshold: f64) -> Vec<BlobCandidate> {
        let blobs = extract_blobs(&self.cells, self.geom.rows(), self.geom.cols(), threshold);
        blobs
            .into_iter()
            .map(|b| self.candidate_from_center(b.center, b.radius, 0, 0))
            .collect()
    }

    /// `all_above_threshold` restricted to a world-unit window.
    pub fn all_above_threshold_in_window(
        &self,
        x: f64,
        y: f64,
        window_w: f64,
        window_h: f64,
        threshold: f64,
    ) -> Vec<BlobCandidate> {
        let Some((r0, r1, c0, c1)) = self.geom.clip_window(x, y, window_w, window_h) else {
            warn!(x, y, window_w, window_h, "query window misses the grid");
            return Vec::new();
        };
        let cols = self.geom.cols();
        let (wr, wc) = (r1 - r0, c1 - c0);
        let mut window = vec![0.0f64; wr * wc];
        for r in 0..wr {
            for c in 0..wc {
                window[r * wc + c] = self.cells[(r0 + r) * cols + (c0 + c)];
            }
        }
        extract_blobs(&window, wr, wc, threshold)
            .into_iter()
            .map(|b| self.candidate_from_center(b.center, b.radius, r0, c0))
            .collect()
    }

    fn candidate_from_center(
        &self,
        center: (f64, f64),
        radius: f64,
        row_off: usize,
        col_off: usize,
    ) -> BlobCandidate {
        let res = self.geom.resolution();
        let row = (center.0.round().max(0.0) as usize + row_off).min(self.geom.rows() - 1);
        let col = (center.1.round().max(0.0) as usize + col_off).min(self.geom.cols() - 1);
        BlobCandidate {
            x: (center.0 + row_off as f64) * res,
            y: (center.1 + col_off as f64) * res,
            radius: radius * res,
            confidence: self.cells[row * self.geom.cols() + col],
        }
    }

    /// Probe a single cell by world position. `None` (with a warning) when the
    /// position is outside the grid.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let row = x / self.geom.resolution();
        let col = y / self.geom.resolution();
        if row < 0.0 || col < 0.0 || row >= self.geom.rows() as f64 || col >= self.geom.cols() as f64
        {
            warn!(x, y, "value_at probe outside grid");
            return None;
        }
        Some(self.cells[row as usize * self.geom.cols() + col as usize])
    }

    /// Export the grid as bytes for dashboards: values clamped to [0, 1] and
    /// scaled to 0–255.
    pub fn heatmap(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }
}

// ---------------------------------------------------------------------------
// Snapshot — dense dump for replay / testing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub class_name: String,
    pub cells: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: f64,
    pub height: f64,
    pub resolution: f64,
    pub grids: Vec<GridSnapshot>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot geometry {snap_w}x{snap_h}@{snap_res} does not match map geometry")]
    GeometryMismatch {
        snap_w: f64,
        snap_h: f64,
        snap_res: f64,
    },
    #[error("snapshot has {snapshot} grids, map has {map}")]
    ClassCountMismatch { snapshot: usize, map: usize },
    #[error("snapshot grid {class} has {got} cells, expected {expected}")]
    CellCountMismatch {
        class: String,
        got: usize,
        expected: usize,
    },
}

// ---------------------------------------------------------------------------
// ProbMap — one grid per configured class
// ---------------------------------------------------------------------------

/// The per-class grid collection. Identity-free: it only accumulates filtered
/// `(x, y, confidence)` evidence.
#[derive(Clone, Debug)]
pub struct ProbMap {
    geom: GridGeometry,
    classes: Vec<ObjectClassConfig>,
    grids: Vec<OccupancyGrid>,
}

impl ProbMap {
    pub fn new(
        geom: GridGeometry,
        classes: Vec<ObjectClassConfig>,
        alpha: f64,
        decay_factor: f64,
        decay_model: DecayModel,
    ) -> Self {
        let grids = classes
            .iter()
            .map(|_| OccupancyGrid::new(geom, alpha, decay_factor, decay_model))
            .collect();
        Self {
            geom,
            classes,
            grids,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geom
    }

    #[inline]
    pub fn classes(&self) -> &[ObjectClassConfig] {
        &self.classes
    }

    pub fn grid(&self, class: ClassId) -> Option<&OccupancyGrid> {
        self.grids.get(class.0 as usize)
    }

    fn grid_mut(&mut self, class: ClassId) -> Option<&mut OccupancyGrid> {
        let grid = self.grids.get_mut(class.0 as usize);
        if grid.is_none() {
            warn!(%class, "unknown class id, skipping");
        }
        grid
    }

    /// Insert with the class's configured footprint.
    pub fn insert_detection(&mut self, class: ClassId, x: f64, y: f64, confidence: f64) {
        let Some(cfg) = self.classes.get(class.0 as usize) else {
            warn!(%class, "unknown class id, skipping");
            return;
        };
        let (w, h) = (cfg.footprint_w, cfg.footprint_h);
        if let Some(grid) = self.grid_mut(class) {
            grid.insert(x, y, w, h, confidence);
        }
    }

    /// Insert with an explicit footprint.
    pub fn insert_custom(
        &mut self,
        class: ClassId,
        x: f64,
        y: f64,
        footprint_w: f64,
        footprint_h: f64,
        confidence: f64,
    ) {
        if let Some(grid) = self.grid_mut(class) {
            grid.insert(x, y, footprint_w, footprint_h, confidence);
        }
    }

    /// Decay every class grid. Grids are independent, so this runs them in
    /// parallel.
    pub fn dissipate(&mut self, elapsed: f64) {
        self.grids
            .par_iter_mut()
            .for_each(|grid| grid.dissipate(elapsed));
    }

    pub fn highest(&self, class: ClassId) -> (f64, f64, f64) {
        self.grid(class).map_or((0.0, 0.0, 0.0), |g| g.highest())
    }

    pub fn highest_above(&self, class: ClassId, threshold: f64) -> (f64, f64, f64) {
        self.grid(class)
            .map_or((0.0, 0.0, 0.0), |g| g.highest_above(threshold))
    }

    pub fn highest_in_window(
        &self,
        class: ClassId,
        x: f64,
        y: f64,
        window_w: f64,
        window_h: f64,
    ) -> (f64, f64, f64) {
        self.grid(class)
            .map_or((0.0, 0.0, 0.0), |g| g.highest_in_window(x, y, window_w, window_h))
    }

    pub fn all_above_threshold(&self, class: ClassId, threshold: f64) -> Vec<BlobCandidate> {
        self.grid(class)
            .map_or_else(Vec::new, |g| g.all_above_threshold(threshold))
    }

    pub fn all_above_threshold_in_window(
        &self,
        class: ClassId,
        x: f64,
        y: f64,
        window_w: f64,
        window_h: f64,
        threshold: f64,
    ) -> Vec<BlobCandidate> {
        self.grid(class).map_or_else(Vec::new, |g| {
            g.all_above_threshold_in_window(x, y, window_w, window_h, threshold)
        })
    }

    pub fn value_at(&self, class: ClassId, x: f64, y: f64) -> Option<f64> {
        self.grid(class).and_then(|g| g.value_at(x, y))
    }

    pub fn heatmap(&self, class: ClassId) -> Vec<u8> {
        self.grid(class).map_or_else(Vec::new, |g| g.heatmap())
    }

    pub fn clear(&mut self, class: ClassId) {
        if let Some(grid) = self.grid_mut(class) {
            grid.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for grid in &mut self.grids {
            grid.clear();
        }
    }

    /// Dense dump of every class grid plus geometry metadata.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            width: self.geom.width(),
            height: self.geom.height(),
            resolution: self.geom.resolution(),
            grids: self
                .classes
                .iter()
                .zip(&self.grids)
                .map(|(cfg, grid)| GridSnapshot {
                    class_name: cfg.name.clone(),
                    cells: grid.cells.clone(),
                })
                .collect(),
        }
    }

    /// Restore a previously captured snapshot into this map.
    pub fn restore(&mut self, snapshot: &MapSnapshot) -> Result<(), SnapshotError> {
        if snapshot.width != self.geom.width()
            || snapshot.height != self.geom.height()
            || snapshot.resolution != self.geom.resolution()
        {
            return Err(SnapshotError::GeometryMismatch {
                snap_w: snapshot.width,
                snap_h: snapshot.height,
                snap_res: snapshot.resolution,
            });
        }
        if snapshot.grids.len() != self.grids.len() {
            return Err(SnapshotError::ClassCountMismatch {
                snapshot: snapshot.grids.len(),
                map: self.grids.len(),
            });
        }
        for (grid, snap) in self.grids.iter_mut().zip(&snapshot.grids) {
            if snap.cells.len() != grid.cells.len() {
                return Err(SnapshotError::CellCountMismatch {
                    class: snap.class_name.clone(),
                    got: snap.cells.len(),
                    expected: grid.cells.len(),
                });
            }
            grid.cells.copy_from_slice(&snap.cells);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid_200(alpha: f64, decay: f64, model: DecayModel) -> OccupancyGrid {
        let geom = GridGeometry::new(200.0, 200.0, 1.0).unwrap();
        OccupancyGrid::new(geom, alpha, decay, model)
    }

    #[test]
    fn exponential_decay_is_monotone_per_cell() {
        let mut grid = grid_200(0.8, 0.9, DecayModel::Exponential);
        grid.insert(100.0, 100.0, 35.0, 35.0, 0.9);
        grid.insert(40.0, 160.0, 35.0, 35.0, 0.5);
        let before = grid.cells().to_vec();
        grid.dissipate(1.0);
        for (a, b) in grid.cells().iter().zip(&before) {
            assert!(a <= b, "decay must never increase a cell ({a} > {b})");
        }
    }

    #[test]
    fn diffusive_decay_shrinks_peak_and_mass() {
        let mut grid = grid_200(0.8, 0.9, DecayModel::Diffusive);
        grid.insert(100.0, 100.0, 35.0, 35.0, 0.9);
        let peak_before = grid.cells().iter().cloned().fold(0.0f64, f64::max);
        let mass_before: f64 = grid.cells().iter().sum();
        grid.dissipate(1.0);
        let peak_after = grid.cells().iter().cloned().fold(0.0f64, f64::max);
        let mass_after: f64 = grid.cells().iter().sum();
        assert!(peak_after < peak_before);
        assert!(mass_after < mass_before);
    }

    #[test]
    fn dissipation_drives_peak_to_near_zero() {
        for model in [DecayModel::Exponential, DecayModel::Diffusive] {
            let mut grid = grid_200(0.8, 0.88, model);
            grid.insert(100.0, 100.0, 35.0, 35.0, 1.0);
            for _ in 0..50 {
                grid.dissipate(1.0);
            }
            let peak = grid.cells().iter().cloned().fold(0.0f64, f64::max);
            assert!(peak < 0.01, "{model:?}: peak {peak} not dissipated");
        }
    }

    #[test]
    fn static_detection_converges_to_its_confidence() {
        let mut grid = grid_200(0.2, 0.9, DecayModel::Diffusive);
        for _ in 0..20 {
            grid.insert(100.0, 100.0, 35.0, 35.0, 0.8);
        }
        let (x, y, conf) = grid.highest();
        assert!((x - 100.0).abs() <= 2.0, "peak x {x} drifted");
        assert!((y - 100.0).abs() <= 2.0, "peak y {y} drifted");
        assert_abs_diff_eq!(conf, 0.8, epsilon = 0.05);
    }

    #[test]
    fn windowed_argmax_ignores_heat_outside_the_window() {
        let mut grid = grid_200(0.8, 0.9, DecayModel::Exponential);
        grid.insert(50.0, 50.0, 35.0, 35.0, 0.9);
        grid.insert(150.0, 150.0, 35.0, 35.0, 0.4);
        // Window around the weaker detection must not see the strong one
        let (x, y, conf) = grid.highest_in_window(150.0, 150.0, 40.0, 40.0);
        assert!((x - 150.0).abs() <= 3.0 && (y - 150.0).abs() <= 3.0);
        assert!(conf < 0.5);
        // Window fully off the grid yields the zero tuple
        assert_eq!(grid.highest_in_window(-900.0, -900.0, 10.0, 10.0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn two_separated_detections_extract_as_two_candidates() {
        let mut grid = grid_200(0.8, 0.9, DecayModel::Diffusive);
        grid.insert(50.0, 50.0, 35.0, 35.0, 0.9);
        grid.insert(150.0, 150.0, 35.0, 35.0, 0.9);
        let mut found = grid.all_above_threshold(0.3);
        assert_eq!(found.len(), 2);
        found.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert!((found[0].x - 50.0).abs() <= 5.0 && (found[0].y - 50.0).abs() <= 5.0);
        assert!((found[1].x - 150.0).abs() <= 5.0 && (found[1].y - 150.0).abs() <= 5.0);
        assert!(found.iter().all(|c| c.confidence >= 0.3));
    }

    #[test]
    fn threshold_query_on_empty_grid_is_empty() {
        let grid = grid_200(0.8, 0.9, DecayModel::Diffusive);
        assert!(grid.all_above_threshold(0.1).is_empty());
        assert_eq!(grid.highest_above(0.1), (0.0, 0.0, 0.0));
    }

    #[test]
    fn value_probe_and_heatmap_clamp() {
        let mut grid = grid_200(1.0, 0.9, DecayModel::Exponential);
        grid.insert(100.0, 100.0, 35.0, 35.0, 1.0);
        assert!(grid.value_at(100.0, 100.0).is_some());
        assert_eq!(grid.value_at(-1.0, 100.0), None);
        let bytes = grid.heatmap();
        assert_eq!(bytes.len(), grid.geometry().cell_count());
        assert_eq!(*bytes.iter().max().unwrap(), 255);
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut grid = grid_200(0.8, 0.9, DecayModel::Exponential);
        grid.insert(100.0, 100.0, 35.0, 35.0, 0.9);
        grid.clear();
        assert!(grid.cells().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn probmap_routes_by_class_and_rejects_unknown() {
        let geom = GridGeometry::new(200.0, 200.0, 1.0).unwrap();
        let classes = vec![
            ObjectClassConfig::robot(),
            ObjectClassConfig::game_piece("ball"),
        ];
        let mut map = ProbMap::new(geom, classes, 0.8, 0.9, DecayModel::Diffusive);
        map.insert_detection(ClassId(0), 60.0, 60.0, 0.9);
        map.insert_detection(ClassId(1), 140.0, 140.0, 0.9);
        // Unknown class: silently skipped
        map.insert_detection(ClassId(7), 100.0, 100.0, 0.9);

        let (rx, ry, _) = map.highest(ClassId(0));
        assert!((rx - 60.0).abs() <= 3.0 && (ry - 60.0).abs() <= 3.0);
        let (gx, gy, _) = map.highest(ClassId(1));
        assert!((gx - 140.0).abs() <= 3.0 && (gy - 140.0).abs() <= 3.0);
        assert_eq!(map.highest(ClassId(7)), (0.0, 0.0, 0.0));
        assert!(map.all_above_threshold(ClassId(7), 0.1).is_empty());
    }

    #[test]
    fn snapshot_roundtrip_and_mismatch() {
        let geom = GridGeometry::new(100.0, 100.0, 1.0).unwrap();
        let classes = vec![ObjectClassConfig::robot()];
        let mut map = ProbMap::new(geom, classes.clone(), 0.8, 0.9, DecayModel::Diffusive);
        map.insert_detection(ClassId(0), 50.0, 50.0, 0.9);
        let snap = map.snapshot();

        let mut restored = ProbMap::new(geom, classes, 0.8, 0.9, DecayModel::Diffusive);
        restored.restore(&snap).unwrap();
        assert_eq!(restored.highest(ClassId(0)), map.highest(ClassId(0)));

        let other_geom = GridGeometry::new(50.0, 50.0, 1.0).unwrap();
        let mut other = ProbMap::new(other_geom, vec![ObjectClassConfig::robot()], 0.8, 0.9, DecayModel::Diffusive);
        assert!(matches!(
            other.restore(&snap),
            Err(SnapshotError::GeometryMismatch { .. })
        ));
    }
}
