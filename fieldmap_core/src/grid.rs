//! World ↔ grid coordinate mapping.
//!
//! # Axis convention
//! The backing arrays are row-major, and **world X runs along the row axis**:
//!
//! ```text
//! row = world_x / resolution      col = world_y / resolution
//! ```
//!
//! This swap exists because the original map arrays were authored assuming
//! row = vertical-on-screen. It is defined HERE and nowhere else — every
//! caller converts through [`GridGeometry`] instead of re-deriving the
//! transform per call site.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("grid dimensions must be positive (width={width}, height={height})")]
    NonPositiveSize { width: f64, height: f64 },
    #[error("grid resolution must be positive (resolution={0})")]
    NonPositiveResolution(f64),
    #[error("grid smaller than one cell (width={width}, height={height}, resolution={resolution})")]
    SmallerThanOneCell {
        width: f64,
        height: f64,
        resolution: f64,
    },
}

/// Immutable grid geometry shared by every per-class grid.
///
/// `width`/`height` are world extents in cm; `rows`/`cols` are the internal
/// cell counts after resolution scaling.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridGeometry {
    width: f64,
    height: f64,
    resolution: f64,
    rows: usize,
    cols: usize,
}

impl GridGeometry {
    pub fn new(width: f64, height: f64, resolution: f64) -> Result<Self, GeometryError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::NonPositiveSize { width, height });
        }
        if resolution <= 0.0 {
            return Err(GeometryError::NonPositiveResolution(resolution));
        }
        let rows = (width / resolution) as usize;
        let cols = (height / resolution) as usize;
        if rows == 0 || cols == 0 {
            return Err(GeometryError::SmallerThanOneCell {
                width,
                height,
                resolution,
            });
        }
        Ok(Self {
            width,
            height,
            resolution,
            rows,
            cols,
        })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Cell count along the row axis (world X).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell count along the column axis (world Y).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Convert a world position to a clamped internal cell index.
    ///
    /// Out-of-range input logs a warning and clamps rather than failing —
    /// absence and near-edge detections are normal operating states.
    pub fn to_internal(&self, world_x: f64, world_y: f64) -> (usize, usize) {
        let row = world_x / self.resolution;
        let col = world_y / self.resolution;
        if row < 0.0 || row >= self.rows as f64 || col < 0.0 || col >= self.cols as f64 {
            warn!(
                world_x,
                world_y,
                width = self.width,
                height = self.height,
                "world position outside grid, clamping"
            );
        }
        (
            (row.max(0.0) as usize).min(self.rows.saturating_sub(1)),
            (col.max(0.0) as usize).min(self.cols.saturating_sub(1)),
        )
    }

    /// Unclamped fractional cell coordinates — used by blob placement, which
    /// does its own four-sided clipping.
    #[inline]
    pub(crate) fn to_internal_unclamped(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        (world_x / self.resolution, world_y / self.resolution)
    }

    /// Convert an internal cell index back to world units.
    #[inline]
    pub fn to_world(&self, row: usize, col: usize) -> (f64, f64) {
        (row as f64 * self.resolution, col as f64 * self.resolution)
    }

    /// Convert a world-unit length to a cell count (at least 1).
    #[inline]
    pub(crate) fn cells_from_world(&self, len: f64) -> usize {
        ((len / self.resolution) as usize).max(1)
    }

    /// Clip a world-unit window centered at `(x, y)` against the grid.
    /// Returns half-open `(row0, row1, col0, col1)` ranges, or `None` when the
    /// window misses the grid entirely.
    pub fn clip_window(&self, x: f64, y: f64, w: f64, h: f64) -> Option<(usize, usize, usize, usize)> {
        let (cr, cc) = self.to_internal_unclamped(x, y);
        let half_r = w / self.resolution / 2.0;
        let half_c = h / self.resolution / 2.0;
        let r0 = (cr - half_r).floor().max(0.0) as usize;
        let r1 = (((cr + half_r).ceil()).max(0.0) as usize).min(self.rows);
        let c0 = (cc - half_c).floor().max(0.0) as usize;
        let c1 = (((cc + half_c).ceil()).max(0.0) as usize).min(self.cols);
        if r0 >= r1 || c0 >= c1 {
            return None;
        }
        Some((r0, r1, c0, c1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_dimensions() {
        assert!(GridGeometry::new(0.0, 100.0, 1.0).is_err());
        assert!(GridGeometry::new(100.0, 100.0, 0.0).is_err());
    }

    #[test]
    fn world_x_maps_to_row_axis() {
        let geom = GridGeometry::new(200.0, 100.0, 5.0).unwrap();
        assert_eq!(geom.rows(), 40);
        assert_eq!(geom.cols(), 20);
        // World X = 50 → row 10; world Y = 25 → col 5
        assert_eq!(geom.to_internal(50.0, 25.0), (10, 5));
        assert_eq!(geom.to_world(10, 5), (50.0, 25.0));
    }

    #[test]
    fn out_of_range_clamps() {
        let geom = GridGeometry::new(100.0, 100.0, 1.0).unwrap();
        assert_eq!(geom.to_internal(-5.0, 50.0), (0, 50));
        assert_eq!(geom.to_internal(50.0, 1e6), (50, 99));
    }

    #[test]
    fn window_clipping() {
        let geom = GridGeometry::new(100.0, 100.0, 1.0).unwrap();
        // Window hanging off the low edge is trimmed to the grid
        let (r0, r1, c0, c1) = geom.clip_window(0.0, 0.0, 20.0, 20.0).unwrap();
        assert_eq!((r0, c0), (0, 0));
        assert!(r1 <= 100 && c1 <= 100);
        // Fully outside → None
        assert!(geom.clip_window(-500.0, -500.0, 10.0, 10.0).is_none());
    }
}
