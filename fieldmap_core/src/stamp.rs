//! Gaussian blob stamping: renders one confidence-weighted detection
//! footprint into a grid with edge clipping and exponential blending.
//!
//! # Footprint shaping
//! - spread `scale = 3.0 * (2.0 - confidence)` — low-confidence detections
//!   contaminate a wider area softly, high-confidence detections commit to a
//!   tight one
//! - `sigma = max(0.2, 1.0 - confidence)`
//! - amplitude = `confidence`, so repeated re-detection converges the peak
//!   cell to the detection confidence under the EMA blend
//!
//! Cells below the relevance floor `confidence / 10` are never touched, and
//! the kernel is cropped to the tight bounding box of the cells above the
//! floor before placement.

use crate::grid::GridGeometry;
use tracing::{error, warn};

/// Stamp one detection into `cells` (row-major, `geom.rows() × geom.cols()`).
///
/// `(world_x, world_y)` is the footprint center; `footprint_w`/`footprint_h`
/// are world-unit extents along X/Y. A footprint that only partially overlaps
/// the grid is trimmed to the intersection; one that misses the grid entirely
/// is dropped with a diagnostic log. Never panics, never writes out of bounds.
pub(crate) fn stamp_blob(
    cells: &mut [f64],
    geom: &GridGeometry,
    alpha: f64,
    world_x: f64,
    world_y: f64,
    footprint_w: f64,
    footprint_h: f64,
    confidence: f64,
) {
    let rows = geom.rows();
    let cols = geom.cols();
    let kh = geom.cells_from_world(footprint_w);
    let kw = geom.cells_from_world(footprint_h);
    let (cr, cc) = geom.to_internal_unclamped(world_x, world_y);

    // Completely off-grid in any direction: drop, loudly.
    let half_h = kh as f64 / 2.0;
    let half_w = kw as f64 / 2.0;
    if cr + half_h < 0.0
        || cr - half_h >= rows as f64
        || cc + half_w < 0.0
        || cc - half_w >= cols as f64
    {
        error!(world_x, world_y, "detection footprint entirely outside grid, dropping");
        return;
    }

    let scale = 3.0 * (2.0 - confidence);
    let sigma = (1.0 - confidence).max(0.2);
    let inv_two_sigma_sq = 0.5 / (sigma * sigma);

    let axis = |n: usize, i: usize| -> f64 {
        if n <= 1 {
            0.0
        } else {
            -scale + 2.0 * scale * i as f64 / (n - 1) as f64
        }
    };

    let mut kernel = vec![0.0f64; kh * kw];
    for i in 0..kh {
        let gx = axis(kh, i);
        for j in 0..kw {
            let gy = axis(kw, j);
            kernel[i * kw + j] = confidence * (-(gx * gx + gy * gy) * inv_two_sigma_sq).exp();
        }
    }

    // Tight bounding box of the cells above the relevance floor.
    let floor = confidence / 10.0;
    let (mut mr0, mut mr1, mut mc0, mut mc1) = (usize::MAX, 0usize, usize::MAX, 0usize);
    for i in 0..kh {
        for j in 0..kw {
            if kernel[i * kw + j] >= floor {
                mr0 = mr0.min(i);
                mr1 = mr1.max(i);
                mc0 = mc0.min(j);
                mc1 = mc1.max(j);
            }
        }
    }
    if mr0 == usize::MAX {
        // Kernel sampling too sparse to reach the floor (tiny footprint at
        // high confidence) — nothing relevant to write.
        warn!(world_x, world_y, confidence, "gaussian footprint has no cells above floor");
        return;
    }

    let bh = mr1 - mr0 + 1;
    let bw = mc1 - mc0 + 1;

    // Center the cropped kernel at the detection, then clip each side.
    let mut row0 = (cr - bh as f64 / 2.0).floor() as isize;
    let mut col0 = (cc - bw as f64 / 2.0).floor() as isize;
    let mut kr0 = mr0;
    let mut kc0 = mc0;
    let mut n_rows = bh as isize;
    let mut n_cols = bw as isize;

    if row0 < 0 {
        kr0 += (-row0) as usize;
        n_rows += row0;
        row0 = 0;
    }
    if col0 < 0 {
        kc0 += (-col0) as usize;
        n_cols += col0;
        col0 = 0;
    }
    let row_overflow = row0 + n_rows - rows as isize;
    if row_overflow > 0 {
        n_rows -= row_overflow;
    }
    let col_overflow = col0 + n_cols - cols as isize;
    if col_overflow > 0 {
        n_cols -= col_overflow;
    }
    if n_rows <= 0 || n_cols <= 0 {
        warn!(world_x, world_y, "no valid cells after clipping, skipping blob");
        return;
    }

    let (row0, col0) = (row0 as usize, col0 as usize);
    for r in 0..n_rows as usize {
        for c in 0..n_cols as usize {
            let v = kernel[(kr0 + r) * kw + (kc0 + c)];
            if v >= floor {
                let idx = (row0 + r) * cols + (col0 + c);
                cells[idx] = cells[idx] * (1.0 - alpha) + v * alpha;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
