//! Blob extraction from a thresholded grid: connected-component labeling
//! followed by a minimum enclosing circle per component.
//!
//! This is how continuous heat turns back into discrete object candidates.
//! Components use 8-connectivity so diagonal ridges stay one blob. The
//! enclosing circle is computed with the incremental Welzl construction over
//! the component's cell coordinates; components are blob-sized, so the
//! worst-case cost is irrelevant in practice.

/// One extracted blob, in grid (row, col) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GridBlob {
    /// Circle center (fractional cell coordinates)
    pub center: (f64, f64),
    /// Circle radius in cells
    pub radius: f64,
}

/// Extract all connected regions of `cells` at or above `threshold`.
///
/// Returns an empty vector when nothing clears the threshold — a normal,
/// frequent state, not an error.
pub(crate) fn extract_blobs(
    cells: &[f64],
    rows: usize,
    cols: usize,
    threshold: f64,
) -> Vec<GridBlob> {
    let mut visited = vec![false; cells.len()];
    let mut blobs = Vec::new();
    let mut stack = Vec::new();
    let mut points: Vec<(f64, f64)> = Vec::new();

    for start in 0..cells.len() {
        if visited[start] || cells[start] < threshold {
            continue;
        }
        points.clear();
        stack.push(start);
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            let (r, c) = (idx / cols, idx % cols);
            points.push((r as f64, c as f64));
            for dr in -1i64..=1 {
                for dc in -1i64..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let (nr, nc) = (r as i64 + dr, c as i64 + dc);
                    if nr < 0 || nc < 0 || nr >= rows as i64 || nc >= cols as i64 {
                        continue;
                    }
                    let nidx = nr as usize * cols + nc as usize;
                    if !visited[nidx] && cells[nidx] >= threshold {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
        let (center, radius) = min_enclosing_circle(&points);
        blobs.push(GridBlob { center, radius });
    }

    blobs
}

// ---------------------------------------------------------------------------
// Minimum enclosing circle (incremental Welzl)
// ---------------------------------------------------------------------------

const EPS: f64 = 1e-9;

fn contains(center: (f64, f64), r: f64, p: (f64, f64)) -> bool {
    let dx = p.0 - center.0;
    let dy = p.1 - center.1;
    dx * dx + dy * dy <= r * r + EPS
}

fn circle_two(a: (f64, f64), b: (f64, f64)) -> ((f64, f64), f64) {
    let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let dx = a.0 - center.0;
    let dy = a.1 - center.1;
    (center, (dx * dx + dy * dy).sqrt())
}

/// Circumcircle of three points; falls back to the widest two-point circle
/// when the points are collinear.
fn circle_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> ((f64, f64), f64) {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < EPS {
        let candidates = [circle_two(a, b), circle_two(a, c), circle_two(b, c)];
        return candidates
            .into_iter()
            .max_by(|x, y| x.1.total_cmp(&y.1))
            .unwrap_or(((a.0, a.1), 0.0));
    }
    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let center = (ux, uy);
    let dx = a.0 - ux;
    let dy = a.1 - uy;
    (center, (dx * dx + dy * dy).sqrt())
}

pub(crate) fn min_enclosing_circle(points: &[(f64, f64)]) -> ((f64, f64), f64) {
    if points.is_empty() {
        return ((0.0, 0.0), 0.0);
    }
    let mut center = points[0];
    let mut radius = 0.0;

    for (i, &p) in points.iter().enumerate().skip(1) {
        if contains(center, radius, p) {
            continue;
        }
        // p must lie on the boundary
        center = p;
        radius = 0.0;
        for (j, &q) in points[..i].iter().enumerate() {
            if contains(center, radius, q) {
                continue;
            }
            // p and q on the boundary
            let (c2, r2) = circle_two(p, q);
            center = c2;
            radius = r2;
            for &s in &points[..j] {
                if !contains(center, radius, s) {
                    let (c3, r3) = circle_three(p, q, s);
                    center = c3;
                    radius = r3;
                }
            }
        }
    }

    (center, radius)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
