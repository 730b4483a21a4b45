//! Polygon vertex ordering: convexity checks and convex-hull reordering.

use glam::DVec3;
use tactus_types::Scalar;

use crate::centroid::vertex_avg_centroid_2d;
use crate::projection::magnitude_2d;

/// Checks that a 2D polygon's vertices are ordered counter-clockwise and
/// the polygon is convex: every inward edge normal must point toward the
/// vertex-averaged centroid.
pub fn check_poly_orientation(x: &[Scalar], y: &[Scalar]) -> bool {
    let n = x.len();
    let Some(c) = vertex_avg_centroid_2d(x, y) else {
        return false;
    };

    for i in 0..n {
        let j = (i + 1) % n;
        // inward normal of a CCW edge
        let nrml_x = -(y[j] - y[i]);
        let nrml_y = x[j] - x[i];
        let vx = c.x - x[i];
        let vy = c.y - y[i];
        if nrml_x * vx + nrml_y * vy < 0.0 {
            return false;
        }
    }
    true
}

/// Reverses a polygon's winding in place, keeping the first vertex fixed.
pub fn reverse_winding(x: &mut [Scalar], y: &mut [Scalar]) {
    let n = x.len();
    if n < 3 {
        return;
    }
    x[1..n].reverse();
    y[1..n].reverse();
}

/// Reorders an unordered convex vertex set into a CCW polygon, in place.
///
/// Vertex 0 anchors the ordering. The second vertex is chosen so the
/// segment 0→1 is a hull edge (all remaining vertices on one side) oriented
/// CCW with respect to the centroid; each following vertex minimizes the
/// turning angle from the previous reference segment. Returns `false` for
/// fewer than three vertices.
pub fn poly_reorder(x: &mut [Scalar], y: &mut [Scalar]) -> bool {
    let n = x.len();
    if n < 3 {
        return false;
    }

    let Some(c) = vertex_avg_centroid_2d(x, y) else {
        return false;
    };

    let mut ids: Vec<usize> = (0..n).collect();

    // find the hull segment 0 -> id1 with CCW orientation
    let mut id1 = None;
    for j in 1..n {
        let lambda_x = x[j] - x[0];
        let lambda_y = y[j] - y[0];
        let nrml_x = -lambda_y;
        let nrml_y = lambda_x;

        let mut neg = false;
        let mut pos = false;
        for k in 0..n {
            if k == 0 || k == j {
                continue;
            }
            let proj = (x[k] - x[0]) * nrml_x + (y[k] - y[0]) * nrml_y;
            neg = neg || proj < 0.0;
            pos = pos || proj > 0.0;
            if neg && pos {
                break;
            }
        }

        if !neg || !pos {
            // hull segment; take it only if the inward normal faces the
            // centroid (CCW orientation)
            let prod = nrml_x * (c.x - x[0]) + nrml_y * (c.y - y[0]);
            if prod > 0.0 {
                id1 = Some(j);
                break;
            }
        }
    }

    if let Some(j) = id1 {
        ids.swap(1, j);
    }

    // walk the hull: the next vertex minimizes the turning angle from the
    // current reference segment
    for i in 0..n.saturating_sub(3) {
        let ref_x = x[ids[i + 1]] - x[ids[i]];
        let ref_y = y[ids[i + 1]] - y[ids[i]];
        let ref_mag = magnitude_2d(ref_x, ref_y);

        let mut best = i + 2;
        let mut cos_max = -1.0;
        for j in (i + 2)..n {
            let lx = x[ids[j]] - x[ids[i]];
            let ly = y[ids[j]] - y[ids[i]];
            let link_mag = magnitude_2d(lx, ly);
            let cos_theta = (lx * ref_x + ly * ref_y) / (ref_mag * link_mag);
            if cos_theta > cos_max {
                cos_max = cos_theta;
                best = j;
            }
        }
        ids.swap(i + 2, best);
    }

    let xt: Vec<Scalar> = ids.iter().map(|&i| x[i]).collect();
    let yt: Vec<Scalar> = ids.iter().map(|&i| y[i]).collect();
    x.copy_from_slice(&xt);
    y.copy_from_slice(&yt);
    true
}

/// Fixes a 3D polygon's winding so its implied normal (from the first
/// three vertices) points along `reference_normal`. The first vertex stays
/// in place.
pub fn poly_reorder_with_normal(
    x: &mut [Scalar],
    y: &mut [Scalar],
    z: &mut [Scalar],
    reference_normal: DVec3,
) {
    let n = x.len();
    if n < 3 {
        return;
    }

    let v0 = DVec3::new(x[0], y[0], z[0]);
    let v1 = DVec3::new(x[1], y[1], z[1]);
    let v2 = DVec3::new(x[2], y[2], z[2]);
    let implied = (v1 - v0).cross(v2 - v0);

    if implied.dot(reference_normal) < 0.0 {
        x[1..n].reverse();
        y[1..n].reverse();
        z[1..n].reverse();
    }
}

/// 3D winding check used when projected polygons carry a plane normal: true
/// when the polygon's implied normal agrees with `normal`.
pub fn winding_matches_normal(x: &[Scalar], y: &[Scalar], z: &[Scalar], normal: DVec3) -> bool {
    if x.len() < 3 {
        return false;
    }
    let v0 = DVec3::new(x[0], y[0], z[0]);
    let v1 = DVec3::new(x[1], y[1], z[1]);
    let v2 = DVec3::new(x[2], y[2], z[2]);
    (v1 - v0).cross(v2 - v0).dot(normal) >= 0.0
}
