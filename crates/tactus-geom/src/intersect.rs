//! Point-in-polygon membership, segment–segment intersection, and
//! short-edge collapse.

use glam::DVec2;
use tactus_types::constants::SEGMENT_DET_TOL;
use tactus_types::{FaceGeomError, Scalar};

use crate::projection::magnitude_2d;
use crate::MAX_OVERLAP_VERTS;

/// Membership test of a 2D point in a triangle via barycentric coordinates.
///
/// Coordinates that are negative but numerically zero (|u| < 1e-12) are
/// clamped to zero so points on edges count as inside.
pub fn point_in_tri(px: Scalar, py: Scalar, xt: &[Scalar], yt: &[Scalar]) -> bool {
    let e1 = DVec2::new(xt[1] - xt[0], yt[1] - yt[0]);
    let e2 = DVec2::new(xt[2] - xt[0], yt[2] - yt[0]);
    let p1 = DVec2::new(px - xt[0], py - yt[0]);

    let e11 = e1.dot(e1);
    let e12 = e1.dot(e2);
    let e22 = e2.dot(e2);
    let p1e1 = p1.dot(e1);
    let p1e2 = p1.dot(e2);

    let det = e11 * e22 - e12 * e12;
    if det == 0.0 {
        return false;
    }
    let inv_det = 1.0 / det;

    let mut u = inv_det * (e22 * p1e1 - e12 * p1e2);
    let mut v = inv_det * (e11 * p1e2 - e12 * p1e1);

    if u.abs() < 1.0e-12 {
        u = 0.0;
    }
    if v.abs() < 1.0e-12 {
        v = 0.0;
    }

    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// Membership test of a 2D point in a convex polygon, fanned into triangles
/// about the supplied centroid.
pub fn point_in_face(
    px: Scalar,
    py: Scalar,
    x: &[Scalar],
    y: &[Scalar],
    cx: Scalar,
    cy: Scalar,
) -> bool {
    let n = x.len();
    debug_assert!(n >= 3, "point_in_face needs at least 3 vertices");

    if n == 3 {
        return point_in_tri(px, py, x, y);
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let xt = [x[i], x[j], cx];
        let yt = [y[i], y[j], cy];
        if point_in_tri(px, py, &xt, &yt) {
            return true;
        }
    }
    false
}

/// Outcome of a segment–segment intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegSeg {
    /// True when a unique interior intersection point exists.
    pub intersects: bool,
    /// The intersection point (zero when `intersects` is false and no
    /// duplicate was found).
    pub point: DVec2,
    /// True when the intersection collapsed onto a segment vertex that is
    /// already interior to the other polygon; the caller must not add it
    /// again.
    pub duplicate: bool,
}

/// Intersects segment `a1`→`b1` with segment `a2`→`b2`.
///
/// `interior[i]` marks whether vertex `i` of `[a1, b1, a2, b2]` is interior
/// to the other polygon. When the intersection point lands within
/// `pos_tol` (as a fraction of the owning segment's length) of such a
/// vertex, it is reported as a duplicate rather than a new point. An
/// overlap of collinear segments is not an intersection here: the bounding
/// vertices of the shared span are interior vertices and were collected
/// already.
pub fn segment_intersection_2d(
    a1: DVec2,
    b1: DVec2,
    a2: DVec2,
    b2: DVec2,
    interior: Option<&[bool; 4]>,
    pos_tol: Scalar,
) -> SegSeg {
    let miss = SegSeg {
        intersects: false,
        point: DVec2::ZERO,
        duplicate: false,
    };

    let lambda1 = b1 - a1;
    let lambda2 = b2 - a2;

    let seg1_mag = lambda1.length();
    let seg2_mag = lambda2.length();

    // determinant of [ -l1 | l2 ]
    let det = -lambda1.x * lambda2.y + lambda2.x * lambda1.y;
    if det.abs() < SEGMENT_DET_TOL {
        return miss;
    }

    let inv_det = 1.0 / det;
    let r = a1 - a2;
    let t1 = inv_det * (r.x * lambda2.y - r.y * lambda2.x);
    let t2 = inv_det * (r.x * lambda1.y - r.y * lambda1.x);

    if !(0.0..=1.0).contains(&t1) || !(0.0..=1.0).contains(&t2) {
        return miss;
    }

    let p = a1 + lambda1 * t1;

    // distance from the intersection to the nearest segment vertex, as a
    // fraction of that vertex's segment length
    let verts = [a1, b1, a2, b2];
    let mut dist_min = seg1_mag.max(seg2_mag);
    let mut id_min = 0;
    for (i, v) in verts.iter().enumerate() {
        let d = magnitude_2d(p.x - v.x, p.y - v.y);
        if d < dist_min {
            dist_min = d;
            id_min = i;
        }
    }

    let dist_ratio = if id_min < 2 {
        dist_min / seg1_mag
    } else {
        dist_min / seg2_mag
    };

    if dist_ratio < pos_tol {
        let collapse = match interior {
            Some(flags) => flags[id_min],
            None => true,
        };
        if collapse {
            return SegSeg {
                intersects: false,
                point: verts[id_min],
                duplicate: true,
            };
        }
    }

    SegSeg {
        intersects: true,
        point: p,
        duplicate: false,
    }
}

/// Collapses polygon edges shorter than `len_tol` by dropping the second
/// vertex of each short edge.
///
/// Returns the compacted vertex list. Fewer than three surviving vertices
/// means the overlap degenerated; the caller reports zero area without an
/// error.
pub fn check_poly_segs(
    x: &[Scalar],
    y: &[Scalar],
    len_tol: Scalar,
) -> Result<(Vec<Scalar>, Vec<Scalar>), FaceGeomError> {
    let n = x.len();
    if n > MAX_OVERLAP_VERTS {
        return Err(FaceGeomError::VertexIndexExceedsOverlap);
    }

    let mut keep = vec![true; n];
    for i in 0..n {
        let j = (i + 1) % n;
        let mag = magnitude_2d(x[j] - x[i], y[j] - y[i]);
        if mag < len_tol {
            keep[j] = false;
        }
    }

    let xs: Vec<Scalar> = (0..n).filter(|&i| keep[i]).map(|i| x[i]).collect();
    let ys: Vec<Scalar> = (0..n).filter(|&i| keep[i]).map(|i| y[i]).collect();
    Ok((xs, ys))
}
