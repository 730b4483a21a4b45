//! Point/plane projections and the common-plane local basis transforms.

use glam::{DVec2, DVec3};
use tactus_types::Scalar;

/// Projects a point onto the plane through `origin` with unit `normal`.
#[inline]
pub fn project_point_to_plane(p: DVec3, normal: DVec3, origin: DVec3) -> DVec3 {
    let dist = (p - origin).dot(normal);
    p - dist * normal
}

/// Projects a 2D point onto the line through `origin` with unit `normal`.
#[inline]
pub fn project_point_to_line(p: DVec2, normal: DVec2, origin: DVec2) -> DVec2 {
    let dist = (p - origin).dot(normal);
    p - dist * normal
}

/// Expresses an in-plane point in the local `{e1, e2}` basis anchored at `c`.
///
/// The out-of-plane component is assumed (not checked) to be zero; callers
/// project first.
#[inline]
pub fn global_to_local_2d(p: DVec3, e1: DVec3, e2: DVec3, c: DVec3) -> DVec2 {
    let v = p - c;
    DVec2::new(v.dot(e1), v.dot(e2))
}

/// Maps local `{e1, e2}` coordinates back to a global point.
///
/// Exact inverse of [`global_to_local_2d`] for orthonormal `{e1, e2}`.
#[inline]
pub fn local_2d_to_global(loc: DVec2, e1: DVec3, e2: DVec3, c: DVec3) -> DVec3 {
    c + loc.x * e1 + loc.y * e2
}

/// Result of intersecting a segment with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinePlaneHit {
    /// The segment crosses the plane at this point.
    Point(DVec3),
    /// The segment lies in the plane; no unique intersection exists.
    InPlane,
    /// The segment (or its span) does not reach the plane.
    Miss,
}

/// Intersects the segment `a`→`b` with the plane through `plane_pt` with
/// unit normal `n`. Only parameters in `[0, 1]` count as hits.
pub fn line_plane_intersection(a: DVec3, b: DVec3, plane_pt: DVec3, n: DVec3) -> LinePlaneHit {
    let lambda = b - a;
    let prod = lambda.dot(n);

    if prod == 0.0 {
        return LinePlaneHit::InPlane;
    }

    let t = (plane_pt - a).dot(n) / prod;
    if (0.0..=1.0).contains(&t) {
        LinePlaneHit::Point(a + lambda * t)
    } else {
        LinePlaneHit::Miss
    }
}

/// Builds an orthonormal in-plane basis `{e1, e2}` for unit normal `n`.
///
/// The seed axis is the global axis least aligned with `n`, so the basis is
/// well conditioned for any plane orientation.
pub fn plane_basis(n: DVec3) -> (DVec3, DVec3) {
    let ax = n.x.abs();
    let ay = n.y.abs();
    let az = n.z.abs();
    let seed = if ax <= ay && ax <= az {
        DVec3::X
    } else if ay <= az {
        DVec3::Y
    } else {
        DVec3::Z
    };
    let e1 = n.cross(seed).normalize();
    let e2 = n.cross(e1);
    (e1, e2)
}

/// Magnitude helper matching the scalar channels used throughout.
#[inline]
pub(crate) fn magnitude_2d(dx: Scalar, dy: Scalar) -> Scalar {
    (dx * dx + dy * dy).sqrt()
}
