//! Linear finite-element evaluation on contact faces.
//!
//! Shape functions on the parent elements, the inverse isoparametric map
//! pulling physical points back to parent coordinates, the surface-Jacobian
//! determinant, and Galerkin interpolation of nodal fields at physical
//! points. Everything is linear: segment, 3-node triangle, 4-node quad.

use glam::{DVec2, DVec3};
use tactus_geom::projection::{global_to_local_2d, plane_basis, project_point_to_plane};
use tactus_types::Scalar;

/// Shape functions of the 2-node segment at parent coordinate `xi ∈ [-1, 1]`.
#[inline]
pub fn shape_segment(xi: Scalar) -> [Scalar; 2] {
    [0.5 * (1.0 - xi), 0.5 * (1.0 + xi)]
}

/// Shape functions of the linear triangle at parent `(xi, eta)`,
/// `xi, eta ≥ 0`, `xi + eta ≤ 1`.
#[inline]
pub fn shape_tri(xi: Scalar, eta: Scalar) -> [Scalar; 3] {
    [1.0 - xi - eta, xi, eta]
}

/// Shape functions of the bilinear quad at parent `(xi, eta) ∈ [-1, 1]²`.
#[inline]
pub fn shape_quad(xi: Scalar, eta: Scalar) -> [Scalar; 4] {
    [
        0.25 * (1.0 - xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 + eta),
        0.25 * (1.0 - xi) * (1.0 + eta),
    ]
}

/// Parent-coordinate derivatives of the bilinear quad shape functions:
/// `[dphi/dxi, dphi/deta]` per node.
#[inline]
pub fn dshape_quad(xi: Scalar, eta: Scalar) -> [[Scalar; 2]; 4] {
    [
        [-0.25 * (1.0 - eta), -0.25 * (1.0 - xi)],
        [0.25 * (1.0 - eta), -0.25 * (1.0 + xi)],
        [0.25 * (1.0 + eta), 0.25 * (1.0 + xi)],
        [-0.25 * (1.0 + eta), 0.25 * (1.0 - xi)],
    ]
}

/// Determinant of the surface Jacobian of the bilinear quad map at parent
/// `(xi, eta)`: the norm of the cross product of the two tangent vectors.
pub fn det_j_quad(xi: Scalar, eta: Scalar, verts: &[DVec3; 4]) -> Scalar {
    let d = dshape_quad(xi, eta);
    let mut t_xi = DVec3::ZERO;
    let mut t_eta = DVec3::ZERO;
    for a in 0..4 {
        t_xi += d[a][0] * verts[a];
        t_eta += d[a][1] * verts[a];
    }
    t_xi.cross(t_eta).length()
}

/// Inverse map of the linear triangle: parent `(xi, eta)` of the 2D point
/// `p`. Solved directly from the affine map.
pub fn inv_iso_tri(p: DVec2, verts: &[DVec2; 3]) -> (Scalar, Scalar) {
    let e1 = verts[1] - verts[0];
    let e2 = verts[2] - verts[0];
    let r = p - verts[0];

    let det = e1.x * e2.y - e2.x * e1.y;
    if det == 0.0 {
        return (0.0, 0.0);
    }
    let inv_det = 1.0 / det;
    let xi = inv_det * (r.x * e2.y - r.y * e2.x);
    let eta = inv_det * (e1.x * r.y - e1.y * r.x);
    (xi, eta)
}

/// Inverse map of the bilinear quad by Newton iteration: parent
/// `(xi, eta)` of the 2D point `p`.
///
/// The map is mildly nonlinear for non-parallelogram quads; a handful of
/// iterations reaches machine precision for any quad a contact face can
/// reasonably be.
pub fn inv_iso_quad(p: DVec2, verts: &[DVec2; 4]) -> (Scalar, Scalar) {
    let mut xi = 0.0;
    let mut eta = 0.0;

    for _ in 0..12 {
        let phi = shape_quad(xi, eta);
        let d = dshape_quad(xi, eta);

        let mut f = -p;
        let mut j00 = 0.0;
        let mut j01 = 0.0;
        let mut j10 = 0.0;
        let mut j11 = 0.0;
        for a in 0..4 {
            f += phi[a] * verts[a];
            j00 += d[a][0] * verts[a].x;
            j01 += d[a][1] * verts[a].x;
            j10 += d[a][0] * verts[a].y;
            j11 += d[a][1] * verts[a].y;
        }

        let det = j00 * j11 - j01 * j10;
        if det == 0.0 {
            break;
        }
        let inv_det = 1.0 / det;
        let dxi = -inv_det * (j11 * f.x - j01 * f.y);
        let deta = -inv_det * (-j10 * f.x + j00 * f.y);
        xi += dxi;
        eta += deta;

        if dxi.abs() < 1.0e-14 && deta.abs() < 1.0e-14 {
            break;
        }
    }
    (xi, eta)
}

/// Inverse map of the 2-node segment: parent `xi ∈ [-1, 1]` of the point
/// `p` (projected onto the segment direction).
pub fn inv_iso_segment(p: DVec3, a: DVec3, b: DVec3) -> Scalar {
    let lambda = b - a;
    let len2 = lambda.length_squared();
    if len2 == 0.0 {
        return 0.0;
    }
    let t = (p - a).dot(lambda) / len2; // t in [0, 1]
    2.0 * t - 1.0
}

/// Shape-function weights of a face, evaluated at a physical point lying
/// on (or near) the face.
///
/// The point is projected onto the face plane, expressed in a face-local
/// 2D frame, and pulled back through the inverse isoparametric map. The
/// first `num_verts` entries of the result are valid; they sum to one.
pub fn face_shape_weights(
    verts: &[DVec3; 4],
    num_verts: usize,
    face_normal: DVec3,
    point: DVec3,
) -> [Scalar; 4] {
    let mut phi = [0.0; 4];
    match num_verts {
        2 => {
            let xi = inv_iso_segment(point, verts[0], verts[1]);
            let s = shape_segment(xi);
            phi[..2].copy_from_slice(&s);
        }
        3 => {
            let (e1, e2) = plane_basis(face_normal);
            let p = project_point_to_plane(point, face_normal, verts[0]);
            let loc = global_to_local_2d(p, e1, e2, verts[0]);
            let v2 = [
                global_to_local_2d(verts[0], e1, e2, verts[0]),
                global_to_local_2d(verts[1], e1, e2, verts[0]),
                global_to_local_2d(verts[2], e1, e2, verts[0]),
            ];
            let (xi, eta) = inv_iso_tri(loc, &v2);
            let s = shape_tri(xi, eta);
            phi[..3].copy_from_slice(&s);
        }
        4 => {
            let (e1, e2) = plane_basis(face_normal);
            let p = project_point_to_plane(point, face_normal, verts[0]);
            let loc = global_to_local_2d(p, e1, e2, verts[0]);
            let v2 = [
                global_to_local_2d(verts[0], e1, e2, verts[0]),
                global_to_local_2d(verts[1], e1, e2, verts[0]),
                global_to_local_2d(verts[2], e1, e2, verts[0]),
                global_to_local_2d(verts[3], e1, e2, verts[0]),
            ];
            let (xi, eta) = inv_iso_quad(loc, &v2);
            phi = shape_quad(xi, eta);
        }
        _ => {}
    }
    phi
}

/// Galerkin interpolation of a nodal vector field at a physical point on a
/// face: `Σ_a φ_a(point) v_a`.
pub fn galerkin_eval(
    verts: &[DVec3; 4],
    num_verts: usize,
    face_normal: DVec3,
    point: DVec3,
    nodal: &[DVec3; 4],
) -> DVec3 {
    let phi = face_shape_weights(verts, num_verts, face_normal, point);
    let mut out = DVec3::ZERO;
    for a in 0..num_verts {
        out += phi[a] * nodal[a];
    }
    out
}
