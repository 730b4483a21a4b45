//! Convex overlap of two 2D polygons.
//!
//! This is the routine behind every contact-plane overlap: both faces have
//! already been projected onto the common plane and expressed in its local
//! basis; here their convex intersection polygon and its area are computed.

use glam::DVec2;
use tactus_types::constants::INTERIOR_VERTEX_DEDUP_TOL;
use tactus_types::{FaceGeomError, Scalar};

use crate::centroid::{poly_area_2d, vertex_avg_centroid_2d};
use crate::intersect::{check_poly_segs, point_in_face, segment_intersection_2d};
use crate::order::{check_poly_orientation, poly_reorder};
use crate::{MAX_FACE_VERTS, MAX_OVERLAP_VERTS};

/// A convex overlap polygon in the common-plane local frame.
#[derive(Debug, Clone, Default)]
pub struct Overlap2D {
    /// Local x coordinates, CCW.
    pub x: Vec<Scalar>,
    /// Local y coordinates, CCW.
    pub y: Vec<Scalar>,
    /// Overlap area; zero for collapsed or empty overlaps.
    pub area: Scalar,
}

impl Overlap2D {
    fn empty() -> Self {
        Self::default()
    }

    /// Number of overlap vertices.
    pub fn num_verts(&self) -> usize {
        self.x.len()
    }
}

/// Computes the convex overlap polygon of polygons A and B.
///
/// Both polygons must be ordered (CW or CCW); `orient_check` additionally
/// rejects non-CCW input. `pos_tol` is the vertex-collapse ratio for
/// segment intersections; `len_tol` the absolute short-edge collapse
/// length. A zero-area overlap (including one that degenerates below three
/// vertices) is a successful result, not an error.
pub fn intersection_2d_polygon(
    xa: &[Scalar],
    ya: &[Scalar],
    xb: &[Scalar],
    yb: &[Scalar],
    pos_tol: Scalar,
    len_tol: Scalar,
    orient_check: bool,
) -> Result<Overlap2D, FaceGeomError> {
    let na = xa.len();
    let nb = xb.len();

    if na < 3 || nb < 3 || na > MAX_FACE_VERTS || nb > MAX_FACE_VERTS {
        return Err(FaceGeomError::InvalidFaceInput);
    }

    if orient_check && (!check_poly_orientation(xa, ya) || !check_poly_orientation(xb, yb)) {
        return Err(FaceGeomError::FaceOrientation);
    }

    // centroids for the fan-based membership test
    let ca = vertex_avg_centroid_2d(xa, ya).ok_or(FaceGeomError::InvalidFaceInput)?;
    let cb = vertex_avg_centroid_2d(xb, yb).ok_or(FaceGeomError::InvalidFaceInput)?;

    // classify vertices of A in B and B in A
    let mut interior_a = [false; MAX_FACE_VERTS];
    let mut interior_b = [false; MAX_FACE_VERTS];
    let mut num_a_in = 0;
    for i in 0..na {
        if point_in_face(xa[i], ya[i], xb, yb, cb.x, cb.y) {
            interior_a[i] = true;
            num_a_in += 1;
        }
    }

    // all of A inside B: the overlap is A
    if num_a_in == na {
        return Ok(Overlap2D {
            x: xa.to_vec(),
            y: ya.to_vec(),
            area: poly_area_2d(xa, ya),
        });
    }

    let mut num_b_in = 0;
    for i in 0..nb {
        if point_in_face(xb[i], yb[i], xa, ya, ca.x, ca.y) {
            interior_b[i] = true;
            num_b_in += 1;
        }
    }

    // all of B inside A: the overlap is B
    if num_b_in == nb {
        return Ok(Overlap2D {
            x: xb.to_vec(),
            y: yb.to_vec(),
            area: poly_area_2d(xb, yb),
        });
    }

    // drop B-interior vertices coincident with an A-interior vertex
    for i in 0..na {
        if !interior_a[i] {
            continue;
        }
        for j in 0..nb {
            if interior_b[j] {
                let d = ((xa[i] - xb[j]).powi(2) + (ya[i] - yb[j]).powi(2)).sqrt();
                if d < INTERIOR_VERTEX_DEDUP_TOL {
                    interior_b[j] = false;
                    num_b_in -= 1;
                }
            }
        }
    }

    // segment-segment intersections between every edge pair
    const MAX_INTERSECTIONS: usize = MAX_FACE_VERTS * MAX_FACE_VERTS;
    let mut inter_pts: Vec<DVec2> = Vec::with_capacity(MAX_INTERSECTIONS);

    for ia in 0..na {
        let ja = (ia + 1) % na;
        for ib in 0..nb {
            let jb = (ib + 1) % nb;

            if inter_pts.len() > MAX_INTERSECTIONS {
                return Err(FaceGeomError::DegenerateOverlap);
            }

            let interior = [interior_a[ia], interior_a[ja], interior_b[ib], interior_b[jb]];
            let hit = segment_intersection_2d(
                DVec2::new(xa[ia], ya[ia]),
                DVec2::new(xa[ja], ya[ja]),
                DVec2::new(xb[ib], yb[ib]),
                DVec2::new(xb[jb], yb[jb]),
                Some(&interior),
                pos_tol,
            );
            if hit.intersects {
                inter_pts.push(hit.point);
            }
        }
    }

    // nothing interior and nothing crossing: disjoint polygons
    if inter_pts.is_empty() && num_a_in == 0 && num_b_in == 0 {
        return Ok(Overlap2D::empty());
    }

    // collect overlap vertices: intersections, then interior A, interior B
    let mut px: Vec<Scalar> = Vec::with_capacity(MAX_OVERLAP_VERTS);
    let mut py: Vec<Scalar> = Vec::with_capacity(MAX_OVERLAP_VERTS);
    for p in &inter_pts {
        px.push(p.x);
        py.push(p.y);
    }
    for i in 0..na {
        if interior_a[i] {
            if px.len() >= MAX_OVERLAP_VERTS + 2 * MAX_FACE_VERTS {
                return Err(FaceGeomError::VertexIndexExceedsOverlap);
            }
            px.push(xa[i]);
            py.push(ya[i]);
        }
    }
    for i in 0..nb {
        if interior_b[i] {
            if px.len() >= MAX_OVERLAP_VERTS + 2 * MAX_FACE_VERTS {
                return Err(FaceGeomError::VertexIndexExceedsOverlap);
            }
            px.push(xb[i]);
            py.push(yb[i]);
        }
    }

    if px.len() < 3 {
        // collapsed overlap, tolerated with zero area
        return Ok(Overlap2D::empty());
    }

    // order CCW and collapse short edges
    poly_reorder(&mut px, &mut py);
    let (fx, fy) = check_poly_segs(&px, &py, len_tol)?;

    if fx.len() < 3 {
        return Ok(Overlap2D::empty());
    }

    let area = poly_area_2d(&fx, &fy);
    Ok(Overlap2D { x: fx, y: fy, area })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS_TOL: Scalar = 1.0e-8;
    const LEN_TOL: Scalar = 1.0e-8;

    fn unit_square() -> ([Scalar; 4], [Scalar; 4]) {
        ([0.0, 1.0, 1.0, 0.0], [0.0, 0.0, 1.0, 1.0])
    }

    #[test]
    fn identical_squares_overlap_fully() {
        let (x, y) = unit_square();
        let ov = intersection_2d_polygon(&x, &y, &x, &y, POS_TOL, LEN_TOL, true).unwrap();
        assert!((ov.area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn contained_square_is_the_overlap() {
        let (x, y) = unit_square();
        let xs = [0.25, 0.75, 0.75, 0.25];
        let ys = [0.25, 0.25, 0.75, 0.75];
        let ov = intersection_2d_polygon(&xs, &ys, &x, &y, POS_TOL, LEN_TOL, true).unwrap();
        assert!((ov.area - 0.25).abs() < 1e-12);
        assert_eq!(ov.num_verts(), 4);
    }

    #[test]
    fn quarter_shifted_squares() {
        let (x, y) = unit_square();
        let xs = [0.25, 1.25, 1.25, 0.25];
        let ys = [0.25, 0.25, 1.25, 1.25];
        let ov = intersection_2d_polygon(&x, &y, &xs, &ys, POS_TOL, LEN_TOL, true).unwrap();
        assert_eq!(ov.num_verts(), 4);
        assert!((ov.area - 0.5625).abs() < 1e-10);
    }

    #[test]
    fn disjoint_squares_no_overlap() {
        let (x, y) = unit_square();
        let xs = [5.0, 6.0, 6.0, 5.0];
        let ys = [5.0, 5.0, 6.0, 6.0];
        let ov = intersection_2d_polygon(&x, &y, &xs, &ys, POS_TOL, LEN_TOL, true).unwrap();
        assert_eq!(ov.area, 0.0);
        assert_eq!(ov.num_verts(), 0);
    }

    #[test]
    fn overlap_is_symmetric() {
        let (x, y) = unit_square();
        let xs = [0.3, 1.4, 1.2, 0.1];
        let ys = [-0.2, 0.1, 1.1, 0.9];
        let ab = intersection_2d_polygon(&x, &y, &xs, &ys, POS_TOL, LEN_TOL, true).unwrap();
        let ba = intersection_2d_polygon(&xs, &ys, &x, &y, POS_TOL, LEN_TOL, true).unwrap();
        assert!((ab.area - ba.area).abs() < 1e-12);
        assert_eq!(ab.num_verts(), ba.num_verts());
    }

    #[test]
    fn area_monotone_under_containment() {
        // A ⊆ B implies overlap(A, C) ⊆ overlap(B, C) in area
        let xa = [0.2, 0.8, 0.8, 0.2];
        let ya = [0.2, 0.2, 0.8, 0.8];
        let (xb, yb) = unit_square();
        let xc = [0.5, 1.5, 1.5, 0.5];
        let yc = [0.5, 0.5, 1.5, 1.5];
        let ac = intersection_2d_polygon(&xa, &ya, &xc, &yc, POS_TOL, LEN_TOL, true).unwrap();
        let bc = intersection_2d_polygon(&xb, &yb, &xc, &yc, POS_TOL, LEN_TOL, true).unwrap();
        assert!(ac.area <= bc.area + 1e-12);
    }

    #[test]
    fn triangle_quad_overlap() {
        let (x, y) = unit_square();
        let xt = [0.5, 1.5, 1.5];
        let yt = [0.5, 0.0, 1.0];
        let ov = intersection_2d_polygon(&xt, &yt, &x, &y, POS_TOL, LEN_TOL, true).unwrap();
        assert!(ov.area > 0.0);
        assert!(ov.num_verts() >= 3);
    }

    #[test]
    fn degenerate_input_rejected() {
        let x = [0.0, 1.0];
        let y = [0.0, 0.0];
        let (xs, ys) = unit_square();
        let err = intersection_2d_polygon(&x, &y, &xs, &ys, POS_TOL, LEN_TOL, true);
        assert_eq!(err.unwrap_err(), FaceGeomError::InvalidFaceInput);
    }

    #[test]
    fn bad_orientation_rejected() {
        let xs = [0.0, 0.0, 1.0, 1.0]; // clockwise
        let ys = [0.0, 1.0, 1.0, 0.0];
        let (x, y) = unit_square();
        let err = intersection_2d_polygon(&xs, &ys, &x, &y, POS_TOL, LEN_TOL, true);
        assert_eq!(err.unwrap_err(), FaceGeomError::FaceOrientation);
    }
}
