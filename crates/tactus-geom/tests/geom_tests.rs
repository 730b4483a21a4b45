//! Integration tests for tactus-geom.

use approx::assert_relative_eq;
use glam::{DVec2, DVec3};
use tactus_geom::projection::plane_basis;
use tactus_geom::*;

// ─── Projection Round Trips ───────────────────────────────────

#[test]
fn plane_projection_round_trip() {
    let n = DVec3::new(1.0, 2.0, -0.5).normalize();
    let origin = DVec3::new(0.3, -1.0, 2.0);
    let p = DVec3::new(4.0, 5.0, -3.0);

    let proj = project_point_to_plane(p, n, origin);
    // the projection lies in the plane
    assert_relative_eq!((proj - origin).dot(n), 0.0, epsilon = 1e-12);

    // walking back along the normal through the projection recovers p
    let dist = (p - origin).dot(n);
    let back = proj + dist * n;
    assert_relative_eq!((back - p).length(), 0.0, epsilon = 1e-12);
}

#[test]
fn line_projection_stays_on_line() {
    let n = DVec2::new(0.0, 1.0);
    let origin = DVec2::new(0.0, 2.0);
    let p = DVec2::new(3.0, 7.0);
    let proj = project_point_to_line(p, n, origin);
    assert_relative_eq!(proj.y, 2.0, epsilon = 1e-14);
    assert_relative_eq!(proj.x, 3.0, epsilon = 1e-14);
}

#[test]
fn local_global_round_trip() {
    let n = DVec3::new(0.2, -0.3, 0.93).normalize();
    let (e1, e2) = plane_basis(n);
    let c = DVec3::new(1.0, 2.0, 3.0);

    // a point in the plane
    let p = c + 1.7 * e1 - 0.4 * e2;
    let loc = global_to_local_2d(p, e1, e2, c);
    let back = local_2d_to_global(loc, e1, e2, c);
    assert_relative_eq!((back - p).length(), 0.0, epsilon = 1e-13);
    assert_relative_eq!(loc.x, 1.7, epsilon = 1e-13);
    assert_relative_eq!(loc.y, -0.4, epsilon = 1e-13);
}

#[test]
fn plane_basis_is_orthonormal() {
    for n in [
        DVec3::X,
        DVec3::Y,
        DVec3::Z,
        DVec3::new(1.0, 1.0, 1.0).normalize(),
        DVec3::new(-0.1, 0.9, 0.2).normalize(),
    ] {
        let (e1, e2) = plane_basis(n);
        assert_relative_eq!(e1.length(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(e2.length(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(e1.dot(e2), 0.0, epsilon = 1e-14);
        assert_relative_eq!(e1.dot(n), 0.0, epsilon = 1e-14);
        assert_relative_eq!(e2.dot(n), 0.0, epsilon = 1e-14);
    }
}

// ─── Line/Plane Intersection ──────────────────────────────────

#[test]
fn segment_crosses_plane() {
    let hit = line_plane_intersection(
        DVec3::new(0.0, 0.0, -1.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::ZERO,
        DVec3::Z,
    );
    assert_eq!(hit, LinePlaneHit::Point(DVec3::ZERO));
}

#[test]
fn segment_in_plane_has_no_unique_intersection() {
    let hit = line_plane_intersection(
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::ZERO,
        DVec3::Z,
    );
    assert_eq!(hit, LinePlaneHit::InPlane);
}

#[test]
fn segment_short_of_plane_misses() {
    let hit = line_plane_intersection(
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(0.0, 0.0, 2.0),
        DVec3::ZERO,
        DVec3::Z,
    );
    assert_eq!(hit, LinePlaneHit::Miss);
}

// ─── Centroids and Areas ──────────────────────────────────────

#[test]
fn area_weighted_centroid_of_square() {
    let x = [0.0, 2.0, 2.0, 0.0];
    let y = [0.0, 0.0, 2.0, 2.0];
    let z = [0.5, 0.5, 0.5, 0.5];
    let c = poly_area_centroid_3d(&x, &y, &z).unwrap();
    assert_relative_eq!(c.x, 1.0, epsilon = 1e-14);
    assert_relative_eq!(c.y, 1.0, epsilon = 1e-14);
    assert_relative_eq!(c.z, 0.5, epsilon = 1e-14);
}

#[test]
fn area_weighted_centroid_needs_three_verts() {
    let x = [0.0, 1.0];
    let y = [0.0, 0.0];
    let z = [0.0, 0.0];
    assert!(poly_area_centroid_3d(&x, &y, &z).is_none());
}

#[test]
fn polygon_area_any_vertex_order() {
    let ccw_x = [0.0, 1.0, 1.0, 0.0];
    let ccw_y = [0.0, 0.0, 1.0, 1.0];
    let cw_x = [0.0, 0.0, 1.0, 1.0];
    let cw_y = [0.0, 1.0, 1.0, 0.0];
    assert_relative_eq!(poly_area_2d(&ccw_x, &ccw_y), 1.0, epsilon = 1e-14);
    assert_relative_eq!(poly_area_2d(&cw_x, &cw_y), 1.0, epsilon = 1e-14);
}

#[test]
fn shoelace_centroid_matches_symmetry() {
    let x = [0.0, 4.0, 4.0, 0.0];
    let y = [0.0, 0.0, 2.0, 2.0];
    let c = centroid_2d(&x, &y).unwrap();
    assert_relative_eq!(c.x, 2.0, epsilon = 1e-14);
    assert_relative_eq!(c.y, 1.0, epsilon = 1e-14);
}

// ─── Reordering ───────────────────────────────────────────────

#[test]
fn reorder_is_idempotent_on_ccw_polygons() {
    let x0 = [0.0, 1.0, 1.0, 0.0];
    let y0 = [0.0, 0.0, 1.0, 1.0];
    let mut x = x0;
    let mut y = y0;
    assert!(poly_reorder(&mut x, &mut y));
    // vertex 0 anchors the ordering, so an already-CCW polygon starting at
    // the same vertex is unchanged
    assert_eq!(x, x0);
    assert_eq!(y, y0);

    // a second application changes nothing either
    let (x1, y1) = (x, y);
    poly_reorder(&mut x, &mut y);
    assert_eq!(x, x1);
    assert_eq!(y, y1);
}

#[test]
fn reorder_recovers_shuffled_hexagon() {
    // regular hexagon vertices, shuffled
    let ordered: Vec<(f64, f64)> = (0..6)
        .map(|i| {
            let t = std::f64::consts::PI / 3.0 * i as f64;
            (t.cos(), t.sin())
        })
        .collect();
    let perm = [0usize, 3, 1, 5, 2, 4];
    let mut x: Vec<f64> = perm.iter().map(|&i| ordered[i].0).collect();
    let mut y: Vec<f64> = perm.iter().map(|&i| ordered[i].1).collect();

    assert!(poly_reorder(&mut x, &mut y));
    assert!(check_poly_orientation(&x, &y));
    let area = poly_area_2d(&x, &y);
    assert_relative_eq!(area, 1.5 * 3.0_f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn winding_fix_against_normal() {
    let mut x = [0.0, 0.0, 1.0];
    let mut y = [0.0, 1.0, 0.0];
    let mut z = [0.0, 0.0, 0.0];
    // implied normal is -Z; fixing against +Z reverses the winding
    poly_reorder_with_normal(&mut x, &mut y, &mut z, DVec3::Z);
    let v0 = DVec3::new(x[0], y[0], z[0]);
    let v1 = DVec3::new(x[1], y[1], z[1]);
    let v2 = DVec3::new(x[2], y[2], z[2]);
    assert!((v1 - v0).cross(v2 - v0).z > 0.0);
}

// ─── Overlap Properties ───────────────────────────────────────

#[test]
fn overlap_point_set_symmetry() {
    let xa = [0.0, 1.0, 1.0, 0.0];
    let ya = [0.0, 0.0, 1.0, 1.0];
    let xb = [0.5, 1.5, 1.5, 0.5];
    let yb = [-0.5, -0.5, 0.5, 0.5];

    let ab = intersection_2d_polygon(&xa, &ya, &xb, &yb, 1e-8, 1e-8, true).unwrap();
    let ba = intersection_2d_polygon(&xb, &yb, &xa, &ya, 1e-8, 1e-8, true).unwrap();

    assert_relative_eq!(ab.area, ba.area, epsilon = 1e-12);

    // same vertex set up to rotation/order
    let mut pts_ab: Vec<(i64, i64)> = ab
        .x
        .iter()
        .zip(ab.y.iter())
        .map(|(&x, &y)| ((x * 1e12).round() as i64, (y * 1e12).round() as i64))
        .collect();
    let mut pts_ba: Vec<(i64, i64)> = ba
        .x
        .iter()
        .zip(ba.y.iter())
        .map(|(&x, &y)| ((x * 1e12).round() as i64, (y * 1e12).round() as i64))
        .collect();
    pts_ab.sort_unstable();
    pts_ba.sort_unstable();
    assert_eq!(pts_ab, pts_ba);
}

#[test]
fn overlap_output_is_convex_ccw() {
    let xa = [0.0, 1.0, 1.0, 0.0];
    let ya = [0.0, 0.0, 1.0, 1.0];
    let xb = [0.3, 1.3, 1.3, 0.3];
    let yb = [0.3, 0.3, 1.3, 1.3];
    let ov = intersection_2d_polygon(&xa, &ya, &xb, &yb, 1e-8, 1e-8, true).unwrap();
    assert!(check_poly_orientation(&ov.x, &ov.y));
}
