//! Polygon centroids and areas.

use glam::{DVec2, DVec3};
use tactus_types::Scalar;

/// Vertex-averaged centroid of a 2D vertex set. Fails on an empty set.
pub fn vertex_avg_centroid_2d(x: &[Scalar], y: &[Scalar]) -> Option<DVec2> {
    let n = x.len();
    if n == 0 || y.len() != n {
        return None;
    }
    let fac = 1.0 / n as Scalar;
    let cx: Scalar = x.iter().sum::<Scalar>() * fac;
    let cy: Scalar = y.iter().sum::<Scalar>() * fac;
    Some(DVec2::new(cx, cy))
}

/// Vertex-averaged centroid of a 3D vertex set. Fails on an empty set.
pub fn vertex_avg_centroid_3d(x: &[Scalar], y: &[Scalar], z: &[Scalar]) -> Option<DVec3> {
    let n = x.len();
    if n == 0 || y.len() != n || z.len() != n {
        return None;
    }
    let fac = 1.0 / n as Scalar;
    Some(DVec3::new(
        x.iter().sum::<Scalar>() * fac,
        y.iter().sum::<Scalar>() * fac,
        z.iter().sum::<Scalar>() * fac,
    ))
}

/// Area of the triangle `a`, `b`, `c` in 3D.
#[inline]
pub fn tri_area_3d(a: DVec3, b: DVec3, c: DVec3) -> Scalar {
    0.5 * (b - a).cross(c - a).length().abs()
}

/// Area-weighted centroid of a planar 3D polygon.
///
/// The polygon is triangulated about its vertex-averaged centroid and each
/// triangle contributes its own centroid weighted by area. Fails for fewer
/// than three vertices or a zero-area polygon.
pub fn poly_area_centroid_3d(x: &[Scalar], y: &[Scalar], z: &[Scalar]) -> Option<DVec3> {
    let n = x.len();
    if n < 3 {
        return None;
    }
    let pivot = vertex_avg_centroid_3d(x, y, z)?;

    let mut weighted = DVec3::ZERO;
    let mut area_sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let a = DVec3::new(x[i], y[i], z[i]);
        let b = DVec3::new(x[j], y[j], z[j]);
        let area = tri_area_3d(a, b, pivot);
        weighted += (a + b + pivot) / 3.0 * area;
        area_sum += area;
    }

    if area_sum == 0.0 {
        return None;
    }
    Some(weighted / area_sum)
}

/// Area of a 2D polygon with vertices in any rotational order.
///
/// Triangulates about the vertex-averaged centroid and sums absolute
/// triangle areas, so consistent CW or CCW input both work.
pub fn poly_area_2d(x: &[Scalar], y: &[Scalar]) -> Scalar {
    let n = x.len();
    let Some(c) = vertex_avg_centroid_2d(x, y) else {
        return 0.0;
    };

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += (0.5 * (x[i] * (y[j] - c.y) + x[j] * (c.y - y[i]) + c.x * (y[i] - y[j]))).abs();
    }
    area
}

/// Shoelace centroid of a simple 2D polygon with ordered vertices.
///
/// Falls back to the vertex average for (near) zero-area polygons, where
/// the shoelace formula divides by zero.
pub fn centroid_2d(x: &[Scalar], y: &[Scalar]) -> Option<DVec2> {
    let n = x.len();
    if n == 0 {
        return None;
    }
    if n < 3 {
        return vertex_avg_centroid_2d(x, y);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = x[i] * y[j] - x[j] * y[i];
        cx += (x[i] + x[j]) * cross;
        cy += (y[i] + y[j]) * cross;
        twice_area += cross;
    }

    if twice_area.abs() < 1.0e-300 {
        return vertex_avg_centroid_2d(x, y);
    }
    let fac = 1.0 / (3.0 * twice_area);
    Some(DVec2::new(cx * fac, cy * fac))
}
