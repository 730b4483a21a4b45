//! Quadrature rules for mortar integration.

use glam::DVec3;
use tactus_types::Scalar;

/// 2x2 Gauss rule on the parent square `[-1, 1]²`: `((xi, eta), weight)`
/// per point. Exact for bilinear-times-bilinear integrands on affine maps.
pub fn gauss_2x2() -> [((Scalar, Scalar), Scalar); 4] {
    let g = 1.0 / (3.0 as Scalar).sqrt();
    [
        ((-g, -g), 1.0),
        ((g, -g), 1.0),
        ((g, g), 1.0),
        ((-g, g), 1.0),
    ]
}

/// Edge-midpoint rule on the triangle in barycentric coordinates:
/// `([l0, l1, l2], weight)` per point, weights summing to one. Degree-2
/// exact; the weight multiplies the physical triangle area.
pub fn tri_midpoint_rule() -> [([Scalar; 3], Scalar); 3] {
    let h = 0.5;
    let w = 1.0 / 3.0;
    [
        ([h, h, 0.0], w),
        ([0.0, h, h], w),
        ([h, 0.0, h], w),
    ]
}

/// A quadrature point on an overlap polygon in physical coordinates.
#[derive(Debug, Clone, Copy)]
pub struct OverlapQuadPoint {
    /// Physical position of the integration point.
    pub point: DVec3,
    /// Its weight, already including the surface Jacobian (so summing the
    /// weights recovers the overlap area).
    pub weight: Scalar,
}

/// Generates integration points over a convex overlap polygon by
/// triangulating it about a pivot (its area centroid) and applying the
/// triangle rule per slice.
pub fn overlap_quadrature(poly: &[DVec3], pivot: DVec3) -> Vec<OverlapQuadPoint> {
    let n = poly.len();
    let mut points = Vec::with_capacity(3 * n);
    if n < 3 {
        return points;
    }

    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let area = 0.5 * (b - a).cross(pivot - a).length();
        if area == 0.0 {
            continue;
        }
        for (bary, w) in tri_midpoint_rule() {
            points.push(OverlapQuadPoint {
                point: bary[0] * a + bary[1] * b + bary[2] * pivot,
                weight: w * area,
            });
        }
    }
    points
}

/// Integration points along a 2D overlap segment (two endpoints), using
/// the 2-point Gauss rule on the segment.
pub fn segment_quadrature(p0: DVec3, p1: DVec3) -> Vec<OverlapQuadPoint> {
    let g = 1.0 / (3.0 as Scalar).sqrt();
    let mid = 0.5 * (p0 + p1);
    let half = 0.5 * (p1 - p0);
    let half_len = half.length();
    vec![
        OverlapQuadPoint {
            point: mid - g * half,
            weight: half_len,
        },
        OverlapQuadPoint {
            point: mid + g * half,
            weight: half_len,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_rule_weights_sum_to_area() {
        let poly = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        let pivot = DVec3::new(1.0, 0.5, 0.0);
        let pts = overlap_quadrature(&poly, pivot);
        let total: Scalar = pts.iter().map(|p| p.weight).sum();
        assert!((total - 2.0).abs() < 1e-13);
    }

    #[test]
    fn segment_rule_weights_sum_to_length() {
        let pts = segment_quadrature(DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0));
        let total: Scalar = pts.iter().map(|p| p.weight).sum();
        assert!((total - 5.0).abs() < 1e-13);
    }
}
