//! Contact-plane construction: the per-pair geometric admissibility check.
//!
//! For a candidate face pair this decides whether the pair can interact,
//! builds the common plane bisecting the two faces, projects both faces
//! onto it, computes their convex overlap, and derives the signed gap. A
//! committed plane does not imply contact: planes are kept for proximate
//! pairs so the timestep vote can project velocities, and `in_contact`
//! records the gap-tolerance decision.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tactus_geom::centroid::centroid_2d;
use tactus_geom::intersect::check_poly_segs;
use tactus_geom::order::{check_poly_orientation, reverse_winding};
use tactus_geom::projection::{
    global_to_local_2d, local_2d_to_global, plane_basis, project_point_to_plane,
};
use tactus_geom::{intersection_2d_polygon, FaceGeomError};
use tactus_mesh::SurfaceMesh;
use tactus_types::Scalar;

use crate::pair::InterfacePair;

/// The common plane and overlap data of one admissible face pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPlane {
    /// Originating face id on mesh 1.
    pub face1: u32,
    /// Originating face id on mesh 2.
    pub face2: u32,
    /// Spatial dimension (2 or 3).
    pub dim: usize,

    /// Point on the common plane (midpoint of the face centroids).
    pub origin: DVec3,
    /// Unit normal of the common plane, along `n1 - n2`.
    pub normal: DVec3,
    /// First in-plane basis vector.
    pub e1: DVec3,
    /// Second in-plane basis vector (zero in 2D).
    pub e2: DVec3,

    /// Overlap polygon in common-plane local coordinates (2 vertices in
    /// 2D, up to 8 in 3D), CCW.
    pub overlap_local_x: Vec<Scalar>,
    pub overlap_local_y: Vec<Scalar>,
    /// Overlap polygon in global coordinates.
    pub overlap_x: Vec<Scalar>,
    pub overlap_y: Vec<Scalar>,
    pub overlap_z: Vec<Scalar>,

    /// Overlap area (overlap length in 2D).
    pub area: Scalar,
    /// Overlap centroid, global.
    pub centroid: DVec3,
    /// Overlap centroid projected onto face 1.
    pub cxf1: DVec3,
    /// Overlap centroid projected onto face 2.
    pub cxf2: DVec3,

    /// Signed gap along the common-plane normal; negative means
    /// interpenetration.
    pub gap: Scalar,
    /// The gap tolerance used for the contact decision.
    pub gap_tol: Scalar,
    /// True when the gap satisfies the contact criterion.
    pub in_contact: bool,
}

impl ContactPlane {
    /// Number of overlap vertices.
    pub fn num_overlap_verts(&self) -> usize {
        self.overlap_x.len()
    }
}

/// Geometric filtering knobs, extracted from the coupling scheme's
/// parameters so the kernel does not depend on the orchestrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeomFilter {
    /// Overlap edges shorter than this ratio of the larger face radius
    /// collapse; the same ratio drives the segment-intersection vertex
    /// collapse.
    pub len_collapse_ratio: Scalar,
    /// Overlaps below this fraction of the smaller face area are inactive.
    pub overlap_area_frac: Scalar,
    /// Gap tolerance as a ratio of the larger face radius; positive for
    /// the tied model (separation allowed), applied negated otherwise.
    pub gap_ratio: Scalar,
    /// True for the TIED model: contact within a positive gap band.
    pub tied: bool,
    /// True under the AUTO case: reject pairs whose interpenetration
    /// exceeds the thickness-scaled cutoff.
    pub auto_interpen_check: bool,
    /// Interpenetration cutoff as a fraction of the pair thickness sum.
    pub auto_interpen_frac: Scalar,
}

/// Runs the full geometric check for one candidate pair.
///
/// Returns `Ok(Some(plane))` for admissible pairs, `Ok(None)` for pairs
/// filtered out (wrong orientation, no overlap, pass-through), and a
/// tagged [`FaceGeomError`] for degenerate geometry. Errors never abort
/// the cycle; the caller tallies them and drops the pair.
pub fn check_interface_pair(
    pair: &InterfacePair,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    filter: &GeomFilter,
) -> Result<Option<ContactPlane>, FaceGeomError> {
    let f1 = pair.face1 as usize;
    let f2 = pair.face2 as usize;

    let n1 = mesh1.face_normal(f1);
    let n2 = mesh2.face_normal(f2);

    // orientation filter: meaningful contact needs opposing normals
    if n1.dot(n2) >= 0.0 {
        return Ok(None);
    }

    let c1 = mesh1.face_centroid(f1);
    let c2 = mesh2.face_centroid(f2);
    let normal = (n1 - n2).normalize_or_zero();
    if normal == DVec3::ZERO {
        return Err(FaceGeomError::InvalidFaceInput);
    }
    let origin = 0.5 * (c1 + c2);

    let r_max = mesh1.face_radius_of(f1).max(mesh2.face_radius_of(f2));
    let len_tol = filter.len_collapse_ratio * r_max;

    if mesh1.dim() == 2 {
        check_pair_2d(pair, mesh1, mesh2, filter, normal, origin, len_tol)
    } else {
        check_pair_3d(pair, mesh1, mesh2, filter, normal, origin, len_tol)
    }
}

fn gap_tolerance(filter: &GeomFilter, mesh1: &SurfaceMesh, f1: usize, mesh2: &SurfaceMesh, f2: usize) -> Scalar {
    let r_max = mesh1.face_radius_of(f1).max(mesh2.face_radius_of(f2));
    if filter.tied {
        filter.gap_ratio * r_max
    } else {
        -filter.gap_ratio * r_max
    }
}

/// Contact decision plus the AUTO pass-through cull. Returns `None` when
/// the pair must be dropped entirely.
fn decide_contact(
    filter: &GeomFilter,
    gap: Scalar,
    gap_tol: Scalar,
    t1: Option<Scalar>,
    t2: Option<Scalar>,
) -> Option<bool> {
    let in_contact = gap < gap_tol;

    if filter.auto_interpen_check && in_contact && gap < 0.0 {
        // interpenetration beyond a thickness fraction is pass-through
        // geometry, not contact
        if let (Some(t1), Some(t2)) = (t1, t2) {
            if -gap > filter.auto_interpen_frac * (t1 + t2) {
                return None;
            }
        }
    }
    Some(in_contact)
}

#[allow(clippy::too_many_arguments)]
fn check_pair_3d(
    pair: &InterfacePair,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    filter: &GeomFilter,
    normal: DVec3,
    origin: DVec3,
    len_tol: Scalar,
) -> Result<Option<ContactPlane>, FaceGeomError> {
    let f1 = pair.face1 as usize;
    let f2 = pair.face2 as usize;
    let v1 = mesh1.nodes_per_face();
    let v2 = mesh2.nodes_per_face();

    let (e1, e2) = plane_basis(normal);

    // project both faces onto the common plane, in local coordinates
    let mut x1l = [0.0; 4];
    let mut y1l = [0.0; 4];
    for a in 0..v1 {
        let p = project_point_to_plane(mesh1.face_vertex(f1, a), normal, origin);
        let loc = global_to_local_2d(p, e1, e2, origin);
        x1l[a] = loc.x;
        y1l[a] = loc.y;
    }
    let mut x2l = [0.0; 4];
    let mut y2l = [0.0; 4];
    for a in 0..v2 {
        let p = project_point_to_plane(mesh2.face_vertex(f2, a), normal, origin);
        let loc = global_to_local_2d(p, e1, e2, origin);
        x2l[a] = loc.x;
        y2l[a] = loc.y;
    }

    // face 2 projects with opposite winding (its normal opposes the common
    // plane normal); restore CCW order for both before clipping
    if !check_poly_orientation(&x1l[..v1], &y1l[..v1]) {
        reverse_winding(&mut x1l[..v1], &mut y1l[..v1]);
    }
    if !check_poly_orientation(&x2l[..v2], &y2l[..v2]) {
        reverse_winding(&mut x2l[..v2], &mut y2l[..v2]);
    }

    let overlap = intersection_2d_polygon(
        &x1l[..v1],
        &y1l[..v1],
        &x2l[..v2],
        &y2l[..v2],
        filter.len_collapse_ratio,
        len_tol,
        true,
    )?;

    let min_area = filter.overlap_area_frac * mesh1.face_area_of(f1).min(mesh2.face_area_of(f2));
    if overlap.num_verts() < 3 || overlap.area < min_area {
        return Ok(None);
    }

    // overlap centroid, local then global
    let c_loc = centroid_2d(&overlap.x, &overlap.y).ok_or(FaceGeomError::DegenerateOverlap)?;
    let centroid = local_2d_to_global(c_loc, e1, e2, origin);

    let overlap_global: Vec<DVec3> = overlap
        .x
        .iter()
        .zip(overlap.y.iter())
        .map(|(&x, &y)| local_2d_to_global(DVec2::new(x, y), e1, e2, origin))
        .collect();

    // project the overlap centroid onto each face plane
    let cxf1 = project_point_to_plane(centroid, mesh1.face_normal(f1), mesh1.face_centroid(f1));
    let cxf2 = project_point_to_plane(centroid, mesh2.face_normal(f2), mesh2.face_centroid(f2));

    let gap = (cxf2 - cxf1).dot(normal);
    let gap_tol = gap_tolerance(filter, mesh1, f1, mesh2, f2);

    let Some(in_contact) = decide_contact(
        filter,
        gap,
        gap_tol,
        mesh1.thickness_of(f1),
        mesh2.thickness_of(f2),
    ) else {
        return Ok(None);
    };

    Ok(Some(ContactPlane {
        face1: pair.face1,
        face2: pair.face2,
        dim: 3,
        origin,
        normal,
        e1,
        e2,
        overlap_local_x: overlap.x,
        overlap_local_y: overlap.y,
        overlap_x: overlap_global.iter().map(|p| p.x).collect(),
        overlap_y: overlap_global.iter().map(|p| p.y).collect(),
        overlap_z: overlap_global.iter().map(|p| p.z).collect(),
        area: overlap.area,
        centroid,
        cxf1,
        cxf2,
        gap,
        gap_tol,
        in_contact,
    }))
}

#[allow(clippy::too_many_arguments)]
fn check_pair_2d(
    pair: &InterfacePair,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    filter: &GeomFilter,
    normal: DVec3,
    origin: DVec3,
    len_tol: Scalar,
) -> Result<Option<ContactPlane>, FaceGeomError> {
    let f1 = pair.face1 as usize;
    let f2 = pair.face2 as usize;

    // in-line direction of the common plane (2D): normal rotated by 90°
    let e1 = DVec3::new(-normal.y, normal.x, 0.0);

    // segment endpoints as 1D intervals along e1
    let mut s1 = [0.0; 2];
    let mut s2 = [0.0; 2];
    for a in 0..2 {
        let p1 = project_point_to_plane(mesh1.face_vertex(f1, a), normal, origin);
        s1[a] = (p1 - origin).dot(e1);
        let p2 = project_point_to_plane(mesh2.face_vertex(f2, a), normal, origin);
        s2[a] = (p2 - origin).dot(e1);
    }
    let (lo1, hi1) = (s1[0].min(s1[1]), s1[0].max(s1[1]));
    let (lo2, hi2) = (s2[0].min(s2[1]), s2[0].max(s2[1]));

    if hi1 - lo1 < len_tol || hi2 - lo2 < len_tol {
        return Err(FaceGeomError::InvalidFaceInput);
    }

    let lo = lo1.max(lo2);
    let hi = hi1.min(hi2);
    let length = hi - lo;

    let min_len = filter.overlap_area_frac * mesh1.face_area_of(f1).min(mesh2.face_area_of(f2));
    if length <= len_tol.max(min_len) {
        return Ok(None);
    }

    // drop degenerate "interval" bookkeeping through the shared collapse
    // helper so tolerance behavior matches 3D
    let (xs, _) = check_poly_segs(&[lo, hi], &[0.0, 0.0], len_tol)?;
    if xs.len() < 2 {
        return Ok(None);
    }

    let c_loc = 0.5 * (lo + hi);
    let centroid = origin + c_loc * e1;

    let cxf1 = project_point_to_plane(centroid, mesh1.face_normal(f1), mesh1.face_centroid(f1));
    let cxf2 = project_point_to_plane(centroid, mesh2.face_normal(f2), mesh2.face_centroid(f2));

    let gap = (cxf2 - cxf1).dot(normal);
    let gap_tol = gap_tolerance(filter, mesh1, f1, mesh2, f2);

    let Some(in_contact) = decide_contact(
        filter,
        gap,
        gap_tol,
        mesh1.thickness_of(f1),
        mesh2.thickness_of(f2),
    ) else {
        return Ok(None);
    };

    let p_lo = origin + lo * e1;
    let p_hi = origin + hi * e1;

    Ok(Some(ContactPlane {
        face1: pair.face1,
        face2: pair.face2,
        dim: 2,
        origin,
        normal,
        e1,
        e2: DVec3::ZERO,
        overlap_local_x: vec![lo, hi],
        overlap_local_y: vec![0.0, 0.0],
        overlap_x: vec![p_lo.x, p_hi.x],
        overlap_y: vec![p_lo.y, p_hi.y],
        overlap_z: vec![0.0, 0.0],
        area: length,
        centroid,
        cxf1,
        cxf2,
        gap,
        gap_tol,
        in_contact,
    }))
}
