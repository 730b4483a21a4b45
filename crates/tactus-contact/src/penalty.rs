//! Common-plane penalty enforcement.
//!
//! For each plane in contact, a spring force proportional to the gap acts
//! along the common-plane normal, distributed to the face vertices through
//! the linear shape functions evaluated at the overlap centroid's
//! projection onto each face. Face 1 and face 2 receive equal and opposite
//! totals.
//!
//! Force computation is read-only and data-parallel; scattering into the
//! response channels is a separate single-writer pass, which also lets
//! single-mesh (auto) contact scatter both sides into one mesh.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tactus_exec::{filter_map_all, ExecMode};
use tactus_mesh::SurfaceMesh;
use tactus_types::Scalar;
use tracing::debug;

use crate::fe::face_shape_weights;
use crate::plane::ContactPlane;

/// How the effective penalty stiffness of a face pair is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KinematicPenalty {
    /// User-supplied constant stiffness per mesh; the pair uses the mean.
    Constant,
    /// Stiffness from the supporting elements:
    /// `k = k_mat * area / t_eff` with `t_eff = t1*t2/(t1 + t2)` the
    /// harmonic element-thickness mean and `k_mat` the mean of the two
    /// registered bulk moduli.
    ElementWise,
}

/// Per-cycle summary of the penalty kernel.
#[derive(Debug, Clone, Default)]
pub struct PenaltyResult {
    /// Planes that produced forces.
    pub applied_count: usize,
    /// Magnitude of the largest single-plane normal force.
    pub max_force: Scalar,
}

/// Nodal force contributions of one plane, ready to scatter.
#[derive(Debug, Clone)]
pub struct PlaneForces {
    pub face1: usize,
    pub face2: usize,
    /// Per-vertex forces on face 1.
    pub f1: [DVec3; 4],
    /// Per-vertex forces on face 2 (equal and opposite total).
    pub f2: [DVec3; 4],
    /// Normal force magnitude.
    pub magnitude: Scalar,
}

/// Effective spring rate of the pair, already including the overlap area.
fn pair_stiffness(
    kinematic: KinematicPenalty,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    plane: &ContactPlane,
) -> Option<Scalar> {
    let f1 = plane.face1 as usize;
    let f2 = plane.face2 as usize;
    match kinematic {
        KinematicPenalty::Constant => {
            let k1 = mesh1.constant_penalty?;
            let k2 = mesh2.constant_penalty?;
            Some(0.5 * (k1 + k2) * plane.area)
        }
        KinematicPenalty::ElementWise => {
            let t1 = mesh1.thickness_of(f1)?;
            let t2 = mesh2.thickness_of(f2)?;
            let k1 = mesh1.bulk_modulus.get(f1)?;
            let k2 = mesh2.bulk_modulus.get(f2)?;
            let t_eff = t1 * t2 / (t1 + t2);
            Some(0.5 * (k1 + k2) * plane.area / t_eff)
        }
    }
}

fn face_verts(mesh: &SurfaceMesh, f: usize) -> [DVec3; 4] {
    let (x, y, z) = mesh.face_coords(f);
    [
        DVec3::new(x[0], y[0], z[0]),
        DVec3::new(x[1], y[1], z[1]),
        DVec3::new(x[2], y[2], z[2]),
        DVec3::new(x[3], y[3], z[3]),
    ]
}

/// Computes penalty force contributions for all active planes.
///
/// Under the frictionless model only interpenetrating planes (negative
/// gap) produce forces; `tied` extends this to positive gaps, producing
/// the cohesive force that binds the surfaces.
pub fn compute_common_plane_forces(
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    planes: &[ContactPlane],
    kinematic: KinematicPenalty,
    tied: bool,
    mode: ExecMode,
) -> Vec<PlaneForces> {
    filter_map_all(mode, planes.len(), |i| {
        let plane = &planes[i];
        if !plane.in_contact {
            return None;
        }
        // frictionless contact only resists interpenetration
        if !tied && plane.gap >= 0.0 {
            return None;
        }

        let k = pair_stiffness(kinematic, mesh1, mesh2, plane)?;
        // signed: negative gap pushes the faces apart, positive (tied)
        // pulls them together
        let fn_vec = k * plane.gap * plane.normal;

        let f1 = plane.face1 as usize;
        let f2 = plane.face2 as usize;
        let v1 = mesh1.nodes_per_face();
        let v2 = mesh2.nodes_per_face();

        let verts1 = face_verts(mesh1, f1);
        let verts2 = face_verts(mesh2, f2);

        let phi1 = face_shape_weights(&verts1, v1, mesh1.face_normal(f1), plane.cxf1);
        let phi2 = face_shape_weights(&verts2, v2, mesh2.face_normal(f2), plane.cxf2);

        let mut out = PlaneForces {
            face1: f1,
            face2: f2,
            f1: [DVec3::ZERO; 4],
            f2: [DVec3::ZERO; 4],
            magnitude: fn_vec.length(),
        };
        for a in 0..v1 {
            out.f1[a] = phi1[a] * fn_vec;
        }
        for a in 0..v2 {
            out.f2[a] = -phi2[a] * fn_vec;
        }
        Some(out)
    })
}

/// Scatters contributions into the response channels of two distinct
/// meshes.
pub fn scatter_forces(
    contributions: &[PlaneForces],
    mesh1: &mut SurfaceMesh,
    mesh2: &mut SurfaceMesh,
) -> PenaltyResult {
    let mut result = PenaltyResult::default();
    for c in contributions {
        for a in 0..mesh1.nodes_per_face() {
            mesh1.accumulate_response(mesh1.face_node_id(c.face1, a), c.f1[a]);
        }
        for a in 0..mesh2.nodes_per_face() {
            mesh2.accumulate_response(mesh2.face_node_id(c.face2, a), c.f2[a]);
        }
        result.applied_count += 1;
        result.max_force = result.max_force.max(c.magnitude);
    }
    result
}

/// Scatter variant for single-mesh (auto) contact: both faces belong to
/// the same mesh.
pub fn scatter_forces_same_mesh(
    contributions: &[PlaneForces],
    mesh: &mut SurfaceMesh,
) -> PenaltyResult {
    let mut result = PenaltyResult::default();
    for c in contributions {
        for a in 0..mesh.nodes_per_face() {
            mesh.accumulate_response(mesh.face_node_id(c.face1, a), c.f1[a]);
            mesh.accumulate_response(mesh.face_node_id(c.face2, a), c.f2[a]);
        }
        result.applied_count += 1;
        result.max_force = result.max_force.max(c.magnitude);
    }
    result
}

/// Computes and applies penalty forces for all active planes between two
/// distinct meshes.
pub fn apply_common_plane_penalty(
    mesh1: &mut SurfaceMesh,
    mesh2: &mut SurfaceMesh,
    planes: &[ContactPlane],
    kinematic: KinematicPenalty,
    tied: bool,
    mode: ExecMode,
) -> PenaltyResult {
    let contributions = compute_common_plane_forces(mesh1, mesh2, planes, kinematic, tied, mode);
    let result = scatter_forces(&contributions, mesh1, mesh2);
    debug!(
        applied = result.applied_count,
        max_force = result.max_force,
        "common-plane penalty applied"
    );
    result
}
