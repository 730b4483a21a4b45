//! Mortar weight evaluation over contact-plane overlaps.

use glam::DVec3;
use tactus_contact::fe::face_shape_weights;
use tactus_contact::plane::ContactPlane;
use tactus_geom::centroid::poly_area_centroid_3d;
use tactus_geom::projection::project_point_to_plane;
use tactus_mesh::SurfaceMesh;
use tactus_types::Scalar;

use crate::elem::MortarStorage;
use crate::integ::{overlap_quadrature, segment_quadrature, OverlapQuadPoint};

/// Builds a mortar element record for an active plane and fills its
/// weights by quadrature.
///
/// Each integration point on the overlap is projected onto each face and
/// pulled back through the inverse isoparametric map; products of the two
/// faces' shape functions accumulate into the record's packed weights.
/// Returns the record index.
pub fn compute_mortar_weights(
    plane: &ContactPlane,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    storage: &mut MortarStorage,
) -> usize {
    let elem_id = push_record(plane, mesh1, mesh2, storage);
    let e = &storage.elems[elem_id];
    let v = e.num_face_vert;
    let verts1 = e.verts1;
    let verts2 = e.verts2;
    let n1 = e.normal1;
    let n2 = e.normal2;

    let points = quadrature_points(plane, &e.overlap);

    for qp in &points {
        // pull the integration point back to each parent face
        let p1 = project_point_to_plane(qp.point, n1, verts1[0]);
        let p2 = project_point_to_plane(qp.point, n2, verts2[0]);
        let phi1 = face_shape_weights(&verts1, v, n1, p1);
        let phi2 = face_shape_weights(&verts2, v, n2, p2);

        for a in 0..v {
            for b in 0..v {
                storage.add_nn_wt(elem_id, a, b, phi2[a] * phi2[b] * qp.weight);
                storage.add_mn_wt(elem_id, a, b, phi1[a] * phi2[b] * qp.weight);
            }
        }
    }

    elem_id
}

/// Aligned-mortar variant: faces are node-aligned, so quadrature is
/// unnecessary and the weights reduce to `δ_ab · area / V` on both blocks.
pub fn compute_aligned_mortar_weights(
    plane: &ContactPlane,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    storage: &mut MortarStorage,
) -> usize {
    let elem_id = push_record(plane, mesh1, mesh2, storage);
    let e = &storage.elems[elem_id];
    let v = e.num_face_vert;
    let w = e.area / v as Scalar;

    for a in 0..v {
        storage.add_nn_wt(elem_id, a, a, w);
        storage.add_mn_wt(elem_id, a, a, w);
    }
    elem_id
}

fn push_record(
    plane: &ContactPlane,
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    storage: &mut MortarStorage,
) -> usize {
    let f1 = plane.face1 as usize;
    let f2 = plane.face2 as usize;
    let v = mesh1.nodes_per_face();

    let mut verts1 = [DVec3::ZERO; 4];
    let mut verts2 = [DVec3::ZERO; 4];
    for a in 0..v {
        verts1[a] = mesh1.face_vertex(f1, a);
        verts2[a] = mesh2.face_vertex(f2, a);
    }

    let overlap: Vec<DVec3> = (0..plane.num_overlap_verts())
        .map(|i| DVec3::new(plane.overlap_x[i], plane.overlap_y[i], plane.overlap_z[i]))
        .collect();

    storage.push_elem(
        plane.dim,
        plane.face1,
        plane.face2,
        v,
        verts1,
        verts2,
        mesh1.face_normal(f1),
        mesh2.face_normal(f2),
        overlap,
        plane.area,
    )
}

fn quadrature_points(plane: &ContactPlane, overlap: &[DVec3]) -> Vec<OverlapQuadPoint> {
    if plane.dim == 2 {
        if overlap.len() == 2 {
            segment_quadrature(overlap[0], overlap[1])
        } else {
            Vec::new()
        }
    } else {
        // triangulate about the area centroid of the overlap polygon
        let x: Vec<Scalar> = overlap.iter().map(|p| p.x).collect();
        let y: Vec<Scalar> = overlap.iter().map(|p| p.y).collect();
        let z: Vec<Scalar> = overlap.iter().map(|p| p.z).collect();
        let Some(pivot) = poly_area_centroid_3d(&x, &y, &z) else {
            return Vec::new();
        };
        overlap_quadrature(overlap, pivot)
    }
}
