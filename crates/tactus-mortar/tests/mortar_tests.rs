//! Integration tests for tactus-mortar: isoparametric quadrature fixtures,
//! mortar weight properties, and assembly.

use approx::assert_relative_eq;
use glam::DVec3;
use tactus_contact::fe::{det_j_quad, shape_quad};
use tactus_contact::plane::{check_interface_pair, GeomFilter};
use tactus_contact::InterfacePair;
use tactus_mesh::{ElementType, SurfaceMesh};
use tactus_mortar::{
    compute_aligned_mortar_weights, compute_mortar_weights, gauss_2x2, CsrMatrix, MortarData,
    MortarStorage, SparseMode,
};
use tactus_types::Scalar;

// ─── Isoparametric Quadrature Fixtures ────────────────────────

/// Integrates `Σ_a ∫ φ_a |J| dΩ` over a quad with 2x2 Gauss quadrature
/// and compares against the planar polygon area.
fn quad_integrates_to_area(x: [Scalar; 4], y: [Scalar; 4], z: [Scalar; 4], tol: Scalar) {
    let verts = [
        DVec3::new(x[0], y[0], z[0]),
        DVec3::new(x[1], y[1], z[1]),
        DVec3::new(x[2], y[2], z[2]),
        DVec3::new(x[3], y[3], z[3]),
    ];

    let mut area_test = 0.0;
    for a in 0..4 {
        for ((xi, eta), w) in gauss_2x2() {
            let phi = shape_quad(xi, eta);
            let dj = det_j_quad(xi, eta, &verts);
            area_test += w * phi[a] * dj;
        }
    }

    let area = tactus_geom::poly_area_2d(&x, &y);
    assert!(
        (area_test - area).abs() <= tol,
        "integrated {area_test} vs planar {area}"
    );
}

#[test]
fn square() {
    quad_integrates_to_area(
        [-0.5, 0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5, 0.5],
        [0.1; 4],
        1.0e-8,
    );
}

#[test]
fn rect() {
    quad_integrates_to_area(
        [-0.5, 0.5, 0.5, -0.5],
        [-0.25, -0.25, 0.25, 0.25],
        [0.1; 4],
        1.0e-8,
    );
}

#[test]
fn affine() {
    quad_integrates_to_area(
        [-0.5, 0.5, 0.8, -0.2],
        [-0.415, -0.415, 0.5, 0.5],
        [0.1; 4],
        1.0e-5,
    );
}

#[test]
fn nonaffine() {
    quad_integrates_to_area(
        [-0.5, 0.5, 0.235, -0.35],
        [-0.25, -0.15, 0.25, 0.235],
        [0.1; 4],
        1.0e-8,
    );
}

// ─── Mortar Weight Fixtures ───────────────────────────────────

fn default_filter() -> GeomFilter {
    GeomFilter {
        len_collapse_ratio: 1.0e-8,
        overlap_area_frac: 1.0e-8,
        gap_ratio: 1.0e-12,
        tied: false,
        auto_interpen_check: false,
        auto_interpen_frac: 0.3,
    }
}

/// Mortar mesh (nodes 0..4) above nonmortar mesh (nodes 4..8), unit
/// squares, nonmortar at z = 0 facing up, mortar at z = `sep` facing down.
fn mortar_pair(sep: Scalar) -> (SurfaceMesh, SurfaceMesh) {
    let x1 = [0.0, 1.0, 1.0, 0.0];
    let y1 = [0.0, 0.0, 1.0, 1.0];
    let z1 = [sep; 4];
    let mut m1 =
        SurfaceMesh::new(ElementType::Quad, 4, &[0, 3, 2, 1], &x1, &y1, Some(&z1)).unwrap();

    // nonmortar nodes occupy ids 4..8 of a shared contiguous numbering
    let mut x2 = [0.0; 8];
    let mut y2 = [0.0; 8];
    let mut z2 = [0.0; 8];
    x2[4..8].copy_from_slice(&[0.0, 1.0, 1.0, 0.0]);
    y2[4..8].copy_from_slice(&[0.0, 0.0, 1.0, 1.0]);
    z2[4..8].copy_from_slice(&[0.0; 4]);
    let mut m2 =
        SurfaceMesh::new(ElementType::Quad, 8, &[4, 5, 6, 7], &x2, &y2, Some(&z2)).unwrap();

    m1.register_response();
    m2.register_response();
    m1.compute_face_data();
    m2.compute_face_data();
    (m1, m2)
}

fn plane_for(m1: &SurfaceMesh, m2: &SurfaceMesh) -> tactus_contact::ContactPlane {
    let pair = InterfacePair::new(0, 0);
    check_interface_pair(&pair, m1, m2, &default_filter())
        .unwrap()
        .expect("pair must produce a plane")
}

#[test]
fn mortar_partition_of_unity() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);
    assert_relative_eq!(plane.area, 1.0, epsilon = 1e-12);

    let mut storage = MortarStorage::new();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut storage);

    // the shape functions partition unity, so summing all products of a
    // block recovers the overlap area
    let mut nn_total = 0.0;
    let mut mn_total = 0.0;
    for a in 0..4 {
        for b in 0..4 {
            nn_total += storage.nn_wt(elem, a, b);
            mn_total += storage.mn_wt(elem, a, b);
        }
    }
    assert_relative_eq!(nn_total, plane.area, epsilon = 1e-10);
    assert_relative_eq!(mn_total, plane.area, epsilon = 1e-10);
}

#[test]
fn mortar_weights_are_symmetric_for_conforming_faces() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut storage = MortarStorage::new();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut storage);

    for a in 0..4 {
        for b in 0..4 {
            assert_relative_eq!(
                storage.nn_wt(elem, a, b),
                storage.nn_wt(elem, b, a),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn aligned_weights_are_identity_scaled() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut storage = MortarStorage::new();
    let elem = compute_aligned_mortar_weights(&plane, &m1, &m2, &mut storage);

    for a in 0..4 {
        for b in 0..4 {
            let expect = if a == b { plane.area / 4.0 } else { 0.0 };
            assert_relative_eq!(storage.nn_wt(elem, a, b), expect, epsilon = 1e-12);
            assert_relative_eq!(storage.mn_wt(elem, a, b), expect, epsilon = 1e-12);
        }
    }
}

#[test]
fn weighted_gap_sign_tracks_separation() {
    let sep = 0.3;
    let (m1, m2) = mortar_pair(sep);
    let plane = plane_for(&m1, &m2);

    let mut data = MortarData::new(3, 8);
    data.begin_cycle();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut data.storage);
    data.accumulate_nodal_gaps(elem, &m2);

    // each nonmortar node carries a positive weighted gap of sep * ∫φ_a
    for n in 4..8 {
        assert!(data.gaps[n] > 0.0, "node {n} gap = {}", data.gaps[n]);
    }
    let total: Scalar = data.gaps.iter().sum();
    assert_relative_eq!(total, sep * plane.area, epsilon = 1e-10);
}

#[test]
fn pressure_forces_balance() {
    let (mut m1, mut m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut data = MortarData::new(3, 8);
    data.begin_cycle();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut data.storage);

    // uniform unit pressure on the nonmortar nodes
    for n in 4..8 {
        data.pressures[n] = 1.0;
    }
    data.apply_pressure_forces(elem, &mut m1, &mut m2);

    let t1 = DVec3::new(
        m1.resp_x.iter().sum(),
        m1.resp_y.iter().sum(),
        m1.resp_z.iter().sum(),
    );
    let t2 = DVec3::new(
        m2.resp_x.iter().sum(),
        m2.resp_y.iter().sum(),
        m2.resp_z.iter().sum(),
    );
    assert!(t1.length() > 0.0);
    assert_relative_eq!((t1 + t2).length(), 0.0, epsilon = 1e-10);

    // unit pressure over a unit overlap: total normal force magnitude 1
    assert_relative_eq!(t1.length(), 1.0, epsilon = 1e-10);
}

// ─── Assembly ─────────────────────────────────────────────────

#[test]
fn mortar_weight_assembly_rows_are_nonmortar_nodes() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut data = MortarData::new(3, 8);
    data.begin_cycle();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut data.storage);
    data.assemble_mortar_wts(elem, &m1, &m2);
    data.finalize(true);

    let csr = data.csr().unwrap();
    assert_eq!(csr.rows, 8);

    // only nonmortar rows (4..8) are populated
    for r in 0..4 {
        assert_eq!(csr.row_ptr[r + 1] - csr.row_ptr[r], 0);
    }
    for r in 4..8 {
        assert!(csr.row_ptr[r + 1] > csr.row_ptr[r]);
    }

    // row sums over the nonmortar columns recover ∫φ_a: the four rows
    // together integrate the partition of unity twice (mortar + nonmortar
    // blocks), i.e. twice the overlap area
    let total: Scalar = csr.values.iter().sum();
    assert_relative_eq!(total, 2.0 * plane.area, epsilon = 1e-10);
}

#[test]
fn jacobian_blocks_have_primal_dual_symmetry() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut data = MortarData::new(3, 8);
    data.begin_cycle();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut data.storage);
    data.assemble_jacobian(elem, &m1, &m2, SparseMode::GlobalCsr);
    data.finalize(false);

    let csr = data.csr().unwrap();
    assert_eq!(csr.rows, 4 * 8); // (dim + 1) * num_total_nodes

    let pres_off = data.pressure_offset();
    // spot check: primal-dual entries equal their dual-primal mirrors
    for node in 0..4usize {
        for d in 0..3 {
            let row = 3 * node + d;
            for p_node in 4..8usize {
                let col = pres_off + p_node;
                assert_relative_eq!(csr.get(row, col), csr.get(col, row), epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn element_dense_mode_stores_blocks() {
    let (m1, m2) = mortar_pair(0.0);
    let plane = plane_for(&m1, &m2);

    let mut data = MortarData::new(3, 8);
    data.begin_cycle();
    let elem = compute_mortar_weights(&plane, &m1, &m2, &mut data.storage);
    data.assemble_jacobian(elem, &m1, &m2, SparseMode::ElementDense);

    assert_eq!(data.elem_blocks.len(), 1);
    let blocks = &data.elem_blocks[0];
    assert_eq!(blocks.jrp_mortar.rows, 12);
    assert_eq!(blocks.jrp_mortar.cols, 4);
    assert_eq!(blocks.jgu_nonmortar.rows, 4);
    assert_eq!(blocks.jgu_nonmortar.cols, 12);
}

#[test]
fn csr_round_trip_through_serde() {
    let t = [(0usize, 1usize, 2.0), (2, 0, -1.0)];
    let m = CsrMatrix::from_triplets(3, 3, &t);
    let json = serde_json::to_string(&m).unwrap();
    let back: CsrMatrix = serde_json::from_str(&json).unwrap();
    assert_eq!(back.nnz(), 2);
    assert_eq!(back.get(2, 0), -1.0);
}
