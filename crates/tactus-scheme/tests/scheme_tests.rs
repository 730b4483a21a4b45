//! Integration tests for tactus-scheme: validation, the full per-cycle
//! pipeline, timestep votes, and interface output.

use approx::assert_relative_eq;
use tactus_contact::KinematicPenalty;
use tactus_mesh::ElementType;
use tactus_mortar::{ImplicitEvalMode, SparseMode};
use tactus_scheme::Context;
use tactus_types::error::ConfigError;
use tactus_types::{
    BinningMethod, ContactCase, ContactMethod, ContactMode, ContactModel, EnforcementMethod,
    MeshId, Scalar, SchemeId, TactusError,
};

const M1: MeshId = MeshId(0);
const M2: MeshId = MeshId(1);
const CS: SchemeId = SchemeId(0);

/// Registers a unit quad at height `z`, winding chosen so the face normal
/// points +z (`up`) or -z. `node_offset` shifts the node ids (mortar
/// methods need disjoint numbering).
fn register_quad(
    ctx: &mut Context,
    id: MeshId,
    z: Scalar,
    up: bool,
    node_offset: usize,
) {
    let n = node_offset + 4;
    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];
    let mut zs = vec![0.0; n];
    x[node_offset..].copy_from_slice(&[0.0, 1.0, 1.0, 0.0]);
    y[node_offset..].copy_from_slice(&[0.0, 0.0, 1.0, 1.0]);
    zs[node_offset..].copy_from_slice(&[z; 4]);
    let o = node_offset as u32;
    let conn: [u32; 4] = if up {
        [o, o + 1, o + 2, o + 3]
    } else {
        [o, o + 3, o + 2, o + 1]
    };
    ctx.register_mesh(id, ElementType::Quad, n, &conn, &x, &y, Some(&zs))
        .unwrap();
    ctx.register_nodal_response(id).unwrap();
}

fn common_plane_scheme(ctx: &mut Context, case: ContactCase, model: ContactModel) {
    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurface,
        case,
        ContactMethod::CommonPlane,
        model,
        EnforcementMethod::Penalty,
        BinningMethod::Grid,
    )
    .unwrap();
}

// ─── End-to-End Scenarios ─────────────────────────────────────

#[test]
fn conforming_patch_zero_gap() {
    // S1: coincident unit squares, zero gap, penalty, NO_SLIDING
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.0, true, 0);
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoSliding, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();
    ctx.enable_timestep_vote(CS, false).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let scheme = ctx.scheme(CS).unwrap();
    assert_eq!(scheme.num_active_pairs(), 1);
    let plane = &scheme.planes()[0];
    assert_relative_eq!(plane.area, 1.0, epsilon = 1e-12);
    assert_relative_eq!(plane.gap, 0.0, epsilon = 1e-12);

    // zero gap sits on the gap-tolerance boundary: no force
    let (_, _, rz) = ctx.response(M1).unwrap();
    assert_eq!(rz.iter().map(|v| v.abs()).sum::<Scalar>(), 0.0);

    // NO_SLIDING pins binning after the first cycle
    assert!(ctx.scheme(CS).unwrap().has_fixed_binning());
}

#[test]
fn interpenetration_patch_force() {
    // S2: 0.05 interpenetration, element-wise penalty, k_mat = 50,
    // t = 1 both sides: total force on mesh 1 is 5.0 along +z
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0); // upper body, bottom face
    register_quad(&mut ctx, M2, 0.05, true, 0); // lower body, top face
    ctx.set_kinematic_element_penalty(M1, &[50.0], &[1.0]).unwrap();
    ctx.set_kinematic_element_penalty(M2, &[50.0], &[1.0]).unwrap();
    // zero velocities keep the timestep vote quiet
    let zero = [0.0; 4];
    ctx.register_nodal_velocities(M1, &zero, &zero, Some(&zero)).unwrap();
    ctx.register_nodal_velocities(M2, &zero, &zero, Some(&zero)).unwrap();

    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::ElementWise).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let scheme = ctx.scheme(CS).unwrap();
    assert_eq!(scheme.num_active_pairs(), 1);
    assert_relative_eq!(scheme.planes()[0].gap, -0.05, epsilon = 1e-12);
    assert_relative_eq!(scheme.planes()[0].area, 1.0, epsilon = 1e-12);

    let (rx, ry, rz) = ctx.response(M1).unwrap();
    let fx: Scalar = rx.iter().sum();
    let fy: Scalar = ry.iter().sum();
    let fz: Scalar = rz.iter().sum();
    assert_relative_eq!(fz, 5.0, epsilon = 1e-8);
    assert_relative_eq!(fx, 0.0, epsilon = 1e-10);
    assert_relative_eq!(fy, 0.0, epsilon = 1e-10);

    // equilibrium against mesh 2
    let (_, _, rz2) = ctx.response(M2).unwrap();
    let fz2: Scalar = rz2.iter().sum();
    assert_relative_eq!(fz + fz2, 0.0, epsilon = 1e-10);

    // dt untouched
    assert_relative_eq!(dt, 1.0e-3, epsilon = 1e-15);
}

#[test]
fn different_face_types_rejected_for_mortar() {
    // S6: triangle mesh paired with quad mesh under SINGLE_MORTAR fails
    // validation and processes no pairs
    let mut ctx = Context::new(3).unwrap();

    let x = [0.0, 1.0, 0.0];
    let y = [0.0, 0.0, 1.0];
    let z = [0.0; 3];
    ctx.register_mesh(M1, ElementType::Triangle, 3, &[0, 1, 2], &x, &y, Some(&z))
        .unwrap();
    ctx.register_nodal_response(M1).unwrap();
    register_quad(&mut ctx, M2, 0.01, true, 4);

    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurface,
        ContactCase::NoCase,
        ContactMethod::SingleMortar,
        ContactModel::Frictionless,
        EnforcementMethod::LagrangeMultiplier,
        BinningMethod::Grid,
    )
    .unwrap();
    ctx.set_lagrange_multiplier_options(CS, ImplicitEvalMode::MortarResidual, SparseMode::GlobalCsr)
        .unwrap();

    let mut dt = 1.0e-3;
    let err = ctx.update(0, 0.0, &mut dt).unwrap_err();
    match err {
        TactusError::InvalidConfig(errors) => {
            assert!(errors.contains(&ConfigError::DifferentFaceTypes));
        }
        other => panic!("expected InvalidConfig, got {other}"),
    }

    let scheme = ctx.scheme(CS).unwrap();
    assert!(!scheme.is_valid());
    assert_eq!(scheme.interface_pairs().len(), 0);
    assert_eq!(scheme.num_active_pairs(), 0);
}

// ─── Validation Corrections ───────────────────────────────────

#[test]
fn conforming_mode_forces_no_sliding() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.0, true, 0);
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurfaceConforming,
        ContactCase::NoCase,
        ContactMethod::CommonPlane,
        ContactModel::Frictionless,
        EnforcementMethod::Penalty,
        BinningMethod::CartesianProduct,
    )
    .unwrap();
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();
    ctx.enable_timestep_vote(CS, false).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();
    assert_eq!(ctx.scheme(CS).unwrap().case, ContactCase::NoSliding);
}

#[test]
fn penalty_without_options_rejected() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.0, true, 0);
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);

    let mut dt = 1.0e-3;
    let err = ctx.update(0, 0.0, &mut dt).unwrap_err();
    match err {
        TactusError::InvalidConfig(errors) => {
            assert!(errors.contains(&ConfigError::OptionsNotSet));
        }
        other => panic!("expected InvalidConfig, got {other}"),
    }
}

#[test]
fn missing_response_rejected() {
    let mut ctx = Context::new(3).unwrap();
    // meshes without registered response
    let x = [0.0, 1.0, 1.0, 0.0];
    let y = [0.0, 0.0, 1.0, 1.0];
    let z0 = [0.0; 4];
    ctx.register_mesh(M1, ElementType::Quad, 4, &[0, 3, 2, 1], &x, &y, Some(&z0))
        .unwrap();
    ctx.register_mesh(M2, ElementType::Quad, 4, &[0, 1, 2, 3], &x, &y, Some(&z0))
        .unwrap();
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();

    let mut dt = 1.0e-3;
    let err = ctx.update(0, 0.0, &mut dt).unwrap_err();
    match err {
        TactusError::InvalidConfig(errors) => {
            assert!(errors.contains(&ConfigError::NullNodalResponse));
        }
        other => panic!("expected InvalidConfig, got {other}"),
    }
}

#[test]
fn coulomb_model_has_no_implementation() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.0, true, 0);
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Coulomb);
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();

    let mut dt = 1.0e-3;
    let err = ctx.update(0, 0.0, &mut dt).unwrap_err();
    match err {
        TactusError::InvalidConfig(errors) => {
            assert!(errors.contains(&ConfigError::NoModelImplementationForMethod));
        }
        other => panic!("expected InvalidConfig, got {other}"),
    }
}

// ─── Mortar Through the Pipeline ──────────────────────────────

#[test]
fn mortar_weights_emit_csr() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0); // mortar side
    register_quad(&mut ctx, M2, 0.01, true, 4); // nonmortar, nodes 4..8

    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurface,
        ContactCase::NoCase,
        ContactMethod::MortarWeights,
        ContactModel::NullModel,
        EnforcementMethod::NullEnforcement,
        BinningMethod::Grid,
    )
    .unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let csr = ctx.jacobian_csr(CS).unwrap();
    assert_eq!(csr.rows, 8);
    assert!(csr.nnz() > 0);

    // weights land in the nonmortar rows (4..8); the total integrates the
    // partition of unity over both blocks: twice the overlap area
    let total: Scalar = csr.values.iter().sum();
    assert_relative_eq!(total, 2.0, epsilon = 1e-10);
}

#[test]
fn single_mortar_residual_jacobian() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.01, true, 4);

    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurface,
        ContactCase::NoCase,
        ContactMethod::SingleMortar,
        ContactModel::Frictionless,
        EnforcementMethod::LagrangeMultiplier,
        BinningMethod::Grid,
    )
    .unwrap();
    ctx.set_lagrange_multiplier_options(
        CS,
        ImplicitEvalMode::MortarResidualJacobian,
        SparseMode::GlobalCsr,
    )
    .unwrap();

    // cycle 0 computes gaps and the jacobian with zero pressures
    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let gaps = ctx.gap_field(CS).unwrap().to_vec();
    // mesh 2 top face at z = 0.01 has penetrated the mortar plane at 0:
    // weighted gaps on the nonmortar nodes are negative
    for n in 4..8 {
        assert!(gaps[n] < 0.0, "node {n} gap = {}", gaps[n]);
    }

    let csr = ctx.jacobian_csr(CS).unwrap();
    assert_eq!(csr.rows, 4 * 8);
    assert!(csr.nnz() > 0);

    // hand back a pressure solution and re-run: forces appear
    let mut p = vec![0.0; 8];
    for (n, p_n) in p.iter_mut().enumerate().skip(4) {
        *p_n = 1.0 + 0.1 * n as Scalar;
    }
    ctx.set_pressure_field(CS, &p).unwrap();
    ctx.update(1, 1.0e-3, &mut dt).unwrap();

    let (_, _, rz1) = ctx.response(M1).unwrap();
    let (_, _, rz2) = ctx.response(M2).unwrap();
    let f1: Scalar = rz1.iter().sum();
    let f2: Scalar = rz2.iter().sum();
    assert!(f1.abs() > 0.0);
    assert_relative_eq!(f1 + f2, 0.0, epsilon = 1e-10);
}

#[test]
fn aligned_mortar_forces_no_sliding() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.0, true, 4);

    ctx.create_coupling_scheme(
        CS,
        M1,
        M2,
        ContactMode::SurfaceToSurface,
        ContactCase::NoCase,
        ContactMethod::AlignedMortar,
        ContactModel::Frictionless,
        EnforcementMethod::LagrangeMultiplier,
        BinningMethod::Grid,
    )
    .unwrap();
    ctx.set_lagrange_multiplier_options(CS, ImplicitEvalMode::MortarResidual, SparseMode::GlobalCsr)
        .unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    // the case was auto-corrected for the aligned method
    assert_eq!(ctx.scheme(CS).unwrap().case, ContactCase::NoSliding);
}

// ─── Timestep Vote ────────────────────────────────────────────

/// Element-wise penalty pair with prescribed nodal velocities.
fn vote_context(v1z: Scalar, v2z: Scalar, sep: Scalar) -> Context {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0); // upper body, bottom face
    register_quad(&mut ctx, M2, sep, true, 0); // lower body, top face
    ctx.set_kinematic_element_penalty(M1, &[50.0], &[1.0]).unwrap();
    ctx.set_kinematic_element_penalty(M2, &[50.0], &[1.0]).unwrap();
    let zero = [0.0; 4];
    let v1 = [v1z; 4];
    let v2 = [v2z; 4];
    ctx.register_nodal_velocities(M1, &zero, &zero, Some(&v1)).unwrap();
    ctx.register_nodal_velocities(M2, &zero, &zero, Some(&v2)).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::ElementWise).unwrap();
    ctx
}

#[test]
fn timestep_vote_reduces_dt_for_fast_approach() {
    // faces 0.05 apart in gap terms, mesh 1 diving at 100/s: one step at
    // dt = 0.1 would drive interpenetration far past 0.3 * thickness
    let mut ctx = vote_context(-100.0, 0.0, 0.05);
    let mut dt = 0.1;
    ctx.update(0, 0.0, &mut dt).unwrap();
    assert!(dt < 0.1, "vote should reduce dt, got {dt}");
    assert!(dt > 0.0);
}

#[test]
fn timestep_vote_leaves_calm_pairs_alone() {
    // receding faces never shrink the step
    let mut ctx = vote_context(100.0, 0.0, 0.05);
    let mut dt = 0.1;
    ctx.update(0, 0.0, &mut dt).unwrap();
    assert_relative_eq!(dt, 0.1, epsilon = 1e-15);
}

#[test]
fn timestep_vote_flags_missing_velocities() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.05, true, 0);
    ctx.set_kinematic_element_penalty(M1, &[50.0], &[1.0]).unwrap();
    ctx.set_kinematic_element_penalty(M2, &[50.0], &[1.0]).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::ElementWise).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();
    assert_relative_eq!(dt, -1.0, epsilon = 1e-15);
}

#[test]
fn tiny_dt_is_left_untouched() {
    let mut ctx = vote_context(-100.0, 0.0, 0.05);
    let mut dt = 1.0e-9;
    ctx.update(0, 0.0, &mut dt).unwrap();
    assert_relative_eq!(dt, 1.0e-9, epsilon = 1e-20);
}

// ─── Interface Output ─────────────────────────────────────────

#[test]
fn overlap_dump_written_per_cycle() {
    let dir = std::env::temp_dir().join("tactus_dump_test");
    let _ = std::fs::remove_dir_all(&dir);

    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    register_quad(&mut ctx, M2, 0.02, true, 0);
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();
    ctx.enable_timestep_vote(CS, false).unwrap();
    ctx.set_output_directory(CS, dir.clone(), 1).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let path = dir.join("overlap_0_0.json");
    let text = std::fs::read_to_string(&path).expect("dump file must exist");
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["cycle"], 0);
    let overlaps = json["overlaps"].as_array().unwrap();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0]["vertices"].as_array().unwrap().len(), 4);

    let _ = std::fs::remove_dir_all(&dir);
}

// ─── Null Meshes ──────────────────────────────────────────────

#[test]
fn null_mesh_scheme_is_valid_but_inert() {
    let mut ctx = Context::new(3).unwrap();
    register_quad(&mut ctx, M1, 0.0, false, 0);
    ctx.register_mesh(M2, ElementType::Quad, 0, &[], &[], &[], Some(&[]))
        .unwrap();
    ctx.register_nodal_response(M2).unwrap();
    ctx.set_kinematic_constant_penalty(M1, 1.0).unwrap();
    ctx.set_kinematic_constant_penalty(M2, 1.0).unwrap();
    common_plane_scheme(&mut ctx, ContactCase::NoCase, ContactModel::Frictionless);
    ctx.set_penalty_options(CS, KinematicPenalty::Constant).unwrap();

    let mut dt = 1.0e-3;
    ctx.update(0, 0.0, &mut dt).unwrap();

    let scheme = ctx.scheme(CS).unwrap();
    assert!(scheme.null_meshes());
    assert_eq!(scheme.num_active_pairs(), 0);
    assert_relative_eq!(dt, 1.0e-3, epsilon = 1e-15);
}
