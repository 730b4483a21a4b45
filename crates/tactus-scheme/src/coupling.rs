//! The coupling scheme: configuration, validation, and per-cycle
//! orchestration of the contact pipeline.

use std::path::PathBuf;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tactus_contact::fe::galerkin_eval;
use tactus_contact::penalty::{
    compute_common_plane_forces, scatter_forces, scatter_forces_same_mesh, KinematicPenalty,
};
use tactus_contact::plane::{check_interface_pair, ContactPlane, GeomFilter};
use tactus_contact::{find_interface_pairs, InterfacePair};
use tactus_exec::{filter_map_all, min_all, ExecMode};
use tactus_geom::FaceGeomError;
use tactus_mesh::SurfaceMesh;
use tactus_mortar::{
    compute_aligned_mortar_weights, compute_mortar_weights, ImplicitEvalMode, MortarData,
    SparseMode,
};
use tactus_types::error::ConfigError;
use tactus_types::{
    constants, BinningMethod, ContactCase, ContactMethod, ContactMode, ContactModel,
    EnforcementMethod, LoggingLevel, MeshId, Scalar, SchemeId, TactusError, TactusResult,
};
use tracing::{debug, info, warn};

use crate::output::write_interface_output;
use crate::params::{EnforcementOptions, Parameters};

/// Per-scheme tallies of face-pair geometry failures, reset each cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PairReportingData {
    /// Pairs rejected for reversed projected orientation.
    pub num_bad_orientation: usize,
    /// Pairs whose overlap degenerated numerically.
    pub num_bad_overlaps: usize,
    /// Pairs with degenerate face input.
    pub num_bad_face_geometry: usize,
}

impl PairReportingData {
    fn tally(&mut self, err: FaceGeomError) {
        match err {
            FaceGeomError::FaceOrientation => self.num_bad_orientation += 1,
            FaceGeomError::InvalidFaceInput => self.num_bad_face_geometry += 1,
            FaceGeomError::DegenerateOverlap => self.num_bad_overlaps += 1,
            // bookkeeping overflow; in-the-weeds debug detail, not a mesh
            // problem
            FaceGeomError::VertexIndexExceedsOverlap => {}
        }
    }

    fn any(&self) -> bool {
        self.num_bad_orientation + self.num_bad_overlaps + self.num_bad_face_geometry > 0
    }
}

/// A configured contact interaction between two meshes.
///
/// Lifecycle: constructed → validated (`init`) → per cycle: binned
/// (`perform_binning`) then applied (`apply`). An invalid scheme stays
/// inert: `apply` is a no-op until a later `init` passes.
pub struct CouplingScheme {
    pub id: SchemeId,
    pub mesh_id1: MeshId,
    pub mesh_id2: MeshId,

    pub mode: ContactMode,
    pub case: ContactCase,
    pub method: ContactMethod,
    pub model: ContactModel,
    pub enforcement: EnforcementMethod,
    pub binning: BinningMethod,

    pub params: Parameters,
    pub enforcement_options: EnforcementOptions,
    pub logging_level: LoggingLevel,
    pub output_directory: Option<PathBuf>,

    exec_mode: ExecMode,
    dim: usize,
    valid: bool,
    null_meshes: bool,
    fixed_binning: bool,
    is_binned: bool,
    num_total_nodes: usize,

    pairs: Vec<InterfacePair>,
    planes_2d: Vec<ContactPlane>,
    planes_3d: Vec<ContactPlane>,

    mortar: Option<MortarData>,
    pair_reporting: PairReportingData,
}

impl CouplingScheme {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SchemeId,
        mesh_id1: MeshId,
        mesh_id2: MeshId,
        mode: ContactMode,
        case: ContactCase,
        method: ContactMethod,
        model: ContactModel,
        enforcement: EnforcementMethod,
        binning: BinningMethod,
    ) -> Self {
        Self {
            id,
            mesh_id1,
            mesh_id2,
            mode,
            case,
            method,
            model,
            enforcement,
            binning,
            params: Parameters::default(),
            enforcement_options: EnforcementOptions::default(),
            logging_level: LoggingLevel::Undefined,
            output_directory: None,
            exec_mode: ExecMode::Sequential,
            dim: 3,
            valid: false,
            null_meshes: false,
            fixed_binning: false,
            is_binned: false,
            num_total_nodes: 0,
            pairs: Vec::new(),
            planes_2d: Vec::new(),
            planes_3d: Vec::new(),
            mortar: None,
            pair_reporting: PairReportingData::default(),
        }
    }

    /// True once `init()` validated the configuration.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// True when one or both meshes have no elements.
    pub fn null_meshes(&self) -> bool {
        self.null_meshes
    }

    /// True when per-cycle rebinning is disabled.
    pub fn has_fixed_binning(&self) -> bool {
        self.fixed_binning
    }

    /// The candidate pair list from the last binning.
    pub fn interface_pairs(&self) -> &[InterfacePair] {
        &self.pairs
    }

    /// Total node count across the coupling scheme (mortar methods only).
    pub fn num_total_nodes(&self) -> usize {
        self.num_total_nodes
    }

    /// Number of active contact planes this cycle.
    pub fn num_active_pairs(&self) -> usize {
        self.planes_2d.len().max(self.planes_3d.len())
    }

    /// The active contact planes (the populated array for this dimension).
    pub fn planes(&self) -> &[ContactPlane] {
        if self.dim == 2 {
            &self.planes_2d
        } else {
            &self.planes_3d
        }
    }

    /// Mortar method data, when the method carries it.
    pub fn mortar_data(&self) -> Option<&MortarData> {
        self.mortar.as_ref()
    }

    /// Mutable mortar method data (host writes pressures here).
    pub fn mortar_data_mut(&mut self) -> Option<&mut MortarData> {
        self.mortar.as_mut()
    }

    /// Per-cycle pair failure tallies.
    pub fn pair_reporting(&self) -> &PairReportingData {
        &self.pair_reporting
    }

    // ─── Validation ───────────────────────────────────────────

    /// Checks mode/case/method/model/enforcement compatibility, applying
    /// the benign auto-corrections (logged) and collecting every hard
    /// failure.
    fn validate(&mut self, mesh1: &SurfaceMesh, mesh2: &SurfaceMesh) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        self.null_meshes = mesh1.is_null() || mesh2.is_null();
        let same_mesh = self.mesh_id1 == self.mesh_id2;

        // ─── case corrections ───
        if self.mode == ContactMode::SurfaceToSurfaceConforming && self.case != ContactCase::NoSliding
        {
            info!(
                scheme = self.id.0,
                "conforming surfaces imply NO_SLIDING; overriding contact case"
            );
            self.case = ContactCase::NoSliding;
        }
        if self.method == ContactMethod::AlignedMortar && self.case != ContactCase::NoSliding {
            info!(
                scheme = self.id.0,
                "aligned mortar requires NO_SLIDING; overriding contact case"
            );
            self.case = ContactCase::NoSliding;
        }
        if matches!(
            self.method,
            ContactMethod::SingleMortar | ContactMethod::MortarWeights
        ) && !matches!(self.case, ContactCase::NoCase | ContactCase::NoSliding)
        {
            info!(
                scheme = self.id.0,
                "mortar methods take no contact case; overriding to NO_CASE"
            );
            self.case = ContactCase::NoCase;
        }
        if self.case == ContactCase::Auto && !same_mesh {
            info!(
                scheme = self.id.0,
                "AUTO contact requires a single registered mesh; overriding to NO_CASE"
            );
            self.case = ContactCase::NoCase;
        }
        if self.case == ContactCase::TiedNormal && self.model != ContactModel::Tied {
            info!(
                scheme = self.id.0,
                "TIED_NORMAL case implies the TIED model; overriding contact model"
            );
            self.model = ContactModel::Tied;
        }

        if self.case == ContactCase::Auto {
            self.params.auto_interpen_check = true;
            if !mesh1.has_element_thickness() || !mesh2.has_element_thickness() {
                errors.push(ConfigError::InvalidCaseData);
            }
        } else {
            self.params.auto_interpen_check = false;
        }

        // ─── method ───
        if !self.null_meshes {
            match self.method {
                ContactMethod::SingleMortar
                | ContactMethod::AlignedMortar
                | ContactMethod::MortarWeights => {
                    if mesh1.nodes_per_face() != mesh2.nodes_per_face() {
                        errors.push(ConfigError::DifferentFaceTypes);
                    }
                    if same_mesh {
                        errors.push(ConfigError::SameMeshIds);
                    }
                    if mesh1.dim() != 3 {
                        errors.push(ConfigError::InvalidDim);
                    }
                    if !same_mesh {
                        if let (Some((lo1, hi1)), Some((lo2, hi2))) =
                            (mesh1.node_id_range(), mesh2.node_id_range())
                        {
                            if lo1 <= hi2 && lo2 <= hi1 {
                                errors.push(ConfigError::OverlappingNodeIds);
                            }
                        }
                    }
                }
                ContactMethod::CommonPlane => {
                    if mesh1.nodes_per_face() != mesh2.nodes_per_face() {
                        errors.push(ConfigError::DifferentFaceTypes);
                    }
                }
            }

            let emits_force = matches!(
                self.method,
                ContactMethod::CommonPlane
                    | ContactMethod::SingleMortar
                    | ContactMethod::AlignedMortar
            );
            if emits_force && (!mesh1.has_response() || !mesh2.has_response()) {
                errors.push(ConfigError::NullNodalResponse);
            }
        }

        // ─── model ───
        match self.method {
            ContactMethod::SingleMortar
            | ContactMethod::AlignedMortar
            | ContactMethod::MortarWeights => {
                if !matches!(
                    self.model,
                    ContactModel::Frictionless | ContactModel::NullModel
                ) {
                    errors.push(ConfigError::NoModelImplementationForMethod);
                }
            }
            ContactMethod::CommonPlane => {
                if !matches!(
                    self.model,
                    ContactModel::Frictionless | ContactModel::NullModel | ContactModel::Tied
                ) {
                    errors.push(ConfigError::NoModelImplementationForMethod);
                }
            }
        }

        // ─── enforcement ───
        match self.method {
            ContactMethod::MortarWeights => {
                if self.enforcement != EnforcementMethod::NullEnforcement {
                    info!(
                        scheme = self.id.0,
                        "MORTAR_WEIGHTS only evaluates weights; overriding to NULL_ENFORCEMENT"
                    );
                    self.enforcement = EnforcementMethod::NullEnforcement;
                }
                // the only evaluation that makes sense for this method
                self.enforcement_options.lagrange_multiplier.eval_mode =
                    ImplicitEvalMode::MortarWeightsEval;
                if self.enforcement_options.lagrange_multiplier.sparse_mode != SparseMode::GlobalCsr
                {
                    errors.push(ConfigError::NoEnforcementImplementationForOption);
                }
            }
            ContactMethod::SingleMortar | ContactMethod::AlignedMortar => {
                if self.enforcement != EnforcementMethod::LagrangeMultiplier {
                    errors.push(ConfigError::InvalidEnforcementForMethod);
                } else {
                    let lm = &self.enforcement_options.lagrange_multiplier;
                    if !lm.options_set {
                        errors.push(ConfigError::OptionsNotSet);
                    } else if lm.eval_mode == ImplicitEvalMode::MortarWeightsEval {
                        errors.push(ConfigError::NoEnforcementImplementationForOption);
                    }
                }
            }
            ContactMethod::CommonPlane => {
                if self.enforcement != EnforcementMethod::Penalty {
                    errors.push(ConfigError::InvalidEnforcementForMethod);
                } else if !self.enforcement_options.penalty.constraint_type_set() {
                    errors.push(ConfigError::OptionsNotSet);
                }
            }
        }

        // ─── enforcement data ───
        if errors.is_empty() && !self.null_meshes {
            if let (ContactMethod::CommonPlane, EnforcementMethod::Penalty) =
                (self.method, self.enforcement)
            {
                let data_ok = match self.enforcement_options.penalty.kinematic {
                    Some(KinematicPenalty::Constant) => {
                        mesh1.constant_penalty.is_some() && mesh2.constant_penalty.is_some()
                    }
                    Some(KinematicPenalty::ElementWise) => {
                        mesh1.has_element_thickness()
                            && mesh2.has_element_thickness()
                            && !mesh1.bulk_modulus.is_empty()
                            && !mesh2.bulk_modulus.is_empty()
                    }
                    None => false,
                };
                if !data_ok {
                    errors.push(ConfigError::EnforcementDataError);
                }
            }
        }

        errors
    }

    // ─── Lifecycle ────────────────────────────────────────────

    /// Validates the configuration, selects the execution mode, refreshes
    /// both meshes' cached face data, and allocates method data.
    ///
    /// `mesh2` is `None` for single-mesh (auto) coupling.
    pub fn init(
        &mut self,
        mesh1: &mut SurfaceMesh,
        mut mesh2: Option<&mut SurfaceMesh>,
    ) -> TactusResult<()> {
        self.dim = mesh1.dim();

        let errors = {
            let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(&*mesh1);
            if !mesh1.valid || !m2.valid {
                self.valid = false;
                return Err(TactusError::InvalidMesh(format!(
                    "coupling scheme {} references an invalid mesh",
                    self.id.0
                )));
            }
            self.validate(&*mesh1, m2)
        };

        if !errors.is_empty() {
            self.valid = false;
            warn!(scheme = self.id.0, ?errors, "coupling scheme failed validation");
            return Err(TactusError::InvalidConfig(errors));
        }
        self.valid = true;

        let max_faces = {
            let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(&*mesh1);
            mesh1.num_faces().max(m2.num_faces())
        };
        self.exec_mode = ExecMode::select(mesh1.memory_space, max_faces);

        mesh1.compute_face_data();
        if let Some(m2) = mesh2.as_deref_mut() {
            m2.compute_face_data();
        }

        // method data; persists across cycles so host-written pressures
        // survive
        if matches!(
            self.method,
            ContactMethod::SingleMortar | ContactMethod::AlignedMortar | ContactMethod::MortarWeights
        ) && !self.null_meshes
        {
            let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(&*mesh1);
            let hi1 = mesh1.node_id_range().map_or(0, |(_, hi)| hi);
            let hi2 = m2.node_id_range().map_or(0, |(_, hi)| hi);
            let num_total = hi1.max(hi2) + 1;
            let stale = self
                .mortar
                .as_ref()
                .map_or(true, |d| d.num_total_nodes != num_total);
            if stale {
                self.mortar = Some(MortarData::new(self.dim, num_total));
            }
            self.num_total_nodes = num_total;
        }

        Ok(())
    }

    /// Finds the candidate pairs for this cycle, unless binning is pinned.
    pub fn perform_binning(&mut self, mesh1: &SurfaceMesh, mesh2: Option<&SurfaceMesh>) {
        if !self.valid || self.null_meshes {
            return;
        }
        if self.fixed_binning && self.is_binned {
            return;
        }

        let same_mesh = mesh2.is_none();
        let m2 = mesh2.unwrap_or(mesh1);
        self.pairs = find_interface_pairs(mesh1, m2, self.binning, same_mesh);
        self.is_binned = true;

        // cartesian-product binning never changes; NO_SLIDING pins the
        // topology after the first bin
        if self.binning == BinningMethod::CartesianProduct {
            self.fixed_binning = true;
        }
        if self.case == ContactCase::NoSliding {
            self.fixed_binning = true;
        }
    }

    /// Pins an explicit pair list supplied by the host.
    pub fn set_interface_pairs(&mut self, pairs: Vec<InterfacePair>) {
        self.pairs = pairs;
        self.is_binned = true;
        self.fixed_binning = true;
    }

    fn geom_filter(&self) -> GeomFilter {
        let tied = self.model == ContactModel::Tied;
        GeomFilter {
            len_collapse_ratio: self.params.len_collapse_ratio,
            overlap_area_frac: self.params.overlap_area_frac,
            gap_ratio: if tied {
                self.params.gap_tied_tol
            } else {
                self.params.gap_tol_ratio
            },
            tied,
            auto_interpen_check: self.params.auto_interpen_check,
            auto_interpen_frac: self.params.auto_interpen_frac,
        }
    }

    /// Runs the geometric check over all candidate pairs, applies the
    /// physics kernel, votes on the timestep, and writes interface output.
    pub fn apply(
        &mut self,
        mesh1: &mut SurfaceMesh,
        mut mesh2: Option<&mut SurfaceMesh>,
        cycle: usize,
        t: Scalar,
        dt: &mut Scalar,
    ) -> TactusResult<()> {
        if !self.valid || self.null_meshes {
            return Ok(());
        }

        debug!(
            scheme = self.id.0,
            pairs = self.pairs.len(),
            cycle,
            time = t,
            "applying coupling scheme"
        );

        // ─── geometric checks over candidate pairs ───
        self.pair_reporting = PairReportingData::default();
        let filter = self.geom_filter();
        let outcomes = {
            let m1: &SurfaceMesh = mesh1;
            let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(m1);
            let pairs = &self.pairs;
            filter_map_all(self.exec_mode, pairs.len(), |i| {
                Some((i, check_interface_pair(&pairs[i], m1, m2, &filter)))
            })
        };

        self.planes_2d.clear();
        self.planes_3d.clear();
        let mut geom_issue = false;
        for (i, outcome) in outcomes {
            match outcome {
                Err(err) => {
                    geom_issue = true;
                    self.pair_reporting.tally(err);
                    self.pairs[i].is_contact_candidate = false;
                }
                Ok(None) => {
                    self.pairs[i].is_contact_candidate = false;
                }
                Ok(Some(plane)) => {
                    self.pairs[i].is_contact_candidate = true;
                    if self.dim == 2 {
                        self.planes_2d.push(plane);
                    } else {
                        self.planes_3d.push(plane);
                    }
                }
            }
        }

        if geom_issue {
            info!(
                scheme = self.id.0,
                "possible issues with orientation, input, or invalid overlaps in the \
                 pair geometry checks; offending pairs skipped"
            );
        }
        debug!(
            scheme = self.id.0,
            active = self.num_active_pairs(),
            "pair geometry checks complete"
        );

        // ─── physics kernel ───
        self.apply_physics(mesh1, mesh2.as_deref_mut())?;

        // ─── timestep vote ───
        if self.num_active_pairs() > 0 {
            let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(mesh1);
            self.compute_timestep(mesh1, m2, dt);
        }

        // ─── interface output ───
        if let Some(dir) = &self.output_directory {
            if self.params.vis_cycle_incr > 0 && cycle % self.params.vis_cycle_incr == 0 {
                write_interface_output(dir, self.id, cycle, t, self.planes())?;
            }
        }

        self.print_pair_reporting();
        Ok(())
    }

    fn apply_physics(
        &mut self,
        mesh1: &mut SurfaceMesh,
        mesh2: Option<&mut SurfaceMesh>,
    ) -> TactusResult<()> {
        match self.method {
            ContactMethod::CommonPlane => {
                if self.model == ContactModel::NullModel {
                    return Ok(());
                }
                let Some(kinematic) = self.enforcement_options.penalty.kinematic else {
                    return Err(TactusError::CycleFailed(
                        "penalty kinematic option unset past validation".into(),
                    ));
                };
                let tied = self.model == ContactModel::Tied;
                let planes = if self.dim == 2 {
                    &self.planes_2d
                } else {
                    &self.planes_3d
                };
                let contributions = {
                    let m1: &SurfaceMesh = mesh1;
                    let m2: &SurfaceMesh = mesh2.as_deref().unwrap_or(m1);
                    compute_common_plane_forces(m1, m2, planes, kinematic, tied, self.exec_mode)
                };
                match mesh2 {
                    Some(m2) => {
                        scatter_forces(&contributions, mesh1, m2);
                    }
                    None => {
                        scatter_forces_same_mesh(&contributions, mesh1);
                    }
                }
                Ok(())
            }
            ContactMethod::SingleMortar
            | ContactMethod::AlignedMortar
            | ContactMethod::MortarWeights => {
                let Some(mesh2) = mesh2 else {
                    return Err(TactusError::CycleFailed(
                        "mortar methods need two distinct meshes".into(),
                    ));
                };
                self.apply_mortar(mesh1, mesh2)
            }
        }
    }

    fn apply_mortar(
        &mut self,
        mesh1: &mut SurfaceMesh,
        mesh2: &mut SurfaceMesh,
    ) -> TactusResult<()> {
        let aligned = self.method == ContactMethod::AlignedMortar;
        let weights_only = self.method == ContactMethod::MortarWeights;
        let lm = self.enforcement_options.lagrange_multiplier;

        let Some(data) = self.mortar.as_mut() else {
            return Err(TactusError::CycleFailed(
                "mortar method data missing past validation".into(),
            ));
        };
        data.begin_cycle();

        // all planes with a positive overlap contribute, in or out of
        // contact: activity is decided by gaps AND the pressure solution
        for plane in &self.planes_3d {
            let elem = if aligned {
                compute_aligned_mortar_weights(plane, mesh1, mesh2, &mut data.storage)
            } else {
                compute_mortar_weights(plane, mesh1, mesh2, &mut data.storage)
            };

            if weights_only {
                data.assemble_mortar_wts(elem, mesh1, mesh2);
                continue;
            }

            data.accumulate_nodal_gaps(elem, mesh2);
            match lm.eval_mode {
                ImplicitEvalMode::MortarWeightsEval => {}
                ImplicitEvalMode::MortarResidual => {
                    data.apply_pressure_forces(elem, mesh1, mesh2);
                }
                ImplicitEvalMode::MortarResidualJacobian => {
                    data.apply_pressure_forces(elem, mesh1, mesh2);
                    data.assemble_jacobian(elem, mesh1, mesh2, lm.sparse_mode);
                }
            }
        }

        if weights_only {
            data.finalize(true);
        } else if lm.eval_mode == ImplicitEvalMode::MortarResidualJacobian
            && lm.sparse_mode == SparseMode::GlobalCsr
        {
            data.finalize(false);
        }
        Ok(())
    }

    // ─── Timestep vote ────────────────────────────────────────

    /// Votes on the timestep. A vote only ever shrinks `dt`; a `dt`
    /// already below the votable floor is left untouched. Missing
    /// velocities on non-null meshes write the error sentinel `-1.0`.
    pub fn compute_timestep(&self, mesh1: &SurfaceMesh, mesh2: &SurfaceMesh, dt: &mut Scalar) {
        if *dt < constants::MIN_VOTABLE_DT {
            return;
        }

        // only the common-plane penalty method votes
        if self.method != ContactMethod::CommonPlane
            || self.enforcement != EnforcementMethod::Penalty
            || !self.params.enable_timestep_vote
        {
            return;
        }

        if !mesh1.has_velocity() || !mesh2.has_velocity() {
            if !mesh1.is_null() && !mesh2.is_null() {
                *dt = -1.0;
            }
            return;
        }

        self.compute_common_plane_timestep(mesh1, mesh2, dt);
    }

    /// Common-plane timestep vote from velocity projections at the
    /// face-projected overlap centroids.
    ///
    /// The vote is based on velocity projection, not a CFL-like spring
    /// stiffness constraint; it catches the case where one more cycle at
    /// the current dt drives face-pair interpenetration past the allowed
    /// thickness fraction. Only the element-wise penalty carries the
    /// element thicknesses this needs.
    fn compute_common_plane_timestep(
        &self,
        mesh1: &SurfaceMesh,
        mesh2: &SurfaceMesh,
        dt: &mut Scalar,
    ) {
        if self.enforcement_options.penalty.kinematic != Some(KinematicPenalty::ElementWise) {
            return;
        }

        let planes = self.planes();
        let proj_ratio = self.params.timestep_pen_frac;
        let tiny = self.params.timestep_vel_tiny;
        let dt_in = *dt;

        let vote = min_all(self.exec_mode, planes.len(), dt_in, |i| {
            let plane = &planes[i];
            let f1 = plane.face1 as usize;
            let f2 = plane.face2 as usize;
            let v = mesh1.nodes_per_face();

            let (Some(t1), Some(t2)) = (mesh1.thickness_of(f1), mesh2.thickness_of(f2)) else {
                return dt_in;
            };

            // face velocities interpolated at the projected overlap
            // centroids
            let mut verts1 = [DVec3::ZERO; 4];
            let mut vel1 = [DVec3::ZERO; 4];
            let mut verts2 = [DVec3::ZERO; 4];
            let mut vel2 = [DVec3::ZERO; 4];
            for a in 0..v {
                verts1[a] = mesh1.face_vertex(f1, a);
                vel1[a] = mesh1.face_velocity(f1, a);
                verts2[a] = mesh2.face_vertex(f2, a);
                vel2[a] = mesh2.face_velocity(f2, a);
            }
            let fn1 = mesh1.face_normal(f1);
            let fn2 = mesh2.face_normal(f2);
            let vel_f1 = galerkin_eval(&verts1, v, fn1, plane.cxf1, &vel1);
            let vel_f2 = galerkin_eval(&verts2, v, fn2, plane.cxf2, &vel2);

            // velocity projections, regularized away from zero so the
            // divisions below stay finite; near-zero projections mean
            // stationary or tangential motion and produce huge,
            // non-binding estimates
            let reg = |x: Scalar| x + tiny.copysign(x);
            let v1_dot_n = reg(vel_f1.dot(plane.normal));
            let v2_dot_n = reg(vel_f2.dot(plane.normal));
            let v1_dot_n1 = reg(vel_f1.dot(fn1));
            let v2_dot_n2 = reg(vel_f2.dot(fn2));

            // the overlap normal points from face 2 toward face 1's side;
            // interpen advances when face 1 moves along it or face 2
            // against it
            let vel_check1 = v1_dot_n > 0.0;
            let vel_check2 = v2_dot_n < 0.0;

            let max_delta1 = proj_ratio * t1;
            let max_delta2 = proj_ratio * t2;

            // interpenetration measured against each face's own outward
            // normal, not the overlap normal
            let gap_vec = plane.cxf1 - plane.cxf2;
            let gap_f1_n1 = gap_vec.dot(fn1);
            let gap_f2_n2 = gap_vec.dot(fn2);

            let mut best = dt_in;
            let mut consider = |cand: Scalar| {
                if cand > 0.0 {
                    best = best.min(cand.min(1.0e6));
                }
            };

            // 1. current interpenetration already exceeds the allowance
            if plane.in_contact {
                let delta1 = max_delta1 - gap_f1_n1;
                let delta2 = max_delta2 + gap_f2_n2;
                if vel_check1 && delta1 < 0.0 {
                    consider(-delta1 / v1_dot_n1);
                }
                if vel_check2 && delta2 < 0.0 {
                    consider(-delta2 / v2_dot_n2);
                }
            }

            // 2. the velocity projection over one step would exceed the
            // allowance, for every proximate pair whether in contact or
            // not
            let proj1 = plane.cxf1 + dt_in * vel_f1 - plane.cxf2;
            let proj2 = plane.cxf2 + dt_in * vel_f2 - plane.cxf1;
            let proj_n1 = proj1.dot(fn2);
            let proj_n2 = proj2.dot(fn1);

            if vel_check1 && proj_n1 < 0.0 && proj_n1.abs() > max_delta1 {
                consider(-(proj_n1 + max_delta1) / v1_dot_n1);
            }
            if vel_check2 && proj_n2 < 0.0 && proj_n2.abs() > max_delta2 {
                consider(-(proj_n2 + max_delta2) / v2_dot_n2);
            }

            best
        });

        if vote < dt_in {
            debug!(
                scheme = self.id.0,
                vote,
                dt = dt_in,
                "timestep vote reduces dt"
            );
        }
        *dt = vote.min(dt_in);
    }

    fn print_pair_reporting(&self) {
        let total = self.pairs.len().max(1) as f64;
        debug!(
            scheme = self.id.0,
            "{:.1}% of binned interface pairs are active contact candidates",
            self.num_active_pairs() as f64 * 100.0 / total
        );
        if self.pair_reporting.any() {
            debug!(
                scheme = self.id.0,
                bad_orientation = self.pair_reporting.num_bad_orientation,
                bad_face_geometry = self.pair_reporting.num_bad_face_geometry,
                bad_overlaps = self.pair_reporting.num_bad_overlaps,
                "face-pair geometry failures this cycle"
            );
        }
    }
}
