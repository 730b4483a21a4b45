//! The owning context handle: mesh and coupling scheme registries plus
//! the per-cycle drive loop.
//!
//! The context replaces process-wide registries: hosts create one,
//! register meshes and coupling schemes against it, and call
//! [`Context::update`] once per cycle. Dropping the context finalizes
//! everything. No state persists across process invocations.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tactus_contact::{InterfacePair, KinematicPenalty};
use tactus_mesh::{ElementType, SurfaceMesh};
use tactus_mortar::{CsrMatrix, ImplicitEvalMode, SparseMode};
use tactus_types::{
    BinningMethod, ContactCase, ContactMethod, ContactMode, ContactModel, EnforcementMethod,
    LoggingLevel, MeshId, Scalar, SchemeId, TactusError, TactusResult,
};
use tracing::{debug, warn};

use crate::coupling::CouplingScheme;

/// Opaque communicator handle supplied by the host. The library is
/// single-process; the handle is stored for the host's benefit and never
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Communicator(pub u64);

/// The owning library context.
pub struct Context {
    dim: usize,
    #[allow(dead_code)]
    comm: Communicator,
    meshes: HashMap<MeshId, SurfaceMesh>,
    // deterministic scheme iteration order
    schemes: BTreeMap<SchemeId, CouplingScheme>,
}

impl Context {
    /// Creates a context for `dim`-dimensional contact (2 or 3).
    pub fn new(dim: usize) -> TactusResult<Self> {
        if dim != 2 && dim != 3 {
            return Err(TactusError::InvalidMesh(format!(
                "unsupported spatial dimension {dim}"
            )));
        }
        Ok(Self {
            dim,
            comm: Communicator::default(),
            meshes: HashMap::new(),
            schemes: BTreeMap::new(),
        })
    }

    /// Creates a context carrying a host communicator handle.
    pub fn with_communicator(dim: usize, comm: Communicator) -> TactusResult<Self> {
        let mut ctx = Self::new(dim)?;
        ctx.comm = comm;
        Ok(ctx)
    }

    /// Spatial dimension the context was initialized with.
    pub fn dim(&self) -> usize {
        self.dim
    }

    // ─── Mesh registration ────────────────────────────────────

    /// Registers a surface mesh. Re-registering an id replaces the mesh.
    #[allow(clippy::too_many_arguments)]
    pub fn register_mesh(
        &mut self,
        id: MeshId,
        element_type: ElementType,
        num_nodes: usize,
        connectivity: &[u32],
        coords_x: &[Scalar],
        coords_y: &[Scalar],
        coords_z: Option<&[Scalar]>,
    ) -> TactusResult<()> {
        if element_type.dim() != self.dim {
            return Err(TactusError::InvalidMesh(format!(
                "element type {element_type:?} does not match context dimension {}",
                self.dim
            )));
        }
        let mesh = SurfaceMesh::new(
            element_type,
            num_nodes,
            connectivity,
            coords_x,
            coords_y,
            coords_z,
        )?;
        if self.meshes.insert(id, mesh).is_some() {
            warn!(mesh = id.0, "replacing previously registered mesh");
        }
        Ok(())
    }

    fn mesh_mut(&mut self, id: MeshId) -> TactusResult<&mut SurfaceMesh> {
        self.meshes
            .get_mut(&id)
            .ok_or_else(|| TactusError::UnknownId(format!("mesh {}", id.0)))
    }

    /// Read access to a registered mesh.
    pub fn mesh(&self, id: MeshId) -> TactusResult<&SurfaceMesh> {
        self.meshes
            .get(&id)
            .ok_or_else(|| TactusError::UnknownId(format!("mesh {}", id.0)))
    }

    /// Registers nodal velocities on a mesh.
    pub fn register_nodal_velocities(
        &mut self,
        id: MeshId,
        vx: &[Scalar],
        vy: &[Scalar],
        vz: Option<&[Scalar]>,
    ) -> TactusResult<()> {
        self.mesh_mut(id)?.register_velocities(vx, vy, vz)
    }

    /// Registers (allocates) the nodal response sink on a mesh; required
    /// before any method that emits forces.
    pub fn register_nodal_response(&mut self, id: MeshId) -> TactusResult<()> {
        self.mesh_mut(id)?.register_response();
        Ok(())
    }

    /// Registers per-element thickness; required for the AUTO case and
    /// element-wise penalty.
    pub fn set_element_thickness(&mut self, id: MeshId, t: &[Scalar]) -> TactusResult<()> {
        self.mesh_mut(id)?.register_element_thickness(t)
    }

    /// Sets a constant kinematic penalty stiffness on a mesh.
    pub fn set_kinematic_constant_penalty(&mut self, id: MeshId, k: Scalar) -> TactusResult<()> {
        self.mesh_mut(id)?.constant_penalty = Some(k);
        Ok(())
    }

    /// Sets element-wise kinematic penalty data: per-element material
    /// modulus and thickness.
    pub fn set_kinematic_element_penalty(
        &mut self,
        id: MeshId,
        bulk_modulus: &[Scalar],
        thickness: &[Scalar],
    ) -> TactusResult<()> {
        let mesh = self.mesh_mut(id)?;
        mesh.register_bulk_modulus(bulk_modulus)?;
        mesh.register_element_thickness(thickness)
    }

    /// Accumulated nodal response `(x, y, z)` channels of a mesh; the z
    /// channel is empty in 2D.
    pub fn response(&self, id: MeshId) -> TactusResult<(&[Scalar], &[Scalar], &[Scalar])> {
        let mesh = self.mesh(id)?;
        if !mesh.has_response() {
            return Err(TactusError::MissingData(format!(
                "nodal response not registered on mesh {}",
                id.0
            )));
        }
        Ok((&mesh.resp_x, &mesh.resp_y, &mesh.resp_z))
    }

    /// Clears a mesh's accumulated response; the host owns calling this
    /// between cycles.
    pub fn clear_response(&mut self, id: MeshId) -> TactusResult<()> {
        self.mesh_mut(id)?.clear_response();
        Ok(())
    }

    // ─── Coupling schemes ─────────────────────────────────────

    /// Creates a coupling scheme between two registered meshes (the same
    /// id twice for single-mesh auto contact).
    #[allow(clippy::too_many_arguments)]
    pub fn create_coupling_scheme(
        &mut self,
        id: SchemeId,
        mesh_id1: MeshId,
        mesh_id2: MeshId,
        mode: ContactMode,
        case: ContactCase,
        method: ContactMethod,
        model: ContactModel,
        enforcement: EnforcementMethod,
        binning: BinningMethod,
    ) -> TactusResult<()> {
        if !self.meshes.contains_key(&mesh_id1) || !self.meshes.contains_key(&mesh_id2) {
            return Err(TactusError::UnknownId(format!(
                "coupling scheme {} references unregistered meshes",
                id.0
            )));
        }
        let scheme = CouplingScheme::new(
            id, mesh_id1, mesh_id2, mode, case, method, model, enforcement, binning,
        );
        if self.schemes.insert(id, scheme).is_some() {
            warn!(scheme = id.0, "replacing previously registered coupling scheme");
        }
        Ok(())
    }

    fn scheme_mut(&mut self, id: SchemeId) -> TactusResult<&mut CouplingScheme> {
        self.schemes
            .get_mut(&id)
            .ok_or_else(|| TactusError::UnknownId(format!("coupling scheme {}", id.0)))
    }

    /// Read access to a coupling scheme.
    pub fn scheme(&self, id: SchemeId) -> TactusResult<&CouplingScheme> {
        self.schemes
            .get(&id)
            .ok_or_else(|| TactusError::UnknownId(format!("coupling scheme {}", id.0)))
    }

    /// Sets the penalty stiffness policy of a scheme.
    pub fn set_penalty_options(
        &mut self,
        id: SchemeId,
        kinematic: KinematicPenalty,
    ) -> TactusResult<()> {
        self.scheme_mut(id)?.enforcement_options.penalty.kinematic = Some(kinematic);
        Ok(())
    }

    /// Sets the Lagrange-multiplier enforcement options of a scheme.
    pub fn set_lagrange_multiplier_options(
        &mut self,
        id: SchemeId,
        eval_mode: ImplicitEvalMode,
        sparse_mode: SparseMode,
    ) -> TactusResult<()> {
        let lm = &mut self.scheme_mut(id)?.enforcement_options.lagrange_multiplier;
        lm.eval_mode = eval_mode;
        lm.sparse_mode = sparse_mode;
        lm.options_set = true;
        Ok(())
    }

    /// Pins an explicit interface pair list on a scheme, disabling
    /// binning.
    pub fn set_interface_pairs(
        &mut self,
        id: SchemeId,
        pairs: Vec<InterfacePair>,
    ) -> TactusResult<()> {
        self.scheme_mut(id)?.set_interface_pairs(pairs);
        Ok(())
    }

    /// Sets the interface-output directory and cycle increment of a
    /// scheme.
    pub fn set_output_directory(
        &mut self,
        id: SchemeId,
        dir: PathBuf,
        cycle_incr: usize,
    ) -> TactusResult<()> {
        let scheme = self.scheme_mut(id)?;
        scheme.output_directory = Some(dir);
        scheme.params.vis_cycle_incr = cycle_incr;
        Ok(())
    }

    /// Sets the per-scheme logging level.
    pub fn set_logging_level(&mut self, id: SchemeId, level: LoggingLevel) -> TactusResult<()> {
        self.scheme_mut(id)?.logging_level = level;
        Ok(())
    }

    /// Enables or disables a scheme's timestep vote.
    pub fn enable_timestep_vote(&mut self, id: SchemeId, enable: bool) -> TactusResult<()> {
        self.scheme_mut(id)?.params.enable_timestep_vote = enable;
        Ok(())
    }

    // ─── Mortar output accessors ──────────────────────────────

    /// The assembled mortar CSR matrix of a scheme, if the last cycle
    /// finalized one.
    pub fn jacobian_csr(&self, id: SchemeId) -> TactusResult<&CsrMatrix> {
        self.scheme(id)?
            .mortar_data()
            .and_then(|d| d.csr())
            .ok_or_else(|| {
                TactusError::MissingData(format!(
                    "no assembled sparse matrix on coupling scheme {}",
                    id.0
                ))
            })
    }

    /// The weighted nodal gap field on the nonmortar side.
    pub fn gap_field(&self, id: SchemeId) -> TactusResult<&[Scalar]> {
        self.scheme(id)?
            .mortar_data()
            .map(|d| d.gaps.as_slice())
            .ok_or_else(|| {
                TactusError::MissingData(format!("no mortar data on coupling scheme {}", id.0))
            })
    }

    /// The nodal pressure field on the nonmortar side.
    pub fn pressure_field(&self, id: SchemeId) -> TactusResult<&[Scalar]> {
        self.scheme(id)?
            .mortar_data()
            .map(|d| d.pressures.as_slice())
            .ok_or_else(|| {
                TactusError::MissingData(format!("no mortar data on coupling scheme {}", id.0))
            })
    }

    /// Writes the solved nodal pressures back (host side of the
    /// Lagrange-multiplier loop).
    pub fn set_pressure_field(&mut self, id: SchemeId, pressures: &[Scalar]) -> TactusResult<()> {
        let Some(data) = self.scheme_mut(id)?.mortar_data_mut() else {
            return Err(TactusError::MissingData(format!(
                "no mortar data on coupling scheme {}",
                id.0
            )));
        };
        if pressures.len() != data.pressures.len() {
            return Err(TactusError::MissingData(format!(
                "pressure field length {} does not match node count {}",
                pressures.len(),
                data.pressures.len()
            )));
        }
        data.pressures.copy_from_slice(pressures);
        Ok(())
    }

    // ─── Drive loop ───────────────────────────────────────────

    /// Runs one contact cycle over every coupling scheme: refresh mesh
    /// views, bin, geometric checks, physics, timestep vote.
    ///
    /// `dt` carries the host's proposed timestep in and the (possibly
    /// reduced) vote out; the sentinel `-1.0` signals a scheme that
    /// needed velocities it never got. Returns the first error
    /// encountered; remaining schemes still run.
    pub fn update(&mut self, cycle: usize, t: Scalar, dt: &mut Scalar) -> TactusResult<()> {
        let mut first_err: Option<TactusError> = None;
        let scheme_ids: Vec<SchemeId> = self.schemes.keys().copied().collect();

        for id in scheme_ids {
            let result = self.update_scheme(id, cycle, t, dt);
            if let Err(err) = result {
                warn!(scheme = id.0, %err, "coupling scheme cycle failed");
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }

        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn update_scheme(
        &mut self,
        id: SchemeId,
        cycle: usize,
        t: Scalar,
        dt: &mut Scalar,
    ) -> TactusResult<()> {
        let (mesh_id1, mesh_id2) = {
            let scheme = self.scheme(id)?;
            (scheme.mesh_id1, scheme.mesh_id2)
        };
        let same_mesh = mesh_id1 == mesh_id2;

        // detach the meshes so the scheme can borrow them mutably
        let mut mesh1 = self
            .meshes
            .remove(&mesh_id1)
            .ok_or_else(|| TactusError::UnknownId(format!("mesh {}", mesh_id1.0)))?;
        let mut mesh2 = if same_mesh {
            None
        } else {
            match self.meshes.remove(&mesh_id2) {
                Some(m) => Some(m),
                None => {
                    self.meshes.insert(mesh_id1, mesh1);
                    return Err(TactusError::UnknownId(format!("mesh {}", mesh_id2.0)));
                }
            }
        };

        let scheme = self
            .schemes
            .get_mut(&id)
            .expect("scheme id collected from the registry");

        let result = (|| -> TactusResult<()> {
            scheme.init(&mut mesh1, mesh2.as_mut())?;
            scheme.perform_binning(&mesh1, mesh2.as_ref());
            scheme.apply(&mut mesh1, mesh2.as_mut(), cycle, t, dt)?;
            Ok(())
        })();

        debug!(
            scheme = id.0,
            cycle,
            active_pairs = scheme.num_active_pairs(),
            "coupling scheme cycle complete"
        );

        // reattach regardless of outcome
        self.meshes.insert(mesh_id1, mesh1);
        if let Some(m2) = mesh2 {
            self.meshes.insert(mesh_id2, m2);
        }

        result
    }
}
