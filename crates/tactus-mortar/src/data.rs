//! Global mortar method data: nodal gap and pressure fields, force
//! application, and assembly of mortar weights / block Jacobian into a
//! global sparse matrix.
//!
//! Node ids of the two meshes index one shared, contiguous equilibrium
//! block; the pressure dof of nonmortar node `n` lives at row
//! `dim * num_total_nodes + n`. The coupling scheme validates that the two
//! meshes' node ranges are disjoint before any of this runs.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tactus_mesh::SurfaceMesh;
use tactus_types::Scalar;
use tracing::debug;

use crate::elem::MortarStorage;
use crate::sparse::{CsrMatrix, DenseMat};

/// What the Lagrange-multiplier path evaluates each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImplicitEvalMode {
    /// Emit mortar weights only; no forces, no Jacobian.
    MortarWeightsEval,
    /// Gap field and residual (nodal forces from current pressures).
    MortarResidual,
    /// Residual plus Jacobian contributions.
    MortarResidualJacobian,
}

/// How assembled operators are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparseMode {
    /// One global CSR matrix over all dofs.
    GlobalCsr,
    /// Per-element dense blocks, reduced by the host.
    ElementDense,
}

/// Per-element Jacobian blocks for the `ElementDense` sparse mode.
///
/// Block spaces: 0 = mortar primal, 1 = nonmortar primal, 2 = Lagrange
/// multiplier. Only primal–dual couplings are nonzero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElemBlockJ {
    /// Element (record) id this block set belongs to.
    pub elem_id: usize,
    /// (mortar primal, dual) block: `dim·V × V`.
    pub jrp_mortar: DenseMat,
    /// (nonmortar primal, dual) block: `dim·V × V`.
    pub jrp_nonmortar: DenseMat,
    /// (dual, mortar primal) block: `V × dim·V`.
    pub jgu_mortar: DenseMat,
    /// (dual, nonmortar primal) block: `V × dim·V`.
    pub jgu_nonmortar: DenseMat,
}

/// Method data owned by a mortar coupling scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortarData {
    /// Spatial dimension.
    pub dim: usize,
    /// Total node count across both meshes (contiguous numbering).
    pub num_total_nodes: usize,
    /// Element records and packed weights for the current cycle.
    pub storage: MortarStorage,
    /// Weighted nodal gaps, indexed by (nonmortar) node id.
    pub gaps: Vec<Scalar>,
    /// Nodal pressures (Lagrange multipliers), indexed by node id; written
    /// by the host between cycles.
    pub pressures: Vec<Scalar>,
    /// Assembly triplets for the current cycle.
    triplets: Vec<(usize, usize, Scalar)>,
    /// Assembled global matrix (after [`MortarData::finalize`]).
    smat: Option<CsrMatrix>,
    /// Per-element dense blocks for `SparseMode::ElementDense`.
    pub elem_blocks: Vec<ElemBlockJ>,
}

impl MortarData {
    pub fn new(dim: usize, num_total_nodes: usize) -> Self {
        Self {
            dim,
            num_total_nodes,
            storage: MortarStorage::new(),
            gaps: vec![0.0; num_total_nodes],
            pressures: vec![0.0; num_total_nodes],
            triplets: Vec::new(),
            smat: None,
            elem_blocks: Vec::new(),
        }
    }

    /// Row/column of the first pressure dof.
    #[inline]
    pub fn pressure_offset(&self) -> usize {
        self.dim * self.num_total_nodes
    }

    /// Total dof count of the assembled operator (equilibrium + pressure).
    #[inline]
    pub fn total_dofs(&self) -> usize {
        (self.dim + 1) * self.num_total_nodes
    }

    /// Resets per-cycle state; registered pressures persist.
    pub fn begin_cycle(&mut self) {
        self.storage.clear();
        self.triplets.clear();
        self.smat = None;
        self.elem_blocks.clear();
        self.gaps.iter_mut().for_each(|g| *g = 0.0);
    }

    /// Accumulates the weighted nodal gaps of one element record.
    ///
    /// The gap at nonmortar node `a` is the mortar-weighted normal
    /// distance between the two surfaces:
    /// `g_a = n̂_a · (Σ_b W_mn(b, a) x¹_b − Σ_b W_nn(a, b) x²_b)`.
    pub fn accumulate_nodal_gaps(&mut self, elem_id: usize, mesh2: &SurfaceMesh) {
        let e = &self.storage.elems[elem_id];
        let v = e.num_face_vert;
        let f2 = e.face2 as usize;
        let n_hat = e.normal2;

        for a in 0..v {
            let node_a = mesh2.face_node_id(f2, a);
            let mut diff = DVec3::ZERO;
            for b in 0..v {
                diff += self.storage.mn_wt(elem_id, b, a) * e.verts1[b];
                diff -= self.storage.nn_wt(elem_id, a, b) * e.verts2[b];
            }
            self.gaps[node_a] += n_hat.dot(diff);
        }
    }

    /// Applies Lagrange-multiplier forces from the current pressures into
    /// both meshes' response channels.
    ///
    /// Nonmortar node `a` with pressure `p_a` loads mortar node `b` with
    /// `+p_a·W_mn(b, a)·n̂_a` and nonmortar node `b` with
    /// `−p_a·W_nn(a, b)·n̂_a`; the partition of unity makes the two totals
    /// balance.
    pub fn apply_pressure_forces(
        &self,
        elem_id: usize,
        mesh1: &mut SurfaceMesh,
        mesh2: &mut SurfaceMesh,
    ) {
        let e = &self.storage.elems[elem_id];
        let v = e.num_face_vert;
        let f1 = e.face1 as usize;
        let f2 = e.face2 as usize;
        let n_hat = e.normal2;

        for a in 0..v {
            let node_a = mesh2.face_node_id(f2, a);
            let p_a = self.pressures[node_a];
            if p_a == 0.0 {
                continue;
            }
            for b in 0..v {
                let f_m = p_a * self.storage.mn_wt(elem_id, b, a) * n_hat;
                mesh1.accumulate_response(mesh1.face_node_id(f1, b), f_m);
                let f_nm = -p_a * self.storage.nn_wt(elem_id, a, b) * n_hat;
                mesh2.accumulate_response(mesh2.face_node_id(f2, b), f_nm);
            }
        }
    }

    /// Assembles one record's mortar weights into the global matrix:
    /// rows are nonmortar node ids, columns mortar and nonmortar node ids.
    pub fn assemble_mortar_wts(
        &mut self,
        elem_id: usize,
        mesh1: &SurfaceMesh,
        mesh2: &SurfaceMesh,
    ) {
        let e = &self.storage.elems[elem_id];
        let v = e.num_face_vert;
        let f1 = e.face1 as usize;
        let f2 = e.face2 as usize;

        for a in 0..v {
            let row = mesh2.face_node_id(f2, a);
            for b in 0..v {
                let col_m = mesh1.face_node_id(f1, b);
                let col_nm = mesh2.face_node_id(f2, b);
                self.triplets
                    .push((row, col_m, self.storage.mn_wt(elem_id, b, a)));
                self.triplets
                    .push((row, col_nm, self.storage.nn_wt(elem_id, a, b)));
            }
        }
    }

    /// Builds one record's Jacobian blocks and either scatters them into
    /// the global triplets (`GlobalCsr`) or stores them densely
    /// (`ElementDense`).
    ///
    /// The off-diagonal blocks couple primal displacements to the
    /// pressure unknowns; entries are mortar weights times nonmortar
    /// normal components, with opposite signs on the two primal sides.
    pub fn assemble_jacobian(
        &mut self,
        elem_id: usize,
        mesh1: &SurfaceMesh,
        mesh2: &SurfaceMesh,
        sparse_mode: SparseMode,
    ) {
        let e = self.storage.elems[elem_id].clone();
        let v = e.num_face_vert;
        let dim = self.dim;
        let f1 = e.face1 as usize;
        let f2 = e.face2 as usize;
        let n_hat = e.normal2;
        let n_comp = [n_hat.x, n_hat.y, n_hat.z];

        let mut blocks = ElemBlockJ {
            elem_id,
            jrp_mortar: DenseMat::zeros(dim * v, v),
            jrp_nonmortar: DenseMat::zeros(dim * v, v),
            jgu_mortar: DenseMat::zeros(v, dim * v),
            jgu_nonmortar: DenseMat::zeros(v, dim * v),
        };

        for a in 0..v {
            // pressure dof / gap row of nonmortar node a
            for b in 0..v {
                let w_m = self.storage.mn_wt(elem_id, b, a);
                let w_nm = self.storage.nn_wt(elem_id, a, b);
                for d in 0..dim {
                    let val_m = w_m * n_comp[d];
                    let val_nm = -w_nm * n_comp[d];
                    *blocks.jrp_mortar.at_mut(dim * b + d, a) += val_m;
                    *blocks.jrp_nonmortar.at_mut(dim * b + d, a) += val_nm;
                    // the constraint gradient mirrors the force direction
                    *blocks.jgu_mortar.at_mut(a, dim * b + d) += val_m;
                    *blocks.jgu_nonmortar.at_mut(a, dim * b + d) += val_nm;
                }
            }
        }

        match sparse_mode {
            SparseMode::GlobalCsr => {
                let pres_off = self.pressure_offset();
                for a in 0..v {
                    let pres_dof = pres_off + mesh2.face_node_id(f2, a);
                    for b in 0..v {
                        let m_node = mesh1.face_node_id(f1, b);
                        let nm_node = mesh2.face_node_id(f2, b);
                        for d in 0..dim {
                            let jm = blocks.jrp_mortar.at(dim * b + d, a);
                            let jnm = blocks.jrp_nonmortar.at(dim * b + d, a);
                            // primal rows, pressure column
                            self.triplets.push((dim * m_node + d, pres_dof, jm));
                            self.triplets.push((dim * nm_node + d, pres_dof, jnm));
                            // pressure row, primal columns
                            self.triplets.push((pres_dof, dim * m_node + d, jm));
                            self.triplets.push((pres_dof, dim * nm_node + d, jnm));
                        }
                    }
                }
            }
            SparseMode::ElementDense => {
                self.elem_blocks.push(blocks);
            }
        }
    }

    /// Finalizes the global matrix from the accumulated triplets.
    pub fn finalize(&mut self, square_over_nodes_only: bool) {
        let n = if square_over_nodes_only {
            self.num_total_nodes
        } else {
            self.total_dofs()
        };
        debug!(
            triplets = self.triplets.len(),
            dofs = n,
            "finalizing mortar sparse matrix"
        );
        self.smat = Some(CsrMatrix::from_triplets(n, n, &self.triplets));
    }

    /// The assembled global matrix, if finalized this cycle.
    pub fn csr(&self) -> Option<&CsrMatrix> {
        self.smat.as_ref()
    }
}
