//! # tactus-contact
//!
//! The contact kernel pipeline, split into the phases the coupling scheme
//! sequences each cycle:
//!
//! 1. **Binning** — spatial search producing *candidate* face pairs whose
//!    bounding spheres can interact.
//! 2. **Contact-plane construction** — per candidate pair, the geometric
//!    admissibility check: orientation filter, common plane, projection,
//!    convex overlap, gap.
//! 3. **Penalty physics** — per active plane, common-plane penalty forces
//!    accumulated into both meshes' nodal response channels.
//!
//! Mortar physics builds on the same contact planes and lives in
//! `tactus-mortar`.

pub mod binning;
pub mod fe;
pub mod pair;
pub mod penalty;
pub mod plane;

pub use binning::find_interface_pairs;
pub use pair::InterfacePair;
pub use penalty::{
    apply_common_plane_penalty, compute_common_plane_forces, scatter_forces,
    scatter_forces_same_mesh, KinematicPenalty, PenaltyResult, PlaneForces,
};
pub use plane::{check_interface_pair, ContactPlane, GeomFilter};
