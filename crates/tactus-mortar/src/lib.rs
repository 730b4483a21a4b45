//! # tactus-mortar
//!
//! Mortar contact: integration weights by Gauss quadrature over contact
//! plane overlaps, nodal gap and pressure fields on the nonmortar surface,
//! Lagrange-multiplier forces, and the block Jacobian assembled into a
//! global sparse matrix.
//!
//! Terminology follows the mortar literature: mesh 1 is the **mortar**
//! (integration master) side, mesh 2 the **nonmortar** (slave) side
//! carrying the pressure unknowns.

pub mod data;
pub mod elem;
pub mod integ;
pub mod sparse;
pub mod weights;

pub use data::{ImplicitEvalMode, MortarData, SparseMode};
pub use elem::{MortarStorage, SurfaceContactElem};
pub use integ::{gauss_2x2, tri_midpoint_rule};
pub use sparse::{CsrMatrix, DenseMat};
pub use weights::{compute_aligned_mortar_weights, compute_mortar_weights};
