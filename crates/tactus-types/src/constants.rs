//! Numeric defaults and tolerance constants.
//!
//! Length-like tolerances are ratios scaled by face radii at the point of
//! use; only dimensionless or truly absolute quantities live here.

use crate::scalar::Scalar;

/// Ratio of the larger face radius used as the (negative) contact gap
/// tolerance: a pair is in contact when `gap < -GAP_TOL_RATIO * max(r1, r2)`.
pub const GAP_TOL_RATIO: Scalar = 1.0e-12;

/// Ratio of the larger face radius used as the (positive) tied-contact gap
/// tolerance.
pub const GAP_TIED_TOL: Scalar = 0.1;

/// Overlap-polygon edges shorter than this ratio of the face radius are
/// collapsed.
pub const LEN_COLLAPSE_RATIO: Scalar = 1.0e-8;

/// Overlap areas below this fraction of the smaller face area are treated
/// as no overlap.
pub const OVERLAP_AREA_FRAC: Scalar = 1.0e-8;

/// Fraction of element thickness allowed as interpenetration before the
/// timestep vote asks for a smaller step.
pub const TIMESTEP_PEN_FRAC: Scalar = 0.3;

/// Fraction of the pair thickness sum beyond which interpenetration is
/// treated as pass-through geometry under the AUTO contact case.
pub const AUTO_INTERPEN_FRAC: Scalar = 0.3;

/// Absolute regularization added to velocity projections in the timestep
/// vote to avoid division by zero.
pub const TIMESTEP_VEL_TINY: Scalar = 1.0e-12;

/// Coincident interior vertices closer than this are deduplicated during
/// polygon clipping.
pub const INTERIOR_VERTEX_DEDUP_TOL: Scalar = 1.0e-15;

/// Determinant threshold below which two 2D segments are treated as
/// parallel.
pub const SEGMENT_DET_TOL: Scalar = 1.0e-12;

/// Timesteps below this are too small to refine further; the vote leaves
/// them unchanged.
pub const MIN_VOTABLE_DT: Scalar = 1.0e-8;
