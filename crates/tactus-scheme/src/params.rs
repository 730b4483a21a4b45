//! Coupling scheme parameters and enforcement options.

use serde::{Deserialize, Serialize};
use tactus_contact::KinematicPenalty;
use tactus_mortar::{ImplicitEvalMode, SparseMode};
use tactus_types::{constants, Scalar};

/// Numeric knobs of one coupling scheme.
///
/// All length-like tolerances are ratios applied to face radii at the
/// point of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Contact gap tolerance ratio (applied negated outside the tied
    /// model).
    pub gap_tol_ratio: Scalar,
    /// Tied-model gap tolerance ratio (positive band).
    pub gap_tied_tol: Scalar,
    /// Overlap short-edge collapse ratio.
    pub len_collapse_ratio: Scalar,
    /// Minimum overlap area as a fraction of the smaller face area.
    pub overlap_area_frac: Scalar,
    /// Interpenetration fraction of element thickness tolerated per step
    /// by the timestep vote.
    pub timestep_pen_frac: Scalar,
    /// AUTO-case pass-through cutoff as a fraction of the pair thickness
    /// sum.
    pub auto_interpen_frac: Scalar,
    /// Absolute regularization for near-zero velocity projections in the
    /// timestep vote.
    pub timestep_vel_tiny: Scalar,
    /// Whether the scheme contributes a timestep vote.
    pub enable_timestep_vote: bool,
    /// Set by case validation: AUTO contact interpenetration culling.
    pub auto_interpen_check: bool,
    /// Interface output is written every this many cycles (0 disables).
    pub vis_cycle_incr: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gap_tol_ratio: constants::GAP_TOL_RATIO,
            gap_tied_tol: constants::GAP_TIED_TOL,
            len_collapse_ratio: constants::LEN_COLLAPSE_RATIO,
            overlap_area_frac: constants::OVERLAP_AREA_FRAC,
            timestep_pen_frac: constants::TIMESTEP_PEN_FRAC,
            auto_interpen_frac: constants::AUTO_INTERPEN_FRAC,
            timestep_vel_tiny: constants::TIMESTEP_VEL_TINY,
            enable_timestep_vote: true,
            auto_interpen_check: false,
            vis_cycle_incr: 0,
        }
    }
}

/// Options under penalty enforcement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PenaltyOptions {
    /// Stiffness policy; `None` until the host sets it.
    pub kinematic: Option<KinematicPenalty>,
}

impl PenaltyOptions {
    /// True once the host picked a stiffness policy.
    pub fn constraint_type_set(&self) -> bool {
        self.kinematic.is_some()
    }
}

/// Options under Lagrange-multiplier enforcement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LagrangeMultiplierOptions {
    pub eval_mode: ImplicitEvalMode,
    pub sparse_mode: SparseMode,
    /// True once the host set the options.
    pub options_set: bool,
}

impl Default for LagrangeMultiplierOptions {
    fn default() -> Self {
        Self {
            eval_mode: ImplicitEvalMode::MortarResidual,
            sparse_mode: SparseMode::GlobalCsr,
            options_set: false,
        }
    }
}

/// All enforcement options of a coupling scheme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnforcementOptions {
    pub penalty: PenaltyOptions,
    pub lagrange_multiplier: LagrangeMultiplierOptions,
}
