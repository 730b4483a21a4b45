//! Contact-model enumerations.
//!
//! Discriminant values are part of the host contract and must not be
//! renumbered: hosts drive the library through the integer values.

use serde::{Deserialize, Serialize};

/// The kind of contact interaction between the two registered surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContactMode {
    SurfaceToSurface = 0,
    SurfaceToSurfaceConforming = 1,
}

/// Specialization of the contact application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContactCase {
    NoCase = 0,
    /// Surfaces cannot slide; pair topology is fixed after the first bin.
    NoSliding = 1,
    /// Single-mesh auto contact; requires element thickness.
    Auto = 2,
    TiedNormal = 3,
}

/// The contact method, i.e. the geometric/physics kernel pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContactMethod {
    CommonPlane = 0,
    SingleMortar = 1,
    AlignedMortar = 2,
    /// Emits mortar integration weights only; no forces.
    MortarWeights = 3,
}

/// The constitutive model acting on the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContactModel {
    Frictionless = 0,
    /// Cohesive variant: positive gaps also generate (tensile) forces.
    Tied = 1,
    /// Reserved; no implementation.
    Coulomb = 2,
    NullModel = 3,
}

/// How the non-penetration condition is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum EnforcementMethod {
    Penalty = 0,
    LagrangeMultiplier = 1,
    NullEnforcement = 2,
}

/// Candidate pair search policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum BinningMethod {
    CartesianProduct = 0,
    Grid = 1,
}

/// Per-coupling-scheme logging level. `Undefined` keeps the process-wide
/// level untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum LoggingLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Undefined = 4,
}
