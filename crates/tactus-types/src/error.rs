//! Error types.
//!
//! Two tiers, per the library's propagation policy:
//!
//! - [`TactusError`] — fatal or host-visible failures (bad registration,
//!   invalid configuration, I/O). Returned as `Err` from the public API.
//! - [`FaceGeomError`] — per-pair computational geometry failures. These are
//!   never fatal: the offending pair is dropped from the active set for the
//!   cycle and the error is tallied for diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the library's fallible public operations.
#[derive(Debug, Error)]
pub enum TactusError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A required registration is missing (response, velocity, thickness...).
    #[error("Missing registered data: {0}")]
    MissingData(String),

    /// Coupling scheme configuration failed validation.
    #[error("Invalid coupling scheme configuration: {0:?}")]
    InvalidConfig(Vec<ConfigError>),

    /// An id lookup failed.
    #[error("Unknown id: {0}")]
    UnknownId(String),

    /// The physics kernel could not complete the cycle.
    #[error("Cycle failed: {0}")]
    CycleFailed(String),

    /// I/O failure while writing interface output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while writing interface output.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, TactusError>`.
pub type TactusResult<T> = Result<T, TactusError>;

/// Tagged per-pair geometry error.
///
/// Success is expressed through `Result`; there is no "no error" variant.
/// Note that a zero-area or collapsed overlap is *not* an error — such pairs
/// are reported as inactive without a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceGeomError {
    /// A face had fewer vertices than its element type requires, or
    /// degenerate (duplicated / collinear) vertex input.
    InvalidFaceInput,
    /// A projected face failed the CCW convexity check.
    FaceOrientation,
    /// The clipping bookkeeping overflowed its vertex capacity; the
    /// overlap is numerically degenerate.
    DegenerateOverlap,
    /// An interior-vertex index ran past the collected overlap vertices.
    VertexIndexExceedsOverlap,
}

/// Configuration validation diagnostics.
///
/// `init()` collects every failed check rather than stopping at the first,
/// so a host sees the full list in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    InvalidMode,
    NoModeImplementation,
    InvalidCase,
    /// Case requires data that was not registered (e.g. AUTO without
    /// element thickness).
    InvalidCaseData,
    InvalidMethod,
    NoMethodImplementation,
    /// The two meshes have different surface element types.
    DifferentFaceTypes,
    /// Mortar methods require two distinct meshes.
    SameMeshIds,
    /// Mortar methods are 3D only.
    InvalidDim,
    /// A method that emits forces needs nodal response registered.
    NullNodalResponse,
    /// Mortar methods require disjoint node numbering across the meshes.
    OverlappingNodeIds,
    InvalidModel,
    NoModelImplementationForMethod,
    InvalidEnforcement,
    InvalidEnforcementForMethod,
    NoEnforcementImplementationForOption,
    /// Enforcement chosen but its options were never set.
    OptionsNotSet,
    /// Registered enforcement data failed its consistency check.
    EnforcementDataError,
}
