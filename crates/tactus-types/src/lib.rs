//! # tactus-types
//!
//! Shared types, identifiers, enumerations, error types, and numeric
//! constants for the Tactus contact-interface library.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Tactus crates share.

pub mod constants;
pub mod enums;
pub mod error;
pub mod ids;
pub mod scalar;

pub use enums::{
    BinningMethod, ContactCase, ContactMethod, ContactModel, EnforcementMethod, LoggingLevel,
    ContactMode,
};
pub use error::{FaceGeomError, TactusError, TactusResult};
pub use ids::{MeshId, SchemeId};
pub use scalar::Scalar;
