//! Scalar type alias for the library.
//!
//! Contact geometry is tolerance-driven: overlap clipping, gap signs, and
//! short-edge collapse all compare lengths against small thresholds scaled
//! by face radii. Double precision is required for those predicates to stay
//! stable on realistic meshes.

/// The floating-point type used throughout the library.
pub type Scalar = f64;
