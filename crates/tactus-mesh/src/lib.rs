//! # tactus-mesh
//!
//! Surface mesh storage for the contact library.
//!
//! A [`SurfaceMesh`] is the library-side record of one host-registered
//! contact surface: SoA coordinate channels, flat connectivity, optional
//! velocity channels, writable nodal response channels, and per-face data
//! (outward normal, centroid, enclosing radius, area) cached once per
//! binned cycle. The accessor surface is read-only; only the response
//! channels and the cached face data mutate after registration.

pub mod element;
pub mod mesh;

pub use element::ElementType;
pub use mesh::SurfaceMesh;
