//! Strongly-typed identifiers for registered entities.
//!
//! Newtype wrappers prevent accidental mixing of mesh ids with coupling
//! scheme ids. Face and node indices stay plain `usize` — they only index
//! arrays local to one mesh.

use serde::{Deserialize, Serialize};

/// Identifier of a registered surface mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// Identifier of a registered coupling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemeId(pub u32);

impl From<u32> for MeshId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for SchemeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
