//! Surface element types.

use serde::{Deserialize, Serialize};

/// The face type shared by every element of one surface mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    /// Two-node segment (2D meshes).
    Segment,
    /// Three-node triangle (3D meshes).
    Triangle,
    /// Four-node quadrilateral (3D meshes).
    Quad,
}

impl ElementType {
    /// Number of vertices per face.
    #[inline]
    pub fn nodes_per_face(self) -> usize {
        match self {
            ElementType::Segment => 2,
            ElementType::Triangle => 3,
            ElementType::Quad => 4,
        }
    }

    /// Spatial dimension of meshes built from this element.
    #[inline]
    pub fn dim(self) -> usize {
        match self {
            ElementType::Segment => 2,
            ElementType::Triangle | ElementType::Quad => 3,
        }
    }
}
