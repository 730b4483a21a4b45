//! Per-pair mortar element records with arena-owned weight storage.
//!
//! Every active mortar pair gets a [`SurfaceContactElem`] describing the
//! two faces and the overlap polygon, plus a `2·V·V` slice of packed
//! mortar weights. The weights for all records of a cycle live in one
//! [`MortarStorage`] arena — records carry `(offset, length)` rather than
//! owning allocations, and destruction is bulk.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tactus_types::Scalar;

/// One active mortar pair: geometry plus a window into the weight arena.
///
/// Weight layout within the window: `V·V` nonmortar–nonmortar products
/// first, then `V·V` mortar–nonmortar products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceContactElem {
    /// Spatial dimension.
    pub dim: usize,
    /// Mortar-side face id (mesh 1).
    pub face1: u32,
    /// Nonmortar-side face id (mesh 2).
    pub face2: u32,
    /// Vertices per face.
    pub num_face_vert: usize,
    /// Mortar face vertex coordinates.
    pub verts1: [DVec3; 4],
    /// Nonmortar face vertex coordinates.
    pub verts2: [DVec3; 4],
    /// Mortar face outward unit normal.
    pub normal1: DVec3,
    /// Nonmortar face outward unit normal.
    pub normal2: DVec3,
    /// Overlap polygon in global coordinates.
    pub overlap: Vec<DVec3>,
    /// Overlap area.
    pub area: Scalar,
    /// Offset of this record's weights in the arena.
    pub wt_offset: usize,
}

impl SurfaceContactElem {
    /// Number of weights this record owns in the arena.
    #[inline]
    pub fn num_wts(&self) -> usize {
        2 * self.num_face_vert * self.num_face_vert
    }
}

/// Packed storage for every mortar element record of a cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MortarStorage {
    /// All records.
    pub elems: Vec<SurfaceContactElem>,
    /// Packed weights; each record owns `2·V·V` consecutive entries.
    pub wts: Vec<Scalar>,
}

impl MortarStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all records and weights for the next cycle.
    pub fn clear(&mut self) {
        self.elems.clear();
        self.wts.clear();
    }

    /// Appends a record, allocating its zeroed weight window; returns the
    /// record index.
    #[allow(clippy::too_many_arguments)]
    pub fn push_elem(
        &mut self,
        dim: usize,
        face1: u32,
        face2: u32,
        num_face_vert: usize,
        verts1: [DVec3; 4],
        verts2: [DVec3; 4],
        normal1: DVec3,
        normal2: DVec3,
        overlap: Vec<DVec3>,
        area: Scalar,
    ) -> usize {
        let wt_offset = self.wts.len();
        let elem = SurfaceContactElem {
            dim,
            face1,
            face2,
            num_face_vert,
            verts1,
            verts2,
            normal1,
            normal2,
            overlap,
            area,
            wt_offset,
        };
        self.wts.extend(std::iter::repeat(0.0).take(elem.num_wts()));
        self.elems.push(elem);
        self.elems.len() - 1
    }

    /// Nonmortar–nonmortar weight `∫ φ²_a φ²_b dΩ`.
    #[inline]
    pub fn nn_wt(&self, elem_id: usize, a: usize, b: usize) -> Scalar {
        let e = &self.elems[elem_id];
        self.wts[e.wt_offset + e.num_face_vert * a + b]
    }

    /// Mortar–nonmortar weight `∫ φ¹_a φ²_b dΩ`.
    #[inline]
    pub fn mn_wt(&self, elem_id: usize, a: usize, b: usize) -> Scalar {
        let e = &self.elems[elem_id];
        let v = e.num_face_vert;
        self.wts[e.wt_offset + v * v + v * a + b]
    }

    #[inline]
    pub(crate) fn add_nn_wt(&mut self, elem_id: usize, a: usize, b: usize, w: Scalar) {
        let e = &self.elems[elem_id];
        self.wts[e.wt_offset + e.num_face_vert * a + b] += w;
    }

    #[inline]
    pub(crate) fn add_mn_wt(&mut self, elem_id: usize, a: usize, b: usize, w: Scalar) {
        let e = &self.elems[elem_id];
        let v = e.num_face_vert;
        self.wts[e.wt_offset + v * v + v * a + b] += w;
    }
}
