//! Candidate face pairs.

use serde::{Deserialize, Serialize};

/// A candidate face pair emitted by binning.
///
/// `is_contact_candidate` is rewritten by the geometric check each cycle;
/// the pair list itself lives until the coupling scheme rebins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InterfacePair {
    /// Face id on mesh 1.
    pub face1: u32,
    /// Face id on mesh 2.
    pub face2: u32,
    /// True once the pair passed the contact-plane geometric check.
    pub is_contact_candidate: bool,
}

impl InterfacePair {
    pub fn new(face1: u32, face2: u32) -> Self {
        Self {
            face1,
            face2,
            is_contact_candidate: false,
        }
    }
}
