//! Surface mesh storage with SoA channels and cached per-face data.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tactus_exec::MemorySpace;
use tactus_types::{Scalar, TactusError, TactusResult};
use tracing::warn;

use crate::element::ElementType;

/// One registered contact surface.
///
/// Coordinate, velocity, and response data are stored as per-axis
/// contiguous channels (`pos_x`, `pos_y`, `pos_z`); the z channels stay
/// empty for 2D meshes. Face-cached data (normal, centroid, radius, area)
/// is recomputed by [`SurfaceMesh::compute_face_data`] at the start of any
/// cycle that bins, and never mutated during `apply()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceMesh {
    /// Face type shared by all elements of this mesh.
    pub element_type: ElementType,

    // ─── Nodal data (SoA) ───
    pub pos_x: Vec<Scalar>,
    pub pos_y: Vec<Scalar>,
    pub pos_z: Vec<Scalar>,

    /// Nodal velocities; empty until the host registers them.
    pub vel_x: Vec<Scalar>,
    pub vel_y: Vec<Scalar>,
    pub vel_z: Vec<Scalar>,

    /// Nodal response (force) sink; empty until the host registers it.
    pub resp_x: Vec<Scalar>,
    pub resp_y: Vec<Scalar>,
    pub resp_z: Vec<Scalar>,

    // ─── Face data ───
    /// Flat connectivity: face `f` uses nodes
    /// `connectivity[f*V .. (f+1)*V]`.
    pub connectivity: Vec<u32>,

    /// Per-element thickness of the supporting volume element; empty until
    /// registered. Required for the AUTO contact case and element-wise
    /// penalty.
    pub element_thickness: Vec<Scalar>,

    /// Per-element material (bulk) modulus for element-wise penalty; empty
    /// until registered.
    pub bulk_modulus: Vec<Scalar>,

    /// Constant kinematic penalty stiffness, if registered.
    pub constant_penalty: Option<Scalar>,

    // ─── Cached per-face data (compute_face_data) ───
    pub face_normal_x: Vec<Scalar>,
    pub face_normal_y: Vec<Scalar>,
    pub face_normal_z: Vec<Scalar>,
    pub face_centroid_x: Vec<Scalar>,
    pub face_centroid_y: Vec<Scalar>,
    pub face_centroid_z: Vec<Scalar>,
    pub face_radius: Vec<Scalar>,
    pub face_area: Vec<Scalar>,

    /// Memory residency of the mesh arrays.
    pub memory_space: MemorySpace,

    /// Cleared when a host-contract violation is detected; coupling scheme
    /// validation fails for invalid meshes.
    pub valid: bool,
}

impl SurfaceMesh {
    /// Builds a mesh from host-supplied connectivity and coordinates.
    ///
    /// Structural impossibilities (mismatched array lengths) are hard
    /// errors. Contract violations that still allow storage (out-of-range
    /// indices, repeated vertices in a face) are logged as warnings and
    /// mark the mesh invalid, failing validation on later `init()` calls.
    /// A zero-element mesh is a legal "null mesh".
    pub fn new(
        element_type: ElementType,
        num_nodes: usize,
        connectivity: &[u32],
        coords_x: &[Scalar],
        coords_y: &[Scalar],
        coords_z: Option<&[Scalar]>,
    ) -> TactusResult<Self> {
        let nodes_per_face = element_type.nodes_per_face();
        let dim = element_type.dim();

        if connectivity.len() % nodes_per_face != 0 {
            return Err(TactusError::InvalidMesh(format!(
                "Connectivity length ({}) is not divisible by nodes per face ({})",
                connectivity.len(),
                nodes_per_face
            )));
        }
        if coords_x.len() != num_nodes || coords_y.len() != num_nodes {
            return Err(TactusError::InvalidMesh(format!(
                "Coordinate array lengths ({}, {}) do not match node count ({})",
                coords_x.len(),
                coords_y.len(),
                num_nodes
            )));
        }
        let pos_z = match (dim, coords_z) {
            (3, Some(z)) => {
                if z.len() != num_nodes {
                    return Err(TactusError::InvalidMesh(format!(
                        "Z coordinate array length ({}) does not match node count ({})",
                        z.len(),
                        num_nodes
                    )));
                }
                z.to_vec()
            }
            (3, None) => {
                return Err(TactusError::InvalidMesh(
                    "3D element type registered without z coordinates".into(),
                ))
            }
            (_, _) => Vec::new(),
        };

        let mut mesh = Self {
            element_type,
            pos_x: coords_x.to_vec(),
            pos_y: coords_y.to_vec(),
            pos_z,
            vel_x: Vec::new(),
            vel_y: Vec::new(),
            vel_z: Vec::new(),
            resp_x: Vec::new(),
            resp_y: Vec::new(),
            resp_z: Vec::new(),
            connectivity: connectivity.to_vec(),
            element_thickness: Vec::new(),
            bulk_modulus: Vec::new(),
            constant_penalty: None,
            face_normal_x: Vec::new(),
            face_normal_y: Vec::new(),
            face_normal_z: Vec::new(),
            face_centroid_x: Vec::new(),
            face_centroid_y: Vec::new(),
            face_centroid_z: Vec::new(),
            face_radius: Vec::new(),
            face_area: Vec::new(),
            memory_space: MemorySpace::Host,
            valid: true,
        };

        if let Err(msg) = mesh.check_connectivity() {
            warn!("{msg}; mesh marked invalid");
            mesh.valid = false;
        }
        if num_nodes == 0 && mesh.num_faces() > 0 {
            warn!("Mesh has faces but zero nodes; mesh marked invalid");
            mesh.valid = false;
        }

        Ok(mesh)
    }

    fn check_connectivity(&self) -> Result<(), String> {
        let n = self.num_nodes();
        let v = self.nodes_per_face();
        for (i, &idx) in self.connectivity.iter().enumerate() {
            if idx as usize >= n {
                return Err(format!(
                    "Connectivity index {} at position {} out of range (node count: {})",
                    idx, i, n
                ));
            }
        }
        for f in 0..self.num_faces() {
            let verts = &self.connectivity[f * v..(f + 1) * v];
            for a in 0..v {
                for b in (a + 1)..v {
                    if verts[a] == verts[b] {
                        return Err(format!(
                            "Face {} repeats vertex index {}",
                            f, verts[a]
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of registered nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.pos_x.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        let v = self.nodes_per_face();
        self.connectivity.len() / v
    }

    /// Vertices per face.
    #[inline]
    pub fn nodes_per_face(&self) -> usize {
        self.element_type.nodes_per_face()
    }

    /// Spatial dimension (2 or 3).
    #[inline]
    pub fn dim(&self) -> usize {
        self.element_type.dim()
    }

    /// True when this mesh has no elements.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.num_faces() == 0
    }

    /// Node id of local vertex `a` of face `f`.
    #[inline]
    pub fn face_node_id(&self, f: usize, a: usize) -> usize {
        self.connectivity[f * self.nodes_per_face() + a] as usize
    }

    /// Position of node `n` (z = 0 for 2D meshes).
    #[inline]
    pub fn node_position(&self, n: usize) -> DVec3 {
        let z = if self.dim() == 3 { self.pos_z[n] } else { 0.0 };
        DVec3::new(self.pos_x[n], self.pos_y[n], z)
    }

    /// Position of local vertex `a` of face `f`.
    #[inline]
    pub fn face_vertex(&self, f: usize, a: usize) -> DVec3 {
        self.node_position(self.face_node_id(f, a))
    }

    /// Gathers face `f`'s vertex coordinates into fixed per-axis arrays;
    /// the first `nodes_per_face()` entries are valid.
    pub fn face_coords(&self, f: usize) -> ([Scalar; 4], [Scalar; 4], [Scalar; 4]) {
        let v = self.nodes_per_face();
        let mut x = [0.0; 4];
        let mut y = [0.0; 4];
        let mut z = [0.0; 4];
        for a in 0..v {
            let p = self.face_vertex(f, a);
            x[a] = p.x;
            y[a] = p.y;
            z[a] = p.z;
        }
        (x, y, z)
    }

    /// True when nodal velocities have been registered.
    #[inline]
    pub fn has_velocity(&self) -> bool {
        !self.vel_x.is_empty()
    }

    /// True when the nodal response sink has been registered.
    #[inline]
    pub fn has_response(&self) -> bool {
        !self.resp_x.is_empty()
    }

    /// True when element thickness has been registered.
    #[inline]
    pub fn has_element_thickness(&self) -> bool {
        !self.element_thickness.is_empty()
    }

    /// Velocity of local vertex `a` of face `f` (zero when unregistered).
    pub fn face_velocity(&self, f: usize, a: usize) -> DVec3 {
        if !self.has_velocity() {
            return DVec3::ZERO;
        }
        let n = self.face_node_id(f, a);
        let z = if self.dim() == 3 { self.vel_z[n] } else { 0.0 };
        DVec3::new(self.vel_x[n], self.vel_y[n], z)
    }

    /// Registers nodal velocities.
    pub fn register_velocities(
        &mut self,
        vx: &[Scalar],
        vy: &[Scalar],
        vz: Option<&[Scalar]>,
    ) -> TactusResult<()> {
        let n = self.num_nodes();
        if vx.len() != n || vy.len() != n {
            return Err(TactusError::InvalidMesh(
                "Velocity array lengths do not match node count".into(),
            ));
        }
        self.vel_x = vx.to_vec();
        self.vel_y = vy.to_vec();
        self.vel_z = match (self.dim(), vz) {
            (3, Some(z)) if z.len() == n => z.to_vec(),
            (3, _) => {
                return Err(TactusError::InvalidMesh(
                    "3D mesh velocity registration requires a z channel of node length".into(),
                ))
            }
            _ => Vec::new(),
        };
        Ok(())
    }

    /// Registers (allocates) the nodal response sink, zero-initialized.
    pub fn register_response(&mut self) {
        let n = self.num_nodes();
        self.resp_x = vec![0.0; n];
        self.resp_y = vec![0.0; n];
        self.resp_z = if self.dim() == 3 { vec![0.0; n] } else { Vec::new() };
    }

    /// Clears accumulated response forces; the host owns calling this
    /// between cycles.
    pub fn clear_response(&mut self) {
        self.resp_x.iter_mut().for_each(|v| *v = 0.0);
        self.resp_y.iter_mut().for_each(|v| *v = 0.0);
        self.resp_z.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Adds a force vector into the response channels of node `n`.
    #[inline]
    pub fn accumulate_response(&mut self, n: usize, f: DVec3) {
        self.resp_x[n] += f.x;
        self.resp_y[n] += f.y;
        if self.dim() == 3 {
            self.resp_z[n] += f.z;
        }
    }

    /// Registers per-element thickness.
    pub fn register_element_thickness(&mut self, t: &[Scalar]) -> TactusResult<()> {
        if t.len() != self.num_faces() {
            return Err(TactusError::InvalidMesh(
                "Element thickness length does not match face count".into(),
            ));
        }
        self.element_thickness = t.to_vec();
        Ok(())
    }

    /// Registers per-element bulk modulus for element-wise penalty.
    pub fn register_bulk_modulus(&mut self, k: &[Scalar]) -> TactusResult<()> {
        if k.len() != self.num_faces() {
            return Err(TactusError::InvalidMesh(
                "Bulk modulus length does not match face count".into(),
            ));
        }
        self.bulk_modulus = k.to_vec();
        Ok(())
    }

    /// Cached outward unit normal of face `f`.
    #[inline]
    pub fn face_normal(&self, f: usize) -> DVec3 {
        DVec3::new(
            self.face_normal_x[f],
            self.face_normal_y[f],
            if self.dim() == 3 { self.face_normal_z[f] } else { 0.0 },
        )
    }

    /// Cached centroid of face `f`.
    #[inline]
    pub fn face_centroid(&self, f: usize) -> DVec3 {
        DVec3::new(
            self.face_centroid_x[f],
            self.face_centroid_y[f],
            if self.dim() == 3 { self.face_centroid_z[f] } else { 0.0 },
        )
    }

    /// Cached enclosing radius of face `f`.
    #[inline]
    pub fn face_radius_of(&self, f: usize) -> Scalar {
        self.face_radius[f]
    }

    /// Cached area of face `f` (length for 2D segments).
    #[inline]
    pub fn face_area_of(&self, f: usize) -> Scalar {
        self.face_area[f]
    }

    /// Recomputes all cached per-face data from current coordinates.
    ///
    /// Called at the start of any cycle that will bin; face data is
    /// read-only for the rest of the cycle.
    pub fn compute_face_data(&mut self) {
        let nf = self.num_faces();
        let v = self.nodes_per_face();

        self.face_normal_x = vec![0.0; nf];
        self.face_normal_y = vec![0.0; nf];
        self.face_normal_z = vec![0.0; nf];
        self.face_centroid_x = vec![0.0; nf];
        self.face_centroid_y = vec![0.0; nf];
        self.face_centroid_z = vec![0.0; nf];
        self.face_radius = vec![0.0; nf];
        self.face_area = vec![0.0; nf];

        for f in 0..nf {
            // vertex-averaged centroid
            let mut c = DVec3::ZERO;
            for a in 0..v {
                c += self.face_vertex(f, a);
            }
            c /= v as Scalar;

            let (normal, area) = match self.element_type {
                ElementType::Segment => {
                    let p0 = self.face_vertex(f, 0);
                    let p1 = self.face_vertex(f, 1);
                    let lambda = p1 - p0;
                    // outward normal of a CCW-ordered boundary segment
                    let n = DVec3::new(lambda.y, -lambda.x, 0.0).normalize_or_zero();
                    (n, lambda.length())
                }
                ElementType::Triangle => {
                    let p0 = self.face_vertex(f, 0);
                    let p1 = self.face_vertex(f, 1);
                    let p2 = self.face_vertex(f, 2);
                    let cross = (p1 - p0).cross(p2 - p0);
                    (cross.normalize_or_zero(), 0.5 * cross.length())
                }
                ElementType::Quad => {
                    // diagonal cross product handles warped quads
                    let p0 = self.face_vertex(f, 0);
                    let p1 = self.face_vertex(f, 1);
                    let p2 = self.face_vertex(f, 2);
                    let p3 = self.face_vertex(f, 3);
                    let n = (p2 - p0).cross(p3 - p1).normalize_or_zero();
                    // area from the fan about the centroid
                    let mut area = 0.0;
                    let verts = [p0, p1, p2, p3];
                    for a in 0..4 {
                        let b = (a + 1) % 4;
                        area += 0.5 * (verts[b] - verts[a]).cross(c - verts[a]).length();
                    }
                    (n, area)
                }
            };

            let mut radius: Scalar = 0.0;
            for a in 0..v {
                radius = radius.max((self.face_vertex(f, a) - c).length());
            }

            self.face_normal_x[f] = normal.x;
            self.face_normal_y[f] = normal.y;
            self.face_normal_z[f] = normal.z;
            self.face_centroid_x[f] = c.x;
            self.face_centroid_y[f] = c.y;
            self.face_centroid_z[f] = c.z;
            self.face_radius[f] = radius;
            self.face_area[f] = area;
        }
    }

    /// Element thickness of face `f`, if registered.
    #[inline]
    pub fn thickness_of(&self, f: usize) -> Option<Scalar> {
        self.element_thickness.get(f).copied()
    }

    /// Range of node ids referenced by this mesh's connectivity, as
    /// `(min, max)`; `None` for null meshes.
    pub fn node_id_range(&self) -> Option<(usize, usize)> {
        let min = self.connectivity.iter().min()?;
        let max = self.connectivity.iter().max()?;
        Some((*min as usize, *max as usize))
    }
}
