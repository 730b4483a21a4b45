//! Candidate-pair search over two surface meshes.
//!
//! Two policies: a cartesian product with a bounding-sphere cull (small
//! meshes, or pinned binning), and a uniform spatial grid keyed on the
//! median face radius. The policy is a performance knob, not a correctness
//! one: both return the same pair set for the same geometry, deduplicated
//! and sorted by `(face1, face2)`.

use std::collections::HashMap;

use tactus_mesh::SurfaceMesh;
use tactus_types::{BinningMethod, Scalar};
use tracing::debug;

use crate::pair::InterfacePair;

/// Inflation factor on bounding-sphere sums; pairs are kept when centroid
/// distance is below `BIN_SCALE * (r1 + r2)`.
const BIN_SCALE: Scalar = 1.5;

/// Finds candidate face pairs between two meshes.
///
/// `same_mesh` marks single-mesh (auto) contact: a face is never paired
/// with itself or with a face sharing any of its nodes, and each unordered
/// pair appears once.
pub fn find_interface_pairs(
    mesh1: &SurfaceMesh,
    mesh2: &SurfaceMesh,
    method: BinningMethod,
    same_mesh: bool,
) -> Vec<InterfacePair> {
    if mesh1.is_null() || mesh2.is_null() {
        return Vec::new();
    }

    let mut pairs = match method {
        BinningMethod::CartesianProduct => cartesian_pairs(mesh1, mesh2, same_mesh),
        BinningMethod::Grid => grid_pairs(mesh1, mesh2, same_mesh),
    };

    pairs.sort_unstable_by_key(|p| (p.face1, p.face2));
    pairs.dedup_by_key(|p| (p.face1, p.face2));

    debug!(
        candidates = pairs.len(),
        faces1 = mesh1.num_faces(),
        faces2 = mesh2.num_faces(),
        "binning complete"
    );
    pairs
}

fn spheres_interact(mesh1: &SurfaceMesh, f1: usize, mesh2: &SurfaceMesh, f2: usize) -> bool {
    let d = (mesh1.face_centroid(f1) - mesh2.face_centroid(f2)).length();
    d <= BIN_SCALE * (mesh1.face_radius_of(f1) + mesh2.face_radius_of(f2))
}

fn faces_share_node(mesh: &SurfaceMesh, f1: usize, f2: usize) -> bool {
    let v = mesh.nodes_per_face();
    for a in 0..v {
        for b in 0..v {
            if mesh.face_node_id(f1, a) == mesh.face_node_id(f2, b) {
                return true;
            }
        }
    }
    false
}

fn admissible(
    mesh1: &SurfaceMesh,
    f1: usize,
    mesh2: &SurfaceMesh,
    f2: usize,
    same_mesh: bool,
) -> bool {
    if same_mesh && (f2 <= f1 || faces_share_node(mesh1, f1, f2)) {
        return false;
    }
    spheres_interact(mesh1, f1, mesh2, f2)
}

fn cartesian_pairs(mesh1: &SurfaceMesh, mesh2: &SurfaceMesh, same_mesh: bool) -> Vec<InterfacePair> {
    let mut pairs = Vec::new();
    for f1 in 0..mesh1.num_faces() {
        for f2 in 0..mesh2.num_faces() {
            if admissible(mesh1, f1, mesh2, f2, same_mesh) {
                pairs.push(InterfacePair::new(f1 as u32, f2 as u32));
            }
        }
    }
    pairs
}

/// Median of the face radii across both meshes; drives the grid cell size.
fn median_face_radius(mesh1: &SurfaceMesh, mesh2: &SurfaceMesh) -> Scalar {
    let mut radii: Vec<Scalar> = mesh1
        .face_radius
        .iter()
        .chain(mesh2.face_radius.iter())
        .copied()
        .collect();
    radii.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    radii[radii.len() / 2]
}

fn cell_range(lo: Scalar, hi: Scalar, inv_cell: Scalar) -> (i64, i64) {
    (
        (lo * inv_cell).floor() as i64,
        (hi * inv_cell).floor() as i64,
    )
}

fn grid_pairs(mesh1: &SurfaceMesh, mesh2: &SurfaceMesh, same_mesh: bool) -> Vec<InterfacePair> {
    // cell size ~2x the median radius keeps occupancy near one face per cell
    let cell = (2.0 * median_face_radius(mesh1, mesh2)).max(1.0e-12);
    let inv_cell = 1.0 / cell;

    // bin mesh-1 faces into every cell their bounding box touches
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for f in 0..mesh1.num_faces() {
        let c = mesh1.face_centroid(f);
        let r = BIN_SCALE * mesh1.face_radius_of(f);
        let (x0, x1) = cell_range(c.x - r, c.x + r, inv_cell);
        let (y0, y1) = cell_range(c.y - r, c.y + r, inv_cell);
        let (z0, z1) = cell_range(c.z - r, c.z + r, inv_cell);
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                for iz in z0..=z1 {
                    grid.entry((ix, iy, iz)).or_default().push(f as u32);
                }
            }
        }
    }

    // query mesh-2 faces against the grid
    let mut pairs = Vec::new();
    for f2 in 0..mesh2.num_faces() {
        let c = mesh2.face_centroid(f2);
        let r = BIN_SCALE * mesh2.face_radius_of(f2);
        let (x0, x1) = cell_range(c.x - r, c.x + r, inv_cell);
        let (y0, y1) = cell_range(c.y - r, c.y + r, inv_cell);
        let (z0, z1) = cell_range(c.z - r, c.z + r, inv_cell);
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                for iz in z0..=z1 {
                    let Some(bin) = grid.get(&(ix, iy, iz)) else {
                        continue;
                    };
                    for &f1 in bin {
                        if admissible(mesh1, f1 as usize, mesh2, f2, same_mesh) {
                            pairs.push(InterfacePair::new(f1, f2 as u32));
                        }
                    }
                }
            }
        }
    }
    pairs
}
