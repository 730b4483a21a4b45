//! # tactus-geom
//!
//! Pure, stateless geometry primitives for the contact kernel: projections,
//! centroids, polygon predicates, convex reordering, segment intersection,
//! and the 2D convex polygon clipping routine that produces contact-plane
//! overlaps.
//!
//! ## Numerical policy
//!
//! Near-zero comparisons use explicit tolerances. Tolerances that are
//! lengths are passed in by the caller, scaled by face radii — never
//! absolute. Degenerate inputs (duplicated vertices, zero-length segments,
//! collinear polygons) return a tagged [`FaceGeomError`] instead of
//! producing garbage; a *collapsed* overlap (fewer than three surviving
//! vertices) is not an error, just a zero-area result.
//!
//! Vertex coordinates are passed as per-axis slices, matching the SoA mesh
//! layout, with `glam` vectors used for local arithmetic.

pub mod centroid;
pub mod clip;
pub mod intersect;
pub mod order;
pub mod projection;

pub use centroid::{
    centroid_2d, poly_area_2d, poly_area_centroid_3d, tri_area_3d, vertex_avg_centroid_2d,
    vertex_avg_centroid_3d,
};
pub use clip::{intersection_2d_polygon, Overlap2D};
pub use intersect::{check_poly_segs, point_in_face, point_in_tri, segment_intersection_2d, SegSeg};
pub use order::{check_poly_orientation, poly_reorder, poly_reorder_with_normal, reverse_winding};
pub use projection::{
    global_to_local_2d, line_plane_intersection, local_2d_to_global, project_point_to_line,
    project_point_to_plane, LinePlaneHit,
};

pub use tactus_types::FaceGeomError;

/// Maximum vertex count of a face supported by the clipping routines.
pub const MAX_FACE_VERTS: usize = 4;

/// Maximum vertex count of a convex overlap polygon (3D).
pub const MAX_OVERLAP_VERTS: usize = 2 * MAX_FACE_VERTS;
