//! Per-cycle interface output: the active overlap polygons serialized to
//! one JSON polygonal-mesh file per cycle for visual inspection.

use std::path::Path;

use serde::Serialize;
use tactus_contact::plane::ContactPlane;
use tactus_types::{Scalar, SchemeId, TactusError, TactusResult};
use tracing::debug;

/// One overlap polygon of the dump.
#[derive(Serialize)]
struct OverlapRecord {
    face1: u32,
    face2: u32,
    area: Scalar,
    gap: Scalar,
    in_contact: bool,
    /// Polygon vertices in global coordinates, CCW.
    vertices: Vec<[Scalar; 3]>,
}

/// Complete dump of one coupling scheme at one cycle.
#[derive(Serialize)]
struct InterfaceDump {
    scheme: u32,
    cycle: usize,
    time: Scalar,
    overlaps: Vec<OverlapRecord>,
}

/// Writes `overlap_<scheme>_<cycle>.json` into `dir`.
pub fn write_interface_output(
    dir: &Path,
    scheme: SchemeId,
    cycle: usize,
    time: Scalar,
    planes: &[ContactPlane],
) -> TactusResult<()> {
    let overlaps = planes
        .iter()
        .map(|p| OverlapRecord {
            face1: p.face1,
            face2: p.face2,
            area: p.area,
            gap: p.gap,
            in_contact: p.in_contact,
            vertices: (0..p.num_overlap_verts())
                .map(|i| [p.overlap_x[i], p.overlap_y[i], p.overlap_z[i]])
                .collect(),
        })
        .collect();

    let dump = InterfaceDump {
        scheme: scheme.0,
        cycle,
        time,
        overlaps,
    };

    let json = serde_json::to_string(&dump)
        .map_err(|e| TactusError::Serialization(format!("interface dump failed: {e}")))?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("overlap_{}_{}.json", scheme.0, cycle));
    std::fs::write(&path, json)?;
    debug!(path = %path.display(), "wrote interface output");
    Ok(())
}
