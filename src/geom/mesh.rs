//! Scene geometry snapshots.
//!
//! A geometry stream is a sequence of snapshots, each replacing the previous
//! reconstruction: `partCount:i32` then per part
//! `vertCount:i64 {vertex:3xf32}* indexCount:i64 {index:u32}*`.

use tracing::{debug, warn};

use super::convert;
use crate::stream::ByteCursor;
use crate::util::Vec3;

/// One triangle-mesh section.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshPart {
    /// Vertices in engine convention.
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshPart {
    /// Number of complete triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Indices that refer past the vertex list.
    pub fn invalid_indices(&self) -> usize {
        let n = self.vertices.len() as u32;
        self.indices.iter().filter(|&&i| i >= n).count()
    }

    fn read(cursor: &mut ByteCursor) -> Self {
        let vert_count = cursor.read_i64().max(0) as usize;
        let mut vertices = Vec::with_capacity(vert_count.min(cursor.available() / 12));
        for _ in 0..vert_count {
            if cursor.has_overflow() {
                break;
            }
            vertices.push(convert::position_to_engine(cursor.read_vec3()));
        }

        let index_count = cursor.read_i64().max(0) as usize;
        let mut indices = Vec::with_capacity(index_count.min(cursor.available() / 4));
        for _ in 0..index_count {
            if cursor.has_overflow() {
                break;
            }
            indices.push(cursor.read_u32());
        }
        Self { vertices, indices }
    }
}

/// Decode one snapshot. Returns `None` if the stream is exhausted or the
/// snapshot was truncated.
pub fn read_mesh_snapshot(cursor: &mut ByteCursor) -> Option<Vec<MeshPart>> {
    let part_count = cursor.read_i32().max(0) as usize;
    if cursor.has_overflow() {
        return None;
    }

    let mut parts = Vec::with_capacity(part_count.min(cursor.available() / 16));
    for _ in 0..part_count {
        parts.push(MeshPart::read(cursor));
        if cursor.has_overflow() {
            warn!(parts = parts.len(), declared = part_count, "mesh snapshot truncated");
            return None;
        }
    }
    debug!(
        parts = parts.len(),
        vertices = parts.iter().map(|p| p.vertices.len()).sum::<usize>(),
        "decoded mesh snapshot"
    );
    Some(parts)
}
