//! User anchors and environment probes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::convert;
use crate::stream::ByteCursor;
use crate::util::{Transform, Vec3, UNIT_SCALE};

/// Extent used in place of non-finite probe extents (engine units).
pub const UNBOUNDED_EXTENT: f32 = 100_000.0;

/// Reference positions placed by the user during capture.
///
/// Positions are kept in device convention as stored in the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnchors {
    pub positions: Vec<Vec3>,
}

impl UserAnchors {
    /// Decode `count { position:3xf32 }*count`.
    pub fn read(cursor: &mut ByteCursor) -> Self {
        let count = cursor.read_i32().max(0) as usize;
        let mut positions = Vec::with_capacity(count.min(cursor.available() / 12));
        for _ in 0..count {
            if cursor.has_overflow() {
                break;
            }
            let p = cursor.read_vec3();
            if !cursor.has_overflow() {
                positions.push(p);
            }
        }
        debug!(count = positions.len(), "decoded user anchors");
        Self { positions }
    }

    /// Number of anchors.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if there are no anchors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Anchor positions in engine convention.
    pub fn to_engine(&self) -> Vec<Vec3> {
        self.positions.iter().map(|&p| convert::position_to_engine(p)).collect()
    }
}

/// Axis-aligned reflection-probe volume captured from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProbe {
    pub transform: Transform,
    /// Half-size in engine units.
    pub extent: Vec3,
}

/// Decode an environment-probe file: `count { extent:3xf32 matrix:16xf32 }*count`.
pub fn read_environment_probes(cursor: &mut ByteCursor) -> Vec<EnvironmentProbe> {
    let count = cursor.read_i32().max(0) as usize;
    let mut probes = Vec::with_capacity(count.min(cursor.available() / 76));

    for i in 0..count {
        let mut extent = cursor.read_vec3() * UNIT_SCALE;
        let transform = cursor.read_transform();
        if cursor.has_overflow() {
            warn!(read = i, declared = count, "environment probe list truncated");
            break;
        }

        if !extent.is_finite() {
            warn!(probe = i, ?extent, "non-finite probe extent, treating as unbounded");
            for axis in 0..3 {
                if !extent[axis].is_finite() {
                    extent[axis] = UNBOUNDED_EXTENT;
                }
            }
        }
        debug!(probe = i, position = ?transform.translation, ?extent, "read environment probe");
        probes.push(EnvironmentProbe { transform, extent });
    }
    probes
}
