//! Camera frame records.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::convert;
use crate::stream::{ByteCursor, Header};
use crate::util::Transform;

/// Per-frame camera timing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraFrameMetaData {
    /// Capture timestamp in seconds.
    pub timestamp: f64,
    pub exposure_offset: f32,
    pub exposure_duration: f64,
}

/// One decoded camera record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub transform: Transform,
    pub meta: CameraFrameMetaData,
}

impl CameraFrame {
    /// Decode `timestamp pos euler exposure_offset exposure_duration`.
    ///
    /// Returns `None` if the record was truncated.
    pub fn read(cursor: &mut ByteCursor) -> Option<Self> {
        let timestamp = cursor.read_f64();
        let position = cursor.read_vec3();
        let euler = cursor.read_vec3();
        let exposure_offset = cursor.read_f32();
        let exposure_duration = cursor.read_f64();

        if cursor.has_overflow() {
            return None;
        }
        trace!(timestamp, offset = cursor.tell(), "decoded camera frame");

        Some(Self {
            transform: convert::camera_pose_to_engine(position, euler),
            meta: CameraFrameMetaData { timestamp, exposure_offset, exposure_duration },
        })
    }
}

/// Lens parameters carried by the capture header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub horizontal_fov: f32,
    pub vertical_fov: f32,
    pub focal_length_x: f32,
    pub focal_length_y: f32,
}

impl Lens {
    /// Lens values of a header.
    pub fn from_header(header: &Header) -> Self {
        Self {
            horizontal_fov: header.horizontal_fov,
            vertical_fov: header.vertical_fov,
            focal_length_x: header.focal_length_x,
            focal_length_y: header.focal_length_y,
        }
    }

    /// Width over height implied by the focal lengths, `None` if degenerate.
    pub fn pixel_aspect(&self) -> Option<f32> {
        (self.focal_length_y.abs() > f32::EPSILON).then(|| self.focal_length_x / self.focal_length_y)
    }
}
