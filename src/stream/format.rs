//! Capture format constants and header structures.

use serde::{Deserialize, Serialize};

/// Protocol revision written by the camera-only capture tool.
pub const PROTOCOL_VERSION_202004: i32 = 202004;

/// Protocol revision written by the skeleton-capable capture tool.
pub const PROTOCOL_VERSION_202005: i32 = 202005;

/// Revision expected when nothing else is configured.
pub const DEFAULT_PROTOCOL_VERSION: i32 = PROTOCOL_VERSION_202005;

/// Size of the header record in bytes.
pub const HEADER_SIZE: usize = 8 * 4;

/// Size of one device-convention 3-vector.
pub const VEC3_SIZE: usize = 3 * 4;

/// Size of one 4x4 f32 matrix record.
pub const MATRIX_SIZE: usize = 16 * 4;

/// Size of one camera frame record:
/// timestamp(f64) pos(3xf32) euler(3xf32) exposure_offset(f32) exposure_duration(f64).
pub const CAMERA_FRAME_SIZE: usize = 8 + VEC3_SIZE + VEC3_SIZE + 4 + 8;

/// Size of one skeleton frame record for `joint_count` joints.
#[inline]
pub const fn skeleton_frame_size(joint_count: usize) -> usize {
    4 + joint_count * MATRIX_SIZE
}

/// Decoded capture header.
///
/// Layout: `version frame_count device_orientation` (i32), four lens floats,
/// `capture_type` (i32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: i32,
    pub frame_count: i32,
    pub device_orientation: i32,
    pub horizontal_fov: f32,
    pub vertical_fov: f32,
    pub focal_length_x: f32,
    pub focal_length_y: f32,
    pub capture_type: i32,
}

impl Header {
    /// Decoded orientation code.
    pub fn orientation(&self) -> DeviceOrientation {
        DeviceOrientation::from_code(self.device_orientation)
    }

    /// Frame count clamped to zero.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frame_count.max(0) as usize
    }
}

/// Physical orientation of the capture device (UIKit numbering).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceOrientation {
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

impl DeviceOrientation {
    /// Map a raw header code, unknown codes fold into `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Portrait,
            2 => Self::PortraitUpsideDown,
            3 => Self::LandscapeLeft,
            4 => Self::LandscapeRight,
            5 => Self::FaceUp,
            6 => Self::FaceDown,
            _ => Self::Unknown,
        }
    }

    /// Raw header code.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Portrait => 1,
            Self::PortraitUpsideDown => 2,
            Self::LandscapeLeft => 3,
            Self::LandscapeRight => 4,
            Self::FaceUp => 5,
            Self::FaceDown => 6,
        }
    }

    /// True for the two landscape orientations.
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}
