//! Geometric records carried by a capture.
//!
//! - [`convert`] - Device to engine coordinate conversion
//! - [`CameraFrame`] / [`CameraFrameMetaData`] - Per-frame camera pose
//! - [`SkeletonDefinition`] / [`SkeletonFrame`] - Joint hierarchy and poses
//! - [`UserAnchors`] / [`EnvironmentProbe`] - Static scene references
//! - [`MeshPart`] - Scene geometry snapshots

pub mod convert;
mod camera;
mod skeleton;
mod anchors;
mod mesh;

pub use camera::*;
pub use skeleton::*;
pub use anchors::*;
pub use mesh::*;
