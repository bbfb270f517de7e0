//! # Spatial Capture
//!
//! Reader and replay engine for AR spatial-capture recordings: a header,
//! optional user anchors and skeleton definition, then a fixed number of
//! camera and joint-pose frame records. Device-space poses are converted to
//! a Z-up, left-handed, centimetre engine convention on decode.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types, [`Transform`](util::Transform)
//! - [`stream`] - Byte cursor, frame sequencer and capture reader
//! - [`geom`] - Camera, skeleton, anchor and mesh records plus coordinate conversion
//! - [`asset`] - Captures split into decoded prologue and frame data
//! - [`replay`] - Tick-driven players
//! - [`config`] - Reader and replay settings
//!
//! ## Example
//!
//! ```ignore
//! use spatial_capture::prelude::*;
//!
//! let config = ReaderConfig { layout: CaptureLayout::BODY_TRACKING, ..Default::default() };
//! let mut player = Player::open("capture.dat", config)?;
//!
//! while player.tick()?.has_frame() {
//!     let pelvis = player.joint_world_transform(JointIndex::Pelvis.index(), &Transform::IDENTITY)?;
//!     println!("{:?}", pelvis);
//! }
//! ```

pub mod util;
pub mod stream;
pub mod geom;
pub mod asset;
pub mod replay;
pub mod config;

// Re-export commonly used types
pub use util::{Error, Result, Transform};
pub use stream::{CaptureData, CaptureReader, CaptureLayout, ByteCursor, FrameSequencer, StepOutcome};
pub use config::ReaderConfig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Transform, Vec3, Quat, Mat4};
    pub use crate::stream::{
        ByteCursor, CaptureData, CaptureLayout, CaptureReader, DeviceOrientation, FrameSequencer,
        Header, ReaderState, StepOutcome,
    };
    pub use crate::asset::CaptureAsset;
    pub use crate::replay::{GeometryPlayer, Player, TickOutcome};
    pub use crate::config::ReaderConfig;
    pub use crate::geom::*;
}
