//! Importable capture assets.
//!
//! An asset stores the decoded prologue (header, anchors, skeleton definition)
//! next to the raw frame records, so replays rewind straight to frame data.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::geom::{SkeletonDefinition, UserAnchors};
use crate::stream::{CaptureData, CaptureLayout, CaptureReader, DeviceOrientation, Header};
use crate::util::Result;

/// A capture split into its decoded prologue and its frame records.
#[derive(Clone, Debug)]
pub struct CaptureAsset {
    pub header: Header,
    pub layout: CaptureLayout,
    pub user_anchors: UserAnchors,
    pub skeleton: Option<SkeletonDefinition>,
    pub frame_data: Arc<CaptureData>,
}

impl CaptureAsset {
    /// Decode the prologue of `data` and keep the remaining bytes as frame data.
    pub fn import(data: impl Into<CaptureData>, layout: CaptureLayout, expected_version: i32) -> Result<Self> {
        let mut reader = CaptureReader::new(data, expected_version);
        reader.decode_prologue(&layout)?;

        let frame_data = reader.cursor_mut().read_remaining();
        let skeleton = layout.skeleton.then(|| reader.skeleton_definition().clone());
        info!(
            frames = reader.header().frame_count,
            joints = skeleton.as_ref().map_or(0, |s| s.joint_count()),
            anchors = reader.user_anchors().len(),
            frame_bytes = frame_data.len(),
            "imported capture asset"
        );

        Ok(Self {
            header: *reader.header(),
            layout,
            user_anchors: reader.user_anchors().clone(),
            skeleton,
            frame_data: Arc::new(CaptureData::from(frame_data)),
        })
    }

    /// Read and import a capture file.
    pub fn import_file(path: impl AsRef<Path>, layout: CaptureLayout, expected_version: i32) -> Result<Self> {
        Self::import(CaptureData::open(path)?, layout, expected_version)
    }

    /// Declared frame count.
    #[inline]
    pub fn frame_count(&self) -> i32 {
        self.header.frame_count
    }

    /// Whether the asset carries joint poses.
    #[inline]
    pub fn is_skeleton(&self) -> bool {
        self.skeleton.is_some()
    }

    /// Device orientation recorded in the header.
    #[inline]
    pub fn device_orientation(&self) -> DeviceOrientation {
        self.header.orientation()
    }

    /// Raw frame records.
    #[inline]
    pub fn frame_data(&self) -> &[u8] {
        self.frame_data.as_bytes()
    }
}
