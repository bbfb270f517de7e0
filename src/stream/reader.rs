//! Capture stream reader.
//!
//! Sequences the decode of one capture buffer:
//!
//! ```text
//! Fresh -> HeaderRead -> [AnchorsRead] -> [SkeletonDefined] -> FrameReady
//!                                                                 |
//!              loop wrap: back to Fresh (prologue repeats)  <-----+
//!              end without loop: Stopped
//! ```
//!
//! Anchors and skeleton definition are optional, caller-invoked steps so the
//! live (camera-only) and project (anchors + skeleton) capture kinds share
//! one reader. Within a frame record the camera fields always precede the
//! skeleton fields.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::cursor::ByteCursor;
use super::format::Header;
use super::sequencer::{FrameSequencer, StepOutcome};
use super::source::CaptureData;
use crate::asset::CaptureAsset;
use crate::config::ReaderConfig;
use crate::geom::{CameraFrame, CameraFrameMetaData, SkeletonDefinition, SkeletonFrame, UserAnchors};
use crate::util::{Error, Result, Transform};

/// Sections present in a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureLayout {
    /// Prologue carries a user-anchor list.
    pub user_anchors: bool,
    /// Prologue carries a skeleton definition and frames carry joint poses.
    pub skeleton: bool,
    /// Frames carry a camera record.
    pub camera: bool,
}

impl CaptureLayout {
    /// Live camera stream: header and camera frames.
    pub const CAMERA: Self = Self { user_anchors: false, skeleton: false, camera: true };

    /// Live body-tracking stream: header, skeleton definition, camera + joint frames.
    pub const BODY_TRACKING: Self = Self { user_anchors: false, skeleton: true, camera: true };

    /// Offline project capture: header, anchors, skeleton definition, camera + joint frames.
    pub const PROJECT: Self = Self { user_anchors: true, skeleton: true, camera: true };
}

impl Default for CaptureLayout {
    fn default() -> Self {
        Self::CAMERA
    }
}

/// Decode progress of a [`CaptureReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    Fresh,
    HeaderRead,
    AnchorsRead,
    SkeletonDefined,
    FrameReady,
    Stopped,
}

/// Stateful decoder over one capture buffer.
#[derive(Clone, Debug)]
pub struct CaptureReader {
    cursor: ByteCursor,
    expected_version: i32,
    validate_hierarchy: bool,
    /// Whether the buffer starts with header/anchors/skeleton.
    has_prologue: bool,
    sequencer: FrameSequencer,
    state: ReaderState,

    header: Header,
    anchors: UserAnchors,
    skeleton: SkeletonDefinition,
    skeleton_frame: SkeletonFrame,
    camera: CameraFrame,
}

impl CaptureReader {
    /// Reader owning `data`, expecting header version `expected_version`.
    pub fn new(data: impl Into<CaptureData>, expected_version: i32) -> Self {
        Self::shared(Arc::new(data.into()), expected_version)
    }

    /// Reader over a buffer shared with other readers.
    pub fn shared(data: Arc<CaptureData>, expected_version: i32) -> Self {
        Self {
            cursor: ByteCursor::shared(data),
            expected_version,
            validate_hierarchy: false,
            has_prologue: true,
            sequencer: FrameSequencer::default(),
            state: ReaderState::Fresh,
            header: Header::default(),
            anchors: UserAnchors::default(),
            skeleton: SkeletonDefinition::default(),
            skeleton_frame: SkeletonFrame::default(),
            camera: CameraFrame::default(),
        }
    }

    /// Reader configured from a [`ReaderConfig`].
    pub fn with_config(data: Arc<CaptureData>, config: &ReaderConfig) -> Self {
        let mut reader = Self::shared(data, config.protocol_version);
        reader.validate_hierarchy = config.validate_hierarchy;
        reader
    }

    /// Reader over an imported asset's frame data.
    ///
    /// Header, anchors and skeleton come from the asset; the buffer holds
    /// frame records only, so a loop wrap rewinds straight to the first frame.
    pub fn from_asset(asset: &CaptureAsset) -> Self {
        let mut reader = Self::shared(asset.frame_data.clone(), asset.header.version);
        reader.has_prologue = false;
        reader.header = asset.header;
        reader.sequencer.set_frame_count(asset.header.frame_count);
        reader.anchors = asset.user_anchors.clone();
        if let Some(skeleton) = &asset.skeleton {
            reader.skeleton = skeleton.clone();
            reader.skeleton_frame.resize(skeleton.joint_count());
        }
        reader.state = reader.ready_state();
        reader
    }

    /// State reached once everything before the frame records is known.
    fn ready_state(&self) -> ReaderState {
        if self.skeleton.is_empty() {
            ReaderState::HeaderRead
        } else {
            ReaderState::SkeletonDefined
        }
    }

    /// Decode the header and check its protocol version.
    ///
    /// A version mismatch is fatal: the reader stops and every later frame
    /// decode is a no-op.
    pub fn decode_header(&mut self) -> Result<&Header> {
        let c = &mut self.cursor;
        let header = Header {
            version: c.read_i32(),
            frame_count: c.read_i32(),
            device_orientation: c.read_i32(),
            horizontal_fov: c.read_f32(),
            vertical_fov: c.read_f32(),
            focal_length_x: c.read_f32(),
            focal_length_y: c.read_f32(),
            capture_type: c.read_i32(),
        };
        c.check()?;

        if header.version != self.expected_version {
            self.sequencer.halt();
            self.state = ReaderState::Stopped;
            return Err(Error::ProtocolVersionMismatch {
                expected: self.expected_version,
                found: header.version,
            });
        }

        debug!(
            version = header.version,
            frames = header.frame_count,
            orientation = header.device_orientation,
            capture_type = header.capture_type,
            "decoded capture header"
        );
        self.header = header;
        self.sequencer.set_frame_count(header.frame_count);
        self.state = ReaderState::HeaderRead;
        Ok(&self.header)
    }

    /// Decode the user-anchor section.
    pub fn decode_user_anchors(&mut self) -> &UserAnchors {
        self.anchors = UserAnchors::read(&mut self.cursor);
        self.state = ReaderState::AnchorsRead;
        &self.anchors
    }

    /// Decode the skeleton definition and size the per-frame joint buffer.
    ///
    /// Truncation is reported through the overflow flag. Hierarchy checks
    /// only run when enabled in the configuration.
    pub fn decode_skeleton_definition(&mut self) -> Result<&SkeletonDefinition> {
        let definition = SkeletonDefinition::read(&mut self.cursor);
        if self.validate_hierarchy && !self.cursor.has_overflow() {
            definition.validate()?;
        }
        self.skeleton_frame.resize(definition.joint_count());
        self.skeleton = definition;
        self.state = ReaderState::SkeletonDefined;
        Ok(&self.skeleton)
    }

    /// Decode everything before the first frame record that `layout` names.
    ///
    /// Does nothing for asset-backed readers, whose buffers have no prologue.
    pub fn decode_prologue(&mut self, layout: &CaptureLayout) -> Result<()> {
        if !self.has_prologue {
            return Ok(());
        }
        self.decode_header()?;
        if layout.user_anchors {
            self.decode_user_anchors();
        }
        if layout.skeleton {
            self.decode_skeleton_definition()?;
        }
        self.cursor.check()
    }

    /// Decode one camera record. No-op once stopped.
    ///
    /// On truncation the previous camera values are kept and the overflow
    /// flag is set.
    pub fn decode_camera_frame(&mut self) {
        if self.is_halted() {
            return;
        }
        if let Some(frame) = CameraFrame::read(&mut self.cursor) {
            self.camera = frame;
            self.state = ReaderState::FrameReady;
        }
    }

    /// Decode one skeleton record into the reused joint buffer. No-op once stopped.
    pub fn decode_skeleton_frame(&mut self) {
        if self.is_halted() {
            return;
        }
        self.skeleton_frame.read_from(&mut self.cursor);
        if !self.cursor.has_overflow() {
            self.state = ReaderState::FrameReady;
        }
    }

    /// Decode one full frame record: camera first, then skeleton.
    pub fn decode_frame(&mut self, layout: &CaptureLayout) {
        if layout.camera {
            self.decode_camera_frame();
        }
        if layout.skeleton {
            self.decode_skeleton_frame();
        }
    }

    /// Advance the frame sequencer.
    ///
    /// On a wrap the cursor rewinds to the start of the buffer; for buffers
    /// with a prologue the caller must decode it again before the next frame.
    pub fn step_frame(&mut self, looping: bool) -> StepOutcome {
        let outcome = self.sequencer.advance(looping);
        match outcome {
            StepOutcome::Continued => {
                trace!(frame = self.sequencer.current_frame(), "advanced frame");
            }
            StepOutcome::WrappedAndRestarted => {
                debug!(frames = self.sequencer.frame_count(), "capture wrapped, restarting");
                self.cursor.reset();
                self.state = if self.has_prologue { ReaderState::Fresh } else { self.ready_state() };
            }
            StepOutcome::Halted => {
                if self.state != ReaderState::Stopped {
                    info!(frames = self.sequencer.frame_count(), "capture finished");
                }
                self.state = ReaderState::Stopped;
            }
        }
        outcome
    }

    /// Current decode state.
    #[inline]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Whether decoding has stopped for good.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.sequencer.is_halted()
    }

    /// Whether the buffer starts with a header prologue.
    #[inline]
    pub fn has_prologue(&self) -> bool {
        self.has_prologue
    }

    /// Frames advanced in the current epoch.
    #[inline]
    pub fn current_frame(&self) -> i32 {
        self.sequencer.current_frame()
    }

    /// Header as last decoded.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Device orientation code from the header.
    #[inline]
    pub fn device_orientation(&self) -> i32 {
        self.header.device_orientation
    }

    /// User anchors as last decoded.
    #[inline]
    pub fn user_anchors(&self) -> &UserAnchors {
        &self.anchors
    }

    /// Skeleton definition as last decoded.
    #[inline]
    pub fn skeleton_definition(&self) -> &SkeletonDefinition {
        &self.skeleton
    }

    /// Joint poses of the last decoded frame.
    #[inline]
    pub fn skeleton_transforms(&self) -> &SkeletonFrame {
        &self.skeleton_frame
    }

    /// Camera pose of the last decoded frame.
    #[inline]
    pub fn camera_transform(&self) -> &Transform {
        &self.camera.transform
    }

    /// Camera timing of the last decoded frame.
    #[inline]
    pub fn camera_metadata(&self) -> &CameraFrameMetaData {
        &self.camera.meta
    }

    /// Whether any read has overflowed the buffer since the last wrap.
    #[inline]
    pub fn has_overflow(&self) -> bool {
        self.cursor.has_overflow()
    }

    /// `Err(BufferOverflow)` if the overflow flag is set.
    #[inline]
    pub fn check(&self) -> Result<()> {
        self.cursor.check()
    }

    /// The underlying cursor.
    #[inline]
    pub fn cursor(&self) -> &ByteCursor {
        &self.cursor
    }

    /// Mutable access to the underlying cursor.
    #[inline]
    pub fn cursor_mut(&mut self) -> &mut ByteCursor {
        &mut self.cursor
    }
}
