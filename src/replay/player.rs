//! Camera and skeleton replay.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::asset::CaptureAsset;
use crate::config::ReaderConfig;
use crate::geom::{CameraFrameMetaData, SkeletonDefinition, SkeletonFrame};
use crate::stream::{CaptureData, CaptureReader, Header, StepOutcome};
use crate::util::{Error, Result, Transform};

/// Result of one [`Player::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was decoded.
    Frame,
    /// The capture wrapped; the first frame of the new epoch was decoded.
    Looped,
    /// Nothing left to decode.
    Finished,
}

impl TickOutcome {
    /// True when this tick produced fresh frame data.
    #[inline]
    pub fn has_frame(self) -> bool {
        matches!(self, Self::Frame | Self::Looped)
    }
}

/// Replays the camera and skeleton records of one capture.
///
/// Each tick advances the frame sequencer first and then decodes, so an
/// epoch yields exactly as many frames as the header declares.
#[derive(Clone, Debug)]
pub struct Player {
    reader: CaptureReader,
    config: ReaderConfig,
    epoch: u32,
    ticks: u64,
    finished: bool,
}

impl Player {
    /// Player over a capture buffer; decodes the prologue immediately.
    pub fn new(data: Arc<CaptureData>, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let mut reader = CaptureReader::with_config(data, &config);
        reader.decode_prologue(&config.layout)?;
        Ok(Self::from_reader(reader, config))
    }

    /// Open a capture file and decode its prologue.
    pub fn open(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        Self::new(CaptureData::open_shared(path)?, config)
    }

    /// Player over an imported asset; the asset's layout replaces the configured one.
    pub fn from_asset(asset: &CaptureAsset, mut config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        config.layout = asset.layout;
        config.protocol_version = asset.header.version;
        Ok(Self::from_reader(CaptureReader::from_asset(asset), config))
    }

    fn from_reader(reader: CaptureReader, config: ReaderConfig) -> Self {
        debug!(
            frames = reader.header().frame_count,
            joints = reader.skeleton_definition().joint_count(),
            looping = config.looping,
            "player ready"
        );
        Self { reader, config, epoch: 0, ticks: 0, finished: false }
    }

    /// Advance one frame and decode it.
    ///
    /// Buffer truncation is returned once as `Err(BufferOverflow)`; every
    /// later tick reports `Finished`.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.finished {
            return Ok(TickOutcome::Finished);
        }
        self.ticks += 1;

        let outcome = match self.reader.step_frame(self.config.looping) {
            StepOutcome::Continued => TickOutcome::Frame,
            StepOutcome::WrappedAndRestarted => {
                self.reader.decode_prologue(&self.config.layout)?;
                self.epoch += 1;
                if self.reader.step_frame(self.config.looping) != StepOutcome::Continued {
                    debug!("capture has no frames");
                    self.finished = true;
                    return Ok(TickOutcome::Finished);
                }
                TickOutcome::Looped
            }
            StepOutcome::Halted => {
                self.finished = true;
                return Ok(TickOutcome::Finished);
            }
        };

        self.reader.decode_frame(&self.config.layout);
        if let Err(e) = self.reader.check() {
            warn!(frame = self.reader.current_frame(), "capture truncated, stopping replay");
            self.finished = true;
            return Err(e);
        }
        Ok(outcome)
    }

    /// Camera pose placed relative to `origin`.
    pub fn camera_world_transform(&self, origin: &Transform) -> Transform {
        self.reader.camera_transform().compose(origin)
    }

    /// Pose of joint `index` through the skeleton root and then `origin`.
    pub fn joint_world_transform(&self, index: usize, origin: &Transform) -> Result<Transform> {
        let frame = self.reader.skeleton_transforms();
        let out_of_bounds = |index| Error::JointOutOfBounds { index, count: frame.len() };
        let joint = frame.get(index).ok_or_else(|| out_of_bounds(index))?;
        let root = frame.get(0).ok_or_else(|| out_of_bounds(0))?;
        Ok(joint.compose(root).compose(origin))
    }

    /// Joint poses of the current frame, each relative to its parent.
    pub fn relative_joint_transforms(&self) -> Result<Vec<Transform>> {
        self.reader
            .skeleton_transforms()
            .relative_transforms(self.reader.skeleton_definition(), self.config.max_joints)
    }

    /// Camera pose of the current frame.
    #[inline]
    pub fn camera_transform(&self) -> &Transform {
        self.reader.camera_transform()
    }

    /// Camera timing of the current frame.
    #[inline]
    pub fn camera_metadata(&self) -> &CameraFrameMetaData {
        self.reader.camera_metadata()
    }

    /// Joint poses of the current frame.
    #[inline]
    pub fn skeleton_frame(&self) -> &SkeletonFrame {
        self.reader.skeleton_transforms()
    }

    #[inline]
    pub fn skeleton_definition(&self) -> &SkeletonDefinition {
        self.reader.skeleton_definition()
    }

    #[inline]
    pub fn header(&self) -> &Header {
        self.reader.header()
    }

    /// Frame index within the current epoch, 1-based once a frame is decoded.
    #[inline]
    pub fn current_frame(&self) -> i32 {
        self.reader.current_frame()
    }

    /// Completed loop wraps.
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Ticks run so far, counting the ones that decoded nothing.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Nominal playback time of the current frame in seconds.
    #[inline]
    pub fn playback_time(&self) -> f32 {
        self.reader.current_frame().max(0) as f32 * self.config.tick_interval()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    #[inline]
    pub fn reader(&self) -> &CaptureReader {
        &self.reader
    }
}
