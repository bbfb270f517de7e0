//! Reader and replay configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geom::BODY_JOINT_COUNT;
use crate::stream::{CaptureLayout, DEFAULT_PROTOCOL_VERSION};
use crate::util::{Error, Result};

/// Settings shared by readers and players.
///
/// Missing JSON fields take their default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Header version the capture source emits.
    pub protocol_version: i32,
    /// Sections present in the capture.
    pub layout: CaptureLayout,
    /// Restart from the first frame once all frames are consumed.
    pub looping: bool,
    /// Largest parent index accepted when building parent-relative poses.
    pub max_joints: Option<usize>,
    /// Reject malformed joint hierarchies when the skeleton is decoded.
    pub validate_hierarchy: bool,
    /// Nominal replay ticks per second.
    pub tick_rate: f32,
    /// Ticks between scene-geometry snapshots.
    pub geometry_interval: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            layout: CaptureLayout::default(),
            looping: true,
            max_joints: Some(BODY_JOINT_COUNT),
            validate_hierarchy: false,
            tick_rate: 60.0,
            geometry_interval: 60,
        }
    }
}

impl ReaderConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), ?config, "loaded reader config");
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no player can run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(Error::InvalidConfig(format!("tick_rate must be positive, got {}", self.tick_rate)));
        }
        if self.geometry_interval == 0 {
            return Err(Error::InvalidConfig("geometry_interval must be at least 1".into()));
        }
        if self.max_joints == Some(0) {
            return Err(Error::InvalidConfig("max_joints must be at least 1".into()));
        }
        Ok(())
    }

    /// Seconds between ticks.
    #[inline]
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.tick_rate
    }
}
