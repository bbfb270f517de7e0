//! Capture stream decoding.
//!
//! - [`ByteCursor`] - Bounds-checked little-endian reads with a sticky overflow flag
//! - [`FrameSequencer`] - Frame counting with loop/stop semantics
//! - [`CaptureReader`] - Header, prologue and per-frame decode state machine
//! - [`CaptureData`] - Owned or memory-mapped capture bytes

mod format;
mod cursor;
mod sequencer;
mod reader;
mod source;

pub use format::*;
pub use cursor::*;
pub use sequencer::*;
pub use reader::*;
pub use source::*;
