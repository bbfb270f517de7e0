//! Tick-driven replay.
//!
//! A consumer calls `tick()` once per engine frame; every tick decodes at
//! most one record and never blocks.
//!
//! - [`Player`] - Camera and skeleton frames with loop handling
//! - [`GeometryPlayer`] - Periodic scene-geometry snapshots

mod player;
mod geometry;

pub use player::*;
pub use geometry::*;
