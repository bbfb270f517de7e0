//! Synthetic capture buffers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};
use spatial_capture::prelude::*;

/// Writes capture sections in wire order.
#[derive(Default)]
pub struct CaptureBuilder {
    buf: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header with fixed lens values and capture type 1.
    pub fn header(mut self, version: i32, frame_count: i32, orientation: i32) -> Self {
        let b = &mut self.buf;
        b.write_i32::<LittleEndian>(version).unwrap();
        b.write_i32::<LittleEndian>(frame_count).unwrap();
        b.write_i32::<LittleEndian>(orientation).unwrap();
        for v in [64.0f32, 48.0, 1440.0, 1440.0] {
            b.write_f32::<LittleEndian>(v).unwrap();
        }
        b.write_i32::<LittleEndian>(1).unwrap();
        self
    }

    pub fn anchors(mut self, positions: &[[f32; 3]]) -> Self {
        self.buf.write_i32::<LittleEndian>(positions.len() as i32).unwrap();
        for p in positions {
            self = self.vec3(*p);
        }
        self
    }

    /// Skeleton definition with identity neutral poses.
    pub fn skeleton(mut self, names: &[&str], parents: &[i32]) -> Self {
        self.buf.write_i32::<LittleEndian>(names.len() as i32).unwrap();
        for name in names {
            self.buf.write_i32::<LittleEndian>(name.len() as i32).unwrap();
            self.buf.extend_from_slice(name.as_bytes());
        }
        self.buf.write_i32::<LittleEndian>(parents.len() as i32).unwrap();
        for &p in parents {
            self.buf.write_i32::<LittleEndian>(p).unwrap();
        }
        for _ in names {
            self = self.matrix(Mat4::IDENTITY);
        }
        self
    }

    /// Camera record with fixed exposure values.
    pub fn camera(mut self, timestamp: f64, position: [f32; 3], euler: [f32; 3]) -> Self {
        self.buf.write_f64::<LittleEndian>(timestamp).unwrap();
        self = self.vec3(position).vec3(euler);
        self.buf.write_f32::<LittleEndian>(0.25).unwrap();
        self.buf.write_f64::<LittleEndian>(1.0 / 120.0).unwrap();
        self
    }

    /// Skeleton record for a single tracked body.
    pub fn skeleton_frame(mut self, joints: &[Mat4]) -> Self {
        self.buf.write_u32::<LittleEndian>(1).unwrap();
        for m in joints {
            self = self.matrix(*m);
        }
        self
    }

    pub fn matrix(mut self, m: Mat4) -> Self {
        for v in m.to_cols_array() {
            self.buf.write_f32::<LittleEndian>(v).unwrap();
        }
        self
    }

    pub fn vec3(mut self, v: [f32; 3]) -> Self {
        for c in v {
            self.buf.write_f32::<LittleEndian>(c).unwrap();
        }
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.buf.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.buf.write_i64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    pub fn shared(self) -> Arc<CaptureData> {
        Arc::new(CaptureData::from(self.buf))
    }
}

/// Device-space translation matrix.
pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

pub fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1.0e-3
}

/// Camera-only capture of `frames` records with timestamps 0, 1, 2, ...
pub fn camera_capture(frames: i32) -> CaptureBuilder {
    let mut b = CaptureBuilder::new().header(202005, frames, 1);
    for i in 0..frames {
        b = b.camera(i as f64, [i as f32, 0.0, 0.0], [0.0; 3]);
    }
    b
}

/// Body-tracking capture with a two-joint chain; joint 1 sits one metre
/// above the root and the root moves along device X by one metre per frame.
pub fn body_capture(frames: i32) -> CaptureBuilder {
    let mut b = CaptureBuilder::new()
        .header(202005, frames, 1)
        .skeleton(&["root", "spine"], &[-1, 0]);
    for i in 0..frames {
        let x = i as f32;
        b = b
            .camera(i as f64, [0.0, 1.5, 0.0], [0.0; 3])
            .skeleton_frame(&[translation(x, 0.0, 0.0), translation(x, 1.0, 0.0)]);
    }
    b
}
