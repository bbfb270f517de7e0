//! Forward-only byte cursor over an immutable capture buffer.
//!
//! Every primitive read checks `offset + size <= len` first. A read that
//! would run past the end sets a sticky overflow flag, consumes nothing and
//! returns a zero value. Once set, the flag stays set (and all further reads
//! fail the same way) until [`ByteCursor::reset`]. Callers read a batch of
//! fields unconditionally and poll [`ByteCursor::has_overflow`] or
//! [`ByteCursor::check`] afterwards.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};

use super::source::CaptureData;
use crate::geom::convert;
use crate::util::{Error, Mat4, Quat, Result, Transform, Vec3, Vec4};

/// Cursor over a shared, read-only capture buffer.
#[derive(Clone, Debug)]
pub struct ByteCursor {
    data: Arc<CaptureData>,
    offset: usize,
    overflowed: bool,
}

impl ByteCursor {
    /// Create a cursor owning `data`.
    pub fn new(data: impl Into<CaptureData>) -> Self {
        Self::shared(Arc::new(data.into()))
    }

    /// Create a cursor over a buffer shared with other readers.
    pub fn shared(data: Arc<CaptureData>) -> Self {
        Self { data, offset: 0, overflowed: false }
    }

    /// The underlying buffer.
    #[inline]
    pub fn data(&self) -> &Arc<CaptureData> {
        &self.data
    }

    /// Total buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read offset.
    #[inline]
    pub fn tell(&self) -> usize {
        self.offset
    }

    /// Bytes left between the offset and the end of the buffer.
    #[inline]
    pub fn available(&self) -> usize {
        self.len() - self.offset
    }

    /// Whether any read has run past the end since the last reset.
    #[inline]
    pub fn has_overflow(&self) -> bool {
        self.overflowed
    }

    /// Convert the sticky flag into an error.
    pub fn check(&self) -> Result<()> {
        if self.overflowed {
            Err(Error::BufferOverflow { offset: self.offset, len: self.len() })
        } else {
            Ok(())
        }
    }

    /// Rewind to offset 0 and clear the overflow flag.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.overflowed = false;
    }

    /// Jump to an absolute position. Positions at or past the end overflow.
    pub fn seek(&mut self, pos: usize) {
        if !self.overflowed && pos < self.len() {
            self.offset = pos;
        } else {
            self.overflowed = true;
        }
    }

    /// Consume `n` bytes, or flag an overflow.
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        if self.overflowed {
            return None;
        }
        match self.offset.checked_add(n) {
            Some(end) if end <= self.len() => {
                let start = self.offset;
                self.offset = end;
                Some(&self.data.as_bytes()[start..end])
            }
            _ => {
                self.overflowed = true;
                None
            }
        }
    }

    pub fn read_u8(&mut self) -> u8 {
        self.take(1).map_or(0, |b| b[0])
    }

    pub fn read_i32(&mut self) -> i32 {
        self.take(4).map_or(0, LittleEndian::read_i32)
    }

    pub fn read_u32(&mut self) -> u32 {
        self.take(4).map_or(0, LittleEndian::read_u32)
    }

    pub fn read_i64(&mut self) -> i64 {
        self.take(8).map_or(0, LittleEndian::read_i64)
    }

    pub fn read_u64(&mut self) -> u64 {
        self.take(8).map_or(0, LittleEndian::read_u64)
    }

    pub fn read_f32(&mut self) -> f32 {
        self.take(4).map_or(0.0, LittleEndian::read_f32)
    }

    pub fn read_f64(&mut self) -> f64 {
        self.take(8).map_or(0.0, LittleEndian::read_f64)
    }

    /// Read an i32 length prefix followed by that many UTF-8 bytes.
    ///
    /// A negative length or one larger than the remaining buffer overflows.
    /// Invalid UTF-8 is replaced and the string ends at the first NUL.
    pub fn read_string(&mut self) -> String {
        let len = self.read_i32();
        if self.overflowed {
            return String::new();
        }
        let size_ok = len >= 0 && (len as usize) <= self.available();
        if !size_ok {
            self.overflowed = true;
            return String::new();
        }
        match self.take(len as usize) {
            Some(bytes) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            }
            None => String::new(),
        }
    }

    /// Three f32 components, device convention, unconverted.
    pub fn read_vec3(&mut self) -> Vec3 {
        let x = self.read_f32();
        let y = self.read_f32();
        let z = self.read_f32();
        Vec3::new(x, y, z)
    }

    /// Four f32 components read literally as `x y z w`, unconverted.
    pub fn read_quat(&mut self) -> Quat {
        let x = self.read_f32();
        let y = self.read_f32();
        let z = self.read_f32();
        let w = self.read_f32();
        Quat::from_xyzw(x, y, z, w)
    }

    /// One 4-component matrix row/plane.
    pub fn read_plane(&mut self) -> Vec4 {
        let x = self.read_f32();
        let y = self.read_f32();
        let z = self.read_f32();
        let w = self.read_f32();
        Vec4::new(x, y, z, w)
    }

    /// Four consecutive planes as a column-major 4x4 matrix.
    pub fn read_matrix(&mut self) -> Mat4 {
        let c0 = self.read_plane();
        let c1 = self.read_plane();
        let c2 = self.read_plane();
        let c3 = self.read_plane();
        Mat4::from_cols(c0, c1, c2, c3)
    }

    /// A matrix record converted to an engine-convention transform.
    pub fn read_transform(&mut self) -> Transform {
        let m = self.read_matrix();
        convert::matrix_to_engine(&m)
    }

    /// Borrow the next `n` bytes. Returns an empty slice on overflow.
    pub fn read_bytes(&mut self, n: usize) -> &[u8] {
        self.take(n).unwrap_or(&[])
    }

    /// Drain everything from the offset to the end of the buffer.
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let n = if self.overflowed { 0 } else { self.available() };
        self.take(n).map(<[u8]>::to_vec).unwrap_or_default()
    }
}
