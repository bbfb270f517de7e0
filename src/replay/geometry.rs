//! Scene geometry replay.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ReaderConfig;
use crate::geom::{read_mesh_snapshot, MeshPart};
use crate::stream::{ByteCursor, CaptureData};

/// Decodes one geometry snapshot every `interval` ticks, starting on the first.
///
/// A snapshot with no parts keeps the previous reconstruction. Replay stops
/// for good once the stream is exhausted.
#[derive(Clone, Debug)]
pub struct GeometryPlayer {
    cursor: ByteCursor,
    interval: u32,
    tick: u64,
    next_snapshot: u64,
    parts: Vec<MeshPart>,
    snapshots: usize,
}

impl GeometryPlayer {
    /// Player over a geometry stream. An `interval` of zero is treated as one.
    pub fn new(data: Arc<CaptureData>, interval: u32) -> Self {
        Self {
            cursor: ByteCursor::shared(data),
            interval: interval.max(1),
            tick: 0,
            next_snapshot: 0,
            parts: Vec::new(),
            snapshots: 0,
        }
    }

    /// Player using the configured snapshot interval.
    pub fn with_config(data: Arc<CaptureData>, config: &ReaderConfig) -> Self {
        Self::new(data, config.geometry_interval)
    }

    /// Open a geometry stream file.
    pub fn open(path: impl AsRef<Path>, interval: u32) -> crate::Result<Self> {
        Ok(Self::new(CaptureData::open_shared(path)?, interval))
    }

    /// Run one tick. Returns true if a new reconstruction was loaded.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let due = self.tick == self.next_snapshot;
        self.tick += 1;
        if !due {
            return false;
        }
        self.next_snapshot += u64::from(self.interval);

        match read_mesh_snapshot(&mut self.cursor) {
            Some(parts) if !parts.is_empty() => {
                self.snapshots += 1;
                debug!(snapshot = self.snapshots, parts = parts.len(), "geometry updated");
                self.parts = parts;
                true
            }
            Some(_) => false,
            None => {
                info!(snapshots = self.snapshots, "geometry stream finished");
                false
            }
        }
    }

    /// Current reconstruction.
    #[inline]
    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    /// Snapshots loaded so far.
    #[inline]
    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    /// True once a read has run past the end of the stream.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor.has_overflow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(buf: &mut Vec<u8>, verts: &[[f32; 3]]) {
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&(verts.len() as i64).to_le_bytes());
        for v in verts {
            for c in v {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&3i64.to_le_bytes());
        for i in [0u32, 1, 2] {
            buf.extend_from_slice(&i.to_le_bytes());
        }
    }

    #[test]
    fn test_interval() {
        let mut buf = Vec::new();
        snapshot(&mut buf, &[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        snapshot(&mut buf, &[[0.0; 3], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
        let mut g = GeometryPlayer::new(Arc::new(CaptureData::from(buf)), 3);

        let loaded: Vec<bool> = (0..7).map(|_| g.tick()).collect();
        assert_eq!(loaded, vec![true, false, false, true, false, false, false]);
        assert_eq!(g.snapshots(), 2);
        assert!(g.is_finished());
        assert_eq!(g.parts()[0].vertices[1].x, -100.0);
        assert!(!g.tick());
    }

    #[test]
    fn test_empty_snapshot_keeps_parts() {
        let mut buf = Vec::new();
        snapshot(&mut buf, &[[1.0, 2.0, 3.0]; 3]);
        buf.extend_from_slice(&0i32.to_le_bytes());
        let config = ReaderConfig { geometry_interval: 1, ..Default::default() };
        let mut g = GeometryPlayer::with_config(Arc::new(CaptureData::from(buf)), &config);
        assert!(g.tick());
        assert!(!g.tick());
        assert_eq!(g.parts().len(), 1);
        assert!(!g.is_finished());
    }
}
