//! Immutable capture buffers.
//!
//! A [`CaptureData`] owns the raw bytes of one capture, either read into
//! memory or memory-mapped. It is never mutated after construction, so any
//! number of readers can share one instance through an `Arc`.

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use tracing::debug;

use crate::util::{Error, Result};

/// Raw bytes of one capture.
pub struct CaptureData {
    inner: DataInner,
}

enum DataInner {
    /// Memory-mapped file
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    /// Bytes owned in memory
    Owned(Vec<u8>),
}

impl CaptureData {
    /// Open a capture file, memory-mapped when available.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a capture file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();

        #[cfg(feature = "mmap")]
        if use_mmap && size > 0 {
            // Safety: the file is opened read-only and the mapping is never written
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            debug!(path = %path.display(), size, "mapped capture file");
            return Ok(Self { inner: DataInner::Mmap(mmap) });
        }
        #[cfg(not(feature = "mmap"))]
        let _ = use_mmap;

        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)?;
        debug!(path = %path.display(), size = buf.len(), "read capture file");
        Ok(Self { inner: DataInner::Owned(buf) })
    }

    /// Open a capture file and wrap it for sharing between readers.
    pub fn open_shared(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::open(path)?))
    }

    /// The raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.inner {
            #[cfg(feature = "mmap")]
            DataInner::Mmap(mmap) => &mmap[..],
            DataInner::Owned(buf) => buf.as_slice(),
        }
    }

    /// Whether the bytes come from a memory mapping.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        match &self.inner {
            #[cfg(feature = "mmap")]
            DataInner::Mmap(_) => true,
            DataInner::Owned(_) => false,
        }
    }
}

impl Deref for CaptureData {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for CaptureData {
    fn from(buf: Vec<u8>) -> Self {
        Self { inner: DataInner::Owned(buf) }
    }
}

impl From<&[u8]> for CaptureData {
    fn from(buf: &[u8]) -> Self {
        Self::from(buf.to_vec())
    }
}

impl std::fmt::Debug for CaptureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureData")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
