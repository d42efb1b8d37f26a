//! Backing storage for a decoded file's bytes.

use std::fmt;
#[cfg(feature = "mmap")]
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use crate::util::{Error, Result};

/// Immutable bytes a file was decoded from. Undecoded and raw objects
/// borrow their bodies from here.
#[derive(Clone)]
pub enum FileBytes {
    /// Buffer supplied by the caller or read from disk.
    Owned(Arc<[u8]>),
    /// Memory-mapped file.
    #[cfg(feature = "mmap")]
    Mapped(Arc<Mmap>),
}

impl FileBytes {
    /// Empty buffer, used by files assembled in memory.
    pub fn empty() -> Self {
        Self::Owned(Arc::from(&[][..]))
    }

    /// Read a whole file into memory.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| not_found_or_io(path, e))?;
        Ok(Self::Owned(data.into()))
    }

    /// Map a file read-only.
    #[cfg(feature = "mmap")]
    pub fn map(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| not_found_or_io(path, e))?;
        if file.metadata()?.len() == 0 {
            // Zero-length mappings are rejected on some platforms.
            return Ok(Self::empty());
        }
        // Safety: the mapping is read-only; the file must not be truncated
        // while the collection holds it.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(Self::Mapped(Arc::new(mmap)))
    }

    /// Map when the `mmap` feature is enabled, read otherwise.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        #[cfg(feature = "mmap")]
        {
            Self::map(path)
        }
        #[cfg(not(feature = "mmap"))]
        {
            Self::read(path)
        }
    }
}

fn not_found_or_io(path: &Path, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::FileNotFound(path.display().to_string())
    } else {
        Error::Io(e)
    }
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Owned(data) => &data[..],
            #[cfg(feature = "mmap")]
            Self::Mapped(mmap) => &mmap[..],
        }
    }
}

impl From<Vec<u8>> for FileBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::Owned(data.into())
    }
}

impl From<&[u8]> for FileBytes {
    fn from(data: &[u8]) -> Self {
        Self::Owned(data.into())
    }
}

impl From<Arc<[u8]>> for FileBytes {
    fn from(data: Arc<[u8]>) -> Self {
        Self::Owned(data)
    }
}

impl fmt::Debug for FileBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Owned(_) => "Owned",
            #[cfg(feature = "mmap")]
            Self::Mapped(_) => "Mapped",
        };
        write!(f, "FileBytes::{}({} bytes)", kind, self.len())
    }
}
