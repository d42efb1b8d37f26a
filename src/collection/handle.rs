//! Generation-checked file handles.

use std::fmt;

/// Stable reference to a file slot of an [`AssetCollection`](super::AssetCollection).
///
/// Handles carry the collection generation they were issued under; after
/// `reset` or `dispose` every older handle is rejected with
/// [`Error::Invalidated`](crate::Error::Invalidated).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle {
    index: u32,
    generation: u64,
}

impl FileHandle {
    /// Handle of a file that is not part of any collection.
    pub const DETACHED: Self = Self { index: u32::MAX, generation: 0 };

    pub(crate) const fn new(index: usize, generation: u64) -> Self {
        Self { index: index as u32, generation }
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub const fn is_detached(&self) -> bool {
        self.generation == 0
    }
}

impl Default for FileHandle {
    fn default() -> Self {
        Self::DETACHED
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "FileHandle(detached)")
        } else {
            write!(f, "FileHandle({}@{})", self.index, self.generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached() {
        assert!(FileHandle::DETACHED.is_detached());
        assert_eq!(FileHandle::default(), FileHandle::DETACHED);
        assert!(!FileHandle::new(0, 1).is_detached());
        assert_ne!(FileHandle::new(0, 1), FileHandle::new(0, 2));
        assert_eq!(format!("{:?}", FileHandle::new(3, 2)), "FileHandle(3@2)");
    }
}
