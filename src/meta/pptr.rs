//! Weak cross-object references.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::io::{BinaryReader, BinaryWriter};
use crate::util::Result;

/// Marker for pointers to any component.
#[derive(Debug)]
pub enum Component {}

/// Marker for pointers to game objects.
#[derive(Debug)]
pub enum GameObjectRef {}

/// Marker for pointers to transforms.
#[derive(Debug)]
pub enum TransformRef {}

/// Marker for pointers of unspecified target kind.
#[derive(Debug)]
pub enum AnyObject {}

/// Pointer to an object, possibly in another file.
///
/// `file_index == 0` is the referencing file itself; `n > 0` is the
/// `n - 1`-th entry of its external table. `path_id == 0` is null.
/// A pointer is only a pair of indices and must be resolved through an
/// [`AssetCollection`](crate::collection::AssetCollection).
pub struct PPtr<T = AnyObject> {
    pub file_index: i32,
    pub path_id: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PPtr<T> {
    pub const NULL: Self = Self::new(0, 0);

    pub const fn new(file_index: i32, path_id: i64) -> Self {
        Self { file_index, path_id, _marker: PhantomData }
    }

    /// Pointer into the referencing file.
    pub const fn local(path_id: i64) -> Self {
        Self::new(0, path_id)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.path_id == 0
    }

    /// Same indices, different target marker.
    #[inline]
    pub const fn cast<U>(self) -> PPtr<U> {
        PPtr::new(self.file_index, self.path_id)
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let start = reader.position();
        let file_index = reader.read_i32()?;
        let path_id = match reader.read_i64() {
            Ok(id) => id,
            Err(e) => {
                reader.set_position(start)?;
                return Err(e);
            }
        };
        Ok(Self::new(file_index, path_id))
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_i32(self.file_index);
        writer.write_i64(self.path_id);
    }
}

impl<T> Clone for PPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PPtr<T> {}

impl<T> Default for PPtr<T> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<T> PartialEq for PPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.file_index == other.file_index && self.path_id == other.path_id
    }
}

impl<T> Eq for PPtr<T> {}

impl<T> Hash for PPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_index.hash(state);
        self.path_id.hash(state);
    }
}

impl<T> fmt::Debug for PPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("PPtr(null)")
        } else {
            write!(f, "PPtr({}:{})", self.file_index, self.path_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;

    #[test]
    fn test_null() {
        assert!(PPtr::<Component>::NULL.is_null());
        assert!(PPtr::<Component>::new(3, 0).is_null());
        assert!(!PPtr::<Component>::local(100).is_null());
    }

    #[test]
    fn test_structural_equality() {
        let a = PPtr::<Component>::new(0, 100);
        let b = PPtr::<Component>::new(1, 100);
        assert_ne!(a, b);
        assert_eq!(a, PPtr::local(100));
        assert_eq!(a.cast::<TransformRef>(), PPtr::<TransformRef>::local(100));
    }

    #[test]
    fn test_codec() {
        let mut w = BinaryWriter::new(Endian::Big);
        PPtr::<Component>::new(2, -5).write(&mut w);
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 12);

        let mut r = BinaryReader::new(&bytes, Endian::Big);
        assert_eq!(PPtr::<Component>::read(&mut r).unwrap(), PPtr::new(2, -5));

        let mut r = BinaryReader::new(&bytes[..8], Endian::Big);
        assert!(PPtr::<Component>::read(&mut r).is_err());
        assert_eq!(r.position(), 0);
    }
}
