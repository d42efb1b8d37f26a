//! Pointer resolution outcomes.

use std::fmt;

use crate::objects::AssetObject;

/// Why a non-null pointer has no target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReason {
    /// `file_index` has no entry in the owner's external table.
    MissingExternal(i32),
    /// The external file is not loaded. Holds its recorded path.
    MissingFile(String),
    /// The target file is loaded but has no such object.
    MissingObject { file: String, path_id: i64 },
}

impl fmt::Display for DanglingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingExternal(index) => write!(f, "no external entry for file index {}", index),
            Self::MissingFile(path) => write!(f, "external file '{}' is not loaded", path),
            Self::MissingObject { file, path_id } => write!(f, "'{}' has no object {}", file, path_id),
        }
    }
}

/// Result of resolving a pointer against a collection.
#[derive(Debug)]
pub enum Resolved<'a> {
    /// The pointer is null.
    Null,
    Found(&'a dyn AssetObject),
    Dangling(DanglingReason),
}

impl<'a> Resolved<'a> {
    /// Target object, treating null and dangling alike.
    pub fn found(self) -> Option<&'a dyn AssetObject> {
        match self {
            Self::Found(object) => Some(object),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::Dangling(_))
    }
}
