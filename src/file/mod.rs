//! Serialized container files.
//!
//! A file is a big-endian [`FileHeader`], a metadata block in the file's own
//! byte order (engine revision, type table, object directory, script types,
//! external references, reference types) and a data region holding object
//! bodies. [`SerializedFile`] decodes all of it and writes it back.

pub mod format;
mod directory;
mod header;
mod options;
mod serialized;
mod source;
mod types;

pub use directory::*;
pub use header::*;
pub use options::*;
pub use serialized::*;
pub use source::*;
pub use types::*;
