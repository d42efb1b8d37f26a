//! # assetgraph
//!
//! Reader and writer for game-engine serialized asset containers: typed
//! object decoding, pointer resolution across files, and byte-stable
//! re-encoding with optional porting between engine revisions.
//!
//! ## Modules
//!
//! - [`util`] - Error types
//! - [`io`] - Endian-aware binary cursor and writer
//! - [`meta`] - Class ids, engine versions, layout rules, pointers
//! - [`objects`] - Decoded object kinds and the class registry
//! - [`file`] - Serialized file decode and encode
//! - [`collection`] - Loaded file set and pointer resolution
//! - [`report`] - Progress and event reporting
//!
//! ## Example
//!
//! ```ignore
//! use assetgraph::prelude::*;
//!
//! let mut assets = AssetCollection::new();
//! let level = assets.load_path("level0")?;
//! let file = assets.file(level)?;
//! for path_id in file.path_ids() {
//!     if let Some(go) = file.object_as::<GameObject>(path_id) {
//!         println!("{} has {} components", go.name, go.components().len());
//!     }
//! }
//! let bytes = assets.encode(level, &EncodeOptions::default())?;
//! ```

pub mod util;
pub mod io;
pub mod meta;
pub mod objects;
pub mod file;
pub mod collection;
pub mod report;

// Front-end settings (enabled with the "cli" feature)
#[cfg(feature = "cli")]
pub mod settings;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::io::{BinaryReader, BinaryWriter, Endian};
    pub use crate::meta::{rule_for, AnyObject, ClassId, Component, EngineVersion, GameObjectRef, LayoutRule, PPtr, TransformRef};
    pub use crate::objects::{AssetObject, ClassRegistry, ComponentPair, GameObject, ObjectInfo, RawObject, TextAsset, Transform};
    pub use crate::file::{EncodeOptions, FileBytes, FileHeader, FileIdentifier, LoadOptions, ObjectEntry, SerializedFile};
    pub use crate::collection::{AssetCollection, DanglingReason, FileHandle, Resolved};
    pub use crate::report::{Event, NullReporter, Reporter, Status, StatusReporter, TracingReporter};
}
