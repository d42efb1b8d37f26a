//! Collections of loaded files and pointer resolution across them.
//!
//! ## Key Concepts
//!
//! - **AssetCollection**: files in load order plus a name index
//! - **FileHandle**: generation-checked slot reference, invalidated by `reset`
//! - **Resolved**: null, found, or dangling with a reason
//!
//! ## Example
//!
//! ```ignore
//! use assetgraph::prelude::*;
//!
//! let mut assets = AssetCollection::new();
//! let scene = assets.load("level0", std::fs::read("level0")?)?;
//! for path_id in assets.file(scene)?.path_ids() {
//!     let go = assets.file(scene)?.object_as::<GameObject>(path_id);
//!     if let Some(go) = go {
//!         for pair in go.components() {
//!             println!("{} -> {:?}", go.name, assets.try_resolve(&pair.ptr, scene)?);
//!         }
//!     }
//! }
//! ```

mod assets;
mod handle;
mod resolve;

pub use assets::*;
pub use handle::*;
pub use resolve::*;
