//! Identity and revision vocabulary shared by files and objects.
//!
//! - [`ClassId`] - numeric object class tags
//! - [`EngineVersion`] - parsed engine revision strings
//! - [`LayoutRule`] / [`rule_for`] - the revision-gated layout table
//! - [`PPtr`] - weak `(file_index, path_id)` references

mod class_id;
mod pptr;
mod rules;
mod version;

pub use class_id::*;
pub use pptr::*;
pub use rules::*;
pub use version::*;
