//! Decoded object model.
//!
//! Every decoded object implements [`AssetObject`]. Concrete kinds are
//! created by the [`ClassRegistry`] from a directory entry's bytes; kinds
//! without a registered decoder become [`RawObject`], which keeps the bytes
//! verbatim so the file can still be written back unchanged.

mod game_object;
mod raw;
mod registry;
mod text_asset;
mod transform;

pub use game_object::*;
pub use raw::*;
pub use registry::*;
pub use text_asset::*;
pub use transform::*;

use std::any::Any;
use std::fmt;

use crate::collection::FileHandle;
use crate::file::SerializedFile;
use crate::io::BinaryWriter;
use crate::meta::{ClassId, EngineVersion, LayoutRule, PPtr};
use crate::util::{Error, Result};

/// Identity of a decoded object and the handle of the file that owns it.
///
/// `path_id` is unique inside one file only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectInfo {
    pub path_id: i64,
    pub class_id: ClassId,
    pub file: FileHandle,
}

impl ObjectInfo {
    pub const fn new(path_id: i64, class_id: ClassId, file: FileHandle) -> Self {
        Self { path_id, class_id, file }
    }

    /// Identity not yet placed in any file.
    pub const fn detached(class_id: ClassId) -> Self {
        Self::new(0, class_id, FileHandle::DETACHED)
    }
}

/// Common contract of every decoded object kind.
pub trait AssetObject: Any + Send + Sync + fmt::Debug {
    fn info(&self) -> &ObjectInfo;

    fn info_mut(&mut self) -> &mut ObjectInfo;

    /// Write the object body for the revision carried by `ctx`.
    fn encode(&self, writer: &mut BinaryWriter, ctx: &mut EncodeContext<'_>) -> Result<()>;

    /// Display name, when the kind has one.
    fn name(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn AssetObject + 'a {
    #[inline]
    pub fn path_id(&self) -> i64 {
        self.info().path_id
    }

    #[inline]
    pub fn class_id(&self) -> ClassId {
        self.info().class_id
    }

    pub fn is<T: AssetObject>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: AssetObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: AssetObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Implements the `Any` plumbing and identity accessors of [`AssetObject`].
macro_rules! impl_object_boilerplate {
    () => {
        fn info(&self) -> &$crate::objects::ObjectInfo {
            &self.info
        }

        fn info_mut(&mut self) -> &mut $crate::objects::ObjectInfo {
            &mut self.info
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}
pub(crate) use impl_object_boilerplate;

/// What a decoder may consult besides its own bytes.
pub struct DecodeContext<'a> {
    /// File being decoded; gives access to its directory.
    pub file: &'a SerializedFile,
    /// Layout rule of the file's declared revision.
    pub rule: &'static LayoutRule,
}

impl DecodeContext<'_> {
    /// Class id of a pointer target when it lives in the same file.
    pub fn local_class_id<T>(&self, ptr: &PPtr<T>) -> Option<ClassId> {
        if ptr.file_index == 0 && !ptr.is_null() {
            self.file.class_id_of(ptr.path_id)
        } else {
            None
        }
    }
}

/// Target revision and warning sink for one encode call.
pub struct EncodeContext<'a> {
    pub file: &'a SerializedFile,
    pub target: EngineVersion,
    /// Container format being written.
    pub format: u32,
    rule: Option<&'static LayoutRule>,
    porting: bool,
    warnings: Vec<String>,
}

impl<'a> EncodeContext<'a> {
    pub(crate) fn new(
        file: &'a SerializedFile,
        target: EngineVersion,
        format: u32,
        rule: Option<&'static LayoutRule>,
    ) -> Self {
        let porting = file.version() != Some(target);
        Self { file, target, format, rule, porting, warnings: Vec::new() }
    }

    /// Mark whether bodies are being written for a revision other than the
    /// file's declared one.
    pub(crate) fn with_porting(mut self, porting: bool) -> Self {
        self.porting = porting;
        self
    }

    /// True when writing for a revision other than the declared one.
    #[inline]
    pub fn is_porting(&self) -> bool {
        self.porting
    }

    /// Layout rule of the target revision.
    pub fn rule(&self) -> Result<&'static LayoutRule> {
        self.rule
            .ok_or_else(|| Error::UnsupportedRevision(self.target.to_string()))
    }

    /// Record a representation compromise for the current object.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Class id of a pointer target when it lives in the same file.
    pub fn local_class_id<T>(&self, ptr: &PPtr<T>) -> Option<ClassId> {
        if ptr.file_index == 0 && !ptr.is_null() {
            self.file.class_id_of(ptr.path_id)
        } else {
            None
        }
    }
}
