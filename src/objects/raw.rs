//! Opaque fallback object.

use super::{impl_object_boilerplate, AssetObject, EncodeContext, ObjectInfo};
use crate::io::BinaryWriter;
use crate::meta::ClassId;
use crate::util::Result;

/// Object whose body was not decoded.
///
/// Used for unregistered class ids, unsupported revisions, and objects
/// whose typed decoder failed. Encodes its bytes unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub info: ObjectInfo,
    pub data: Vec<u8>,
}

impl RawObject {
    pub fn new(class_id: ClassId, data: Vec<u8>) -> Self {
        Self { info: ObjectInfo::detached(class_id), data }
    }

    pub(crate) fn from_bytes(info: ObjectInfo, data: &[u8]) -> Self {
        Self { info, data: data.to_vec() }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl AssetObject for RawObject {
    impl_object_boilerplate!();

    fn encode(&self, writer: &mut BinaryWriter, ctx: &mut EncodeContext<'_>) -> Result<()> {
        if ctx.is_porting() {
            ctx.warn(format!(
                "{} body copied verbatim for revision {}",
                self.info.class_id, ctx.target
            ));
        }
        writer.write_bytes(&self.data);
        Ok(())
    }
}
