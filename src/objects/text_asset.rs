//! Named blob of text or binary data.

use super::{impl_object_boilerplate, AssetObject, DecodeContext, EncodeContext, ObjectInfo};
use crate::io::{BinaryReader, BinaryWriter};
use crate::meta::ClassId;
use crate::util::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAsset {
    pub info: ObjectInfo,
    pub name: String,
    pub script: Vec<u8>,
}

impl TextAsset {
    pub fn new(name: impl Into<String>, script: impl Into<Vec<u8>>) -> Self {
        Self {
            info: ObjectInfo::detached(ClassId::TEXT_ASSET),
            name: name.into(),
            script: script.into(),
        }
    }

    pub fn decode(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        _ctx: &DecodeContext<'_>,
    ) -> Result<Self> {
        let name = reader.read_aligned_string()?;
        let script = reader.read_byte_array()?.to_vec();
        reader.align()?;
        Ok(Self { info, name, script })
    }

    pub(crate) fn decode_boxed(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn AssetObject>> {
        Ok(Box::new(Self::decode(reader, info, ctx)?))
    }

    /// Payload as text when it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.script).ok()
    }
}

impl AssetObject for TextAsset {
    impl_object_boilerplate!();

    fn encode(&self, writer: &mut BinaryWriter, _ctx: &mut EncodeContext<'_>) -> Result<()> {
        writer.write_aligned_string(&self.name)?;
        writer.write_byte_array(&self.script)?;
        writer.align();
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
