//! Scene hierarchy node component.

use glam::{Quat, Vec3};

use super::{impl_object_boilerplate, AssetObject, DecodeContext, EncodeContext, ObjectInfo};
use crate::io::{BinaryReader, BinaryWriter};
use crate::meta::{ClassId, GameObjectRef, PPtr, TransformRef};
use crate::util::{Error, Result};

/// Local transform of a game object plus its place in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub info: ObjectInfo,
    pub game_object: PPtr<GameObjectRef>,
    pub local_rotation: Quat,
    pub local_position: Vec3,
    pub local_scale: Vec3,
    pub children: Vec<PPtr<TransformRef>>,
    pub father: PPtr<TransformRef>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transform with no owner, parent, or children.
    pub fn new() -> Self {
        Self {
            info: ObjectInfo::detached(ClassId::TRANSFORM),
            game_object: PPtr::NULL,
            local_rotation: Quat::IDENTITY,
            local_position: Vec3::ZERO,
            local_scale: Vec3::ONE,
            children: Vec::new(),
            father: PPtr::NULL,
        }
    }

    pub fn decode(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        _ctx: &DecodeContext<'_>,
    ) -> Result<Self> {
        let game_object = PPtr::read(reader)?;
        let local_rotation = Quat::from_array(read_floats::<4>(reader)?);
        let local_position = Vec3::from_array(read_floats::<3>(reader)?);
        let local_scale = Vec3::from_array(read_floats::<3>(reader)?);

        let count = reader.read_count()?;
        if count > reader.remaining() / 12 {
            return Err(Error::invalid(format!("child count {} exceeds object size", count)));
        }
        let children = (0..count)
            .map(|_| PPtr::read(reader))
            .collect::<Result<Vec<_>>>()?;
        let father = PPtr::read(reader)?;

        Ok(Self {
            info,
            game_object,
            local_rotation,
            local_position,
            local_scale,
            children,
            father,
        })
    }

    pub(crate) fn decode_boxed(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn AssetObject>> {
        Ok(Box::new(Self::decode(reader, info, ctx)?))
    }

    /// True for a hierarchy root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.father.is_null()
    }
}

fn read_floats<const N: usize>(reader: &mut BinaryReader<'_>) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for v in &mut out {
        *v = reader.read_f32()?;
    }
    Ok(out)
}

fn write_floats(writer: &mut BinaryWriter, values: &[f32]) {
    for &v in values {
        writer.write_f32(v);
    }
}

impl AssetObject for Transform {
    impl_object_boilerplate!();

    fn encode(&self, writer: &mut BinaryWriter, _ctx: &mut EncodeContext<'_>) -> Result<()> {
        self.game_object.write(writer);
        write_floats(writer, &self.local_rotation.to_array());
        write_floats(writer, &self.local_position.to_array());
        write_floats(writer, &self.local_scale.to_array());
        writer.write_count(self.children.len())?;
        for child in &self.children {
            child.write(writer);
        }
        self.father.write(writer);
        Ok(())
    }
}
