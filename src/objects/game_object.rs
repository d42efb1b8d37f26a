//! Composite container object holding a list of component pointers.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use super::{impl_object_boilerplate, AssetObject, DecodeContext, EncodeContext, ObjectInfo};
use crate::io::{BinaryReader, BinaryWriter};
use crate::meta::{ClassId, Component, PPtr};
use crate::util::{Error, Result};

/// Bytes taken by the smallest component pair (a bare pointer).
const MIN_PAIR_SIZE: usize = 12;

/// One attached component: its class id and a pointer to it.
///
/// The class id duplicates what the pointed object already knows. Layouts
/// that omit it leave [`ClassId::UNKNOWN`] here until it is recovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentPair {
    pub class_id: ClassId,
    pub ptr: PPtr<Component>,
}

impl ComponentPair {
    pub const fn new(class_id: ClassId, ptr: PPtr<Component>) -> Self {
        Self { class_id, ptr }
    }
}

/// Scene node: named, layered, taggable, and owning a list of components.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub info: ObjectInfo,
    pub components: SmallVec<[ComponentPair; 4]>,
    pub layer: u32,
    pub name: String,
    pub tag: u16,
    pub active: bool,
}

impl GameObject {
    /// Active object on layer 0 with no components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ObjectInfo::detached(ClassId::GAME_OBJECT),
            components: SmallVec::new(),
            layer: 0,
            name: name.into(),
            tag: 0,
            active: true,
        }
    }

    pub fn decode(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        ctx: &DecodeContext<'_>,
    ) -> Result<Self> {
        let count = reader.read_count()?;
        if count > reader.remaining() / MIN_PAIR_SIZE {
            return Err(Error::invalid(format!(
                "component count {} exceeds object size",
                count
            )));
        }

        let mut components = SmallVec::with_capacity(count);
        for _ in 0..count {
            let pair = if ctx.rule.explicit_component_class_ids {
                let class_id = ClassId(reader.read_i32()?);
                ComponentPair::new(class_id, PPtr::read(reader)?)
            } else {
                let ptr = PPtr::read(reader)?;
                let class_id = ctx.local_class_id(&ptr).unwrap_or(ClassId::UNKNOWN);
                ComponentPair::new(class_id, ptr)
            };
            components.push(pair);
        }

        let layer = reader.read_u32()?;
        let name = reader.read_string32()?;
        let tag = reader.read_u16()?;
        let active = reader.read_bool()?;
        reader.align()?;

        Ok(Self { info, components, layer, name, tag, active })
    }

    pub(crate) fn decode_boxed(
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn AssetObject>> {
        Ok(Box::new(Self::decode(reader, info, ctx)?))
    }

    pub fn add_component(&mut self, class_id: ClassId, ptr: PPtr<Component>) -> &mut Self {
        self.components.push(ComponentPair::new(class_id, ptr));
        self
    }

    #[inline]
    pub fn components(&self) -> &[ComponentPair] {
        &self.components
    }

    /// First component of the given class.
    pub fn find_component(&self, class_id: ClassId) -> Option<PPtr<Component>> {
        self.find_component_any(&[class_id])
    }

    /// First component whose class is any of `class_ids`.
    pub fn find_component_any(&self, class_ids: &[ClassId]) -> Option<PPtr<Component>> {
        self.components
            .iter()
            .find(|pair| class_ids.contains(&pair.class_id))
            .map(|pair| pair.ptr)
    }

    /// All components of the given class, in list order.
    pub fn find_components(&self, class_id: ClassId) -> impl Iterator<Item = PPtr<Component>> + '_ {
        self.components
            .iter()
            .filter(move |pair| pair.class_id == class_id)
            .map(|pair| pair.ptr)
    }

    /// All components whose class is any of `class_ids`, in list order.
    pub fn find_components_any<'a>(
        &'a self,
        class_ids: &'a [ClassId],
    ) -> impl Iterator<Item = PPtr<Component>> + 'a {
        self.components
            .iter()
            .filter(move |pair| class_ids.contains(&pair.class_id))
            .map(|pair| pair.ptr)
    }

    pub fn has_component(&self, class_id: ClassId) -> bool {
        self.components.iter().any(|pair| pair.class_id == class_id)
    }

    pub fn has_any_component(&self, class_ids: &[ClassId]) -> bool {
        self.components
            .iter()
            .any(|pair| class_ids.contains(&pair.class_id))
    }

    /// Replace unknown class ids with the ones `lookup` recovers from the
    /// pointer targets. Pairs `lookup` cannot answer stay unknown.
    ///
    /// Returns the number of pairs updated.
    pub fn cache_class_ids<F>(&mut self, mut lookup: F) -> usize
    where
        F: FnMut(&PPtr<Component>) -> Option<ClassId>,
    {
        let mut updated = 0;
        for pair in self.components.iter_mut().filter(|p| p.class_id.is_unknown()) {
            if let Some(class_id) = lookup(&pair.ptr).filter(|id| !id.is_unknown()) {
                pair.class_id = class_id;
                updated += 1;
            }
        }
        updated
    }
}

impl AssetObject for GameObject {
    impl_object_boilerplate!();

    fn encode(&self, writer: &mut BinaryWriter, ctx: &mut EncodeContext<'_>) -> Result<()> {
        let rule = ctx.rule()?;
        writer.write_count(self.components.len())?;
        if rule.explicit_component_class_ids {
            for pair in &self.components {
                let class_id = match pair.class_id {
                    id if !id.is_unknown() => id,
                    _ => ctx.local_class_id(&pair.ptr).unwrap_or_else(|| {
                        ctx.warn(format!(
                            "component {:?} of '{}' has no known class id",
                            pair.ptr, self.name
                        ));
                        ClassId::UNKNOWN
                    }),
                };
                writer.write_i32(class_id.0);
                pair.ptr.write(writer);
            }
        } else {
            for pair in &self.components {
                pair.ptr.write(writer);
            }
        }

        writer.write_u32(self.layer);
        writer.write_string32(&self.name)?;
        writer.write_u16(self.tag);
        writer.write_bool(self.active);
        writer.align();
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl PartialEq for GameObject {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components && self.name == other.name && self.active == other.active
    }
}

impl Eq for GameObject {}

impl Hash for GameObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
        self.name.hash(state);
        self.active.hash(state);
    }
}
