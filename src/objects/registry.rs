//! Class id to decoder mapping.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::{AssetObject, DecodeContext, GameObject, ObjectInfo, TextAsset, Transform};
use crate::io::BinaryReader;
use crate::meta::ClassId;
use crate::util::Result;

/// Decoder for one class: builds an object from its bytes and identity.
pub type Factory = Arc<
    dyn Fn(&mut BinaryReader<'_>, ObjectInfo, &DecodeContext<'_>) -> Result<Box<dyn AssetObject>>
        + Send
        + Sync,
>;

type FactoryFn =
    fn(&mut BinaryReader<'_>, ObjectInfo, &DecodeContext<'_>) -> Result<Box<dyn AssetObject>>;

const BUILTIN: &[(ClassId, FactoryFn)] = &[
    (ClassId::GAME_OBJECT, GameObject::decode_boxed),
    (ClassId::TRANSFORM, Transform::decode_boxed),
    (ClassId::TEXT_ASSET, TextAsset::decode_boxed),
];

/// Mapping from class id to decoder.
///
/// Filled once, then only read. Lookups of unregistered ids are not an
/// error; the caller falls back to [`RawObject`](super::RawObject).
#[derive(Clone, Default)]
pub struct ClassRegistry {
    factories: HashMap<ClassId, Factory>,
}

impl ClassRegistry {
    /// Empty registry: everything decodes raw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in decoders.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &(class_id, factory) in BUILTIN {
            registry.register(class_id, factory);
        }
        registry
    }

    /// Process-wide built-in registry, created on first use.
    pub fn shared() -> Arc<ClassRegistry> {
        static SHARED: OnceLock<Arc<ClassRegistry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::builtin())).clone()
    }

    /// Register or replace the decoder for `class_id`.
    pub fn register<F>(&mut self, class_id: ClassId, factory: F) -> &mut Self
    where
        F: Fn(&mut BinaryReader<'_>, ObjectInfo, &DecodeContext<'_>) -> Result<Box<dyn AssetObject>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(class_id, Arc::new(factory));
        self
    }

    #[inline]
    pub fn contains(&self, class_id: ClassId) -> bool {
        self.factories.contains_key(&class_id)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.factories.keys().copied()
    }

    /// Run the decoder for `info.class_id`; `None` when nothing is registered.
    pub fn decode(
        &self,
        reader: &mut BinaryReader<'_>,
        info: ObjectInfo,
        ctx: &DecodeContext<'_>,
    ) -> Option<Result<Box<dyn AssetObject>>> {
        self.factories
            .get(&info.class_id)
            .map(|factory| factory(reader, info, ctx))
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.class_ids().collect();
        ids.sort();
        f.debug_struct("ClassRegistry").field("classes", &ids).finish()
    }
}
