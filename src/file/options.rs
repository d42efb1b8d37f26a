//! Load and encode options.

use std::sync::Arc;

use crate::meta::EngineVersion;
use crate::objects::ClassRegistry;

/// How a file is decoded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Decode every object during load instead of on first access.
    pub eager: bool,
    /// Spread eager decoding over the rayon thread pool.
    pub parallel: bool,
    /// Decoders to use. Defaults to the shared built-in registry.
    pub registry: Arc<ClassRegistry>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            eager: false,
            parallel: true,
            registry: ClassRegistry::shared(),
        }
    }
}

impl LoadOptions {
    /// Decode everything up front.
    pub fn eager() -> Self {
        Self { eager: true, ..Self::default() }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

/// How a file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Revision to write for. `None` keeps the file's declared revision.
    pub target: Option<EngineVersion>,
}

impl EncodeOptions {
    pub fn for_target(target: EngineVersion) -> Self {
        Self { target: Some(target) }
    }
}
