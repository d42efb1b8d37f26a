//! The asset collection: loaded files plus the name index used to resolve pointers.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::{DanglingReason, FileHandle, Resolved};
use crate::file::{file_key, EncodeOptions, FileBytes, LoadOptions, SerializedFile};
use crate::meta::{ClassId, Component, PPtr};
use crate::objects::{AssetObject, GameObject};
use crate::report::{Event, Reporter, TracingReporter};
use crate::util::{Error, Result};

/// Where a pointer leads, before any object is decoded.
enum Target {
    Null,
    Object { file: usize, path_id: i64 },
    Dangling(DanglingReason),
}

/// Working set of loaded files.
///
/// Files are kept in load order. Pointers with a non-zero file index are
/// translated through the owning file's external table and matched against
/// loaded files by lower-cased file name.
pub struct AssetCollection {
    files: Vec<SerializedFile>,
    names: HashMap<String, usize>,
    generation: u64,
    options: LoadOptions,
    reporter: Arc<dyn Reporter>,
}

impl Default for AssetCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCollection {
    /// Empty collection with default load options, reporting through `tracing`.
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            files: Vec::new(),
            names: HashMap::new(),
            generation: 1,
            options,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Use `reporter` for every later load, resolve and encode.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.set_reporter(reporter);
        self
    }

    pub fn set_reporter(&mut self, reporter: Arc<dyn Reporter>) {
        for file in &mut self.files {
            file.set_reporter(reporter.clone());
        }
        self.reporter = reporter;
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a file with the collection's options.
    pub fn load(&mut self, name: impl Into<String>, bytes: impl Into<FileBytes>) -> Result<FileHandle> {
        let options = self.options.clone();
        self.load_with(name, bytes, &options)
    }

    /// Load a file. A name already present returns the existing handle
    /// without decoding `bytes`.
    pub fn load_with(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<FileBytes>,
        options: &LoadOptions,
    ) -> Result<FileHandle> {
        let name = name.into();
        let key = file_key(&name);
        if let Some(&index) = self.names.get(&key) {
            tracing::debug!(file = %name, "already loaded");
            return Ok(FileHandle::new(index, self.generation));
        }

        let mut file = match SerializedFile::decode(name.clone(), bytes, options, self.reporter.clone()) {
            Ok(file) => file,
            Err(e) => {
                self.reporter.event(&Event::LoadFailed { file: name, reason: e.to_string() });
                return Err(e);
            }
        };

        let handle = FileHandle::new(self.files.len(), self.generation);
        file.attach(handle);
        self.names.insert(key, self.files.len());
        self.files.push(file);
        tracing::info!(file = %name, objects = self.files[handle.index()].len(), "loaded");
        Ok(handle)
    }

    /// Load a file from disk, memory-mapped when the `mmap` feature is on.
    /// The file is named after its final path segment.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<FileHandle> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = match FileBytes::open(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.reporter.event(&Event::LoadFailed { file: name, reason: e.to_string() });
                return Err(e);
            }
        };
        self.load(name, bytes)
    }

    /// Load several files. A failing file is reported and skipped; the
    /// others still load. Results are in input order.
    pub fn load_many<I, N, B>(&mut self, files: I) -> Vec<Result<FileHandle>>
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<FileBytes>,
    {
        files
            .into_iter()
            .map(|(name, bytes)| self.load(name, bytes))
            .collect()
    }

    fn check(&self, handle: FileHandle) -> Result<usize> {
        if handle.generation() != self.generation || handle.index() >= self.files.len() {
            return Err(Error::Invalidated);
        }
        Ok(handle.index())
    }

    pub fn file(&self, handle: FileHandle) -> Result<&SerializedFile> {
        let index = self.check(handle)?;
        Ok(&self.files[index])
    }

    pub fn file_mut(&mut self, handle: FileHandle) -> Result<&mut SerializedFile> {
        let index = self.check(handle)?;
        Ok(&mut self.files[index])
    }

    /// Handle of a loaded file, matched like external references are.
    pub fn file_by_name(&self, name: &str) -> Option<FileHandle> {
        self.names
            .get(&file_key(name))
            .map(|&index| FileHandle::new(index, self.generation))
    }

    /// Handles of all files in load order.
    pub fn handles(&self) -> impl ExactSizeIterator<Item = FileHandle> + '_ {
        (0..self.files.len()).map(move |index| FileHandle::new(index, self.generation))
    }

    pub fn files(&self) -> impl ExactSizeIterator<Item = &SerializedFile> + '_ {
        self.files.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn target<T>(&self, ptr: &PPtr<T>, owner: usize) -> Target {
        if ptr.is_null() {
            return Target::Null;
        }
        let file = if ptr.file_index == 0 {
            owner
        } else {
            let Some(external) = self.files[owner].external(ptr.file_index) else {
                return Target::Dangling(DanglingReason::MissingExternal(ptr.file_index));
            };
            match self.names.get(&external.file_name()) {
                Some(&index) => index,
                None => return Target::Dangling(DanglingReason::MissingFile(external.path.clone())),
            }
        };
        if self.files[file].contains(ptr.path_id) {
            Target::Object { file, path_id: ptr.path_id }
        } else {
            Target::Dangling(DanglingReason::MissingObject {
                file: self.files[file].name().to_string(),
                path_id: ptr.path_id,
            })
        }
    }

    fn report_dangling<T>(&self, ptr: &PPtr<T>, owner: usize) {
        self.reporter.event(&Event::DanglingPointer {
            file: self.files[owner].name().to_string(),
            file_index: ptr.file_index,
            path_id: ptr.path_id,
        });
    }

    /// Resolve `ptr` as seen from the file `owner`.
    ///
    /// Null pointers give [`Resolved::Null`] for any file index. Missing
    /// targets give [`Resolved::Dangling`] and a
    /// [`DanglingPointer`](Event::DanglingPointer) event. The only error is
    /// a stale `owner` handle.
    pub fn try_resolve<T>(&self, ptr: &PPtr<T>, owner: FileHandle) -> Result<Resolved<'_>> {
        let owner = self.check(owner)?;
        Ok(match self.target(ptr, owner) {
            Target::Null => Resolved::Null,
            Target::Object { file, path_id } => match self.files[file].object(path_id) {
                Some(object) => Resolved::Found(object),
                None => Resolved::Dangling(DanglingReason::MissingObject {
                    file: self.files[file].name().to_string(),
                    path_id,
                }),
            },
            Target::Dangling(reason) => {
                self.report_dangling(ptr, owner);
                Resolved::Dangling(reason)
            }
        })
    }

    /// Resolve `ptr`; null and dangling pointers both give `None`.
    pub fn resolve<T>(&self, ptr: &PPtr<T>, owner: FileHandle) -> Result<Option<&dyn AssetObject>> {
        self.try_resolve(ptr, owner).map(Resolved::found)
    }

    /// Resolve `ptr` to a concrete kind; `None` also when the target is of another kind.
    pub fn resolve_as<U: AssetObject, T>(&self, ptr: &PPtr<T>, owner: FileHandle) -> Result<Option<&U>> {
        Ok(self.resolve(ptr, owner)?.and_then(|object| object.downcast_ref::<U>()))
    }

    /// Class id of the target from its file's directory, without decoding it.
    pub fn resolve_class_id<T>(&self, ptr: &PPtr<T>, owner: FileHandle) -> Result<Option<ClassId>> {
        let owner = self.check(owner)?;
        Ok(match self.target(ptr, owner) {
            Target::Object { file, path_id } => self.files[file].class_id_of(path_id),
            Target::Null | Target::Dangling(_) => None,
        })
    }

    /// Object of a loaded file by path id.
    pub fn object(&self, handle: FileHandle, path_id: i64) -> Result<Option<&dyn AssetObject>> {
        Ok(self.file(handle)?.object(path_id))
    }

    /// Every object of every file, in load order then directory order.
    /// Each call starts a fresh pass.
    pub fn all_objects(&self) -> impl Iterator<Item = &dyn AssetObject> + '_ {
        self.files.iter().flat_map(|file| file.objects())
    }

    /// Fill in unknown component class ids of every game object from the
    /// pointed-to objects' directory entries. Components whose pointer
    /// dangles stay unknown and are reported.
    ///
    /// Returns the number of component pairs updated.
    pub fn normalize_component_class_ids(&mut self) -> usize {
        let mut pending: Vec<(usize, i64, HashMap<PPtr<Component>, ClassId>)> = Vec::new();
        for (owner, file) in self.files.iter().enumerate() {
            let game_objects = file
                .entries()
                .filter(|entry| entry.class_id == ClassId::GAME_OBJECT)
                .map(|entry| entry.path_id);
            for path_id in game_objects {
                let Some(go) = file.object_as::<GameObject>(path_id) else {
                    continue;
                };
                let mut found = HashMap::new();
                for pair in go.components().iter().filter(|pair| pair.class_id.is_unknown()) {
                    match self.target(&pair.ptr, owner) {
                        Target::Object { file, path_id } => {
                            if let Some(class_id) = self.files[file].class_id_of(path_id) {
                                found.insert(pair.ptr, class_id);
                            }
                        }
                        Target::Dangling(_) => self.report_dangling(&pair.ptr, owner),
                        Target::Null => {}
                    }
                }
                if !found.is_empty() {
                    pending.push((owner, path_id, found));
                }
            }
        }

        let mut updated = 0;
        for (owner, path_id, found) in pending {
            let go = self.files[owner]
                .object_mut(path_id)
                .and_then(|object| object.downcast_mut::<GameObject>());
            if let Some(go) = go {
                updated += go.cache_class_ids(|ptr| found.get(ptr).copied());
            }
        }
        tracing::debug!(updated, "normalized component class ids");
        updated
    }

    /// Encode one file.
    pub fn encode(&self, handle: FileHandle, options: &EncodeOptions) -> Result<Vec<u8>> {
        self.file(handle)?.encode(options)
    }

    /// Drop every file. Handles issued before this call become invalid.
    pub fn reset(&mut self) {
        self.files.clear();
        self.names.clear();
        self.generation = self.generation.saturating_add(1);
    }

    /// Release all decoded state and storage. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.reset();
        self.files.shrink_to_fit();
        self.names.shrink_to_fit();
    }
}

impl fmt::Debug for AssetCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCollection")
            .field("files", &self.files)
            .field("generation", &self.generation)
            .finish()
    }
}
