//! One decoded container: header, metadata tables and lazily decoded objects.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use rayon::prelude::*;

use super::format::*;
use super::{
    EncodeOptions, FileBytes, FileHeader, FileIdentifier, LoadOptions, ObjectEntry,
    ScriptTypeRef, SerializedType,
};
use crate::collection::FileHandle;
use crate::io::{align_up, BinaryReader, BinaryWriter, Endian};
use crate::meta::{rule_for, ClassId, EngineVersion, LayoutRule};
use crate::objects::{AssetObject, ClassRegistry, DecodeContext, EncodeContext, ObjectInfo, RawObject};
use crate::report::{Event, Reporter, TracingReporter};
use crate::util::{Error, Result};

/// Smallest directory entry on disk (format 17..21).
const MIN_ENTRY_SIZE: usize = 20;

/// Smallest type table entry on disk (class id + hash).
const MIN_TYPE_SIZE: usize = 20;

struct ObjectSlot {
    entry: ObjectEntry,
    /// Absolute range of the original body; absent for objects added in memory.
    source: Option<Range<usize>>,
    object: OnceLock<Box<dyn AssetObject>>,
    /// Handed out through `object_mut`; the source bytes may be stale.
    edited: bool,
}

/// Everything an encode call writes for, decided once per call.
struct EncodePlan {
    target: EngineVersion,
    format: u32,
    rule: Option<&'static LayoutRule>,
    version: String,
    porting: bool,
}

/// One container file.
///
/// Objects decode on first access unless the file was loaded eagerly.
/// Decoding never fails per object: anything the registry cannot decode
/// cleanly is kept as a [`RawObject`] and reported.
pub struct SerializedFile {
    name: String,
    handle: FileHandle,
    header: FileHeader,
    version_string: String,
    version: Option<EngineVersion>,
    rule: Option<&'static LayoutRule>,
    target_platform: i32,
    type_trees: bool,
    types: Vec<SerializedType>,
    slots: Vec<ObjectSlot>,
    index: HashMap<i64, usize>,
    /// Directory order no longer matches the loaded data layout.
    reordered: bool,
    script_types: Vec<ScriptTypeRef>,
    externals: Vec<FileIdentifier>,
    ref_types: Vec<SerializedType>,
    user_information: String,
    bytes: FileBytes,
    parallel: bool,
    registry: Arc<ClassRegistry>,
    reporter: Arc<dyn Reporter>,
    decoded: AtomicUsize,
}

fn check_count(count: usize, min_size: usize, r: &BinaryReader<'_>, what: &str) -> Result<()> {
    if count > r.remaining() / min_size {
        return Err(Error::invalid(format!(
            "{} count {} exceeds metadata ({} bytes left)",
            what,
            count,
            r.remaining()
        )));
    }
    Ok(())
}

fn type_lookup(types: &[SerializedType], format: u32, type_id: i32) -> Option<(usize, ClassId)> {
    if format >= FORMAT_TYPE_INDEX {
        let index = usize::try_from(type_id).ok()?;
        types.get(index).map(|ty| (index, ty.class_id))
    } else {
        let index = types.iter().position(|ty| ty.class_id.0 == type_id)?;
        Some((index, types[index].class_id))
    }
}

impl SerializedFile {
    /// Decode a file with default options, reporting through `tracing`.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<FileBytes>) -> Result<Self> {
        Self::decode(name, bytes, &LoadOptions::default(), Arc::new(TracingReporter))
    }

    /// Decode header and metadata; objects follow lazily or eagerly per `options`.
    ///
    /// Fails for a truncated header, an unsupported container format, a
    /// metadata block that overruns the buffer, directory entries outside the
    /// buffer or the type table, and duplicate path ids.
    pub fn decode(
        name: impl Into<String>,
        bytes: impl Into<FileBytes>,
        options: &LoadOptions,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let name = name.into();
        let bytes = bytes.into();
        let _span = tracing::info_span!("decode", file = %name).entered();

        let header = FileHeader::read(&bytes)?;
        let format = header.format;
        let metadata_end = header.size() as u64 + header.metadata_size as u64;
        if metadata_end > bytes.len() as u64 {
            return Err(Error::invalid(format!(
                "metadata ends at {} past the {} byte buffer",
                metadata_end,
                bytes.len()
            )));
        }

        // Alignment inside metadata is relative to the file start.
        let mut r = BinaryReader::new(&bytes[..metadata_end as usize], header.endian);
        r.set_position(header.size())?;

        let version_string = r.read_cstring()?;
        let target_platform = r.read_i32()?;
        let type_trees = r.read_bool()?;

        let type_count = r.read_count()?;
        check_count(type_count, MIN_TYPE_SIZE, &r, "type")?;
        let types = (0..type_count)
            .map(|_| SerializedType::read(&mut r, format, type_trees, false))
            .collect::<Result<Vec<_>>>()?;

        let object_count = r.read_count()?;
        check_count(object_count, MIN_ENTRY_SIZE, &r, "object")?;
        let mut slots = Vec::with_capacity(object_count);
        let mut index = HashMap::with_capacity(object_count);
        for i in 0..object_count {
            let entry = ObjectEntry::read(&mut r, format, |id| type_lookup(&types, format, id))?;
            let range = entry
                .range(header.data_offset)
                .filter(|range| range.end <= bytes.len())
                .ok_or(Error::EntryOutOfRange {
                    path_id: entry.path_id,
                    start: header.data_offset.saturating_add(entry.byte_start),
                    size: entry.byte_size as u64,
                    len: bytes.len(),
                })?;
            if index.insert(entry.path_id, i).is_some() {
                return Err(Error::DuplicatePathId(entry.path_id));
            }
            slots.push(ObjectSlot { entry, source: Some(range), object: OnceLock::new(), edited: false });
        }

        let script_count = r.read_count()?;
        check_count(script_count, 12, &r, "script type")?;
        let script_types = (0..script_count)
            .map(|_| ScriptTypeRef::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        let external_count = r.read_count()?;
        check_count(external_count, 22, &r, "external")?;
        let externals = (0..external_count)
            .map(|_| FileIdentifier::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        let mut ref_types = Vec::new();
        if format >= FORMAT_REF_TYPES {
            let count = r.read_count()?;
            check_count(count, MIN_TYPE_SIZE, &r, "reference type")?;
            ref_types = (0..count)
                .map(|_| SerializedType::read(&mut r, format, type_trees, true))
                .collect::<Result<Vec<_>>>()?;
        }
        let user_information = r.read_cstring()?;

        let version = version_string.parse::<EngineVersion>().ok();
        let rule = version.as_ref().and_then(rule_for);
        if rule.is_none() {
            reporter.event(&Event::UnsupportedRevision {
                file: name.clone(),
                version: version_string.clone(),
            });
        }

        tracing::debug!(
            format,
            version = %version_string,
            objects = slots.len(),
            externals = externals.len(),
            "decoded metadata"
        );

        let file = Self {
            name,
            handle: FileHandle::DETACHED,
            header,
            version_string,
            version,
            rule,
            target_platform,
            type_trees,
            types,
            slots,
            index,
            reordered: false,
            script_types,
            externals,
            ref_types,
            user_information,
            bytes,
            parallel: options.parallel,
            registry: options.registry.clone(),
            reporter,
            decoded: AtomicUsize::new(0),
        };
        if options.eager {
            file.decode_all();
        }
        Ok(file)
    }

    /// Empty file for `version`, to be filled with [`add_object`](Self::add_object).
    pub fn new(name: impl Into<String>, version: EngineVersion, endian: Endian) -> Result<Self> {
        let rule = rule_for(&version).ok_or_else(|| Error::UnsupportedRevision(version.to_string()))?;
        let header = FileHeader {
            metadata_size: 0,
            file_size: 0,
            format: rule.format,
            data_offset: 0,
            endian,
            reserved: [0; 3],
            unknown: 0,
        };
        Ok(Self {
            name: name.into(),
            handle: FileHandle::DETACHED,
            header,
            version_string: version.to_string(),
            version: Some(version),
            rule: Some(rule),
            target_platform: 0,
            type_trees: false,
            types: Vec::new(),
            slots: Vec::new(),
            index: HashMap::new(),
            reordered: false,
            script_types: Vec::new(),
            externals: Vec::new(),
            ref_types: Vec::new(),
            user_information: String::new(),
            bytes: FileBytes::empty(),
            parallel: true,
            registry: ClassRegistry::shared(),
            reporter: Arc::new(TracingReporter),
            decoded: AtomicUsize::new(0),
        })
    }

    /// Append an object under `path_id`. The object's identity is rewritten
    /// to this file; its class id picks (or creates) the type table entry.
    pub fn add_object(&mut self, path_id: i64, mut object: Box<dyn AssetObject>) -> Result<()> {
        if self.index.contains_key(&path_id) {
            return Err(Error::DuplicatePathId(path_id));
        }
        let class_id = object.info().class_id;
        let type_index = match self.types.iter().position(|ty| ty.class_id == class_id) {
            Some(i) => i,
            None => {
                self.types.push(SerializedType::new(class_id));
                self.types.len() - 1
            }
        };
        *object.info_mut() = ObjectInfo::new(path_id, class_id, self.handle);

        let entry = ObjectEntry {
            path_id,
            byte_start: 0,
            byte_size: 0,
            type_index,
            class_id,
            script_type_index: -1,
            stripped: 0,
        };
        self.index.insert(path_id, self.slots.len());
        self.slots.push(ObjectSlot { entry, source: None, object: OnceLock::from(object), edited: false });
        Ok(())
    }

    /// Append an external reference; returns the pointer file index that refers to it.
    pub fn add_external(&mut self, external: FileIdentifier) -> i32 {
        self.externals.push(external);
        self.externals.len() as i32
    }

    /// Move the listed objects to the front, in the given order. The rest
    /// keep their relative order. Encoding follows the new order.
    pub fn reorder(&mut self, order: &[i64]) -> Result<()> {
        let mut seen = HashSet::with_capacity(order.len());
        for &path_id in order {
            if !self.index.contains_key(&path_id) {
                return Err(Error::ObjectNotFound(path_id));
            }
            if !seen.insert(path_id) {
                return Err(Error::DuplicatePathId(path_id));
            }
        }

        let mut slots: Vec<Option<ObjectSlot>> = std::mem::take(&mut self.slots).into_iter().map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for path_id in order {
            if let Some(slot) = slots[self.index[path_id]].take() {
                reordered.push(slot);
            }
        }
        reordered.extend(slots.into_iter().flatten());

        self.index = reordered
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.entry.path_id, i))
            .collect();
        self.slots = reordered;
        self.reordered = true;
        Ok(())
    }

    /// Bind this file to a collection slot, updating already decoded objects.
    pub(crate) fn attach(&mut self, handle: FileHandle) {
        self.handle = handle;
        for slot in &mut self.slots {
            if let Some(object) = slot.object.get_mut() {
                object.info_mut().file = handle;
            }
        }
    }

    /// Replace the sink used for decode and encode events.
    pub fn set_reporter(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporter = reporter;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection slot of this file, or [`FileHandle::DETACHED`].
    #[inline]
    pub fn handle(&self) -> FileHandle {
        self.handle
    }

    #[inline]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    #[inline]
    pub fn format(&self) -> u32 {
        self.header.format
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    /// Declared engine revision, when it parses.
    #[inline]
    pub fn version(&self) -> Option<EngineVersion> {
        self.version
    }

    /// Declared engine revision exactly as stored.
    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    /// Layout rule of the declared revision; `None` means every object is raw.
    #[inline]
    pub fn rule(&self) -> Option<&'static LayoutRule> {
        self.rule
    }

    pub fn target_platform(&self) -> i32 {
        self.target_platform
    }

    pub fn has_type_trees(&self) -> bool {
        self.type_trees
    }

    pub fn types(&self) -> &[SerializedType] {
        &self.types
    }

    pub fn script_types(&self) -> &[ScriptTypeRef] {
        &self.script_types
    }

    pub fn externals(&self) -> &[FileIdentifier] {
        &self.externals
    }

    /// External entry a pointer `file_index` refers to (`file_index - 1`).
    pub fn external(&self, file_index: i32) -> Option<&FileIdentifier> {
        let i = usize::try_from(file_index.checked_sub(1)?).ok()?;
        self.externals.get(i)
    }

    pub fn ref_types(&self) -> &[SerializedType] {
        &self.ref_types
    }

    pub fn user_information(&self) -> &str {
        &self.user_information
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Number of objects in the directory.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Path ids in directory order.
    pub fn path_ids(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        self.slots.iter().map(|slot| slot.entry.path_id)
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ObjectEntry> + '_ {
        self.slots.iter().map(|slot| &slot.entry)
    }

    pub fn entry(&self, path_id: i64) -> Option<&ObjectEntry> {
        self.index.get(&path_id).map(|&i| &self.slots[i].entry)
    }

    #[inline]
    pub fn contains(&self, path_id: i64) -> bool {
        self.index.contains_key(&path_id)
    }

    /// Class id from the directory, without decoding the object.
    pub fn class_id_of(&self, path_id: i64) -> Option<ClassId> {
        self.entry(path_id).map(|entry| entry.class_id)
    }

    /// Original bytes of an object as loaded.
    pub fn source_bytes(&self, path_id: i64) -> Option<&[u8]> {
        let slot = &self.slots[*self.index.get(&path_id)?];
        slot.source.clone().map(|range| &self.bytes[range])
    }

    /// Object by path id, decoding it on first access.
    pub fn object(&self, path_id: i64) -> Option<&dyn AssetObject> {
        let slot = &self.slots[*self.index.get(&path_id)?];
        Some(self.slot_object(slot))
    }

    /// Mutable object by path id. The object is re-encoded from then on
    /// instead of copying its loaded bytes.
    pub fn object_mut(&mut self, path_id: i64) -> Option<&mut dyn AssetObject> {
        let i = *self.index.get(&path_id)?;
        self.slot_object(&self.slots[i]);
        let slot = &mut self.slots[i];
        slot.edited = true;
        let object: &mut dyn AssetObject = slot.object.get_mut()?.as_mut();
        Some(object)
    }

    /// Typed view of an object; `None` if absent or of another kind.
    pub fn object_as<T: AssetObject>(&self, path_id: i64) -> Option<&T> {
        self.object(path_id)?.downcast_ref::<T>()
    }

    /// Every object in directory order, decoding as it goes.
    pub fn objects(&self) -> impl ExactSizeIterator<Item = &dyn AssetObject> + '_ {
        self.slots.iter().map(move |slot| self.slot_object(slot))
    }

    /// Whether the object has been decoded yet.
    pub fn is_decoded(&self, path_id: i64) -> bool {
        self.index
            .get(&path_id)
            .is_some_and(|&i| self.slots[i].object.get().is_some())
    }

    /// Decode every object not yet decoded, in parallel when the file was
    /// loaded with `parallel`.
    pub fn decode_all(&self) {
        if self.parallel {
            self.slots.par_iter().for_each(|slot| {
                self.slot_object(slot);
            });
        } else {
            for slot in &self.slots {
                self.slot_object(slot);
            }
        }
    }

    fn slot_object<'a>(&'a self, slot: &'a ObjectSlot) -> &'a dyn AssetObject {
        slot.object.get_or_init(|| self.decode_slot(slot)).as_ref()
    }

    fn decode_slot(&self, slot: &ObjectSlot) -> Box<dyn AssetObject> {
        let entry = &slot.entry;
        let info = ObjectInfo::new(entry.path_id, entry.class_id, self.handle);
        let data = slot.source.clone().map_or(&[][..], |range| &self.bytes[range]);

        let object = match self.rule {
            None => Box::new(RawObject::from_bytes(info, data)) as Box<dyn AssetObject>,
            Some(rule) => self.decode_typed(info, data, rule),
        };

        let done = self.decoded.fetch_add(1, Ordering::Relaxed) + 1;
        self.reporter.progress(&self.name, done, self.slots.len());
        object
    }

    fn decode_typed(&self, info: ObjectInfo, data: &[u8], rule: &'static LayoutRule) -> Box<dyn AssetObject> {
        let ctx = DecodeContext { file: self, rule };
        let mut reader = BinaryReader::new(data, self.endian());
        let reason = match self.registry.decode(&mut reader, info, &ctx) {
            None => {
                self.reporter.event(&Event::UnknownClass {
                    file: self.name.clone(),
                    path_id: info.path_id,
                    class_id: info.class_id,
                });
                return Box::new(RawObject::from_bytes(info, data));
            }
            Some(Ok(object)) if reader.remaining() == 0 => return object,
            Some(Ok(_)) => format!("decoder consumed {} of {} bytes", reader.position(), data.len()),
            Some(Err(e)) => e.to_string(),
        };
        self.reporter.event(&Event::DecodeFailed {
            file: self.name.clone(),
            path_id: info.path_id,
            class_id: info.class_id,
            reason,
        });
        Box::new(RawObject::from_bytes(info, data))
    }

    fn plan(&self, options: &EncodeOptions) -> Result<EncodePlan> {
        match options.target {
            Some(target) if self.version != Some(target) => {
                let rule = rule_for(&target).ok_or_else(|| Error::UnsupportedRevision(target.to_string()))?;
                Ok(EncodePlan {
                    target,
                    format: rule.format,
                    rule: Some(rule),
                    version: target.to_string(),
                    porting: true,
                })
            }
            _ => Ok(EncodePlan {
                // Unparsable revisions only hold raw objects, which ignore the target.
                target: self.version.unwrap_or(EngineVersion::new(0, 0, 0)),
                format: self.header.format,
                rule: self.rule,
                version: self.version_string.clone(),
                porting: false,
            }),
        }
    }

    fn warn(&self, path_id: i64, message: String) {
        self.reporter.event(&Event::EncodeWarning { file: self.name.clone(), path_id, message });
    }

    /// Body of one object for `plan`. Unedited objects keep their loaded
    /// bytes unless the file is being ported.
    fn encode_slot<'a>(&'a self, slot: &'a ObjectSlot, plan: &EncodePlan) -> Result<Cow<'a, [u8]>> {
        let source = slot.source.clone().map(|range| &self.bytes[range]);
        if !plan.porting && !slot.edited {
            if let Some(bytes) = source {
                return Ok(Cow::Borrowed(bytes));
            }
        }

        let object = self.slot_object(slot);
        let mut body = BinaryWriter::new(self.endian());
        let mut ctx = EncodeContext::new(self, plan.target, plan.format, plan.rule).with_porting(plan.porting);
        let result = object.encode(&mut body, &mut ctx);
        for message in ctx.take_warnings() {
            self.warn(slot.entry.path_id, message);
        }

        match (result, source) {
            (Ok(()), _) => Ok(Cow::Owned(body.into_inner())),
            (Err(e), Some(bytes)) => {
                self.warn(slot.entry.path_id, format!("encode failed ({}), original bytes kept", e));
                Ok(Cow::Borrowed(bytes))
            }
            (Err(e), None) => Err(e),
        }
    }

    /// Loaded data region with `bodies` written over their original ranges.
    ///
    /// Only possible when the directory order is untouched and every body
    /// still has its loaded size. Gaps between objects and trailing bytes
    /// come along unchanged.
    fn retained_data(&self, bodies: &[Cow<'_, [u8]>]) -> Option<Vec<u8>> {
        if self.reordered {
            return None;
        }
        let start = usize::try_from(self.header.data_offset).ok()?;
        let mut end = usize::try_from(self.header.file_size).ok()?.min(self.bytes.len());
        for slot in &self.slots {
            end = end.max(slot.source.as_ref()?.end);
        }

        let mut data = self.bytes.get(start..end)?.to_vec();
        for (slot, body) in self.slots.iter().zip(bodies) {
            let range = slot.source.clone()?;
            if range.len() != body.len() {
                return None;
            }
            data[range.start - start..range.end - start].copy_from_slice(body);
        }
        Some(data)
    }

    /// Serialize the whole file.
    ///
    /// With no target, or the declared one, the retained format and version
    /// string are written back, so an unmodified file reproduces its input.
    /// Otherwise the target's layout rule decides the container format and
    /// object layouts.
    pub fn encode(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        let _span = tracing::info_span!("encode", file = %self.name).entered();
        let plan = self.plan(options)?;
        let format = plan.format;

        let bodies = self
            .slots
            .iter()
            .map(|slot| self.encode_slot(slot, &plan))
            .collect::<Result<Vec<_>>>()?;

        let retained = if plan.porting { None } else { self.retained_data(&bodies) };
        let kept_layout = retained.is_some();
        let (data, entries) = match retained {
            Some(data) => (data, self.slots.iter().map(|slot| slot.entry.clone()).collect::<Vec<_>>()),
            None => {
                let mut data = BinaryWriter::new(self.endian());
                let mut entries = Vec::with_capacity(self.slots.len());
                for (slot, body) in self.slots.iter().zip(&bodies) {
                    data.align_to(OBJECT_ALIGNMENT as usize);
                    let mut entry = slot.entry.clone();
                    entry.byte_start = data.position() as u64;
                    entry.byte_size = u32::try_from(body.len())
                        .map_err(|_| Error::other(format!("object {} is {} bytes", entry.path_id, body.len())))?;
                    data.write_bytes(body);
                    entries.push(entry);
                }
                (data.into_inner(), entries)
            }
        };

        let size = header_size(format);
        let mut meta = BinaryWriter::with_capacity(self.endian(), size + 256);
        meta.pad_to(size);
        meta.write_cstring(&plan.version);
        meta.write_i32(self.target_platform);
        meta.write_bool(self.type_trees);

        let mut table_warnings = Vec::new();
        meta.write_count(self.types.len())?;
        for ty in &self.types {
            table_warnings.extend(ty.write(&mut meta, format, self.type_trees, false)?);
        }

        meta.write_count(entries.len())?;
        for entry in &entries {
            let type_id = if format >= FORMAT_TYPE_INDEX {
                entry.type_index as i32
            } else {
                self.types
                    .get(entry.type_index)
                    .map(|ty| ty.class_id.0)
                    .ok_or_else(|| Error::invalid(format!("object {} has no type", entry.path_id)))?
            };
            entry.write(&mut meta, format, type_id)?;
        }

        meta.write_count(self.script_types.len())?;
        for script in &self.script_types {
            script.write(&mut meta);
        }

        meta.write_count(self.externals.len())?;
        for external in &self.externals {
            external.write(&mut meta);
        }

        if format >= FORMAT_REF_TYPES {
            meta.write_count(self.ref_types.len())?;
            for ty in &self.ref_types {
                table_warnings.extend(ty.write(&mut meta, format, self.type_trees, true)?);
            }
        } else if !self.ref_types.is_empty() {
            table_warnings.push(format!("{} reference types dropped", self.ref_types.len()));
        }
        meta.write_cstring(&self.user_information);

        for message in table_warnings {
            self.warn(0, message);
        }

        let metadata_end = meta.position() as u64;
        let data_offset = if self.header.data_offset >= metadata_end {
            self.header.data_offset
        } else {
            align_up(metadata_end, DATA_ALIGNMENT)
        };
        let header = FileHeader {
            metadata_size: u32::try_from(metadata_end - size as u64)
                .map_err(|_| Error::other("metadata exceeds 4 GiB"))?,
            file_size: data_offset + data.len() as u64,
            format,
            data_offset,
            endian: self.endian(),
            reserved: self.header.reserved,
            unknown: self.header.unknown,
        };
        let mut head = BinaryWriter::with_capacity(Endian::Big, size);
        header.write(&mut head)?;

        let mut out = meta.into_inner();
        out[..size].copy_from_slice(head.as_bytes());
        let original_end = self.header.size() as u64 + self.header.metadata_size as u64;
        let gap = (self.header.data_offset == data_offset && original_end == metadata_end)
            .then(|| self.bytes.get(metadata_end as usize..data_offset as usize))
            .flatten();
        match gap {
            Some(gap) if kept_layout => out.extend_from_slice(gap),
            _ => out.resize(data_offset as usize, 0),
        }
        out.extend_from_slice(&data);

        tracing::debug!(format, objects = entries.len(), bytes = out.len(), "encoded");
        Ok(out)
    }
}

impl fmt::Debug for SerializedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedFile")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("format", &self.header.format)
            .field("version", &self.version_string)
            .field("endian", &self.header.endian)
            .field("objects", &self.slots.len())
            .field("externals", &self.externals.len())
            .finish()
    }
}
