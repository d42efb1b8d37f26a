//! Object directory, script type references and external file table.

use super::format::*;
use crate::io::{BinaryReader, BinaryWriter};
use crate::meta::ClassId;
use crate::util::{Error, Result};

/// One directory entry: where an object's bytes live and what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub path_id: i64,
    /// Offset relative to the data region.
    pub byte_start: u64,
    pub byte_size: u32,
    /// Index into the file's type table.
    pub type_index: usize,
    pub class_id: ClassId,
    /// Only stored by formats before 17.
    pub script_type_index: i16,
    /// Only stored by formats 15 and 16.
    pub stripped: u8,
}

impl ObjectEntry {
    /// Absolute byte range inside a file whose data region starts at `data_offset`.
    pub fn range(&self, data_offset: u64) -> Option<std::ops::Range<usize>> {
        let start = data_offset.checked_add(self.byte_start)?;
        let end = start.checked_add(self.byte_size as u64)?;
        Some(usize::try_from(start).ok()?..usize::try_from(end).ok()?)
    }

    pub(crate) fn read(
        r: &mut BinaryReader<'_>,
        format: u32,
        type_class: impl Fn(i32) -> Option<(usize, ClassId)>,
    ) -> Result<Self> {
        r.align()?;
        let path_id = r.read_i64()?;
        let byte_start = if format >= FORMAT_LARGE_FILES {
            let start = r.read_i64()?;
            u64::try_from(start)
                .map_err(|_| Error::invalid(format!("object {} starts at {}", path_id, start)))?
        } else {
            r.read_u32()? as u64
        };
        let byte_size = r.read_u32()?;
        let type_id = r.read_i32()?;

        let mut class_id = None;
        if format < FORMAT_TYPE_INDEX {
            class_id = Some(ClassId(r.read_u16()? as i32));
        }
        let script_type_index = if format < FORMAT_SCRIPT_TYPE_INDEX { r.read_i16()? } else { -1 };
        let stripped = if format == 15 || format == 16 { r.read_u8()? } else { 0 };

        let (type_index, type_class_id) = type_class(type_id).ok_or_else(|| {
            Error::invalid(format!("object {} has type id {} outside the type table", path_id, type_id))
        })?;

        Ok(Self {
            path_id,
            byte_start,
            byte_size,
            type_index,
            class_id: class_id.unwrap_or(type_class_id),
            script_type_index,
            stripped,
        })
    }

    /// `type_id` is the value stored for this entry's type: the table index
    /// from format 16, the type's class id before that.
    pub(crate) fn write(&self, w: &mut BinaryWriter, format: u32, type_id: i32) -> Result<()> {
        w.align();
        w.write_i64(self.path_id);
        if format >= FORMAT_LARGE_FILES {
            w.write_i64(self.byte_start as i64);
        } else {
            let start = u32::try_from(self.byte_start).map_err(|_| {
                Error::other(format!("object {} offset {} does not fit format {}", self.path_id, self.byte_start, format))
            })?;
            w.write_u32(start);
        }
        w.write_u32(self.byte_size);
        w.write_i32(type_id);
        if format < FORMAT_TYPE_INDEX {
            w.write_u16(self.class_id.0 as u16);
        }
        if format < FORMAT_SCRIPT_TYPE_INDEX {
            w.write_i16(self.script_type_index);
        }
        if format == 15 || format == 16 {
            w.write_u8(self.stripped);
        }
        Ok(())
    }
}

/// Reference to a script object, possibly in another file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptTypeRef {
    pub file_index: i32,
    pub path_id: i64,
}

impl ScriptTypeRef {
    pub(crate) fn read(r: &mut BinaryReader<'_>) -> Result<Self> {
        let file_index = r.read_i32()?;
        r.align()?;
        let path_id = r.read_i64()?;
        Ok(Self { file_index, path_id })
    }

    pub(crate) fn write(&self, w: &mut BinaryWriter) {
        w.write_i32(self.file_index);
        w.align();
        w.write_i64(self.path_id);
    }
}

/// Entry of the external file table. Pointers with `file_index = n`
/// refer to entry `n - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileIdentifier {
    pub temp_empty: String,
    pub guid: [u8; 16],
    pub kind: i32,
    pub path: String,
}

impl FileIdentifier {
    /// External reference by path only.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Final path segment, lower-cased. This is the key loaded files are
    /// matched against.
    pub fn file_name(&self) -> String {
        file_key(&self.path)
    }

    pub(crate) fn read(r: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            temp_empty: r.read_cstring()?,
            guid: r.read_array::<16>()?,
            kind: r.read_i32()?,
            path: r.read_cstring()?,
        })
    }

    pub(crate) fn write(&self, w: &mut BinaryWriter) {
        w.write_cstring(&self.temp_empty);
        w.write_bytes(&self.guid);
        w.write_i32(self.kind);
        w.write_cstring(&self.path);
    }
}

/// Lower-cased final segment of a `/` or `\` separated path.
pub fn file_key(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;

    fn entry() -> ObjectEntry {
        ObjectEntry {
            path_id: -3,
            byte_start: 64,
            byte_size: 28,
            type_index: 1,
            class_id: ClassId::TRANSFORM,
            script_type_index: -1,
            stripped: 0,
        }
    }

    #[test]
    fn test_entry_roundtrip_by_format() {
        let lookup_index = |id: i32| (id == 1).then_some((1, ClassId::TRANSFORM));
        let lookup_class = |id: i32| (id == 4).then_some((1, ClassId::TRANSFORM));

        for format in [14, 15, 16, 17, 22] {
            let e = entry();
            let type_id = if format >= FORMAT_TYPE_INDEX { 1 } else { 4 };
            let mut w = BinaryWriter::new(Endian::Little);
            w.write_u8(0xAA);
            e.write(&mut w, format, type_id).unwrap();
            let bytes = w.into_inner();
            assert_eq!(bytes[1..4], [0; 3], "path id aligned to 4 from buffer start");

            let mut r = BinaryReader::new(&bytes, Endian::Little);
            r.read_u8().unwrap();
            let back = if format >= FORMAT_TYPE_INDEX {
                ObjectEntry::read(&mut r, format, lookup_index).unwrap()
            } else {
                ObjectEntry::read(&mut r, format, lookup_class).unwrap()
            };
            assert_eq!(back, e, "format {}", format);
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn test_entry_unknown_type_fails() {
        let mut w = BinaryWriter::new(Endian::Big);
        entry().write(&mut w, 17, 9).unwrap();
        let bytes = w.into_inner();
        let mut r = BinaryReader::new(&bytes, Endian::Big);
        assert!(matches!(
            ObjectEntry::read(&mut r, 17, |_| None),
            Err(Error::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_narrow_offset_overflow() {
        let mut e = entry();
        e.byte_start = u32::MAX as u64 + 1;
        let mut w = BinaryWriter::new(Endian::Little);
        assert!(e.write(&mut w, 21, 0).is_err());
        assert!(e.write(&mut w, 22, 0).is_ok());
    }

    #[test]
    fn test_range() {
        assert_eq!(entry().range(100), Some(164..192));
        let mut e = entry();
        e.byte_start = u64::MAX;
        assert_eq!(e.range(1), None);
    }

    #[test]
    fn test_external_and_script_refs() {
        let ext = FileIdentifier {
            temp_empty: String::new(),
            guid: [3; 16],
            kind: 2,
            path: "Library/Shared/Level1.assets".into(),
        };
        let script = ScriptTypeRef { file_index: 1, path_id: 11500000 };

        let mut w = BinaryWriter::new(Endian::Little);
        ext.write(&mut w);
        script.write(&mut w);
        let bytes = w.into_inner();
        let mut r = BinaryReader::new(&bytes, Endian::Little);
        assert_eq!(FileIdentifier::read(&mut r).unwrap(), ext);
        assert_eq!(ScriptTypeRef::read(&mut r).unwrap(), script);
        assert_eq!(ext.file_name(), "level1.assets");
    }

    #[test]
    fn test_file_key() {
        assert_eq!(file_key("archive:/CAB-abc/CAB-ABC"), "cab-abc");
        assert_eq!(file_key("C:\\Data\\sharedassets0.assets"), "sharedassets0.assets");
        assert_eq!(file_key("plain"), "plain");
    }
}
