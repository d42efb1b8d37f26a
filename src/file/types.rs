//! Type table entries and their optional type trees.

use super::format::*;
use crate::io::{BinaryReader, BinaryWriter};
use crate::meta::ClassId;
use crate::util::{Error, Result};

/// One node of a flattened type tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeTreeNode {
    pub version: u16,
    pub level: u8,
    pub type_flags: u8,
    pub type_str_offset: u32,
    pub name_str_offset: u32,
    pub byte_size: i32,
    pub index: i32,
    pub meta_flag: u32,
    pub ref_type_hash: u64,
}

/// Flattened field layout description stored alongside a type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeTree {
    pub nodes: Vec<TypeTreeNode>,
    /// Local string table referenced by node offsets.
    pub strings: Vec<u8>,
}

/// Offsets with the high bit set point into the engine's built-in string table.
const COMMON_STRING_FLAG: u32 = 0x8000_0000;

impl TypeTree {
    fn read(r: &mut BinaryReader<'_>, format: u32) -> Result<Self> {
        let node_count = r.read_count()?;
        let string_size = r.read_count()?;
        let node_size = type_tree_node_size(format);
        if node_count > r.remaining() / node_size {
            return Err(Error::invalid(format!("type tree node count {}", node_count)));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let mut node = TypeTreeNode {
                version: r.read_u16()?,
                level: r.read_u8()?,
                type_flags: r.read_u8()?,
                type_str_offset: r.read_u32()?,
                name_str_offset: r.read_u32()?,
                byte_size: r.read_i32()?,
                index: r.read_i32()?,
                meta_flag: r.read_u32()?,
                ref_type_hash: 0,
            };
            if format >= FORMAT_REF_TYPE_HASH {
                node.ref_type_hash = r.read_u64()?;
            }
            nodes.push(node);
        }
        let strings = r.read_bytes(string_size)?.to_vec();
        Ok(Self { nodes, strings })
    }

    fn write(&self, w: &mut BinaryWriter, format: u32) -> Result<()> {
        w.write_count(self.nodes.len())?;
        w.write_count(self.strings.len())?;
        for node in &self.nodes {
            w.write_u16(node.version);
            w.write_u8(node.level);
            w.write_u8(node.type_flags);
            w.write_u32(node.type_str_offset);
            w.write_u32(node.name_str_offset);
            w.write_i32(node.byte_size);
            w.write_i32(node.index);
            w.write_u32(node.meta_flag);
            if format >= FORMAT_REF_TYPE_HASH {
                w.write_u64(node.ref_type_hash);
            }
        }
        w.write_bytes(&self.strings);
        Ok(())
    }

    fn local_string(&self, offset: u32) -> Option<&str> {
        if offset & COMMON_STRING_FLAG != 0 {
            return None;
        }
        let rest = self.strings.get(offset as usize..)?;
        let end = rest.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&rest[..end]).ok()
    }

    /// Type name of a node from the local string table.
    pub fn type_name(&self, node: &TypeTreeNode) -> Option<&str> {
        self.local_string(node.type_str_offset)
    }

    /// Field name of a node from the local string table.
    pub fn field_name(&self, node: &TypeTreeNode) -> Option<&str> {
        self.local_string(node.name_str_offset)
    }

    /// Whether any node refers to reference type hashes.
    fn uses_ref_hashes(&self) -> bool {
        self.nodes.iter().any(|n| n.ref_type_hash != 0)
    }
}

/// Names that identify a managed reference type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefTypeName {
    pub class_name: String,
    pub namespace: String,
    pub assembly: String,
}

/// Entry of the type table (or the reference type table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedType {
    pub class_id: ClassId,
    pub is_stripped: bool,
    pub script_type_index: i16,
    pub script_id: Option<[u8; 16]>,
    pub old_type_hash: [u8; 16],
    pub tree: Option<TypeTree>,
    pub dependencies: Vec<i32>,
    pub ref_name: Option<RefTypeName>,
}

impl SerializedType {
    /// Type without hashes or tree, as created when assembling a file.
    pub fn new(class_id: ClassId) -> Self {
        Self {
            class_id,
            is_stripped: false,
            script_type_index: -1,
            script_id: None,
            old_type_hash: [0; 16],
            tree: None,
            dependencies: Vec::new(),
            ref_name: None,
        }
    }

    fn has_script_id(class_id: ClassId, script_type_index: i16, format: u32, is_ref: bool) -> bool {
        (is_ref && script_type_index >= 0)
            || (format < FORMAT_TYPE_INDEX && class_id.0 < 0)
            || (format >= FORMAT_TYPE_INDEX && class_id.0 == SCRIPT_CLASS_ID)
    }

    pub(crate) fn read(
        r: &mut BinaryReader<'_>,
        format: u32,
        type_trees: bool,
        is_ref: bool,
    ) -> Result<Self> {
        let class_id = ClassId(r.read_i32()?);
        let is_stripped = if format >= FORMAT_TYPE_INDEX { r.read_u8()? != 0 } else { false };
        let script_type_index = if format >= FORMAT_SCRIPT_TYPE_INDEX { r.read_i16()? } else { -1 };

        let script_id = if Self::has_script_id(class_id, script_type_index, format, is_ref) {
            Some(r.read_array::<16>()?)
        } else {
            None
        };
        let old_type_hash = r.read_array::<16>()?;

        let mut ty = Self {
            class_id,
            is_stripped,
            script_type_index,
            script_id,
            old_type_hash,
            tree: None,
            dependencies: Vec::new(),
            ref_name: None,
        };

        if type_trees {
            ty.tree = Some(TypeTree::read(r, format)?);
            if format >= FORMAT_TYPE_DEPENDENCIES {
                if is_ref {
                    ty.ref_name = Some(RefTypeName {
                        class_name: r.read_cstring()?,
                        namespace: r.read_cstring()?,
                        assembly: r.read_cstring()?,
                    });
                } else {
                    let count = r.read_count()?;
                    if count > r.remaining() / 4 {
                        return Err(Error::invalid(format!("type dependency count {}", count)));
                    }
                    ty.dependencies = (0..count).map(|_| r.read_i32()).collect::<Result<_>>()?;
                }
            }
        }
        Ok(ty)
    }

    /// Write for `format`. Fields the format cannot hold are dropped and
    /// described in the returned warnings.
    pub(crate) fn write(
        &self,
        w: &mut BinaryWriter,
        format: u32,
        type_trees: bool,
        is_ref: bool,
    ) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        w.write_i32(self.class_id.0);
        if format >= FORMAT_TYPE_INDEX {
            w.write_bool(self.is_stripped);
        }
        if format >= FORMAT_SCRIPT_TYPE_INDEX {
            w.write_i16(self.script_type_index);
        }
        if Self::has_script_id(self.class_id, self.script_type_index, format, is_ref) {
            w.write_bytes(&self.script_id.unwrap_or_default());
        }
        w.write_bytes(&self.old_type_hash);

        if type_trees {
            let tree = self.tree.clone().unwrap_or_default();
            if format < FORMAT_REF_TYPE_HASH && tree.uses_ref_hashes() {
                warnings.push(format!("{}: reference type hashes dropped", self.class_id));
            }
            tree.write(w, format)?;
            if format >= FORMAT_TYPE_DEPENDENCIES {
                if is_ref {
                    let name = self.ref_name.clone().unwrap_or_default();
                    w.write_cstring(&name.class_name);
                    w.write_cstring(&name.namespace);
                    w.write_cstring(&name.assembly);
                } else {
                    w.write_count(self.dependencies.len())?;
                    for &dep in &self.dependencies {
                        w.write_i32(dep);
                    }
                }
            } else if !self.dependencies.is_empty() || self.ref_name.is_some() {
                warnings.push(format!("{}: type dependencies dropped", self.class_id));
            }
        } else if self.tree.is_some() {
            warnings.push(format!("{}: type tree dropped", self.class_id));
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Endian;

    fn tree() -> TypeTree {
        TypeTree {
            nodes: vec![
                TypeTreeNode { level: 0, type_str_offset: 0, name_str_offset: 5, byte_size: -1, ..Default::default() },
                TypeTreeNode { level: 1, type_str_offset: 0x8000_0010, name_str_offset: 10, byte_size: 4, index: 1, ..Default::default() },
            ],
            strings: b"Base\0Base\0m_Value\0".to_vec(),
        }
    }

    #[test]
    fn test_type_with_tree_roundtrip() {
        for format in [15, 17, 19, 21] {
            let mut ty = SerializedType::new(ClassId::MONO_BEHAVIOUR);
            ty.script_type_index = 0;
            ty.script_id = Some([7; 16]);
            ty.old_type_hash = [9; 16];
            ty.tree = Some(tree());
            if format >= FORMAT_TYPE_DEPENDENCIES {
                ty.dependencies = vec![3, 4];
            }
            if format < FORMAT_SCRIPT_TYPE_INDEX {
                ty.script_type_index = -1;
            }
            if format < FORMAT_TYPE_INDEX {
                // Old formats only store script hashes for negative ids.
                ty.script_id = None;
            }

            let mut w = BinaryWriter::new(Endian::Little);
            assert!(ty.write(&mut w, format, true, false).unwrap().is_empty());
            let bytes = w.into_inner();
            let mut r = BinaryReader::new(&bytes, Endian::Little);
            let back = SerializedType::read(&mut r, format, true, false).unwrap();
            assert_eq!(back, ty, "format {}", format);
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn test_ref_type_names() {
        let mut ty = SerializedType::new(ClassId(0));
        ty.script_type_index = 2;
        ty.script_id = Some([1; 16]);
        ty.tree = Some(TypeTree::default());
        ty.ref_name = Some(RefTypeName {
            class_name: "Item".into(),
            namespace: "Game".into(),
            assembly: "Assembly-CSharp".into(),
        });
        let mut w = BinaryWriter::new(Endian::Big);
        ty.write(&mut w, 21, true, true).unwrap();
        let bytes = w.into_inner();
        let back = SerializedType::read(&mut BinaryReader::new(&bytes, Endian::Big), 21, true, true).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn test_tree_names() {
        let t = tree();
        assert_eq!(t.type_name(&t.nodes[0]), Some("Base"));
        assert_eq!(t.field_name(&t.nodes[1]), Some("m_Value"));
        assert_eq!(t.type_name(&t.nodes[1]), None);
    }

    #[test]
    fn test_downgrade_reports_dropped_fields() {
        let mut ty = SerializedType::new(ClassId::TRANSFORM);
        ty.tree = Some(tree());
        ty.dependencies = vec![1];
        let mut w = BinaryWriter::new(Endian::Little);
        let warnings = ty.write(&mut w, 17, true, false).unwrap();
        assert_eq!(warnings.len(), 1);
    }
}
