//! Shared fixtures for integration tests.

#![allow(dead_code)]

use assetgraph::prelude::*;

/// Data region start used by hand-built files. Far past the metadata so the
/// encoder has to keep it rather than recompute it.
pub const HAND_BUILT_DATA_OFFSET: usize = 4096;

/// Engine revision string matching each container format.
pub fn version_for_format(format: u32) -> &'static str {
    match format {
        17 => "2017.4.40f1",
        19 => "2019.2.21f1",
        20 => "2019.3.0a8",
        21 => "2019.4.31f1",
        22 => "2022.3.5f1",
        _ => panic!("no fixture revision for format {}", format),
    }
}

/// Scene built through the public API:
///
/// - 100: game object "Hero" with components 101 (transform) and 102 (text)
/// - 101: transform owned by 100, with a child pointer into the first external
/// - 102: text asset "notes"
/// - 103: object of class 77, which has no decoder
pub fn scene(name: &str, version: EngineVersion, endian: Endian) -> SerializedFile {
    let mut file = SerializedFile::new(name, version, endian).unwrap();
    file.add_external(FileIdentifier::new("Library/shared.assets"));

    let mut go = GameObject::new("Hero");
    go.add_component(ClassId::TRANSFORM, PPtr::local(101))
        .add_component(ClassId::TEXT_ASSET, PPtr::local(102));
    file.add_object(100, Box::new(go)).unwrap();

    let mut transform = Transform::new();
    transform.game_object = PPtr::local(100);
    transform.children.push(PPtr::new(1, 7));
    file.add_object(101, Box::new(transform)).unwrap();

    file.add_object(102, Box::new(TextAsset::new("notes", "line one\nline two"))).unwrap();
    file.add_object(103, Box::new(RawObject::new(ClassId(77), vec![9, 8, 7, 6, 5, 4, 3]))).unwrap();
    file
}

pub fn scene_bytes(name: &str, version: EngineVersion, endian: Endian) -> Vec<u8> {
    scene(name, version, endian).encode(&EncodeOptions::default()).unwrap()
}

/// File holding one raw mesh filter at path id 7, the target of the
/// scene's external pointer.
pub fn shared_bytes(version: EngineVersion) -> Vec<u8> {
    let mut file = SerializedFile::new("shared.assets", version, Endian::Little).unwrap();
    file.add_object(7, Box::new(RawObject::new(ClassId::MESH_FILTER, vec![0; 12]))).unwrap();
    file.encode(&EncodeOptions::default()).unwrap()
}

/// Hand-written container in `format` with type trees, a script type, an
/// external and a data region at [`HAND_BUILT_DATA_OFFSET`]:
///
/// - 1: game object "Root" with one component, the transform 2
/// - 2: transform owned by 1
/// - 3: object of class 77, six bytes
pub fn hand_built(format: u32, endian: Endian) -> Vec<u8> {
    let header_size = if format >= 22 { 48 } else { 20 };

    // Object bodies
    let mut go = BinaryWriter::new(endian);
    go.write_i32(1);
    go.write_i32(0);
    go.write_i64(2);
    go.write_u32(0);
    go.write_string32("Root").unwrap();
    go.write_u16(0);
    go.write_bool(true);
    go.align();

    let mut transform = BinaryWriter::new(endian);
    transform.write_i32(0);
    transform.write_i64(1);
    for v in [0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0, 1.0, 1.0, 1.0] {
        transform.write_f32(v);
    }
    transform.write_i32(0);
    transform.write_i32(0);
    transform.write_i64(0);

    let raw = [1u8, 2, 3, 4, 5, 6];
    let bodies: [(i64, u32, &[u8]); 3] = [
        (1, 0, go.as_bytes()),
        (2, 1, transform.as_bytes()),
        (3, 2, &raw),
    ];

    let mut data = BinaryWriter::new(endian);
    let mut entries = Vec::new();
    for (path_id, type_index, body) in bodies {
        data.align_to(8);
        entries.push((path_id, data.position() as u64, body.len() as u32, type_index));
        data.write_bytes(body);
    }

    // Metadata, aligned relative to the file start
    let mut meta = BinaryWriter::new(endian);
    meta.pad_to(header_size);
    meta.write_cstring(version_for_format(format));
    meta.write_i32(19);
    meta.write_bool(true);

    meta.write_i32(3);
    for (class_id, type_name) in [(1, "GameObject"), (4, "Transform"), (77, "Thing")] {
        meta.write_i32(class_id);
        meta.write_bool(false);
        meta.write_i16(-1);
        meta.write_bytes(&[class_id as u8; 16]);

        let mut strings = type_name.as_bytes().to_vec();
        strings.push(0);
        strings.extend_from_slice(b"Base\0");
        meta.write_i32(1);
        meta.write_i32(strings.len() as i32);
        meta.write_u16(1);
        meta.write_u8(0);
        meta.write_u8(0);
        meta.write_u32(0);
        meta.write_u32(type_name.len() as u32 + 1);
        meta.write_i32(-1);
        meta.write_i32(0);
        meta.write_u32(0x8000);
        if format >= 19 {
            meta.write_u64(0);
        }
        meta.write_bytes(&strings);
        if format >= 21 {
            meta.write_i32(0);
        }
    }

    meta.write_i32(entries.len() as i32);
    for &(path_id, start, size, type_index) in &entries {
        meta.align();
        meta.write_i64(path_id);
        if format >= 22 {
            meta.write_i64(start as i64);
        } else {
            meta.write_u32(start as u32);
        }
        meta.write_u32(size);
        meta.write_i32(type_index as i32);
    }

    meta.write_i32(1);
    meta.write_i32(0);
    meta.align();
    meta.write_i64(11500000);

    meta.write_i32(1);
    meta.write_cstring("");
    meta.write_bytes(&[0xAB; 16]);
    meta.write_i32(3);
    meta.write_cstring("Library/unity default resources");

    if format >= 20 {
        meta.write_i32(0);
    }
    meta.write_cstring("");

    let metadata_size = (meta.position() - header_size) as u32;
    let file_size = (HAND_BUILT_DATA_OFFSET + data.position()) as u64;
    assert!(meta.position() <= HAND_BUILT_DATA_OFFSET);

    let mut head = BinaryWriter::new(Endian::Big);
    if format >= 22 {
        head.write_u32(0);
        head.write_u32(0);
        head.write_u32(format);
        head.write_u32(0);
    } else {
        head.write_u32(metadata_size);
        head.write_u32(file_size as u32);
        head.write_u32(format);
        head.write_u32(HAND_BUILT_DATA_OFFSET as u32);
    }
    head.write_u8(if endian == Endian::Big { 1 } else { 0 });
    head.write_bytes(&[0; 3]);
    if format >= 22 {
        head.write_u32(metadata_size);
        head.write_u64(file_size);
        head.write_u64(HAND_BUILT_DATA_OFFSET as u64);
        head.write_u64(0);
    }

    let mut out = meta.into_inner();
    out[..header_size].copy_from_slice(head.as_bytes());
    out.resize(HAND_BUILT_DATA_OFFSET, 0);
    out.extend_from_slice(data.as_bytes());
    out
}
