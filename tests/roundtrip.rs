//! Integration tests for decoding containers and writing them back.

mod common;

use std::sync::Arc;

use assetgraph::file::format::OBJECT_ALIGNMENT;
use assetgraph::prelude::*;
use common::*;

fn load(name: &str, bytes: Vec<u8>, options: &LoadOptions) -> (SerializedFile, Arc<StatusReporter>) {
    let status = Arc::new(StatusReporter::new());
    let file = SerializedFile::decode(name, bytes, options, status.clone()).expect("decode");
    (file, status)
}

#[test]
fn test_hand_built_files_reencode_identically() {
    for format in [17, 19, 20, 21, 22] {
        for endian in [Endian::Little, Endian::Big] {
            let bytes = hand_built(format, endian);
            let (file, status) = load("level0", bytes.clone(), &LoadOptions::default());

            assert_eq!(file.format(), format);
            assert_eq!(file.endian(), endian);
            assert_eq!(file.version_string(), version_for_format(format));
            assert_eq!(file.target_platform(), 19);
            assert!(file.has_type_trees());
            assert_eq!(file.header().data_offset, HAND_BUILT_DATA_OFFSET as u64);

            // Untouched objects are copied through.
            let lazy = file.encode(&EncodeOptions::default()).unwrap();
            assert_eq!(lazy, bytes, "lazy format {} {:?}", format, endian);

            // Decoding alone does not change what is written.
            file.decode_all();
            let eager = file.encode(&EncodeOptions::default()).unwrap();
            assert_eq!(eager, bytes, "eager format {} {:?}", format, endian);

            let snap = status.snapshot();
            assert_eq!(snap.decode_failures(), 0);
            assert_eq!(snap.count(|e| matches!(e, Event::UnknownClass { .. })), 1);
        }
    }
}

#[test]
fn test_hand_built_tables() {
    let (file, _) = load("level0", hand_built(21, Endian::Big), &LoadOptions::eager());

    let types = file.types();
    assert_eq!(types.len(), 3);
    assert_eq!(types[0].class_id, ClassId::GAME_OBJECT);
    assert_eq!(types[2].old_type_hash, [77; 16]);
    let tree = types[1].tree.as_ref().unwrap();
    assert_eq!(tree.type_name(&tree.nodes[0]), Some("Transform"));
    assert_eq!(tree.field_name(&tree.nodes[0]), Some("Base"));

    assert_eq!(file.script_types().len(), 1);
    assert_eq!(file.script_types()[0].path_id, 11500000);

    let external = file.external(1).unwrap();
    assert_eq!(external.guid, [0xAB; 16]);
    assert_eq!(external.kind, 3);
    assert_eq!(external.file_name(), "unity default resources");
    assert!(file.external(0).is_none());
    assert!(file.external(2).is_none());

    let go = file.object_as::<GameObject>(1).unwrap();
    assert_eq!(go.name, "Root");
    assert!(go.active);
    // Class ids of local components come from the directory.
    assert_eq!(go.components()[0].class_id, ClassId::TRANSFORM);

    let t = file.object_as::<Transform>(2).unwrap();
    assert_eq!(t.game_object, PPtr::local(1));
    assert_eq!(t.local_position.to_array(), [1.0, 2.0, 3.0]);
    assert!(t.is_root());

    let raw = file.object_as::<RawObject>(3).unwrap();
    assert_eq!(raw.bytes(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_scene_reencodes_identically_across_revisions() {
    let revisions = [
        "5.0.4f1", "5.4.6f3", "5.5.0b2", "5.6.7f1", "2017.4.40f1", "2018.4.36f1",
        "2019.2.0a9", "2019.4.31f1", "2020.3.48f1", "2021.3.2f1", "2022.3.5f1", "2023.2.0b1",
    ];
    for text in revisions {
        let version: EngineVersion = text.parse().unwrap();
        for endian in [Endian::Little, Endian::Big] {
            let bytes = scene_bytes("scene.assets", version, endian);
            let (file, status) = load("scene.assets", bytes.clone(), &LoadOptions::eager());
            assert_eq!(file.version(), Some(version));
            assert_eq!(file.encode(&EncodeOptions::default()).unwrap(), bytes, "{} {:?}", text, endian);
            // Encoding for the declared revision is the same as no target.
            assert_eq!(file.encode(&EncodeOptions::for_target(version)).unwrap(), bytes);
            assert_eq!(status.snapshot().decode_failures(), 0, "{}", text);
        }
    }
}

#[test]
fn test_unknown_class_is_preserved_verbatim() {
    let version = EngineVersion::new(2019, 4, 31);
    let bytes = scene_bytes("scene.assets", version, Endian::Little);
    let (file, status) = load("scene.assets", bytes.clone(), &LoadOptions::default());

    let object = file.object(103).unwrap();
    assert_eq!(object.class_id(), ClassId(77));
    assert_eq!(object.downcast_ref::<RawObject>().unwrap().bytes(), &[9, 8, 7, 6, 5, 4, 3]);
    assert_eq!(file.source_bytes(103), Some(&[9u8, 8, 7, 6, 5, 4, 3][..]));
    assert_eq!(
        status.snapshot().events,
        vec![Event::UnknownClass { file: "scene.assets".into(), path_id: 103, class_id: ClassId(77) }]
    );
    assert_eq!(file.encode(&EncodeOptions::default()).unwrap(), bytes);
}

#[test]
fn test_non_canonical_bodies_survive_decoding() {
    let version: EngineVersion = "2019.4.31f1".parse().unwrap();
    let bytes = scene_bytes("scene.assets", version, Endian::Little);
    let (file, _) = load("scene.assets", bytes.clone(), &LoadOptions::default());
    let entry = file.entry(100).unwrap();
    let end = (file.header().data_offset + entry.byte_start) as usize + entry.byte_size as usize;
    // Game object body ends with the active flag and one padding byte.
    assert_eq!(&bytes[end - 2..end], &[1, 0]);

    for (at, value) in [(end - 2, 2u8), (end - 1, 0xCC)] {
        let mut patched = bytes.clone();
        patched[at] = value;

        let (file, status) = load("scene.assets", patched.clone(), &LoadOptions::eager());
        assert!(file.object_as::<GameObject>(100).unwrap().active);
        assert_eq!(status.snapshot().decode_failures(), 0);
        assert_eq!(file.encode(&EncodeOptions::default()).unwrap(), patched);

        // Editing hands the object to its encoder, which writes canonical bytes.
        let (mut file, _) = load("scene.assets", patched, &LoadOptions::default());
        assert!(file.object_mut(100).is_some());
        assert_eq!(file.encode(&EncodeOptions::default()).unwrap(), bytes);
    }
}

/// Hand-built file with non-zero padding before the data region and eight
/// bytes after the last object.
fn hand_built_with_slack(format: u32) -> Vec<u8> {
    let mut bytes = hand_built(format, Endian::Little);
    let header = FileHeader::read(&bytes).unwrap();
    let metadata_end = header.size() + header.metadata_size as usize;
    bytes[metadata_end..HAND_BUILT_DATA_OFFSET].fill(0xEE);
    bytes.extend_from_slice(&[0x5A; 8]);

    let file_size = bytes.len() as u64;
    if format >= 22 {
        bytes[24..32].copy_from_slice(&file_size.to_be_bytes());
    } else {
        bytes[4..8].copy_from_slice(&(file_size as u32).to_be_bytes());
    }
    bytes
}

#[test]
fn test_data_region_slack_is_kept() {
    for format in [17, 22] {
        let bytes = hand_built_with_slack(format);
        for options in [LoadOptions::default(), LoadOptions::eager()] {
            let (file, _) = load("level0", bytes.clone(), &options);
            assert_eq!(file.header().file_size, bytes.len() as u64);
            assert_eq!(file.encode(&EncodeOptions::default()).unwrap(), bytes, "format {}", format);
        }

        // A same-size edit keeps the layout around it.
        let (mut file, _) = load("level0", bytes.clone(), &LoadOptions::default());
        file.object_mut(2)
            .and_then(|o| o.downcast_mut::<Transform>())
            .unwrap()
            .local_position
            .x = 9.0;
        let edited = file.encode(&EncodeOptions::default()).unwrap();
        assert_eq!(edited.len(), bytes.len());
        assert!(edited.ends_with(&[0x5A; 8]));
        let back = SerializedFile::from_bytes("edited", edited).unwrap();
        assert_eq!(back.entry(2), file.entry(2));
        assert_eq!(back.object_as::<Transform>(2).unwrap().local_position.x, 9.0);

        // A size change repacks the objects and drops the slack.
        let (mut file, _) = load("level0", bytes.clone(), &LoadOptions::default());
        file.object_mut(1)
            .and_then(|o| o.downcast_mut::<GameObject>())
            .unwrap()
            .name = "A longer root name".to_string();
        let grown = file.encode(&EncodeOptions::default()).unwrap();
        assert!(grown.ends_with(&[1, 2, 3, 4, 5, 6]));
        let back = SerializedFile::from_bytes("grown", grown.clone()).unwrap();
        assert_eq!(back.header().file_size, grown.len() as u64);
        assert_eq!(back.object_as::<GameObject>(1).unwrap().name, "A longer root name");
    }
}

#[test]
fn test_objects_and_data_are_aligned() {
    for format in [17, 22] {
        let (file, _) = load("level0", hand_built(format, Endian::Little), &LoadOptions::eager());
        let bytes = file.encode(&EncodeOptions::for_target("2019.4.0f1".parse().unwrap())).unwrap();
        let ported = SerializedFile::from_bytes("ported", bytes.clone()).unwrap();
        assert_eq!(ported.format(), 21);
        assert_eq!(ported.header().file_size, bytes.len() as u64);
        for entry in ported.entries() {
            assert_eq!(entry.byte_start % OBJECT_ALIGNMENT, 0);
        }
    }
}

#[test]
fn test_porting_changes_component_shape() {
    let old: EngineVersion = "5.4.6f3".parse().unwrap();
    let new: EngineVersion = "2019.4.31f1".parse().unwrap();

    let source = scene_bytes("scene.assets", old, Endian::Little);
    let (file, _) = load("scene.assets", source.clone(), &LoadOptions::default());
    let old_size = file.entry(100).unwrap().byte_size;

    let ported = file.encode(&EncodeOptions::for_target(new)).unwrap();
    let (file, _) = load("scene.assets", ported.clone(), &LoadOptions::default());
    assert_eq!(file.format(), 21);
    assert_eq!(file.version_string(), "2019.4.31f1");
    // Two pairs lose their class ids.
    assert_eq!(file.entry(100).unwrap().byte_size, old_size - 8);
    let go = file.object_as::<GameObject>(100).unwrap();
    assert_eq!(go.components()[0].class_id, ClassId::TRANSFORM);
    assert_eq!(go.components()[1].class_id, ClassId::TEXT_ASSET);

    // Local class ids are recovered on the way back.
    let back = file.encode(&EncodeOptions::for_target(old)).unwrap();
    let (file, _) = load("scene.assets", back, &LoadOptions::default());
    assert_eq!(file.format(), 15);
    assert_eq!(file.version_string(), "5.4.6f3");
    assert_eq!(file.entry(100).unwrap().byte_size, old_size);
    assert_eq!(file.source_bytes(100), SerializedFile::from_bytes("s", source).unwrap().source_bytes(100));
}

#[test]
fn test_porting_to_unknown_revision_fails() {
    let bytes = scene_bytes("scene.assets", EngineVersion::new(2019, 4, 31), Endian::Little);
    let (file, _) = load("scene.assets", bytes, &LoadOptions::default());
    let err = file.encode(&EncodeOptions::for_target(EngineVersion::new(4, 7, 2))).unwrap_err();
    assert!(matches!(err, Error::UnsupportedRevision(_)));
}

#[test]
fn test_structural_failures() {
    let bytes = hand_built(17, Endian::Little);

    assert!(matches!(
        SerializedFile::from_bytes("short", bytes[..12].to_vec()),
        Err(Error::TruncatedHeader(12))
    ));

    let mut bad_format = bytes.clone();
    bad_format[8..12].copy_from_slice(&40u32.to_be_bytes());
    assert!(matches!(
        SerializedFile::from_bytes("format", bad_format),
        Err(Error::UnsupportedFormat(40))
    ));

    // Object data cut off after the metadata.
    let cut = bytes[..HAND_BUILT_DATA_OFFSET + 16].to_vec();
    assert!(matches!(
        SerializedFile::from_bytes("cut", cut),
        Err(Error::EntryOutOfRange { .. })
    ));

    // Metadata larger than the buffer.
    let mut overrun = bytes;
    overrun[0..4].copy_from_slice(&1_000_000u32.to_be_bytes());
    assert!(SerializedFile::from_bytes("overrun", overrun).is_err());
}
