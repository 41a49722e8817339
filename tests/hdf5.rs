//! HDF5 attribute mapping (spec §8, scenario 5): a root attribute `someInt:
//! 42` is enumerated as the file path `@someInt`, reads back as the bytes
//! `"42"`, and decodes as the JSON integer `42`. Gated behind the
//! `hdf5-adapter` Cargo feature, which links against a system `libhdf5`.
#![cfg(feature = "hdf5-adapter")]

use dirschema::adapters::{H5Dir, StorageAdapter};
use tempfile::Builder;

#[test]
fn root_int_attribute_is_exposed_as_an_atname_file() {
    let file = Builder::new().suffix(".h5").tempfile().expect("temp hdf5 file");
    {
        let h5file = hdf5::File::create(file.path()).expect("create hdf5 file");
        h5file
            .new_attr::<i64>()
            .create("someInt")
            .expect("create someInt attribute")
            .write_scalar(&42i64)
            .expect("write someInt attribute");
    }

    let adapter = H5Dir::open(file.path()).expect("open hdf5 file");

    let paths = adapter.get_paths().expect("enumerate paths");
    assert!(paths.contains(&"@someInt".to_string()), "expected '@someInt' among {paths:?}");
    assert!(adapter.is_file("@someInt"));
    assert!(!adapter.is_dir("@someInt"));

    let raw = adapter.open_file("@someInt").expect("open @someInt");
    assert_eq!(raw, b"42");

    let decoded = adapter.decode_json(&raw, "@someInt").expect("decode @someInt");
    assert_eq!(decoded, serde_json::json!(42));
}

#[test]
fn group_and_dataset_with_attribute_round_trip() {
    let file = Builder::new().suffix(".h5").tempfile().expect("temp hdf5 file");
    {
        let h5file = hdf5::File::create(file.path()).expect("create hdf5 file");
        let group = h5file.create_group("foo").expect("create group foo");
        let ds = group
            .new_dataset::<i64>()
            .shape(3)
            .create("data")
            .expect("create dataset foo/data");
        ds.write_raw(&[1i64, 2, 3]).expect("write dataset foo/data");
        ds.new_attr::<hdf5::types::VarLenUnicode>()
            .create("filename")
            .expect("create filename attribute")
            .write_scalar(&"data.bin".parse::<hdf5::types::VarLenUnicode>().unwrap())
            .expect("write filename attribute");
    }

    let adapter = H5Dir::open(file.path()).expect("open hdf5 file");
    assert!(adapter.is_dir("foo"));
    assert!(adapter.is_file("foo/data"));
    assert!(adapter.is_file("foo/data@filename"));

    let raw = adapter.open_file("foo/data@filename").expect("open attribute file");
    let decoded = adapter.decode_json(&raw, "foo/data@filename").expect("decode attribute");
    assert_eq!(decoded, serde_json::json!("data.bin"));
}
