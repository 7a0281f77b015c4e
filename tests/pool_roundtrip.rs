// End-to-end pool access: a synthesized project directory with string
// pools, a flat keyfile and a zlib-compressed object blob, fetched back
// through the resolver.

use std::collections::BTreeMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use mcddb::keyfile::{write_flat, FlatKeyfileDriver};
use mcddb::object::common::McdValue;
use mcddb::object::enums::LimitKind;
use mcddb::project::Project;
use mcddb::strings::StringStorage;

const POOL_ID: &str = "EV_Test.bv";
const OBJECT_ID: &str = "Limit_RoundTrip";

/// A DB_LIMIT blob: type tag, UInt32 value, closed kind, sentinel tail.
fn limit_blob(value: u32) -> Vec<u8> {
    let mut blob = 0x0037u16.to_le_bytes().to_vec();
    blob.push(11); // A_UINT32
    blob.extend_from_slice(&value.to_le_bytes());
    blob.push(0x02); // closed
    blob.extend_from_slice(&[0x23, 0x3E, 0x00]);
    blob
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn object_fetched_by_name_through_the_resolver() {
    let dir = tempfile::tempdir().unwrap();

    // String pools: the object name must be present so its hash is stable.
    let mut storage = StringStorage::empty();
    storage.add_ascii(OBJECT_ID);
    storage.write(dir.path()).unwrap();

    // The .db file carries the compressed blob at offset 16.
    let blob = limit_blob(0xCAFE);
    let compressed = deflate(&blob);
    let mut db = vec![0u8; 16];
    db.extend_from_slice(&compressed);
    std::fs::write(dir.path().join(format!("{POOL_ID}.db")), &db).unwrap();

    // The .key file maps the name hash to a 6-byte record header.
    let hash = storage.hash_ascii(OBJECT_ID);
    let mut header = 16u32.to_le_bytes().to_vec();
    header.push(compressed.len() as u8);
    header.push(blob.len() as u8);
    let mut records = BTreeMap::new();
    records.insert(hash.to_le_bytes().to_vec(), header);
    std::fs::write(dir.path().join(format!("{POOL_ID}.key")), write_flat(&records)).unwrap();

    // Fetch through the full stack.
    let project = Project::open(dir.path()).unwrap();
    let resolver = project.resolver(Box::new(FlatKeyfileDriver));
    let limit = resolver
        .load_by_id(POOL_ID, OBJECT_ID)
        .unwrap()
        .into_limit()
        .unwrap();
    assert_eq!(limit.mcd_value, Some(McdValue::UInt32(0xCAFE)));
    assert_eq!(limit.limit_type, LimitKind::Closed);

    // Unknown object ids surface a reference error naming the pool.
    let err = resolver.load_by_id(POOL_ID, "NoSuchObject").unwrap_err();
    assert!(err.to_string().contains("NoSuchObject"));
}

#[test]
fn length_mismatch_is_detected() {
    let dir = tempfile::tempdir().unwrap();

    let mut storage = StringStorage::empty();
    storage.add_ascii(OBJECT_ID);
    storage.write(dir.path()).unwrap();

    let blob = limit_blob(1);
    let compressed = deflate(&blob);
    std::fs::write(dir.path().join(format!("{POOL_ID}.db")), &compressed).unwrap();

    // Header lies about the decompressed size.
    let hash = storage.hash_ascii(OBJECT_ID);
    let mut header = 0u32.to_le_bytes().to_vec();
    header.push(compressed.len() as u8);
    header.push(blob.len() as u8 + 1);
    let mut records = BTreeMap::new();
    records.insert(hash.to_le_bytes().to_vec(), header);
    std::fs::write(dir.path().join(format!("{POOL_ID}.key")), write_flat(&records)).unwrap();

    let project = Project::open(dir.path()).unwrap();
    let resolver = project.resolver(Box::new(FlatKeyfileDriver));
    assert!(resolver.load_by_id(POOL_ID, OBJECT_ID).is_err());
}
