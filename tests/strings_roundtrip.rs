// On-disk round-trips of the hashed string pools.

use mcddb::strings::StringStorage;

#[test]
fn write_then_load_preserves_both_tables() {
    let dir = tempfile::tempdir().unwrap();

    let mut storage = StringStorage::empty();
    for s in [
        "DiagnServi_ReadDataByIdentMeasuValue",
        "#RtGen_DB_LAYER_DATA",
        "EngineSpeed",
        "Param_DataRecor",
    ] {
        storage.add_ascii(s);
    }
    for s in ["Motordrehzahl", "Kühlmitteltemperatur", "°C"] {
        storage.add_unicode(s);
    }

    storage.write(dir.path()).unwrap();
    let reloaded = StringStorage::load(dir.path()).unwrap();

    assert_eq!(reloaded.ascii_len(), 4);
    assert_eq!(reloaded.unicode_len(), 3);

    for s in [
        "DiagnServi_ReadDataByIdentMeasuValue",
        "#RtGen_DB_LAYER_DATA",
        "EngineSpeed",
        "Param_DataRecor",
    ] {
        let hash = storage.hash_ascii(s);
        assert_eq!(reloaded.lookup_ascii(hash), Some(s));
        assert_eq!(reloaded.hash_ascii(s), hash);
    }
    for s in ["Motordrehzahl", "Kühlmitteltemperatur", "°C"] {
        let hash = storage.hash_unicode(s);
        assert_eq!(reloaded.lookup_unicode(hash), Some(s));
    }
}

#[test]
fn combined_lookup_prefers_ascii() {
    let mut storage = StringStorage::empty();
    storage.add_ascii("shared");
    let hash = storage.hash_ascii("shared");
    assert_eq!(storage.lookup(hash), Some("shared"));
    // A hash present only in the Unicode table still resolves.
    storage.add_unicode("only_unicode");
    let uhash = storage.hash_unicode("only_unicode");
    if storage.lookup_ascii(uhash).is_none() {
        assert_eq!(storage.lookup(uhash), Some("only_unicode"));
    }
}
