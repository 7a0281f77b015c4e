//! Keyfile driver interface.
//!
//! A pool's `.key` file maps fixed keys to small record-header payloads. The
//! pool manager only needs a forward cursor over all records plus the data of
//! the record under the cursor, so that is the whole trait surface. The
//! production databases ship with a native key-file module; this crate keeps
//! the driver behind a trait owned by the pool manager so a pure-Rust driver
//! reading the same flat record layout can stand in for it, both in tests and
//! in extracted-project workflows.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, FormatError, Result};

/// Longest key the cursor will hand back. Pool keys are 4-byte hashes, but
/// the file format itself allows longer keys; oversized keys surface through
/// `KeyEntry::len` so the caller can reject them.
pub const MAX_KEY_LEN: usize = 16;

/// Key under the cursor: the (possibly truncated) bytes and the true length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: [u8; MAX_KEY_LEN],
    pub len: usize,
}

impl KeyEntry {
    pub fn bytes(&self) -> &[u8] {
        &self.key[..self.len.min(MAX_KEY_LEN)]
    }
}

/// Single-cursor access to one opened keyfile.
pub trait Keyfile {
    /// Move to the first record and return its key, or `None` when empty.
    fn first(&mut self) -> Result<Option<KeyEntry>>;
    /// Move to the next record and return its key, or `None` at the end.
    fn next(&mut self) -> Result<Option<KeyEntry>>;
    /// Read the data of the record under the cursor.
    fn read(&mut self) -> Result<Vec<u8>>;
}

/// Opens keyfiles. Owned by the pool manager; handles never escape it.
pub trait KeyfileDriver {
    fn open(&self, path: &Path) -> Result<Box<dyn Keyfile>>;
}

fn entry_for(key: &[u8]) -> KeyEntry {
    let mut buf = [0u8; MAX_KEY_LEN];
    let copy = key.len().min(MAX_KEY_LEN);
    buf[..copy].copy_from_slice(&key[..copy]);
    KeyEntry {
        key: buf,
        len: key.len(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory driver
// ─────────────────────────────────────────────────────────────────────────────

/// Keyfile backed by an ordered key → data map. Used by unit tests and by
/// callers that already extracted the records from elsewhere.
pub struct MemoryKeyfile {
    records: Vec<(Vec<u8>, Vec<u8>)>,
    cursor: usize,
}

impl MemoryKeyfile {
    pub fn new(records: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        MemoryKeyfile {
            records: records.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl Keyfile for MemoryKeyfile {
    fn first(&mut self) -> Result<Option<KeyEntry>> {
        self.cursor = 0;
        Ok(self.records.first().map(|(k, _)| entry_for(k)))
    }

    fn next(&mut self) -> Result<Option<KeyEntry>> {
        self.cursor += 1;
        Ok(self.records.get(self.cursor).map(|(k, _)| entry_for(k)))
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        match self.records.get(self.cursor) {
            Some((_, data)) => Ok(data.clone()),
            None => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "keyfile cursor past last record",
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Flat-file driver
// ─────────────────────────────────────────────────────────────────────────────

/// Magic prefix of the flat keyfile layout: a record stream of
/// `(u8 key_len, key bytes, u32le data_len, data bytes)` entries.
const FLAT_MAGIC: &[u8; 4] = b"MKF1";

/// Driver for the flat keyfile layout. The whole file is read up front; the
/// files are tiny (a few bytes per record) compared to the `.db` payloads.
pub struct FlatKeyfileDriver;

impl KeyfileDriver for FlatKeyfileDriver {
    fn open(&self, path: &Path) -> Result<Box<dyn Keyfile>> {
        if !path.is_file() {
            return Err(Error::KeyfileNotFound(path.to_path_buf()));
        }
        let mut raw = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut raw)?;
        let records = parse_flat(&raw)?;
        Ok(Box::new(MemoryKeyfile { records, cursor: 0 }))
    }
}

fn parse_flat(raw: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    if raw.len() < FLAT_MAGIC.len() || &raw[..4] != FLAT_MAGIC {
        return Err(FormatError::BadRecordLength(raw.len()).into());
    }
    let mut records = Vec::new();
    let mut pos = FLAT_MAGIC.len();
    while pos < raw.len() {
        let key_len = raw[pos] as usize;
        pos += 1;
        let key = take(raw, &mut pos, key_len)?.to_vec();
        let data_len = u32::from_le_bytes(take(raw, &mut pos, 4)?.try_into().unwrap()) as usize;
        let data = take(raw, &mut pos, data_len)?.to_vec();
        records.push((key, data));
    }
    Ok(records)
}

fn take<'a>(raw: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8]> {
    let end = pos.checked_add(n).filter(|&end| end <= raw.len());
    match end {
        Some(end) => {
            let slice = &raw[*pos..end];
            *pos = end;
            Ok(slice)
        }
        None => Err(FormatError::StreamOverrun {
            wanted: n,
            available: raw.len() - *pos,
        }
        .into()),
    }
}

/// Serialize records in the flat keyfile layout. Counterpart of
/// [`FlatKeyfileDriver`], used to build fixtures and extracted projects.
pub fn write_flat(records: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
    let mut out = FLAT_MAGIC.to_vec();
    for (key, data) in records {
        out.push(key.len() as u8);
        out.extend_from_slice(key);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<Vec<u8>, Vec<u8>> {
        let mut m = BTreeMap::new();
        m.insert(0x1234u32.to_le_bytes().to_vec(), vec![1, 2, 3]);
        m.insert(0xABCDu32.to_le_bytes().to_vec(), vec![9]);
        m
    }

    #[test]
    fn memory_cursor_walks_all_records() {
        let mut kf = MemoryKeyfile::new(sample());
        let first = kf.first().unwrap().unwrap();
        assert_eq!(first.len, 4);
        assert_eq!(kf.read().unwrap(), vec![1, 2, 3]);
        assert!(kf.next().unwrap().is_some());
        assert_eq!(kf.read().unwrap(), vec![9]);
        assert!(kf.next().unwrap().is_none());
    }

    #[test]
    fn flat_roundtrip() {
        let records = sample();
        let bytes = write_flat(&records);
        let parsed = parse_flat(&bytes).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].1, vec![1, 2, 3]);
    }

    #[test]
    fn flat_rejects_bad_magic() {
        assert!(parse_flat(b"nope").is_err());
    }

    #[test]
    fn flat_rejects_truncated_record() {
        let mut bytes = write_flat(&sample());
        bytes.truncate(bytes.len() - 1);
        assert!(parse_flat(&bytes).is_err());
    }
}
