//! Hashed string storage.
//!
//! Every project carries four string-pool files: `AStringData.{idx,data}`
//! (cp1252, one byte per character) and `UStringData.{idx,data}` (UTF-16LE,
//! two bytes per character), usually gzip-wrapped. Strings are addressed by a
//! 31-bit hash; the object blobs store only hashes and resolve them here.
//!
//! The hash is a DJB2 variant over *characters* (bytes for the ASCII table,
//! u16 code units for the Unicode table): `h = 5381`, then `h = h*33 + c`
//! per character, masked to 31 bits, with `0` substituted by `5`. Collisions
//! are resolved by adding `11` (same substitution) until a free slot is
//! found; hashing a known string walks the same chain until the stored
//! string matches, so inserts and lookups stay consistent.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use encoding_rs::{UTF_16LE, WINDOWS_1252};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{FormatError, Result};

const HASH_MASK: u32 = 0x7FFF_FFFF;
const COLLISION_STEP: u32 = 11;

/// One loaded project's ASCII and Unicode string tables.
pub struct StringStorage {
    ascii: HashMap<u32, String>,
    unicode: HashMap<u32, String>,
}

fn mask_hash(h: u32) -> u32 {
    match h & HASH_MASK {
        0 => 5,
        v => v,
    }
}

fn next_slot(h: u32) -> u32 {
    mask_hash(h.wrapping_add(COLLISION_STEP))
}

fn seed_hash<I: IntoIterator<Item = u32>>(chars: I) -> u32 {
    let mut h: u32 = 5381;
    for c in chars {
        h = h.wrapping_mul(33).wrapping_add(c);
    }
    mask_hash(h)
}

/// Initial (pre-collision) hash of an ASCII string, computed over its cp1252
/// bytes.
pub fn seed_hash_ascii(s: &str) -> u32 {
    let (bytes, _, _) = WINDOWS_1252.encode(s);
    seed_hash(bytes.iter().map(|&b| b as u32))
}

/// Initial (pre-collision) hash of a Unicode string, computed over its
/// UTF-16LE code units.
pub fn seed_hash_unicode(s: &str) -> u32 {
    seed_hash(s.encode_utf16().map(|u| u as u32))
}

impl StringStorage {
    pub fn empty() -> StringStorage {
        StringStorage {
            ascii: HashMap::new(),
            unicode: HashMap::new(),
        }
    }

    /// Load the four string-pool files from a project directory. When the
    /// plain files are absent the `.gz` variants are read instead.
    pub fn load(project_dir: &Path) -> Result<StringStorage> {
        let ascii_data = read_pool_file(project_dir, "AStringData.data")?;
        let ascii_idx = read_pool_file(project_dir, "AStringData.idx")?;
        let unicode_data = read_pool_file(project_dir, "UStringData.data")?;
        let unicode_idx = read_pool_file(project_dir, "UStringData.idx")?;

        Ok(StringStorage {
            ascii: read_table(&ascii_data, &ascii_idx, 'A')?,
            unicode: read_table(&unicode_data, &unicode_idx, 'U')?,
        })
    }

    pub fn ascii_len(&self) -> usize {
        self.ascii.len()
    }

    pub fn unicode_len(&self) -> usize {
        self.unicode.len()
    }

    pub fn lookup_ascii(&self, hash: u32) -> Option<&str> {
        self.ascii.get(&hash).map(String::as_str)
    }

    pub fn lookup_unicode(&self, hash: u32) -> Option<&str> {
        self.unicode.get(&hash).map(String::as_str)
    }

    /// ASCII table first, Unicode as fallback.
    pub fn lookup(&self, hash: u32) -> Option<&str> {
        self.lookup_ascii(hash).or_else(|| self.lookup_unicode(hash))
    }

    /// Hash of an ASCII string, walking the collision chain until the stored
    /// string matches. For a string not present in the table this returns the
    /// slot `add_ascii` would use first.
    pub fn hash_ascii(&self, s: &str) -> u32 {
        let mut h = seed_hash_ascii(s);
        while matches!(self.ascii.get(&h), Some(stored) if stored != s) {
            h = next_slot(h);
        }
        h
    }

    pub fn hash_unicode(&self, s: &str) -> u32 {
        let mut h = seed_hash_unicode(s);
        while matches!(self.unicode.get(&h), Some(stored) if stored != s) {
            h = next_slot(h);
        }
        h
    }

    /// Insert a string into the ASCII table at the first free slot along its
    /// collision chain.
    pub fn add_ascii(&mut self, s: &str) {
        let mut h = seed_hash_ascii(s);
        while self.ascii.contains_key(&h) {
            h = next_slot(h);
        }
        self.ascii.insert(h, s.to_string());
    }

    pub fn add_unicode(&mut self, s: &str) {
        let mut h = seed_hash_unicode(s);
        while self.unicode.contains_key(&h) {
            h = next_slot(h);
        }
        self.unicode.insert(h, s.to_string());
    }

    /// Write both tables as gzip-compressed `.idx.gz`/`.data.gz` pairs.
    pub fn write(&self, out_dir: &Path) -> Result<()> {
        write_table(&self.ascii, out_dir, "AStringData", 'A')?;
        write_table(&self.unicode, out_dir, "UStringData", 'U')?;
        Ok(())
    }
}

fn read_pool_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let plain = dir.join(name);
    if plain.is_file() {
        let mut data = Vec::new();
        File::open(plain)?.read_to_end(&mut data)?;
        return Ok(data);
    }
    let mut raw = Vec::new();
    File::open(dir.join(format!("{name}.gz")))?.read_to_end(&mut raw)?;
    let mut data = Vec::new();
    GzDecoder::new(&raw[..])
        .read_to_end(&mut data)
        .map_err(|e| FormatError::Inflate(format!("{name}.gz: {e}")))?;
    Ok(data)
}

fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            FormatError::StreamOverrun {
                wanted: len,
                available: data.len().saturating_sub(offset),
            }
            .into()
        })
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(slice(data, offset, 4)?.try_into().unwrap()))
}

/// Parse one table. The index holds `u32 count` then `count` records of
/// `(u32 data_offset, u32 hash)`; the data file holds `u32 char_count` plus
/// the encoded payload at each offset.
fn read_table(data: &[u8], index: &[u8], table: char) -> Result<HashMap<u32, String>> {
    let count = read_u32(index, 0)? as usize;
    let mut strings = HashMap::with_capacity(count);

    for i in 0..count {
        let record = 4 + i * 8;
        let data_offset = read_u32(index, record)? as usize;
        let hash = read_u32(index, record + 4)?;

        let char_count = read_u32(data, data_offset)? as usize;
        let char_size = if table == 'A' { 1 } else { 2 };
        let payload = slice(data, data_offset + 4, char_count * char_size)?;

        let string = if table == 'A' {
            WINDOWS_1252.decode(payload).0.into_owned()
        } else {
            UTF_16LE.decode(payload).0.into_owned()
        };

        if let Some(existing) = strings.insert(hash, string) {
            return Err(FormatError::DuplicateStringHash {
                hash,
                table,
                existing,
            }
            .into());
        }
    }
    Ok(strings)
}

fn write_table(
    strings: &HashMap<u32, String>,
    out_dir: &Path,
    stem: &str,
    table: char,
) -> Result<()> {
    let mut data_buf = Vec::new();
    let mut index_buf = Vec::new();

    // Fixed iteration order keeps rewritten pools byte-stable.
    let mut hashes: Vec<u32> = strings.keys().copied().collect();
    hashes.sort_unstable();

    index_buf.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    for &hash in &hashes {
        let string = &strings[&hash];
        index_buf.extend_from_slice(&(data_buf.len() as u32).to_le_bytes());
        index_buf.extend_from_slice(&hash.to_le_bytes());

        if table == 'A' {
            let (bytes, _, _) = WINDOWS_1252.encode(string);
            data_buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            data_buf.extend_from_slice(&bytes);
        } else {
            // UTF-16LE payload is stored without a byte-order mark.
            let units: Vec<u16> = string.encode_utf16().collect();
            data_buf.extend_from_slice(&(units.len() as u32).to_le_bytes());
            for unit in units {
                data_buf.extend_from_slice(&unit.to_le_bytes());
            }
        }
    }

    write_gz(&out_dir.join(format!("{stem}.data.gz")), &data_buf)?;
    write_gz(&out_dir.join(format!("{stem}.idx.gz")), &index_buf)?;
    Ok(())
}

fn write_gz(path: &Path, data: &[u8]) -> Result<()> {
    let mut encoder = GzEncoder::new(File::create(path)?, Compression::new(1));
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_31_bit_and_nonzero() {
        let h = seed_hash_ascii("DiagnServi_ReadDataByIdentMeasuValue");
        assert_ne!(h, 0);
        assert_eq!(h & !HASH_MASK, 0);

        let mut storage = StringStorage::empty();
        storage.add_ascii("DiagnServi_ReadDataByIdentMeasuValue");
        assert_eq!(
            storage.lookup_ascii(h),
            Some("DiagnServi_ReadDataByIdentMeasuValue")
        );
        assert_eq!(storage.hash_ascii("DiagnServi_ReadDataByIdentMeasuValue"), h);
    }

    #[test]
    fn hash_of_lookup_roundtrips() {
        let mut storage = StringStorage::empty();
        for s in ["one", "two", "three", "#RtGen_DB_LAYER_DATA"] {
            storage.add_ascii(s);
            storage.add_unicode(s);
        }
        for s in ["one", "two", "three", "#RtGen_DB_LAYER_DATA"] {
            let ha = storage.hash_ascii(s);
            assert_eq!(storage.lookup_ascii(ha), Some(s));
            let hu = storage.hash_unicode(s);
            assert_eq!(storage.lookup_unicode(hu), Some(s));
        }
    }

    #[test]
    fn collision_chain_assigns_distinct_slots() {
        let mut storage = StringStorage::empty();
        // Force a collision by inserting a foreign string at the seed slot.
        let seed = seed_hash_ascii("collide");
        storage.ascii.insert(seed, "occupant".to_string());
        storage.add_ascii("collide");

        let walked = storage.hash_ascii("collide");
        assert_ne!(walked, seed);
        assert_eq!(walked, mask_hash(seed.wrapping_add(COLLISION_STEP)));
        assert_eq!(storage.lookup_ascii(walked), Some("collide"));
    }

    #[test]
    fn unicode_hash_uses_code_units() {
        // A two-byte character must hash differently from its UTF-8 bytes.
        let h = seed_hash_unicode("°C");
        assert_eq!(h, seed_hash([0xB0u32, 0x43]));
    }
}
