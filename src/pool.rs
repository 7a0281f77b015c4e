//! Pool manager: record enumeration and object blob retrieval.
//!
//! Every pool is a `.key`/`.db` file pair named by its pool id. The keyfile
//! maps the 32-bit hash of an object's ASCII name to a small record header;
//! the header locates a zlib stream inside the `.db` file that inflates to
//! the object's blob.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;

use crate::error::{FormatError, Result};
use crate::keyfile::KeyfileDriver;

/// Pool kind, deduced from the two-letter suffix of the pool id (the part
/// before `.db`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    BaseVariant,
    EcuVariant,
    Protocol,
    FunctionalGroup,
    VehicleInfoTable,
    EcuConfiguration,
    Flash,
    FunctionDictionary,
    EcuSharedData,
    MultipleEcuJob,
    ComParams,
    Unknown,
}

impl PoolKind {
    pub fn of(pool_id: &str) -> PoolKind {
        match pool_id.rsplit('.').next().unwrap_or("") {
            "bv" => PoolKind::BaseVariant,
            "ev" => PoolKind::EcuVariant,
            "pr" => PoolKind::Protocol,
            "fg" => PoolKind::FunctionalGroup,
            "vi" => PoolKind::VehicleInfoTable,
            "ec" => PoolKind::EcuConfiguration,
            "fl" => PoolKind::Flash,
            "fd" => PoolKind::FunctionDictionary,
            "sd" => PoolKind::EcuSharedData,
            "mj" => PoolKind::MultipleEcuJob,
            "cp" => PoolKind::ComParams,
            _ => PoolKind::Unknown,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            PoolKind::BaseVariant => "Base Variant",
            PoolKind::EcuVariant => "ECU Variant",
            PoolKind::Protocol => "Protocol",
            PoolKind::FunctionalGroup => "Functional Group",
            PoolKind::VehicleInfoTable => "Vehicle Information Table",
            PoolKind::EcuConfiguration => "ECU Configuration",
            PoolKind::Flash => "Flash",
            PoolKind::FunctionDictionary => "Function Dictionary",
            PoolKind::EcuSharedData => "ECU Shared Data",
            PoolKind::MultipleEcuJob => "Multiple ECU Job",
            PoolKind::ComParams => "Communication Parameters",
            PoolKind::Unknown => "Unknown",
        }
    }
}

/// Location and size of one object blob inside a `.db` file.
///
/// On disk the header is 6, 8 or 12 bytes: a 4-byte offset followed by the
/// compressed and decompressed sizes at a width of 1, 2 or 4 bytes each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub offset: u32,
    pub compressed_len: u32,
    pub decompressed_len: u32,
}

impl RecordHeader {
    pub fn parse(data: &[u8]) -> Result<RecordHeader> {
        let offset = u32::from_le_bytes(data[..4.min(data.len())].try_into().unwrap_or([0; 4]));
        let (clen, dlen) = match data.len() {
            6 => (data[4] as u32, data[5] as u32),
            8 => (
                u16::from_le_bytes([data[4], data[5]]) as u32,
                u16::from_le_bytes([data[6], data[7]]) as u32,
            ),
            12 => (
                u32::from_le_bytes(data[4..8].try_into().unwrap()),
                u32::from_le_bytes(data[8..12].try_into().unwrap()),
            ),
            other => return Err(FormatError::BadRecordLength(other).into()),
        };
        Ok(RecordHeader {
            offset,
            compressed_len: clen,
            decompressed_len: dlen,
        })
    }
}

/// Owns the keyfile driver and turns `(pool id, object hash)` into blobs.
pub struct PoolManager {
    driver: Box<dyn KeyfileDriver>,
}

impl PoolManager {
    pub fn new(driver: Box<dyn KeyfileDriver>) -> Self {
        PoolManager { driver }
    }

    /// Scan the pool's keyfile front to back and collect every record header,
    /// keyed by the 32-bit object-name hash. Keys must be exactly 4 bytes and
    /// unique within a pool.
    pub fn get_all_records(
        &self,
        project_dir: &Path,
        pool_id: &str,
    ) -> Result<HashMap<u32, RecordHeader>> {
        let key_path = project_dir.join(format!("{pool_id}.key"));
        let mut keyfile = self.driver.open(&key_path)?;

        let mut records = HashMap::new();
        let mut entry = keyfile.first()?;
        while let Some(key) = entry {
            if key.len != 4 {
                return Err(FormatError::BadKeyLength(key.len).into());
            }
            let hash = u32::from_le_bytes(key.bytes().try_into().unwrap());
            let header = RecordHeader::parse(&keyfile.read()?)?;
            if records.insert(hash, header).is_some() {
                return Err(FormatError::DuplicateKey { key: hash }.into());
            }
            entry = keyfile.next()?;
        }
        Ok(records)
    }

    pub fn db_path(project_dir: &Path, pool_id: &str) -> PathBuf {
        project_dir.join(format!("{pool_id}.db"))
    }

    /// Fetch and inflate the blob a record header points at, verifying the
    /// decompressed length against the header.
    pub fn get_object_data(db_file: &mut File, header: &RecordHeader) -> Result<Vec<u8>> {
        db_file.seek(SeekFrom::Start(header.offset as u64))?;
        let mut compressed = vec![0u8; header.compressed_len as usize];
        db_file.read_exact(&mut compressed)?;

        let mut data = Vec::with_capacity(header.decompressed_len as usize);
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut data)
            .map_err(|e| FormatError::Inflate(e.to_string()))?;

        if data.len() != header.decompressed_len as usize {
            return Err(FormatError::DataLengthMismatch {
                got: data.len(),
                expected: header.decompressed_len as usize,
            }
            .into());
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_suffix() {
        assert_eq!(PoolKind::of("0.0.0@PR_UDSOnCAN.pr"), PoolKind::Protocol);
        assert_eq!(PoolKind::of("EV_Engine.bv"), PoolKind::BaseVariant);
        assert_eq!(PoolKind::of("whatever.zz"), PoolKind::Unknown);
    }

    #[test]
    fn header_six_byte_form() {
        // Worked scenario: offset 0x1000, sizes 0x10/0x10.
        let header = RecordHeader::parse(&[0x00, 0x10, 0x00, 0x00, 0x10, 0x10]).unwrap();
        assert_eq!(header.offset, 0x1000);
        assert_eq!(header.compressed_len, 0x10);
        assert_eq!(header.decompressed_len, 0x10);
    }

    #[test]
    fn header_eight_byte_form() {
        let header =
            RecordHeader::parse(&[1, 0, 0, 0, 0x34, 0x12, 0x78, 0x56]).unwrap();
        assert_eq!(header.offset, 1);
        assert_eq!(header.compressed_len, 0x1234);
        assert_eq!(header.decompressed_len, 0x5678);
    }

    #[test]
    fn header_twelve_byte_form() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xAABBCCDDu32.to_le_bytes());
        data.extend_from_slice(&0x11223344u32.to_le_bytes());
        data.extend_from_slice(&0x55667788u32.to_le_bytes());
        let header = RecordHeader::parse(&data).unwrap();
        assert_eq!(header.offset, 0xAABBCCDD);
        assert_eq!(header.compressed_len, 0x11223344);
        assert_eq!(header.decompressed_len, 0x55667788);
    }

    #[test]
    fn header_rejects_other_widths() {
        assert!(RecordHeader::parse(&[0; 7]).is_err());
        assert!(RecordHeader::parse(&[0; 5]).is_err());
    }
}
