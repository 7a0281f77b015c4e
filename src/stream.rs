//! Length-checked cursor over a decompressed object blob.
//!
//! Every blob starts with a little-endian u16 type tag and ends with the
//! three-byte sentinel `23 3E 00`. All reads are bounds-checked; hashed
//! strings resolve through the project's [`StringStorage`].

use crate::error::{FormatError, Result};
use crate::strings::StringStorage;

/// End-of-object sentinel expected as the tail of every fully parsed blob.
pub const OBJECT_TAIL: [u8; 3] = [0x23, 0x3E, 0x00];

pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ObjectStream<'a> {
    data: &'a [u8],
    pos: usize,
    strings: &'a StringStorage,
    object_type_tag: u16,
}

impl<'a> ObjectStream<'a> {
    /// Wrap a blob. The leading type tag is peeked (not consumed) so the
    /// close-time diagnostics can name the object type.
    pub fn new(data: &'a [u8], strings: &'a StringStorage) -> ObjectStream<'a> {
        let tag = if data.len() >= 2 {
            u16::from_le_bytes([data[0], data[1]])
        } else {
            0
        };
        ObjectStream {
            data,
            pos: 0,
            strings,
            object_type_tag: tag,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(FormatError::StreamOverrun {
                wanted: count,
                available: self.remaining(),
            }
            .into());
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.read(1)?[0] as i8)
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read(2)?.try_into().unwrap()))
    }

    pub fn i16_le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read(2)?.try_into().unwrap()))
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn f64_le(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read(8)?.try_into().unwrap()))
    }

    /// A presence flag byte must be exactly 0 or 1; anything else means the
    /// stream position has drifted.
    pub fn presence_flag(&mut self) -> Result<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FormatError::BadExistenceFlag(other).into()),
        }
    }

    /// Hashed ASCII string: a u32 hash resolved through the ASCII table.
    pub fn ascii_string(&mut self) -> Result<(Option<String>, u32)> {
        let hash = self.u32_le()?;
        Ok((self.strings.lookup_ascii(hash).map(str::to_owned), hash))
    }

    /// Hashed Unicode string: a u32 hash resolved through the Unicode table.
    pub fn unicode_string(&mut self) -> Result<(Option<String>, u32)> {
        let hash = self.u32_le()?;
        Ok((self.strings.lookup_unicode(hash).map(str::to_owned), hash))
    }

    /// Inline ASCII string: a u32 whose high bit flags a raw cp1252 payload
    /// of `n & 0x7FFF_FFFF` bytes. Zero means absent; any other unflagged
    /// value might denote a hash, which is not supported.
    pub fn native_ascii_string(&mut self) -> Result<Option<String>> {
        let n = self.u32_le()?;
        if n & 0x8000_0000 != 0 {
            let payload = self.read((n & 0x7FFF_FFFF) as usize)?;
            Ok(Some(encoding_rs::WINDOWS_1252.decode(payload).0.into_owned()))
        } else if n != 0 {
            Err(FormatError::NativeStringHash('A').into())
        } else {
            Ok(None)
        }
    }

    /// Inline Unicode string: like [`Self::native_ascii_string`] but the
    /// length counts UTF-16LE code units (two bytes each).
    pub fn native_unicode_string(&mut self) -> Result<Option<String>> {
        let n = self.u32_le()?;
        if n & 0x8000_0000 != 0 {
            let payload = self.read(2 * (n & 0x7FFF_FFFF) as usize)?;
            Ok(Some(encoding_rs::UTF_16LE.decode(payload).0.into_owned()))
        } else if n != 0 {
            Err(FormatError::NativeStringHash('U').into())
        } else {
            Ok(None)
        }
    }

    /// After a successful top-level load the stream must hold exactly the
    /// three-byte end-of-object sentinel. Leftover bytes are a warning, not
    /// an error: the object itself parsed fine.
    pub fn finish(&self) {
        if self.remaining() > OBJECT_TAIL.len() {
            log::warn!(
                "object stream ({:04X}) not empty: {}",
                self.object_type_tag,
                hex_string(&self.data[self.pos..self.data.len() - OBJECT_TAIL.len()])
            );
        } else if self.data[self.pos..] != OBJECT_TAIL {
            log::warn!(
                "object stream ({:04X}) tail is not the end-of-object sentinel: {}",
                self.object_type_tag,
                hex_string(&self.data[self.pos..])
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringStorage;

    fn storage_with(ascii: &[&str], unicode: &[&str]) -> StringStorage {
        let mut s = StringStorage::empty();
        for a in ascii {
            s.add_ascii(a);
        }
        for u in unicode {
            s.add_unicode(u);
        }
        s
    }

    #[test]
    fn read_past_end_fails() {
        let storage = StringStorage::empty();
        let mut stream = ObjectStream::new(&[1, 2, 3], &storage);
        assert_eq!(stream.read(2).unwrap(), &[1, 2]);
        assert!(stream.read(2).is_err());
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn scalar_reads_are_little_endian() {
        let storage = StringStorage::empty();
        let data = [0x01, 0x02, 0xFE, 0xFF, 0xFF, 0xFF];
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(stream.u16_le().unwrap(), 0x0201);
        assert_eq!(stream.i32_le().unwrap(), -2);
    }

    #[test]
    fn presence_flag_rejects_garbage() {
        let storage = StringStorage::empty();
        let mut stream = ObjectStream::new(&[0, 1, 7], &storage);
        assert!(!stream.presence_flag().unwrap());
        assert!(stream.presence_flag().unwrap());
        assert!(stream.presence_flag().is_err());
    }

    #[test]
    fn hashed_string_resolves_through_storage() {
        let storage = storage_with(&["EngineSpeed"], &[]);
        let hash = storage.hash_ascii("EngineSpeed");
        let data = hash.to_le_bytes();
        let mut stream = ObjectStream::new(&data, &storage);
        let (value, got_hash) = stream.ascii_string().unwrap();
        assert_eq!(value.as_deref(), Some("EngineSpeed"));
        assert_eq!(got_hash, hash);
    }

    #[test]
    fn native_ascii_string_forms() {
        let storage = StringStorage::empty();

        // Length-flagged payload.
        let mut data = (0x8000_0000u32 | 2).to_le_bytes().to_vec();
        data.extend_from_slice(b"ab");
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(stream.native_ascii_string().unwrap().as_deref(), Some("ab"));

        // Zero means absent.
        let data = 0u32.to_le_bytes();
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(stream.native_ascii_string().unwrap(), None);

        // Unflagged non-zero is unsupported.
        let data = 42u32.to_le_bytes();
        let mut stream = ObjectStream::new(&data, &storage);
        assert!(stream.native_ascii_string().is_err());
    }

    #[test]
    fn native_unicode_string_counts_units() {
        let storage = StringStorage::empty();
        let mut data = (0x8000_0000u32 | 2).to_le_bytes().to_vec();
        data.extend_from_slice(&[0x41, 0x00, 0x42, 0x00]);
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(
            stream.native_unicode_string().unwrap().as_deref(),
            Some("AB")
        );
    }
}
