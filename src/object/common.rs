//! Shared wire constructs used by many object loaders: references in their
//! several flavors, keyed reference maps, string vectors and embedded values.
//!
//! Hashed strings may fail to resolve (a hash that is absent from both string
//! tables reads as `None`); loaders keep the `Option` and let the consumers
//! decide which fields are mandatory.

use crate::error::{semantic, Result};
use crate::object::enums::McdDataType;
use crate::stream::ObjectStream;

/// Standard object reference: `(object_id, pool_id[, object_id2])`, each an
/// ASCII hash. When the pool id is absent the reference must be resolved
/// against the layer-data search list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reference {
    pub object_id: Option<String>,
    pub pool_id: Option<String>,
    pub object_id2: Option<String>,
    pub strings: Option<Vec<Option<String>>>,
}

impl Reference {
    /// The on-wire "standard" form: three hashes, optional attribute list.
    pub fn read(
        stream: &mut ObjectStream,
        third_string: bool,
        string_vector: bool,
    ) -> Result<Reference> {
        let object_id = stream.ascii_string()?.0;
        let pool_id = stream.ascii_string()?.0;
        let object_id2 = if third_string {
            stream.ascii_string()?.0
        } else {
            None
        };
        let strings = if string_vector {
            let count = stream.u8()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(stream.ascii_string()?.0);
            }
            Some(items)
        } else {
            None
        };
        Ok(Reference {
            object_id,
            pool_id,
            object_id2,
            strings,
        })
    }

    pub fn object_id(&self) -> Result<&str> {
        self.object_id
            .as_deref()
            .ok_or_else(|| semantic!("reference has no object id"))
    }
}

/// Reference carrying a counted list of attribute strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributedReference {
    pub object_id: Option<String>,
    pub pool_id: Option<String>,
    pub strings: Vec<Option<String>>,
}

impl AttributedReference {
    pub fn read(stream: &mut ObjectStream) -> Result<AttributedReference> {
        let object_id = stream.ascii_string()?.0;
        let pool_id = stream.ascii_string()?.0;
        let count = stream.u8()?;
        let mut strings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            strings.push(stream.ascii_string()?.0);
        }
        Ok(AttributedReference {
            object_id,
            pool_id,
            strings,
        })
    }

    pub fn as_reference(&self) -> Reference {
        Reference {
            object_id: self.object_id.clone(),
            pool_id: self.pool_id.clone(),
            object_id2: None,
            strings: None,
        }
    }
}

/// Reference used by diag-com maps: an attributed reference plus an object
/// kind discriminator and an optional string list.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagComReference {
    pub attrib_obj_ref: AttributedReference,
    pub number: u8,
    pub mcd_object_type: u16,
    pub strings: Option<Vec<Option<String>>>,
}

impl DiagComReference {
    pub fn read(stream: &mut ObjectStream) -> Result<DiagComReference> {
        let attrib_obj_ref = AttributedReference::read(stream)?;
        let number = stream.u8()?;
        let mcd_object_type = stream.u16_le()?;
        let strings = if stream.u8()? != 0 {
            Some(read_ascii_string_vector(stream)?)
        } else {
            None
        };
        Ok(DiagComReference {
            attrib_obj_ref,
            number,
            mcd_object_type,
            strings,
        })
    }
}

/// A reference prefixed with its display name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedReference<R> {
    pub name: Option<String>,
    pub reference: R,
}

pub fn read_named_reference<R>(
    stream: &mut ObjectStream,
    read_ref: impl Fn(&mut ObjectStream) -> Result<R>,
) -> Result<NamedReference<R>> {
    Ok(NamedReference {
        name: stream.ascii_string()?.0,
        reference: read_ref(stream)?,
    })
}

/// `u16` count of named references.
pub fn read_named_reference_collection<R>(
    stream: &mut ObjectStream,
    read_ref: impl Fn(&mut ObjectStream) -> Result<R>,
) -> Result<Vec<NamedReference<R>>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(read_named_reference(stream, &read_ref)?);
    }
    Ok(items)
}

/// Standard named-reference collection (two-hash references).
pub fn read_named_references(
    stream: &mut ObjectStream,
) -> Result<Vec<NamedReference<Reference>>> {
    read_named_reference_collection(stream, |s| Reference::read(s, false, false))
}

/// `u16`-counted vector of hashed ASCII strings.
pub fn read_ascii_string_vector(stream: &mut ObjectStream) -> Result<Vec<Option<String>>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(stream.ascii_string()?.0);
    }
    Ok(items)
}

/// Map from an ASCII key to a string vector.
pub fn read_string_vector_map(
    stream: &mut ObjectStream,
) -> Result<Vec<(Option<String>, Vec<Option<String>>)>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = stream.ascii_string()?.0;
        let strings = read_ascii_string_vector(stream)?;
        items.push((key, strings));
    }
    Ok(items)
}

/// Map from an ASCII key to a standard reference.
pub fn read_reference_map(
    stream: &mut ObjectStream,
    string_vector_in_reference: bool,
) -> Result<Vec<(Option<String>, Reference)>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = stream.ascii_string()?.0;
        let reference = Reference::read(stream, false, string_vector_in_reference)?;
        items.push((key, reference));
    }
    Ok(items)
}

/// Map from an ASCII key to a diag-com reference.
pub fn read_diag_com_reference_map(
    stream: &mut ObjectStream,
) -> Result<Vec<(Option<String>, DiagComReference)>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = stream.ascii_string()?.0;
        let reference = DiagComReference::read(stream)?;
        items.push((key, reference));
    }
    Ok(items)
}

/// Map from an ASCII key to a named reference.
pub fn read_named_reference_map(
    stream: &mut ObjectStream,
) -> Result<Vec<(Option<String>, NamedReference<Reference>)>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = stream.ascii_string()?.0;
        let reference = read_named_reference(stream, |s| Reference::read(s, false, false))?;
        items.push((key, reference));
    }
    Ok(items)
}

/// References to special data groups, stored as persistent object ids.
pub fn read_sdg_reference_collection(stream: &mut ObjectStream) -> Result<Vec<u32>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(stream.u32_le()?);
    }
    Ok(items)
}

/// Flag-guarded byte field with a `u32` length.
pub fn read_bytefield(stream: &mut ObjectStream) -> Result<Vec<u8>> {
    if stream.u8()? == 0 {
        return Ok(Vec::new());
    }
    let size = stream.u32_le()? as usize;
    Ok(stream.read(size)?.to_vec())
}

/// Embedded typed value. `NoType` records read as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum McdValue {
    AsciiString(Option<String>),
    Unicode2String(Option<String>),
    Float32(f32),
    Float64(f64),
    Int32(i32),
    UInt32(u32),
    ByteField(Vec<u8>),
    BitField(Vec<u8>),
}

impl McdValue {
    pub fn read(stream: &mut ObjectStream) -> Result<Option<McdValue>> {
        let data_type = McdDataType::from_value_raw(stream.u8()?)?;
        let value = match data_type {
            McdDataType::AsciiString => McdValue::AsciiString(stream.ascii_string()?.0),
            McdDataType::Unicode2String => McdValue::Unicode2String(stream.unicode_string()?.0),
            McdDataType::Float32 => McdValue::Float32(stream.f32_le()?),
            McdDataType::Float64 => McdValue::Float64(stream.f64_le()?),
            McdDataType::Int32 => McdValue::Int32(stream.i32_le()?),
            McdDataType::UInt32 => McdValue::UInt32(stream.u32_le()?),
            McdDataType::ByteField | McdDataType::BitField => {
                // Flag-guarded payload with a u16 length.
                let mut bytes = Vec::new();
                if stream.u8()? != 0 {
                    let size = stream.u16_le()? as usize;
                    bytes = stream.read(size)?.to_vec();
                }
                if data_type == McdDataType::ByteField {
                    McdValue::ByteField(bytes)
                } else {
                    McdValue::BitField(bytes)
                }
            }
            McdDataType::NoType => return Ok(None),
            other => {
                return Err(semantic!(
                    "unknown how to retrieve MCD value with type {other:?}"
                ))
            }
        };
        Ok(Some(value))
    }

    /// Kernel data type of the stored value.
    pub fn data_type(&self) -> McdDataType {
        match self {
            McdValue::AsciiString(_) => McdDataType::AsciiString,
            McdValue::Unicode2String(_) => McdDataType::Unicode2String,
            McdValue::Float32(_) => McdDataType::Float32,
            McdValue::Float64(_) => McdDataType::Float64,
            McdValue::Int32(_) => McdDataType::Int32,
            McdValue::UInt32(_) => McdDataType::UInt32,
            McdValue::ByteField(_) => McdDataType::ByteField,
            McdValue::BitField(_) => McdDataType::BitField,
        }
    }

    /// Numeric view, for limit comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            McdValue::Float32(v) => Some(*v as f64),
            McdValue::Float64(v) => Some(*v),
            McdValue::Int32(v) => Some(*v as f64),
            McdValue::UInt32(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            McdValue::AsciiString(s) | McdValue::Unicode2String(s) => s.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringStorage;

    #[test]
    fn mcd_value_uint32() {
        let storage = StringStorage::empty();
        let mut data = vec![11u8];
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(
            McdValue::read(&mut stream).unwrap(),
            Some(McdValue::UInt32(0xDEAD_BEEF))
        );
    }

    #[test]
    fn mcd_value_no_type_reads_as_none() {
        let storage = StringStorage::empty();
        let mut stream = ObjectStream::new(&[200u8], &storage);
        assert_eq!(McdValue::read(&mut stream).unwrap(), None);
    }

    #[test]
    fn mcd_value_rejects_excluded_types() {
        let storage = StringStorage::empty();
        let mut stream = ObjectStream::new(&[9u8], &storage);
        assert!(McdValue::read(&mut stream).is_err());
    }

    #[test]
    fn bytefield_value_with_payload() {
        let storage = StringStorage::empty();
        let mut data = vec![3u8, 1];
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&[0xAB, 0xCD]);
        let mut stream = ObjectStream::new(&data, &storage);
        assert_eq!(
            McdValue::read(&mut stream).unwrap(),
            Some(McdValue::ByteField(vec![0xAB, 0xCD]))
        );
    }

    #[test]
    fn reference_map_roundtrip_layout() {
        let mut storage = StringStorage::empty();
        storage.add_ascii("key");
        storage.add_ascii("obj");
        storage.add_ascii("pool.bv");
        let key = storage.hash_ascii("key");
        let obj = storage.hash_ascii("obj");
        let pool = storage.hash_ascii("pool.bv");

        let mut data = 1u16.to_le_bytes().to_vec();
        data.extend_from_slice(&key.to_le_bytes());
        data.extend_from_slice(&obj.to_le_bytes());
        data.extend_from_slice(&pool.to_le_bytes());

        let mut stream = ObjectStream::new(&data, &storage);
        let map = read_reference_map(&mut stream, false).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].0.as_deref(), Some("key"));
        assert_eq!(map[0].1.object_id.as_deref(), Some("obj"));
        assert_eq!(map[0].1.pool_id.as_deref(), Some("pool.bv"));
    }
}
