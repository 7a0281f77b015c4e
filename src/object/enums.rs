//! Static enums decoded from the object streams, with their wire values.
//!
//! Each `from_raw` mirrors one converter table of the database kernel;
//! unrecognized values are `FormatError::UnknownEnumValue` carrying the enum
//! name and the offending raw value.

use std::fmt;

use crate::error::{FormatError, Result};

fn unknown(name: &'static str, value: u32) -> crate::error::Error {
    FormatError::UnknownEnumValue { name, value }.into()
}

// ─────────────────────────────────────────────────────────────────────────────
// Layer / service enums
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    EcuBaseVariant,
    EcuVariant,
    FunctionalGroup,
    MultipleEcuJob,
    Protocol,
}

impl LocationType {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x0101 => LocationType::EcuBaseVariant,
            0x0102 => LocationType::EcuVariant,
            0x0103 => LocationType::FunctionalGroup,
            0x0104 => LocationType::MultipleEcuJob,
            0x0105 => LocationType::Protocol,
            other => return Err(unknown("MCDLocationType", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Value,
    Reserved,
    CodedConst,
    PhysConst,
    LengthKey,
    MatchingRequestParam,
    System,
    Dynamic,
    TableKey,
    TableStruct,
    TableEntry,
    Generated,
    NrcConst,
}

impl ParameterType {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x7001 => ParameterType::Value,
            0x7002 => ParameterType::Reserved,
            0x7003 => ParameterType::CodedConst,
            0x7004 => ParameterType::PhysConst,
            0x7005 => ParameterType::LengthKey,
            0x7006 => ParameterType::MatchingRequestParam,
            0x7007 => ParameterType::System,
            0x7008 => ParameterType::Dynamic,
            0x7009 => ParameterType::TableKey,
            0x7010 => ParameterType::TableStruct,
            0x7011 => ParameterType::TableEntry,
            0x7012 => ParameterType::Generated,
            0x7013 => ParameterType::NrcConst,
            other => return Err(unknown("MCDParameterType", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionMode {
    Single,
    Repeated,
}

impl RepetitionMode {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6601 => RepetitionMode::Single,
            0x6602 => RepetitionMode::Repeated,
            other => return Err(unknown("MCDRepetitionMode", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Undefined,
    Physical,
    Functional,
    FunctionalOrPhysical,
}

impl AddressingMode {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6001 => AddressingMode::Undefined,
            0x6002 => AddressingMode::Physical,
            0x6003 => AddressingMode::Functional,
            0x6004 => AddressingMode::FunctionalOrPhysical,
            other => return Err(unknown("MCDAddressingMode", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    NonCyclic,
    Cyclic,
}

impl RuntimeMode {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6901 => RuntimeMode::NonCyclic,
            0x6902 => RuntimeMode::Cyclic,
            other => return Err(unknown("MCDRuntimeMode", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionMode {
    NoTransmission,
    Receive,
    Send,
    SendAndReceive,
    SendOrReceive,
}

impl TransmissionMode {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6A01 => TransmissionMode::NoTransmission,
            0x6A02 => TransmissionMode::Receive,
            0x6A03 => TransmissionMode::Send,
            0x6A04 => TransmissionMode::SendAndReceive,
            0x6A05 => TransmissionMode::SendOrReceive,
            other => return Err(unknown("MCDTransmissionMode", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Positive,
    LocalNegative,
    GlobalNegative,
}

impl ResponseType {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6F01 => ResponseType::Positive,
            0x6F02 => ResponseType::LocalNegative,
            0x6F03 => ResponseType::GlobalNegative,
            other => return Err(unknown("MCDResponseType", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Transparent,
    Visible,
    NoGateway,
}

impl GatewayMode {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6E01 => GatewayMode::Transparent,
            0x6E02 => GatewayMode::Visible,
            0x6E03 => GatewayMode::NoGateway,
            other => return Err(unknown("MCDGatewayMode", other as u32)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitGroupCategory {
    Country,
    EquivalentUnits,
}

impl UnitGroupCategory {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x0F00 => UnitGroupCategory::Country,
            0x0F01 => UnitGroupCategory::EquivalentUnits,
            other => return Err(unknown("MCDUnitGroupCategory", other as u32)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Limits and scale constraints
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Open,
    Closed,
    Infinite,
}

impl LimitKind {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x6D01 => LimitKind::Open,
            0x6D02 => LimitKind::Closed,
            0x6D03 => LimitKind::Infinite,
            other => return Err(unknown("MCDLimitType", other as u32)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LimitKind::Open => "OPEN",
            LimitKind::Closed => "CLOSED",
            LimitKind::Infinite => "INFINITE",
        }
    }
}

/// Validity of a scale-constraint sub-interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    NotDefined,
    NotAvailable,
    NotValid,
    NotInitialized,
    CodedToPhysicalFailed,
}

impl Validity {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x0602 => Validity::Valid,
            0x0603 => Validity::NotDefined,
            0x0604 => Validity::NotAvailable,
            0x0605 => Validity::NotValid,
            0x0606 => Validity::NotInitialized,
            0x0607 => Validity::CodedToPhysicalFailed,
            other => return Err(unknown("MCDRangeInfo", other as u32)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Validity::Valid => "VALID",
            Validity::NotDefined => "NOT-DEFINED",
            Validity::NotAvailable => "NOT-AVAILABLE",
            Validity::NotValid => "NOT-VALID",
            Validity::NotInitialized => "NOT-INITIALIZED",
            Validity::CodedToPhysicalFailed => "CODED-TO-PHYSICAL-FAILED",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DOP enums
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompuCategory {
    Identical,
    Linear,
    ScaleLinear,
    Texttable,
    Compucode,
    TabIntp,
    RatFunc,
    ScaleRatFunc,
}

impl CompuCategory {
    pub fn from_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => CompuCategory::Identical,
            1 => CompuCategory::Linear,
            2 => CompuCategory::ScaleLinear,
            3 => CompuCategory::Texttable,
            4 => CompuCategory::Compucode,
            5 => CompuCategory::TabIntp,
            6 => CompuCategory::RatFunc,
            7 => CompuCategory::ScaleRatFunc,
            other => return Err(unknown("EDbCompuCategory", other as u32)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompuCategory::Identical => "IDENTICAL",
            CompuCategory::Linear => "LINEAR",
            CompuCategory::ScaleLinear => "SCALE-LINEAR",
            CompuCategory::Texttable => "TEXTTABLE",
            CompuCategory::Compucode => "COMPUCODE",
            CompuCategory::TabIntp => "TAB-INTP",
            CompuCategory::RatFunc => "RAT-FUNC",
            CompuCategory::ScaleRatFunc => "SCALE-RAT-FUNC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagCodedKind {
    LeadingLengthInfo,
    MinMaxLength,
    StandardLength,
    ParamLengthInfo,
}

impl DiagCodedKind {
    pub fn from_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => DiagCodedKind::LeadingLengthInfo,
            1 => DiagCodedKind::MinMaxLength,
            2 => DiagCodedKind::StandardLength,
            3 => DiagCodedKind::ParamLengthInfo,
            other => return Err(unknown("EDbDiagCodedType", other as u32)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiagCodedKind::LeadingLengthInfo => "LEADING-LENGTH-INFO-TYPE",
            DiagCodedKind::MinMaxLength => "MIN-MAX-LENGTH-TYPE",
            DiagCodedKind::StandardLength => "STANDARD-LENGTH-TYPE",
            DiagCodedKind::ParamLengthInfo => "PARAM-LENGTH-INFO-TYPE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    EndOfPdu,
    Zero,
    HexFf,
}

impl Termination {
    pub fn from_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Termination::EndOfPdu,
            1 => Termination::Zero,
            2 => Termination::HexFf,
            other => return Err(unknown("EDbTermination", other as u32)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Termination::EndOfPdu => "END-OF-PDU",
            Termination::Zero => "ZERO",
            Termination::HexFf => "HEX-FF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    BcdP,
    BcdUp,
    OnesComplement,
    TwosComplement,
    SignMagnitude,
    Utf8,
    Ucs2,
    Ieee754,
    Iso8859_1,
    Iso8859_2,
    Windows1252,
    None,
}

impl Encoding {
    pub fn from_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Encoding::BcdP,
            1 => Encoding::BcdUp,
            2 => Encoding::OnesComplement,
            3 => Encoding::TwosComplement,
            4 => Encoding::SignMagnitude,
            5 => Encoding::Utf8,
            6 => Encoding::Ucs2,
            7 => Encoding::Ieee754,
            8 => Encoding::Iso8859_1,
            9 => Encoding::Iso8859_2,
            10 => Encoding::Windows1252,
            11 => Encoding::None,
            other => return Err(unknown("EDbEncoding", other as u32)),
        })
    }

    /// Short ODX name, as written in description dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::BcdP => "BCD-P",
            Encoding::BcdUp => "BCD-UP",
            Encoding::OnesComplement => "1C",
            Encoding::TwosComplement => "2C",
            Encoding::SignMagnitude => "SM",
            Encoding::Utf8 => "UTF-8",
            Encoding::Ucs2 => "UCS-2",
            Encoding::Ieee754 => "IEEE754",
            Encoding::Iso8859_1 => "ISO-8859-1",
            Encoding::Iso8859_2 => "ISO-8859-2",
            Encoding::Windows1252 => "WINDOWS-1252",
            Encoding::None => "NONE",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data types
// ─────────────────────────────────────────────────────────────────────────────

/// The kernel-level data type vocabulary used by values, limits and types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McdDataType {
    AsciiString,
    BitField,
    ByteField,
    Float32,
    Float64,
    Int16,
    Int32,
    Int64,
    Int8,
    UInt16,
    UInt32,
    UInt64,
    UInt8,
    Unicode2String,
    Field,
    Multiplexer,
    Structure,
    Texttable,
    Boolean,
    Dtc,
    EnvData,
    EndOfPdu,
    Table,
    EnvDataDesc,
    Key,
    LengthKey,
    TableRow,
    StructField,
    NoType,
}

impl McdDataType {
    pub fn from_raw(value: u16) -> Result<Self> {
        Ok(match value {
            0x0001 => McdDataType::AsciiString,
            0x0002 => McdDataType::BitField,
            0x0003 => McdDataType::ByteField,
            0x0004 => McdDataType::Float32,
            0x0005 => McdDataType::Float64,
            0x0006 => McdDataType::Int16,
            0x0007 => McdDataType::Int32,
            0x0008 => McdDataType::Int64,
            0x0009 => McdDataType::Int8,
            0x000A => McdDataType::UInt16,
            0x000B => McdDataType::UInt32,
            0x000C => McdDataType::UInt64,
            0x000D => McdDataType::UInt8,
            0x000E => McdDataType::Unicode2String,
            0x000F => McdDataType::Field,
            0x0010 => McdDataType::Multiplexer,
            0x0011 => McdDataType::Structure,
            0x0012 => McdDataType::Texttable,
            0x0013 => McdDataType::Boolean,
            0x0014 => McdDataType::Dtc,
            0x0015 => McdDataType::EnvData,
            0x0016 => McdDataType::EndOfPdu,
            0x0017 => McdDataType::Table,
            0x0018 => McdDataType::EnvDataDesc,
            0x0019 => McdDataType::Key,
            0x001A => McdDataType::LengthKey,
            0x001B => McdDataType::TableRow,
            0x001C => McdDataType::StructField,
            0x00FF => McdDataType::NoType,
            other => return Err(unknown("MCDDataType", other as u32)),
        })
    }

    /// Canonical `A_*` spelling, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            McdDataType::AsciiString => "A_ASCIISTRING",
            McdDataType::BitField => "A_BITFIELD",
            McdDataType::ByteField => "A_BYTEFIELD",
            McdDataType::Float32 => "A_FLOAT32",
            McdDataType::Float64 => "A_FLOAT64",
            McdDataType::Int16 => "A_INT16",
            McdDataType::Int32 => "A_INT32",
            McdDataType::Int64 => "A_INT64",
            McdDataType::Int8 => "A_INT8",
            McdDataType::UInt16 => "A_UINT16",
            McdDataType::UInt32 => "A_UINT32",
            McdDataType::UInt64 => "A_UINT64",
            McdDataType::UInt8 => "A_UINT8",
            McdDataType::Unicode2String => "A_UNICODE2STRING",
            McdDataType::Field => "FIELD",
            McdDataType::Multiplexer => "MULTIPLEXER",
            McdDataType::Structure => "STRUCTURE",
            McdDataType::Texttable => "TEXTTABLE",
            McdDataType::Boolean => "A_BOOLEAN",
            McdDataType::Dtc => "DTC",
            McdDataType::EnvData => "ENVDATA",
            McdDataType::EndOfPdu => "END_OF_PDU",
            McdDataType::Table => "TABLE",
            McdDataType::EnvDataDesc => "ENVDATADESC",
            McdDataType::Key => "KEY",
            McdDataType::LengthKey => "LENGTHKEY",
            McdDataType::TableRow => "TABLE_ROW",
            McdDataType::StructField => "STRUCT_FIELD",
            McdDataType::NoType => "NO_TYPE",
        }
    }

    /// Data type of an embedded MCDValue record. Values above 18 carry no
    /// type; a handful of in-range codes never appear in value records and
    /// are rejected.
    pub fn from_value_raw(value: u8) -> Result<Self> {
        if value > 18 {
            return Ok(McdDataType::NoType);
        }
        if matches!(value, 9 | 13 | 15..=18) {
            return Err(unknown("MCDValue data type", value as u32));
        }
        McdDataType::from_raw(value as u16)
    }
}

/// The `A_*` base types admissible for coded and physical DOP sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int32,
    UInt32,
    Float32,
    Float64,
    AsciiString,
    Utf8String,
    Unicode2String,
    ByteField,
    BitField,
}

impl BaseType {
    /// `EDbDataType` wire values (diag-coded side).
    pub fn from_db_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => BaseType::Int32,
            1 => BaseType::UInt32,
            2 => BaseType::Float32,
            3 => BaseType::Float64,
            4 => BaseType::AsciiString,
            5 => BaseType::Utf8String,
            6 => BaseType::Unicode2String,
            7 => BaseType::ByteField,
            8 => BaseType::BitField,
            other => return Err(unknown("EDbDataType", other as u32)),
        })
    }

    /// `EDbPhysicalDataType` wire values (physical side). The physical
    /// vocabulary is narrower; `4` maps onto the Unicode string type.
    pub fn from_physical_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => BaseType::Int32,
            1 => BaseType::UInt32,
            2 => BaseType::Float32,
            3 => BaseType::Float64,
            4 => BaseType::Unicode2String,
            5 => BaseType::ByteField,
            other => return Err(unknown("EDbPhysicalDataType", other as u32)),
        })
    }

    /// Kernel data type this base type surfaces as (UTF-8 strings surface as
    /// Unicode strings).
    pub fn as_mcd(&self) -> McdDataType {
        match self {
            BaseType::Int32 => McdDataType::Int32,
            BaseType::UInt32 => McdDataType::UInt32,
            BaseType::Float32 => McdDataType::Float32,
            BaseType::Float64 => McdDataType::Float64,
            BaseType::AsciiString => McdDataType::AsciiString,
            BaseType::Utf8String | BaseType::Unicode2String => McdDataType::Unicode2String,
            BaseType::ByteField => McdDataType::ByteField,
            BaseType::BitField => McdDataType::BitField,
        }
    }

    /// The base type as the kernel surfaces it: UTF-8 strings collapse onto
    /// the Unicode string type, everything else is unchanged.
    pub fn mcd_equivalent(&self) -> BaseType {
        match self {
            BaseType::Utf8String => BaseType::Unicode2String,
            other => *other,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            BaseType::AsciiString | BaseType::Utf8String | BaseType::Unicode2String
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BaseType::Float32 | BaseType::Float64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Int32 => "A_INT32",
            BaseType::UInt32 => "A_UINT32",
            BaseType::Float32 => "A_FLOAT32",
            BaseType::Float64 => "A_FLOAT64",
            BaseType::AsciiString => "A_ASCIISTRING",
            BaseType::Utf8String => "A_UTF8STRING",
            BaseType::Unicode2String => "A_UNICODE2STRING",
            BaseType::ByteField => "A_BYTEFIELD",
            BaseType::BitField => "A_BITFIELD",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default encoding admissible for a base type; used to cross-check the
/// encoding stored in a DIAG-CODED-TYPE record. The stored encoding must
/// already be one the base type supports; this never rewrites it.
pub fn check_encoding(base: BaseType, encoding: Encoding) -> Result<Encoding> {
    let normalized = match base {
        BaseType::Int32 => match encoding {
            Encoding::OnesComplement | Encoding::TwosComplement | Encoding::SignMagnitude => {
                encoding
            }
            _ => Encoding::TwosComplement,
        },
        BaseType::UInt32 | BaseType::ByteField => match encoding {
            Encoding::BcdP | Encoding::BcdUp => encoding,
            _ => Encoding::None,
        },
        BaseType::Float32 | BaseType::Float64 => match encoding {
            Encoding::Ieee754 => encoding,
            _ => Encoding::None,
        },
        BaseType::AsciiString => match encoding {
            Encoding::Iso8859_1 | Encoding::Iso8859_2 | Encoding::Windows1252 => encoding,
            _ => Encoding::Iso8859_1,
        },
        BaseType::Utf8String => Encoding::Utf8,
        BaseType::Unicode2String => Encoding::Ucs2,
        BaseType::BitField => Encoding::None,
    };
    if normalized != encoding {
        return Err(crate::error::semantic!(
            "encoding changed from {} to {} for type {}",
            encoding.name(),
            normalized.name(),
            base.name()
        ));
    }
    Ok(encoding)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub fn name(&self) -> &'static str {
        match self {
            Endianness::Big => "big",
            Endianness::Little => "little",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_data_type_exclusions() {
        assert!(McdDataType::from_value_raw(9).is_err());
        assert!(McdDataType::from_value_raw(13).is_err());
        assert!(McdDataType::from_value_raw(17).is_err());
        assert_eq!(McdDataType::from_value_raw(19).unwrap(), McdDataType::NoType);
        assert_eq!(McdDataType::from_value_raw(11).unwrap(), McdDataType::UInt32);
    }

    #[test]
    fn physical_type_maps_to_narrow_vocabulary() {
        assert_eq!(
            BaseType::from_physical_raw(4).unwrap(),
            BaseType::Unicode2String
        );
        assert!(BaseType::from_physical_raw(6).is_err());
    }

    #[test]
    fn encoding_check_accepts_stored_defaults() {
        assert!(check_encoding(BaseType::Int32, Encoding::TwosComplement).is_ok());
        assert!(check_encoding(BaseType::UInt32, Encoding::None).is_ok());
        assert!(check_encoding(BaseType::UInt32, Encoding::BcdP).is_ok());
        assert!(check_encoding(BaseType::Unicode2String, Encoding::Ucs2).is_ok());
    }

    #[test]
    fn encoding_check_rejects_mismatches() {
        assert!(check_encoding(BaseType::Int32, Encoding::Ieee754).is_err());
        assert!(check_encoding(BaseType::Float64, Encoding::Utf8).is_err());
        assert!(check_encoding(BaseType::Unicode2String, Encoding::Utf8).is_err());
    }
}
