//! Raw records for the communication side: parameters, diagnostic services
//! and their primitives, requests and responses, and the measurement tables
//! hanging off the read-data-by-identifier service.

use crate::error::{semantic, FormatError, Result};
use crate::object::common::{
    read_bytefield, read_named_reference_collection, read_named_references,
    AttributedReference, DiagComReference, McdValue, NamedReference, Reference,
};
use crate::object::dop::expect_absent;
use crate::object::enums::{
    AddressingMode, ParameterType, RepetitionMode, ResponseType, RuntimeMode, TransmissionMode,
    UnitGroupCategory,
};
use crate::object::{read_object_if_exists, RawObject};
use crate::stream::{hex_string, ObjectStream};

// ─────────────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_PARAMETER` / `MCD_DB_PARAMETER_SIMPLE`: one positional parameter
/// of a request, response or structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRaw {
    pub description: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub some_id: Option<String>,
    pub long_name_id: Option<String>,
    pub unique_object_id: Option<String>,
    pub bit_position: u8,
    pub byte_position: u32,
    pub default_mcd_value: Option<McdValue>,
    pub display_level: u32,
    pub semantic: Option<String>,
    pub sys_param: Option<String>,
    pub mcd_parameter_type: ParameterType,
    pub layer_id: Option<u8>,
    pub diag_coded_type: Option<Box<RawObject>>,
    pub db_object_ref: Option<Reference>,
    pub is_byte_pos_available: bool,
    pub is_protocol_parameter: bool,
}

impl ParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ParameterRaw> {
        let description = stream.unicode_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let short_name = stream.ascii_string()?.0;
        let some_id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        let unique_object_id = stream.ascii_string()?.0;

        let bit_position = stream.u8()?;
        let byte_position = stream.u32_le()?;

        let flags = stream.u8()?;

        let default_mcd_value = if flags & (1 << 0) != 0 {
            McdValue::read(stream)?
        } else {
            None
        };

        let display_level = stream.u32_le()?;

        let semantic = if flags & (1 << 1) != 0 {
            stream.ascii_string()?.0
        } else {
            None
        };

        let sys_param = stream.ascii_string()?.0;

        let mcd_parameter_type = ParameterType::from_raw(0x7000 + stream.u8()? as u16)?;

        let layer_id = match stream.u8()? {
            0xFF => None,
            id => Some(id),
        };

        let diag_coded_type = if flags & (1 << 2) != 0 {
            read_object_if_exists(stream)?.map(Box::new)
        } else {
            None
        };

        let db_object_ref = if flags & (1 << 3) != 0 {
            Some(Reference::read(stream, false, false)?)
        } else {
            None
        };

        if flags & (1 << 4) != 0 {
            return Err(semantic!("parameter flag 1<<4 set"));
        }
        let is_byte_pos_available = flags & (1 << 5) != 0;
        if flags & (1 << 6) != 0 {
            return Err(semantic!("parameter flag 1<<6 set"));
        }
        let is_protocol_parameter = flags & (1 << 7) != 0;

        if mcd_parameter_type == ParameterType::NrcConst {
            return Err(semantic!("parameter is NRC-CONST"));
        }

        Ok(ParameterRaw {
            description,
            long_name,
            short_name,
            some_id,
            long_name_id,
            unique_object_id,
            bit_position,
            byte_position,
            default_mcd_value,
            display_level,
            semantic,
            sys_param,
            mcd_parameter_type,
            layer_id,
            diag_coded_type,
            db_object_ref,
            is_byte_pos_available,
            is_protocol_parameter,
        })
    }
}

/// `MCD_DB_MATCHING_REQUEST_PARAMETER`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingRequestParameterRaw {
    pub parameter: ParameterRaw,
    pub request_byte_position: u32,
    pub byte_length: u32,
}

impl MatchingRequestParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<MatchingRequestParameterRaw> {
        Ok(MatchingRequestParameterRaw {
            parameter: ParameterRaw::read(stream)?,
            request_byte_position: stream.u32_le()?,
            byte_length: stream.u32_le()?,
        })
    }
}

/// `MCD_DB_MATCHING_PARAMETER`: expected response value for variant
/// identification.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingParameterRaw {
    pub diag_com_primitive_ref: DiagComReference,
    pub response_parameter_short_name_path: Option<String>,
    pub response_parameter_name: Option<String>,
    pub expected_value_string: Option<String>,
}

impl MatchingParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<MatchingParameterRaw> {
        let diag_com_primitive_ref = DiagComReference::read(stream)?;
        let (mut path, mut name) = (None, None);
        if stream.u8()? != 0 {
            path = stream.ascii_string()?.0;
        } else {
            name = stream.ascii_string()?.0;
        }
        Ok(MatchingParameterRaw {
            diag_com_primitive_ref,
            response_parameter_short_name_path: path,
            response_parameter_name: name,
            expected_value_string: stream.unicode_string()?.0,
        })
    }
}

/// `MCD_DB_PROTOCOL_PARAMETER`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolParameterRaw {
    pub parameter: ParameterRaw,
    pub protocol_parameter_class: u16,
    pub protocol_parameter_type: u16,
    pub parameters: Option<Box<RawObject>>,
    pub protocol_stack_short_name: Option<String>,
    pub protocol_short_name: Option<String>,
    pub protocol_parameter_usage: u16,
}

impl ProtocolParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ProtocolParameterRaw> {
        Ok(ProtocolParameterRaw {
            parameter: ParameterRaw::read(stream)?,
            protocol_parameter_class: stream.u16_le()?,
            protocol_parameter_type: stream.u16_le()?,
            parameters: read_object_if_exists(stream)?.map(Box::new),
            protocol_stack_short_name: stream.ascii_string()?.0,
            protocol_short_name: stream.ascii_string()?.0,
            protocol_parameter_usage: stream.u16_le()?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diag-com primitives and services
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_DIAG_COM_PRIMITIVE` layout, embedded at the tail of services and
/// jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagComPrimitive {
    pub id: Option<String>,
    pub long_name_id: Option<String>,
    pub unique_object_id: Option<String>,
    pub description: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub request_ref: Option<Reference>,
    pub positive_response_ref_collection: Vec<NamedReference<Reference>>,
    pub negative_response_ref_collection: Vec<NamedReference<Reference>>,
    pub functional_class_ref_collection: Vec<NamedReference<Reference>>,
    pub semantic: Option<String>,
    pub transmission_mode: TransmissionMode,
    pub is_api_executable: bool,
    pub is_no_operation: bool,
    pub diagnostic_class: u8,
    pub ecu_state_transition_ref_collection: Vec<NamedReference<Reference>>,
    pub ecu_state_ref_collection: Vec<NamedReference<Reference>>,
    pub suppress_positive_response_bytes: Option<Vec<u8>>,
    pub positive_response_suppression_parameter: Option<String>,
}

impl DiagComPrimitive {
    pub fn read(stream: &mut ObjectStream) -> Result<DiagComPrimitive> {
        let id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        let unique_object_id = stream.ascii_string()?.0;
        let description = stream.unicode_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let short_name = stream.ascii_string()?.0;

        let request_ref = if stream.u8()? != 0 {
            Some(Reference::read(stream, false, false)?)
        } else {
            None
        };

        let positive_response_ref_collection = read_named_references(stream)?;
        let negative_response_ref_collection = read_named_references(stream)?;
        let functional_class_ref_collection = read_named_references(stream)?;

        let semantic = stream.ascii_string()?.0;
        let transmission_mode = TransmissionMode::from_raw(stream.u16_le()?)?;
        let is_api_executable = stream.u8()? != 0;
        let is_no_operation = stream.u8()? != 0;
        let diagnostic_class = stream.u8()?;

        let ecu_state_transition_ref_collection = read_named_references(stream)?;
        let ecu_state_ref_collection = read_named_references(stream)?;

        let mut suppress_positive_response_bytes = None;
        let mut positive_response_suppression_parameter = None;
        if stream.u8()? != 0 {
            suppress_positive_response_bytes = Some(read_bytefield(stream)?);
            let _has_short_name_path = stream.u8()? != 0;
            positive_response_suppression_parameter = stream.ascii_string()?.0;
        }

        Ok(DiagComPrimitive {
            id,
            long_name_id,
            unique_object_id,
            description,
            long_name,
            short_name,
            request_ref,
            positive_response_ref_collection,
            negative_response_ref_collection,
            functional_class_ref_collection,
            semantic,
            transmission_mode,
            is_api_executable,
            is_no_operation,
            diagnostic_class,
            ecu_state_transition_ref_collection,
            ecu_state_ref_collection,
            suppress_positive_response_bytes,
            positive_response_suppression_parameter,
        })
    }
}

/// `MCD_DB_DATA_PRIMITIVE` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPrimitive {
    pub access_level: Option<Box<RawObject>>,
    pub audience_state: Option<Box<RawObject>>,
    pub repetition_mode: RepetitionMode,
    pub related_data_primitives: Vec<NamedReference<DiagComReference>>,
    pub disabled_additional_audiences: Option<Vec<NamedReference<Reference>>>,
    pub enabled_additional_audiences: Option<Vec<NamedReference<Reference>>>,
    pub special_data_group_refs: Option<Vec<u32>>,
    pub diag_com_primitive: DiagComPrimitive,
}

impl DataPrimitive {
    pub fn read(stream: &mut ObjectStream) -> Result<DataPrimitive> {
        let access_level = read_object_if_exists(stream)?.map(Box::new);
        let audience_state = read_object_if_exists(stream)?.map(Box::new);
        let repetition_mode = RepetitionMode::from_raw(0x6600 + stream.u8()? as u16)?;
        let related_data_primitives =
            read_named_reference_collection(stream, DiagComReference::read)?;

        let status = stream.u8()?;
        let disabled_additional_audiences = if status & 1 != 0 {
            Some(read_named_references(stream)?)
        } else {
            None
        };
        let enabled_additional_audiences = if status & 2 != 0 {
            Some(read_named_references(stream)?)
        } else {
            None
        };
        let special_data_group_refs = if status & 4 != 0 {
            Some(crate::object::common::read_sdg_reference_collection(stream)?)
        } else {
            None
        };

        Ok(DataPrimitive {
            access_level,
            audience_state,
            repetition_mode,
            related_data_primitives,
            disabled_additional_audiences,
            enabled_additional_audiences,
            special_data_group_refs,
            diag_com_primitive: DiagComPrimitive::read(stream)?,
        })
    }
}

/// `MCD_DB_DIAG_SERVICE` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagService {
    pub items: Vec<(Option<String>, Option<RawObject>)>,
    pub runtime_mode: RuntimeMode,
    pub is_multiple: bool,
    pub data_primitive: DataPrimitive,
}

impl DiagService {
    pub fn read(stream: &mut ObjectStream) -> Result<DiagService> {
        let mut items = Vec::new();
        for _ in 0..stream.u16_le()? {
            let name = stream.ascii_string()?.0;
            let service_protocol_parameters = read_object_if_exists(stream)?;
            items.push((name, service_protocol_parameters));
        }
        Ok(DiagService {
            items,
            runtime_mode: RuntimeMode::from_raw(stream.u16_le()?)?,
            is_multiple: stream.u8()? != 0,
            data_primitive: DataPrimitive::read(stream)?,
        })
    }
}

/// `MCD_DB_SERVICE`: addressing mode plus the diag-service layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRaw {
    pub addressing_mode: AddressingMode,
    pub diag_service: DiagService,
}

impl ServiceRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ServiceRaw> {
        Ok(ServiceRaw {
            addressing_mode: AddressingMode::from_raw(0x6000 + stream.u8()? as u16)?,
            diag_service: DiagService::read(stream)?,
        })
    }
}

/// `MCD_DB_JOB`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRaw {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub db_code_informations: Option<Box<RawObject>>,
    pub is_reduced_result_enabled: bool,
    pub data_primitive: DataPrimitive,
}

impl JobRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<JobRaw> {
        Ok(JobRaw {
            major: stream.u32_le()?,
            minor: stream.u32_le()?,
            revision: stream.u32_le()?,
            db_code_informations: read_object_if_exists(stream)?.map(Box::new),
            is_reduced_result_enabled: stream.u8()? != 0,
            data_primitive: DataPrimitive::read(stream)?,
        })
    }
}

/// `MCD_DB_STARTCOMMUNICATION`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartCommunicationRaw {
    pub diag_com_primitive: DiagComPrimitive,
    pub service_protocol_parameters: Vec<Option<String>>,
}

impl StartCommunicationRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<StartCommunicationRaw> {
        let diag_com_primitive = DiagComPrimitive::read(stream)?;
        let mut service_protocol_parameters = Vec::new();
        for _ in 0..stream.u16_le()? {
            service_protocol_parameters.push(stream.ascii_string()?.0);
        }
        Ok(StartCommunicationRaw {
            diag_com_primitive,
            service_protocol_parameters,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests and responses
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_REQUEST`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRaw {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub long_name_id: Option<String>,
    pub request_parameters: Option<Vec<Option<RawObject>>>,
}

impl RequestRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<RequestRaw> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        let id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;

        let request_parameters = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_collection()?),
            None => None,
        };

        if stream.u8()? != 0 {
            return Err(semantic!("request carries special data group refs"));
        }
        Ok(RequestRaw {
            short_name,
            long_name,
            description,
            id,
            long_name_id,
            request_parameters,
        })
    }
}

/// `MCD_DB_RESPONSE`: request layout plus the response kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRaw {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub long_name_id: Option<String>,
    pub response_type: ResponseType,
    pub response_parameters: Option<Vec<Option<RawObject>>>,
}

impl ResponseRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ResponseRaw> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        let id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;

        let response_type = ResponseType::from_raw(stream.u16_le()?)?;
        let response_parameters = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_collection()?),
            None => None,
        };

        if stream.u8()? != 0 {
            return Err(semantic!("response carries special data group refs"));
        }
        Ok(ResponseRaw {
            short_name,
            long_name,
            description,
            id,
            long_name_id,
            response_type,
            response_parameters,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Measurement tables
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a table's key map: a Unicode key naming a table-row
/// parameter reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TableKeyEntry {
    pub map_key: Option<String>,
    pub object_id: Option<String>,
    pub pool_id: Option<String>,
    pub short_name: Option<String>,
}

/// `MCD_DB_TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRaw {
    pub some_id: Option<String>,
    pub object_id: Option<String>,
    pub description: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub table_key_map: Vec<TableKeyEntry>,
    pub semantic: Option<String>,
    pub diag_com_primitives_refs: Vec<NamedReference<DiagComReference>>,
    pub dop_simple_ref: Option<Reference>,
}

impl TableRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<TableRaw> {
        expect_absent(stream.ascii_string()?.0)?;
        let some_id = stream.ascii_string()?.0;
        let object_id = stream.ascii_string()?.0;
        let description = stream.unicode_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let short_name = stream.ascii_string()?.0;

        let mut table_key_map = Vec::new();
        for _ in 0..stream.u32_le()? {
            let map_key = stream.unicode_string()?.0;
            let object_id = stream.ascii_string()?.0;
            let pool_id = stream.ascii_string()?.0;
            let short_name = stream.ascii_string()?.0;
            table_key_map.push(TableKeyEntry {
                map_key,
                object_id,
                pool_id,
                short_name,
            });
        }

        let semantic = stream.ascii_string()?.0;
        let diag_com_primitives_refs =
            read_named_reference_collection(stream, DiagComReference::read)?;

        let dop_simple_ref = if stream.u8()? != 0 {
            Some(Reference::read(stream, false, false)?)
        } else {
            None
        };

        if stream.u8()? != 0 {
            return Err(semantic!("table carries special data group refs"));
        }

        Ok(TableRaw {
            some_id,
            object_id,
            description,
            long_name,
            short_name,
            table_key_map,
            semantic,
            diag_com_primitives_refs,
            dop_simple_ref,
        })
    }
}

/// Fixed named-stream tails of a table parameter: an `A` stream (api
/// executable) alone, or `A` followed by a `B` stream (precondition state
/// references, always empty).
const TABLE_PARAMETER_TAIL_AB: [u8; 17] = [
    0x23, 0x3E, 0x00, 0x41, 0x01, 0x23, 0x3E, 0x01, 0x23, 0x3C, 0x00, 0x42, 0x00, 0x00, 0x23,
    0x3E, 0x01,
];
const TABLE_PARAMETER_TAIL_A: [u8; 8] = [0x23, 0x3E, 0x00, 0x41, 0x01, 0x23, 0x3E, 0x01];

/// `MCD_DB_TABLE_PARAMETER`: one table row, keyed by the measurement's long
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct TableParameterRaw {
    pub key: Option<String>,
    pub audience_state: Option<Box<RawObject>>,
    pub parameter: ParameterRaw,
    pub is_api_executable: bool,
}

impl TableParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<TableParameterRaw> {
        let key = stream.unicode_string()?.0;
        let audience_state = read_object_if_exists(stream)?.map(Box::new);

        if stream.u8()? != 0 {
            return Err(semantic!("table parameter has disabled additional audiences"));
        }
        if stream.u8()? != 0 {
            return Err(semantic!("table parameter has enabled additional audiences"));
        }

        let parameter = ParameterRaw::read(stream)?;

        // The remaining named streams always carry the same byte sequences;
        // anything else means the row layout is not understood.
        match stream.remaining() {
            20 => {
                let tail = stream.read(TABLE_PARAMETER_TAIL_AB.len())?;
                if tail != TABLE_PARAMETER_TAIL_AB {
                    return Err(semantic!(
                        "unexpected table parameter named streams: {}",
                        hex_string(tail)
                    ));
                }
            }
            11 => {
                let tail = stream.read(TABLE_PARAMETER_TAIL_A.len())?;
                if tail != TABLE_PARAMETER_TAIL_A {
                    return Err(semantic!(
                        "unexpected table parameter named streams: {}",
                        hex_string(tail)
                    ));
                }
            }
            other => {
                return Err(FormatError::StreamOverrun {
                    wanted: 11,
                    available: other,
                }
                .into())
            }
        }

        Ok(TableParameterRaw {
            key,
            audience_state,
            parameter,
            is_api_executable: true,
        })
    }
}

/// `MCD_DB_PARAMETER_TABLE_KEY`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableKeyParameterRaw {
    pub parameter: ParameterRaw,
    pub table: Option<Box<RawObject>>,
    pub table_ref: Option<AttributedReference>,
    pub is_table_row_reference: bool,
    pub key_string: Option<String>,
}

impl TableKeyParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<TableKeyParameterRaw> {
        let parameter = ParameterRaw::read(stream)?;
        let table = read_object_if_exists(stream)?.map(Box::new);
        let table_ref = if table.is_none() {
            Some(AttributedReference::read(stream)?)
        } else {
            None
        };
        Ok(TableKeyParameterRaw {
            parameter,
            table,
            table_ref,
            is_table_row_reference: stream.u8()? != 0,
            key_string: stream.ascii_string()?.0,
        })
    }
}

/// `MCD_DB_PARAMETER_TABLESTRUCT`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructParameterRaw {
    pub parameter: ParameterRaw,
    pub key_param_short_name: Option<String>,
    pub table_ref: AttributedReference,
}

impl TableStructParameterRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<TableStructParameterRaw> {
        Ok(TableStructParameterRaw {
            parameter: ParameterRaw::read(stream)?,
            key_param_short_name: stream.ascii_string()?.0,
            table_ref: AttributedReference::read(stream)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Functional classes and unit groups
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_FUNCTIONAL_CLASS`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalClassRaw {
    pub description: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub data_primitive_refs: Vec<NamedReference<DiagComReference>>,
}

impl FunctionalClassRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<FunctionalClassRaw> {
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        Ok(FunctionalClassRaw {
            description: stream.unicode_string()?.0,
            long_name: stream.unicode_string()?.0,
            short_name: stream.ascii_string()?.0,
            data_primitive_refs: read_named_reference_collection(stream, DiagComReference::read)?,
        })
    }
}

/// `MCD_DB_UNIT_GROUP`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitGroupRaw {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub category: UnitGroupCategory,
    pub ref_collection: Vec<NamedReference<Reference>>,
}

impl UnitGroupRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<UnitGroupRaw> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        Ok(UnitGroupRaw {
            short_name,
            long_name,
            description,
            category: UnitGroupCategory::from_raw(stream.u16_le()?)?,
            ref_collection: read_named_references(stream)?,
        })
    }
}

/// `MCD_DB_ENV_DATA_DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvDataDescRaw {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub env_data_param_map: Vec<(u32, Option<String>)>,
    pub all_value_env_data_param: Option<Box<RawObject>>,
    pub env_data_params: Vec<EnvDataParam>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvDataParam {
    pub name: Option<String>,
    pub param: Option<Box<RawObject>>,
    pub values: Vec<u32>,
}

impl EnvDataDescRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<EnvDataDescRaw> {
        if let Some(s1) = stream.unicode_string()?.0 {
            return Err(semantic!("unexpected string present: \"{s1}\""));
        }
        let long_name = stream.unicode_string()?.0;
        let short_name = stream.ascii_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;

        let mut env_data_param_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            let key = stream.u32_le()?;
            let name = stream.ascii_string()?.0;
            env_data_param_map.push((key, name));
        }

        let all_value_env_data_param = if stream.u8()? != 0 {
            read_object_if_exists(stream)?.map(Box::new)
        } else {
            None
        };

        let mut env_data_params = Vec::new();
        for _ in 0..stream.u16_le()? {
            let name = stream.ascii_string()?.0;
            let param = read_object_if_exists(stream)?.map(Box::new);
            let mut values = Vec::new();
            for _ in 0..stream.u32_le()? {
                values.push(stream.u32_le()?);
            }
            env_data_params.push(EnvDataParam {
                name,
                param,
                values,
            });
        }

        Ok(EnvDataDescRaw {
            long_name,
            short_name,
            env_data_param_map,
            all_value_env_data_param,
            env_data_params,
        })
    }
}

/// `DB_COM_PARAM_SPEC`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComParamSpecRaw {
    pub protocol_stack_map: Vec<(Option<String>, Vec<Reference>)>,
}

impl ComParamSpecRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ComParamSpecRaw> {
        let count = stream.u16_le()?;
        let mut protocol_stack_map = Vec::new();
        for _ in 0..count {
            let name = stream.ascii_string()?.0;
            let mut refs = Vec::new();
            for _ in 0..stream.u16_le()? {
                refs.push(Reference::read(stream, false, false)?);
            }
            protocol_stack_map.push((name, refs));
        }
        Ok(ComParamSpecRaw {
            protocol_stack_map,
        })
    }
}
