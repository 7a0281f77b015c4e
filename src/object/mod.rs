//! Raw object model: one tagged variant per supported on-disk object type.
//!
//! [`read_object`] is the single dispatch point: it reads the 16-bit type
//! tag and runs the matching loader. Tags present in the type table but
//! without a loader fail with `UnsupportedObjectType`; tags outside the
//! table fail with `UnknownObjectType`. Collection types (`*S` tags) read a
//! counted sequence of presence-flagged objects.

pub mod common;
pub mod dop;
pub mod enums;
pub mod layer;
pub mod service;
pub mod types;

use crate::error::{semantic, FormatError, Result};
use crate::stream::ObjectStream;
use crate::strings::StringStorage;

use dop::{
    CaseBase, CaseRaw, CompuBase, CompuMethod, CompuScaleRaw, ConstraintRaw, DiagCodedType,
    DiagTroubleCodeRaw, DopDtcRaw, DopSimpleBase, DynamicEndmarkerFieldRaw,
    DynamicLengthFieldRaw, EndOfPduFieldRaw, Interval, LimitRaw, MultiplexerRaw,
    PhysicalDimension, PhysicalType, RationalCoeffs, ScaleConstraintRaw, StaticFieldRaw,
    StructureRaw, SwitchKeyRaw, UnitRaw,
};
use layer::{
    AccessKey, Audience, CodeInformation, Ecu, EcuBaseVariant, EcuVariant, LayerData,
    LocationReferences, ProjectData, VehicleInfoData,
};
use service::{
    ComParamSpecRaw, EnvDataDescRaw, FunctionalClassRaw, JobRaw, MatchingParameterRaw,
    MatchingRequestParameterRaw, ParameterRaw, ProtocolParameterRaw, RequestRaw, ResponseRaw,
    ServiceRaw, StartCommunicationRaw, TableKeyParameterRaw, TableParameterRaw,
    TableRaw, TableStructParameterRaw, UnitGroupRaw,
};
use types::ObjectType;

/// A fully loaded raw object.
#[derive(Debug, Clone, PartialEq)]
pub enum RawObject {
    Limit(LimitRaw),
    Interval(Interval),
    ScaleConstraint(ScaleConstraintRaw),
    ScaleConstraints(Vec<ScaleConstraintRaw>),
    Constraint(ConstraintRaw),
    RationalCoeffs(RationalCoeffs),
    CompuScale(CompuScaleRaw),
    CompuScales(Vec<CompuScaleRaw>),
    CompuBase(CompuBase),
    CompuMethod(CompuMethod),
    DiagCodedType(DiagCodedType),
    PhysicalType(PhysicalType),
    DopSimpleBase(DopSimpleBase),
    Structure(StructureRaw),
    StaticField(StaticFieldRaw),
    DynamicLengthField(DynamicLengthFieldRaw),
    DynamicEndmarkerField(DynamicEndmarkerFieldRaw),
    EndOfPduField(EndOfPduFieldRaw),
    Multiplexer(MultiplexerRaw),
    SwitchKey(SwitchKeyRaw),
    Case(CaseRaw),
    Cases(Vec<CaseRaw>),
    DefaultCase(CaseBase),
    DopDtc(DopDtcRaw),
    DiagTroubleCode(DiagTroubleCodeRaw),
    Unit(UnitRaw),
    PhysicalDimension(PhysicalDimension),
    UnitGroup(UnitGroupRaw),
    LayerData(LayerData),
    ProjectData(ProjectData),
    VehicleInfoData(VehicleInfoData),
    AccessKey(AccessKey),
    Ecu(Ecu),
    EcuBaseVariant(EcuBaseVariant),
    EcuVariant(EcuVariant),
    LocationReferences(LocationReferences),
    Audience(Audience),
    CodeInformation(CodeInformation),
    Parameter(ParameterRaw),
    MatchingRequestParameter(MatchingRequestParameterRaw),
    MatchingParameter(MatchingParameterRaw),
    ProtocolParameter(ProtocolParameterRaw),
    Service(ServiceRaw),
    Job(JobRaw),
    StartCommunication(StartCommunicationRaw),
    Request(RequestRaw),
    Response(ResponseRaw),
    Table(TableRaw),
    TableParameter(TableParameterRaw),
    TableKeyParameter(TableKeyParameterRaw),
    TableStructParameter(TableStructParameterRaw),
    FunctionalClass(FunctionalClassRaw),
    EnvDataDesc(EnvDataDescRaw),
    ComParamSpec(ComParamSpecRaw),
    /// Generic counted collection of presence-flagged objects
    /// (`MCD_DB_PARAMETERS`, `*_RESPONSE_PARAMETERS`, ...).
    Collection(Vec<Option<RawObject>>),
}

/// Read the tagged object under the cursor.
pub fn read_object(stream: &mut ObjectStream) -> Result<RawObject> {
    let tag = stream.u16_le()?;
    let Some(ty) = ObjectType::from_u16(tag) else {
        return Err(FormatError::UnknownObjectType {
            tag,
            size: stream.remaining(),
        }
        .into());
    };

    Ok(match ty {
        ObjectType::DbLimit => RawObject::Limit(LimitRaw::read(stream)?),
        ObjectType::McdInterval => RawObject::Interval(Interval::read(stream)?),
        ObjectType::McdScaleConstraint | ObjectType::DbScaleConstraint => {
            RawObject::ScaleConstraint(ScaleConstraintRaw::read(stream)?)
        }
        ObjectType::McdScaleConstraints | ObjectType::DbScaleConstraints => {
            RawObject::ScaleConstraints(read_typed_collection(
                stream,
                RawObject::into_scale_constraint,
            )?)
        }
        ObjectType::McdConstraint
        | ObjectType::McdInternalConstraint
        | ObjectType::DbInternalConstraint => {
            RawObject::Constraint(ConstraintRaw::read(stream)?)
        }
        ObjectType::DbCompuRationalCoeffs => {
            RawObject::RationalCoeffs(RationalCoeffs::read(stream)?)
        }
        ObjectType::DbCompuScale => RawObject::CompuScale(CompuScaleRaw::read(stream)?),
        ObjectType::DbCompuScales => {
            RawObject::CompuScales(read_typed_collection(stream, RawObject::into_compu_scale)?)
        }
        ObjectType::DbCompuBase
        | ObjectType::DbCompuInternalToPhys
        | ObjectType::DbCompuPhysToInternal => RawObject::CompuBase(CompuBase::read(stream)?),
        ObjectType::DbCompuMethod => RawObject::CompuMethod(CompuMethod::read(stream)?),
        ObjectType::DbDiagCodedType => RawObject::DiagCodedType(DiagCodedType::read(stream)?),
        ObjectType::DbPhysicalType => RawObject::PhysicalType(PhysicalType::read(stream)?),
        ObjectType::DbDopSimpleBase => RawObject::DopSimpleBase(DopSimpleBase::read(stream)?),
        ObjectType::McdDbParameterStructure => RawObject::Structure(StructureRaw::read(stream)?),
        ObjectType::McdDbParameterStaticField => {
            RawObject::StaticField(StaticFieldRaw::read(stream)?)
        }
        ObjectType::McdDbParameterDynamicLengthField => {
            RawObject::DynamicLengthField(DynamicLengthFieldRaw::read(stream)?)
        }
        ObjectType::McdDbParameterDynamicEndmarkerField => {
            RawObject::DynamicEndmarkerField(DynamicEndmarkerFieldRaw::read(stream)?)
        }
        ObjectType::McdDbParameterEndOfPduField => {
            RawObject::EndOfPduField(EndOfPduFieldRaw::read(stream)?)
        }
        ObjectType::McdDbParameterMultiplexer => {
            RawObject::Multiplexer(MultiplexerRaw::read(stream)?)
        }
        ObjectType::DbSwitchKey => RawObject::SwitchKey(SwitchKeyRaw::read(stream)?),
        ObjectType::DbCase => RawObject::Case(CaseRaw::read(stream)?),
        ObjectType::DbCases => {
            RawObject::Cases(read_typed_collection(stream, RawObject::into_case)?)
        }
        ObjectType::DbDefaultCase => RawObject::DefaultCase(CaseBase::read(stream)?),
        ObjectType::DbDopDtc => RawObject::DopDtc(DopDtcRaw::read(stream)?),
        ObjectType::McdDbDiagTroubleCode => {
            RawObject::DiagTroubleCode(DiagTroubleCodeRaw::read(stream)?)
        }
        ObjectType::McdDbUnit => RawObject::Unit(UnitRaw::read(stream)?),
        ObjectType::McdDbPhysicalDimension => {
            RawObject::PhysicalDimension(PhysicalDimension::read(stream)?)
        }
        ObjectType::McdDbUnitGroup => RawObject::UnitGroup(UnitGroupRaw::read(stream)?),
        ObjectType::DbLayerData => RawObject::LayerData(LayerData::read(stream)?),
        ObjectType::DbProjectData => RawObject::ProjectData(ProjectData::read(stream)?),
        ObjectType::DbVehicleInfoData => {
            RawObject::VehicleInfoData(VehicleInfoData::read(stream)?)
        }
        ObjectType::McdAccessKey => RawObject::AccessKey(AccessKey::read(stream)?),
        ObjectType::McdDbEcu => RawObject::Ecu(Ecu::read(stream)?),
        ObjectType::McdDbEcuBaseVariant => {
            RawObject::EcuBaseVariant(EcuBaseVariant::read(stream)?)
        }
        ObjectType::McdDbEcuVariant => RawObject::EcuVariant(EcuVariant::read(stream)?),
        ObjectType::McdDbLocationReferences => {
            RawObject::LocationReferences(LocationReferences::read(stream)?)
        }
        ObjectType::McdAudience => RawObject::Audience(Audience::read(stream)?),
        ObjectType::McdDbCodeInformation => {
            RawObject::CodeInformation(CodeInformation::read(stream)?)
        }
        ObjectType::McdDbParameter | ObjectType::McdDbParameterSimple => {
            RawObject::Parameter(ParameterRaw::read(stream)?)
        }
        ObjectType::McdDbMatchingRequestParameter => {
            RawObject::MatchingRequestParameter(MatchingRequestParameterRaw::read(stream)?)
        }
        ObjectType::McdDbMatchingParameter => {
            RawObject::MatchingParameter(MatchingParameterRaw::read(stream)?)
        }
        ObjectType::McdDbProtocolParameter => {
            RawObject::ProtocolParameter(ProtocolParameterRaw::read(stream)?)
        }
        ObjectType::McdDbService => RawObject::Service(ServiceRaw::read(stream)?),
        ObjectType::McdDbJob => RawObject::Job(JobRaw::read(stream)?),
        ObjectType::McdDbStartCommunication => {
            RawObject::StartCommunication(StartCommunicationRaw::read(stream)?)
        }
        ObjectType::McdDbRequest => RawObject::Request(RequestRaw::read(stream)?),
        ObjectType::McdDbResponse => RawObject::Response(ResponseRaw::read(stream)?),
        ObjectType::McdDbTable => RawObject::Table(TableRaw::read(stream)?),
        ObjectType::McdDbTableParameter => {
            RawObject::TableParameter(TableParameterRaw::read(stream)?)
        }
        ObjectType::McdDbParameterTableKey => {
            RawObject::TableKeyParameter(TableKeyParameterRaw::read(stream)?)
        }
        ObjectType::McdDbParameterTablestruct => {
            RawObject::TableStructParameter(TableStructParameterRaw::read(stream)?)
        }
        ObjectType::McdDbFunctionalClass => {
            RawObject::FunctionalClass(FunctionalClassRaw::read(stream)?)
        }
        ObjectType::McdDbEnvDataDesc => RawObject::EnvDataDesc(EnvDataDescRaw::read(stream)?),
        ObjectType::DbComParamSpec => RawObject::ComParamSpec(ComParamSpecRaw::read(stream)?),
        ObjectType::McdDbParameters
        | ObjectType::McdDbRequestParameters
        | ObjectType::McdDbResponseParameters
        | ObjectType::McdDbTableParameters
        | ObjectType::McdDbDiagTroubleCodes
        | ObjectType::McdDbResponses => {
            let count = stream.u16_le()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(read_object_if_exists(stream)?);
            }
            RawObject::Collection(items)
        }
        ObjectType::McdDbMatchingPatterns => {
            // This collection carries a u32 count.
            let count = stream.u32_le()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(read_object_if_exists(stream)?);
            }
            RawObject::Collection(items)
        }
        other => {
            return Err(FormatError::UnsupportedObjectType {
                tag,
                name: other.name(),
            }
            .into())
        }
    })
}

/// Read a presence flag (must be 0 or 1) and, when set, the object behind it.
pub fn read_object_if_exists(stream: &mut ObjectStream) -> Result<Option<RawObject>> {
    if stream.presence_flag()? {
        Ok(Some(read_object(stream)?))
    } else {
        Ok(None)
    }
}

fn read_typed_collection<T>(
    stream: &mut ObjectStream,
    coerce: impl Fn(RawObject) -> Result<T>,
) -> Result<Vec<T>> {
    let count = stream.u16_le()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match read_object_if_exists(stream)? {
            Some(obj) => items.push(coerce(obj)?),
            None => return Err(semantic!("absent entry in typed collection")),
        }
    }
    Ok(items)
}

/// Load a top-level object from a decompressed blob, checking the
/// end-of-object sentinel afterwards.
pub fn load_object(data: &[u8], strings: &StringStorage) -> Result<RawObject> {
    let mut stream = ObjectStream::new(data, strings);
    let object = read_object(&mut stream)?;
    stream.finish();
    Ok(object)
}

macro_rules! coercions {
    ($($fn:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl RawObject {
            $(
                pub fn $fn(self) -> Result<$ty> {
                    match self {
                        RawObject::$variant(v) => Ok(v),
                        other => Err(semantic!(
                            concat!("expected ", stringify!($variant), ", got {}"),
                            other.type_name()
                        )),
                    }
                }
            )*
        }
    };
}

coercions! {
    into_limit => Limit(LimitRaw),
    into_interval => Interval(Interval),
    into_scale_constraint => ScaleConstraint(ScaleConstraintRaw),
    into_scale_constraints => ScaleConstraints(Vec<ScaleConstraintRaw>),
    into_constraint => Constraint(ConstraintRaw),
    into_rational_coeffs => RationalCoeffs(RationalCoeffs),
    into_compu_scale => CompuScale(CompuScaleRaw),
    into_compu_scales => CompuScales(Vec<CompuScaleRaw>),
    into_compu_base => CompuBase(CompuBase),
    into_compu_method => CompuMethod(CompuMethod),
    into_diag_coded_type => DiagCodedType(DiagCodedType),
    into_physical_type => PhysicalType(PhysicalType),
    into_dop_simple_base => DopSimpleBase(DopSimpleBase),
    into_structure => Structure(StructureRaw),
    into_multiplexer => Multiplexer(MultiplexerRaw),
    into_switch_key => SwitchKey(SwitchKeyRaw),
    into_case => Case(CaseRaw),
    into_cases => Cases(Vec<CaseRaw>),
    into_default_case => DefaultCase(CaseBase),
    into_dop_dtc => DopDtc(DopDtcRaw),
    into_diag_trouble_code => DiagTroubleCode(DiagTroubleCodeRaw),
    into_unit => Unit(UnitRaw),
    into_physical_dimension => PhysicalDimension(PhysicalDimension),
    into_layer_data => LayerData(LayerData),
    into_project_data => ProjectData(ProjectData),
    into_access_key => AccessKey(AccessKey),
    into_ecu_variant => EcuVariant(EcuVariant),
    into_parameter => Parameter(ParameterRaw),
    into_service => Service(ServiceRaw),
    into_response => Response(ResponseRaw),
    into_table => Table(TableRaw),
    into_table_parameter => TableParameter(TableParameterRaw),
    into_collection => Collection(Vec<Option<RawObject>>),
}

impl RawObject {
    /// Short kind name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawObject::Limit(_) => "DB_LIMIT",
            RawObject::Interval(_) => "MCD_INTERVAL",
            RawObject::ScaleConstraint(_) => "MCD_SCALE_CONSTRAINT",
            RawObject::ScaleConstraints(_) => "MCD_SCALE_CONSTRAINTS",
            RawObject::Constraint(_) => "MCD_CONSTRAINT",
            RawObject::RationalCoeffs(_) => "DB_COMPU_RATIONAL_COEFFS",
            RawObject::CompuScale(_) => "DB_COMPU_SCALE",
            RawObject::CompuScales(_) => "DB_COMPU_SCALES",
            RawObject::CompuBase(_) => "DB_COMPU_BASE",
            RawObject::CompuMethod(_) => "DB_COMPU_METHOD",
            RawObject::DiagCodedType(_) => "DB_DIAG_CODED_TYPE",
            RawObject::PhysicalType(_) => "DB_PHYSICAL_TYPE",
            RawObject::DopSimpleBase(_) => "DB_DOP_SIMPLE_BASE",
            RawObject::Structure(_) => "MCD_DB_PARAMETER_STRUCTURE",
            RawObject::StaticField(_) => "MCD_DB_PARAMETER_STATIC_FIELD",
            RawObject::DynamicLengthField(_) => "MCD_DB_PARAMETER_DYNAMIC_LENGTH_FIELD",
            RawObject::DynamicEndmarkerField(_) => "MCD_DB_PARAMETER_DYNAMIC_ENDMARKER_FIELD",
            RawObject::EndOfPduField(_) => "MCD_DB_PARAMETER_END_OF_PDU_FIELD",
            RawObject::Multiplexer(_) => "MCD_DB_PARAMETER_MULTIPLEXER",
            RawObject::SwitchKey(_) => "DB_SWITCH_KEY",
            RawObject::Case(_) => "DB_CASE",
            RawObject::Cases(_) => "DB_CASES",
            RawObject::DefaultCase(_) => "DB_DEFAULT_CASE",
            RawObject::DopDtc(_) => "DB_DOP_DTC",
            RawObject::DiagTroubleCode(_) => "MCD_DB_DIAG_TROUBLE_CODE",
            RawObject::Unit(_) => "MCD_DB_UNIT",
            RawObject::PhysicalDimension(_) => "MCD_DB_PHYSICAL_DIMENSION",
            RawObject::UnitGroup(_) => "MCD_DB_UNIT_GROUP",
            RawObject::LayerData(_) => "DB_LAYER_DATA",
            RawObject::ProjectData(_) => "DB_PROJECT_DATA",
            RawObject::VehicleInfoData(_) => "DB_VEHICLE_INFO_DATA",
            RawObject::AccessKey(_) => "MCD_ACCESS_KEY",
            RawObject::Ecu(_) => "MCD_DB_ECU",
            RawObject::EcuBaseVariant(_) => "MCD_DB_ECU_BASE_VARIANT",
            RawObject::EcuVariant(_) => "MCD_DB_ECU_VARIANT",
            RawObject::LocationReferences(_) => "MCD_DB_LOCATION_REFERENCES",
            RawObject::Audience(_) => "MCD_AUDIENCE",
            RawObject::CodeInformation(_) => "MCD_DB_CODE_INFORMATION",
            RawObject::Parameter(_) => "MCD_DB_PARAMETER",
            RawObject::MatchingRequestParameter(_) => "MCD_DB_MATCHING_REQUEST_PARAMETER",
            RawObject::MatchingParameter(_) => "MCD_DB_MATCHING_PARAMETER",
            RawObject::ProtocolParameter(_) => "MCD_DB_PROTOCOL_PARAMETER",
            RawObject::Service(_) => "MCD_DB_SERVICE",
            RawObject::Job(_) => "MCD_DB_JOB",
            RawObject::StartCommunication(_) => "MCD_DB_STARTCOMMUNICATION",
            RawObject::Request(_) => "MCD_DB_REQUEST",
            RawObject::Response(_) => "MCD_DB_RESPONSE",
            RawObject::Table(_) => "MCD_DB_TABLE",
            RawObject::TableParameter(_) => "MCD_DB_TABLE_PARAMETER",
            RawObject::TableKeyParameter(_) => "MCD_DB_PARAMETER_TABLE_KEY",
            RawObject::TableStructParameter(_) => "MCD_DB_PARAMETER_TABLESTRUCT",
            RawObject::FunctionalClass(_) => "MCD_DB_FUNCTIONAL_CLASS",
            RawObject::EnvDataDesc(_) => "MCD_DB_ENV_DATA_DESC",
            RawObject::ComParamSpec(_) => "DB_COM_PARAM_SPEC",
            RawObject::Collection(_) => "collection",
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::common::McdValue;

    fn storage() -> StringStorage {
        StringStorage::empty()
    }

    #[test]
    fn unknown_tag_fails() {
        let storage = storage();
        let data = [0x01u8, 0x00, 0x00];
        let mut stream = ObjectStream::new(&data, &storage);
        assert!(matches!(
            read_object(&mut stream),
            Err(crate::error::Error::Format(
                FormatError::UnknownObjectType { tag: 0x0001, .. }
            ))
        ));
    }

    #[test]
    fn recognized_but_unsupported_tag_names_the_type() {
        let storage = storage();
        // MCD_DB_FAULT_MEMORY has no loader.
        let data = 0x0306u16.to_le_bytes();
        let mut stream = ObjectStream::new(&data, &storage);
        match read_object(&mut stream) {
            Err(crate::error::Error::Format(FormatError::UnsupportedObjectType {
                name, ..
            })) => {
                assert_eq!(name, "MCD_DB_FAULT_MEMORY");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn limit_blob_roundtrip() {
        let storage = storage();
        // DB_LIMIT { UInt32(7), CLOSED } followed by the sentinel.
        let mut data = 0x0037u16.to_le_bytes().to_vec();
        data.push(11); // A_UINT32
        data.extend_from_slice(&7u32.to_le_bytes());
        data.push(0x02); // 0x6D02 = closed
        data.extend_from_slice(&crate::stream::OBJECT_TAIL);

        let object = load_object(&data, &storage).unwrap();
        let limit = object.into_limit().unwrap();
        assert_eq!(limit.mcd_value, Some(McdValue::UInt32(7)));
        assert_eq!(limit.limit_type, enums::LimitKind::Closed);
    }

    #[test]
    fn presence_flagged_interval() {
        let storage = storage();
        // Interval with infinite lower, closed upper limit of 3.
        let mut data = vec![1u8];
        data.extend_from_slice(&0x00FBu16.to_le_bytes());
        data.push(200); // lower: no type
        data.push(11); // upper: A_UINT32
        data.extend_from_slice(&3u32.to_le_bytes());
        data.push(0x02 | 0x10); // lower infinite, upper closed

        let mut stream = ObjectStream::new(&data, &storage);
        let interval = read_object_if_exists(&mut stream)
            .unwrap()
            .unwrap()
            .into_interval()
            .unwrap();
        assert_eq!(interval.lower_limit, None);
        assert_eq!(interval.upper_limit, Some(McdValue::UInt32(3)));
        assert_eq!(interval.lower_limit_type, enums::LimitKind::Infinite);
        assert_eq!(interval.upper_limit_type, enums::LimitKind::Closed);
    }
}
