//! Raw records for data object properties and everything hanging off them:
//! diag-coded types, physical types, computation methods, limits, constraints,
//! complex parameter DOPs (structures, fields, multiplexers) and DTC DOPs.

use crate::error::{semantic, Result};
use crate::object::common::{
    read_bytefield, read_named_references, McdValue, NamedReference, Reference,
};
use crate::object::enums::{
    check_encoding, BaseType, CompuCategory, DiagCodedKind, Encoding, LimitKind, Termination,
    Validity,
};
use crate::object::{read_object_if_exists, RawObject};
use crate::stream::ObjectStream;

// ─────────────────────────────────────────────────────────────────────────────
// Limits, intervals, constraints
// ─────────────────────────────────────────────────────────────────────────────

/// `DB_LIMIT`: a typed value plus the limit kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitRaw {
    pub mcd_value: Option<McdValue>,
    pub limit_type: LimitKind,
}

impl LimitRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<LimitRaw> {
        let mcd_value = McdValue::read(stream)?;
        let limit_type = LimitKind::from_raw(0x6D00 + stream.u8()? as u16)?;
        Ok(LimitRaw {
            mcd_value,
            limit_type,
        })
    }
}

/// `MCD_INTERVAL`: two values with flag-packed limit kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lower_limit: Option<McdValue>,
    pub upper_limit: Option<McdValue>,
    pub lower_limit_type: LimitKind,
    pub upper_limit_type: LimitKind,
}

impl Interval {
    pub fn read(stream: &mut ObjectStream) -> Result<Interval> {
        let lower_limit = McdValue::read(stream)?;
        let upper_limit = McdValue::read(stream)?;
        let flags = stream.u8()?;

        let kind_of = |infinite: bool, closed: bool| {
            if infinite {
                LimitKind::Infinite
            } else if closed {
                LimitKind::Closed
            } else {
                LimitKind::Open
            }
        };
        Ok(Interval {
            lower_limit,
            upper_limit,
            lower_limit_type: kind_of(flags & 0x02 != 0, flags & 0x01 != 0),
            upper_limit_type: kind_of(flags & 0x20 != 0, flags & 0x10 != 0),
        })
    }
}

/// `MCD_SCALE_CONSTRAINT`: a sub-interval with a validity marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConstraintRaw {
    pub interval: Option<Interval>,
    pub range_info: Validity,
    pub description: Option<String>,
    pub description_id: Option<String>,
    pub short_label: Option<String>,
    pub short_label_id: Option<String>,
    pub is_computed: bool,
}

impl ScaleConstraintRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ScaleConstraintRaw> {
        let interval = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_interval()?),
            None => None,
        };
        let range_info = Validity::from_raw(0x0600 + stream.u8()? as u16)?;
        Ok(ScaleConstraintRaw {
            interval,
            range_info,
            description: stream.unicode_string()?.0,
            description_id: stream.ascii_string()?.0,
            short_label: stream.ascii_string()?.0,
            short_label_id: stream.ascii_string()?.0,
            is_computed: stream.u8()? != 0,
        })
    }
}

/// `MCD_CONSTRAINT` / `MCD_INTERNAL_CONSTRAINT`: interval plus scale
/// constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRaw {
    pub interval: Option<Interval>,
    pub scale_constraints: Option<Vec<ScaleConstraintRaw>>,
    pub is_computed: bool,
}

impl ConstraintRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<ConstraintRaw> {
        let interval = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_interval()?),
            None => None,
        };
        let scale_constraints = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_scale_constraints()?),
            None => None,
        };
        Ok(ConstraintRaw {
            interval,
            scale_constraints,
            is_computed: stream.u8()? != 0,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Computation methods
// ─────────────────────────────────────────────────────────────────────────────

/// `DB_COMPU_RATIONAL_COEFFS`: numerator/denominator coefficients in
/// ascending order of power.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalCoeffs {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
}

impl RationalCoeffs {
    pub fn read(stream: &mut ObjectStream) -> Result<RationalCoeffs> {
        let mut numerator = Vec::new();
        for _ in 0..stream.u8()? {
            numerator.push(stream.f64_le()?);
        }
        let mut denominator = Vec::new();
        for _ in 0..stream.u8()? {
            denominator.push(stream.f64_le()?);
        }
        Ok(RationalCoeffs {
            numerator,
            denominator,
        })
    }
}

/// `DB_COMPU_SCALE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompuScaleRaw {
    pub long_name_id: Option<String>,
    pub compu_inverse_rational_coeffs: Option<RationalCoeffs>,
    pub compu_rational_coeffs: Option<RationalCoeffs>,
    pub lower_limit: Option<LimitRaw>,
    pub upper_limit: Option<LimitRaw>,
    pub compu_const: Option<McdValue>,
    pub compu_inverse_value: Option<McdValue>,
    pub compu_const_as_coded_value: Option<McdValue>,
    pub lower_limit_as_coded_value: Option<LimitRaw>,
    pub upper_limit_as_coded_value: Option<LimitRaw>,
}

impl CompuScaleRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<CompuScaleRaw> {
        let long_name_id = stream.ascii_string()?.0;
        let compu_inverse_rational_coeffs = read_coeffs_if_exists(stream)?;
        let compu_rational_coeffs = read_coeffs_if_exists(stream)?;
        let lower_limit = read_limit_if_exists(stream)?;
        let upper_limit = read_limit_if_exists(stream)?;
        let compu_const = McdValue::read(stream)?;
        let compu_inverse_value = McdValue::read(stream)?;
        let compu_const_as_coded_value = McdValue::read(stream)?;
        let lower_limit_as_coded_value = read_limit_if_exists(stream)?;
        let upper_limit_as_coded_value = read_limit_if_exists(stream)?;
        Ok(CompuScaleRaw {
            long_name_id,
            compu_inverse_rational_coeffs,
            compu_rational_coeffs,
            lower_limit,
            upper_limit,
            compu_const,
            compu_inverse_value,
            compu_const_as_coded_value,
            lower_limit_as_coded_value,
            upper_limit_as_coded_value,
        })
    }
}

fn read_coeffs_if_exists(stream: &mut ObjectStream) -> Result<Option<RationalCoeffs>> {
    match read_object_if_exists(stream)? {
        Some(obj) => Ok(Some(obj.into_rational_coeffs()?)),
        None => Ok(None),
    }
}

fn read_limit_if_exists(stream: &mut ObjectStream) -> Result<Option<LimitRaw>> {
    match read_object_if_exists(stream)? {
        Some(obj) => Ok(Some(obj.into_limit()?)),
        None => Ok(None),
    }
}

/// `DB_COMPU_BASE` and its internal-to-phys / phys-to-internal aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct CompuBase {
    pub compu_scales: Option<Vec<CompuScaleRaw>>,
    pub compu_default_value: Option<McdValue>,
    pub compu_code_byte_stream: Option<McdValue>,
    pub code_information: Option<Box<RawObject>>,
    pub compu_inverse_value: Option<McdValue>,
}

impl CompuBase {
    pub fn read(stream: &mut ObjectStream) -> Result<CompuBase> {
        let compu_scales = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_compu_scales()?),
            None => None,
        };
        let compu_default_value = McdValue::read(stream)?;
        let compu_code_byte_stream = McdValue::read(stream)?;
        let code_information = read_object_if_exists(stream)?.map(Box::new);
        let compu_inverse_value = McdValue::read(stream)?;
        Ok(CompuBase {
            compu_scales,
            compu_default_value,
            compu_code_byte_stream,
            code_information,
            compu_inverse_value,
        })
    }
}

/// `DB_COMPU_METHOD`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompuMethod {
    pub compu_category: CompuCategory,
    pub compu_phys_to_internal: Option<CompuBase>,
    pub compu_internal_to_phys: Option<CompuBase>,
    pub compu_inverse_val_id: Option<String>,
    pub compu_default_val_id: Option<String>,
}

impl CompuMethod {
    pub fn read(stream: &mut ObjectStream) -> Result<CompuMethod> {
        let compu_category = CompuCategory::from_raw(stream.u8()?)?;
        let compu_phys_to_internal = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_compu_base()?),
            None => None,
        };
        let compu_internal_to_phys = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_compu_base()?),
            None => None,
        };

        // Text tables append the ids of the inverse and default texts.
        let mut compu_inverse_val_id = None;
        let mut compu_default_val_id = None;
        if compu_category == CompuCategory::Texttable {
            if matches!(&compu_phys_to_internal, Some(b) if b.compu_inverse_value.is_some()) {
                compu_inverse_val_id = stream.ascii_string()?.0;
            }
            if matches!(&compu_internal_to_phys, Some(b) if b.compu_default_value.is_some()) {
                compu_default_val_id = stream.ascii_string()?.0;
            }
        }
        Ok(CompuMethod {
            compu_category,
            compu_phys_to_internal,
            compu_internal_to_phys,
            compu_inverse_val_id,
            compu_default_val_id,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Coded and physical types
// ─────────────────────────────────────────────────────────────────────────────

/// `DB_DIAG_CODED_TYPE`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagCodedType {
    pub kind: DiagCodedKind,
    pub bit_length: Option<u32>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub termination: Option<Termination>,
    pub bit_mask: Vec<u8>,
    pub base_data_type: BaseType,
    pub encoding: Encoding,
    pub is_high_low_byte_order: bool,
    pub is_condensed_bit_mask: bool,
    pub length_key_parameter: Option<Box<RawObject>>,
}

impl DiagCodedType {
    pub fn read(stream: &mut ObjectStream) -> Result<DiagCodedType> {
        let kind = DiagCodedKind::from_raw(stream.u8()?)?;

        let (mut bit_length, mut min_length, mut max_length, mut termination) =
            (None, None, None, None);
        if kind == DiagCodedKind::MinMaxLength {
            max_length = Some(stream.u32_le()?);
            min_length = Some(stream.u32_le()?);
            termination = Some(Termination::from_raw(stream.u8()?)?);
        } else {
            bit_length = Some(stream.u32_le()?);
        }

        let bit_mask = if kind == DiagCodedKind::StandardLength {
            read_bytefield(stream)?
        } else {
            Vec::new()
        };

        let base_data_type = BaseType::from_db_raw(stream.u8()?)?;
        let encoding = check_encoding(base_data_type, Encoding::from_raw(stream.u8()?)?)?;
        let is_high_low_byte_order = stream.u8()? != 0;
        let is_condensed_bit_mask = stream.u8()? != 0;

        let length_key_parameter = if kind == DiagCodedKind::ParamLengthInfo {
            read_object_if_exists(stream)?.map(Box::new)
        } else {
            None
        };

        Ok(DiagCodedType {
            kind,
            bit_length,
            min_length,
            max_length,
            termination,
            bit_mask,
            base_data_type,
            encoding,
            is_high_low_byte_order,
            is_condensed_bit_mask,
            length_key_parameter,
        })
    }
}

/// `DB_PHYSICAL_TYPE`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalType {
    pub base_data_type: BaseType,
    pub precision: Option<u16>,
    pub display_radix: u8,
}

impl PhysicalType {
    pub fn read(stream: &mut ObjectStream) -> Result<PhysicalType> {
        let base_data_type = BaseType::from_physical_raw(stream.u8()?)?;
        let precision = if stream.u8()? != 0 {
            Some(stream.u16_le()?)
        } else {
            None
        };
        let display_radix = stream.u8()?;
        Ok(PhysicalType {
            base_data_type,
            precision,
            display_radix,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple DOP
// ─────────────────────────────────────────────────────────────────────────────

/// `DB_DOP_SIMPLE_BASE`.
#[derive(Debug, Clone, PartialEq)]
pub struct DopSimpleBase {
    pub short_name: Option<String>,
    pub compu_method: Option<CompuMethod>,
    pub diag_coded_type: Option<DiagCodedType>,
    pub physical_type: Option<PhysicalType>,
    pub phys_to_coded_index_map: Vec<(u32, u16)>,
    pub coded_to_phys_index_map: Vec<(u32, u16)>,
    pub units_ref: Option<Reference>,
    pub internal_constraint_ref: Option<Reference>,
    pub physical_constraint_ref: Option<Reference>,
}

impl DopSimpleBase {
    pub fn read(stream: &mut ObjectStream) -> Result<DopSimpleBase> {
        let short_name = stream.ascii_string()?.0;

        let compu_method = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_compu_method()?),
            None => None,
        };
        let diag_coded_type = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_diag_coded_type()?),
            None => None,
        };
        let physical_type = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_physical_type()?),
            None => None,
        };

        let mut phys_to_coded_index_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            phys_to_coded_index_map.push((stream.u32_le()?, stream.u16_le()?));
        }
        let mut coded_to_phys_index_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            coded_to_phys_index_map.push((stream.u32_le()?, stream.u16_le()?));
        }

        let units_ref = read_flagged_reference(stream)?;
        let internal_constraint_ref = read_flagged_reference(stream)?;
        let physical_constraint_ref = read_flagged_reference(stream)?;

        Ok(DopSimpleBase {
            short_name,
            compu_method,
            diag_coded_type,
            physical_type,
            phys_to_coded_index_map,
            coded_to_phys_index_map,
            units_ref,
            internal_constraint_ref,
            physical_constraint_ref,
        })
    }
}

fn read_flagged_reference(stream: &mut ObjectStream) -> Result<Option<Reference>> {
    if stream.u8()? != 0 {
        Ok(Some(Reference::read(stream, false, false)?))
    } else {
        Ok(None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Units
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_PHYSICAL_DIMENSION`: SI exponents of a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDimension {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub unique_object_id: Option<String>,
    pub long_name_id: Option<String>,
    pub length_exponent: i32,
    pub mass_exponent: i32,
    pub time_exponent: i32,
    pub current_exponent: i32,
    pub temperature_exponent: i32,
    pub molar_amount_exponent: i32,
    pub luminous_intensity_exponent: i32,
}

impl PhysicalDimension {
    pub fn read(stream: &mut ObjectStream) -> Result<PhysicalDimension> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        let unique_object_id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        Ok(PhysicalDimension {
            short_name,
            long_name,
            description,
            unique_object_id,
            long_name_id,
            length_exponent: stream.i32_le()?,
            mass_exponent: stream.i32_le()?,
            time_exponent: stream.i32_le()?,
            current_exponent: stream.i32_le()?,
            temperature_exponent: stream.i32_le()?,
            molar_amount_exponent: stream.i32_le()?,
            luminous_intensity_exponent: stream.i32_le()?,
        })
    }
}

/// `MCD_DB_UNIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRaw {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub unique_object_id: Option<String>,
    pub long_name_id: Option<String>,
    pub display_name: Option<String>,
    pub factor_si_to_unit: f64,
    pub offset_si_to_unit: f64,
    pub physical_dimension: Option<PhysicalDimension>,
    pub unit_group_refs: Option<Vec<NamedReference<Reference>>>,
}

impl UnitRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<UnitRaw> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        let unique_object_id = stream.ascii_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        let display_name = stream.unicode_string()?.0;
        let factor_si_to_unit = stream.f64_le()?;
        let offset_si_to_unit = stream.f64_le()?;
        let physical_dimension = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_physical_dimension()?),
            None => None,
        };
        let unit_group_refs = if stream.u8()? != 0 {
            Some(read_named_references(stream)?)
        } else {
            None
        };
        Ok(UnitRaw {
            short_name,
            long_name,
            description,
            unique_object_id,
            long_name_id,
            display_name,
            factor_si_to_unit,
            offset_si_to_unit,
            physical_dimension,
            unit_group_refs,
        })
    }
}

pub(crate) fn expect_absent(value: Option<String>) -> Result<()> {
    match value {
        None => Ok(()),
        Some(v) => Err(semantic!("unexpected string present: \"{v}\"")),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Complex parameter DOPs
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_PARAMETER_STRUCTURE`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRaw {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub long_name_id: Option<String>,
    pub description: Option<String>,
    pub description_id: Option<String>,
    pub unique_object_id: Option<String>,
    pub byte_size: u16,
    pub parameters: Option<Vec<Option<RawObject>>>,
}

impl StructureRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<StructureRaw> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let long_name_id = stream.ascii_string()?.0;
        let description = stream.unicode_string()?.0;
        let description_id = stream.ascii_string()?.0;
        let unique_object_id = stream.ascii_string()?.0;
        let byte_size = stream.u16_le()?;
        let parameters = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_collection()?),
            None => None,
        };
        Ok(StructureRaw {
            short_name,
            long_name,
            long_name_id,
            description,
            description_id,
            unique_object_id,
            byte_size,
            parameters,
        })
    }
}

/// Target of a field's item reference: a basic structure or an environment
/// data description.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDopRef {
    Structure(Reference),
    EnvDataDesc(Reference),
}

impl FieldDopRef {
    /// `DB_DOP_FIELD` base layout.
    pub fn read(stream: &mut ObjectStream) -> Result<FieldDopRef> {
        if stream.u8()? == 0 {
            Ok(FieldDopRef::Structure(Reference::read(stream, false, false)?))
        } else {
            Ok(FieldDopRef::EnvDataDesc(Reference::read(
                stream, false, false,
            )?))
        }
    }

    pub fn structure_ref(&self) -> Result<&Reference> {
        match self {
            FieldDopRef::Structure(r) => Ok(r),
            FieldDopRef::EnvDataDesc(_) => {
                Err(semantic!("field references env-data-desc, not structure"))
            }
        }
    }
}

/// `MCD_DB_PARAMETER_STATIC_FIELD`.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticFieldRaw {
    pub item_ref: FieldDopRef,
    pub fixed_number_of_items: u32,
    pub item_byte_size: u32,
}

impl StaticFieldRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<StaticFieldRaw> {
        Ok(StaticFieldRaw {
            item_ref: FieldDopRef::read(stream)?,
            fixed_number_of_items: stream.u32_le()?,
            item_byte_size: stream.u32_le()?,
        })
    }
}

/// `MCD_DB_PARAMETER_DYNAMIC_LENGTH_FIELD`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicLengthFieldRaw {
    pub item_ref: FieldDopRef,
    pub first_item_offset: u32,
    pub determine_number_of_items_dop_ref: Reference,
    pub determine_number_of_items_byte_position: u32,
    pub determine_number_of_items_bit_position: u8,
}

impl DynamicLengthFieldRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<DynamicLengthFieldRaw> {
        Ok(DynamicLengthFieldRaw {
            item_ref: FieldDopRef::read(stream)?,
            first_item_offset: stream.u32_le()?,
            determine_number_of_items_dop_ref: Reference::read(stream, false, false)?,
            determine_number_of_items_byte_position: stream.u32_le()?,
            determine_number_of_items_bit_position: stream.u8()?,
        })
    }
}

/// `MCD_DB_PARAMETER_DYNAMIC_ENDMARKER_FIELD`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEndmarkerFieldRaw {
    pub item_ref: FieldDopRef,
    pub termination_value: Option<String>,
    pub dop_base_ref: Reference,
}

impl DynamicEndmarkerFieldRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<DynamicEndmarkerFieldRaw> {
        Ok(DynamicEndmarkerFieldRaw {
            item_ref: FieldDopRef::read(stream)?,
            termination_value: stream.ascii_string()?.0,
            dop_base_ref: Reference::read(stream, false, false)?,
        })
    }
}

/// `MCD_DB_PARAMETER_END_OF_PDU_FIELD`.
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfPduFieldRaw {
    pub item_ref: FieldDopRef,
    pub max_number_of_items: u32,
    pub min_number_of_items: u32,
}

impl EndOfPduFieldRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<EndOfPduFieldRaw> {
        Ok(EndOfPduFieldRaw {
            item_ref: FieldDopRef::read(stream)?,
            max_number_of_items: stream.u32_le()?,
            min_number_of_items: stream.u32_le()?,
        })
    }
}

/// `DB_SWITCH_KEY`: position and DOP of a multiplexer's switch key.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchKeyRaw {
    pub bit_position: u8,
    pub byte_position: u32,
    pub dop_base_ref: Reference,
}

impl SwitchKeyRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<SwitchKeyRaw> {
        Ok(SwitchKeyRaw {
            bit_position: stream.u8()?,
            byte_position: stream.u32_le()?,
            dop_base_ref: Reference::read(stream, false, false)?,
        })
    }
}

/// Common trailer of `DB_CASE` and `DB_DEFAULT_CASE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBase {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub structure_dop_ref: Option<Reference>,
}

impl CaseBase {
    pub fn read(stream: &mut ObjectStream) -> Result<CaseBase> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        expect_absent(stream.ascii_string()?.0)?;
        let structure_dop_ref = read_flagged_reference(stream)?;
        Ok(CaseBase {
            short_name,
            long_name,
            description,
            structure_dop_ref,
        })
    }
}

/// `DB_CASE`: a closed interval selecting a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRaw {
    pub lower_limit: LimitRaw,
    pub upper_limit: LimitRaw,
    pub base: CaseBase,
}

impl CaseRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<CaseRaw> {
        let lower_limit = read_limit_if_exists(stream)?;
        let upper_limit = read_limit_if_exists(stream)?;
        let (Some(lower_limit), Some(upper_limit)) = (lower_limit, upper_limit) else {
            return Err(semantic!("switch case needs both limits"));
        };
        Ok(CaseRaw {
            lower_limit,
            upper_limit,
            base: CaseBase::read(stream)?,
        })
    }
}

/// `MCD_DB_PARAMETER_MULTIPLEXER`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexerRaw {
    pub byte_position: u32,
    pub switch_key: Option<SwitchKeyRaw>,
    pub cases: Option<Vec<CaseRaw>>,
    pub default_case: Option<CaseBase>,
}

impl MultiplexerRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<MultiplexerRaw> {
        let byte_position = stream.u32_le()?;
        let switch_key = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_switch_key()?),
            None => None,
        };
        let cases = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_cases()?),
            None => None,
        };
        let default_case = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_default_case()?),
            None => None,
        };
        Ok(MultiplexerRaw {
            byte_position,
            switch_key,
            cases,
            default_case,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DTC DOPs
// ─────────────────────────────────────────────────────────────────────────────

/// `MCD_DB_DIAG_TROUBLE_CODE`: one fault definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagTroubleCodeRaw {
    pub label: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub level: u32,
    pub trouble_code: u32,
    pub special_data_group_refs: Option<Vec<u32>>,
    pub trouble_code_text: Option<String>,
}

impl DiagTroubleCodeRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<DiagTroubleCodeRaw> {
        let label = stream.ascii_string()?.0;
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.ascii_string()?.0;
        let description = stream.unicode_string()?.0;
        let level = stream.u32_le()?;
        let trouble_code = stream.u32_le()?;
        let special_data_group_refs = if stream.u8()? != 0 {
            Some(crate::object::common::read_sdg_reference_collection(stream)?)
        } else {
            None
        };
        let trouble_code_text = stream.ascii_string()?.0;
        Ok(DiagTroubleCodeRaw {
            label,
            short_name,
            long_name,
            description,
            level,
            trouble_code,
            special_data_group_refs,
            trouble_code_text,
        })
    }
}

/// `DB_DOP_DTC`: a DOP that resolves 24-bit codes to fault definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct DopDtcRaw {
    pub diag_trouble_codes_ref_map: Vec<(u32, Reference)>,
    pub compu_method: Option<CompuMethod>,
    pub diag_coded_type: Option<DiagCodedType>,
    pub physical_type: Option<PhysicalType>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub unique_object_identifier: Option<String>,
    pub long_name_id: Option<String>,
    pub description_id: Option<String>,
}

impl DopDtcRaw {
    pub fn read(stream: &mut ObjectStream) -> Result<DopDtcRaw> {
        let mut diag_trouble_codes_ref_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            let key = stream.u32_le()?;
            let reference = Reference::read(stream, false, false)?;
            diag_trouble_codes_ref_map.push((key, reference));
        }

        let ref_counter = stream.u16_le()?;
        if ref_counter != 0 {
            return Err(semantic!("DTC DOP reference counter is {ref_counter}"));
        }

        let compu_method = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_compu_method()?),
            None => None,
        };
        let diag_coded_type = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_diag_coded_type()?),
            None => None,
        };
        let physical_type = match read_object_if_exists(stream)? {
            Some(obj) => Some(obj.into_physical_type()?),
            None => None,
        };

        Ok(DopDtcRaw {
            diag_trouble_codes_ref_map,
            compu_method,
            diag_coded_type,
            physical_type,
            short_name: stream.ascii_string()?.0,
            long_name: stream.unicode_string()?.0,
            description: stream.unicode_string()?.0,
            unique_object_identifier: stream.ascii_string()?.0,
            long_name_id: stream.ascii_string()?.0,
            description_id: stream.ascii_string()?.0,
        })
    }
}
