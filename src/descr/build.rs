//! Builds the normalized description tree from raw objects.
//!
//! The builder owns no state beyond a resolver handle and the ordered
//! layer-data search list. Cross-validation failures fall into two classes:
//! violations known to occur in shipped databases produce a
//! [`DataNode::Invalid`] node so the rest of the graph stays reportable,
//! everything else is a hard load error.

use crate::descr::{
    CalcType, CodedLength, Compu, CompuScale, Constraint, DataNode, Dop, Dtc, DtcDefinition,
    DynamicEndmarkerField, DynamicLengthField, EndOfPduField, Formula, Limit, Mux, MuxCase,
    MuxDefaultCase, Parameter, ParameterKind, ScaleConstraint, SiUnit, StaticField, Structure,
    SwitchKey, TabPoint, TextScale, Unit,
};
use crate::error::{semantic, Result};
use crate::object::common::{McdValue, Reference};
use crate::object::dop::{
    CaseBase, CompuMethod, CompuScaleRaw, DiagCodedType, DopDtcRaw, DopSimpleBase, Interval,
    LimitRaw, MultiplexerRaw, PhysicalType, StructureRaw,
};
use crate::object::enums::{
    BaseType, CompuCategory, DiagCodedKind, Encoding, Endianness, LimitKind, McdDataType,
};
use crate::object::layer::LayerData;
use crate::object::service::ParameterRaw;
use crate::object::RawObject;
use crate::resolver::Resolver;

pub struct DescriptionBuilder<'r, 'a> {
    resolver: &'r Resolver<'a>,
    layers: &'r [&'r LayerData],
}

impl<'r, 'a> DescriptionBuilder<'r, 'a> {
    pub fn new(resolver: &'r Resolver<'a>, layers: &'r [&'r LayerData]) -> Self {
        DescriptionBuilder { resolver, layers }
    }

    /// Normalize one raw object into a description node.
    pub fn build(&self, raw: RawObject) -> Result<DataNode> {
        match raw {
            RawObject::Parameter(p) => self.build_parameter(p),
            RawObject::DopSimpleBase(d) => self.build_simple_dop(d),
            RawObject::Structure(s) => self.build_structure(s),
            RawObject::StaticField(f) => {
                let structure = self.load_structure(f.item_ref.structure_ref()?)?;
                Ok(DataNode::StaticField(StaticField {
                    fixed_number_of_items: f.fixed_number_of_items,
                    item_byte_size: f.item_byte_size,
                    structure: Box::new(structure),
                }))
            }
            RawObject::DynamicLengthField(f) => {
                let count_dop = self
                    .build(self.resolver.load_by_reference(&f.determine_number_of_items_dop_ref)?)?;
                let count_dop = expect_dop(count_dop, "DETERMINE-NUMBER-OF-ITEMS DOP")?;
                if count_dop.physical_base_data_type != Some(BaseType::UInt32) {
                    return Err(semantic!(
                        "invalid data type for DETERMINE-NUMBER-OF-ITEMS DOP: {}",
                        count_dop.physical_type().name()
                    ));
                }
                let bit_position = f.determine_number_of_items_bit_position;
                check_bit_position(bit_position)?;
                let structure = self.load_structure(f.item_ref.structure_ref()?)?;
                Ok(DataNode::DynamicLengthField(DynamicLengthField {
                    determine_number_of_items: Box::new(count_dop),
                    count_byte_position: f.determine_number_of_items_byte_position,
                    count_bit_position: bit_position,
                    offset: f.first_item_offset,
                    structure: Box::new(structure),
                }))
            }
            RawObject::DynamicEndmarkerField(f) => {
                let termination_dop =
                    self.build(self.resolver.load_by_reference(&f.dop_base_ref)?)?;
                let termination_dop = expect_dop(termination_dop, "ENDMARKER termination DOP")?;
                let structure = self.load_structure(f.item_ref.structure_ref()?)?;
                Ok(DataNode::DynamicEndmarkerField(DynamicEndmarkerField {
                    termination_dop: Box::new(termination_dop),
                    termination_value: f.termination_value,
                    structure: Box::new(structure),
                }))
            }
            RawObject::EndOfPduField(f) => {
                let structure = self.load_structure(f.item_ref.structure_ref()?)?;
                Ok(DataNode::EndOfPduField(EndOfPduField {
                    structure: Box::new(structure),
                }))
            }
            RawObject::Multiplexer(m) => self.build_mux(m),
            RawObject::DopDtc(d) => self.build_dtc(d),
            other => Err(semantic!("unknown DOP type: {}", other.type_name())),
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────────

    fn build_parameter(&self, p: ParameterRaw) -> Result<DataNode> {
        let byte_position = p.is_byte_pos_available.then_some(p.byte_position);
        check_bit_position(p.bit_position)?;

        use crate::object::enums::ParameterType as PT;
        let (kind, default_value, constant, dop) = match p.mcd_parameter_type {
            PT::Value => {
                let reference = p
                    .db_object_ref
                    .as_ref()
                    .ok_or_else(|| semantic!("VALUE parameter references no DOP"))?;
                // Pool-less references that resolve nowhere are an error in
                // the source data; report them on the node instead of
                // failing the whole description.
                let dop = match self.resolver.load_dop_without_pool(self.layers, reference) {
                    Ok(raw) => self.build(raw)?,
                    Err(_) => DataNode::Invalid {
                        message: format!(
                            "Access to database element failed - DOP with name: {}",
                            reference.object_id.as_deref().unwrap_or("None")
                        ),
                    },
                };
                (ParameterKind::Value, p.default_mcd_value, None, dop)
            }
            PT::Reserved => {
                let default = p
                    .default_mcd_value
                    .clone()
                    .ok_or_else(|| semantic!("RESERVED parameter has no default value"))?;
                if p.db_object_ref.is_some() {
                    return Err(semantic!("RESERVED parameter references a DOP"));
                }
                let dop = self.build_embedded_dop(p.diag_coded_type)?;
                (ParameterKind::Reserved, Some(default), None, dop)
            }
            PT::CodedConst => {
                let constant = p
                    .default_mcd_value
                    .clone()
                    .ok_or_else(|| semantic!("CODED-CONST parameter has no default value"))?;
                if p.db_object_ref.is_some() {
                    return Err(semantic!("CODED-CONST parameter references a DOP"));
                }
                let dop = self.build_embedded_dop(p.diag_coded_type)?;
                (ParameterKind::CodedConst, None, Some(constant), dop)
            }
            PT::PhysConst => {
                let constant = p
                    .default_mcd_value
                    .clone()
                    .ok_or_else(|| semantic!("PHYS-CONST parameter has no default value"))?;
                let reference = p
                    .db_object_ref
                    .as_ref()
                    .ok_or_else(|| semantic!("PHYS-CONST parameter references no DOP"))?;
                let raw = self.resolver.load_dop_without_pool(self.layers, reference)?;
                (ParameterKind::PhysConst, None, Some(constant), self.build(raw)?)
            }
            other => return Err(semantic!("unknown MCD parameter type: {other:?}")),
        };

        Ok(DataNode::Parameter(Parameter {
            long_name: p.long_name,
            long_name_id: p.long_name_id,
            description: p.description,
            byte_position,
            bit_position: p.bit_position,
            kind,
            default_value,
            constant,
            dop: Box::new(dop),
        }))
    }

    /// Constant and reserved parameters embed their own DIAG-CODED-TYPE;
    /// wrap it into a coded-only DOP node.
    fn build_embedded_dop(&self, diag_coded_type: Option<Box<RawObject>>) -> Result<DataNode> {
        let dct = diag_coded_type
            .ok_or_else(|| semantic!("parameter embeds no DIAG-CODED-TYPE"))?
            .into_diag_coded_type()?;
        self.build_dop_parts(dct, None, None, None, None, None)
    }

    // ── Simple DOPs ─────────────────────────────────────────────────────────

    fn build_simple_dop(&self, d: DopSimpleBase) -> Result<DataNode> {
        let dct = d
            .diag_coded_type
            .ok_or_else(|| semantic!("DOP {:?} has no DIAG-CODED-TYPE", d.short_name))?;
        let physical = d
            .physical_type
            .ok_or_else(|| semantic!("DOP {:?} has no PHYSICAL-TYPE", d.short_name))?;
        let compu = d
            .compu_method
            .ok_or_else(|| semantic!("DOP {:?} has no COMPU-METHOD", d.short_name))?;
        self.build_dop_parts(
            dct,
            Some(physical),
            Some(compu),
            d.units_ref,
            d.internal_constraint_ref,
            d.physical_constraint_ref,
        )
    }

    fn build_dop_parts(
        &self,
        dct: DiagCodedType,
        physical: Option<PhysicalType>,
        compu_method: Option<CompuMethod>,
        units_ref: Option<Reference>,
        internal_constraint_ref: Option<Reference>,
        physical_constraint_ref: Option<Reference>,
    ) -> Result<DataNode> {
        if dct.is_condensed_bit_mask {
            return Err(semantic!("BIT-MASK is CONDENSED"));
        }

        let coded = dct.base_data_type.mcd_equivalent();

        let coded_length = match dct.kind {
            DiagCodedKind::LeadingLengthInfo => {
                let bit_length = dct.bit_length.unwrap_or(0);
                if bit_length == 0 {
                    return Err(semantic!("invalid BIT-LENGTH: {bit_length}"));
                }
                CodedLength::LeadingLengthInfo { bit_length }
            }
            DiagCodedKind::MinMaxLength => CodedLength::MinMaxLength {
                min_length: dct.min_length.unwrap_or(0),
                max_length: dct.max_length.unwrap_or(0),
                termination: dct
                    .termination
                    .ok_or_else(|| semantic!("MIN-MAX-LENGTH-TYPE has no TERMINATION"))?,
            },
            DiagCodedKind::StandardLength => {
                let bit_length = dct.bit_length.unwrap_or(0);
                if bit_length == 0 {
                    return Err(semantic!("invalid BIT-LENGTH: {bit_length}"));
                }
                CodedLength::Standard {
                    bit_length,
                    bit_mask: if dct.bit_mask.is_empty() {
                        None
                    } else {
                        Some(dct.bit_mask.clone())
                    },
                }
            }
            DiagCodedKind::ParamLengthInfo => {
                return Err(semantic!(
                    "unknown DIAG-CODED-TYPE type: {}",
                    dct.kind.name()
                ))
            }
        };

        // Length restrictions per base type. A couple of violations are
        // known to exist in shipped databases and demote to invalid nodes.
        match &coded_length {
            CodedLength::MinMaxLength { .. } => {
                if !matches!(
                    coded,
                    BaseType::ByteField
                        | BaseType::AsciiString
                        | BaseType::Unicode2String
                        | BaseType::Utf8String
                ) {
                    return Err(semantic!(
                        "MIN-MAX-LENGTH-TYPE not allowed for BASE-DATA-TYPE {}",
                        coded.name()
                    ));
                }
            }
            CodedLength::Standard { bit_length, .. }
            | CodedLength::LeadingLengthInfo { bit_length } => {
                let bit_length = *bit_length;
                match coded {
                    BaseType::Int32 | BaseType::UInt32 => {
                        if !(1..=32).contains(&bit_length) {
                            return Ok(DataNode::Invalid {
                                message: format!(
                                    "BIT-LENGTH for {} must be between 1 and 32, not {bit_length}",
                                    coded.name()
                                ),
                            });
                        }
                    }
                    BaseType::Float32 => {
                        if bit_length != 32 {
                            return Err(semantic!(
                                "BIT-LENGTH for A_FLOAT32 must be 32, not {bit_length}"
                            ));
                        }
                    }
                    BaseType::Float64 => {
                        if bit_length != 64 {
                            return Err(semantic!(
                                "BIT-LENGTH for A_FLOAT64 must be 64, not {bit_length}"
                            ));
                        }
                    }
                    BaseType::AsciiString | BaseType::Utf8String => {
                        if bit_length % 8 != 0 {
                            return Err(semantic!(
                                "BIT-LENGTH for {} must be multiple of 8, not {bit_length}",
                                coded.name()
                            ));
                        }
                    }
                    BaseType::Unicode2String => {
                        if bit_length % 16 != 0 {
                            return Ok(DataNode::Invalid {
                                message: format!(
                                    "BIT-LENGTH for A_UNICODE2STRING must be multiple of 16, not {bit_length}"
                                ),
                            });
                        }
                    }
                    BaseType::ByteField | BaseType::BitField => {}
                }
            }
        }

        let encoding = dct.encoding;
        if encoding == Encoding::None && coded == BaseType::Float64 {
            return Ok(DataNode::Invalid {
                message: format!(
                    "invalid ENCODING for {}: {}",
                    coded.name(),
                    encoding.name()
                ),
            });
        }
        check_encoding_against_coded_type(encoding, coded)?;

        let endianness = if dct.is_high_low_byte_order {
            Endianness::Big
        } else {
            Endianness::Little
        };

        let mut physical_base_data_type = None;
        let mut display_radix = None;
        let mut precision = None;
        if let Some(pt) = &physical {
            let phys = pt.base_data_type.mcd_equivalent();
            physical_base_data_type = Some(phys);

            if ![2, 8, 10, 16].contains(&pt.display_radix) {
                return Err(semantic!("invalid DISPLAY-RADIX: {}", pt.display_radix));
            }
            // The radix only applies to unsigned integer physicals.
            display_radix = (phys == BaseType::UInt32).then_some(pt.display_radix);

            precision = pt.precision;
            if precision.is_some() && !phys.is_float() {
                return Err(semantic!(
                    "PRECISION given for non-float PHYSICAL-TYPE {}: {:?}",
                    phys.name(),
                    precision
                ));
            }
        }

        let units = match &units_ref {
            Some(reference) => Some(self.build_unit(reference)?),
            None => None,
        };

        let internal_constraint = match &internal_constraint_ref {
            Some(reference) => Some(self.build_internal_constraint(reference, coded)?),
            None => None,
        };

        let physical_constraint = match &physical_constraint_ref {
            Some(reference) => {
                let phys = physical_base_data_type
                    .ok_or_else(|| semantic!("PHYS-CONSTR without PHYSICAL-TYPE"))?;
                if phys.is_string() {
                    return Err(semantic!(
                        "PHYS-CONSTR only allowed for numerical physical types, not {}",
                        phys.name()
                    ));
                }
                Some(self.build_physical_constraint(reference, phys)?)
            }
            None => None,
        };

        let mut compu = None;
        let mut calculation = None;
        if let Some(method) = compu_method {
            let phys = physical_base_data_type
                .ok_or_else(|| semantic!("COMPU-METHOD without PHYSICAL-TYPE"))?;

            if method.compu_category != CompuCategory::Identical {
                calculation = Some(if coded.is_float() || phys.is_float() {
                    CalcType::Float64
                } else if coded == BaseType::UInt32 && phys == BaseType::UInt32 {
                    CalcType::UInt32
                } else {
                    CalcType::Int32
                });
            }
            compu = Some(self.build_compu(method, coded, phys)?);
        }

        Ok(DataNode::Dop(Dop {
            coded_base_data_type: coded,
            coded: coded_length,
            encoding,
            endianness,
            physical_base_data_type,
            display_radix,
            precision,
            units,
            internal_constraint,
            physical_constraint,
            compu,
            calculation,
        }))
    }

    // ── Computation methods ─────────────────────────────────────────────────

    fn build_compu(
        &self,
        method: CompuMethod,
        coded: BaseType,
        physical: BaseType,
    ) -> Result<Compu> {
        match method.compu_category {
            CompuCategory::Identical => {
                if method.compu_internal_to_phys.is_some() || method.compu_phys_to_internal.is_some()
                {
                    return Err(semantic!(
                        "COMPU-INTERNAL-TO-PHYS and COMPU-PHYS-TO-INTERNAL are not allowed for IDENTICAL"
                    ));
                }
                Ok(Compu::Identical)
            }
            CompuCategory::Linear | CompuCategory::RatFunc => {
                let scales = internal_to_phys_scales(&method)?;
                if scales.len() != 1 {
                    return Err(semantic!(
                        "exactly one COMPU-SCALE must be defined, not {}",
                        scales.len()
                    ));
                }
                check_rational_types(coded, physical)?;
                let scale = build_compu_scale(
                    &scales[0],
                    coded,
                    physical,
                    method.compu_category == CompuCategory::RatFunc,
                )?;
                Ok(if method.compu_category == CompuCategory::Linear {
                    Compu::Linear(scale)
                } else {
                    Compu::RatFunc(scale)
                })
            }
            CompuCategory::ScaleLinear | CompuCategory::ScaleRatFunc => {
                let raw_scales = internal_to_phys_scales(&method)?;
                if raw_scales.is_empty() {
                    return Err(semantic!(
                        "at least one COMPU-SCALE must be defined, not {}",
                        raw_scales.len()
                    ));
                }
                check_rational_types(coded, physical)?;
                let rational = method.compu_category == CompuCategory::ScaleRatFunc;
                let mut scales = Vec::with_capacity(raw_scales.len());
                for raw in raw_scales {
                    scales.push(build_compu_scale(raw, coded, physical, rational)?);
                }
                let default_value = unicode_default_value(&method)?;
                Ok(if rational {
                    Compu::ScaleRatFunc {
                        scales,
                        default_value,
                    }
                } else {
                    Compu::ScaleLinear {
                        scales,
                        default_value,
                    }
                })
            }
            CompuCategory::Texttable => {
                let raw_scales = internal_to_phys_scales(&method)?;
                if raw_scales.is_empty() {
                    return Err(semantic!(
                        "at least one COMPU-SCALE must be defined for TEXTTABLE"
                    ));
                }
                if physical != BaseType::Unicode2String {
                    return Err(semantic!(
                        "physical BASE-DATA-TYPE {} not allowed for TEXTTABLE",
                        physical.name()
                    ));
                }
                if coded == BaseType::BitField {
                    return Err(semantic!(
                        "coded BASE-DATA-TYPE {} not allowed for TEXTTABLE",
                        coded.name()
                    ));
                }

                let mut scales = Vec::with_capacity(raw_scales.len());
                for raw in raw_scales {
                    scales.push(build_text_scale(raw, coded, physical)?);
                }

                let default_value = match default_value_of(&method) {
                    Some(value) => {
                        check_value_type(value, physical, "COMPU-DEFAULT-VALUE", "physical")?;
                        value.as_str().map(str::to_owned)
                    }
                    None => None,
                };
                Ok(Compu::Texttable {
                    scales,
                    default_value,
                })
            }
            CompuCategory::TabIntp => {
                let raw_scales = internal_to_phys_scales(&method)?;
                if raw_scales.len() < 2 {
                    return Err(semantic!(
                        "TAB-INTP must specify at least 2 COMPU-SCALEs, not {}",
                        raw_scales.len()
                    ));
                }
                check_rational_types(coded, physical)?;

                let mut points = Vec::with_capacity(raw_scales.len());
                for raw in raw_scales {
                    let limit = raw
                        .lower_limit_as_coded_value
                        .as_ref()
                        .ok_or_else(|| semantic!("TAB-INTP COMPU-SCALE has no LOWER-LIMIT"))?;
                    let value = limit_value(limit, coded, "TAB-INTP LOWER-LIMIT", "coded")?;
                    if limit.limit_type != LimitKind::Closed {
                        return Err(semantic!(
                            "LOWER-LIMIT type for COMPU-SCALE of TAB-INTP must be CLOSED, not {}",
                            limit.limit_type.name()
                        ));
                    }
                    let compu_const = raw
                        .compu_const
                        .as_ref()
                        .ok_or_else(|| semantic!("TAB-INTP COMPU-SCALE has no COMPU-CONST"))?;
                    if compu_const.data_type() != McdDataType::Unicode2String {
                        return Err(semantic!(
                            "COMPU-CONST is not string: {}",
                            compu_const.data_type().name()
                        ));
                    }
                    points.push(TabPoint {
                        limit: value,
                        value_text: compu_const.as_str().map(str::to_owned),
                    });
                }
                Ok(Compu::TabIntp { points })
            }
            CompuCategory::Compucode => Err(semantic!("unknown computation category: COMPUCODE")),
        }
    }

    // ── Units and constraints ───────────────────────────────────────────────

    fn build_unit(&self, reference: &Reference) -> Result<Unit> {
        let unit = self.resolver.load_by_reference(reference)?.into_unit()?;
        let si_unit = unit.physical_dimension.as_ref().map(|dim| SiUnit {
            length_exponent: dim.length_exponent,
            mass_exponent: dim.mass_exponent,
            time_exponent: dim.time_exponent,
            current_exponent: dim.current_exponent,
            temperature_exponent: dim.temperature_exponent,
            molar_amount_exponent: dim.molar_amount_exponent,
            luminous_intensity_exponent: dim.luminous_intensity_exponent,
        });
        Ok(Unit {
            long_name: unit.long_name,
            long_name_id: unit.long_name_id,
            description: unit.description,
            display_name: unit.display_name,
            factor_si_to_unit: unit.factor_si_to_unit,
            offset_si_to_unit: unit.offset_si_to_unit,
            si_unit,
        })
    }

    fn build_internal_constraint(
        &self,
        reference: &Reference,
        coded: BaseType,
    ) -> Result<Constraint> {
        let constraint = self
            .resolver
            .load_by_reference(reference)?
            .into_constraint()?;
        if constraint.is_computed {
            return Err(semantic!("INTERNAL-CONSTR should not be computed"));
        }
        let interval = constraint
            .interval
            .ok_or_else(|| semantic!("INTERNAL-CONSTR has no interval"))?;

        let (lower_limit, upper_limit) =
            interval_limits(&interval, Some(coded), "INTERNAL-CONSTR", "coded", true)?;

        let raw_scales = constraint
            .scale_constraints
            .ok_or_else(|| semantic!("INTERNAL-CONSTR has no SCALE-CONSTRS"))?;
        let mut scale_constraints = Vec::with_capacity(raw_scales.len());
        for raw in raw_scales {
            let interval = raw
                .interval
                .ok_or_else(|| semantic!("SCALE-CONSTR has no interval"))?;
            let (lower, upper) =
                interval_limits(&interval, Some(coded), "SCALE-CONSTR", "coded", true)?;
            scale_constraints.push(ScaleConstraint {
                lower_limit: lower,
                upper_limit: upper,
                validity: raw.range_info,
                short_label: raw.short_label,
                description: raw.description,
            });
        }

        Ok(Constraint {
            lower_limit,
            upper_limit,
            scale_constraints,
        })
    }

    fn build_physical_constraint(
        &self,
        reference: &Reference,
        physical: BaseType,
    ) -> Result<Constraint> {
        let constraint = self
            .resolver
            .load_by_reference(reference)?
            .into_constraint()?;
        if !constraint.is_computed {
            return Err(semantic!("PHYS-CONSTR should be computed"));
        }
        let interval = constraint
            .interval
            .ok_or_else(|| semantic!("PHYS-CONSTR has no interval"))?;
        let (lower_limit, upper_limit) =
            interval_limits(&interval, Some(physical), "PHYS-CONSTR", "physical", false)?;

        let raw_scales = constraint
            .scale_constraints
            .ok_or_else(|| semantic!("PHYS-CONSTR has no SCALE-CONSTRS"))?;
        let mut scale_constraints = Vec::with_capacity(raw_scales.len());
        for raw in raw_scales {
            let interval = raw
                .interval
                .ok_or_else(|| semantic!("SCALE-CONSTR has no interval"))?;
            let (lower, upper) =
                interval_limits(&interval, Some(physical), "SCALE-CONSTR", "physical", false)?;
            scale_constraints.push(ScaleConstraint {
                lower_limit: lower,
                upper_limit: upper,
                validity: raw.range_info,
                short_label: raw.short_label,
                description: raw.description,
            });
        }

        Ok(Constraint {
            lower_limit,
            upper_limit,
            scale_constraints,
        })
    }

    // ── Structures, multiplexers, DTCs ──────────────────────────────────────

    fn build_structure(&self, s: StructureRaw) -> Result<DataNode> {
        let parameters_raw = s
            .parameters
            .ok_or_else(|| semantic!("STRUCTURE {:?} has no parameters", s.short_name))?;
        let mut parameters = Vec::with_capacity(parameters_raw.len());
        for raw in parameters_raw {
            let raw = raw.ok_or_else(|| semantic!("absent parameter in STRUCTURE"))?;
            parameters.push(self.build(raw)?);
        }
        Ok(DataNode::Structure(Structure {
            long_name: s.long_name,
            description: s.description,
            byte_size: match s.byte_size {
                0 => None,
                size => Some(size as u32),
            },
            parameters,
        }))
    }

    fn load_structure(&self, reference: &Reference) -> Result<DataNode> {
        let raw = self.resolver.load_by_reference(reference)?;
        match raw {
            RawObject::Structure(s) => self.build_structure(s),
            other => Err(semantic!(
                "object is not BASIC-STRUCTURE: {}",
                other.type_name()
            )),
        }
    }

    fn build_mux(&self, m: MultiplexerRaw) -> Result<DataNode> {
        let switch_key_raw = m
            .switch_key
            .ok_or_else(|| semantic!("MUX has no SWITCH-KEY"))?;

        let switch_dop = self
            .build(self.resolver.load_by_reference(&switch_key_raw.dop_base_ref)?)?;
        let switch_dop = expect_dop(switch_dop, "SWITCH-KEY DOP")?;
        if !matches!(switch_dop.coded, CodedLength::Standard { .. }) {
            return Err(semantic!(
                "invalid DIAG-CODED-TYPE for SWITCH-KEY DOP: {}",
                switch_dop.coded.name()
            ));
        }
        check_bit_position(switch_key_raw.bit_position)?;

        let cases_raw = m.cases.ok_or_else(|| semantic!("MUX has no CASES"))?;
        let mut cases = Vec::with_capacity(cases_raw.len());
        for case in cases_raw {
            if case.lower_limit.limit_type != LimitKind::Closed
                || case.upper_limit.limit_type != LimitKind::Closed
            {
                return Err(semantic!(
                    "unexpected SWITCH-CASE limit types: {}, {}",
                    case.lower_limit.limit_type.name(),
                    case.upper_limit.limit_type.name()
                ));
            }
            let lower = case
                .lower_limit
                .mcd_value
                .ok_or_else(|| semantic!("SWITCH-CASE lower limit has no value"))?;
            let upper = case
                .upper_limit
                .mcd_value
                .ok_or_else(|| semantic!("SWITCH-CASE upper limit has no value"))?;
            // The case limits are stored as Unicode strings in every known
            // project; the switch value is matched against them numerically
            // when they parse, textually otherwise.
            if lower.data_type() != McdDataType::Unicode2String
                || upper.data_type() != McdDataType::Unicode2String
            {
                return Err(semantic!(
                    "SWITCH-CASE limits are not strings: {}, {}",
                    lower.data_type().name(),
                    upper.data_type().name()
                ));
            }

            let structure_ref = case
                .base
                .structure_dop_ref
                .as_ref()
                .ok_or_else(|| semantic!("SWITCH-CASE references no structure"))?;
            let structure = self.load_structure(structure_ref)?;

            cases.push(MuxCase {
                long_name: case.base.long_name,
                description: case.base.description,
                lower_limit: lower,
                upper_limit: upper,
                structure: Box::new(structure),
            });
        }

        let default_case = match m.default_case {
            Some(CaseBase {
                structure_dop_ref: Some(structure_ref),
                description,
                long_name,
                ..
            }) => {
                if let Some(description) = description {
                    return Err(semantic!("DEFAULT-CASE has DESCRIPTION: {description}"));
                }
                let structure = self.load_structure(&structure_ref)?;
                Some(MuxDefaultCase {
                    long_name,
                    structure: Box::new(structure),
                })
            }
            _ => None,
        };

        Ok(DataNode::Mux(Mux {
            byte_position: m.byte_position,
            switch_key: SwitchKey {
                byte_position: switch_key_raw.byte_position,
                bit_position: switch_key_raw.bit_position,
                dop: Box::new(switch_dop),
            },
            cases,
            default_case,
        }))
    }

    fn build_dtc(&self, d: DopDtcRaw) -> Result<DataNode> {
        let dct = d
            .diag_coded_type
            .ok_or_else(|| semantic!("DTC DOP has no DIAG-CODED-TYPE"))?;
        let physical = d
            .physical_type
            .ok_or_else(|| semantic!("DTC DOP has no PHYSICAL-TYPE"))?;
        let compu = d
            .compu_method
            .ok_or_else(|| semantic!("DTC DOP has no COMPU-METHOD"))?;

        if dct.kind != DiagCodedKind::StandardLength {
            return Err(semantic!(
                "DTC DIAG-CODED-TYPE must be STANDARD-LENGTH-TYPE, not {}",
                dct.kind.name()
            ));
        }
        if dct.bit_length != Some(24) {
            return Err(semantic!(
                "DTC BIT-LENGTH must be 24, not {:?}",
                dct.bit_length
            ));
        }
        if !dct.bit_mask.is_empty() {
            return Err(semantic!("DTC must have no BIT-MASK"));
        }
        if dct.encoding != Encoding::None {
            return Err(semantic!(
                "DTC ENCODING must be NONE, not {}",
                dct.encoding.name()
            ));
        }
        if !dct.is_high_low_byte_order {
            return Err(semantic!("DTC IS-HIGH-LOW-BYTE-ORDER must be true"));
        }
        if dct.base_data_type.mcd_equivalent() != BaseType::UInt32 {
            return Err(semantic!(
                "DTC coded BASE-DATA-TYPE must be A_UINT32, not {}",
                dct.base_data_type.name()
            ));
        }
        if physical.base_data_type != BaseType::UInt32 {
            return Err(semantic!(
                "DTC physical BASE-DATA-TYPE must be A_UINT32, not {}",
                physical.base_data_type.name()
            ));
        }
        if compu.compu_category != CompuCategory::Identical {
            return Err(semantic!(
                "DTC COMPU-METHOD CATEGORY must be IDENTICAL, not {}",
                compu.compu_category.name()
            ));
        }

        let mut dtc_list = Vec::with_capacity(d.diag_trouble_codes_ref_map.len());
        for (map_key, reference) in &d.diag_trouble_codes_ref_map {
            let dtc = self
                .resolver
                .load_by_reference(reference)?
                .into_diag_trouble_code()?;
            if dtc.trouble_code != *map_key {
                return Err(semantic!(
                    "trouble code {:06X} does not match map key {:06X}",
                    dtc.trouble_code,
                    map_key
                ));
            }
            dtc_list.push(DtcDefinition {
                trouble_code: dtc.trouble_code,
                dtc_text: dtc.trouble_code_text,
                level: dtc.level,
                description: dtc.description,
                short_name: dtc.short_name,
                label: dtc.label,
            });
        }

        Ok(DataNode::Dtc(Dtc {
            short_name: d.short_name,
            long_name: d.long_name,
            dop: Dop {
                coded_base_data_type: BaseType::UInt32,
                coded: CodedLength::Standard {
                    bit_length: 24,
                    bit_mask: None,
                },
                encoding: Encoding::None,
                endianness: Endianness::Big,
                physical_base_data_type: Some(BaseType::UInt32),
                display_radix: Some(16),
                precision: None,
                units: None,
                internal_constraint: None,
                physical_constraint: None,
                compu: Some(Compu::Identical),
                calculation: None,
            },
            dtc_list,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Free helpers
// ─────────────────────────────────────────────────────────────────────────────

fn check_bit_position(bit_position: u8) -> Result<()> {
    if bit_position > 7 {
        return Err(semantic!(
            "BIT-POSITION {bit_position} not between [0, 7]"
        ));
    }
    Ok(())
}

fn expect_dop(node: DataNode, what: &str) -> Result<Dop> {
    match node {
        DataNode::Dop(dop) => Ok(dop),
        DataNode::Invalid { message } => Err(semantic!("{what}: {message}")),
        other => Err(semantic!(
            "{what} must be a simple DOP, not {}",
            other.kind_name()
        )),
    }
}

/// The ODX rules for which encodings may accompany which coded base types.
fn check_encoding_against_coded_type(encoding: Encoding, coded: BaseType) -> Result<()> {
    let allowed: &[BaseType] = match encoding {
        Encoding::BcdUp => &[BaseType::ByteField],
        Encoding::BcdP => &[BaseType::UInt32, BaseType::ByteField],
        Encoding::TwosComplement | Encoding::OnesComplement | Encoding::SignMagnitude => {
            &[BaseType::Int32]
        }
        Encoding::Ieee754 => &[BaseType::Float32, BaseType::Float64],
        Encoding::Iso8859_1 => &[BaseType::AsciiString],
        Encoding::Ucs2 | Encoding::Utf8 => &[BaseType::Unicode2String],
        Encoding::None => &[BaseType::UInt32, BaseType::ByteField, BaseType::BitField],
        Encoding::Iso8859_2 | Encoding::Windows1252 => {
            return Err(semantic!(
                "unknown ENCODING (for {}): {}",
                coded.name(),
                encoding.name()
            ))
        }
    };
    if !allowed.contains(&coded) {
        return Err(semantic!(
            "invalid ENCODING for {}: {}",
            coded.name(),
            encoding.name()
        ));
    }
    Ok(())
}

fn internal_to_phys_scales(method: &CompuMethod) -> Result<&Vec<CompuScaleRaw>> {
    method
        .compu_internal_to_phys
        .as_ref()
        .and_then(|base| base.compu_scales.as_ref())
        .ok_or_else(|| semantic!("COMPU-METHOD has no COMPU-INTERNAL-TO-PHYS scales"))
}

fn default_value_of(method: &CompuMethod) -> Option<&McdValue> {
    method
        .compu_internal_to_phys
        .as_ref()
        .and_then(|base| base.compu_default_value.as_ref())
}

/// Scale default values are stored as Unicode strings even for numeric
/// physicals; the decoder converts them through the physical type's parser.
fn unicode_default_value(method: &CompuMethod) -> Result<Option<String>> {
    match default_value_of(method) {
        None => Ok(None),
        Some(value) => {
            if value.data_type() != McdDataType::Unicode2String {
                return Err(semantic!(
                    "COMPU-DEFAULT-VALUE data type is not A_UNICODE2STRING: {}",
                    value.data_type().name()
                ));
            }
            Ok(value.as_str().map(str::to_owned))
        }
    }
}

fn check_value_type(
    value: &McdValue,
    expected: BaseType,
    what: &str,
    side: &str,
) -> Result<()> {
    if value.data_type() != expected.as_mcd() {
        return Err(semantic!(
            "{what} data type does not match {side} type: {} vs {}",
            value.data_type().name(),
            expected.name()
        ));
    }
    Ok(())
}

/// Limits both sides of the rational categories can use.
fn check_rational_types(coded: BaseType, physical: BaseType) -> Result<()> {
    const NUMERIC: [BaseType; 4] = [
        BaseType::Int32,
        BaseType::UInt32,
        BaseType::Float32,
        BaseType::Float64,
    ];
    if !NUMERIC.contains(&coded) {
        return Err(semantic!(
            "coded BASE-DATA-TYPE {} not allowed for this computation",
            coded.name()
        ));
    }
    if !NUMERIC.contains(&physical) {
        return Err(semantic!(
            "physical BASE-DATA-TYPE {} not allowed for this computation",
            physical.name()
        ));
    }
    Ok(())
}

/// Closed/open limit from a raw limit record, checking the value's type.
fn limit_value(
    limit: &LimitRaw,
    expected: BaseType,
    what: &str,
    side: &str,
) -> Result<McdValue> {
    let value = limit
        .mcd_value
        .as_ref()
        .ok_or_else(|| semantic!("{what} has no value"))?;
    check_value_type(value, expected, what, side)?;
    Ok(value.clone())
}

fn limit_from_raw(
    limit: Option<&LimitRaw>,
    expected: BaseType,
    what: &str,
    side: &str,
) -> Result<Limit> {
    match limit {
        None => Ok(Limit::infinite()),
        Some(raw) => {
            if raw.limit_type == LimitKind::Infinite {
                return Ok(Limit::infinite());
            }
            Ok(Limit {
                kind: raw.limit_type,
                value: Some(limit_value(raw, expected, what, side)?),
            })
        }
    }
}

/// Limits of a constraint interval. Internal constraints require both limit
/// values to be present and typed; physical constraints allow absent limits
/// (treated as infinite).
fn interval_limits(
    interval: &Interval,
    expected: Option<BaseType>,
    what: &str,
    side: &str,
    values_required: bool,
) -> Result<(Limit, Limit)> {
    let one = |value: &Option<McdValue>, kind: LimitKind| -> Result<Limit> {
        match value {
            None if values_required => Err(semantic!("{what} limit has no value")),
            None => Ok(Limit::infinite()),
            Some(v) => {
                if let Some(expected) = expected {
                    if v.data_type() != expected.as_mcd() {
                        return Err(semantic!(
                            "{what} limit data type does not match {side} type: {} vs {}",
                            v.data_type().name(),
                            expected.name()
                        ));
                    }
                }
                Ok(Limit {
                    kind,
                    value: (kind != LimitKind::Infinite).then(|| v.clone()),
                })
            }
        }
    };
    Ok((
        one(&interval.lower_limit, interval.lower_limit_type)?,
        one(&interval.upper_limit, interval.upper_limit_type)?,
    ))
}

/// The four limits plus the formula of one computation scale.
fn build_compu_scale(
    raw: &CompuScaleRaw,
    coded: BaseType,
    physical: BaseType,
    rational: bool,
) -> Result<CompuScale> {
    let coeffs = raw
        .compu_rational_coeffs
        .as_ref()
        .ok_or_else(|| semantic!("COMPU-SCALE has no COMPU-RATIONAL-COEFFS"))?;

    let formula = if rational {
        // A zero denominator polynomial would divide by zero everywhere.
        if coeffs.denominator.iter().all(|&c| c == 0.0) {
            return Err(semantic!("denominator is 0"));
        }
        Formula::Rational {
            numerator: coeffs.numerator.clone(),
            denominator: coeffs.denominator.clone(),
        }
    } else {
        let (offset, factor) = match coeffs.numerator.len() {
            0 => (0.0, 1.0),
            1 => (coeffs.numerator[0], 1.0),
            2 => (coeffs.numerator[0], coeffs.numerator[1]),
            n => {
                return Err(semantic!(
                    "unexpected amount of values in numerator: {n}"
                ))
            }
        };
        let divisor = match coeffs.denominator.len() {
            0 => 1.0,
            1 => coeffs.denominator[0],
            n => {
                return Err(semantic!(
                    "the denominator should contain zero or one values; contains: {n}"
                ))
            }
        };
        Formula::Linear {
            offset,
            factor,
            divisor,
        }
    };

    Ok(CompuScale {
        coded_lower_limit: limit_from_raw(
            raw.lower_limit_as_coded_value.as_ref(),
            coded,
            "COMPU-SCALE coded LOWER-LIMIT",
            "coded",
        )?,
        coded_upper_limit: limit_from_raw(
            raw.upper_limit_as_coded_value.as_ref(),
            coded,
            "COMPU-SCALE coded UPPER-LIMIT",
            "coded",
        )?,
        physical_lower_limit: limit_from_raw(
            raw.lower_limit.as_ref(),
            physical,
            "COMPU-SCALE physical LOWER-LIMIT",
            "physical",
        )?,
        physical_upper_limit: limit_from_raw(
            raw.upper_limit.as_ref(),
            physical,
            "COMPU-SCALE physical UPPER-LIMIT",
            "physical",
        )?,
        formula,
    })
}

fn build_text_scale(
    raw: &CompuScaleRaw,
    coded: BaseType,
    physical: BaseType,
) -> Result<TextScale> {
    let lower = raw
        .lower_limit_as_coded_value
        .as_ref()
        .ok_or_else(|| semantic!("TEXTTABLE COMPU-SCALE has no LOWER-LIMIT"))?;
    let upper = raw
        .upper_limit_as_coded_value
        .as_ref()
        .ok_or_else(|| semantic!("TEXTTABLE COMPU-SCALE has no UPPER-LIMIT"))?;

    if lower.limit_type != LimitKind::Closed || upper.limit_type != LimitKind::Closed {
        return Err(semantic!(
            "unexpected LOWER/UPPER-LIMIT types: {}, {}",
            lower.limit_type.name(),
            upper.limit_type.name()
        ));
    }

    let lower = limit_value(lower, coded, "TEXTTABLE coded LOWER-LIMIT", "coded")?;
    let upper = limit_value(upper, coded, "TEXTTABLE coded UPPER-LIMIT", "coded")?;

    // String-typed tables cannot express ranges; both limits must carry the
    // same string.
    if coded.is_string() && lower != upper {
        return Err(semantic!(
            "UPPER-LIMIT does not match LOWER-LIMIT for TEXTTABLE with string coded data type"
        ));
    }

    let compu_const = raw
        .compu_const
        .as_ref()
        .ok_or_else(|| semantic!("TEXTTABLE COMPU-SCALE has no COMPU-CONST"))?;
    check_value_type(compu_const, physical, "COMPU-CONST", "physical")?;

    Ok(TextScale {
        lower_limit: lower,
        upper_limit: upper,
        text: compu_const.as_str().map(str::to_owned),
        text_id: raw.long_name_id.clone(),
    })
}
