//! Normalized description tree.
//!
//! The builder (see [`build`]) turns the raw object graph into this owned,
//! acyclic model carrying exactly what response decoding needs. DOPs that are
//! referenced from several parameters are cloned into each use site, so a
//! node never aliases another.

pub mod build;

use crate::object::common::McdValue;
use crate::object::enums::{BaseType, Encoding, Endianness, LimitKind, Termination, Validity};

/// One bound of an interval. `Infinite` bounds carry no value.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub kind: LimitKind,
    pub value: Option<McdValue>,
}

impl Limit {
    pub fn infinite() -> Limit {
        Limit {
            kind: LimitKind::Infinite,
            value: None,
        }
    }
}

/// Sub-interval of a constraint with a validity marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConstraint {
    pub lower_limit: Limit,
    pub upper_limit: Limit,
    pub validity: Validity,
    pub short_label: Option<String>,
    pub description: Option<String>,
}

/// Internal or physical constraint: an interval plus scale constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub lower_limit: Limit,
    pub upper_limit: Limit,
    pub scale_constraints: Vec<ScaleConstraint>,
}

/// Conversion formula of a computation scale, evaluated directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// `(offset + x * factor) / divisor`
    Linear {
        offset: f64,
        factor: f64,
        divisor: f64,
    },
    /// `polynomial(numerator) / polynomial(denominator)`, coefficients in
    /// ascending order of power.
    Rational {
        numerator: Vec<f64>,
        denominator: Vec<f64>,
    },
}

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * x + c)
}

impl Formula {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Formula::Linear {
                offset,
                factor,
                divisor,
            } => (offset + x * factor) / divisor,
            Formula::Rational {
                numerator,
                denominator,
            } => polynomial(numerator, x) / polynomial(denominator, x),
        }
    }
}

/// One computation scale: a coded and a physical interval plus the formula.
#[derive(Debug, Clone, PartialEq)]
pub struct CompuScale {
    pub coded_lower_limit: Limit,
    pub coded_upper_limit: Limit,
    pub physical_lower_limit: Limit,
    pub physical_upper_limit: Limit,
    pub formula: Formula,
}

/// One text-table scale: closed coded interval and the resulting text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextScale {
    pub lower_limit: McdValue,
    pub upper_limit: McdValue,
    pub text: Option<String>,
    pub text_id: Option<String>,
}

/// One interpolation point: the coded value and the physical value (stored
/// as text in the database, parsed when used).
#[derive(Debug, Clone, PartialEq)]
pub struct TabPoint {
    pub limit: McdValue,
    pub value_text: Option<String>,
}

/// Result type of a computation, derived from the coded and physical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcType {
    Int32,
    UInt32,
    Float64,
}

/// Normalized computation method.
#[derive(Debug, Clone, PartialEq)]
pub enum Compu {
    Identical,
    Linear(CompuScale),
    RatFunc(CompuScale),
    ScaleLinear {
        scales: Vec<CompuScale>,
        default_value: Option<String>,
    },
    ScaleRatFunc {
        scales: Vec<CompuScale>,
        default_value: Option<String>,
    },
    Texttable {
        scales: Vec<TextScale>,
        default_value: Option<String>,
    },
    TabIntp {
        points: Vec<TabPoint>,
    },
}

impl Compu {
    pub fn category_name(&self) -> &'static str {
        match self {
            Compu::Identical => "IDENTICAL",
            Compu::Linear(_) => "LINEAR",
            Compu::RatFunc(_) => "RAT-FUNC",
            Compu::ScaleLinear { .. } => "SCALE-LINEAR",
            Compu::ScaleRatFunc { .. } => "SCALE-RAT-FUNC",
            Compu::Texttable { .. } => "TEXTTABLE",
            Compu::TabIntp { .. } => "TAB-INTP",
        }
    }
}

/// How the coded value's length is determined.
#[derive(Debug, Clone, PartialEq)]
pub enum CodedLength {
    Standard {
        bit_length: u32,
        bit_mask: Option<Vec<u8>>,
    },
    LeadingLengthInfo {
        bit_length: u32,
    },
    MinMaxLength {
        min_length: u32,
        max_length: u32,
        termination: Termination,
    },
}

impl CodedLength {
    pub fn name(&self) -> &'static str {
        match self {
            CodedLength::Standard { .. } => "STANDARD-LENGTH-TYPE",
            CodedLength::LeadingLengthInfo { .. } => "LEADING-LENGTH-INFO-TYPE",
            CodedLength::MinMaxLength { .. } => "MIN-MAX-LENGTH-TYPE",
        }
    }
}

/// SI exponents of a unit's physical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiUnit {
    pub length_exponent: i32,
    pub mass_exponent: i32,
    pub time_exponent: i32,
    pub current_exponent: i32,
    pub temperature_exponent: i32,
    pub molar_amount_exponent: i32,
    pub luminous_intensity_exponent: i32,
}

/// Display unit of a DOP.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub long_name: Option<String>,
    pub long_name_id: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub factor_si_to_unit: f64,
    pub offset_si_to_unit: f64,
    pub si_unit: Option<SiUnit>,
}

/// The full decoding contract of a simple data object property.
///
/// The physical side is optional: constant and reserved parameters embed a
/// coded-only DOP whose physical behaviour defaults to the coded type with
/// an identical conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Dop {
    pub coded_base_data_type: BaseType,
    pub coded: CodedLength,
    pub encoding: Encoding,
    pub endianness: Endianness,
    pub physical_base_data_type: Option<BaseType>,
    pub display_radix: Option<u8>,
    pub precision: Option<u16>,
    pub units: Option<Unit>,
    pub internal_constraint: Option<Constraint>,
    pub physical_constraint: Option<Constraint>,
    pub compu: Option<Compu>,
    pub calculation: Option<CalcType>,
}

impl Dop {
    /// The physical type used for decode and display: explicitly given, or
    /// the coded type when the DOP has no physical side.
    pub fn physical_type(&self) -> BaseType {
        self.physical_base_data_type
            .unwrap_or(self.coded_base_data_type)
    }
}

/// Parameter kind after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Value,
    Reserved,
    CodedConst,
    PhysConst,
}

impl ParameterKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterKind::Value => "VALUE",
            ParameterKind::Reserved => "RESERVED",
            ParameterKind::CodedConst => "CODED-CONST",
            ParameterKind::PhysConst => "PHYS-CONST",
        }
    }
}

/// One positional parameter of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub long_name: Option<String>,
    pub long_name_id: Option<String>,
    pub description: Option<String>,
    pub byte_position: Option<u32>,
    pub bit_position: u8,
    pub kind: ParameterKind,
    /// Physical default for VALUE/RESERVED parameters.
    pub default_value: Option<McdValue>,
    /// Expected constant for CODED-CONST/PHYS-CONST parameters.
    pub constant: Option<McdValue>,
    pub dop: Box<DataNode>,
}

/// A group of parameters, optionally with a fixed byte size.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub byte_size: Option<u32>,
    pub parameters: Vec<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticField {
    pub fixed_number_of_items: u32,
    pub item_byte_size: u32,
    pub structure: Box<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicLengthField {
    pub determine_number_of_items: Box<Dop>,
    pub count_byte_position: u32,
    pub count_bit_position: u8,
    /// Byte offset of the first item, relative to the field.
    pub offset: u32,
    pub structure: Box<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEndmarkerField {
    pub termination_dop: Box<Dop>,
    pub termination_value: Option<String>,
    pub structure: Box<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndOfPduField {
    pub structure: Box<DataNode>,
}

/// Switch key of a multiplexer. Positions are relative to the MUX.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchKey {
    pub byte_position: u32,
    pub bit_position: u8,
    pub dop: Box<Dop>,
}

/// One multiplexer case. The limits come from the database as strings;
/// non-numeric limits are kept verbatim and matched textually at decode
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct MuxCase {
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub lower_limit: McdValue,
    pub upper_limit: McdValue,
    pub structure: Box<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuxDefaultCase {
    pub long_name: Option<String>,
    pub structure: Box<DataNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mux {
    pub byte_position: u32,
    pub switch_key: SwitchKey,
    pub cases: Vec<MuxCase>,
    pub default_case: Option<MuxDefaultCase>,
}

/// One fault definition of a DTC DOP.
#[derive(Debug, Clone, PartialEq)]
pub struct DtcDefinition {
    pub trouble_code: u32,
    pub dtc_text: Option<String>,
    pub level: u32,
    pub description: Option<String>,
    pub short_name: Option<String>,
    pub label: Option<String>,
}

/// A DTC DOP: a fixed 24-bit big-endian unsigned extraction plus the fault
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct Dtc {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub dop: Dop,
    pub dtc_list: Vec<DtcDefinition>,
}

/// A node of the normalized description tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DataNode {
    Parameter(Parameter),
    Dop(Dop),
    Structure(Structure),
    StaticField(StaticField),
    DynamicLengthField(DynamicLengthField),
    DynamicEndmarkerField(DynamicEndmarkerField),
    EndOfPduField(EndOfPduField),
    Mux(Mux),
    Dtc(Dtc),
    /// A node that could not be built from the source data. Decoding it
    /// fails with the recorded message; the rest of the graph stays usable.
    Invalid { message: String },
}

impl DataNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataNode::Parameter(_) => "PARAMETER",
            DataNode::Dop(_) => "DOP",
            DataNode::Structure(_) => "STRUCTURE",
            DataNode::StaticField(_) => "STATIC-FIELD",
            DataNode::DynamicLengthField(_) => "DYNAMIC-LENGTH-FIELD",
            DataNode::DynamicEndmarkerField(_) => "DYNAMIC-ENDMARKER-FIELD",
            DataNode::EndOfPduField(_) => "END-OF-PDU-FIELD",
            DataNode::Mux(_) => "MUX",
            DataNode::Dtc(_) => "DTC",
            DataNode::Invalid { .. } => "INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_formula_eval() {
        let f = Formula::Linear {
            offset: 0.0,
            factor: 0.75,
            divisor: 1.0,
        };
        assert_eq!(f.eval(100.0), 75.0);
    }

    #[test]
    fn rational_formula_ascending_powers() {
        // (1 + 2x + 3x^2) / (2)
        let f = Formula::Rational {
            numerator: vec![1.0, 2.0, 3.0],
            denominator: vec![2.0],
        };
        assert_eq!(f.eval(2.0), (1.0 + 4.0 + 12.0) / 2.0);
    }

    #[test]
    fn physical_type_falls_back_to_coded() {
        let dop = Dop {
            coded_base_data_type: BaseType::UInt32,
            coded: CodedLength::Standard {
                bit_length: 8,
                bit_mask: None,
            },
            encoding: Encoding::None,
            endianness: Endianness::Big,
            physical_base_data_type: None,
            display_radix: None,
            precision: None,
            units: None,
            internal_constraint: None,
            physical_constraint: None,
            compu: None,
            calculation: None,
        };
        assert_eq!(dop.physical_type(), BaseType::UInt32);
    }
}
