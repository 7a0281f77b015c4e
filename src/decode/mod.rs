//! Response decoding: walks a normalized description tree against a captured
//! payload and produces a nested, named, valued output tree.

pub mod value;

use crate::descr::{DataNode, Dop, Mux, Parameter, ParameterKind, Structure};
use crate::error::{semantic, Result};
use crate::object::common::McdValue;
use crate::stream::hex_string;
use crate::translate::Translations;
use self::value::{byte_length, dop_value, min_max_byte_length, plain, DopValue, Value};

use crate::descr::CodedLength;

/// Decoded output tree. `VAL` leaves and `FLD` items are absorbed into
/// their parameters; rendered rows therefore only ever show structures,
/// parameters, multiplexer cases and faults.
#[derive(Debug, Clone, PartialEq)]
pub enum OutNode {
    Value {
        value: String,
    },
    Structure {
        name: Option<String>,
        children: Vec<OutNode>,
    },
    Parameter {
        name: Option<String>,
        value: Option<String>,
        children: Vec<OutNode>,
        reserved: bool,
    },
    Field {
        children: Vec<OutNode>,
    },
    Mux {
        name: Option<String>,
        children: Vec<OutNode>,
    },
    Dtc {
        value: String,
    },
}

/// One line of the indented dump form.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub level: usize,
    pub marker: &'static str,
    pub name: String,
    pub value: String,
}

/// Flatten a decoded tree to indented rows.
pub fn rows(node: &OutNode) -> Result<Vec<Row>> {
    let mut table = Vec::new();
    push_rows(node, 0, &mut table)?;
    Ok(table)
}

fn push_rows(node: &OutNode, level: usize, table: &mut Vec<Row>) -> Result<()> {
    let (marker, name, value, children) = match node {
        OutNode::Structure { name, children } => (
            "[S]",
            name.clone(),
            children.len().to_string(),
            Some(children),
        ),
        OutNode::Parameter {
            name,
            value,
            children,
            ..
        } => (
            "[P]",
            name.clone(),
            value.clone().unwrap_or_else(|| children.len().to_string()),
            Some(children),
        ),
        OutNode::Mux { name, children } => (
            "[M]",
            name.clone(),
            children.len().to_string(),
            Some(children),
        ),
        OutNode::Dtc { value } => ("[D]", None, value.clone(), None),
        other => return Err(semantic!("{other:?} unhandled in row output")),
    };
    table.push(Row {
        level,
        marker,
        name: name.unwrap_or_default(),
        value,
    });
    if let Some(children) = children {
        for child in children {
            push_rows(child, level + 1, table)?;
        }
    }
    Ok(())
}

/// Render the indented text form used by the dump files.
pub fn render(node: &OutNode) -> Result<String> {
    let mut out = String::new();
    for row in rows(node)? {
        out.push_str(&"  ".repeat(row.level));
        out.push_str(&format!("{} {} - {}\n", row.marker, row.name, row.value));
    }
    Ok(out)
}

pub struct Decoder<'t> {
    translations: &'t Translations,
}

impl<'t> Decoder<'t> {
    pub fn new(translations: &'t Translations) -> Decoder<'t> {
        Decoder { translations }
    }

    /// Decode a full measurement response: the top level is the
    /// measurement's structure; its display name comes from the table row.
    pub fn decode_response(
        &self,
        long_name_id: Option<&str>,
        long_name: Option<&str>,
        structure: &DataNode,
        payload: &[u8],
    ) -> Result<OutNode> {
        let mut decoded = self.decode(structure, payload, 0)?;
        if let OutNode::Structure { name, .. } = &mut decoded {
            *name = self.translations.long_name(long_name_id, long_name);
        }
        Ok(decoded)
    }

    /// Decode one description node against the payload slice that starts at
    /// the node's byte position.
    pub fn decode(&self, node: &DataNode, slice: &[u8], bit_position: u32) -> Result<OutNode> {
        match node {
            DataNode::Parameter(parameter) => self.decode_parameter(parameter, slice),
            DataNode::Dop(dop) => {
                let DopValue { display, .. } =
                    dop_value(dop, slice, bit_position, self.translations)?;
                Ok(OutNode::Value { value: display })
            }
            DataNode::Structure(structure) => self.decode_structure(structure, slice),
            DataNode::StaticField(field) => {
                let mut children = Vec::with_capacity(field.fixed_number_of_items as usize);
                let mut cursor = 0usize;
                for _ in 0..field.fixed_number_of_items {
                    let item_slice = tail(slice, cursor);
                    children.push(self.decode(&field.structure, item_slice, 0)?);
                    cursor += field.item_byte_size as usize;
                }
                Ok(OutNode::Field { children })
            }
            DataNode::DynamicLengthField(field) => {
                let count_slice = tail(slice, field.count_byte_position as usize);
                let count = dop_value(
                    &field.determine_number_of_items,
                    count_slice,
                    field.count_bit_position as u32,
                    self.translations,
                )?
                .physical
                .as_u64()?;

                let mut children = Vec::with_capacity(count as usize);
                let mut cursor = field.offset as usize;
                for _ in 0..count {
                    let item_slice = tail(slice, cursor);
                    children.push(self.decode(&field.structure, item_slice, 0)?);
                    cursor += self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                }
                Ok(OutNode::Field { children })
            }
            DataNode::DynamicEndmarkerField(field) => {
                let termination = termination_value(field.termination_value.as_deref())?;
                let mut children = Vec::new();
                let mut cursor = 0usize;
                while cursor < slice.len() {
                    let item_slice = tail(slice, cursor);
                    let found = dop_value(
                        &field.termination_dop,
                        item_slice,
                        bit_position,
                        self.translations,
                    )?
                    .physical
                    .as_f64()?;
                    if found == termination as f64 {
                        break;
                    }
                    children.push(self.decode(&field.structure, item_slice, 0)?);
                    cursor += self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                }
                Ok(OutNode::Field { children })
            }
            DataNode::EndOfPduField(field) => {
                let mut children = Vec::new();
                let mut cursor = 0usize;
                while cursor < slice.len() {
                    let item_slice = tail(slice, cursor);
                    children.push(self.decode(&field.structure, item_slice, 0)?);
                    cursor += self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                }
                Ok(OutNode::Field { children })
            }
            DataNode::Mux(mux) => self.decode_mux(mux, slice, bit_position),
            DataNode::Dtc(dtc) => {
                let code = dop_value(&dtc.dop, slice, 0, self.translations)?
                    .physical
                    .as_u64()?;
                let found = dtc
                    .dtc_list
                    .iter()
                    .find(|definition| definition.trouble_code as u64 == code)
                    .ok_or_else(|| {
                        semantic!("could not find trouble code {code:06X} in DTC list")
                    })?;
                Ok(OutNode::Dtc {
                    value: format!(
                        "{}({}): {}",
                        found.dtc_text.as_deref().unwrap_or_default(),
                        found.level,
                        found.description.as_deref().unwrap_or_default()
                    ),
                })
            }
            DataNode::Invalid { message } => Err(semantic!("{message}")),
        }
    }

    fn decode_parameter(&self, parameter: &Parameter, slice: &[u8]) -> Result<OutNode> {
        let name = self
            .translations
            .long_name(parameter.long_name_id.as_deref(), parameter.long_name.as_deref());

        match parameter.kind {
            ParameterKind::Reserved => Ok(OutNode::Parameter {
                name,
                value: None,
                children: Vec::new(),
                reserved: true,
            }),
            ParameterKind::CodedConst => {
                let child = self.decode(&parameter.dop, slice, parameter.bit_position as u32)?;
                let OutNode::Value { value } = child else {
                    return Err(semantic!(
                        "DOP for CODED-CONST must be simple value, not {child:?}"
                    ));
                };
                let constant = constant_display(parameter.constant.as_ref())?;
                if value != constant {
                    return Err(semantic!(
                        "received coded value ({value}) does not match constant ({constant})"
                    ));
                }
                Ok(OutNode::Parameter {
                    name,
                    value: Some(value),
                    children: Vec::new(),
                    reserved: false,
                })
            }
            ParameterKind::Value | ParameterKind::PhysConst => {
                let child = self.decode(&parameter.dop, slice, parameter.bit_position as u32)?;
                let (value, children) = match child {
                    OutNode::Value { value } => (Some(value), Vec::new()),
                    OutNode::Dtc { value } => (Some(value), Vec::new()),
                    OutNode::Field { children } => (None, children),
                    node @ (OutNode::Structure { .. } | OutNode::Mux { .. }) => {
                        (None, vec![node])
                    }
                    other => return Err(semantic!("unexpected child node: {other:?}")),
                };
                Ok(OutNode::Parameter {
                    name,
                    value,
                    children,
                    reserved: false,
                })
            }
        }
    }

    fn decode_structure(&self, structure: &Structure, slice: &[u8]) -> Result<OutNode> {
        let mut children = Vec::with_capacity(structure.parameters.len());
        let mut cursor = 0usize;
        for node in &structure.parameters {
            let DataNode::Parameter(parameter) = node else {
                return Err(semantic!(
                    "STRUCTURE child must be PARAM, not {}",
                    node.kind_name()
                ));
            };
            // Positioned parameters move the cursor; unpositioned ones start
            // right after the previous parameter.
            if let Some(byte_position) = parameter.byte_position {
                cursor = byte_position as usize;
            }
            let parameter_slice = tail(slice, cursor);
            let child = self.decode(node, parameter_slice, 0)?;
            if !matches!(&child, OutNode::Parameter { reserved: true, .. }) {
                children.push(child);
            }
            cursor += self.parameter_byte_length(node, parameter_slice)?;
        }
        Ok(OutNode::Structure {
            name: structure.long_name.clone(),
            children,
        })
    }

    fn decode_mux(&self, mux: &Mux, slice: &[u8], bit_position: u32) -> Result<OutNode> {
        let switch = dop_value(&mux.switch_key.dop, slice, bit_position, self.translations)?
            .physical;
        let case_slice = tail(slice, mux.byte_position as usize);

        for case in &mux.cases {
            if case_matches(&switch, &case.lower_limit, &case.upper_limit)? {
                let child = self.decode(&case.structure, case_slice, 0)?;
                return Ok(OutNode::Mux {
                    name: case.long_name.clone(),
                    children: vec![child],
                });
            }
        }

        if let Some(default_case) = &mux.default_case {
            let child = self.decode(&default_case.structure, case_slice, 0)?;
            return Ok(OutNode::Mux {
                name: default_case.long_name.clone(),
                children: vec![child],
            });
        }

        Err(semantic!(
            "failed to find MUX SWITCH-CASE for SWITCH-KEY {} and no DEFAULT-CASE exists",
            plain(&switch)
        ))
    }

    // ── Byte lengths ────────────────────────────────────────────────────────

    /// How many payload bytes a structure covers, from its slice onward.
    pub fn structure_byte_length(&self, node: &DataNode, slice: &[u8]) -> Result<usize> {
        let DataNode::Structure(structure) = node else {
            return Err(semantic!(
                "{} provided instead of STRUCTURE",
                node.kind_name()
            ));
        };
        if let Some(byte_size) = structure.byte_size {
            return Ok(byte_size as usize);
        }

        // Without a fixed size the structure spans to the end of its
        // "longest" parameter.
        let mut longest = 0usize;
        let mut cursor = 0usize;
        for node in &structure.parameters {
            let DataNode::Parameter(parameter) = node else {
                return Err(semantic!(
                    "STRUCTURE child must be PARAM, not {}",
                    node.kind_name()
                ));
            };
            if let Some(byte_position) = parameter.byte_position {
                cursor = byte_position as usize;
            }
            let parameter_slice = tail(slice, cursor);
            let length = self.parameter_byte_length(node, parameter_slice)?;
            longest = longest.max(cursor + length);
            cursor += length;
        }
        Ok(longest)
    }

    /// How many payload bytes a parameter covers, from its slice onward.
    pub fn parameter_byte_length(&self, node: &DataNode, slice: &[u8]) -> Result<usize> {
        let DataNode::Parameter(parameter) = node else {
            return Err(semantic!(
                "{} provided instead of PARAMETER",
                node.kind_name()
            ));
        };

        let (bit_position, bit_length) = match parameter.dop.as_ref() {
            DataNode::Dop(dop) => match &dop.coded {
                CodedLength::Standard { bit_length, .. } => {
                    (parameter.bit_position as u32, *bit_length)
                }
                CodedLength::LeadingLengthInfo { bit_length } => {
                    let content = self.leading_length(
                        dop,
                        slice,
                        parameter.bit_position as u32,
                        *bit_length,
                    )?;
                    let lead = byte_length(parameter.bit_position as u32, *bit_length);
                    (0, 8 * (lead + content) as u32)
                }
                CodedLength::MinMaxLength {
                    min_length,
                    max_length,
                    termination,
                } => {
                    let length = min_max_byte_length(
                        slice,
                        *min_length,
                        *max_length,
                        *termination,
                        dop.coded_base_data_type,
                    )?;
                    (parameter.bit_position as u32, 8 * length as u32)
                }
            },
            DataNode::Structure(_) => {
                let length = self.structure_byte_length(&parameter.dop, slice)?;
                (0, 8 * length as u32)
            }
            DataNode::StaticField(field) => {
                let length = field.fixed_number_of_items as usize * field.item_byte_size as usize;
                (0, 8 * length as u32)
            }
            DataNode::DynamicLengthField(field) => {
                let count_slice = tail(slice, field.count_byte_position as usize);
                let count = dop_value(
                    &field.determine_number_of_items,
                    count_slice,
                    field.count_bit_position as u32,
                    self.translations,
                )?
                .physical
                .as_u64()?;

                let mut total = 0usize;
                let mut cursor = field.offset as usize;
                for _ in 0..count {
                    let item_slice = tail(slice, cursor);
                    let item = self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                    total += item;
                    cursor += item;
                }
                (0, 8 * (field.offset as usize + total) as u32)
            }
            DataNode::DynamicEndmarkerField(field) => {
                let termination = termination_value(field.termination_value.as_deref())?;
                let termination_bits = match &field.termination_dop.coded {
                    CodedLength::Standard { bit_length, .. } => *bit_length,
                    other => {
                        return Err(semantic!(
                            "ENDMARKER termination DOP has no fixed BIT-LENGTH ({})",
                            other.name()
                        ))
                    }
                };

                let mut total = 0usize;
                let mut cursor = 0usize;
                while cursor < slice.len() {
                    let item_slice = tail(slice, cursor);
                    let found = dop_value(
                        &field.termination_dop,
                        item_slice,
                        parameter.bit_position as u32,
                        self.translations,
                    )?
                    .physical
                    .as_f64()?;
                    if found == termination as f64 {
                        total += byte_length(parameter.bit_position as u32, termination_bits);
                        break;
                    }
                    let item = self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                    total += item;
                    cursor += item;
                }
                (0, 8 * total as u32)
            }
            DataNode::EndOfPduField(field) => {
                let mut total = 0usize;
                while total < slice.len() {
                    let item_slice = tail(slice, total);
                    total += self.positive_length(
                        self.structure_byte_length(&field.structure, item_slice)?,
                    )?;
                }
                (0, 8 * total as u32)
            }
            DataNode::Mux(mux) => {
                let case_slice = tail(slice, mux.byte_position as usize);
                let mut longest = 0usize;
                for case in &mux.cases {
                    longest =
                        longest.max(self.structure_byte_length(&case.structure, case_slice)?);
                }
                if let Some(default_case) = &mux.default_case {
                    longest = longest
                        .max(self.structure_byte_length(&default_case.structure, case_slice)?);
                }
                (0, 8 * (mux.byte_position as usize + longest) as u32)
            }
            DataNode::Dtc(_) => (0, 24),
            DataNode::Invalid { message } => return Err(semantic!("{message}")),
            other => {
                return Err(semantic!(
                    "unhandled PARAMETER DOP type: {}",
                    other.kind_name()
                ))
            }
        };

        Ok(byte_length(bit_position, bit_length))
    }

    fn leading_length(
        &self,
        dop: &Dop,
        slice: &[u8],
        bit_position: u32,
        bit_length: u32,
    ) -> Result<usize> {
        // The length prefix reads like an unsigned standard-length field of
        // the DOP's endianness.
        let prefix = Dop {
            coded: CodedLength::Standard {
                bit_length,
                bit_mask: None,
            },
            ..dop.clone()
        };
        let prefix = Dop {
            coded_base_data_type: crate::object::enums::BaseType::UInt32,
            encoding: crate::object::enums::Encoding::None,
            physical_base_data_type: Some(crate::object::enums::BaseType::UInt32),
            display_radix: Some(10),
            precision: None,
            units: None,
            internal_constraint: None,
            physical_constraint: None,
            compu: Some(crate::descr::Compu::Identical),
            calculation: None,
            ..prefix
        };
        Ok(dop_value(&prefix, slice, bit_position, self.translations)?
            .physical
            .as_u64()? as usize)
    }

    /// Item loops must make progress; a zero-length item would repeat at the
    /// same offset forever.
    fn positive_length(&self, length: usize) -> Result<usize> {
        if length == 0 {
            return Err(semantic!("zero-length structure in field"));
        }
        Ok(length)
    }
}

fn tail(slice: &[u8], offset: usize) -> &[u8] {
    slice.get(offset..).unwrap_or(&[])
}

fn termination_value(raw: Option<&str>) -> Result<i64> {
    let raw = raw.ok_or_else(|| semantic!("ENDMARKER has no TERMINATION-VALUE"))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| semantic!("ENDMARKER TERMINATION-VALUE is not an integer: {raw}"))
}

/// Render the expected constant of a CODED-CONST parameter the way the
/// decoded value is rendered, so the two can be compared as strings.
fn constant_display(constant: Option<&McdValue>) -> Result<String> {
    let constant = constant.ok_or_else(|| semantic!("CODED-CONST has no constant"))?;
    Ok(match constant {
        McdValue::Int32(v) => v.to_string(),
        McdValue::UInt32(v) => v.to_string(),
        McdValue::Float32(v) => format!("{:.6}", v),
        McdValue::Float64(v) => format!("{:.6}", v),
        McdValue::Unicode2String(s) | McdValue::AsciiString(s) => {
            s.clone().unwrap_or_default()
        }
        McdValue::ByteField(b) => hex_string(b),
        McdValue::BitField(_) => {
            return Err(semantic!("unknown how to get constant from A_BITFIELD"))
        }
    })
}

/// Does the switch value fall into a case's closed range? Limits parse as
/// integers when possible; non-numeric limits (observed in some projects)
/// match textually against the switch value instead.
fn case_matches(switch: &Value, lower: &McdValue, upper: &McdValue) -> Result<bool> {
    let lower_text = lower.as_str().unwrap_or_default();
    let upper_text = upper.as_str().unwrap_or_default();
    match (
        lower_text.trim().parse::<i64>(),
        upper_text.trim().parse::<i64>(),
    ) {
        (Ok(lower), Ok(upper)) => {
            let v = switch.as_f64()?;
            Ok(v >= lower as f64 && v <= upper as f64)
        }
        _ => Ok(plain(switch) == lower_text),
    }
}
