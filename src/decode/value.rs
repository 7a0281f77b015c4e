//! Simple-DOP value extraction: bit harvesting, base-type decoding,
//! constraint checks, computation methods and display formatting.

use std::cmp::Ordering;

use crate::descr::{CalcType, CodedLength, Compu, CompuScale, Constraint, Dop, Limit};
use crate::error::{semantic, ConstraintError, Result};
use crate::object::common::McdValue;
use crate::object::enums::{BaseType, Encoding, Endianness, LimitKind, Termination, Validity};
use crate::stream::hex_string;
use crate::translate::Translations;

/// A decoded value in either internal or physical representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::UInt(v) => Ok(*v as f64),
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            other => Err(semantic!("value {} is not numeric", plain(other))),
        }
    }

    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Value::UInt(v) => Ok(*v),
            Value::Int(v) if *v >= 0 => Ok(*v as u64),
            other => Err(semantic!("value {} is not an unsigned integer", plain(other))),
        }
    }
}

/// Plain rendering used in error messages (no radix or precision applied).
pub fn plain(value: &Value) -> String {
    match value {
        Value::UInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Bytes(v) => hex_string(v),
    }
}

fn plain_mcd(value: &McdValue) -> String {
    match value {
        McdValue::AsciiString(s) | McdValue::Unicode2String(s) => {
            s.clone().unwrap_or_default()
        }
        McdValue::Float32(v) => v.to_string(),
        McdValue::Float64(v) => v.to_string(),
        McdValue::Int32(v) => v.to_string(),
        McdValue::UInt32(v) => v.to_string(),
        McdValue::ByteField(b) | McdValue::BitField(b) => hex_string(b),
    }
}

/// Result of running a DOP against a byte slice.
#[derive(Debug, Clone, PartialEq)]
pub struct DopValue {
    pub internal: Value,
    pub physical: Value,
    pub display: String,
}

/// Number of bytes covered by a bit run starting at `bit_position`.
pub fn byte_length(bit_position: u32, bit_length: u32) -> usize {
    ((bit_position + bit_length + 7) / 8) as usize
}

/// Scan for the min-max termination and return the parameter's byte count.
///
/// The termination sequence is 0x00/0xFF, doubled for Unicode payloads; when
/// it is absent the parameter runs to `max_length` or the end of the buffer,
/// whichever comes first. At least `min_length` bytes must be available.
pub fn min_max_byte_length(
    slice: &[u8],
    min_length: u32,
    max_length: u32,
    termination: Termination,
    coded: BaseType,
) -> Result<usize> {
    let available = slice.len();
    if available < min_length as usize {
        return Err(semantic!(
            "need {min_length} bytes for MIN-MAX-LENGTH-TYPE, have {available}"
        ));
    }

    let fallback = (max_length as usize).min(available);
    let needle: &[u8] = match termination {
        Termination::EndOfPdu => return Ok(fallback),
        Termination::Zero => {
            if coded == BaseType::Unicode2String {
                &[0x00, 0x00]
            } else {
                &[0x00]
            }
        }
        Termination::HexFf => {
            if coded == BaseType::Unicode2String {
                &[0xFF, 0xFF]
            } else {
                &[0xFF]
            }
        }
    };

    Ok(find_subsequence(slice, needle).unwrap_or(fallback))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Big-endian integer view of up to 16 bytes (only the low bits are ever
/// used; longer fields never reach the numeric paths).
fn be_value(bytes: &[u8]) -> u128 {
    let tail = &bytes[bytes.len().saturating_sub(16)..];
    tail.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128)
}

/// Bits `[bit_position, bit_position + bit_length)` counted from the least
/// significant end of the normalized byte field.
fn extract_bits(bytes: &[u8], bit_position: u32, bit_length: u32) -> u64 {
    let value = be_value(bytes) >> bit_position;
    let mask = if bit_length >= 128 {
        u128::MAX
    } else {
        (1u128 << bit_length) - 1
    };
    (value & mask) as u64
}

/// The synthetic DOP used to read a leading length value: an unsigned
/// big-or-little endian integer with an identical conversion.
fn leading_length_value(
    bit_position: u32,
    bit_length: u32,
    endianness: Endianness,
    slice: &[u8],
    translations: &Translations,
) -> Result<u64> {
    let dop = Dop {
        coded_base_data_type: BaseType::UInt32,
        coded: CodedLength::Standard {
            bit_length,
            bit_mask: None,
        },
        encoding: Encoding::None,
        endianness,
        physical_base_data_type: Some(BaseType::UInt32),
        display_radix: Some(10),
        precision: None,
        units: None,
        internal_constraint: None,
        physical_constraint: None,
        compu: Some(Compu::Identical),
        calculation: None,
    };
    dop_value(&dop, slice, bit_position, translations)?
        .physical
        .as_u64()
}

// ─────────────────────────────────────────────────────────────────────────────
// Value extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Run a simple DOP against the payload slice, returning the internal value,
/// the physical value and the display string.
pub fn dop_value(
    dop: &Dop,
    slice: &[u8],
    bit_position: u32,
    translations: &Translations,
) -> Result<DopValue> {
    // a) Determine the parameter's size in bits. Leading-length parameters
    // consume their length prefix here and restart at the next byte edge.
    let mut work = slice;
    let mut bit_position = bit_position;
    let bit_length = match &dop.coded {
        CodedLength::Standard { bit_length, .. } => *bit_length,
        CodedLength::LeadingLengthInfo { bit_length } => {
            let byte_count = leading_length_value(
                bit_position,
                *bit_length,
                dop.endianness,
                work,
                translations,
            )? as u32;
            let skip = byte_length(bit_position, *bit_length);
            work = work.get(skip..).unwrap_or(&[]);
            bit_position = 0;
            byte_count * 8
        }
        CodedLength::MinMaxLength {
            min_length,
            max_length,
            termination,
        } => {
            8 * min_max_byte_length(
                work,
                *min_length,
                *max_length,
                *termination,
                dop.coded_base_data_type,
            )? as u32
        }
    };

    // b) Extract the covered bytes.
    let byte_count = byte_length(bit_position, bit_length);
    if work.len() < byte_count {
        return Err(semantic!(
            "not enough response bytes for DOP ({}), need {byte_count}",
            work.len()
        ));
    }
    let mut bytes = work[..byte_count].to_vec();

    // c) Normalize to high-low byte order. Unicode payloads swap per
    // character, other numeric payloads as a whole; byte fields and 8-bit
    // strings are never swapped.
    if dop.endianness == Endianness::Little
        && !matches!(
            dop.coded_base_data_type,
            BaseType::ByteField | BaseType::AsciiString | BaseType::Utf8String
        )
    {
        if dop.coded_base_data_type == BaseType::Unicode2String {
            if bytes.len() % 2 != 0 {
                return Err(semantic!("unicode string must have an even number of bytes"));
            }
            for pair in bytes.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        } else {
            bytes.reverse();
        }
    }

    // d) Bit extraction starts at the least significant bit of the least
    // significant byte; the start position must lie within the first byte.
    if bit_position > 7 {
        return Err(semantic!(
            "BIT-POSITION must be between [0, 7], not {bit_position}"
        ));
    }

    // e) The bit mask is only defined for standard-length parameters and
    // must cover the extracted width exactly.
    let mask = match &dop.coded {
        CodedLength::Standard {
            bit_mask: Some(mask),
            ..
        } => {
            let expected = (bit_length as usize + 7) / 8;
            if mask.len() != expected {
                return Err(semantic!(
                    "BIT-MASK should have {expected} bytes, not {}",
                    mask.len()
                ));
            }
            Some(extract_bits(mask, 0, bit_length))
        }
        _ => None,
    };

    // f) Decode the field by coded base type and encoding.
    let numeric = |bits: &mut u64| {
        *bits = extract_bits(&bytes, bit_position, bit_length);
        if let Some(mask) = mask {
            *bits &= mask;
        }
    };

    let internal = match dop.coded_base_data_type {
        BaseType::UInt32 => {
            if !(1..=32).contains(&bit_length) {
                return Err(semantic!(
                    "A_UINT32 needs BIT-LENGTH between [1, 32], not {bit_length}"
                ));
            }
            let mut bits = 0;
            numeric(&mut bits);
            match dop.encoding {
                Encoding::None => Value::UInt(bits),
                Encoding::BcdP => Value::UInt(decode_bcd(bits, bit_length)?),
                other => {
                    return Err(semantic!(
                        "unhandled ENCODING {} for A_UINT32",
                        other.name()
                    ))
                }
            }
        }
        BaseType::Int32 => {
            if !(1..=32).contains(&bit_length) {
                return Err(semantic!(
                    "A_INT32 needs BIT-LENGTH between [1, 32], not {bit_length}"
                ));
            }
            let mut bits = 0;
            numeric(&mut bits);
            let sign = (bits >> (bit_length - 1)) & 1 != 0;
            let magnitude_mask = (1u64 << (bit_length - 1)) - 1;
            let value = match dop.encoding {
                Encoding::SignMagnitude => {
                    let magnitude = if bit_length > 1 {
                        (bits & magnitude_mask) as i64
                    } else {
                        0
                    };
                    if sign {
                        -magnitude
                    } else {
                        magnitude
                    }
                }
                Encoding::OnesComplement => {
                    if sign {
                        let full_mask = (1u64 << bit_length) - 1;
                        -(((!bits) & full_mask) as i64)
                    } else {
                        bits as i64
                    }
                }
                Encoding::TwosComplement => {
                    if sign {
                        bits as i64 - (1i64 << bit_length)
                    } else {
                        bits as i64
                    }
                }
                other => {
                    return Err(semantic!("unknown ENCODING {} for A_INT32", other.name()))
                }
            };
            Value::Int(value)
        }
        BaseType::Float32 => {
            if bit_length != 32 {
                return Err(semantic!(
                    "A_FLOAT32 needs BIT-LENGTH 32, not {bit_length}"
                ));
            }
            let mut bits = 0;
            numeric(&mut bits);
            Value::Float(f32::from_bits(bits as u32) as f64)
        }
        BaseType::Float64 => {
            if bit_length != 64 {
                return Err(semantic!(
                    "A_FLOAT64 needs BIT-LENGTH 64, not {bit_length}"
                ));
            }
            let mut bits = 0;
            numeric(&mut bits);
            Value::Float(f64::from_bits(bits))
        }
        BaseType::AsciiString => match dop.encoding {
            Encoding::Iso8859_1 => {
                Value::Text(bytes.iter().map(|&b| b as char).collect::<String>())
            }
            other => {
                return Err(semantic!(
                    "unknown ENCODING {} for A_ASCIISTRING",
                    other.name()
                ))
            }
        },
        BaseType::Utf8String => {
            Value::Text(encoding_rs::UTF_8.decode(&bytes).0.into_owned())
        }
        BaseType::Unicode2String => {
            // After normalization the payload is in high-low order.
            Value::Text(encoding_rs::UTF_16BE.decode(&bytes).0.into_owned())
        }
        BaseType::ByteField => Value::Bytes(bytes.clone()),
        BaseType::BitField => {
            return Err(semantic!("unhandled coded BASE-DATA-TYPE A_BITFIELD"))
        }
    };

    // Internal constraint.
    if let Some(constraint) = &dop.internal_constraint {
        check_constraint(&internal, constraint, "Internal", "IC")?;
    }

    // g) Physical value by computation method.
    let physical = compute_physical(dop, &internal, translations)?;

    // Physical constraint.
    if let Some(constraint) = &dop.physical_constraint {
        check_constraint(&physical, constraint, "Physical", "PC")?;
    }

    let display = display_value(dop, &physical, bit_length)?;
    Ok(DopValue {
        internal,
        physical,
        display,
    })
}

/// Packed BCD: every 4 bits carry one decimal digit, most significant first.
fn decode_bcd(bits: u64, bit_length: u32) -> Result<u64> {
    if bit_length % 4 != 0 {
        return Err(semantic!(
            "need multiple of 4 bits for BCD-P, not {bit_length}"
        ));
    }
    let mut value = 0u64;
    for i in (0..bit_length).step_by(4).rev() {
        let digit = (bits >> i) & 0xF;
        if digit > 9 {
            return Err(semantic!("invalid BCD digit: {digit:X}"));
        }
        value = value * 10 + digit;
    }
    Ok(value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Limits and constraints
// ─────────────────────────────────────────────────────────────────────────────

fn compare(value: &Value, limit: &McdValue) -> Result<Ordering> {
    if let (Value::Text(text), Some(limit_text)) = (value, limit.as_str()) {
        return Ok(text.as_str().cmp(limit_text));
    }
    let limit_num = limit
        .as_f64()
        .ok_or_else(|| semantic!("cannot compare value with limit {}", plain_mcd(limit)))?;
    value
        .as_f64()?
        .partial_cmp(&limit_num)
        .ok_or_else(|| semantic!("cannot order value against limit {limit_num}"))
}

fn bound_value(limit: &Limit) -> Result<&McdValue> {
    limit
        .value
        .as_ref()
        .ok_or_else(|| semantic!("{} limit carries no value", limit.kind.name()))
}

/// Is the value above the lower limit (inclusive per the limit kind)?
pub fn above_lower(value: &Value, limit: &Limit) -> Result<bool> {
    Ok(match limit.kind {
        LimitKind::Infinite => true,
        LimitKind::Open => compare(value, bound_value(limit)?)? == Ordering::Greater,
        LimitKind::Closed => compare(value, bound_value(limit)?)? != Ordering::Less,
    })
}

/// Is the value below the upper limit (inclusive per the limit kind)?
pub fn below_upper(value: &Value, limit: &Limit) -> Result<bool> {
    Ok(match limit.kind {
        LimitKind::Infinite => true,
        LimitKind::Open => compare(value, bound_value(limit)?)? == Ordering::Less,
        LimitKind::Closed => compare(value, bound_value(limit)?)? != Ordering::Greater,
    })
}

fn limit_text(limit: &Limit) -> String {
    limit
        .value
        .as_ref()
        .map(plain_mcd)
        .unwrap_or_else(|| "INF".to_string())
}

fn check_bounds(
    value: &Value,
    lower: &Limit,
    upper: &Limit,
    which: &'static str,
    scope: &'static str,
) -> Result<()> {
    if !above_lower(value, lower)? {
        return Err(ConstraintError::BelowLowerLimit {
            which,
            scope,
            kind: lower_kind_name(lower.kind),
            value: plain(value),
            limit: limit_text(lower),
        }
        .into());
    }
    if !below_upper(value, upper)? {
        return Err(ConstraintError::AboveUpperLimit {
            which,
            scope,
            kind: lower_kind_name(upper.kind),
            value: plain(value),
            limit: limit_text(upper),
        }
        .into());
    }
    Ok(())
}

fn lower_kind_name(kind: LimitKind) -> &'static str {
    match kind {
        LimitKind::Open => "open",
        LimitKind::Closed => "closed",
        LimitKind::Infinite => "infinite",
    }
}

/// Full constraint check: interval bounds plus scale-constraint validity.
fn check_constraint(
    value: &Value,
    constraint: &Constraint,
    which: &'static str,
    scope: &'static str,
) -> Result<()> {
    check_bounds(value, &constraint.lower_limit, &constraint.upper_limit, which, scope)?;

    for scale in &constraint.scale_constraints {
        let inside = above_lower(value, &scale.lower_limit)?
            && below_upper(value, &scale.upper_limit)?;
        if inside && scale.validity != Validity::Valid {
            return Err(ConstraintError::InvalidScale {
                which,
                value: plain(value),
                validity: scale.validity.name().to_string(),
                label: scale.short_label.clone().unwrap_or_default(),
            }
            .into());
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Computation methods
// ─────────────────────────────────────────────────────────────────────────────

fn compute_physical(dop: &Dop, internal: &Value, translations: &Translations) -> Result<Value> {
    let Some(compu) = &dop.compu else {
        // Constant parameters carry no computation method; the identical
        // conversion is assumed.
        return Ok(internal.clone());
    };

    match compu {
        Compu::Identical => {
            if let Some(physical) = dop.physical_base_data_type {
                let coded = dop.coded_base_data_type;
                if physical != coded && !(physical.is_string() && coded.is_string()) {
                    return Err(semantic!(
                        "physical BASE-DATA-TYPE {} does not match coded BASE-DATA-TYPE {} for IDENTICAL",
                        physical.name(),
                        coded.name()
                    ));
                }
            }
            Ok(internal.clone())
        }

        Compu::Linear(scale) | Compu::RatFunc(scale) => {
            check_bounds(
                internal,
                &scale.coded_lower_limit,
                &scale.coded_upper_limit,
                "Internal",
                "scale",
            )?;
            let physical = apply_scale(dop, scale, internal)?;
            check_bounds(
                &physical,
                &scale.physical_lower_limit,
                &scale.physical_upper_limit,
                "Physical",
                "scale",
            )?;
            Ok(physical)
        }

        Compu::ScaleLinear {
            scales,
            default_value,
        }
        | Compu::ScaleRatFunc {
            scales,
            default_value,
        } => {
            for scale in scales {
                let inside = above_lower(internal, &scale.coded_lower_limit)?
                    && below_upper(internal, &scale.coded_upper_limit)?;
                if !inside {
                    continue;
                }
                let physical = apply_scale(dop, scale, internal)?;
                check_bounds(
                    &physical,
                    &scale.physical_lower_limit,
                    &scale.physical_upper_limit,
                    "Physical",
                    "scale",
                )?;
                return Ok(physical);
            }
            match default_value {
                Some(default) => parse_default(default, dop.calculation),
                None => Err(semantic!(
                    "internal value {} falls out of all COMPU-SCALEs and no COMPU-DEFAULT-VALUE exists",
                    plain(internal)
                )),
            }
        }

        Compu::Texttable {
            scales,
            default_value,
        } => {
            for scale in scales {
                let above = compare(internal, &scale.lower_limit)? != Ordering::Less;
                let below = compare(internal, &scale.upper_limit)? != Ordering::Greater;
                if above && below {
                    let text =
                        translations.long_name(scale.text_id.as_deref(), scale.text.as_deref());
                    return Ok(Value::Text(text.unwrap_or_default()));
                }
            }
            match default_value {
                Some(default) => Ok(Value::Text(default.clone())),
                None => Err(semantic!(
                    "internal value {} falls out of all COMPU-SCALEs and no COMPU-DEFAULT-VALUE exists",
                    plain(internal)
                )),
            }
        }

        Compu::TabIntp { points } => {
            let x = internal.as_f64()?;
            let point_x = |index: usize| -> Result<f64> {
                points[index]
                    .limit
                    .as_f64()
                    .ok_or_else(|| semantic!("TAB-INTP limit is not numeric"))
            };
            let point_y = |index: usize| -> Result<f64> {
                let text = points[index]
                    .value_text
                    .as_deref()
                    .ok_or_else(|| semantic!("TAB-INTP COMPU-CONST has no value"))?;
                text.trim()
                    .parse::<i64>()
                    .map(|v| v as f64)
                    .map_err(|_| semantic!("TAB-INTP COMPU-CONST is not an integer: {text}"))
            };

            if x < point_x(0)? {
                return Err(semantic!(
                    "the internal value is less than the smallest defined LOWER-LIMIT"
                ));
            }
            if x > point_x(points.len() - 1)? {
                return Err(semantic!(
                    "the internal value is greater than the greatest defined LOWER-LIMIT"
                ));
            }

            for i in 0..points.len() - 1 {
                let (x1, x2) = (point_x(i)?, point_x(i + 1)?);
                if x >= x1 && x <= x2 {
                    let (y1, y2) = (point_y(i)?, point_y(i + 1)?);
                    let y = ((y2 - y1) * x + x2 * y1 - x1 * y2) / (x2 - x1);
                    return Ok(match dop.calculation {
                        Some(CalcType::Int32) | Some(CalcType::UInt32) => truncate(y),
                        _ => Value::Float(y),
                    });
                }
            }
            Err(semantic!("failed to find interval for linear interpolation"))
        }
    }
}

/// Evaluate one scale's formula and apply the calculation type.
fn apply_scale(dop: &Dop, scale: &CompuScale, internal: &Value) -> Result<Value> {
    let y = scale.formula.eval(internal.as_f64()?);
    Ok(match dop.calculation {
        Some(CalcType::Int32) | Some(CalcType::UInt32) => truncate(y),
        Some(CalcType::Float64) | None => {
            // Integral physical types get commercial rounding (half away
            // from zero) applied to the float result.
            if matches!(
                dop.physical_base_data_type,
                Some(BaseType::UInt32) | Some(BaseType::Int32)
            ) {
                integral(y.round())
            } else {
                Value::Float(y)
            }
        }
    })
}

fn truncate(y: f64) -> Value {
    integral(y.trunc())
}

fn integral(y: f64) -> Value {
    if y >= 0.0 {
        Value::UInt(y as u64)
    } else {
        Value::Int(y as i64)
    }
}

fn parse_default(default: &str, calculation: Option<CalcType>) -> Result<Value> {
    match calculation {
        Some(CalcType::Int32) | Some(CalcType::UInt32) => default
            .trim()
            .parse::<i64>()
            .map(|v| {
                if v >= 0 {
                    Value::UInt(v as u64)
                } else {
                    Value::Int(v)
                }
            })
            .map_err(|_| semantic!("COMPU-DEFAULT-VALUE is not an integer: {default}")),
        Some(CalcType::Float64) => default
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| semantic!("COMPU-DEFAULT-VALUE is not a number: {default}")),
        None => Err(semantic!("COMPU-DEFAULT-VALUE without calculation type")),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Format a physical value for display, honoring radix, precision and units.
fn display_value(dop: &Dop, physical: &Value, bit_length: u32) -> Result<String> {
    let mut display = match dop.physical_type() {
        BaseType::Int32 => match physical {
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) => format!("{}", *v as i64),
            other => return Err(semantic!("signed display of {}", plain(other))),
        },
        BaseType::UInt32 => {
            let radix = dop.display_radix.unwrap_or(10);
            format_radix(physical, radix, bit_length)?
        }
        BaseType::Float32 | BaseType::Float64 => {
            let precision = dop.precision.unwrap_or(6) as usize;
            format!("{:.*}", precision, physical.as_f64()?)
        }
        BaseType::AsciiString | BaseType::Utf8String | BaseType::Unicode2String => {
            match physical {
                Value::Text(text) => text.clone(),
                other => return Err(semantic!("string display of {}", plain(other))),
            }
        }
        BaseType::ByteField => match physical {
            Value::Bytes(bytes) => hex_string(bytes),
            other => return Err(semantic!("byte field display of {}", plain(other))),
        },
        BaseType::BitField => {
            return Err(semantic!("unknown how to get display value from A_BITFIELD"))
        }
    };

    if let Some(units) = &dop.units {
        if let Some(name) = &units.display_name {
            display.push(' ');
            display.push_str(name);
        }
    }
    Ok(display)
}

fn format_radix(value: &Value, radix: u8, bit_length: u32) -> Result<String> {
    let (negative, magnitude) = match value {
        Value::UInt(v) => (false, *v),
        Value::Int(v) => (*v < 0, v.unsigned_abs()),
        Value::Float(v) => (*v < 0.0, v.abs() as u64),
        other => return Err(semantic!("radix display of {}", plain(other))),
    };
    let sign = if negative { "-" } else { "" };
    Ok(match radix {
        2 => format!("{sign}0b{magnitude:0width$b}", width = bit_length as usize),
        8 => format!("{sign}0o{magnitude:o}"),
        16 => format!("{sign}0x{magnitude:X}"),
        _ => format!("{sign}{magnitude}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_dop(coded: BaseType, bit_length: u32) -> Dop {
        Dop {
            coded_base_data_type: coded,
            coded: CodedLength::Standard {
                bit_length,
                bit_mask: None,
            },
            encoding: Encoding::None,
            endianness: Endianness::Big,
            physical_base_data_type: Some(coded),
            display_radix: if coded == BaseType::UInt32 {
                Some(10)
            } else {
                None
            },
            precision: None,
            units: None,
            internal_constraint: None,
            physical_constraint: None,
            compu: Some(Compu::Identical),
            calculation: None,
        }
    }

    #[test]
    fn bit_extraction_is_lsb_first() {
        // 0x12 0x34 with bit position 2, length 6: low byte 0x34 >> 2 = 0x0D.
        assert_eq!(extract_bits(&[0x12, 0x34], 2, 6), 0x0D);
        // Crossing the byte boundary.
        assert_eq!(extract_bits(&[0x12, 0x34], 4, 8), 0x23);
    }

    #[test]
    fn uint_identity_decode() {
        let translations = Translations::empty();
        let dop = base_dop(BaseType::UInt32, 8);
        let value = dop_value(&dop, &[0x2A], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::UInt(42));
        assert_eq!(value.display, "42");
    }

    #[test]
    fn little_endian_matches_reversed_big_endian() {
        let translations = Translations::empty();
        let mut le = base_dop(BaseType::UInt32, 16);
        le.endianness = Endianness::Little;
        let be = base_dop(BaseType::UInt32, 16);

        let le_value = dop_value(&le, &[0x34, 0x12], 0, &translations).unwrap();
        let be_value = dop_value(&be, &[0x12, 0x34], 0, &translations).unwrap();
        assert_eq!(le_value.internal, be_value.internal);
        assert_eq!(le_value.internal, Value::UInt(0x1234));
    }

    #[test]
    fn twos_complement_sixteen_bit() {
        let translations = Translations::empty();
        let mut dop = base_dop(BaseType::Int32, 16);
        dop.encoding = Encoding::TwosComplement;
        dop.physical_base_data_type = Some(BaseType::Int32);
        let value = dop_value(&dop, &[0xFF, 0xFE], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::Int(-2));
        assert_eq!(value.physical, Value::Int(-2));
        assert_eq!(value.display, "-2");
    }

    #[test]
    fn sign_magnitude_and_ones_complement() {
        let translations = Translations::empty();
        let mut dop = base_dop(BaseType::Int32, 8);
        dop.physical_base_data_type = Some(BaseType::Int32);

        dop.encoding = Encoding::SignMagnitude;
        let value = dop_value(&dop, &[0x82], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::Int(-2));

        dop.encoding = Encoding::OnesComplement;
        let value = dop_value(&dop, &[0xFD], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::Int(-2));
    }

    #[test]
    fn bcd_packed_digits() {
        let translations = Translations::empty();
        let mut dop = base_dop(BaseType::UInt32, 16);
        dop.encoding = Encoding::BcdP;
        let value = dop_value(&dop, &[0x12, 0x34], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::UInt(1234));

        let err = dop_value(&dop, &[0x1A, 0x34], 0, &translations);
        assert!(err.is_err());
    }

    #[test]
    fn bit_mask_is_applied_after_extraction() {
        let translations = Translations::empty();
        let mut dop = base_dop(BaseType::UInt32, 8);
        dop.coded = CodedLength::Standard {
            bit_length: 8,
            bit_mask: Some(vec![0x0F]),
        };
        let value = dop_value(&dop, &[0xAB], 0, &translations).unwrap();
        assert_eq!(value.internal, Value::UInt(0x0B));
    }

    #[test]
    fn min_max_zero_termination() {
        assert_eq!(
            min_max_byte_length(b"AB\x00CD", 1, 10, Termination::Zero, BaseType::AsciiString)
                .unwrap(),
            2
        );
        // No terminator: clamp to max length.
        assert_eq!(
            min_max_byte_length(b"ABCDEF", 1, 4, Termination::HexFf, BaseType::AsciiString)
                .unwrap(),
            4
        );
        // Two-byte termination for unicode payloads.
        assert_eq!(
            min_max_byte_length(
                &[0x00, 0x41, 0x00, 0x00, 0x00],
                1,
                10,
                Termination::Zero,
                BaseType::Unicode2String
            )
            .unwrap(),
            2
        );
        assert!(min_max_byte_length(b"A", 2, 4, Termination::Zero, BaseType::AsciiString)
            .is_err());
    }

    #[test]
    fn commercial_rounding_half_away_from_zero() {
        let translations = Translations::empty();
        let mut dop = base_dop(BaseType::UInt32, 8);
        dop.calculation = Some(CalcType::Float64);
        dop.compu = Some(Compu::Linear(CompuScale {
            coded_lower_limit: Limit::infinite(),
            coded_upper_limit: Limit::infinite(),
            physical_lower_limit: Limit::infinite(),
            physical_upper_limit: Limit::infinite(),
            formula: crate::descr::Formula::Linear {
                offset: 0.5,
                factor: 1.0,
                divisor: 1.0,
            },
        }));
        // 2 + 0.5 rounds away from zero to 3.
        let value = dop_value(&dop, &[0x02], 0, &translations).unwrap();
        assert_eq!(value.physical, Value::UInt(3));
    }
}
