// Decoder scenarios over hand-built description trees: computation
// methods, fields and multiplexer dispatch.

use mcddb::decode::{Decoder, OutNode};
use mcddb::descr::{
    CalcType, CodedLength, Compu, CompuScale, DataNode, Dop, Formula, Limit, Mux, MuxCase,
    MuxDefaultCase, Parameter, ParameterKind, StaticField, Structure, SwitchKey, TabPoint,
    TextScale,
};
use mcddb::object::common::McdValue;
use mcddb::object::enums::{BaseType, Encoding, Endianness};
use mcddb::translate::Translations;

fn uint_dop(bit_length: u32) -> Dop {
    Dop {
        coded_base_data_type: BaseType::UInt32,
        coded: CodedLength::Standard {
            bit_length,
            bit_mask: None,
        },
        encoding: Encoding::None,
        endianness: Endianness::Big,
        physical_base_data_type: Some(BaseType::UInt32),
        display_radix: Some(10),
        precision: None,
        units: None,
        internal_constraint: None,
        physical_constraint: None,
        compu: Some(Compu::Identical),
        calculation: None,
    }
}

fn value_parameter(name: &str, byte_position: Option<u32>, dop: DataNode) -> DataNode {
    DataNode::Parameter(Parameter {
        long_name: Some(name.to_string()),
        long_name_id: None,
        description: None,
        byte_position,
        bit_position: 0,
        kind: ParameterKind::Value,
        default_value: None,
        constant: None,
        dop: Box::new(dop),
    })
}

fn structure(name: &str, parameters: Vec<DataNode>) -> DataNode {
    DataNode::Structure(Structure {
        long_name: Some(name.to_string()),
        description: None,
        byte_size: None,
        parameters,
    })
}

fn open_limits() -> (Limit, Limit, Limit, Limit) {
    (
        Limit::infinite(),
        Limit::infinite(),
        Limit::infinite(),
        Limit::infinite(),
    )
}

#[test]
fn linear_conversion_with_precision() {
    // factor 0.75, no divisor; 8-bit unsigned 100 → 75.00.
    let (cl, cu, pl, pu) = open_limits();
    let mut dop = uint_dop(8);
    dop.physical_base_data_type = Some(BaseType::Float32);
    dop.display_radix = None;
    dop.precision = Some(2);
    dop.calculation = Some(CalcType::Float64);
    dop.compu = Some(Compu::Linear(CompuScale {
        coded_lower_limit: cl,
        coded_upper_limit: cu,
        physical_lower_limit: pl,
        physical_upper_limit: pu,
        formula: Formula::Linear {
            offset: 0.0,
            factor: 0.75,
            divisor: 1.0,
        },
    }));

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder.decode(&DataNode::Dop(dop), &[100], 0).unwrap();
    assert_eq!(
        out,
        OutNode::Value {
            value: "75.00".to_string()
        }
    );
}

#[test]
fn texttable_with_and_without_match() {
    let scales = vec![
        TextScale {
            lower_limit: McdValue::UInt32(0),
            upper_limit: McdValue::UInt32(0),
            text: Some("Off".to_string()),
            text_id: None,
        },
        TextScale {
            lower_limit: McdValue::UInt32(1),
            upper_limit: McdValue::UInt32(1),
            text: Some("On".to_string()),
            text_id: None,
        },
        TextScale {
            lower_limit: McdValue::UInt32(2),
            upper_limit: McdValue::UInt32(2),
            text: Some("Error".to_string()),
            text_id: None,
        },
    ];
    let mut dop = uint_dop(8);
    dop.physical_base_data_type = Some(BaseType::Unicode2String);
    dop.display_radix = None;
    dop.calculation = Some(CalcType::Int32);
    dop.compu = Some(Compu::Texttable {
        scales,
        default_value: None,
    });

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let node = DataNode::Dop(dop);

    let on = decoder.decode(&node, &[0x01], 0).unwrap();
    assert_eq!(
        on,
        OutNode::Value {
            value: "On".to_string()
        }
    );

    // No scale matches and there is no default value.
    assert!(decoder.decode(&node, &[0x03], 0).is_err());
}

#[test]
fn texttable_uses_translated_text() {
    let mut dop = uint_dop(8);
    dop.physical_base_data_type = Some(BaseType::Unicode2String);
    dop.display_radix = None;
    dop.calculation = Some(CalcType::Int32);
    dop.compu = Some(Compu::Texttable {
        scales: vec![TextScale {
            lower_limit: McdValue::UInt32(1),
            upper_limit: McdValue::UInt32(1),
            text: Some("aktiv".to_string()),
            text_id: Some("MAS00001".to_string()),
        }],
        default_value: None,
    });

    let mut texts = std::collections::HashMap::new();
    texts.insert("MAS00001".to_string(), "active".to_string());
    let translations = Translations::from_map(texts);
    let decoder = Decoder::new(&translations);

    let out = decoder.decode(&DataNode::Dop(dop), &[0x01], 0).unwrap();
    assert_eq!(
        out,
        OutNode::Value {
            value: "active".to_string()
        }
    );
}

#[test]
fn tab_intp_interpolates_between_points() {
    let mut dop = uint_dop(8);
    dop.calculation = Some(CalcType::Float64);
    dop.physical_base_data_type = Some(BaseType::Float64);
    dop.display_radix = None;
    dop.compu = Some(Compu::TabIntp {
        points: vec![
            TabPoint {
                limit: McdValue::UInt32(0),
                value_text: Some("0".to_string()),
            },
            TabPoint {
                limit: McdValue::UInt32(10),
                value_text: Some("100".to_string()),
            },
        ],
    });

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let node = DataNode::Dop(dop);

    let mid = decoder.decode(&node, &[5], 0).unwrap();
    assert_eq!(
        mid,
        OutNode::Value {
            value: "50.000000".to_string()
        }
    );

    // Outside the covered range.
    assert!(decoder.decode(&node, &[11], 0).is_err());
}

#[test]
fn leading_length_field_starts_after_the_prefix() {
    // One length byte, then that many payload bytes.
    let mut dop = uint_dop(8);
    dop.coded = CodedLength::LeadingLengthInfo { bit_length: 8 };
    dop.coded_base_data_type = BaseType::ByteField;
    dop.physical_base_data_type = Some(BaseType::ByteField);
    dop.display_radix = None;

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder
        .decode(&DataNode::Dop(dop.clone()), &[0x02, 0xAA, 0xBB, 0xCC], 0)
        .unwrap();
    assert_eq!(
        out,
        OutNode::Value {
            value: "AA BB".to_string()
        }
    );

    // With bit position 2 the length prefix occupies bits 2..10, so it
    // spans two bytes and the payload starts at the next byte edge.
    let out = decoder
        .decode(&DataNode::Dop(dop), &[0x00, 0x04, 0xAA, 0xBB], 2)
        .unwrap();
    assert_eq!(
        out,
        OutNode::Value {
            value: "AA".to_string()
        }
    );
}

#[test]
fn static_field_emits_fixed_items() {
    let inner = structure(
        "Item",
        vec![value_parameter("Word", Some(0), DataNode::Dop(uint_dop(16)))],
    );
    let field = DataNode::StaticField(StaticField {
        fixed_number_of_items: 3,
        item_byte_size: 2,
        structure: Box::new(inner),
    });

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder
        .decode(&field, &[0x00, 0x01, 0x00, 0x02, 0x00, 0x03], 0)
        .unwrap();

    let OutNode::Field { children } = out else {
        panic!("expected a field node");
    };
    let values: Vec<String> = children
        .iter()
        .map(|child| {
            let OutNode::Structure { children, .. } = child else {
                panic!("expected structure items");
            };
            let OutNode::Parameter { value, .. } = &children[0] else {
                panic!("expected parameter children");
            };
            value.clone().unwrap()
        })
        .collect();
    assert_eq!(values, vec!["1", "2", "3"]);
}

fn mux_with_default(default: bool) -> DataNode {
    let case_structure = structure(
        "CaseBody",
        vec![value_parameter("Byte", Some(1), DataNode::Dop(uint_dop(8)))],
    );
    DataNode::Mux(Mux {
        byte_position: 0,
        switch_key: SwitchKey {
            byte_position: 0,
            bit_position: 0,
            dop: Box::new(uint_dop(8)),
        },
        cases: vec![MuxCase {
            long_name: Some("CaseOne".to_string()),
            description: None,
            lower_limit: McdValue::Unicode2String(Some("1".to_string())),
            upper_limit: McdValue::Unicode2String(Some("1".to_string())),
            structure: Box::new(case_structure.clone()),
        }],
        default_case: default.then(|| MuxDefaultCase {
            long_name: Some("Fallback".to_string()),
            structure: Box::new(case_structure),
        }),
    })
}

fn mux_child_value(out: &OutNode) -> String {
    let OutNode::Mux { children, .. } = out else {
        panic!("expected a mux node");
    };
    let OutNode::Structure { children, .. } = &children[0] else {
        panic!("expected the case structure");
    };
    let OutNode::Parameter { value, .. } = &children[0] else {
        panic!("expected the case parameter");
    };
    value.clone().unwrap()
}

#[test]
fn mux_selects_matching_case() {
    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);

    let out = decoder.decode(&mux_with_default(false), &[0x01, 0x2A], 0).unwrap();
    let OutNode::Mux { name, .. } = &out else {
        panic!("expected a mux node");
    };
    assert_eq!(name.as_deref(), Some("CaseOne"));
    assert_eq!(mux_child_value(&out), "42");
}

#[test]
fn mux_falls_back_to_default_case() {
    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);

    let out = decoder.decode(&mux_with_default(true), &[0xFF, 0x00], 0).unwrap();
    let OutNode::Mux { name, .. } = &out else {
        panic!("expected a mux node");
    };
    assert_eq!(name.as_deref(), Some("Fallback"));
    assert_eq!(mux_child_value(&out), "0");
}

#[test]
fn mux_without_match_or_default_fails() {
    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    assert!(decoder
        .decode(&mux_with_default(false), &[0xFF, 0x00], 0)
        .is_err());
}

#[test]
fn reserved_parameters_are_dropped_from_structures() {
    let reserved = DataNode::Parameter(Parameter {
        long_name: Some("Padding".to_string()),
        long_name_id: None,
        description: None,
        byte_position: Some(0),
        bit_position: 0,
        kind: ParameterKind::Reserved,
        default_value: Some(McdValue::UInt32(0)),
        constant: None,
        dop: Box::new(DataNode::Dop(uint_dop(8))),
    });
    let visible = value_parameter("Visible", Some(1), DataNode::Dop(uint_dop(8)));
    let node = structure("Top", vec![reserved, visible]);

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder.decode(&node, &[0x00, 0x07], 0).unwrap();

    let OutNode::Structure { children, .. } = out else {
        panic!("expected a structure");
    };
    assert_eq!(children.len(), 1);
    let OutNode::Parameter { name, value, .. } = &children[0] else {
        panic!("expected a parameter");
    };
    assert_eq!(name.as_deref(), Some("Visible"));
    assert_eq!(value.as_deref(), Some("7"));
}

#[test]
fn coded_const_verifies_received_value() {
    let constant = DataNode::Parameter(Parameter {
        long_name: Some("ServiceId".to_string()),
        long_name_id: None,
        description: None,
        byte_position: Some(0),
        bit_position: 0,
        kind: ParameterKind::CodedConst,
        default_value: None,
        constant: Some(McdValue::UInt32(0x62)),
        dop: Box::new(DataNode::Dop(uint_dop(8))),
    });

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);

    let ok = decoder.decode(&constant, &[0x62], 0).unwrap();
    let OutNode::Parameter { value, .. } = ok else {
        panic!("expected a parameter");
    };
    assert_eq!(value.as_deref(), Some("98"));

    assert!(decoder.decode(&constant, &[0x63], 0).is_err());
}

#[test]
fn unpositioned_parameters_follow_the_cursor() {
    // Second parameter has no byte position and starts after the first.
    let first = value_parameter("First", Some(0), DataNode::Dop(uint_dop(16)));
    let second = value_parameter("Second", None, DataNode::Dop(uint_dop(8)));
    let node = structure("Top", vec![first, second]);

    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder.decode(&node, &[0x01, 0x00, 0x2A], 0).unwrap();

    let OutNode::Structure { children, .. } = out else {
        panic!("expected a structure");
    };
    let OutNode::Parameter { value, .. } = &children[1] else {
        panic!("expected a parameter");
    };
    assert_eq!(value.as_deref(), Some("42"));
}

#[test]
fn rendered_rows_are_indented() {
    let node = structure(
        "Top",
        vec![value_parameter("Only", Some(0), DataNode::Dop(uint_dop(8)))],
    );
    let translations = Translations::empty();
    let decoder = Decoder::new(&translations);
    let out = decoder.decode(&node, &[0x05], 0).unwrap();

    let text = mcddb::render(&out).unwrap();
    assert_eq!(text, "[S] Top - 1\n  [P] Only - 5\n");
}
