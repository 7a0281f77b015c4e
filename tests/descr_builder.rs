// Builder normalization over hand-built raw objects (no pool access).

use mcddb::descr::build::DescriptionBuilder;
use mcddb::descr::{CalcType, CodedLength, Compu, DataNode, Formula};
use mcddb::keyfile::FlatKeyfileDriver;
use mcddb::object::dop::{
    CompuBase, CompuMethod, CompuScaleRaw, DiagCodedType, DopSimpleBase, PhysicalType,
    RationalCoeffs,
};
use mcddb::object::enums::{BaseType, CompuCategory, DiagCodedKind, Encoding, Endianness};
use mcddb::object::service::ParameterRaw;
use mcddb::object::RawObject;
use mcddb::resolver::Resolver;
use mcddb::strings::StringStorage;

fn standard_dct(base: BaseType, encoding: Encoding, bit_length: u32) -> DiagCodedType {
    DiagCodedType {
        kind: DiagCodedKind::StandardLength,
        bit_length: Some(bit_length),
        min_length: None,
        max_length: None,
        termination: None,
        bit_mask: Vec::new(),
        base_data_type: base,
        encoding,
        is_high_low_byte_order: true,
        is_condensed_bit_mask: false,
        length_key_parameter: None,
    }
}

fn empty_scale() -> CompuScaleRaw {
    CompuScaleRaw {
        long_name_id: None,
        compu_inverse_rational_coeffs: None,
        compu_rational_coeffs: Some(RationalCoeffs {
            numerator: vec![0.0, 0.75],
            denominator: Vec::new(),
        }),
        lower_limit: None,
        upper_limit: None,
        compu_const: None,
        compu_inverse_value: None,
        compu_const_as_coded_value: None,
        lower_limit_as_coded_value: None,
        upper_limit_as_coded_value: None,
    }
}

fn linear_method() -> CompuMethod {
    CompuMethod {
        compu_category: CompuCategory::Linear,
        compu_phys_to_internal: None,
        compu_internal_to_phys: Some(CompuBase {
            compu_scales: Some(vec![empty_scale()]),
            compu_default_value: None,
            compu_code_byte_stream: None,
            code_information: None,
            compu_inverse_value: None,
        }),
        compu_inverse_val_id: None,
        compu_default_val_id: None,
    }
}

fn simple_dop(dct: DiagCodedType, physical: PhysicalType, method: CompuMethod) -> RawObject {
    RawObject::DopSimpleBase(DopSimpleBase {
        short_name: Some("DOP_Test".to_string()),
        compu_method: Some(method),
        diag_coded_type: Some(dct),
        physical_type: Some(physical),
        phys_to_coded_index_map: Vec::new(),
        coded_to_phys_index_map: Vec::new(),
        units_ref: None,
        internal_constraint_ref: None,
        physical_constraint_ref: None,
    })
}

fn with_builder<T>(run: impl FnOnce(&DescriptionBuilder) -> T) -> T {
    let dir = tempfile::tempdir().unwrap();
    let strings = StringStorage::empty();
    let resolver = Resolver::new(dir.path(), &strings, Box::new(FlatKeyfileDriver));
    let builder = DescriptionBuilder::new(&resolver, &[]);
    run(&builder)
}

#[test]
fn linear_dop_normalizes_formula_and_calculation() {
    let node = with_builder(|builder| {
        builder
            .build(simple_dop(
                standard_dct(BaseType::UInt32, Encoding::None, 8),
                PhysicalType {
                    base_data_type: BaseType::Float32,
                    precision: Some(2),
                    display_radix: 10,
                },
                linear_method(),
            ))
            .unwrap()
    });

    let DataNode::Dop(dop) = node else {
        panic!("expected a DOP node");
    };
    assert_eq!(dop.coded_base_data_type, BaseType::UInt32);
    assert_eq!(dop.endianness, Endianness::Big);
    assert_eq!(dop.physical_base_data_type, Some(BaseType::Float32));
    assert_eq!(dop.precision, Some(2));
    // Radix applies to unsigned physicals only.
    assert_eq!(dop.display_radix, None);
    assert_eq!(dop.calculation, Some(CalcType::Float64));

    let Some(Compu::Linear(scale)) = dop.compu else {
        panic!("expected a linear computation");
    };
    assert_eq!(
        scale.formula,
        Formula::Linear {
            offset: 0.0,
            factor: 0.75,
            divisor: 1.0
        }
    );
}

#[test]
fn out_of_range_bit_length_demotes_to_invalid_node() {
    let node = with_builder(|builder| {
        builder
            .build(simple_dop(
                standard_dct(BaseType::UInt32, Encoding::None, 33),
                PhysicalType {
                    base_data_type: BaseType::UInt32,
                    precision: None,
                    display_radix: 10,
                },
                linear_method(),
            ))
            .unwrap()
    });
    let DataNode::Invalid { message } = node else {
        panic!("expected an invalid node");
    };
    assert!(message.contains("BIT-LENGTH"));
}

#[test]
fn float_bit_length_violation_is_fatal() {
    let result = with_builder(|builder| {
        builder.build(simple_dop(
            standard_dct(BaseType::Float32, Encoding::Ieee754, 16),
            PhysicalType {
                base_data_type: BaseType::Float32,
                precision: None,
                display_radix: 10,
            },
            CompuMethod {
                compu_category: CompuCategory::Identical,
                compu_phys_to_internal: None,
                compu_internal_to_phys: None,
                compu_inverse_val_id: None,
                compu_default_val_id: None,
            },
        ))
    });
    assert!(result.is_err());
}

#[test]
fn identical_rejects_conversion_tables() {
    let result = with_builder(|builder| {
        builder.build(simple_dop(
            standard_dct(BaseType::UInt32, Encoding::None, 8),
            PhysicalType {
                base_data_type: BaseType::UInt32,
                precision: None,
                display_radix: 10,
            },
            CompuMethod {
                compu_category: CompuCategory::Identical,
                compu_phys_to_internal: None,
                compu_internal_to_phys: Some(CompuBase {
                    compu_scales: None,
                    compu_default_value: None,
                    compu_code_byte_stream: None,
                    code_information: None,
                    compu_inverse_value: None,
                }),
                compu_inverse_val_id: None,
                compu_default_val_id: None,
            },
        ))
    });
    assert!(result.is_err());
}

#[test]
fn linear_requires_exactly_one_scale() {
    let mut method = linear_method();
    if let Some(base) = &mut method.compu_internal_to_phys {
        base.compu_scales = Some(vec![empty_scale(), empty_scale()]);
    }
    let result = with_builder(|builder| {
        builder.build(simple_dop(
            standard_dct(BaseType::UInt32, Encoding::None, 8),
            PhysicalType {
                base_data_type: BaseType::UInt32,
                precision: None,
                display_radix: 10,
            },
            method,
        ))
    });
    assert!(result.is_err());
}

#[test]
fn parameter_bit_position_is_bounded() {
    let parameter = ParameterRaw {
        description: None,
        long_name: Some("Broken".to_string()),
        short_name: None,
        some_id: None,
        long_name_id: None,
        unique_object_id: None,
        bit_position: 9,
        byte_position: 0,
        default_mcd_value: None,
        display_level: 0,
        semantic: None,
        sys_param: None,
        mcd_parameter_type: mcddb::object::enums::ParameterType::Value,
        layer_id: None,
        diag_coded_type: None,
        db_object_ref: None,
        is_byte_pos_available: false,
        is_protocol_parameter: false,
    };
    let result = with_builder(|builder| builder.build(RawObject::Parameter(parameter)));
    assert!(result.is_err());
}

#[test]
fn coded_const_embeds_a_coded_only_dop() {
    let parameter = ParameterRaw {
        description: None,
        long_name: Some("ServiceId".to_string()),
        short_name: None,
        some_id: None,
        long_name_id: None,
        unique_object_id: None,
        bit_position: 0,
        byte_position: 0,
        default_mcd_value: Some(mcddb::object::common::McdValue::UInt32(0x62)),
        display_level: 0,
        semantic: None,
        sys_param: None,
        mcd_parameter_type: mcddb::object::enums::ParameterType::CodedConst,
        layer_id: None,
        diag_coded_type: Some(Box::new(RawObject::DiagCodedType(standard_dct(
            BaseType::UInt32,
            Encoding::None,
            8,
        )))),
        db_object_ref: None,
        is_byte_pos_available: true,
        is_protocol_parameter: false,
    };
    let node = with_builder(|builder| builder.build(RawObject::Parameter(parameter)).unwrap());

    let DataNode::Parameter(parameter) = node else {
        panic!("expected a parameter");
    };
    assert_eq!(parameter.kind, mcddb::descr::ParameterKind::CodedConst);
    let DataNode::Dop(dop) = parameter.dop.as_ref() else {
        panic!("expected an embedded DOP");
    };
    // The embedded DOP has no physical side; it decodes as its coded type.
    assert_eq!(dop.physical_base_data_type, None);
    assert_eq!(dop.compu, None);
    assert!(matches!(
        dop.coded,
        CodedLength::Standard { bit_length: 8, .. }
    ));
}
