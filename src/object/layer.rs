//! Raw records for the containment layers: layer data, project data, access
//! keys, ECUs and their variants.

use crate::error::{semantic, Result};
use crate::object::common::{
    read_ascii_string_vector, read_diag_com_reference_map, read_named_references,
    read_reference_map, read_string_vector_map, DiagComReference, NamedReference, Reference,
};
use crate::object::dop::expect_absent;
use crate::object::enums::LocationType;
use crate::object::{read_object, read_object_if_exists, RawObject};
use crate::stream::ObjectStream;

/// `DB_LAYER_DATA`: the per-layer reference maps consulted when resolving
/// pool-less references, plus the layer's identity and protocol parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerData {
    pub layer_id: Option<String>,
    pub protocol_type: Option<String>,
    pub protocol_stack_short_name: Option<String>,
    pub com_param_spec_pool_id: Option<String>,
    pub mcd_location_type: LocationType,
    pub ecu_base_variant_ref: Option<Reference>,
    pub ecu_variant_ref: Option<Reference>,
    pub functional_group_ref: Option<Reference>,
    pub diag_com_refs: Vec<(Option<String>, DiagComReference)>,
    pub dtc_dops: Vec<Option<String>>,
    pub dop_refs_map: Vec<(Option<String>, Reference)>,
    pub table_refs_map: Vec<(Option<String>, Reference)>,
    pub request_refs_map: Vec<(Option<String>, Reference)>,
    pub global_negative_response_refs_map: Vec<(Option<String>, Reference)>,
    pub functional_class_refs_map: Vec<(Option<String>, Reference)>,
    pub functional_class_data_primitive_refs_map:
        Vec<(Option<String>, Vec<(Option<String>, DiagComReference)>)>,
    pub env_data_descs_map: Vec<(Option<String>, Option<RawObject>)>,
    pub parent_layers_vector: Vec<Option<String>>,
    pub shared_data_parent_layers_vector: Vec<Option<String>>,
    pub not_inherited_dops_map: Vec<(Option<String>, Vec<Option<String>>)>,
    pub not_inherited_glob_neg_responses_map: Vec<(Option<String>, Vec<Option<String>>)>,
    pub unit_group_refs_map: Vec<(Option<String>, Reference)>,
    pub unit_refs_map: Vec<(Option<String>, Reference)>,
    pub protocol_parameters: Vec<Option<RawObject>>,
}

impl LayerData {
    pub fn read(stream: &mut ObjectStream) -> Result<LayerData> {
        let layer_id = stream.ascii_string()?.0;
        let _unk_string = stream.ascii_string()?.0;
        let protocol_type = stream.ascii_string()?.0;
        let protocol_stack_short_name = stream.ascii_string()?.0;
        let com_param_spec_pool_id = stream.ascii_string()?.0;

        let mcd_location_type = LocationType::from_raw(stream.u16_le()?)?;
        let mut ecu_base_variant_ref = None;
        let mut ecu_variant_ref = None;
        let mut functional_group_ref = None;
        match mcd_location_type {
            LocationType::EcuBaseVariant => {
                ecu_base_variant_ref = Some(Reference::read(stream, false, false)?);
            }
            LocationType::EcuVariant => {
                ecu_variant_ref = Some(Reference::read(stream, false, false)?);
            }
            LocationType::FunctionalGroup => {
                functional_group_ref = Some(Reference::read(stream, false, false)?);
            }
            LocationType::MultipleEcuJob | LocationType::Protocol => {}
        }

        let diag_com_refs = read_diag_com_reference_map(stream)?;
        let dtc_dops = read_ascii_string_vector(stream)?;

        let dop_refs_map = read_reference_map(stream, false)?;
        let table_refs_map = read_reference_map(stream, true)?;
        let request_refs_map = read_reference_map(stream, false)?;
        let global_negative_response_refs_map = read_reference_map(stream, false)?;
        let functional_class_refs_map = read_reference_map(stream, false)?;

        let mut functional_class_data_primitive_refs_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            let name = stream.ascii_string()?.0;
            let map = read_diag_com_reference_map(stream)?;
            functional_class_data_primitive_refs_map.push((name, map));
        }

        expect_empty_map(stream, "ecu state chart reference map")?;
        expect_empty_map(stream, "sub component reference map")?;
        expect_empty_map(stream, "additional audience reference map")?;

        let mut env_data_descs_map = Vec::new();
        for _ in 0..stream.u16_le()? {
            let key = stream.ascii_string()?.0;
            let desc = read_object_if_exists(stream)?;
            env_data_descs_map.push((key, desc));
        }

        let parent_layers_vector = read_ascii_string_vector(stream)?;
        let shared_data_parent_layers_vector = read_ascii_string_vector(stream)?;

        let not_inherited_dops_map = read_string_vector_map(stream)?;
        let _unk_map1 = read_string_vector_map(stream)?;
        let _unk_map2 = read_string_vector_map(stream)?;
        let not_inherited_glob_neg_responses_map = read_string_vector_map(stream)?;

        let unit_group_refs_map = read_reference_map(stream, false)?;
        let unit_refs_map = read_reference_map(stream, false)?;

        let mut protocol_parameters = Vec::new();
        for _ in 0..stream.u16_le()? {
            protocol_parameters.push(read_object_if_exists(stream)?);
        }

        stream.u8()?;

        if stream.u8()? != 0 {
            return Err(semantic!("layer data carries special data group refs"));
        }
        expect_empty_map(stream, "diag com object reference map")?;

        Ok(LayerData {
            layer_id,
            protocol_type,
            protocol_stack_short_name,
            com_param_spec_pool_id,
            mcd_location_type,
            ecu_base_variant_ref,
            ecu_variant_ref,
            functional_group_ref,
            diag_com_refs,
            dtc_dops,
            dop_refs_map,
            table_refs_map,
            request_refs_map,
            global_negative_response_refs_map,
            functional_class_refs_map,
            functional_class_data_primitive_refs_map,
            env_data_descs_map,
            parent_layers_vector,
            shared_data_parent_layers_vector,
            not_inherited_dops_map,
            not_inherited_glob_neg_responses_map,
            unit_group_refs_map,
            unit_refs_map,
            protocol_parameters,
        })
    }
}

fn expect_empty_map(stream: &mut ObjectStream, what: &str) -> Result<()> {
    let map = read_reference_map(stream, false)?;
    if !map.is_empty() {
        return Err(semantic!("{what} not empty ({} entries)", map.len()));
    }
    Ok(())
}

/// `MCD_ACCESS_KEY`: locates a layer's data object, either through a pool id
/// or through a layer-data object id.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessKey {
    pub ecu_base_variant: Option<String>,
    pub ecu_base_variant_id: Option<String>,
    pub ecu_variant: Option<String>,
    pub ecu_variant_id: Option<String>,
    pub functional_group: Option<String>,
    pub multiple_ecu_job: Option<String>,
    pub protocol: Option<String>,
    pub location_type: LocationType,
    pub pool_id: Option<String>,
    pub layer_data_object_id: Option<String>,
    pub access_string: String,
}

impl AccessKey {
    pub fn read(stream: &mut ObjectStream) -> Result<AccessKey> {
        let ecu_base_variant = stream.ascii_string()?.0;
        let ecu_base_variant_id = stream.ascii_string()?.0;
        let ecu_variant = stream.ascii_string()?.0;
        let ecu_variant_id = stream.ascii_string()?.0;
        let functional_group = stream.ascii_string()?.0;
        let multiple_ecu_job = stream.ascii_string()?.0;
        let protocol = stream.ascii_string()?.0;

        let location_type = LocationType::from_raw(stream.u16_le()?)?;

        let var_id = stream
            .ascii_string()?
            .0
            .ok_or_else(|| semantic!("access key variant id did not resolve"))?;
        // Pool ids look like `a.b.c@Name.xx`; everything else names the
        // layer-data object inside the current pool.
        let bytes = var_id.as_bytes();
        let looks_like_pool = bytes.len() >= 7
            && bytes[1] == b'.'
            && bytes[3] == b'.'
            && bytes[5] == b'@'
            && bytes[bytes.len() - 3] == b'.';
        let (pool_id, layer_data_object_id) = if looks_like_pool {
            (Some(var_id), None)
        } else {
            (None, Some(var_id))
        };

        let mut access_string = String::new();
        let mut push = |field: &str, value: &Option<String>| {
            if let Some(value) = value {
                if !access_string.is_empty() {
                    access_string.push('.');
                }
                access_string.push_str(&format!("[{field}]{value}"));
            }
        };
        push("Protocol", &protocol);
        push("FunctionalGroup", &functional_group);
        push("EcuBaseVariant", &ecu_base_variant);
        push("EcuVariant", &ecu_variant);

        Ok(AccessKey {
            ecu_base_variant,
            ecu_base_variant_id,
            ecu_variant,
            ecu_variant_id,
            functional_group,
            multiple_ecu_job,
            protocol,
            location_type,
            pool_id,
            layer_data_object_id,
            access_string,
        })
    }
}

/// One entry of an ECU's location table: a named reference plus its access
/// key.
#[derive(Debug, Clone, PartialEq)]
pub struct EcuLocationRef {
    pub name: Option<String>,
    pub object_id: Option<String>,
    pub pool_id: Option<String>,
    pub access_key: Option<Box<RawObject>>,
}

/// `MCD_DB_ECU`: identity plus the location table shared by base variants,
/// variants and functional groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Ecu {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub long_name_id: Option<String>,
    pub description_id: Option<String>,
    pub location_refs: Vec<EcuLocationRef>,
}

impl Ecu {
    pub fn read(stream: &mut ObjectStream) -> Result<Ecu> {
        let short_name = stream.ascii_string()?.0;
        let long_name = stream.unicode_string()?.0;
        let description = stream.unicode_string()?.0;
        expect_absent(stream.ascii_string()?.0)?;
        let long_name_id = stream.ascii_string()?.0;
        let description_id = stream.ascii_string()?.0;

        let mut location_refs = Vec::new();
        for _ in 0..stream.u16_le()? {
            let name = stream.ascii_string()?.0;
            let object_id = stream.ascii_string()?.0;
            let pool_id = stream.ascii_string()?.0;
            let access_key = read_object_if_exists(stream)?.map(Box::new);
            location_refs.push(EcuLocationRef {
                name,
                object_id,
                pool_id,
                access_key,
            });
        }
        Ok(Ecu {
            short_name,
            long_name,
            description,
            long_name_id,
            description_id,
            location_refs,
        })
    }
}

/// `MCD_DB_ECU_BASE_VARIANT`: variant references, matching patterns and the
/// embedded ECU record.
#[derive(Debug, Clone, PartialEq)]
pub struct EcuBaseVariant {
    pub ecu_variant_ref_collection: Vec<NamedReference<Reference>>,
    pub matching_patterns: Vec<(Option<String>, Option<RawObject>)>,
    pub ecu: Ecu,
}

impl EcuBaseVariant {
    pub fn read(stream: &mut ObjectStream) -> Result<EcuBaseVariant> {
        let ecu_variant_ref_collection = read_named_references(stream)?;
        let mut matching_patterns = Vec::new();
        for _ in 0..stream.u16_le()? {
            let short_name = stream.ascii_string()?.0;
            let items = read_object_if_exists(stream)?;
            matching_patterns.push((short_name, items));
        }
        Ok(EcuBaseVariant {
            ecu_variant_ref_collection,
            matching_patterns,
            ecu: Ecu::read(stream)?,
        })
    }
}

/// `MCD_DB_ECU_VARIANT`.
#[derive(Debug, Clone, PartialEq)]
pub struct EcuVariant {
    pub ecu_base_variant_ref: Reference,
    pub matching_patterns: Option<Box<RawObject>>,
    pub ecu: Ecu,
}

impl EcuVariant {
    pub fn read(stream: &mut ObjectStream) -> Result<EcuVariant> {
        Ok(EcuVariant {
            ecu_base_variant_ref: Reference::read(stream, false, false)?,
            matching_patterns: read_object_if_exists(stream)?.map(Box::new),
            ecu: Ecu::read(stream)?,
        })
    }
}

/// `MCD_DB_LOCATION_REFERENCES`: a pool-qualified object id plus its access
/// keys (read without presence flags).
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReferences {
    pub object_id: Option<String>,
    pub pool_id: Option<String>,
    pub access_keys: Vec<RawObject>,
}

impl LocationReferences {
    pub fn read(stream: &mut ObjectStream) -> Result<LocationReferences> {
        let object_id = stream.ascii_string()?.0;
        let pool_id = stream.ascii_string()?.0;
        let mut access_keys = Vec::new();
        for _ in 0..stream.u8()? {
            access_keys.push(read_object(stream)?);
        }
        Ok(LocationReferences {
            object_id,
            pool_id,
            access_keys,
        })
    }
}

/// `DB_PROJECT_DATA`: the well-known `#RtGen_DB_PROJECT_DATA` object of each
/// pool, naming the layers the pool contributes to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectData {
    pub location_refs: Vec<LocationReferences>,
    pub functional_group_ref: Reference,
    pub ecu_base_variant_ref: Reference,
    pub ecu_variant_ref_collection: Vec<NamedReference<Reference>>,
    pub ecu_variant_ref: Reference,
    pub functional_groups: Vec<Option<String>>,
    pub ecu_variants: Vec<Option<RawObject>>,
}

impl ProjectData {
    pub fn read(stream: &mut ObjectStream) -> Result<ProjectData> {
        let mut location_refs = Vec::new();
        for _ in 0..stream.u16_le()? {
            location_refs.push(LocationReferences::read(stream)?);
        }

        let functional_group_ref = Reference::read(stream, true, false)?;
        let ecu_base_variant_ref = Reference::read(stream, true, false)?;
        let ecu_variant_ref_collection = read_named_references(stream)?;
        let ecu_variant_ref = Reference::read(stream, true, false)?;

        let _string1 = stream.ascii_string()?.0;
        let _string2 = stream.ascii_string()?.0;
        let _string3 = stream.ascii_string()?.0;

        let functional_groups = read_ascii_string_vector(stream)?;

        let mut ecu_variants = Vec::new();
        for _ in 0..stream.u16_le()? {
            ecu_variants.push(read_object_if_exists(stream)?);
        }

        Ok(ProjectData {
            location_refs,
            functional_group_ref,
            ecu_base_variant_ref,
            ecu_variant_ref_collection,
            ecu_variant_ref,
            functional_groups,
            ecu_variants,
        })
    }
}

/// `DB_VEHICLE_INFO_DATA`.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInfoData {
    pub vehicle_information_refs: Vec<(Option<String>, Reference)>,
}

impl VehicleInfoData {
    pub fn read(stream: &mut ObjectStream) -> Result<VehicleInfoData> {
        let vehicle_information_refs = read_reference_map(stream, false)?;
        let counter = stream.u16_le()?;
        if counter != 0 {
            return Err(semantic!("vehicle info data trailer counter is {counter}"));
        }
        Ok(VehicleInfoData {
            vehicle_information_refs,
        })
    }
}

/// `MCD_AUDIENCE`: five audience flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audience {
    pub supplier: bool,
    pub development: bool,
    pub manufacturing: bool,
    pub after_sales: bool,
    pub after_market: bool,
}

impl Audience {
    pub fn read(stream: &mut ObjectStream) -> Result<Audience> {
        Ok(Audience {
            supplier: stream.u8()? != 0,
            development: stream.u8()? != 0,
            manufacturing: stream.u8()? != 0,
            after_sales: stream.u8()? != 0,
            after_market: stream.u8()? != 0,
        })
    }
}

/// `MCD_DB_CODE_INFORMATION`.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeInformation {
    pub code_file: Option<String>,
    pub encryption: Option<String>,
    pub syntax: Option<String>,
    pub revision: Option<String>,
    pub entry_point: Option<String>,
    pub library_refs: Vec<(Option<String>, NamedReference<Reference>)>,
}

impl CodeInformation {
    pub fn read(stream: &mut ObjectStream) -> Result<CodeInformation> {
        Ok(CodeInformation {
            code_file: stream.unicode_string()?.0,
            encryption: stream.unicode_string()?.0,
            syntax: stream.unicode_string()?.0,
            revision: stream.unicode_string()?.0,
            entry_point: stream.unicode_string()?.0,
            library_refs: crate::object::common::read_named_reference_map(stream)?,
        })
    }
}
