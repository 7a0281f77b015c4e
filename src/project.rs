//! Project-level driver: walks a project directory from the well-known
//! entry objects down to a measurement's structure, and hosts the bulk-dump
//! and single-response decode flows built on top of the core.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::decode::{Decoder, OutNode};
use crate::descr::build::DescriptionBuilder;
use crate::descr::DataNode;
use crate::error::{semantic, Error, Result};
use crate::keyfile::{FlatKeyfileDriver, KeyfileDriver};
use crate::object::common::Reference;
use crate::object::layer::LayerData;
use crate::object::service::{ParameterRaw, TableRaw};
use crate::object::RawObject;
use crate::pool::PoolKind;
use crate::resolver::Resolver;
use crate::strings::StringStorage;
use crate::translate::Translations;

/// Object id of the per-pool project data record.
pub const PROJECT_DATA_OBJECT: &str = "#RtGen_DB_PROJECT_DATA";
/// Object id of the per-pool layer data record.
pub const LAYER_DATA_OBJECT: &str = "#RtGen_DB_LAYER_DATA";
/// Pool id of the UDS protocol layer.
pub const UDS_PROTOCOL_POOL: &str = "0.0.0@PR_UDSOnCAN.pr";
/// Pool id of the OBD protocol layer, consulted as a last resort.
pub const OBD_PROTOCOL_POOL: &str = "0.0.0@PR_OBDOnCAN.pr";
/// Diag-comm name of the read-data-by-identifier measurement service.
pub const MWB_SERVICE: &str = "DiagnServi_ReadDataByIdentMeasuValue";
/// Short name of the response parameter carrying the measurement table.
pub const DATA_RECORD_PARAMETER: &str = "Param_DataRecor";

/// One opened project directory: its identity and string storage.
pub struct Project {
    dir: PathBuf,
    strings: StringStorage,
}

impl Project {
    pub fn open(dir: &Path) -> Result<Project> {
        let strings = StringStorage::load(dir)?;
        Ok(Project {
            dir: dir.to_path_buf(),
            strings,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn strings(&self) -> &StringStorage {
        &self.strings
    }

    pub fn resolver(&self, driver: Box<dyn KeyfileDriver>) -> Resolver<'_> {
        Resolver::new(&self.dir, &self.strings, driver)
    }
}

/// Identity of one measurement: its display name and translation id.
#[derive(Debug, Clone, PartialEq)]
pub struct MwbEntry {
    pub long_name: Option<String>,
    pub long_name_id: Option<String>,
}

pub fn load_layer_data(resolver: &Resolver, pool_id: &str) -> Result<LayerData> {
    resolver
        .load_by_id(pool_id, LAYER_DATA_OBJECT)?
        .into_layer_data()
}

/// The protocol layer-data objects consulted when a pool-less reference is
/// not satisfied by the variant layers: the UDS protocol's parent layers in
/// registration order, then UDS itself, then the OBD fallback.
pub fn protocol_layer_data_list(resolver: &Resolver) -> Result<Vec<LayerData>> {
    let uds = load_layer_data(resolver, UDS_PROTOCOL_POOL)?;
    let obd = load_layer_data(resolver, OBD_PROTOCOL_POOL)?;

    let mut layers = Vec::new();
    for parent in &uds.parent_layers_vector {
        let pool_id = parent
            .as_deref()
            .ok_or_else(|| semantic!("protocol parent layer pool id did not resolve"))?;
        layers.push(load_layer_data(resolver, pool_id)?);
    }
    layers.push(uds);
    layers.push(obd);
    Ok(layers)
}

/// The ECU variants referenced by a base variant's project data, in file
/// order. `None` when the base variant has no variants at all.
pub fn ecu_variant_map(
    project_data: &crate::object::layer::ProjectData,
) -> Option<Vec<(String, Reference)>> {
    if project_data.ecu_variant_ref_collection.is_empty() {
        return None;
    }
    Some(
        project_data
            .ecu_variant_ref_collection
            .iter()
            .filter_map(|named| {
                named
                    .name
                    .clone()
                    .map(|name| (name, named.reference.clone()))
            })
            .collect(),
    )
}

/// Layer data of one ECU variant, located through the variant's access key.
pub fn ecu_variant_layer_data(resolver: &Resolver, reference: &Reference) -> Result<LayerData> {
    let pool_id = reference
        .pool_id
        .as_deref()
        .ok_or_else(|| semantic!("ECU-VARIANT reference has no pool id"))?;
    let variant = resolver
        .load_by_id(pool_id, reference.object_id()?)?
        .into_ecu_variant()?;

    let location = variant
        .ecu
        .location_refs
        .first()
        .ok_or_else(|| semantic!("ECU-VARIANT has no location references"))?;
    let access_key = location
        .access_key
        .clone()
        .ok_or_else(|| semantic!("ECU-VARIANT location has no access key"))?
        .into_access_key()?;
    let layer_object_id = access_key
        .layer_data_object_id
        .ok_or_else(|| semantic!("ECU-VARIANT access key names no layer data object"))?;

    resolver
        .load_by_id(pool_id, &layer_object_id)?
        .into_layer_data()
}

/// The DID → measurement map of one variant layer, together with the table
/// holding the per-measurement decode descriptions. `None` when the variant
/// does not expose the measurement service.
pub fn mwb_map(
    resolver: &Resolver,
    layer_data: &LayerData,
) -> Result<Option<(BTreeMap<u32, MwbEntry>, TableRaw)>> {
    let Some((_, rdbi)) = layer_data
        .diag_com_refs
        .iter()
        .find(|(key, _)| key.as_deref() == Some(MWB_SERVICE))
    else {
        return Ok(None);
    };

    let service = resolver
        .load_by_reference(&rdbi.attrib_obj_ref.as_reference())?
        .into_service()?;
    let primitive = &service.diag_service.data_primitive.diag_com_primitive;
    if primitive.positive_response_ref_collection.len() != 1 {
        return Err(semantic!("measurement service has multiple positive responses"));
    }

    let response = resolver
        .load_by_reference(&primitive.positive_response_ref_collection[0].reference)?
        .into_response()?;

    // Find the data-record response parameter; it carries the reference to
    // the measurement table.
    let parameters = response
        .response_parameters
        .ok_or_else(|| semantic!("measurement response has no parameters"))?;
    let mut table_ref = None;
    for parameter in parameters.into_iter().flatten() {
        match parameter {
            RawObject::TableStructParameter(p)
                if p.parameter.short_name.as_deref() == Some(DATA_RECORD_PARAMETER) =>
            {
                table_ref = Some(p.table_ref.as_reference());
                break;
            }
            RawObject::TableKeyParameter(p)
                if p.parameter.short_name.as_deref() == Some(DATA_RECORD_PARAMETER) =>
            {
                table_ref = p.table_ref.as_ref().map(|r| r.as_reference());
                break;
            }
            _ => {}
        }
    }
    let table_ref = table_ref
        .ok_or_else(|| semantic!("could not find {DATA_RECORD_PARAMETER} response parameter"))?;

    let table = resolver.load_by_reference(&table_ref)?.into_table()?;

    // The DID table DOP's text scales correlate each DID with the
    // measurement's display name.
    let did_table_ref = table
        .dop_simple_ref
        .clone()
        .ok_or_else(|| semantic!("measurement table references no DID DOP"))?;
    let did_table = resolver
        .load_by_reference(&did_table_ref)?
        .into_dop_simple_base()?;

    let scales = did_table
        .compu_method
        .as_ref()
        .and_then(|m| m.compu_internal_to_phys.as_ref())
        .and_then(|b| b.compu_scales.as_ref())
        .ok_or_else(|| semantic!("DID table DOP has no COMPU-SCALEs"))?;

    let mut map = BTreeMap::new();
    for scale in scales {
        let did = match &scale.compu_const_as_coded_value {
            Some(crate::object::common::McdValue::UInt32(did)) => *did,
            other => return Err(semantic!("DID table scale has no coded value: {other:?}")),
        };
        let long_name = scale
            .compu_const
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        map.insert(
            did,
            MwbEntry {
                long_name,
                long_name_id: scale.long_name_id.clone(),
            },
        );
    }

    Ok(Some((map, table)))
}

/// Key map of the measurement table: display name → table-row reference.
pub fn mwb_table(table: &TableRaw) -> Vec<(String, Reference)> {
    table
        .table_key_map
        .iter()
        .filter_map(|entry| {
            entry.map_key.clone().map(|key| {
                (
                    key,
                    Reference {
                        object_id: entry.object_id.clone(),
                        pool_id: entry.pool_id.clone(),
                        object_id2: None,
                        strings: None,
                    },
                )
            })
        })
        .collect()
}

/// Resolve a DID to its measurement name and table-row parameter.
///
/// Some projects store the table key with spaces where the DID map uses
/// underscores; the lookup retries with the substitution before giving up.
pub fn mwb_row_by_did(
    resolver: &Resolver,
    table: &[(String, Reference)],
    map: &BTreeMap<u32, MwbEntry>,
    did: u32,
) -> Result<Option<(MwbEntry, ParameterRaw)>> {
    let Some(entry) = map.get(&did) else {
        return Ok(None);
    };
    let long_name = entry.long_name.clone().unwrap_or_default();

    let lookup = |key: &str| {
        table
            .iter()
            .find(|(name, _)| name == key)
            .map(|(name, reference)| (name.clone(), reference.clone()))
    };
    let found = lookup(&long_name).or_else(|| lookup(&long_name.replace('_', " ")));
    let Some((table_key, reference)) = found else {
        return Ok(None);
    };

    let row = resolver
        .load_by_reference(&reference)?
        .into_table_parameter()?;
    if row.key.as_deref() != Some(table_key.as_str()) {
        return Err(semantic!(
            "wrong key in table row: {:?} vs {table_key}",
            row.key
        ));
    }
    Ok(Some((entry.clone(), row.parameter)))
}

/// Load the structure a table-row parameter points at.
pub fn mwb_structure(resolver: &Resolver, row_parameter: &ParameterRaw) -> Result<RawObject> {
    let reference = row_parameter
        .db_object_ref
        .as_ref()
        .ok_or_else(|| semantic!("table row parameter references no structure"))?;
    let raw = resolver.load_by_reference(reference)?;
    match &raw {
        RawObject::Structure(_) => Ok(raw),
        other => Err(semantic!(
            "wrong data type for parameter structure: {}",
            other.type_name()
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response decoding entry point
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs of a single-response decode.
pub struct MwbRequest<'x> {
    pub base_variant_filename: &'x str,
    pub ecu_variant: &'x str,
    pub did: u32,
    pub response: &'x [u8],
}

/// The names available when a lookup inside [`decode_mwb`] fails.
#[derive(Debug)]
pub enum MwbLookupError {
    UnknownEcuVariant { available: Vec<String> },
    UnknownDid { available: Vec<u32> },
}

fn pool_id_of(base_variant_filename: &str) -> Result<&str> {
    let pool_id = base_variant_filename
        .strip_suffix(".db")
        .unwrap_or(base_variant_filename);
    if PoolKind::of(pool_id) != PoolKind::BaseVariant {
        return Err(semantic!("a BASE-VARIANT database must be provided (.bv.db)"));
    }
    Ok(pool_id)
}

/// Decode one captured measurement response against a project.
pub fn decode_mwb(
    project: &Project,
    driver: Box<dyn KeyfileDriver>,
    translations: &Translations,
    request: &MwbRequest,
) -> Result<std::result::Result<OutNode, MwbLookupError>> {
    let resolver = project.resolver(driver);
    let pool_id = pool_id_of(request.base_variant_filename)?;

    let protocol_layers = protocol_layer_data_list(&resolver)?;
    let project_data = resolver
        .load_by_id(pool_id, PROJECT_DATA_OBJECT)?
        .into_project_data()?;
    let base_variant_layer = load_layer_data(&resolver, pool_id)?;

    let Some(variants) = ecu_variant_map(&project_data) else {
        return Err(semantic!(
            "BASE-VARIANT {:?} contains no ECU-VARIANTs",
            project_data.ecu_base_variant_ref.object_id
        ));
    };
    let Some((_, variant_ref)) = variants
        .iter()
        .find(|(name, _)| name == request.ecu_variant)
    else {
        return Ok(Err(MwbLookupError::UnknownEcuVariant {
            available: variants.into_iter().map(|(name, _)| name).collect(),
        }));
    };

    let variant_layer = ecu_variant_layer_data(&resolver, variant_ref)?;
    let Some((map, table)) = mwb_map(&resolver, &variant_layer)? else {
        return Err(semantic!(
            "ECU-VARIANT {} contains no measurements",
            request.ecu_variant
        ));
    };

    if !map.contains_key(&request.did) {
        return Ok(Err(MwbLookupError::UnknownDid {
            available: map.keys().copied().collect(),
        }));
    }

    let table_map = mwb_table(&table);
    let Some((entry, row_parameter)) = mwb_row_by_did(&resolver, &table_map, &map, request.did)?
    else {
        return Err(semantic!("failed to find measurement table row"));
    };

    // The top level is a structure and must start at the first byte edge.
    if row_parameter.byte_position != 0 || row_parameter.bit_position != 0 {
        return Err(semantic!(
            "expected BYTE- and BIT-POSITION 0 for top measurement level, not {} and {}",
            row_parameter.byte_position,
            row_parameter.bit_position
        ));
    }

    let structure_raw = mwb_structure(&resolver, &row_parameter)?;

    let mut layers: Vec<&LayerData> = vec![&variant_layer, &base_variant_layer];
    layers.extend(protocol_layers.iter());

    let builder = DescriptionBuilder::new(&resolver, &layers);
    let structure = builder.build(structure_raw)?;
    if !matches!(structure, DataNode::Structure(_)) {
        return Err(semantic!(
            "measurement base DOP should be STRUCTURE, not {}",
            structure.kind_name()
        ));
    }

    let decoder = Decoder::new(translations);
    let decoded = decoder.decode_response(
        entry.long_name_id.as_deref(),
        entry.long_name.as_deref(),
        &structure,
        request.response,
    )?;
    Ok(Ok(decoded))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bulk description dumps
// ─────────────────────────────────────────────────────────────────────────────

/// Dump every measurement description of one base variant (and of the base
/// variant itself) into per-variant files under
/// `<out>/<base variant>/MWB_<variant>.txt`.
pub fn dump_base_variant(
    resolver: &Resolver,
    protocol_layers: &[LayerData],
    base_variant_filename: &str,
    out_dir: &Path,
    overwrite: bool,
) -> Result<()> {
    let pool_id = pool_id_of(base_variant_filename)?;

    let project_data = resolver
        .load_by_id(pool_id, PROJECT_DATA_OBJECT)?
        .into_project_data()?;
    let base_variant_layer = load_layer_data(resolver, pool_id)?;

    let base_variant_name = project_data
        .ecu_base_variant_ref
        .object_id
        .clone()
        .unwrap_or_else(|| pool_id.to_string());
    let variant_out_dir = out_dir.join(&base_variant_name);

    // The base variant's own measurements come first, then each variant's.
    let mut variants: Vec<(String, Option<Reference>)> =
        vec![(base_variant_name.clone(), None)];
    if let Some(map) = ecu_variant_map(&project_data) {
        variants.extend(
            map.into_iter()
                .map(|(name, reference)| (name, Some(reference))),
        );
    } else {
        log::info!("{base_variant_name}: has no ECU-VARIANTs");
    }

    for (variant_name, variant_ref) in variants {
        let out_path = variant_out_dir.join(format!("MWB_{variant_name}.txt"));
        if !overwrite && out_path.is_file() {
            log::debug!("{variant_name}: already done, skipping");
            continue;
        }

        let layer_data = match &variant_ref {
            None => base_variant_layer.clone(),
            Some(reference) => ecu_variant_layer_data(resolver, reference)?,
        };

        let Some((map, table)) = mwb_map(resolver, &layer_data)? else {
            log::debug!("{variant_name}: has no measurements");
            continue;
        };
        let table_map = mwb_table(&table);

        fs::create_dir_all(&variant_out_dir)?;
        let mut out = fs::File::create(&out_path)?;

        let mut layers: Vec<&LayerData> = vec![&layer_data, &base_variant_layer];
        layers.extend(protocol_layers.iter());
        let builder = DescriptionBuilder::new(resolver, &layers);

        for &did in map.keys() {
            let Some((entry, row_parameter)) =
                mwb_row_by_did(resolver, &table_map, &map, did)?
            else {
                return Err(semantic!("failed to find measurement table row"));
            };
            let structure_raw = mwb_structure(resolver, &row_parameter)?;
            let structure = builder.build(structure_raw)?;

            writeln!(
                out,
                "0x{did:04X}: {} - {}",
                entry.long_name_id.as_deref().unwrap_or_default(),
                entry.long_name.as_deref().unwrap_or_default()
            )?;
            write_description(&mut out, &structure, 1)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Dump all base variants of a project. Per-variant failures are recorded
/// and the run continues; the returned list holds `(pool id, error)` pairs.
pub fn dump_project(
    project: &Project,
    out_dir: &Path,
    overwrite: bool,
) -> Result<Vec<(String, Error)>> {
    let resolver = project.resolver(Box::new(FlatKeyfileDriver));
    let protocol_layers = protocol_layer_data_list(&resolver)?;

    let project_out_dir = out_dir.join(project.name());
    fs::create_dir_all(&project_out_dir)?;

    let mut failures = Vec::new();
    let mut pool_ids: Vec<String> = Vec::new();
    for entry in fs::read_dir(project.dir())? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(pool_id) = name.strip_suffix(".db") else {
            continue;
        };
        if entry.path().is_file() && PoolKind::of(pool_id) == PoolKind::BaseVariant {
            pool_ids.push(pool_id.to_string());
        }
    }
    pool_ids.sort();

    for pool_id in pool_ids {
        log::info!("dumping {pool_id}");
        if let Err(error) = dump_base_variant(
            &resolver,
            &protocol_layers,
            &pool_id,
            &project_out_dir,
            overwrite,
        ) {
            log::warn!("{pool_id}: {error}");
            failures.push((pool_id, error));
        }
    }
    Ok(failures)
}

/// Dump every project under a folder of projects, one rayon worker per
/// project. Nothing is shared between projects; failures are collected and
/// returned as `(project name, message)` pairs.
pub fn dump_projects(projects_dir: &Path, out_dir: &Path) -> Result<Vec<(String, String)>> {
    use rayon::prelude::*;

    let mut project_dirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(projects_dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            project_dirs.push(entry.path());
        }
    }
    project_dirs.sort();

    let failures: Vec<(String, String)> = project_dirs
        .par_iter()
        .filter_map(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::info!("unpacking {name}");

            // A valid project must carry string pools; anything else in the
            // folder is skipped quietly.
            let project = match Project::open(dir) {
                Ok(project) => project,
                Err(_) => {
                    log::info!("{name}: invalid project");
                    return None;
                }
            };

            match dump_project(&project, out_dir, false) {
                Ok(variant_failures) => {
                    let messages: Vec<(String, String)> = variant_failures
                        .into_iter()
                        .map(|(pool_id, error)| {
                            (format!("{name}/{pool_id}"), error.to_string())
                        })
                        .collect();
                    if messages.is_empty() {
                        None
                    } else {
                        Some(messages)
                    }
                }
                Err(error) => {
                    // Projects without the UDS protocol pool are not an
                    // error for the batch run.
                    log::info!("{name}: {error}");
                    Some(vec![(name, error.to_string())])
                }
            }
        })
        .flatten()
        .collect();

    Ok(failures)
}

/// Write an indented description of a normalized node, one line per field of
/// interest.
pub fn write_description<W: Write>(out: &mut W, node: &DataNode, level: usize) -> Result<()> {
    let pad = "  ".repeat(level);
    match node {
        DataNode::Structure(s) => {
            writeln!(
                out,
                "{pad}STRUCTURE {:?} (byte size {:?}, {} parameters)",
                s.long_name.as_deref().unwrap_or_default(),
                s.byte_size,
                s.parameters.len()
            )?;
            for parameter in &s.parameters {
                write_description(out, parameter, level + 1)?;
            }
        }
        DataNode::Parameter(p) => {
            writeln!(
                out,
                "{pad}PARAMETER {:?} ({}, byte {:?}, bit {})",
                p.long_name.as_deref().unwrap_or_default(),
                p.kind.name(),
                p.byte_position,
                p.bit_position
            )?;
            write_description(out, &p.dop, level + 1)?;
        }
        DataNode::Dop(d) => {
            writeln!(
                out,
                "{pad}DOP {} {} {} {}, physical {}{}",
                d.coded.name(),
                d.coded_base_data_type.name(),
                d.encoding.name(),
                d.endianness.name(),
                d.physical_type().name(),
                match &d.compu {
                    Some(compu) => format!(", {}", compu.category_name()),
                    None => String::new(),
                }
            )?;
        }
        DataNode::StaticField(f) => {
            writeln!(
                out,
                "{pad}STATIC-FIELD ({} items of {} bytes)",
                f.fixed_number_of_items, f.item_byte_size
            )?;
            write_description(out, &f.structure, level + 1)?;
        }
        DataNode::DynamicLengthField(f) => {
            writeln!(
                out,
                "{pad}DYNAMIC-LENGTH-FIELD (count at byte {}, bit {}, offset {})",
                f.count_byte_position, f.count_bit_position, f.offset
            )?;
            write_description(out, &f.structure, level + 1)?;
        }
        DataNode::DynamicEndmarkerField(f) => {
            writeln!(
                out,
                "{pad}DYNAMIC-ENDMARKER-FIELD (termination {:?})",
                f.termination_value.as_deref().unwrap_or_default()
            )?;
            write_description(out, &f.structure, level + 1)?;
        }
        DataNode::EndOfPduField(f) => {
            writeln!(out, "{pad}END-OF-PDU-FIELD")?;
            write_description(out, &f.structure, level + 1)?;
        }
        DataNode::Mux(m) => {
            writeln!(
                out,
                "{pad}MUX (byte {}, {} cases{})",
                m.byte_position,
                m.cases.len(),
                if m.default_case.is_some() {
                    ", default"
                } else {
                    ""
                }
            )?;
            for case in &m.cases {
                writeln!(
                    out,
                    "{pad}  CASE {:?} [{:?}, {:?}]",
                    case.long_name.as_deref().unwrap_or_default(),
                    case.lower_limit,
                    case.upper_limit
                )?;
                write_description(out, &case.structure, level + 2)?;
            }
            if let Some(default_case) = &m.default_case {
                writeln!(
                    out,
                    "{pad}  DEFAULT-CASE {:?}",
                    default_case.long_name.as_deref().unwrap_or_default()
                )?;
                write_description(out, &default_case.structure, level + 2)?;
            }
        }
        DataNode::Dtc(d) => {
            writeln!(
                out,
                "{pad}DTC {:?} ({} trouble codes)",
                d.short_name.as_deref().unwrap_or_default(),
                d.dtc_list.len()
            )?;
        }
        DataNode::Invalid { message } => {
            writeln!(out, "{pad}#error: {message}")?;
        }
    }
    Ok(())
}
