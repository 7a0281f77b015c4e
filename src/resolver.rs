//! Cross-pool object loading and reference resolution.
//!
//! A resolver owns the keyfile-backed pool manager and two caches: the
//! per-pool record tables (loaded lazily, kept for the resolver's lifetime)
//! and the pool ids of DOPs that were found through the layer-data search.
//! Caches only hold successfully loaded entries, so a failed load never
//! poisons later lookups. Resolvers are single-threaded by design; parallel
//! callers run one resolver per project.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{ReferenceError, Result};
use crate::keyfile::KeyfileDriver;
use crate::object::common::Reference;
use crate::object::layer::LayerData;
use crate::object::{load_object, RawObject};
use crate::pool::{PoolManager, RecordHeader};
use crate::strings::StringStorage;

pub struct Resolver<'a> {
    project_dir: PathBuf,
    strings: &'a StringStorage,
    pools: PoolManager,
    records: RefCell<HashMap<String, HashMap<u32, RecordHeader>>>,
    dop_cache: RefCell<HashMap<String, Reference>>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        project_dir: &Path,
        strings: &'a StringStorage,
        driver: Box<dyn KeyfileDriver>,
    ) -> Resolver<'a> {
        Resolver {
            project_dir: project_dir.to_path_buf(),
            strings,
            pools: PoolManager::new(driver),
            records: RefCell::new(HashMap::new()),
            dop_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Load an object by pool id and object name. The pool's records are
    /// scanned once and cached for the resolver's lifetime.
    pub fn load_by_id(&self, pool_id: &str, object_id: &str) -> Result<RawObject> {
        let header = self.record_for(pool_id, object_id)?;
        let mut db_file = File::open(PoolManager::db_path(&self.project_dir, pool_id))?;
        let data = PoolManager::get_object_data(&mut db_file, &header)?;
        load_object(&data, self.strings)
    }

    pub fn load_by_reference(&self, reference: &Reference) -> Result<RawObject> {
        let object_id = reference.object_id()?;
        let pool_id = reference
            .pool_id
            .as_deref()
            .ok_or_else(|| ReferenceError::DopNotFound {
                object_id: object_id.to_string(),
            })?;
        self.load_by_id(pool_id, object_id)
    }

    /// Resolve a DOP reference that may omit the pool id.
    ///
    /// With a pool id present the reference is used directly. Without one
    /// the object id is looked up in the ordered layer list's DOP reference
    /// maps (variant layer first, then base variant, then the protocol
    /// layers); the first match wins and is cached for this resolver.
    pub fn load_dop_without_pool(
        &self,
        layer_data_list: &[&LayerData],
        reference: &Reference,
    ) -> Result<RawObject> {
        let object_id = reference.object_id()?;
        if reference.pool_id.is_some() {
            return self.load_by_reference(reference);
        }

        if let Some(cached) = self.dop_cache.borrow().get(object_id) {
            return self.load_by_reference(cached);
        }

        let found = layer_data_list
            .iter()
            .flat_map(|layer| layer.dop_refs_map.iter())
            .find(|(key, _)| key.as_deref() == Some(object_id))
            .map(|(_, reference)| reference.clone());

        match found {
            Some(dop_reference) => {
                let object = self.load_by_reference(&dop_reference)?;
                self.dop_cache
                    .borrow_mut()
                    .insert(object_id.to_string(), dop_reference);
                Ok(object)
            }
            None => Err(ReferenceError::DopNotFound {
                object_id: object_id.to_string(),
            }
            .into()),
        }
    }

    fn record_for(&self, pool_id: &str, object_id: &str) -> Result<RecordHeader> {
        let hash = self.strings.hash_ascii(object_id);

        let mut records = self.records.borrow_mut();
        if !records.contains_key(pool_id) {
            let loaded = self.pools.get_all_records(&self.project_dir, pool_id)?;
            records.insert(pool_id.to_string(), loaded);
        }

        records
            .get(pool_id)
            .and_then(|pool| pool.get(&hash))
            .copied()
            .ok_or_else(|| {
                ReferenceError::ObjectNotFound {
                    pool_id: pool_id.to_string(),
                    object_id: object_id.to_string(),
                    hash,
                }
                .into()
            })
    }
}
