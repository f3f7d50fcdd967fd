use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::model::record::RecordHandle;
use crate::model::value::Document;
use crate::naming::{dasherize, TypeNameNormalization};
use crate::ops::array_manager::RecordArrayManager;

/// Identity capability consumed by the resolver
///
/// Lookups never fetch: a record that has not arrived yet is a `None`, not an
/// error. Implementations must return the same handle for the same identity.
pub trait RecordStore {
    /// Look up a record by normalized model name and id
    fn lookup_by_type_and_id(&self, model_name: &str, id: &str) -> Option<RecordHandle>;

    /// Look up a record by id in the global id-space
    fn lookup_global_by_id(&self, id: &str) -> Option<RecordHandle>;

    /// Manager that reference arrays are registered with
    fn record_array_manager(&self) -> &RecordArrayManager;

    /// Normalization applied to every model name before it touches a cache
    fn normalize_model_name(&self, model_name: &str) -> String {
        dasherize(model_name)
    }
}

/// Process-wide id -> record map for schemas with a global id-space
///
/// Shared between stores through an `Rc` and always passed in explicitly.
#[derive(Debug, Default)]
pub struct GlobalIdentityCache {
    records: RefCell<HashMap<String, RecordHandle>>,
}

impl GlobalIdentityCache {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn get(&self, id: &str) -> Option<RecordHandle> {
        self.records.borrow().get(id).cloned()
    }

    /// Insert or replace the record registered under `id`
    pub fn insert(&self, id: impl Into<String>, record: RecordHandle) {
        self.records.borrow_mut().insert(id.into(), record);
    }

    /// Remove `id` only if it still maps to `record`
    pub fn remove_if_same(&self, id: &str, record: &RecordHandle) -> bool {
        let mut records = self.records.borrow_mut();
        match records.get(id) {
            Some(existing) if existing == record => {
                records.remove(id);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

/// In-memory identity store
///
/// Keeps one canonical handle per `(model name, id)` and mirrors every record
/// into the injected global cache. Single-threaded by construction. A record
/// destroyed while still stored is invisible to lookups and is replaced by
/// the next push of its identity.
#[derive(Debug)]
pub struct MemoryStore {
    records: RefCell<HashMap<(String, String), RecordHandle>>,
    global: Rc<GlobalIdentityCache>,
    arrays: RecordArrayManager,
    type_names: TypeNameNormalization,
}

impl MemoryStore {
    pub fn new(global: Rc<GlobalIdentityCache>) -> Self {
        Self {
            records: RefCell::new(HashMap::new()),
            global,
            arrays: RecordArrayManager::new(),
            type_names: TypeNameNormalization::default(),
        }
    }

    pub fn with_config(config: &EngineConfig, global: Rc<GlobalIdentityCache>) -> Self {
        let mut store = Self::new(global);
        store.type_names = config.type_names;
        store
    }

    pub fn global_cache(&self) -> &Rc<GlobalIdentityCache> {
        &self.global
    }

    /// Insert a record, or merge attributes into the existing one.
    ///
    /// The existing handle is kept so identity is preserved across pushes;
    /// pushed keys are invalidated on it. A destroyed handle is replaced.
    pub fn push_record(&self, model_name: &str, id: &str, attributes: Document) -> RecordHandle {
        let model_name = self.normalize_model_name(model_name);
        let cache_key = (model_name.clone(), id.to_string());

        let existing = self.live_entry(&cache_key);
        let record = match existing {
            Some(record) => {
                record.push_attributes(attributes);
                record
            }
            None => {
                let record = RecordHandle::new(model_name.clone(), id, attributes);
                self.records.borrow_mut().insert(cache_key, record.clone());
                record
            }
        };

        self.global.insert(id, record.clone());
        tracing::debug!(model_name = %model_name, id, "record pushed");
        record
    }

    fn live_entry(&self, cache_key: &(String, String)) -> Option<RecordHandle> {
        self.records
            .borrow()
            .get(cache_key)
            .filter(|record| !record.is_destroyed())
            .cloned()
    }

    pub fn peek_record(&self, model_name: &str, id: &str) -> Option<RecordHandle> {
        self.lookup_by_type_and_id(&self.normalize_model_name(model_name), id)
    }

    /// Remove and destroy a record. Returns whether it was present.
    pub fn unload_record(&self, model_name: &str, id: &str) -> bool {
        let cache_key = (self.normalize_model_name(model_name), id.to_string());
        let removed = self.records.borrow_mut().remove(&cache_key);
        match removed {
            Some(record) => {
                self.global.remove_if_same(id, &record);
                record.destroy();
                true
            }
            None => false,
        }
    }

    pub fn list_records(&self) -> Vec<RecordHandle> {
        self.records
            .borrow()
            .values()
            .filter(|record| !record.is_destroyed())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Unload every record
    pub fn clear(&self) {
        let records: Vec<_> = self.records.borrow_mut().drain().collect();
        for ((_, id), record) in records {
            self.global.remove_if_same(&id, &record);
            record.destroy();
        }
    }
}

impl RecordStore for MemoryStore {
    fn lookup_by_type_and_id(&self, model_name: &str, id: &str) -> Option<RecordHandle> {
        self.live_entry(&(model_name.to_string(), id.to_string()))
    }

    fn lookup_global_by_id(&self, id: &str) -> Option<RecordHandle> {
        self.global.get(id).filter(|record| !record.is_destroyed())
    }

    fn record_array_manager(&self) -> &RecordArrayManager {
        &self.arrays
    }

    fn normalize_model_name(&self, model_name: &str) -> String {
        self.type_names.apply(model_name)
    }
}

// Resolved references can form Rc cycles between records; destroying every
// record on drop clears their caches and breaks those cycles.
impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_new_store() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_push_preserves_identity() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        let first = store.push_record("person", "1", doc(json!({"name": "Ada"})));
        let second = store.push_record("person", "1", doc(json!({"name": "Grace"})));

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(first.raw_attr("name"), Some(json!("Grace")));
    }

    #[test]
    fn test_push_normalizes_model_name() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        let record = store.push_record("BookExcerpt", "1", Document::new());

        assert_eq!(record.model_name(), Some("book-excerpt"));
        assert_eq!(store.peek_record("book_excerpt", "1"), Some(record.clone()));
        assert_eq!(store.lookup_by_type_and_id("book-excerpt", "1"), Some(record));
    }

    #[test]
    fn test_preserve_normalization_from_config() {
        let config = EngineConfig {
            type_names: TypeNameNormalization::Preserve,
            ..EngineConfig::default()
        };
        let store = MemoryStore::with_config(&config, GlobalIdentityCache::new());
        store.push_record("BookExcerpt", "1", Document::new());

        assert!(store.peek_record("BookExcerpt", "1").is_some());
        assert!(store.peek_record("book-excerpt", "1").is_none());
    }

    #[test]
    fn test_records_mirrored_into_global_cache() {
        let global = GlobalIdentityCache::new();
        let store = MemoryStore::new(global.clone());
        let record = store.push_record("person", "42", Document::new());

        assert_eq!(global.get("42"), Some(record.clone()));
        assert_eq!(store.lookup_global_by_id("42"), Some(record));
    }

    #[test]
    fn test_unload_record() {
        let global = GlobalIdentityCache::new();
        let store = MemoryStore::new(global.clone());
        let record = store.push_record("person", "1", Document::new());

        assert!(store.unload_record("person", "1"));
        assert!(record.is_destroyed());
        assert!(store.peek_record("person", "1").is_none());
        assert!(global.is_empty());
        assert!(!store.unload_record("person", "1"));
    }

    #[test]
    fn test_unload_keeps_foreign_global_entry() {
        let global = GlobalIdentityCache::new();
        let store = MemoryStore::new(global.clone());
        store.push_record("person", "1", Document::new());
        let other = store.push_record("robot", "1", Document::new());

        assert!(store.unload_record("person", "1"));
        assert_eq!(global.get("1"), Some(other));
    }

    #[test]
    fn test_destroyed_record_is_absent_until_pushed_again() {
        let global = GlobalIdentityCache::new();
        let store = MemoryStore::new(global.clone());
        let stale = store.push_record("person", "1", doc(json!({"name": "Ada"})));
        stale.destroy();

        assert!(store.peek_record("person", "1").is_none());
        assert!(store.lookup_global_by_id("1").is_none());
        assert_eq!(store.len(), 1);

        let fresh = store.push_record("person", "1", doc(json!({"name": "Grace"})));
        assert_ne!(fresh, stale);
        assert!(!fresh.is_destroyed());
        assert_eq!(store.peek_record("person", "1"), Some(fresh.clone()));
        assert_eq!(global.get("1"), Some(fresh));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drop_destroys_records() {
        let global = GlobalIdentityCache::new();
        let record = {
            let store = MemoryStore::new(global.clone());
            store.push_record("person", "1", Document::new())
        };
        assert!(record.is_destroyed());
        assert!(global.is_empty());
    }
}
