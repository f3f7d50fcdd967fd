use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::errors::{MegarecError, Result};
use crate::model::value::{Document, RawValue, ResolvedValue};
use crate::ops::store::RecordStore;
use crate::resolve::guard::DependencyGuard;
use crate::resolve::resolve_value;
use crate::schema::Schema;
use crate::{log_op_end, log_op_error, log_op_start};

/// Non-owning link from an embedded record to the slot that produced it
#[derive(Debug, Clone)]
pub struct ParentLink {
    record: Weak<Record>,
    key: String,
    index: Option<usize>,
}

impl ParentLink {
    /// The parent record, if it is still alive
    pub fn record(&self) -> Option<RecordHandle> {
        self.record.upgrade().map(RecordHandle)
    }

    /// Attribute key of the parent slot
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Position in the parent's list; `None` unless the child is a list element
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

/// Everything needed to construct an embedded record
#[derive(Debug)]
pub struct EmbeddedInit<'a> {
    pub id: Option<String>,
    pub model_name: Option<String>,
    pub parent: &'a RecordHandle,
    pub parent_key: String,
    pub parent_index: Option<usize>,
    pub attributes: Document,
}

/// A schema-driven record
///
/// Raw attributes are kept as delivered; resolved values are materialized on
/// first access and cached per key. Embedded records are records with a
/// [`ParentLink`].
pub struct Record {
    id: Option<String>,
    model_name: Option<String>,
    parent: Option<ParentLink>,
    attributes: RefCell<Document>,
    resolved: RefCell<HashMap<String, ResolvedValue>>,
    guard: DependencyGuard,
    destroyed: Cell<bool>,
}

impl Record {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn is_embedded(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Raw value of one attribute
    pub fn raw_attr(&self, key: &str) -> Option<RawValue> {
        self.attributes.borrow().get(key).cloned()
    }

    /// Snapshot of all raw attributes
    pub fn attributes(&self) -> Document {
        self.attributes.borrow().clone()
    }

    /// Cached resolution of `key`, if it has been resolved
    pub fn cached(&self, key: &str) -> Option<ResolvedValue> {
        self.resolved.borrow().get(key).cloned()
    }

    pub fn dependency_guard(&self) -> &DependencyGuard {
        &self.guard
    }

    /// Merge raw attributes, invalidating cached resolutions of the touched keys
    pub fn push_attributes(&self, attributes: Document) {
        let mut resolved = self.resolved.borrow_mut();
        let mut raw = self.attributes.borrow_mut();
        for (key, value) in attributes {
            resolved.remove(&key);
            raw.insert(key, value);
        }
    }

    pub fn set_raw_attr(&self, key: impl Into<String>, value: RawValue) {
        let mut doc = Document::new();
        doc.insert(key.into(), value);
        self.push_attributes(doc);
    }

    /// Human-readable identity used in errors and logs
    pub fn describe(&self) -> String {
        let model = self.model_name.as_deref().unwrap_or("<untyped>");
        match (&self.id, &self.parent) {
            (Some(id), _) => format!("{}:{}", model, id),
            (None, Some(link)) => match link.index {
                Some(index) => format!("{} at {}[{}]", model, link.key, index),
                None => format!("{} at {}", model, link.key),
            },
            (None, None) => model.to_string(),
        }
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("model_name", &self.model_name)
            .field("parent_key", &self.parent.as_ref().map(|p| p.key.as_str()))
            .field("parent_index", &self.parent.as_ref().and_then(|p| p.index))
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

/// Shared handle to a [`Record`]; equality is instance identity
#[derive(Clone)]
pub struct RecordHandle(Rc<Record>);

impl RecordHandle {
    /// Create a top-level record
    pub fn new(model_name: impl Into<String>, id: impl Into<String>, attributes: Document) -> Self {
        Self::from_record(Record {
            id: Some(id.into()),
            model_name: Some(model_name.into()),
            parent: None,
            attributes: RefCell::new(attributes),
            resolved: RefCell::new(HashMap::new()),
            guard: DependencyGuard::new(),
            destroyed: Cell::new(false),
        })
    }

    /// Create an embedded record linked to its parent slot
    pub fn new_embedded(init: EmbeddedInit<'_>) -> Self {
        Self::from_record(Record {
            id: init.id,
            model_name: init.model_name,
            parent: Some(ParentLink {
                record: Rc::downgrade(&init.parent.0),
                key: init.parent_key,
                index: init.parent_index,
            }),
            attributes: RefCell::new(init.attributes),
            resolved: RefCell::new(HashMap::new()),
            guard: DependencyGuard::new(),
            destroyed: Cell::new(false),
        })
    }

    fn from_record(record: Record) -> Self {
        Self(Rc::new(record))
    }

    pub fn ptr_eq(a: &RecordHandle, b: &RecordHandle) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<Record> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(weak: &Weak<Record>) -> Option<RecordHandle> {
        weak.upgrade().map(RecordHandle)
    }

    /// Outermost record reachable through parent links
    pub fn top_record(&self) -> RecordHandle {
        let mut current = self.clone();
        while let Some(parent) = current.parent().and_then(ParentLink::record) {
            current = parent;
        }
        current
    }

    /// Resolve one attribute, caching the result.
    ///
    /// Missing attributes resolve to a null scalar without consulting the
    /// schema. A cached value is returned as-is until the raw slot is
    /// replaced through [`Record::push_attributes`].
    ///
    /// # Errors
    ///
    /// - `RecordDestroyed` if the record was destroyed
    /// - `CyclicDependency` if the schema re-enters `key` while classifying it
    /// - `SchemaContractViolation` for malformed descriptors
    /// - any error returned by the schema callbacks
    pub fn get_attr(
        &self,
        key: &str,
        store: &dyn RecordStore,
        schema: &dyn Schema,
    ) -> Result<ResolvedValue> {
        if self.is_destroyed() {
            return Err(MegarecError::RecordDestroyed {
                record: self.describe(),
            });
        }
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        let Some(raw) = self.raw_attr(key) else {
            return Ok(ResolvedValue::Scalar(RawValue::Null));
        };

        log_op_start!("get_attr", key = key, record = %self.describe());
        let start = std::time::Instant::now();

        let value = resolve_value(key, &raw, self.model_name(), store, schema, self, None)
            .map_err(|e| {
                log_op_error!(
                    "get_attr",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    key = key
                );
                e
            })?;

        // A dependent read inside the schema callback may already have cached
        // this key; keep the first value so the slot's kind never changes.
        let value = self
            .resolved
            .borrow_mut()
            .entry(key.to_string())
            .or_insert(value)
            .clone();

        log_op_end!(
            "get_attr",
            duration_ms = start.elapsed().as_millis() as u64,
            key = key,
            resolved_kind = ?value.kind()
        );

        Ok(value)
    }

    /// Destroy this record and every embedded record it owns.
    ///
    /// Idempotent. Records referenced from this one are not affected. The
    /// record stays in any store holding it; stores treat destroyed records
    /// as absent. Use [`MemoryStore::unload_record`] to also drop the entry.
    ///
    /// [`MemoryStore::unload_record`]: crate::ops::store::MemoryStore::unload_record
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let resolved = std::mem::take(&mut *self.resolved.borrow_mut());
        for value in resolved.into_values() {
            value.destroy_embedded();
        }
        tracing::debug!(record = %self.describe(), "record destroyed");
    }
}

impl Deref for RecordHandle {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.0
    }
}

impl PartialEq for RecordHandle {
    fn eq(&self, other: &Self) -> bool {
        RecordHandle::ptr_eq(self, other)
    }
}

impl Eq for RecordHandle {}

impl std::fmt::Debug for RecordHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecordHandle({})", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: RawValue) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_top_level_record() {
        let record = RecordHandle::new("post", "1", doc(json!({"title": "Hi"})));
        assert_eq!(record.id(), Some("1"));
        assert_eq!(record.model_name(), Some("post"));
        assert!(!record.is_embedded());
        assert_eq!(record.raw_attr("title"), Some(json!("Hi")));
        assert_eq!(record.describe(), "post:1");
    }

    #[test]
    fn test_embedded_parent_link_is_weak() {
        let parent = RecordHandle::new("post", "1", Document::new());
        let child = RecordHandle::new_embedded(EmbeddedInit {
            id: None,
            model_name: Some("comment".to_string()),
            parent: &parent,
            parent_key: "comments".to_string(),
            parent_index: Some(2),
            attributes: Document::new(),
        });

        let link = child.parent().unwrap();
        assert_eq!(link.key(), "comments");
        assert_eq!(link.index(), Some(2));
        assert_eq!(link.record(), Some(parent.clone()));
        assert_eq!(child.describe(), "comment at comments[2]");
        assert_eq!(child.top_record(), parent);

        drop(parent);
        assert!(child.parent().unwrap().record().is_none());
    }

    #[test]
    fn test_handle_equality_is_identity() {
        let a = RecordHandle::new("post", "1", Document::new());
        let b = RecordHandle::new("post", "1", Document::new());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_push_attributes_merges() {
        let record = RecordHandle::new("post", "1", doc(json!({"a": 1, "b": 2})));
        record.push_attributes(doc(json!({"b": 3, "c": 4})));
        assert_eq!(record.attributes(), doc(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let record = RecordHandle::new("post", "1", Document::new());
        record.destroy();
        record.destroy();
        assert!(record.is_destroyed());
    }
}
