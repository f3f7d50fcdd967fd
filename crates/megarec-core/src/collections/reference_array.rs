use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::errors::{MegarecError, Result};
use crate::model::descriptor::RecordRef;
use crate::model::record::{Record, RecordHandle};
use crate::ops::store::RecordStore;
use crate::resolve::identity;

#[derive(Debug)]
pub(crate) struct ReferenceArrayState {
    key: String,
    owner: Weak<Record>,
    references: Vec<RecordRef>,
    records: Vec<Option<RecordHandle>>,
}

/// Live collection of references
///
/// Holds one slot per descriptor, in descriptor order. A slot is `None` when
/// the referenced record was not in the store at lookup time; the slot keeps
/// its position so consumers can rely on positional semantics.
#[derive(Clone)]
pub struct ReferenceArray {
    inner: Rc<RefCell<ReferenceArrayState>>,
}

impl ReferenceArray {
    /// Create an array bound to `owner`'s `key` slot with every slot unresolved
    pub(crate) fn new(key: &str, owner: &RecordHandle, references: Vec<RecordRef>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ReferenceArrayState {
                key: key.to_string(),
                owner: owner.downgrade(),
                records: vec![None; references.len()],
                references,
            })),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<ReferenceArrayState>>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ReferenceArrayState>> {
        Rc::downgrade(&self.inner)
    }

    /// Replace the resolved slots; `records` must align with the descriptors
    pub(crate) fn set_records(&self, records: Vec<Option<RecordHandle>>) {
        let mut state = self.inner.borrow_mut();
        debug_assert_eq!(state.references.len(), records.len());
        state.records = records;
    }

    pub fn ptr_eq(a: &ReferenceArray, b: &ReferenceArray) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn key(&self) -> String {
        self.inner.borrow().key.clone()
    }

    /// The record whose attribute produced this array, if still alive
    pub fn owner(&self) -> Option<RecordHandle> {
        RecordHandle::upgrade(&self.inner.borrow().owner)
    }

    pub fn references(&self) -> Vec<RecordRef> {
        self.inner.borrow().references.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved record at `index`; `None` for an unresolved slot or out of range
    pub fn get(&self, index: usize) -> Option<RecordHandle> {
        self.inner.borrow().records.get(index).cloned().flatten()
    }

    /// All slots, unresolved ones included
    pub fn records(&self) -> Vec<Option<RecordHandle>> {
        self.inner.borrow().records.clone()
    }

    /// Number of slots that hold a record
    pub fn resolved_count(&self) -> usize {
        self.inner
            .borrow()
            .records
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Append a record, deriving its descriptor from the record's identity
    ///
    /// # Errors
    ///
    /// Returns `SchemaContractViolation` if the record has no id.
    pub fn push(&self, record: &RecordHandle) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        let Some(id) = record.id() else {
            return Err(MegarecError::SchemaContractViolation {
                key: state.key.clone(),
                reason: format!("cannot reference {} without an id", record.describe()),
            });
        };
        let reference = RecordRef {
            model_name: record.model_name().map(str::to_string),
            id: id.to_string(),
        };
        state.references.push(reference);
        state.records.push(Some(record.clone()));
        Ok(())
    }

    /// Remove the slot at `index`, returning its descriptor
    pub fn remove(&self, index: usize) -> Option<RecordRef> {
        let mut state = self.inner.borrow_mut();
        if index >= state.references.len() {
            return None;
        }
        state.records.remove(index);
        Some(state.references.remove(index))
    }

    /// Re-run identity lookup for unresolved slots.
    ///
    /// Slots that already hold a record keep it, including records added
    /// with [`ReferenceArray::push`]. Returns how many slots now resolve.
    pub fn refresh(&self, store: &dyn RecordStore) -> usize {
        let pending: Vec<(usize, RecordRef)> = {
            let state = self.inner.borrow();
            state
                .records
                .iter()
                .zip(state.references.iter())
                .enumerate()
                .filter(|(_, (slot, _))| slot.is_none())
                .map(|(index, (_, reference))| (index, reference.clone()))
                .collect()
        };
        if pending.is_empty() {
            return 0;
        }

        let found: Vec<(usize, RecordHandle)> = pending
            .iter()
            .filter_map(|(index, reference)| {
                identity::lookup(store, reference).map(|record| (*index, record))
            })
            .collect();

        let mut state = self.inner.borrow_mut();
        let mut healed = 0;
        for (index, record) in found {
            if let Some(slot @ None) = state.records.get_mut(index) {
                *slot = Some(record);
                healed += 1;
            }
        }
        healed
    }
}

impl std::fmt::Debug for ReferenceArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("ReferenceArray")
            .field("key", &state.key)
            .field("references", &state.references)
            .field("records", &state.records)
            .finish()
    }
}
