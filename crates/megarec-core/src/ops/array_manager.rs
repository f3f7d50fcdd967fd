use std::cell::RefCell;
use std::rc::Weak;

use crate::collections::reference_array::{ReferenceArray, ReferenceArrayState};
use crate::ops::store::RecordStore;

/// Registry of live reference arrays
///
/// Arrays are held weakly: an array dropped by its owner and every consumer
/// disappears from the registry on the next sweep. Registration never
/// refreshes anything by itself; unresolved slots heal only when the store
/// owner calls [`RecordArrayManager::refresh_all`].
#[derive(Debug, Default)]
pub struct RecordArrayManager {
    arrays: RefCell<Vec<Weak<RefCell<ReferenceArrayState>>>>,
}

impl RecordArrayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an array, dropping registrations whose array is gone
    pub fn register(&self, array: &ReferenceArray) {
        let mut arrays = self.arrays.borrow_mut();
        arrays.retain(|weak| weak.strong_count() > 0);
        arrays.push(array.downgrade());
    }

    /// Number of registrations held, dead ones included
    pub fn registration_count(&self) -> usize {
        self.arrays.borrow().len()
    }

    /// Arrays that are still alive, pruning dead registrations
    pub fn live_arrays(&self) -> Vec<ReferenceArray> {
        let mut arrays = self.arrays.borrow_mut();
        arrays.retain(|weak| weak.strong_count() > 0);
        arrays
            .iter()
            .filter_map(Weak::upgrade)
            .map(ReferenceArray::from_inner)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.live_arrays().len()
    }

    /// Re-run identity lookup for every live array.
    ///
    /// Returns the total number of slots that went from unresolved to
    /// resolved.
    pub fn refresh_all(&self, store: &dyn RecordStore) -> usize {
        let healed: usize = self
            .live_arrays()
            .iter()
            .map(|array| array.refresh(store))
            .sum();
        tracing::debug!(healed, "reference arrays refreshed");
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::RecordRef;
    use crate::model::record::RecordHandle;
    use crate::model::value::Document;
    use crate::ops::store::{GlobalIdentityCache, MemoryStore};

    #[test]
    fn test_register_prunes_dropped_arrays() {
        let manager = RecordArrayManager::new();
        let owner = RecordHandle::new("team", "t", Document::new());

        for _ in 0..1_000 {
            let array = ReferenceArray::new("members", &owner, Vec::new());
            manager.register(&array);
        }

        assert_eq!(manager.registration_count(), 1);
        assert_eq!(manager.live_count(), 0);
        assert_eq!(manager.registration_count(), 0);
    }

    #[test]
    fn test_register_keeps_live_arrays() {
        let manager = RecordArrayManager::new();
        let owner = RecordHandle::new("team", "t", Document::new());
        let kept = ReferenceArray::new("members", &owner, Vec::new());
        manager.register(&kept);

        for _ in 0..10 {
            manager.register(&ReferenceArray::new("members", &owner, Vec::new()));
        }

        assert_eq!(manager.registration_count(), 2);
        assert_eq!(manager.live_count(), 1);
        assert!(ReferenceArray::ptr_eq(&manager.live_arrays()[0], &kept));
    }

    #[test]
    fn test_refresh_all_sums_healed_slots() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        let owner = store.push_record("team", "t", Document::new());
        let first = ReferenceArray::new("members", &owner, vec![RecordRef::new("person", "a")]);
        let second = ReferenceArray::new(
            "leads",
            &owner,
            vec![RecordRef::new("person", "a"), RecordRef::new("person", "b")],
        );
        store.record_array_manager().register(&first);
        store.record_array_manager().register(&second);

        store.push_record("person", "a", Document::new());
        store.push_record("person", "b", Document::new());

        assert_eq!(store.record_array_manager().refresh_all(&store), 3);
        assert_eq!(second.resolved_count(), 2);
    }
}
