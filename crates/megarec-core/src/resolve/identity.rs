use crate::model::descriptor::RecordRef;
use crate::model::record::RecordHandle;
use crate::ops::store::RecordStore;

/// Find the record a descriptor points at.
///
/// An absent or empty type addresses the global id-space; otherwise the
/// type is normalized by the store before the scoped lookup. A miss is
/// `None`, never an error.
pub fn lookup(store: &dyn RecordStore, reference: &RecordRef) -> Option<RecordHandle> {
    let found = match reference.model_name() {
        None => store.lookup_global_by_id(&reference.id),
        Some(model_name) => {
            let model_name = store.normalize_model_name(model_name);
            store.lookup_by_type_and_id(&model_name, &reference.id)
        }
    };
    if found.is_none() {
        tracing::debug!(
            model_name = ?reference.model_name(),
            id = %reference.id,
            "identity lookup miss"
        );
    }
    found
}

/// Look up every descriptor, keeping positions
pub fn lookup_all(store: &dyn RecordStore, references: &[RecordRef]) -> Vec<Option<RecordHandle>> {
    references.iter().map(|r| lookup(store, r)).collect()
}
