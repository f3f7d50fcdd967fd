use crate::collections::TrackedArray;
use crate::errors::Result;
use crate::model::record::RecordHandle;
use crate::model::value::RawValue;
use crate::ops::store::RecordStore;
use crate::resolve::value::resolve_value;
use crate::schema::Schema;

/// Resolve every element of a raw list independently.
///
/// Element `i` is resolved with parent index `Some(i)`; results keep input
/// order. An absent list resolves to an empty collection.
///
/// # Errors
///
/// Stops at the first element that fails and returns its error.
pub fn resolve_list(
    key: &str,
    raw_list: Option<&[RawValue]>,
    model_name: Option<&str>,
    store: &dyn RecordStore,
    schema: &dyn Schema,
    record: &RecordHandle,
) -> Result<TrackedArray> {
    let raw_list = raw_list.unwrap_or_default();
    let content = raw_list
        .iter()
        .enumerate()
        .map(|(index, element)| {
            resolve_value(key, element, model_name, store, schema, record, Some(index))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(key, elements = content.len(), "list resolved");
    Ok(TrackedArray::new(
        key,
        raw_list.to_vec(),
        model_name,
        record,
        content,
    ))
}
