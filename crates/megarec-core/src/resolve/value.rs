use crate::errors::Result;
use crate::model::record::RecordHandle;
use crate::model::value::{RawValue, ResolvedValue};
use crate::ops::store::RecordStore;
use crate::resolve::list::resolve_list;
use crate::resolve::nested::{build_embedded_record, compute_nested_model};
use crate::resolve::reference::{compute_attribute_reference, resolve_reference};
use crate::schema::{ResolutionContext, Schema};

/// Classify one raw value and materialize it.
///
/// Precedence: a reported reference wins, then a raw list is resolved
/// element-wise, then a reported embedded document, then the raw value is
/// passed through. `index` is the position within an enclosing list and is
/// only set while resolving list elements.
///
/// # Errors
///
/// - `CyclicDependency` if a schema callback re-enters the key it is
///   classifying on `record`
/// - `SchemaContractViolation` for a reference without an id
/// - any error returned by the schema callbacks, unchanged
pub fn resolve_value(
    key: &str,
    raw: &RawValue,
    model_name: Option<&str>,
    store: &dyn RecordStore,
    schema: &dyn Schema,
    record: &RecordHandle,
    index: Option<usize>,
) -> Result<ResolvedValue> {
    let ctx = ResolutionContext::new(record, store, schema);

    if let Some(reference) = compute_attribute_reference(key, raw, model_name, &ctx, schema)? {
        tracing::debug!(key, ?index, many = reference.is_many(), "resolved as reference");
        return resolve_reference(store, record, key, raw, reference);
    }

    if let RawValue::Array(items) = raw {
        let array = resolve_list(key, Some(items.as_slice()), model_name, store, schema, record)?;
        return Ok(ResolvedValue::TrackedArray(array));
    }

    if let Some(descriptor) = compute_nested_model(key, raw, model_name, &ctx, schema)? {
        let child = build_embedded_record(store, record, key, index, descriptor);
        return Ok(ResolvedValue::Embedded(child));
    }

    Ok(ResolvedValue::Scalar(raw.clone()))
}
