use crate::collections::ReferenceArray;
use crate::errors::Result;
use crate::model::descriptor::{RecordRef, Reference};
use crate::model::record::RecordHandle;
use crate::model::value::{RawValue, ResolvedValue};
use crate::ops::store::RecordStore;
use crate::resolve::guard::with_guard;
use crate::resolve::identity;
use crate::schema::{ResolutionContext, Schema};

/// Ask the schema whether `value` is a reference, with `key` guarded
///
/// # Errors
///
/// Returns `CyclicDependency` on re-entry, or whatever the schema reports.
pub fn compute_attribute_reference(
    key: &str,
    value: &RawValue,
    model_name: Option<&str>,
    ctx: &ResolutionContext<'_>,
    schema: &dyn Schema,
) -> Result<Option<Reference>> {
    with_guard(ctx.record(), key, || {
        schema.compute_attribute_reference(key, value, model_name, ctx)
    })
}

/// Turn a reported reference into a resolved value.
///
/// A list-shaped raw value or a `Many` descriptor yields a reference array;
/// anything else yields a single, possibly unresolved, record.
///
/// # Errors
///
/// Returns `SchemaContractViolation` if any descriptor lacks an id.
pub fn resolve_reference(
    store: &dyn RecordStore,
    record: &RecordHandle,
    key: &str,
    raw: &RawValue,
    reference: Reference,
) -> Result<ResolvedValue> {
    reference.validate(key)?;

    if raw.is_array() || reference.is_many() {
        let refs = match reference {
            Reference::One(r) => vec![r],
            Reference::Many(refs) => refs,
        };
        let array = resolve_record_array(store, record, key, refs);
        return Ok(ResolvedValue::RecordArray(array));
    }

    let found = reference.refs().first().and_then(|r| identity::lookup(store, r));
    Ok(ResolvedValue::Record(found))
}

/// Build a reference array bound to `record`'s `key` and register it
pub fn resolve_record_array(
    store: &dyn RecordStore,
    record: &RecordHandle,
    key: &str,
    references: Vec<RecordRef>,
) -> ReferenceArray {
    let records = identity::lookup_all(store, &references);
    let array = ReferenceArray::new(key, record, references);
    array.set_records(records);
    store.record_array_manager().register(&array);
    tracing::debug!(
        key,
        slots = array.len(),
        resolved = array.resolved_count(),
        "reference array built"
    );
    array
}
