use std::cell::Cell;
use std::rc::Rc;

use megarec_core::{
    Document, FnSchema, GlobalIdentityCache, MemoryStore, NestedDescriptor, RawValue, Reference,
};

/// Build a document from a JSON object literal
#[allow(dead_code)]
pub fn doc(value: RawValue) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

/// Create an empty store with its own global cache
#[allow(dead_code)]
pub fn new_store() -> MemoryStore {
    MemoryStore::new(GlobalIdentityCache::new())
}

/// Schema used by most tests
///
/// Attributes named in `reference_keys` hold `{type, id}` documents (or
/// lists of them). Any other document carrying a `type` field is an
/// embedded record.
#[allow(dead_code)]
pub fn convention_schema(reference_keys: &[&str]) -> FnSchema {
    let reference_keys: Vec<String> = reference_keys.iter().map(|k| k.to_string()).collect();
    FnSchema::builder()
        .compute_attribute_reference(move |key, value, _, _| {
            if reference_keys.iter().any(|k| k == key) {
                Reference::from_raw(key, value).map(Some)
            } else {
                Ok(None)
            }
        })
        .compute_nested_model(|_, value, _, _| Ok(nested_from_typed_document(value)))
        .build()
        .expect("both callbacks are set")
}

/// Convention schema that also counts callback invocations
#[allow(dead_code)]
pub fn counting_schema(reference_keys: &[&str]) -> (FnSchema, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let reference_calls = calls.clone();
    let nested_calls = calls.clone();
    let reference_keys: Vec<String> = reference_keys.iter().map(|k| k.to_string()).collect();

    let schema = FnSchema::builder()
        .compute_attribute_reference(move |key, value, _, _| {
            reference_calls.set(reference_calls.get() + 1);
            if reference_keys.iter().any(|k| k == key) {
                Reference::from_raw(key, value).map(Some)
            } else {
                Ok(None)
            }
        })
        .compute_nested_model(move |_, value, _, _| {
            nested_calls.set(nested_calls.get() + 1);
            Ok(nested_from_typed_document(value))
        })
        .build()
        .expect("both callbacks are set");
    (schema, calls)
}

fn nested_from_typed_document(value: &RawValue) -> Option<NestedDescriptor> {
    let doc = value.as_object()?;
    doc.get("type")?;
    Some(NestedDescriptor::from_document(doc))
}
