use crate::errors::Result;
use crate::model::descriptor::NestedDescriptor;
use crate::model::record::{EmbeddedInit, RecordHandle};
use crate::model::value::RawValue;
use crate::ops::store::RecordStore;
use crate::resolve::guard::with_guard;
use crate::schema::{ResolutionContext, Schema};

/// Ask the schema whether `value` is an embedded document, with `key` guarded
///
/// # Errors
///
/// Returns `CyclicDependency` on re-entry, or whatever the schema reports.
pub fn compute_nested_model(
    key: &str,
    value: &RawValue,
    model_name: Option<&str>,
    ctx: &ResolutionContext<'_>,
    schema: &dyn Schema,
) -> Result<Option<NestedDescriptor>> {
    with_guard(ctx.record(), key, || {
        schema.compute_nested_model(key, value, model_name, ctx)
    })
}

/// Construct the embedded child described by `descriptor`.
///
/// The child's own attributes stay raw until they are read.
pub fn build_embedded_record(
    store: &dyn RecordStore,
    record: &RecordHandle,
    key: &str,
    index: Option<usize>,
    descriptor: NestedDescriptor,
) -> RecordHandle {
    let model_name = descriptor
        .model_name()
        .map(|name| store.normalize_model_name(name));
    let child = RecordHandle::new_embedded(EmbeddedInit {
        id: descriptor.id,
        model_name,
        parent: record,
        parent_key: key.to_string(),
        parent_index: index,
        attributes: descriptor.attributes,
    });
    tracing::debug!(key, ?index, child = %child.describe(), "embedded record built");
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::store::{GlobalIdentityCache, MemoryStore};
    use serde_json::json;

    #[test]
    fn test_child_is_linked_and_normalized() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        let parent = store.push_record("book", "1", Default::default());
        let attributes = json!({"title": "One"}).as_object().cloned().unwrap();

        let child = build_embedded_record(
            &store,
            &parent,
            "chapters",
            Some(0),
            NestedDescriptor::new(Some("BookChapter".to_string()), attributes).with_id("c1"),
        );

        assert_eq!(child.model_name(), Some("book-chapter"));
        assert_eq!(child.id(), Some("c1"));
        assert_eq!(child.raw_attr("title"), Some(json!("One")));
        let link = child.parent().unwrap();
        assert_eq!(link.record(), Some(parent));
        assert_eq!(link.key(), "chapters");
        assert_eq!(link.index(), Some(0));
    }

    #[test]
    fn test_untyped_child() {
        let store = MemoryStore::new(GlobalIdentityCache::new());
        let parent = store.push_record("book", "1", Default::default());
        let child = build_embedded_record(
            &store,
            &parent,
            "meta",
            None,
            NestedDescriptor::new(Some(String::new()), Default::default()),
        );

        assert_eq!(child.model_name(), None);
        assert_eq!(child.parent().unwrap().index(), None);
    }
}
