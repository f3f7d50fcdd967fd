use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::model::record::{Record, RecordHandle};
use crate::model::value::{RawValue, ResolvedValue};

struct TrackedArrayState {
    key: String,
    raw: Vec<RawValue>,
    model_name: Option<String>,
    owner: Weak<Record>,
    content: Vec<ResolvedValue>,
}

/// Live collection of independently resolved list elements
///
/// Keeps the raw list it was resolved from next to the resolved content, so
/// a caller can diff the two when the backing raw list changes.
#[derive(Clone)]
pub struct TrackedArray {
    inner: Rc<RefCell<TrackedArrayState>>,
}

impl TrackedArray {
    pub(crate) fn new(
        key: &str,
        raw: Vec<RawValue>,
        model_name: Option<&str>,
        owner: &RecordHandle,
        content: Vec<ResolvedValue>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TrackedArrayState {
                key: key.to_string(),
                raw,
                model_name: model_name.map(str::to_string),
                owner: owner.downgrade(),
                content,
            })),
        }
    }

    pub fn ptr_eq(a: &TrackedArray, b: &TrackedArray) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn key(&self) -> String {
        self.inner.borrow().key.clone()
    }

    /// The raw list this array was resolved from
    pub fn raw_value(&self) -> Vec<RawValue> {
        self.inner.borrow().raw.clone()
    }

    /// Model name of the owning record at resolution time
    pub fn model_name(&self) -> Option<String> {
        self.inner.borrow().model_name.clone()
    }

    pub fn owner(&self) -> Option<RecordHandle> {
        RecordHandle::upgrade(&self.inner.borrow().owner)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<ResolvedValue> {
        self.inner.borrow().content.get(index).cloned()
    }

    pub fn content(&self) -> Vec<ResolvedValue> {
        self.inner.borrow().content.clone()
    }

    pub fn push(&self, value: ResolvedValue) {
        self.inner.borrow_mut().content.push(value);
    }

    /// Insert at `index`, clamped to the current length
    pub fn insert(&self, index: usize, value: ResolvedValue) {
        let mut state = self.inner.borrow_mut();
        let index = index.min(state.content.len());
        state.content.insert(index, value);
    }

    pub fn remove(&self, index: usize) -> Option<ResolvedValue> {
        let mut state = self.inner.borrow_mut();
        if index >= state.content.len() {
            return None;
        }
        Some(state.content.remove(index))
    }

    /// Swap in new content and the raw list it corresponds to
    pub fn replace_content(&self, raw: Vec<RawValue>, content: Vec<ResolvedValue>) {
        let mut state = self.inner.borrow_mut();
        state.raw = raw;
        state.content = content;
    }
}

impl std::fmt::Debug for TrackedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("TrackedArray")
            .field("key", &state.key)
            .field("model_name", &state.model_name)
            .field("content", &state.content)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::Document;
    use serde_json::json;

    fn scalar(v: RawValue) -> ResolvedValue {
        ResolvedValue::Scalar(v)
    }

    #[test]
    fn test_mutations() {
        let owner = RecordHandle::new("post", "1", Document::new());
        let array = TrackedArray::new(
            "tags",
            vec![json!("a"), json!("b")],
            Some("post"),
            &owner,
            vec![scalar(json!("a")), scalar(json!("b"))],
        );

        array.push(scalar(json!("d")));
        array.insert(2, scalar(json!("c")));
        array.insert(99, scalar(json!("e")));

        let values: Vec<_> = array
            .content()
            .iter()
            .map(|v| v.as_scalar().cloned().unwrap())
            .collect();
        assert_eq!(values, vec![json!("a"), json!("b"), json!("c"), json!("d"), json!("e")]);

        assert!(array.remove(0).is_some());
        assert!(array.remove(10).is_none());
        assert_eq!(array.len(), 4);
        assert_eq!(array.raw_value(), vec![json!("a"), json!("b")]);
        assert_eq!(array.model_name().as_deref(), Some("post"));
        assert_eq!(array.owner(), Some(owner));
    }

    #[test]
    fn test_replace_content() {
        let owner = RecordHandle::new("post", "1", Document::new());
        let array = TrackedArray::new("tags", Vec::new(), None, &owner, Vec::new());
        assert!(array.is_empty());

        array.replace_content(vec![json!(1)], vec![scalar(json!(1))]);
        assert_eq!(array.len(), 1);
        assert_eq!(array.raw_value(), vec![json!(1)]);
    }
}
