use crate::collections::{ReferenceArray, TrackedArray};
use crate::model::record::RecordHandle;

/// Raw attribute value as delivered by the data source
pub type RawValue = serde_json::Value;

/// Attribute payload of a record or embedded document
pub type Document = serde_json::Map<String, RawValue>;

/// The five shapes a raw slot can resolve to, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
    Scalar,
    Record,
    RecordArray,
    Embedded,
    TrackedArray,
}

/// A materialized attribute value
///
/// Produced by a single classification step; consumers match on it
/// exhaustively instead of probing the raw value.
#[derive(Debug, Clone)]
pub enum ResolvedValue {
    /// The raw value, unchanged
    Scalar(RawValue),
    /// A single reference; `None` when the referenced record is not loaded
    Record(Option<RecordHandle>),
    /// A live collection of references, one slot per descriptor
    RecordArray(ReferenceArray),
    /// An embedded child record owned by the resolving record
    Embedded(RecordHandle),
    /// A live collection of independently resolved list elements
    TrackedArray(TrackedArray),
}

impl ResolvedValue {
    pub fn kind(&self) -> ResolvedKind {
        match self {
            ResolvedValue::Scalar(_) => ResolvedKind::Scalar,
            ResolvedValue::Record(_) => ResolvedKind::Record,
            ResolvedValue::RecordArray(_) => ResolvedKind::RecordArray,
            ResolvedValue::Embedded(_) => ResolvedKind::Embedded,
            ResolvedValue::TrackedArray(_) => ResolvedKind::TrackedArray,
        }
    }

    pub fn as_scalar(&self) -> Option<&RawValue> {
        match self {
            ResolvedValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// The referenced record, if this is a resolved single reference
    pub fn as_record(&self) -> Option<&RecordHandle> {
        match self {
            ResolvedValue::Record(record) => record.as_ref(),
            _ => None,
        }
    }

    pub fn as_record_array(&self) -> Option<&ReferenceArray> {
        match self {
            ResolvedValue::RecordArray(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&RecordHandle> {
        match self {
            ResolvedValue::Embedded(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_tracked_array(&self) -> Option<&TrackedArray> {
        match self {
            ResolvedValue::TrackedArray(array) => Some(array),
            _ => None,
        }
    }

    /// A single reference whose target is not (yet) in the store
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, ResolvedValue::Record(None))
    }

    /// Destroy embedded children reachable from this value.
    ///
    /// Referenced records are left alone: they belong to the store.
    pub(crate) fn destroy_embedded(&self) {
        match self {
            ResolvedValue::Embedded(child) => child.destroy(),
            ResolvedValue::TrackedArray(array) => {
                for element in array.content() {
                    element.destroy_embedded();
                }
            }
            ResolvedValue::Scalar(_)
            | ResolvedValue::Record(_)
            | ResolvedValue::RecordArray(_) => {}
        }
    }
}
