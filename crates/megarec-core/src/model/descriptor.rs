//! Descriptors reported by a schema while classifying a raw value.

use serde::{Deserialize, Serialize};

use crate::errors::{MegarecError, Result};
use crate::model::value::{Document, RawValue};

/// Pointer at another record by type and id, or by id alone
///
/// A `model_name` of `None` addresses the global id-space shared by all
/// record types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    #[serde(rename = "type", default)]
    pub model_name: Option<String>,
    pub id: String,
}

impl RecordRef {
    pub fn new(model_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model_name: Some(model_name.into()),
            id: id.into(),
        }
    }

    /// A reference into the global id-space
    pub fn global(id: impl Into<String>) -> Self {
        Self {
            model_name: None,
            id: id.into(),
        }
    }

    /// The model name, treating an empty name as absent
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Read a reference out of a raw `{ "type": .., "id": .. }` document.
    ///
    /// Numeric ids are accepted and stringified.
    ///
    /// # Errors
    ///
    /// Returns `SchemaContractViolation` if the value is not a document, the
    /// id is missing or empty, or the type is neither a string nor null.
    pub fn from_raw(key: &str, value: &RawValue) -> Result<Self> {
        let doc = value
            .as_object()
            .ok_or_else(|| violation(key, "reference must be a document"))?;

        let id = match doc.get("id") {
            Some(RawValue::String(id)) if !id.is_empty() => id.clone(),
            Some(RawValue::Number(n)) => n.to_string(),
            _ => return Err(violation(key, "reference is missing an id")),
        };

        let model_name = match doc.get("type") {
            None | Some(RawValue::Null) => None,
            Some(RawValue::String(name)) => Some(name.clone()),
            Some(_) => return Err(violation(key, "reference type must be a string")),
        };

        Ok(Self { model_name, id })
    }

    pub(crate) fn validate(&self, key: &str) -> Result<()> {
        if self.id.is_empty() {
            return Err(violation(key, "reference is missing an id"));
        }
        Ok(())
    }
}

/// A schema's verdict that a raw value is a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    One(RecordRef),
    Many(Vec<RecordRef>),
}

impl Reference {
    /// Read a single reference document or a list of them.
    ///
    /// # Errors
    ///
    /// Returns `SchemaContractViolation` if any element is malformed.
    pub fn from_raw(key: &str, value: &RawValue) -> Result<Self> {
        match value {
            RawValue::Array(items) => items
                .iter()
                .map(|item| RecordRef::from_raw(key, item))
                .collect::<Result<Vec<_>>>()
                .map(Reference::Many),
            other => RecordRef::from_raw(key, other).map(Reference::One),
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Reference::Many(_))
    }

    /// All descriptors in order
    pub fn refs(&self) -> &[RecordRef] {
        match self {
            Reference::One(record_ref) => std::slice::from_ref(record_ref),
            Reference::Many(refs) => refs,
        }
    }

    pub(crate) fn validate(&self, key: &str) -> Result<()> {
        self.refs().iter().try_for_each(|r| r.validate(key))
    }
}

impl From<RecordRef> for Reference {
    fn from(record_ref: RecordRef) -> Self {
        Reference::One(record_ref)
    }
}

impl From<Vec<RecordRef>> for Reference {
    fn from(refs: Vec<RecordRef>) -> Self {
        Reference::Many(refs)
    }
}

/// A schema's verdict that a raw value is an embedded document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NestedDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub attributes: Document,
}

impl NestedDescriptor {
    pub fn new(model_name: Option<String>, attributes: Document) -> Self {
        Self {
            id: None,
            model_name,
            attributes,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The model name, treating an empty name as absent
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Describe a raw document as an embedded record of itself.
    ///
    /// `id` and `type` are read from the document when they are strings
    /// (numeric ids are stringified); the whole document becomes the child's
    /// attribute snapshot.
    pub fn from_document(doc: &Document) -> Self {
        let id = match doc.get("id") {
            Some(RawValue::String(id)) => Some(id.clone()),
            Some(RawValue::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let model_name = doc.get("type").and_then(RawValue::as_str).map(str::to_string);

        Self {
            id,
            model_name,
            attributes: doc.clone(),
        }
    }
}

fn violation(key: &str, reason: &str) -> MegarecError {
    MegarecError::SchemaContractViolation {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
