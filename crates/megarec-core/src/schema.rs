//! Schema capability
//!
//! A schema decides, per attribute, whether a raw value is a reference, an
//! embedded document, or a plain value. The resolver invokes exactly two
//! operations and both are required: an implementation that cannot classify
//! one of the two cases returns `Ok(None)` for it.
//!
//! Callbacks receive a [`ResolutionContext`] through which they may read
//! other attributes of the same record. Such reads re-enter the resolver and
//! are cycle-checked per key.

use crate::errors::{MegarecError, Result};
use crate::model::descriptor::{NestedDescriptor, Reference};
use crate::model::record::RecordHandle;
use crate::model::value::{RawValue, ResolvedValue};
use crate::ops::store::RecordStore;

pub trait Schema {
    /// Classify `value` as a reference, or return `None`
    fn compute_attribute_reference(
        &self,
        key: &str,
        value: &RawValue,
        model_name: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<Reference>>;

    /// Classify `value` as an embedded document, or return `None`
    fn compute_nested_model(
        &self,
        key: &str,
        value: &RawValue,
        model_name: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<NestedDescriptor>>;
}

/// What a schema callback can see of the record being resolved
pub struct ResolutionContext<'a> {
    record: &'a RecordHandle,
    store: &'a dyn RecordStore,
    schema: &'a dyn Schema,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(
        record: &'a RecordHandle,
        store: &'a dyn RecordStore,
        schema: &'a dyn Schema,
    ) -> Self {
        Self {
            record,
            store,
            schema,
        }
    }

    /// The record whose attribute is being classified
    pub fn record(&self) -> &RecordHandle {
        self.record
    }

    /// Resolve another attribute of the same record
    ///
    /// # Errors
    ///
    /// Returns `CyclicDependency` if `key` is already being classified on
    /// this record, plus anything the nested resolution reports.
    pub fn get_attr(&self, key: &str) -> Result<ResolvedValue> {
        self.record.get_attr(key, self.store, self.schema)
    }

    /// Raw value of another attribute, without resolving it
    pub fn raw_attr(&self, key: &str) -> Option<RawValue> {
        self.record.raw_attr(key)
    }
}

type ReferenceCallback =
    Box<dyn Fn(&str, &RawValue, Option<&str>, &ResolutionContext<'_>) -> Result<Option<Reference>>>;
type NestedCallback = Box<
    dyn Fn(
        &str,
        &RawValue,
        Option<&str>,
        &ResolutionContext<'_>,
    ) -> Result<Option<NestedDescriptor>>,
>;

/// Schema assembled from two closures
///
/// ```
/// use megarec_core::schema::FnSchema;
///
/// let schema = FnSchema::builder()
///     .compute_attribute_reference(|_, _, _, _| Ok(None))
///     .compute_nested_model(|_, _, _, _| Ok(None))
///     .build()
///     .unwrap();
/// # let _ = schema;
/// ```
pub struct FnSchema {
    reference: ReferenceCallback,
    nested: NestedCallback,
}

impl FnSchema {
    pub fn builder() -> FnSchemaBuilder {
        FnSchemaBuilder::default()
    }
}

impl Schema for FnSchema {
    fn compute_attribute_reference(
        &self,
        key: &str,
        value: &RawValue,
        model_name: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<Reference>> {
        (self.reference)(key, value, model_name, ctx)
    }

    fn compute_nested_model(
        &self,
        key: &str,
        value: &RawValue,
        model_name: Option<&str>,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<NestedDescriptor>> {
        (self.nested)(key, value, model_name, ctx)
    }
}

#[derive(Default)]
pub struct FnSchemaBuilder {
    reference: Option<ReferenceCallback>,
    nested: Option<NestedCallback>,
}

impl FnSchemaBuilder {
    pub fn compute_attribute_reference<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &RawValue, Option<&str>, &ResolutionContext<'_>) -> Result<Option<Reference>>
            + 'static,
    {
        self.reference = Some(Box::new(f));
        self
    }

    pub fn compute_nested_model<F>(mut self, f: F) -> Self
    where
        F: Fn(
                &str,
                &RawValue,
                Option<&str>,
                &ResolutionContext<'_>,
            ) -> Result<Option<NestedDescriptor>>
            + 'static,
    {
        self.nested = Some(Box::new(f));
        self
    }

    /// # Errors
    ///
    /// Returns `IncompleteSchema` naming the first missing operation.
    pub fn build(self) -> Result<FnSchema> {
        let reference = self
            .reference
            .ok_or_else(|| MegarecError::IncompleteSchema {
                operation: "compute_attribute_reference".to_string(),
            })?;
        let nested = self.nested.ok_or_else(|| MegarecError::IncompleteSchema {
            operation: "compute_nested_model".to_string(),
        })?;
        Ok(FnSchema { reference, nested })
    }
}
