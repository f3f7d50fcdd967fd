//! megarec Core - schema-driven attribute resolution
//!
//! This crate turns raw record attributes into materialized values:
//! - References to other records, single or as live reference arrays
//! - Embedded child records wired to their parent slot
//! - Element-wise resolution of raw lists into tracked arrays
//! - Plain values passed through unchanged
//!
//! Classification is delegated to a [`Schema`]; identity is delegated to a
//! [`RecordStore`]. Dependent reads between attributes of one record are
//! allowed and cycle-checked per key.

pub mod collections;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod naming;
pub mod ops;
pub mod resolve;
pub mod schema;

// Used by the exported logging macros
#[doc(hidden)]
pub use tracing;
pub use megarec_core_types as core_types;

// Re-export commonly used types
pub use collections::{ReferenceArray, TrackedArray};
pub use config::EngineConfig;
pub use errors::{MegarecError, RecError, RecErrorKind, Result};
pub use model::{
    Document, NestedDescriptor, RawValue, Record, RecordHandle, RecordRef, Reference,
    ResolvedKind, ResolvedValue,
};
pub use ops::{GlobalIdentityCache, MemoryStore, RecordArrayManager, RecordStore};
pub use resolve::{resolve_list, resolve_value};
pub use schema::{FnSchema, ResolutionContext, Schema};
