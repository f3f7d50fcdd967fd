pub mod descriptor;
pub mod record;
pub mod value;

pub use descriptor::{NestedDescriptor, RecordRef, Reference};
pub use record::{EmbeddedInit, ParentLink, Record, RecordHandle};
pub use value::{Document, RawValue, ResolvedKind, ResolvedValue};
