//! Attribute-value resolution
//!
//! Every schema callback runs under the owning record's dependency guard.
//! Reference classification is asked first; a raw list of non-references is
//! resolved element by element; otherwise the nested classification decides
//! between an embedded record and a plain value.

pub mod guard;
pub mod identity;
pub mod list;
pub mod nested;
pub mod reference;
pub mod value;

pub use guard::{with_guard, DependencyGuard, InProgress};
pub use list::resolve_list;
pub use value::resolve_value;
