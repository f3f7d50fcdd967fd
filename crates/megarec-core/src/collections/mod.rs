//! Live collections produced by attribute resolution
//!
//! Both collection types are shared handles: cloning one yields another view
//! of the same storage, so a collection cached on a record and a collection
//! held by a consumer observe the same mutations.

pub mod reference_array;
pub mod tracked_array;

pub use reference_array::ReferenceArray;
pub use tracked_array::TrackedArray;
