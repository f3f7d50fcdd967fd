pub mod array_manager;
pub mod store;

pub use array_manager::RecordArrayManager;
pub use store::{GlobalIdentityCache, MemoryStore, RecordStore};
