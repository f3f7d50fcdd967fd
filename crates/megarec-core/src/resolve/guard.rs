//! Dependent-key cycle detection
//!
//! Each record carries its own set of keys whose classification is in
//! progress. A key is marked for exactly as long as an [`InProgress`] mark
//! lives, so the set is restored on success, on error, and on unwind.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::errors::{MegarecError, Result};
use crate::model::record::Record;

#[derive(Debug, Default)]
pub struct DependencyGuard {
    in_progress: RefCell<HashSet<String>>,
}

impl DependencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` in progress; `None` if it already is
    pub fn enter(&self, key: &str) -> Option<InProgress<'_>> {
        if !self.in_progress.borrow_mut().insert(key.to_string()) {
            return None;
        }
        Some(InProgress {
            guard: self,
            key: key.to_string(),
        })
    }

    pub fn is_in_progress(&self, key: &str) -> bool {
        self.in_progress.borrow().contains(key)
    }

    /// No key is being classified
    pub fn is_idle(&self) -> bool {
        self.in_progress.borrow().is_empty()
    }

    /// Keys currently in progress, sorted
    pub fn in_progress_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.in_progress.borrow().iter().cloned().collect();
        keys.sort();
        keys
    }
}

/// Scoped in-progress mark; releases its key on drop
#[must_use = "the key is released as soon as the mark is dropped"]
pub struct InProgress<'g> {
    guard: &'g DependencyGuard,
    key: String,
}

impl InProgress<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.borrow_mut().remove(&self.key);
    }
}

/// Run `f` with `key` marked in progress on `record`.
///
/// # Errors
///
/// Returns `CyclicDependency` without calling `f` if `key` is already in
/// progress on `record`; otherwise returns whatever `f` returns.
pub fn with_guard<T, F>(record: &Record, key: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let Some(_mark) = record.dependency_guard().enter(key) else {
        tracing::debug!(key, record = %record.describe(), "cyclic dependent key");
        return Err(MegarecError::CyclicDependency {
            record: record.describe(),
            key: key.to_string(),
        });
    };
    f()
}
