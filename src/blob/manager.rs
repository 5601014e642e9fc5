//! Binary manager collaborator

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;

/// External binary garbage collector
///
/// Marking must be idempotent; the scanner does not deduplicate keys.
pub trait BinaryManager: Send + Sync + fmt::Debug {
    /// Record that `key` is still referenced from `repository_name`
    fn mark_referenced_binary(&self, key: &str, repository_name: &str);
}

/// In-memory binary manager that records every mark
#[derive(Debug, Default)]
pub struct RecordingBinaryManager {
    marks: Mutex<Vec<(String, String)>>,
}

impl RecordingBinaryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(key, repository_name)` mark, in call order
    pub fn marks(&self) -> Vec<(String, String)> {
        self.marks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Distinct marked keys
    pub fn keys(&self) -> BTreeSet<String> {
        self.marks().into_iter().map(|(key, _)| key).collect()
    }
}

impl BinaryManager for RecordingBinaryManager {
    fn mark_referenced_binary(&self, key: &str, repository_name: &str) {
        self.marks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((key.to_string(), repository_name.to_string()));
    }
}
