//! Referenced-binary sweep over stored documents

use std::sync::{Arc, RwLock};

use crate::observability::{Event, Logger, MetricsRegistry};
use crate::state::DocumentState;
use crate::store::{StoreError, StoreResult};

use super::manager::BinaryManager;

/// Reports every blob key referenced from a set of documents
#[derive(Debug)]
pub struct BlobReferenceScanner {
    repository_name: String,
    metrics: Arc<MetricsRegistry>,
    logger: Logger,
}

impl BlobReferenceScanner {
    pub fn new(
        repository_name: impl Into<String>,
        metrics: Arc<MetricsRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            repository_name: repository_name.into(),
            metrics,
            logger,
        }
    }

    /// Mark each blob key found in `documents`
    ///
    /// Each document is read under its own lock and released before the
    /// next one. Returns the number of marks made, duplicates included.
    pub fn scan<'a, I>(&self, documents: I, manager: &dyn BinaryManager) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a RwLock<DocumentState>>,
    {
        self.logger.log_event_with_fields(
            Event::BinaryScanBegin,
            &[("repository", &self.repository_name)],
        );

        let mut marked = 0usize;
        let mut scanned = 0usize;
        for document in documents {
            let keys = document
                .read()
                .map_err(|_| StoreError::poisoned())?
                .blob_keys();
            for key in &keys {
                manager.mark_referenced_binary(key, &self.repository_name);
            }
            marked += keys.len();
            scanned += 1;
        }

        self.metrics.increment_binary_scans();
        self.metrics.add_binaries_marked(marked as u64);
        self.logger.log_event_with_fields(
            Event::BinaryScanComplete,
            &[
                ("repository", &self.repository_name),
                ("documents", &scanned.to_string()),
                ("marked", &marked.to_string()),
            ],
        );
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::RecordingBinaryManager;
    use crate::state::keys::KEY_BLOB_KEYS;
    use crate::state::StateValue;

    fn doc_with_keys(id: &str, keys: &[&str]) -> RwLock<DocumentState> {
        let mut state = DocumentState::with_id(id);
        state.put(KEY_BLOB_KEYS, StateValue::strings(keys.iter().copied()));
        RwLock::new(state)
    }

    #[test]
    fn test_reports_union_of_keys() {
        let metrics = Arc::new(MetricsRegistry::new());
        let scanner = BlobReferenceScanner::new("repo", Arc::clone(&metrics), Logger::default());
        let manager = RecordingBinaryManager::new();
        let docs = [
            doc_with_keys("a", &["k1", "k2"]),
            doc_with_keys("b", &["k2", "k3"]),
            RwLock::new(DocumentState::with_id("c")),
        ];

        let marked = scanner.scan(docs.iter(), &manager).unwrap();
        assert_eq!(marked, 4);
        assert_eq!(
            manager.keys().into_iter().collect::<Vec<_>>(),
            vec!["k1", "k2", "k3"]
        );
        assert!(manager.marks().iter().all(|(_, repo)| repo == "repo"));
        assert_eq!(metrics.snapshot().binaries_marked, 4);
        assert_eq!(metrics.snapshot().binary_scans, 1);
    }

    #[test]
    fn test_empty_scan() {
        let scanner =
            BlobReferenceScanner::new("repo", Arc::new(MetricsRegistry::new()), Logger::default());
        let manager = RecordingBinaryManager::new();
        let docs: Vec<RwLock<DocumentState>> = Vec::new();
        assert_eq!(scanner.scan(docs.iter(), &manager).unwrap(), 0);
        assert!(manager.marks().is_empty());
    }
}
