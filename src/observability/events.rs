//! Observable events
//!
//! Events are explicit and typed. Each maps to one stable event name in
//! the structured log.

use std::fmt;

use super::logger::Severity;

/// Observable events in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Store constructed
    StoreStart,
    /// Registry discarded
    StoreShutdown,
    /// Configuration loaded
    ConfigLoaded,

    // Documents
    /// Document state created
    DocumentCreated,
    /// Document state updated
    DocumentUpdated,
    /// Document states deleted
    DocumentsDeleted,
    /// Key/value or child query answered
    StatesQueried,

    // Locks
    /// Lock stored on an unlocked document
    LockAcquired,
    /// Lock request found an existing lock
    LockConflict,
    /// Lock cleared
    LockRemoved,
    /// Removal refused for lack of authority
    LockRemovalRejected,

    // Binary references
    /// Referenced-binary sweep started
    BinaryScanBegin,
    /// Referenced-binary sweep finished
    BinaryScanComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreStart => "STORE_START",
            Event::StoreShutdown => "STORE_SHUTDOWN",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentUpdated => "DOCUMENT_UPDATED",
            Event::DocumentsDeleted => "DOCUMENTS_DELETED",
            Event::StatesQueried => "STATES_QUERIED",

            Event::LockAcquired => "LOCK_ACQUIRED",
            Event::LockConflict => "LOCK_CONFLICT",
            Event::LockRemoved => "LOCK_REMOVED",
            Event::LockRemovalRejected => "LOCK_REMOVAL_REJECTED",

            Event::BinaryScanBegin => "BINARY_SCAN_BEGIN",
            Event::BinaryScanComplete => "BINARY_SCAN_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::StoreStart
            | Event::StoreShutdown
            | Event::ConfigLoaded
            | Event::BinaryScanBegin
            | Event::BinaryScanComplete => Severity::Info,
            Event::LockRemovalRejected => Severity::Warn,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::StoreStart,
            Event::StoreShutdown,
            Event::ConfigLoaded,
            Event::DocumentCreated,
            Event::DocumentUpdated,
            Event::DocumentsDeleted,
            Event::StatesQueried,
            Event::LockAcquired,
            Event::LockConflict,
            Event::LockRemoved,
            Event::LockRemovalRejected,
            Event::BinaryScanBegin,
            Event::BinaryScanComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_severities() {
        assert_eq!(Event::StoreStart.severity(), Severity::Info);
        assert_eq!(Event::LockConflict.severity(), Severity::Trace);
        assert_eq!(Event::LockRemovalRejected.severity(), Severity::Warn);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::LockAcquired), "LOCK_ACQUIRED");
    }
}
