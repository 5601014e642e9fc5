//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle and lock events
//! - Counter metrics
//!
//! Observability is read-only: it never changes the outcome of a store
//! operation, and a failed write of a log line is ignored.
//!
//! # Usage
//!
//! ```ignore
//! use docstore::observability::{Event, Logger, MetricsRegistry, Severity};
//!
//! let logger = Logger::new(Severity::Trace);
//! logger.log_event_with_fields(Event::LockAcquired, &[("id", "doc1"), ("owner", "alice")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_locks_acquired();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
