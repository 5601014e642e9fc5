//! Get/set/remove lock protocol over a document's reserved fields
//!
//! Each read-modify-write runs under the document's own write lock, so two
//! lock requests on the same document are serialized while requests on
//! different documents proceed in parallel.

use std::sync::{Arc, RwLock};

use crate::observability::{Event, Logger, MetricsRegistry};
use crate::state::DocumentState;
use crate::store::{StoreError, StoreResult};

use super::authority::{can_lock_be_removed, LockAuthority};
use super::types::Lock;

/// Applies the lock protocol to stored document states
#[derive(Debug)]
pub struct LockCoordinator {
    authority: Arc<dyn LockAuthority>,
    metrics: Arc<MetricsRegistry>,
    logger: Logger,
}

impl LockCoordinator {
    pub fn new(
        authority: Arc<dyn LockAuthority>,
        metrics: Arc<MetricsRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            authority,
            metrics,
            logger,
        }
    }

    /// Current lock, if any
    pub fn get_lock(&self, document: &RwLock<DocumentState>) -> StoreResult<Option<Lock>> {
        let state = document.read().map_err(|_| StoreError::poisoned())?;
        Ok(Lock::read_from(&state))
    }

    /// Store `lock` unless the document is already locked
    ///
    /// Returns `None` when the lock was acquired, otherwise the existing
    /// lock, unchanged.
    pub fn set_lock(
        &self,
        id: &str,
        document: &RwLock<DocumentState>,
        lock: &Lock,
    ) -> StoreResult<Option<Lock>> {
        let mut state = document.write().map_err(|_| StoreError::poisoned())?;

        if let Some(existing) = Lock::read_from(&state) {
            self.metrics.increment_lock_conflicts();
            self.logger.log_event_with_fields(
                Event::LockConflict,
                &[("id", id), ("owner", &existing.owner), ("requester", &lock.owner)],
            );
            return Ok(Some(existing));
        }

        lock.write_to(&mut state);
        self.metrics.increment_locks_acquired();
        self.logger
            .log_event_with_fields(Event::LockAcquired, &[("id", id), ("owner", &lock.owner)]);
        Ok(None)
    }

    /// Remove the lock on behalf of `owner`
    ///
    /// Returns `None` when there was no lock, the removed lock on success,
    /// or the existing lock flagged `failed` when `owner` may not remove
    /// it. A `None` owner removes unconditionally.
    pub fn remove_lock(
        &self,
        id: &str,
        document: &RwLock<DocumentState>,
        owner: Option<&str>,
    ) -> StoreResult<Option<Lock>> {
        let mut state = document.write().map_err(|_| StoreError::poisoned())?;

        let existing = match Lock::read_from(&state) {
            Some(lock) => lock,
            None => return Ok(None),
        };
        let requester = owner.unwrap_or("system");

        if !can_lock_be_removed(&existing.owner, owner, self.authority.as_ref()) {
            self.metrics.increment_lock_removal_mismatches();
            self.logger.log_event_with_fields(
                Event::LockRemovalRejected,
                &[("id", id), ("owner", &existing.owner), ("requester", requester)],
            );
            return Ok(Some(existing.into_failed()));
        }

        Lock::clear_from(&mut state);
        self.metrics.increment_locks_removed();
        self.logger.log_event_with_fields(
            Event::LockRemoved,
            &[("id", id), ("owner", &existing.owner), ("requester", requester)],
        );
        Ok(Some(existing))
    }
}
