//! In-memory document state store
//!
//! The registry maps ids to individually locked states. Registry locks are
//! held only long enough to insert, remove or clone an entry handle; all
//! work on a state happens under that state's own lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::blob::{BinaryManager, BlobReferenceScanner};
use crate::lock::{authority_from_config, Lock, LockAuthority, LockCoordinator};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::state::keys::{KEY_ID, KEY_NAME, KEY_PARENT_ID, LOCK_FIELDS};
use crate::state::{DocumentState, Scalar, StateValue};

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::id::IdGenerator;

type Entry = Arc<RwLock<DocumentState>>;

/// Memory-resident registry of document states for one repository
#[derive(Debug)]
pub struct StateStore {
    repository_name: String,
    states: RwLock<HashMap<String, Entry>>,
    ids: IdGenerator,
    locks: LockCoordinator,
    scanner: BlobReferenceScanner,
    metrics: Arc<MetricsRegistry>,
    logger: Logger,
}

impl StateStore {
    /// Build a store from configuration
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let authority = authority_from_config(config)?;
        Self::with_authority(config, authority)
    }

    /// Build a store with an explicitly supplied lock authority
    pub fn with_authority(
        config: &StoreConfig,
        authority: Arc<dyn LockAuthority>,
    ) -> StoreResult<Self> {
        let ids = IdGenerator::from_config(config)?;
        let metrics = Arc::new(MetricsRegistry::new());
        let logger = Logger::new(config.severity()?);

        logger.log_event_with_fields(
            Event::StoreStart,
            &[
                ("repository", &config.repository_name),
                ("id_generator", if ids.is_sequential() { "sequence" } else { "uuid" }),
            ],
        );

        Ok(Self {
            repository_name: config.repository_name.clone(),
            states: RwLock::new(HashMap::new()),
            ids,
            locks: LockCoordinator::new(authority, Arc::clone(&metrics), logger),
            scanner: BlobReferenceScanner::new(
                config.repository_name.clone(),
                Arc::clone(&metrics),
                logger,
            ),
            metrics,
            logger,
        })
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Every write is immediately visible; there is no rollback
    pub fn supports_transactions(&self) -> bool {
        false
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn logger(&self) -> Logger {
        self.logger
    }

    /// Generate a new document id
    ///
    /// Not checked against existing entries.
    pub fn create_id(&self) -> String {
        self.metrics.increment_ids_generated();
        self.ids.next_id()
    }

    fn entry(&self, id: &str) -> StoreResult<Entry> {
        self.states
            .read()
            .map_err(|_| StoreError::poisoned())?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Handles on every current entry, taken under a brief registry lock
    pub(crate) fn entries(&self) -> StoreResult<Vec<Entry>> {
        Ok(self
            .states
            .read()
            .map_err(|_| StoreError::poisoned())?
            .values()
            .cloned()
            .collect())
    }

    /// Copies of every state not in `ignored` that satisfies `predicate`,
    /// ordered by id
    fn find_all<F>(
        &self,
        ignored: &HashSet<String>,
        predicate: F,
    ) -> StoreResult<Vec<DocumentState>>
    where
        F: Fn(&DocumentState) -> bool,
    {
        let mut candidates: Vec<(String, Entry)> = self
            .states
            .read()
            .map_err(|_| StoreError::poisoned())?
            .iter()
            .filter(|(id, _)| !ignored.contains(id.as_str()))
            .map(|(id, entry)| (id.clone(), Arc::clone(entry)))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut found = Vec::new();
        for (_, entry) in candidates {
            let guard = entry.read().map_err(|_| StoreError::poisoned())?;
            let state: &DocumentState = &guard;
            if predicate(state) {
                found.push(state.clone());
            }
        }
        Ok(found)
    }

    fn log_query(&self, query: &str, matched: usize) {
        self.metrics.increment_queries();
        self.logger.log_event_with_fields(
            Event::StatesQueried,
            &[("query", query), ("matched", &matched.to_string())],
        );
    }

    // ========================================================================
    // Document states
    // ========================================================================

    /// Insert a new state; it must carry its id under `KEY_ID`
    ///
    /// Null fields are dropped, as are lock fields: a lock is only ever
    /// placed through `set_lock`.
    pub fn create_state(&self, state: DocumentState) -> StoreResult<()> {
        let (id, state) = Self::prepare_new(state)?;

        {
            let mut states = self.states.write().map_err(|_| StoreError::poisoned())?;
            if states.contains_key(&id) {
                return Err(StoreError::DocumentExists(id));
            }
            states.insert(id.clone(), Arc::new(RwLock::new(state)));
        }

        self.metrics.increment_documents_created();
        self.logger
            .log_event_with_fields(Event::DocumentCreated, &[("id", &id)]);
        Ok(())
    }

    /// Insert a batch of new states
    ///
    /// Either every state is inserted or none is: a missing id, an id
    /// already stored, or an id repeated within the batch rejects the
    /// whole batch. Returns how many were inserted.
    pub fn create_states(&self, batch: Vec<DocumentState>) -> StoreResult<usize> {
        let prepared = batch
            .into_iter()
            .map(Self::prepare_new)
            .collect::<StoreResult<Vec<_>>>()?;
        let ids: Vec<String> = prepared.iter().map(|(id, _)| id.clone()).collect();

        {
            let mut states = self.states.write().map_err(|_| StoreError::poisoned())?;
            let mut seen = HashSet::with_capacity(ids.len());
            for id in &ids {
                if states.contains_key(id) || !seen.insert(id.as_str()) {
                    return Err(StoreError::DocumentExists(id.clone()));
                }
            }
            for (id, state) in prepared {
                states.insert(id, Arc::new(RwLock::new(state)));
            }
        }

        for id in &ids {
            self.metrics.increment_documents_created();
            self.logger
                .log_event_with_fields(Event::DocumentCreated, &[("id", id)]);
        }
        Ok(ids.len())
    }

    fn prepare_new(mut state: DocumentState) -> StoreResult<(String, DocumentState)> {
        let id = state.id().ok_or(StoreError::MissingId)?.to_string();
        state.strip_nulls();
        for key in LOCK_FIELDS {
            state.remove(key);
        }
        Ok((id, state))
    }

    /// Insert a state under a freshly generated id and return the id
    pub fn create_document(&self, mut state: DocumentState) -> StoreResult<String> {
        let id = self.create_id();
        state.put(KEY_ID, id.as_str());
        self.create_state(state)?;
        Ok(id)
    }

    /// Copy of the stored state, if present
    pub fn read_state(&self, id: &str) -> StoreResult<Option<DocumentState>> {
        let entry = match self.entry(id) {
            Ok(entry) => entry,
            Err(StoreError::DocumentNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let state = entry.read().map_err(|_| StoreError::poisoned())?;
        Ok(Some(state.clone()))
    }

    /// The id plus the requested top-level `keys` of a stored state
    ///
    /// Keys absent from the state are absent from the result.
    pub fn read_partial_state<S: AsRef<str>>(
        &self,
        id: &str,
        keys: &[S],
    ) -> StoreResult<Option<DocumentState>> {
        let entry = match self.entry(id) {
            Ok(entry) => entry,
            Err(StoreError::DocumentNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let state = entry.read().map_err(|_| StoreError::poisoned())?;
        Ok(Some(state.project(keys)))
    }

    /// Copies of the stored states for `ids`; absent ids are skipped
    pub fn read_states<I, S>(&self, ids: I) -> StoreResult<Vec<DocumentState>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = Vec::new();
        for id in ids {
            if let Some(state) = self.read_state(id.as_ref())? {
                found.push(state);
            }
        }
        Ok(found)
    }

    /// Merge a diff into a stored state
    ///
    /// `Null` values remove fields. The id and lock fields are not
    /// writable through a diff.
    pub fn update_state(&self, id: &str, diff: &DocumentState) -> StoreResult<()> {
        let diff: DocumentState = diff
            .iter()
            .filter(|(key, _)| key.as_str() != KEY_ID && !LOCK_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let entry = self.entry(id)?;
        entry
            .write()
            .map_err(|_| StoreError::poisoned())?
            .merge(&diff);

        self.metrics.increment_documents_updated();
        if self.logger.enabled(Event::DocumentUpdated.severity()) {
            let fields = diff.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(",");
            self.logger
                .log_event_with_fields(Event::DocumentUpdated, &[("id", id), ("fields", &fields)]);
        }
        Ok(())
    }

    /// Remove states; absent ids are ignored
    ///
    /// Returns how many were removed.
    pub fn delete_states<I, S>(&self, ids: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed = {
            let mut states = self.states.write().map_err(|_| StoreError::poisoned())?;
            ids.into_iter()
                .filter(|id| states.remove(id.as_ref()).is_some())
                .count()
        };

        self.metrics.add_documents_deleted(removed as u64);
        self.logger
            .log_event_with_fields(Event::DocumentsDeleted, &[("count", &removed.to_string())]);
        Ok(removed)
    }

    pub fn document_count(&self) -> StoreResult<usize> {
        Ok(self.states.read().map_err(|_| StoreError::poisoned())?.len())
    }

    /// Discard every state
    pub fn shutdown(&self) -> StoreResult<()> {
        let discarded = {
            let mut states = self.states.write().map_err(|_| StoreError::poisoned())?;
            let count = states.len();
            states.clear();
            count
        };

        self.logger.log_event_with_fields(
            Event::StoreShutdown,
            &[
                ("repository", &self.repository_name),
                ("discarded", &discarded.to_string()),
            ],
        );
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The child of `parent_id` called `name`, skipping `ignored` ids
    ///
    /// Should several match, the lowest id wins.
    pub fn read_child_state(
        &self,
        parent_id: &str,
        name: &str,
        ignored: &HashSet<String>,
    ) -> StoreResult<Option<DocumentState>> {
        let found = self.find_all(ignored, |state| is_child(state, parent_id, name))?;
        self.log_query("child", found.len());
        Ok(found.into_iter().next())
    }

    /// Whether `parent_id` has a child called `name` outside `ignored`
    pub fn has_child(
        &self,
        parent_id: &str,
        name: &str,
        ignored: &HashSet<String>,
    ) -> StoreResult<bool> {
        Ok(self.read_child_state(parent_id, name, ignored)?.is_some())
    }

    /// States whose `key` holds `value`, skipping `ignored` ids
    ///
    /// `key` may be a `/` path into nested states. An array field matches
    /// when any element equals `value`.
    pub fn query_key_value(
        &self,
        key: &str,
        value: &Scalar,
        ignored: &HashSet<String>,
    ) -> StoreResult<Vec<DocumentState>> {
        self.query_key_values(&[(key, value)], ignored)
    }

    /// States matching every `(key, value)` condition, skipping `ignored`
    pub fn query_key_values(
        &self,
        conditions: &[(&str, &Scalar)],
        ignored: &HashSet<String>,
    ) -> StoreResult<Vec<DocumentState>> {
        let found = self.find_all(ignored, |state| {
            conditions.iter().all(|(key, value)| {
                state
                    .get_path(key)
                    .map_or(false, |stored| stored.matches(value))
            })
        })?;
        self.log_query("key_value", found.len());
        Ok(found)
    }

    /// Whether any state outside `ignored` has `key` holding `value`
    pub fn query_key_value_presence(
        &self,
        key: &str,
        value: &Scalar,
        ignored: &HashSet<String>,
    ) -> StoreResult<bool> {
        Ok(!self.query_key_value(key, value, ignored)?.is_empty())
    }

    // ========================================================================
    // Locks
    // ========================================================================

    /// Current lock on `id`, if any
    pub fn get_lock(&self, id: &str) -> StoreResult<Option<Lock>> {
        let entry = self.entry(id)?;
        self.locks.get_lock(&entry)
    }

    /// Lock `id` unless already locked; see `LockCoordinator::set_lock`
    pub fn set_lock(&self, id: &str, lock: &Lock) -> StoreResult<Option<Lock>> {
        let entry = self.entry(id)?;
        self.locks.set_lock(id, &entry, lock)
    }

    /// Unlock `id` on behalf of `owner`; see `LockCoordinator::remove_lock`
    pub fn remove_lock(&self, id: &str, owner: Option<&str>) -> StoreResult<Option<Lock>> {
        let entry = self.entry(id)?;
        self.locks.remove_lock(id, &entry, owner)
    }

    // ========================================================================
    // Binaries
    // ========================================================================

    /// Report every referenced blob key to `manager`
    ///
    /// Documents created or deleted during the sweep may or may not be
    /// seen. Returns the number of marks made.
    pub fn mark_referenced_binaries(&self, manager: &dyn BinaryManager) -> StoreResult<usize> {
        let entries = self.entries()?;
        self.scanner
            .scan(entries.iter().map(|entry| entry.as_ref()), manager)
    }
}

fn is_child(state: &DocumentState, parent_id: &str, name: &str) -> bool {
    let text = |key: &str| state.get(key).and_then(StateValue::as_scalar).and_then(Scalar::as_str);
    text(KEY_PARENT_ID) == Some(parent_id) && text(KEY_NAME) == Some(name)
}
