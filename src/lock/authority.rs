//! Lock removal authority
//!
//! Policies are resolved by name from `LOCK_POLICIES` when a store is
//! built.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::store::{StoreConfig, StoreError, StoreResult};

/// Decides whether a principal may remove a lock held by someone else
pub trait LockAuthority: Send + Sync + fmt::Debug {
    /// Can `requester` remove a lock held by `lock_owner`?
    fn can_override(&self, requester: &str, lock_owner: &str) -> bool;
}

/// Only the owner may remove a lock
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnerOnly;

impl LockAuthority for OwnerOnly {
    fn can_override(&self, _requester: &str, _lock_owner: &str) -> bool {
        false
    }
}

/// A fixed set of principals may remove any lock
#[derive(Debug, Default, Clone)]
pub struct Administrators {
    principals: HashSet<String>,
}

impl Administrators {
    pub fn new<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principals: principals.into_iter().map(Into::into).collect(),
        }
    }
}

impl LockAuthority for Administrators {
    fn can_override(&self, requester: &str, _lock_owner: &str) -> bool {
        self.principals.contains(requester)
    }
}

/// Constructor for a named lock policy
pub type LockPolicyFactory = fn(&StoreConfig) -> Arc<dyn LockAuthority>;

/// Lock policies selectable by name in configuration
pub const LOCK_POLICIES: &[(&str, LockPolicyFactory)] = &[
    ("owner-only", owner_only_policy),
    ("administrators", administrators_policy),
];

fn owner_only_policy(_config: &StoreConfig) -> Arc<dyn LockAuthority> {
    Arc::new(OwnerOnly)
}

fn administrators_policy(config: &StoreConfig) -> Arc<dyn LockAuthority> {
    Arc::new(Administrators::new(config.administrators.iter().cloned()))
}

/// Resolve the policy named in `config`
pub fn authority_from_config(config: &StoreConfig) -> StoreResult<Arc<dyn LockAuthority>> {
    LOCK_POLICIES
        .iter()
        .find(|(name, _)| *name == config.lock_policy)
        .map(|(_, factory)| factory(config))
        .ok_or_else(|| StoreError::config(format!("Unknown lock_policy '{}'", config.lock_policy)))
}

/// Whether `requester` may remove a lock held by `lock_owner`
///
/// A `None` requester is the system and may always remove.
pub fn can_lock_be_removed(
    lock_owner: &str,
    requester: Option<&str>,
    authority: &dyn LockAuthority,
) -> bool {
    match requester {
        None => true,
        Some(requester) if requester == lock_owner => true,
        Some(requester) => authority.can_override(requester, lock_owner),
    }
}
