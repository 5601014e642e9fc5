//! The lock record and its reserved-field encoding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::keys::{KEY_LOCK_CREATED, KEY_LOCK_OWNER};
use crate::state::{DocumentState, Scalar, StateValue};

/// Pessimistic single-owner lock on a document
///
/// `failed` is set only on values returned by a rejected removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub owner: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub failed: bool,
}

impl Lock {
    pub fn new(owner: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            owner: owner.into(),
            created,
            failed: false,
        }
    }

    /// Lock created now
    pub fn now(owner: impl Into<String>) -> Self {
        Self::new(owner, Utc::now())
    }

    /// The same lock flagged as a removal mismatch
    pub fn into_failed(self) -> Self {
        Self {
            failed: true,
            ..self
        }
    }

    /// Read the lock held in a state's reserved fields
    ///
    /// A lock is present only when both the owner and the creation time
    /// are set.
    pub fn read_from(state: &DocumentState) -> Option<Self> {
        let owner = state.get(KEY_LOCK_OWNER)?.as_scalar()?.as_str()?;
        let created = state.get(KEY_LOCK_CREATED)?.as_scalar()?.as_date()?;
        Some(Self::new(owner, created))
    }

    /// Write this lock into a state's reserved fields
    pub fn write_to(&self, state: &mut DocumentState) {
        state.put(KEY_LOCK_OWNER, self.owner.as_str());
        state.put(KEY_LOCK_CREATED, StateValue::Scalar(Scalar::Date(self.created)));
    }

    /// Remove any lock from a state's reserved fields
    pub fn clear_from(state: &mut DocumentState) {
        state.remove(KEY_LOCK_OWNER);
        state.remove(KEY_LOCK_CREATED);
    }
}
