//! Pessimistic document locks
//!
//! A lock lives entirely inside its document's reserved fields. Setting
//! is first-writer-wins; conflicts and rejected removals come back as
//! data rather than errors.

mod authority;
mod coordinator;
mod types;

pub use authority::{
    authority_from_config, can_lock_be_removed, Administrators, LockAuthority,
    LockPolicyFactory, OwnerOnly, LOCK_POLICIES,
};
pub use coordinator::LockCoordinator;
pub use types::Lock;
