//! Document state store
//!
//! Holds the authoritative id to state registry for one repository
//! instance, generates ids, and mediates locking and binary scanning.
//! Nothing is persisted.

mod config;
mod errors;
mod id;
mod memory;

pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use id::{IdGenerator, IdGeneratorFactory, DEBUG_ID_PREFIX, ID_GENERATORS};
pub use memory::StateStore;
