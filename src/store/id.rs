//! Document id generation
//!
//! Ids are never checked against the registry; uniqueness comes from the
//! generation scheme alone.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};

/// Prefix of sequential ids in debug mode
pub const DEBUG_ID_PREFIX: &str = "UUID_";

/// Constructor for a named id generator
pub type IdGeneratorFactory = fn(&StoreConfig) -> IdGenerator;

/// Id generators selectable by name in configuration
pub const ID_GENERATORS: &[(&str, IdGeneratorFactory)] = &[
    ("uuid", uuid_generator),
    ("sequence", sequence_generator),
];

fn uuid_generator(_config: &StoreConfig) -> IdGenerator {
    IdGenerator::Uuid
}

fn sequence_generator(config: &StoreConfig) -> IdGenerator {
    IdGenerator::sequence(config.sequence_start, "")
}

/// Source of new document ids
#[derive(Debug)]
pub enum IdGenerator {
    /// Random v4 UUIDs
    Uuid,
    /// Strictly increasing counter, rendered with a prefix
    Sequence {
        next: AtomicU64,
        prefix: &'static str,
    },
}

impl IdGenerator {
    /// Sequential generator starting at `start`
    pub fn sequence(start: u64, prefix: &'static str) -> Self {
        IdGenerator::Sequence {
            next: AtomicU64::new(start),
            prefix,
        }
    }

    /// Resolve the generator named in `config`
    ///
    /// Debug ids force a sequence rendered with `DEBUG_ID_PREFIX`.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        if config.debug_ids {
            return Ok(Self::sequence(config.sequence_start, DEBUG_ID_PREFIX));
        }
        ID_GENERATORS
            .iter()
            .find(|(name, _)| *name == config.id_generator)
            .map(|(_, factory)| factory(config))
            .ok_or_else(|| {
                StoreError::config(format!("Unknown id_generator '{}'", config.id_generator))
            })
    }

    /// Generate a new id
    pub fn next_id(&self) -> String {
        match self {
            IdGenerator::Uuid => Uuid::new_v4().to_string(),
            IdGenerator::Sequence { next, prefix } => {
                let value = next.fetch_add(1, Ordering::Relaxed);
                format!("{}{}", prefix, value)
            }
        }
    }

    /// Returns true for sequential generators
    pub fn is_sequential(&self) -> bool {
        matches!(self, IdGenerator::Sequence { .. })
    }
}
