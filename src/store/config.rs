//! Store configuration
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lock::LOCK_POLICIES;
use crate::observability::Severity;

use super::errors::{StoreError, StoreResult};
use super::id::ID_GENERATORS;

/// Configuration for one repository instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Repository name reported to the binary manager (default: "default")
    #[serde(default = "default_repository_name")]
    pub repository_name: String,

    /// Id generator name: "uuid" or "sequence" (default: "uuid")
    #[serde(default = "default_id_generator")]
    pub id_generator: String,

    /// Sequential ids rendered as `UUID_<n>`, whatever the generator
    #[serde(default)]
    pub debug_ids: bool,

    /// First value of the sequence generator (default: 1)
    #[serde(default = "default_sequence_start")]
    pub sequence_start: u64,

    /// Lock removal policy: "owner-only" or "administrators"
    #[serde(default = "default_lock_policy")]
    pub lock_policy: String,

    /// Principals allowed to remove other owners' locks under the
    /// "administrators" policy
    #[serde(default)]
    pub administrators: Vec<String>,

    /// Minimum log severity (default: "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_repository_name() -> String {
    "default".to_string()
}

fn default_id_generator() -> String {
    "uuid".to_string()
}

fn default_sequence_start() -> u64 {
    1
}

fn default_lock_policy() -> String {
    "owner-only".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            repository_name: default_repository_name(),
            id_generator: default_id_generator(),
            debug_ids: false,
            sequence_start: default_sequence_start(),
            lock_policy: default_lock_policy(),
            administrators: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Config with sequential debug ids, as used by tests
    pub fn debug() -> Self {
        Self {
            debug_ids: true,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| StoreError::config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Check that every named component exists
    pub fn validate(&self) -> StoreResult<()> {
        if self.repository_name.is_empty() {
            return Err(StoreError::config("repository_name must not be empty"));
        }
        if !ID_GENERATORS.iter().any(|(name, _)| *name == self.id_generator) {
            return Err(StoreError::config(format!(
                "Unknown id_generator '{}'",
                self.id_generator
            )));
        }
        if !LOCK_POLICIES.iter().any(|(name, _)| *name == self.lock_policy) {
            return Err(StoreError::config(format!(
                "Unknown lock_policy '{}'",
                self.lock_policy
            )));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> StoreResult<Severity> {
        Severity::from_name(&self.log_level)
            .ok_or_else(|| StoreError::config(format!("Unknown log_level '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.repository_name, "default");
        assert_eq!(config.id_generator, "uuid");
        assert!(!config.debug_ids);
        assert_eq!(config.lock_policy, "owner-only");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = StoreConfig::from_json_str(
            r#"{"repository_name": "test", "id_generator": "sequence", "sequence_start": 100}"#,
        )
        .unwrap();
        assert_eq!(config.repository_name, "test");
        assert_eq!(config.id_generator, "sequence");
        assert_eq!(config.sequence_start, 100);
        assert_eq!(config.lock_policy, "owner-only");
    }

    #[test]
    fn test_unknown_generator_rejected() {
        let err = StoreConfig::from_json_str(r#"{"id_generator": "snowflake"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(msg) if msg.contains("snowflake")));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(StoreConfig::from_json_str(r#"{"lock_policy": "anyone"}"#).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(StoreConfig::from_json_str(r#"{"log_level": "loud"}"#).is_err());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(StoreConfig::from_json_str("{").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"repository_name": "files", "debug_ids": true}}"#).unwrap();

        let config = StoreConfig::load(file.path()).unwrap();
        assert_eq!(config.repository_name, "files");
        assert!(config.debug_ids);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "DOCSTORE_CONFIG_ERROR");
    }
}
