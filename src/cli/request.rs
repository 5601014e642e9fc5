//! Session request parsing

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::lock::Lock;
use crate::state::{scalar_from_json, state_from_json, DocumentState, Scalar};

use super::errors::{CliError, CliResult};

/// One session request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateDocument { document: DocumentState },
    CreateStates { states: Vec<DocumentState> },
    GetLock { id: String },
    SetLock { id: String, lock: Lock },
    RemoveLock { id: String, owner: Option<String> },
    ReadState { id: String },
    ReadPartialState { id: String, keys: Vec<String> },
    ReadChildState { parent_id: String, name: String, ignored: HashSet<String> },
    HasChild { parent_id: String, name: String, ignored: HashSet<String> },
    /// One or two conditions, all of which must hold
    QueryKeyValue { conditions: Vec<(String, Scalar)>, ignored: HashSet<String> },
    QueryKeyValuePresence { key: String, value: Scalar, ignored: HashSet<String> },
    UpdateState { id: String, diff: DocumentState },
    DeleteStates { ids: Vec<String> },
    MarkReferencedBinaries,
    Metrics,
    Shutdown,
}

/// Raw request for parsing
#[derive(Debug, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    ids: Option<Vec<String>>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    document: Option<Value>,
    #[serde(default)]
    diff: Option<Value>,
    #[serde(default)]
    states: Option<Vec<Value>>,
    #[serde(default)]
    keys: Option<Vec<String>>,
    #[serde(default, rename = "parentId")]
    parent_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ignored: HashSet<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    key2: Option<String>,
    #[serde(default)]
    value2: Option<Value>,
}

impl RawRequest {
    fn id(&mut self) -> CliResult<String> {
        self.id
            .take()
            .ok_or_else(|| CliError::invalid_request(format!("Missing id for {}", self.op)))
    }

    fn child(&mut self) -> CliResult<(String, String, HashSet<String>)> {
        let parent_id = required(&self.op, self.parent_id.take(), "parentId")?;
        let name = required(&self.op, self.name.take(), "name")?;
        Ok((parent_id, name, std::mem::take(&mut self.ignored)))
    }
}

fn required<T>(op: &str, field: Option<T>, name: &str) -> CliResult<T> {
    field.ok_or_else(|| CliError::invalid_request(format!("Missing {} for {}", name, op)))
}

/// A key plus the scalar it must hold
fn condition(op: &str, key: Option<String>, value: Option<Value>) -> CliResult<(String, Scalar)> {
    let key = required(op, key, "key")?;
    let value = required(op, value, "value")?;
    let scalar = scalar_from_json(&value, &key)
        .map_err(|_| CliError::invalid_request(format!("Value for {} must be a scalar", key)))?;
    Ok((key, scalar))
}

impl Request {
    /// Parse a request from a JSON value
    pub fn parse(value: Value) -> CliResult<Self> {
        let mut raw: RawRequest = serde_json::from_value(value)?;

        match raw.op.as_str() {
            "createDocument" => {
                let document = match &raw.document {
                    Some(document) => state_from_json(document)?,
                    None => DocumentState::new(),
                };
                Ok(Request::CreateDocument { document })
            }
            "createStates" => {
                let states = raw
                    .states
                    .take()
                    .ok_or_else(|| CliError::invalid_request("Missing states for createStates"))?
                    .iter()
                    .map(state_from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Request::CreateStates { states })
            }
            "getLock" => Ok(Request::GetLock { id: raw.id()? }),
            "setLock" => {
                let id = raw.id()?;
                let owner = raw
                    .owner
                    .take()
                    .ok_or_else(|| CliError::invalid_request("Missing owner for setLock"))?;
                let lock = match raw.created {
                    Some(created) => Lock::new(owner, created),
                    None => Lock::now(owner),
                };
                Ok(Request::SetLock { id, lock })
            }
            "removeLock" => Ok(Request::RemoveLock {
                id: raw.id()?,
                owner: raw.owner.take(),
            }),
            "readState" => Ok(Request::ReadState { id: raw.id()? }),
            "readPartialState" => {
                let id = raw.id()?;
                let keys = required(&raw.op, raw.keys.take(), "keys")?;
                Ok(Request::ReadPartialState { id, keys })
            }
            "readChildState" => {
                let (parent_id, name, ignored) = raw.child()?;
                Ok(Request::ReadChildState {
                    parent_id,
                    name,
                    ignored,
                })
            }
            "hasChild" => {
                let (parent_id, name, ignored) = raw.child()?;
                Ok(Request::HasChild {
                    parent_id,
                    name,
                    ignored,
                })
            }
            "queryKeyValue" => {
                let mut conditions = vec![condition(&raw.op, raw.key.take(), raw.value.take())?];
                if raw.key2.is_some() || raw.value2.is_some() {
                    conditions.push(condition(&raw.op, raw.key2.take(), raw.value2.take())?);
                }
                Ok(Request::QueryKeyValue {
                    conditions,
                    ignored: std::mem::take(&mut raw.ignored),
                })
            }
            "queryKeyValuePresence" => {
                let (key, value) = condition(&raw.op, raw.key.take(), raw.value.take())?;
                Ok(Request::QueryKeyValuePresence {
                    key,
                    value,
                    ignored: std::mem::take(&mut raw.ignored),
                })
            }
            "updateState" => {
                let id = raw.id()?;
                let diff = raw
                    .diff
                    .as_ref()
                    .ok_or_else(|| CliError::invalid_request("Missing diff for updateState"))?;
                Ok(Request::UpdateState {
                    id,
                    diff: state_from_json(diff)?,
                })
            }
            "deleteStates" => {
                let ids = raw
                    .ids
                    .take()
                    .ok_or_else(|| CliError::invalid_request("Missing ids for deleteStates"))?;
                Ok(Request::DeleteStates { ids })
            }
            "markReferencedBinaries" => Ok(Request::MarkReferencedBinaries),
            "metrics" => Ok(Request::Metrics),
            "shutdown" => Ok(Request::Shutdown),
            other => Err(CliError::invalid_request(format!(
                "Unknown operation: {}",
                other
            ))),
        }
    }
}
