//! Bridge request payloads

use crawlgate_core::{ActionName, Error, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// One call into a worker: an action tag and its structured parameters.
///
/// Immutable once built. Parameters that serialize to `null` are normalized to
/// an empty object so a worker always receives a JSON document on stdin.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRequest {
    action: ActionName,
    params: Value,
}

impl BridgeRequest {
    /// Build a request from any serializable parameter value
    pub fn new<A>(action: A, params: impl Serialize) -> Result<Self>
    where
        A: TryInto<ActionName>,
        Error: From<A::Error>,
    {
        let action = action.try_into()?;
        let params = match serde_json::to_value(params)? {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(Self { action, params })
    }

    /// Build a request carrying no parameters
    pub fn without_params<A>(action: A) -> Result<Self>
    where
        A: TryInto<ActionName>,
        Error: From<A::Error>,
    {
        Ok(Self {
            action: action.try_into()?,
            params: Value::Object(Map::new()),
        })
    }

    pub fn action(&self) -> &ActionName {
        &self.action
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Serialized bare parameters, as sent when the action travels separately
    pub fn params_document(&self) -> Vec<u8> {
        // Serializing a `Value` cannot fail.
        serde_json::to_vec(&self.params).unwrap_or_else(|_| b"{}".to_vec())
    }

    /// Serialized `{"action": ..., "params": ...}` envelope
    pub fn envelope_document(&self) -> Vec<u8> {
        let envelope = json!({
            "action": self.action.as_str(),
            "params": self.params,
        });
        serde_json::to_vec(&envelope).unwrap_or_else(|_| b"{}".to_vec())
    }
}
