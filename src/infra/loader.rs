//! JSON descriptor loading
//!
//! The only place descriptors are read from disk. Nothing is cached: every
//! call re-reads the file, so separate resolutions never share state.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ResolveError;

/// A decoded descriptor: a JSON object
pub type Record = Map<String, Value>;

/// Read a JSON descriptor into a key/value record
///
/// Fails with `ConfigNotFound` if `path` does not exist and with
/// `ConfigMalformed` if it is not a JSON object.
pub fn load(path: &Path) -> Result<Record, ResolveError> {
    if !path.is_file() {
        return Err(ResolveError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Reading descriptor {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ResolveError::ConfigMalformed {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(ResolveError::ConfigMalformed {
            path: path.to_path_buf(),
            error: format!("expected a JSON object, found {}", json_type_name(&other)),
        }),
        Err(e) => Err(ResolveError::ConfigMalformed {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
