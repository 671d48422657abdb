//! Field checks shared by request bodies that arrive as raw JSON.

use serde_json::{Map, Value};

use crate::error::{DebRepoError, Result};

/// Returns the body as an object, rejecting fields outside `allowed`.
pub(crate) fn object_with_fields<'a>(
    document: &'a Value,
    allowed: &[&str],
) -> Result<&'a Map<String, Value>> {
    let object = document.as_object().ok_or_else(|| {
        DebRepoError::Validation("Invalid data. Expected a dictionary".into())
    })?;

    let mut unknown: Vec<String> = object
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(DebRepoError::UnknownFields(unknown));
    }

    Ok(object)
}

/// Reads an optional boolean field, falling back to `default` when absent.
pub(crate) fn bool_field(object: &Map<String, Value>, name: &str, default: bool) -> Result<bool> {
    match object.get(name) {
        None => Ok(default),
        Some(Value::Bool(value)) => Ok(*value),
        Some(_) => Err(DebRepoError::Validation(format!(
            "{}: Must be a valid boolean",
            name
        ))),
    }
}
