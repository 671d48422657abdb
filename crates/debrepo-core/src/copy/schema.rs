use std::sync::OnceLock;

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::error::{DebRepoError, Result};

const COPY_CONFIG_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/copy_config.schema.json"
));

static VALIDATOR: OnceLock<std::result::Result<Validator, String>> = OnceLock::new();

fn compiled_validator() -> Result<&'static Validator> {
    VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(COPY_CONFIG_SCHEMA_JSON)
                .map_err(|e| format!("failed to parse embedded copy config schema: {e}"))?;
            jsonschema::options()
                .with_draft(Draft::Draft7)
                .build(&schema)
                .map_err(|e| format!("failed to compile copy config schema: {e}"))
        })
        .as_ref()
        .map_err(|e| DebRepoError::Custom(e.clone()))
}

/// Every schema violation of `config`, sorted.
pub(super) fn violations(config: &Value) -> Result<Vec<String>> {
    let validator = compiled_validator()?;
    let mut messages: Vec<String> = validator
        .iter_errors(config)
        .map(|error| error.to_string())
        .collect();
    messages.sort();
    Ok(messages)
}
