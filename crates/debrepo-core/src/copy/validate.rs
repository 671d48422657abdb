use serde::Deserialize;
use serde_json::Value;

use super::schema::violations;
use crate::{
    error::{DebRepoError, Result},
    request::{bool_field, object_with_fields},
};

const FIELDS: [&str; 3] = ["config", "structured", "dependency_solving"];

/// One source/destination pair of a copy request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyEntry {
    /// Href of the repository version to copy from.
    pub source_repo_version: String,
    /// Href of the destination repository.
    pub dest_repo: String,
    /// Destination version the new version starts from, instead of the latest.
    #[serde(default)]
    pub dest_base_version: Option<i32>,
    /// Content hrefs to copy. All content of the source version when absent.
    #[serde(default)]
    pub content: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCopyRequest {
    pub config: Vec<CopyEntry>,
    /// Also copy the release structure of copied packages.
    pub structured: bool,
}

/// Body of a copy request: `{config, structured, dependency_solving}`.
///
/// `dependency_solving` is accepted only as `false`, so it is not kept.
pub struct CopyRequest;

impl CopyRequest {
    /// Checks a raw copy request body.
    ///
    /// Schema violations of `config` are reported together, sorted by message.
    pub fn validate(document: &Value) -> Result<ValidatedCopyRequest> {
        let object = object_with_fields(document, &FIELDS)?;
        let config = object
            .get("config")
            .ok_or_else(|| DebRepoError::Validation("config: This field is required".into()))?;
        let structured = bool_field(object, "structured", true)?;
        let dependency_solving = bool_field(object, "dependency_solving", false)?;

        let errors = violations(config)?;
        if !errors.is_empty() {
            return Err(DebRepoError::InvalidCopyCriteria(errors));
        }

        if dependency_solving {
            return Err(DebRepoError::Validation(
                "dependency_solving: Dependency solving is not yet implemented, it must be false"
                    .into(),
            ));
        }

        let config: Vec<CopyEntry> = serde_json::from_value(config.clone())
            .map_err(|e| DebRepoError::Validation(format!("config: {}", e)))?;

        Ok(ValidatedCopyRequest { config, structured })
    }
}
