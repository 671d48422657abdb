//! Sync request parameters.
//!
//! Running a sync is left to an external worker; this only validates what a
//! caller asked for.

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{DebRepoError, Result},
    href::remote_id,
    request::{bool_field, object_with_fields},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRequest {
    /// Remote to sync from. Falls back to the repository's remote when unset.
    pub remote: Option<String>,
    /// Make the new version mirror the remote exactly instead of adding to it.
    pub mirror: bool,
    /// Skip reprocessing metadata whose checksum did not change since the last sync.
    pub optimize: bool,
}

impl SyncRequest {
    pub fn from_value(api_root: &str, document: &Value) -> Result<Self> {
        let object = object_with_fields(document, &["remote", "mirror", "optimize"])?;

        let remote = match object.get("remote") {
            None | Some(Value::Null) => None,
            Some(Value::String(href)) => {
                remote_id(api_root, href)?;
                Some(href.clone())
            }
            Some(_) => {
                return Err(DebRepoError::Validation(
                    "remote: Expected an href".into(),
                ))
            }
        };

        Ok(Self {
            remote,
            mirror: bool_field(object, "mirror", false)?,
            optimize: bool_field(object, "optimize", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ROOT: &str = "/debrepo/api/v3/";

    #[test]
    fn test_defaults() {
        let request = SyncRequest::from_value(ROOT, &json!({})).unwrap();
        assert_eq!(
            request,
            SyncRequest {
                remote: None,
                mirror: false,
                optimize: true,
            }
        );
    }

    #[test]
    fn test_explicit_values() {
        let request = SyncRequest::from_value(
            ROOT,
            &json!({
                "remote": "/debrepo/api/v3/remotes/deb/apt/3/",
                "mirror": true,
                "optimize": false,
            }),
        )
        .unwrap();
        assert!(request.mirror);
        assert!(!request.optimize);
        assert_eq!(request.remote.as_deref(), Some("/debrepo/api/v3/remotes/deb/apt/3/"));
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = SyncRequest::from_value(ROOT, &json!({ "skip_types": [] })).unwrap_err();
        assert!(matches!(err, DebRepoError::UnknownFields(_)));

        let err = SyncRequest::from_value(
            ROOT,
            &json!({ "remote": "/debrepo/api/v3/repositories/deb/apt/3/" }),
        )
        .unwrap_err();
        assert!(matches!(err, DebRepoError::Validation(_)));

        assert!(SyncRequest::from_value(ROOT, &json!({ "optimize": 1 })).is_err());
    }
}
