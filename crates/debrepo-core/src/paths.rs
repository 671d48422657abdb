//! Publication path validation.

use std::collections::BTreeMap;

use crate::{
    content::StoredContent,
    error::{DebRepoError, Result},
};

/// Checks that the publishable units of a version can all be published.
///
/// Two units may not share a path, and no path may be a directory of another
/// (`dists/bionic` next to `dists/bionic/Release`).
pub fn validate_version_paths(content: &[StoredContent]) -> Result<()> {
    let mut paths: BTreeMap<&str, i32> = BTreeMap::new();
    for item in content {
        let Some(path) = item.unit.relative_path() else {
            continue;
        };
        if let Some(&other) = paths.get(path) {
            if other != item.id {
                return Err(DebRepoError::PathCollision {
                    path: path.to_string(),
                });
            }
        }
        paths.insert(path, item.id);
    }

    for path in paths.keys() {
        let mut parents = path.match_indices('/').map(|(i, _)| &path[..i]);
        if let Some(parent) = parents.find(|parent| paths.contains_key(parent)) {
            return Err(DebRepoError::PathOverlap {
                path: path.to_string(),
                parent: parent.to_string(),
            });
        }
    }

    Ok(())
}
