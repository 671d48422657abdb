//! Version initialization and finalization.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    content::{ContentType, ContentUnit, StoredContent},
    dedup::remove_duplicates,
    error::{DebRepoError, Result},
    paths::validate_version_paths,
    version::PendingVersion,
};

/// Drops the release files and indices inherited from the base version.
///
/// They are derived from the rest of the content and get regenerated on
/// every publication, so a new version never carries them over.
pub fn initialize_new_version(pending: &mut PendingVersion<'_>) -> Result<()> {
    let removed = pending.remove_types(&ContentType::DERIVED_METADATA)?;
    if removed > 0 {
        debug!(
            "dropped {} derived metadata unit(s) from version {}",
            removed,
            pending.number()
        );
    }
    Ok(())
}

/// Validates the staged content of `pending`.
///
/// Resolves duplicates, then checks publication paths and that no two
/// releases share a distribution. Any error must abort the enclosing
/// transaction.
pub fn finalize_new_version(pending: &mut PendingVersion<'_>) -> Result<()> {
    remove_duplicates(pending)?;

    let content = pending.content()?;
    validate_version_paths(&content)?;
    ensure_unique_distributions(&content)?;

    debug!("version {} passed finalization", pending.number());
    Ok(())
}

/// Fails on the first release whose distribution was already seen.
///
/// `content` is scanned in staging order.
pub fn ensure_unique_distributions(content: &[StoredContent]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in content {
        if let ContentUnit::Release(release) = &item.unit {
            if !seen.insert(release.distribution.as_str()) {
                return Err(DebRepoError::DuplicateDistribution(
                    release.distribution.clone(),
                ));
            }
        }
    }
    Ok(())
}
