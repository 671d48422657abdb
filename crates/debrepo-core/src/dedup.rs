//! Duplicate resolution.
//!
//! Within one version, units of the same type whose repo key fields are equal
//! are duplicates. The unit added most recently survives; ties between units
//! added in the same version go to the highest content id.

use std::collections::{hash_map::Entry, HashMap};

use tracing::debug;

use crate::{
    content::{ContentType, StoredContent},
    error::Result,
    version::PendingVersion,
};

/// Ids of the units superseded by a duplicate, in ascending order.
pub fn find_duplicates(content: &[StoredContent]) -> Vec<i32> {
    let mut winners: HashMap<(ContentType, Vec<&str>), &StoredContent> = HashMap::new();
    let mut losers = Vec::new();

    for item in content {
        match winners.entry((item.content_type(), item.unit.repo_key())) {
            Entry::Vacant(entry) => {
                entry.insert(item);
            }
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if (item.version_added, item.id) > (current.version_added, current.id) {
                    losers.push(current.id);
                    entry.insert(item);
                } else {
                    losers.push(item.id);
                }
            }
        }
    }

    losers.sort_unstable();
    losers
}

/// Removes superseded duplicates from the pending version.
pub fn remove_duplicates(pending: &mut PendingVersion<'_>) -> Result<usize> {
    let content = pending.content()?;
    let losers = find_duplicates(&content);
    if losers.is_empty() {
        return Ok(0);
    }

    debug!(
        "removing {} duplicate unit(s) from version {}",
        losers.len(),
        pending.number()
    );
    pending.remove_content(&losers)
}
