//! Pending repository versions.
//!
//! A new version is staged on top of the latest complete version and sealed at
//! the end of a single transaction. [`create_version`] is the only way callers
//! produce versions; it brackets their staging with the initialize and
//! finalize steps of [`crate::finalize`].

use std::collections::BTreeSet;

use debrepo_db::{
    models::version::{NewRepositoryVersion, RepositoryVersion},
    store::{MembershipStore, RepositoryStore, VersionStore},
};
use diesel::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

use crate::{
    content::{store_unit, ContentType, ContentUnit, StoredContent},
    error::{DebRepoError, Result},
    finalize::{finalize_new_version, initialize_new_version},
};

/// Mutable staging area for the next version of one repository.
pub struct PendingVersion<'c> {
    conn: &'c mut SqliteConnection,
    repository_id: i32,
    version: RepositoryVersion,
    base_number: i32,
    /// Latest complete version when the pending one was opened.
    previous_number: i32,
}

impl<'c> PendingVersion<'c> {
    /// Opens the next version of `repository_id`, based on its latest complete version.
    pub fn open(conn: &'c mut SqliteConnection, repository_id: i32) -> Result<Self> {
        if RepositoryStore::find_by_id(conn, repository_id)?.is_none() {
            return Err(DebRepoError::not_found("repository", repository_id.to_string()));
        }

        let base = VersionStore::latest_complete(conn, repository_id)?.ok_or_else(|| {
            DebRepoError::Custom(format!("repository {} has no versions", repository_id))
        })?;
        let next = VersionStore::max_number(conn, repository_id)?.unwrap_or(base.number) + 1;
        if next != base.number + 1 {
            return Err(DebRepoError::Custom(format!(
                "repository {} already has a version in progress",
                repository_id
            )));
        }

        let version = VersionStore::insert(
            conn,
            &NewRepositoryVersion {
                repository_id,
                number: next,
                complete: false,
            },
        )?;
        debug!(
            "opened version {} of repository {} on top of {}",
            next, repository_id, base.number
        );

        Ok(Self {
            conn,
            repository_id,
            version,
            base_number: base.number,
            previous_number: base.number,
        })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.conn
    }

    pub fn repository_id(&self) -> i32 {
        self.repository_id
    }

    pub fn number(&self) -> i32 {
        self.version.number
    }

    /// Version the pending set is compared against.
    pub fn base_number(&self) -> i32 {
        self.base_number
    }

    /// Current content of the pending version, in staging order.
    pub fn content(&mut self) -> Result<Vec<StoredContent>> {
        MembershipStore::members_at(self.conn, self.repository_id, self.version.number)?
            .iter()
            .map(|(membership, row)| StoredContent::from_rows(membership, row))
            .collect()
    }

    /// Current content of the given types, in staging order.
    pub fn content_of_type(&mut self, types: &[ContentType]) -> Result<Vec<StoredContent>> {
        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        MembershipStore::members_of_types(
            self.conn,
            self.repository_id,
            self.version.number,
            &names,
        )?
        .iter()
        .map(|(membership, row)| StoredContent::from_rows(membership, row))
        .collect()
    }

    /// Stores `units` and adds them. Returns their content ids.
    pub fn add_units(&mut self, units: &[ContentUnit]) -> Result<Vec<i32>> {
        let mut ids = Vec::with_capacity(units.len());
        for unit in units {
            let row = store_unit(self.conn, unit)?;
            MembershipStore::add(self.conn, self.repository_id, self.version.number, row.id)?;
            ids.push(row.id);
        }
        Ok(ids)
    }

    /// Adds already stored content. Returns how many units were not yet present.
    pub fn add_content(&mut self, content_ids: &[i32]) -> Result<usize> {
        let mut added = 0;
        for &id in content_ids {
            if MembershipStore::add(self.conn, self.repository_id, self.version.number, id)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Removes content. Returns how many units were present.
    pub fn remove_content(&mut self, content_ids: &[i32]) -> Result<usize> {
        let mut removed = 0;
        for &id in content_ids {
            if MembershipStore::remove(self.conn, self.repository_id, self.version.number, id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes every unit of the given types.
    pub fn remove_types(&mut self, types: &[ContentType]) -> Result<usize> {
        let ids: Vec<i32> = self
            .content_of_type(types)?
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.remove_content(&ids)
    }

    /// Content ids present now but not in the base version.
    pub fn added(&mut self) -> Result<Vec<i32>> {
        let base = self.ids_at(self.base_number)?;
        let current = self.ids_at(self.version.number)?;
        Ok(current.difference(&base).copied().collect())
    }

    /// Content ids present in the base version but not anymore.
    pub fn removed(&mut self) -> Result<Vec<i32>> {
        let base = self.ids_at(self.base_number)?;
        let current = self.ids_at(self.version.number)?;
        Ok(base.difference(&current).copied().collect())
    }

    /// Replaces the pending content with the content of complete version `number`.
    ///
    /// Release files and indices of that version are not taken over.
    pub fn reset_to_base(&mut self, number: i32) -> Result<()> {
        let found = VersionStore::find_by_number(self.conn, self.repository_id, number)?;
        if !found.is_some_and(|v| v.complete) {
            return Err(DebRepoError::Validation(format!(
                "Version {} of repository {} does not exist",
                number, self.repository_id
            )));
        }

        let target = self.ids_at(number)?;
        let current = self.ids_at(self.version.number)?;
        let stale: Vec<i32> = current.difference(&target).copied().collect();
        let missing: Vec<i32> = target.difference(&current).copied().collect();
        self.remove_content(&stale)?;
        self.add_content(&missing)?;
        self.remove_types(&ContentType::DERIVED_METADATA)?;
        self.base_number = number;

        debug!(
            "rebased version {} of repository {} on {}",
            self.version.number, self.repository_id, number
        );
        Ok(())
    }

    /// Whether the pending content differs from the latest complete version.
    ///
    /// A rebased version is compared against the version it follows, not
    /// against its base.
    pub fn has_changes(&mut self) -> Result<bool> {
        Ok(self.ids_at(self.previous_number)? != self.ids_at(self.version.number)?)
    }

    /// Makes the version visible.
    pub fn seal(self) -> Result<RepositoryVersion> {
        VersionStore::mark_complete(self.conn, self.version.id)?;
        info!(
            "created version {} of repository {}",
            self.version.number, self.repository_id
        );
        Ok(RepositoryVersion {
            complete: true,
            ..self.version
        })
    }

    /// Drops the pending version and every membership change staged in it.
    pub fn discard(self) -> Result<()> {
        MembershipStore::discard(self.conn, self.repository_id, self.version.number)?;
        VersionStore::delete(self.conn, self.version.id)?;
        Ok(())
    }

    fn ids_at(&mut self, number: i32) -> Result<BTreeSet<i32>> {
        Ok(
            MembershipStore::members_at(self.conn, self.repository_id, number)?
                .into_iter()
                .map(|(_, row)| row.id)
                .collect(),
        )
    }
}

/// Creates the next version of `repository_id` from the changes made by `stage`.
///
/// Runs in one transaction: derived metadata is dropped, `stage` runs, then the
/// version is finalized and sealed. Any error leaves the repository untouched.
/// A version without changes is discarded and the latest version is returned.
pub fn create_version<F>(
    conn: &mut SqliteConnection,
    repository_id: i32,
    stage: F,
) -> Result<RepositoryVersion>
where
    F: FnOnce(&mut PendingVersion<'_>) -> Result<()>,
{
    create_version_on(conn, repository_id, None, stage)
}

/// Like [`create_version`], with the pending content first reset to complete
/// version `base` when one is given.
pub fn create_version_on<F>(
    conn: &mut SqliteConnection,
    repository_id: i32,
    base: Option<i32>,
    stage: F,
) -> Result<RepositoryVersion>
where
    F: FnOnce(&mut PendingVersion<'_>) -> Result<()>,
{
    conn.transaction(|conn| {
        let mut pending = PendingVersion::open(conn, repository_id)?;
        if let Some(base) = base {
            pending.reset_to_base(base)?;
        }
        initialize_new_version(&mut pending)?;
        stage(&mut pending)?;
        finalize_new_version(&mut pending)?;

        if pending.has_changes()? {
            return pending.seal();
        }

        let number = pending.number();
        pending.discard()?;
        warn!(
            "version {} of repository {} has no changes, discarding it",
            number, repository_id
        );
        VersionStore::latest_complete(conn, repository_id)?
            .ok_or_else(|| DebRepoError::not_found("repository version", repository_id.to_string()))
    })
}

/// Content of a complete version.
pub fn version_content(
    conn: &mut SqliteConnection,
    repository_id: i32,
    number: i32,
) -> Result<Vec<StoredContent>> {
    let version = VersionStore::find_by_number(conn, repository_id, number)?
        .filter(|v| v.complete)
        .ok_or_else(|| {
            DebRepoError::not_found(
                "repository version",
                format!("{}/versions/{}", repository_id, number),
            )
        })?;

    MembershipStore::members_at(conn, repository_id, version.number)?
        .iter()
        .map(|(membership, row)| StoredContent::from_rows(membership, row))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use debrepo_db::{models::repository::NewAptRepository, store::RepositoryStore};
    use diesel::SqliteConnection;

    use crate::{
        content::ContentUnit,
        error::Result,
        version::{create_version, version_content},
    };

    /// Creates an empty repository with version 0.
    pub fn repository(conn: &mut SqliteConnection, name: &str) -> i32 {
        let id = RepositoryStore::insert(
            conn,
            &NewAptRepository {
                name,
                description: None,
                signing_service_id: None,
            },
        )
        .unwrap();
        crate::repository::create_initial_version(conn, id).unwrap();
        id
    }

    pub fn add(conn: &mut SqliteConnection, repo: i32, units: &[ContentUnit]) -> Result<i32> {
        let units = units.to_vec();
        create_version(conn, repo, move |pending| {
            pending.add_units(&units)?;
            Ok(())
        })
        .map(|v| v.number)
    }

    pub fn units_at(conn: &mut SqliteConnection, repo: i32, number: i32) -> Vec<ContentUnit> {
        version_content(conn, repo, number)
            .unwrap()
            .into_iter()
            .map(|c| c.unit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use debrepo_db::DbConnection;

    use super::{test_support::*, *};
    use crate::content::fixtures::*;

    #[test]
    fn test_create_version_numbers_increase() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");

        assert_eq!(add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap(), 1);
        assert_eq!(add(conn, repo, &[package("curl", "8.5", "amd64")]).unwrap(), 2);
        assert_eq!(units_at(conn, repo, 1).len(), 1);
        assert_eq!(units_at(conn, repo, 2).len(), 2);
    }

    #[test]
    fn test_unchanged_version_is_discarded() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap();

        let version = create_version(conn, repo, |_| Ok(())).unwrap();
        assert_eq!(version.number, 1);
        assert_eq!(VersionStore::max_number(conn, repo).unwrap(), Some(1));
    }

    #[test]
    fn test_failed_staging_persists_nothing() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");

        let result = create_version(conn, repo, |pending| {
            pending.add_units(&[package("hello", "2.10", "amd64")])?;
            Err(DebRepoError::Validation("rejected".into()))
        });
        assert!(result.is_err());
        assert_eq!(VersionStore::max_number(conn, repo).unwrap(), Some(0));
        assert!(units_at(conn, repo, 0).is_empty());
    }

    #[test]
    fn test_added_and_removed_are_relative_to_base() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap();

        create_version(conn, repo, |pending| {
            let old: Vec<i32> = pending.content()?.iter().map(|c| c.id).collect();
            let new = pending.add_units(&[package("curl", "8.5", "amd64")])?;
            pending.remove_content(&old)?;

            assert_eq!(pending.added()?, new);
            assert_eq!(pending.removed()?, old);

            // Added and removed again in the same version: leaves no trace.
            pending.remove_content(&new)?;
            assert!(pending.added()?.is_empty());
            Ok(())
        })
        .unwrap();

        assert!(units_at(conn, repo, 2).is_empty());
    }

    #[test]
    fn test_reset_to_base() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap();
        add(conn, repo, &[package("curl", "8.5", "amd64")]).unwrap();

        let version = create_version(conn, repo, |pending| {
            pending.reset_to_base(0)?;
            assert_eq!(pending.base_number(), 0);
            pending.add_units(&[generic("README")])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(version.number, 3);
        assert_eq!(units_at(conn, repo, 3), vec![generic("README")]);
        // Older versions are untouched.
        assert_eq!(units_at(conn, repo, 2).len(), 2);

        let missing = create_version(conn, repo, |pending| pending.reset_to_base(42));
        assert!(matches!(missing, Err(DebRepoError::Validation(_))));
    }

    #[test]
    fn test_rebase_drops_release_files_of_base() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64"), release_file("bionic")]).unwrap();
        add(conn, repo, &[package("curl", "8.5", "amd64")]).unwrap();

        // Rebasing inside the staging closure, after initialization.
        let version = create_version(conn, repo, |pending| {
            pending.reset_to_base(1)?;
            pending.add_units(&[generic("README")])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            units_at(conn, repo, version.number),
            vec![package("hello", "2.10", "amd64"), generic("README")]
        );

        // Rebasing before initialization.
        let version = create_version_on(conn, repo, Some(1), |pending| {
            pending.add_units(&[generic("NEWS")])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            units_at(conn, repo, version.number),
            vec![package("hello", "2.10", "amd64"), generic("NEWS")]
        );
    }

    #[test]
    fn test_rebase_onto_older_content_creates_version() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap();
        add(conn, repo, &[package("curl", "8.5", "amd64")]).unwrap();

        let version = create_version(conn, repo, |pending| {
            pending.reset_to_base(1)?;
            pending.add_units(&[package("hello", "2.10", "amd64")])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(version.number, 3);
        assert_eq!(units_at(conn, repo, 3), vec![package("hello", "2.10", "amd64")]);
        assert_eq!(units_at(conn, repo, 2).len(), 2);
    }

    #[test]
    fn test_rebase_matching_latest_is_discarded() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = repository(conn, "ubuntu");
        add(conn, repo, &[package("hello", "2.10", "amd64")]).unwrap();
        add(conn, repo, &[package("curl", "8.5", "amd64")]).unwrap();

        let version = create_version_on(conn, repo, Some(1), |pending| {
            pending.add_units(&[package("curl", "8.5", "amd64")])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(version.number, 2);
        assert_eq!(VersionStore::max_number(conn, repo).unwrap(), Some(2));
    }

    #[test]
    fn test_unknown_repository() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let result = create_version(db.conn(), 99, |_| Ok(()));
        assert!(matches!(
            result,
            Err(DebRepoError::ResourceNotFound { kind: "repository", .. })
        ));
    }
}
