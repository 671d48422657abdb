//! Repository version rows.

use diesel::{dsl::max, prelude::*};

use crate::{
    models::version::{NewRepositoryVersion, RepositoryVersion},
    schema::repository_versions,
};

/// Repository for repository version rows.
pub struct VersionStore;

impl VersionStore {
    /// Inserts a version row and returns it.
    pub fn insert(
        conn: &mut SqliteConnection,
        version: &NewRepositoryVersion,
    ) -> QueryResult<RepositoryVersion> {
        let id: i32 = diesel::insert_into(repository_versions::table)
            .values(version)
            .returning(repository_versions::id)
            .get_result(conn)?;

        repository_versions::table
            .filter(repository_versions::id.eq(id))
            .select(RepositoryVersion::as_select())
            .first(conn)
    }

    /// Highest version number of a repository, complete or not.
    pub fn max_number(conn: &mut SqliteConnection, repository_id: i32) -> QueryResult<Option<i32>> {
        repository_versions::table
            .filter(repository_versions::repository_id.eq(repository_id))
            .select(max(repository_versions::number))
            .first(conn)
    }

    /// Latest complete version of a repository.
    pub fn latest_complete(
        conn: &mut SqliteConnection,
        repository_id: i32,
    ) -> QueryResult<Option<RepositoryVersion>> {
        repository_versions::table
            .filter(repository_versions::repository_id.eq(repository_id))
            .filter(repository_versions::complete.eq(true))
            .order(repository_versions::number.desc())
            .select(RepositoryVersion::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_number(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
    ) -> QueryResult<Option<RepositoryVersion>> {
        repository_versions::table
            .filter(repository_versions::repository_id.eq(repository_id))
            .filter(repository_versions::number.eq(number))
            .select(RepositoryVersion::as_select())
            .first(conn)
            .optional()
    }

    /// Lists the complete versions of a repository, oldest first.
    pub fn list_complete(
        conn: &mut SqliteConnection,
        repository_id: i32,
    ) -> QueryResult<Vec<RepositoryVersion>> {
        repository_versions::table
            .filter(repository_versions::repository_id.eq(repository_id))
            .filter(repository_versions::complete.eq(true))
            .order(repository_versions::number.asc())
            .select(RepositoryVersion::as_select())
            .load(conn)
    }

    pub fn mark_complete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
        diesel::update(repository_versions::table.filter(repository_versions::id.eq(id)))
            .set(repository_versions::complete.eq(true))
            .execute(conn)
    }

    pub fn delete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(repository_versions::table.filter(repository_versions::id.eq(id)))
            .execute(conn)
    }
}
