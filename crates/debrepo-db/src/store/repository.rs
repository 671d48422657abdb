//! APT repository rows.

use diesel::prelude::*;

use crate::{
    models::repository::{AptRepository, AptRepositoryChangeset, NewAptRepository},
    schema::repositories,
};

/// Repository for APT repository rows.
pub struct RepositoryStore;

impl RepositoryStore {
    /// Inserts a repository and returns its id.
    pub fn insert(conn: &mut SqliteConnection, repo: &NewAptRepository) -> QueryResult<i32> {
        diesel::insert_into(repositories::table)
            .values(repo)
            .returning(repositories::id)
            .get_result(conn)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<AptRepository>> {
        repositories::table
            .filter(repositories::id.eq(id))
            .select(AptRepository::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> QueryResult<Option<AptRepository>> {
        repositories::table
            .filter(repositories::name.eq(name))
            .select(AptRepository::as_select())
            .first(conn)
            .optional()
    }

    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<AptRepository>> {
        repositories::table
            .order(repositories::name.asc())
            .select(AptRepository::as_select())
            .load(conn)
    }

    /// Applies a partial update. An empty changeset is a no-op.
    pub fn update(
        conn: &mut SqliteConnection,
        id: i32,
        changes: &AptRepositoryChangeset,
    ) -> QueryResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        diesel::update(repositories::table.filter(repositories::id.eq(id)))
            .set(changes)
            .execute(conn)
    }
}
