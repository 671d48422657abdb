//! Version membership ranges.
//!
//! Content never gets copied between versions. Each row says "this unit was
//! added in version `version_added` and, if set, removed in `version_removed`".

use diesel::prelude::*;

use crate::{
    models::{
        content::ContentRow,
        version::{NewRepositoryContent, RepositoryContent},
    },
    schema::{content, repository_content},
};

/// Repository for content membership of repository versions.
pub struct MembershipStore;

impl MembershipStore {
    /// Lists the content of version `number`, in staging order.
    pub fn members_at(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
    ) -> QueryResult<Vec<(RepositoryContent, ContentRow)>> {
        let rows: Vec<(RepositoryContent, ContentRow)> = repository_content::table
            .inner_join(content::table)
            .filter(repository_content::repository_id.eq(repository_id))
            .filter(repository_content::version_added.le(number))
            .order(repository_content::id.asc())
            .select((RepositoryContent::as_select(), ContentRow::as_select()))
            .load(conn)?;

        Ok(rows
            .into_iter()
            .filter(|(membership, _)| membership.is_member_of(number))
            .collect())
    }

    /// Lists the content of version `number` restricted to the given content types.
    pub fn members_of_types(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
        content_types: &[&str],
    ) -> QueryResult<Vec<(RepositoryContent, ContentRow)>> {
        let rows: Vec<(RepositoryContent, ContentRow)> = repository_content::table
            .inner_join(content::table)
            .filter(repository_content::repository_id.eq(repository_id))
            .filter(repository_content::version_added.le(number))
            .filter(content::content_type.eq_any(content_types.to_vec()))
            .order(repository_content::id.asc())
            .select((RepositoryContent::as_select(), ContentRow::as_select()))
            .load(conn)?;

        Ok(rows
            .into_iter()
            .filter(|(membership, _)| membership.is_member_of(number))
            .collect())
    }

    /// Makes `content_id` part of the open version `number`.
    ///
    /// Returns `false` when the unit is already present.
    pub fn add(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
        content_id: i32,
    ) -> QueryResult<bool> {
        if Self::active_row(conn, repository_id, content_id)?.is_some() {
            return Ok(false);
        }

        // Removed earlier in this same version: reopen the range instead of adding a row.
        let reopened = diesel::update(
            repository_content::table
                .filter(repository_content::repository_id.eq(repository_id))
                .filter(repository_content::content_id.eq(content_id))
                .filter(repository_content::version_removed.eq(number)),
        )
        .set(repository_content::version_removed.eq(None::<i32>))
        .execute(conn)?;

        if reopened == 0 {
            diesel::insert_into(repository_content::table)
                .values(NewRepositoryContent {
                    repository_id,
                    content_id,
                    version_added: number,
                })
                .execute(conn)?;
        }

        Ok(true)
    }

    /// Removes `content_id` from the open version `number`.
    ///
    /// A unit that was added in `number` itself leaves no trace. Returns `false`
    /// when the unit is not present.
    pub fn remove(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
        content_id: i32,
    ) -> QueryResult<bool> {
        let Some(row) = Self::active_row(conn, repository_id, content_id)? else {
            return Ok(false);
        };

        if row.version_added == number {
            diesel::delete(repository_content::table.filter(repository_content::id.eq(row.id)))
                .execute(conn)?;
        } else {
            diesel::update(repository_content::table.filter(repository_content::id.eq(row.id)))
                .set(repository_content::version_removed.eq(Some(number)))
                .execute(conn)?;
        }

        Ok(true)
    }

    /// Undoes every membership change made in version `number`.
    pub fn discard(
        conn: &mut SqliteConnection,
        repository_id: i32,
        number: i32,
    ) -> QueryResult<()> {
        diesel::delete(
            repository_content::table
                .filter(repository_content::repository_id.eq(repository_id))
                .filter(repository_content::version_added.eq(number)),
        )
        .execute(conn)?;

        diesel::update(
            repository_content::table
                .filter(repository_content::repository_id.eq(repository_id))
                .filter(repository_content::version_removed.eq(number)),
        )
        .set(repository_content::version_removed.eq(None::<i32>))
        .execute(conn)?;

        Ok(())
    }

    fn active_row(
        conn: &mut SqliteConnection,
        repository_id: i32,
        content_id: i32,
    ) -> QueryResult<Option<RepositoryContent>> {
        repository_content::table
            .filter(repository_content::repository_id.eq(repository_id))
            .filter(repository_content::content_id.eq(content_id))
            .filter(repository_content::version_removed.is_null())
            .select(RepositoryContent::as_select())
            .first(conn)
            .optional()
    }
}
