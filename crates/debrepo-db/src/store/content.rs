//! Content-addressed content units.

use diesel::prelude::*;

use crate::{
    models::content::{ContentRow, NewContent},
    schema::content,
};

/// Repository for the append-only content table.
pub struct ContentStore;

impl ContentStore {
    /// Returns the unit with `new.digest`, inserting it first when unknown.
    ///
    /// Units are immutable once stored, so an existing row always wins.
    pub fn get_or_create(conn: &mut SqliteConnection, new: &NewContent) -> QueryResult<ContentRow> {
        diesel::insert_into(content::table)
            .values(new)
            .on_conflict(content::digest)
            .do_nothing()
            .execute(conn)?;

        content::table
            .filter(content::digest.eq(new.digest))
            .select(ContentRow::as_select())
            .first(conn)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<ContentRow>> {
        content::table
            .filter(content::id.eq(id))
            .select(ContentRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_digest(
        conn: &mut SqliteConnection,
        digest: &str,
    ) -> QueryResult<Option<ContentRow>> {
        content::table
            .filter(content::digest.eq(digest))
            .select(ContentRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        content::table.count().get_result(conn)
    }
}
