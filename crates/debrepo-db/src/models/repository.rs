use diesel::prelude::*;

use crate::schema::repositories;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = repositories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AptRepository {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub signing_service_id: Option<i32>,
    pub created: String,
}

#[derive(Insertable)]
#[diesel(table_name = repositories)]
pub struct NewAptRepository<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub signing_service_id: Option<i32>,
}

/// Partial update of a repository row.
///
/// `None` leaves a column untouched, `Some(None)` clears a nullable column.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = repositories)]
pub struct AptRepositoryChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub signing_service_id: Option<Option<i32>>,
}

impl AptRepositoryChangeset<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.signing_service_id.is_none()
    }
}
