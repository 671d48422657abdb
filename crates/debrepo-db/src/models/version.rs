use diesel::prelude::*;

use crate::schema::{repository_content, repository_versions};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = repository_versions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RepositoryVersion {
    pub id: i32,
    pub repository_id: i32,
    pub number: i32,
    pub complete: bool,
    pub created: String,
}

#[derive(Insertable)]
#[diesel(table_name = repository_versions)]
pub struct NewRepositoryVersion {
    pub repository_id: i32,
    pub number: i32,
    pub complete: bool,
}

/// Membership of a content unit in a range of versions of one repository.
///
/// The unit belongs to version `n` iff `version_added <= n` and
/// `version_removed` is unset or greater than `n`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = repository_content)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RepositoryContent {
    pub id: i32,
    pub repository_id: i32,
    pub content_id: i32,
    pub version_added: i32,
    pub version_removed: Option<i32>,
}

impl RepositoryContent {
    pub fn is_member_of(&self, number: i32) -> bool {
        self.version_added <= number && self.version_removed.is_none_or(|removed| removed > number)
    }
}

#[derive(Insertable)]
#[diesel(table_name = repository_content)]
pub struct NewRepositoryContent {
    pub repository_id: i32,
    pub content_id: i32,
    pub version_added: i32,
}
