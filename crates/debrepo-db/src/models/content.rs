use diesel::prelude::*;
use serde_json::Value;

use crate::schema::content;

/// A stored content unit. `body` holds the type-specific fields as JSON.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = content)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContentRow {
    pub id: i32,
    pub content_type: String,
    pub digest: String,
    pub relative_path: Option<String>,
    pub body: Value,
    pub created: String,
}

#[derive(Insertable)]
#[diesel(table_name = content)]
pub struct NewContent<'a> {
    pub content_type: &'a str,
    pub digest: &'a str,
    pub relative_path: Option<&'a str>,
    pub body: Value,
}
