use diesel::prelude::*;

use crate::schema::{release_service_overrides, signing_services};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = signing_services)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SigningService {
    pub id: i32,
    pub name: String,
    pub public_key: String,
    pub pubkey_fingerprint: String,
    pub script: String,
}

#[derive(Insertable)]
#[diesel(table_name = signing_services)]
pub struct NewSigningService<'a> {
    pub name: &'a str,
    pub public_key: &'a str,
    pub pubkey_fingerprint: &'a str,
    pub script: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = release_service_overrides)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReleaseServiceOverride {
    pub id: i32,
    pub repository_id: i32,
    pub release_distribution: String,
    pub signing_service_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = release_service_overrides)]
pub struct NewReleaseServiceOverride<'a> {
    pub repository_id: i32,
    pub release_distribution: &'a str,
    pub signing_service_id: i32,
}
