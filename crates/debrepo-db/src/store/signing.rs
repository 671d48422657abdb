//! Signing services and per-distribution overrides.

use diesel::prelude::*;

use crate::{
    models::signing::{
        NewReleaseServiceOverride, NewSigningService, ReleaseServiceOverride, SigningService,
    },
    schema::{release_service_overrides, signing_services},
};

/// Repository for signing service operations.
pub struct SigningServiceStore;

impl SigningServiceStore {
    /// Inserts a signing service and returns its id.
    pub fn insert(conn: &mut SqliteConnection, service: &NewSigningService) -> QueryResult<i32> {
        diesel::insert_into(signing_services::table)
            .values(service)
            .returning(signing_services::id)
            .get_result(conn)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<SigningService>> {
        signing_services::table
            .filter(signing_services::id.eq(id))
            .select(SigningService::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> QueryResult<Option<SigningService>> {
        signing_services::table
            .filter(signing_services::name.eq(name))
            .select(SigningService::as_select())
            .first(conn)
            .optional()
    }

    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<SigningService>> {
        signing_services::table
            .order(signing_services::id.asc())
            .select(SigningService::as_select())
            .load(conn)
    }
}

/// Repository for the per-repository release signing overrides.
pub struct OverrideStore;

impl OverrideStore {
    /// Lists a repository's overrides with their signing services, ordered by distribution.
    pub fn list_with_services(
        conn: &mut SqliteConnection,
        repository_id: i32,
    ) -> QueryResult<Vec<(ReleaseServiceOverride, SigningService)>> {
        release_service_overrides::table
            .inner_join(signing_services::table)
            .filter(release_service_overrides::repository_id.eq(repository_id))
            .order(release_service_overrides::release_distribution.asc())
            .select((
                ReleaseServiceOverride::as_select(),
                SigningService::as_select(),
            ))
            .load(conn)
    }

    /// Finds the override for one distribution of a repository.
    pub fn find(
        conn: &mut SqliteConnection,
        repository_id: i32,
        distribution: &str,
    ) -> QueryResult<Option<ReleaseServiceOverride>> {
        release_service_overrides::table
            .filter(release_service_overrides::repository_id.eq(repository_id))
            .filter(release_service_overrides::release_distribution.eq(distribution))
            .select(ReleaseServiceOverride::as_select())
            .first(conn)
            .optional()
    }

    /// Deletes every override of a repository.
    pub fn delete_for_repository(
        conn: &mut SqliteConnection,
        repository_id: i32,
    ) -> QueryResult<usize> {
        diesel::delete(
            release_service_overrides::table
                .filter(release_service_overrides::repository_id.eq(repository_id)),
        )
        .execute(conn)
    }

    pub fn insert(
        conn: &mut SqliteConnection,
        entry: &NewReleaseServiceOverride,
    ) -> QueryResult<usize> {
        diesel::insert_into(release_service_overrides::table)
            .values(entry)
            .execute(conn)
    }
}
