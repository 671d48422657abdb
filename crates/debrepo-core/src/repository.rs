//! APT repositories: creation, partial updates and their API representation.

use std::collections::BTreeMap;

use debrepo_db::{
    models::{
        repository::{AptRepository, AptRepositoryChangeset, NewAptRepository},
        version::{NewRepositoryVersion, RepositoryVersion},
    },
    store::{RepositoryStore, VersionStore},
};
use diesel::{Connection, SqliteConnection};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::{
    error::{DebRepoError, Result},
    href::{repository_id, ResourceRef},
    signing::{override_hrefs, resolve_signing_service_href, update_overrides},
    version::version_content,
};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Href of the default release signing service.
    #[serde(default)]
    pub signing_service: Option<String>,
    /// `{distribution: signing service href}`.
    #[serde(default)]
    pub signing_service_release_overrides: Option<BTreeMap<String, String>>,
}

/// Partial update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub signing_service: Option<Option<String>>,
    #[serde(default)]
    pub signing_service_release_overrides: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryView {
    pub pulp_href: String,
    pub pulp_created: String,
    pub name: String,
    pub description: Option<String>,
    pub versions_href: String,
    pub latest_version_href: Option<String>,
    pub signing_service: Option<String>,
    pub signing_service_release_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionView {
    pub pulp_href: String,
    pub pulp_created: String,
    pub number: i32,
    pub repository: String,
    /// Number of units per content type.
    pub content_summary: BTreeMap<String, usize>,
}

/// Creates the empty version 0 every repository starts with.
pub(crate) fn create_initial_version(
    conn: &mut SqliteConnection,
    repository_id: i32,
) -> Result<RepositoryVersion> {
    Ok(VersionStore::insert(
        conn,
        &NewRepositoryVersion {
            repository_id,
            number: 0,
            complete: true,
        },
    )?)
}

fn ensure_name_available(
    conn: &mut SqliteConnection,
    name: &str,
    current: Option<i32>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DebRepoError::Validation(
            "Repository name must not be empty".into(),
        ));
    }
    match RepositoryStore::find_by_name(conn, name)? {
        Some(existing) if Some(existing.id) != current => Err(DebRepoError::Validation(format!(
            "A repository named '{}' already exists",
            name
        ))),
        _ => Ok(()),
    }
}

/// Creates a repository together with its version 0 and overrides.
///
/// If any override fails to resolve no repository is created.
pub fn create_repository(
    conn: &mut SqliteConnection,
    api_root: &str,
    request: &RepositoryCreate,
) -> Result<RepositoryView> {
    conn.transaction(|conn| {
        ensure_name_available(conn, &request.name, None)?;
        let signing_service_id = request
            .signing_service
            .as_deref()
            .map(|href| resolve_signing_service_href(conn, api_root, href))
            .transpose()?;

        let id = RepositoryStore::insert(
            conn,
            &NewAptRepository {
                name: &request.name,
                description: request.description.as_deref(),
                signing_service_id,
            },
        )?;
        create_initial_version(conn, id)?;
        update_overrides(
            conn,
            api_root,
            id,
            request.signing_service_release_overrides.as_ref(),
        )?;

        info!("created repository {} ({})", request.name, id);
        repository_view(conn, api_root, id)
    })
}

/// Applies a partial update. Overrides and fields change together or not at all.
pub fn update_repository(
    conn: &mut SqliteConnection,
    api_root: &str,
    id: i32,
    request: &RepositoryUpdate,
) -> Result<RepositoryView> {
    conn.transaction(|conn| {
        if RepositoryStore::find_by_id(conn, id)?.is_none() {
            return Err(DebRepoError::not_found("repository", id.to_string()));
        }

        update_overrides(
            conn,
            api_root,
            id,
            request.signing_service_release_overrides.as_ref(),
        )?;

        if let Some(name) = &request.name {
            ensure_name_available(conn, name, Some(id))?;
        }
        let signing_service_id = match &request.signing_service {
            Some(Some(href)) => Some(Some(resolve_signing_service_href(conn, api_root, href)?)),
            Some(None) => Some(None),
            None => None,
        };

        let changes = AptRepositoryChangeset {
            name: request.name.as_deref(),
            description: request.description.as_ref().map(|d| d.as_deref()),
            signing_service_id,
        };
        RepositoryStore::update(conn, id, &changes)?;

        info!("updated repository {}", id);
        repository_view(conn, api_root, id)
    })
}

/// Finds a repository by href or by name.
pub fn lookup_repository(
    conn: &mut SqliteConnection,
    api_root: &str,
    reference: &str,
) -> Result<AptRepository> {
    let found = if reference.starts_with(api_root) {
        RepositoryStore::find_by_id(conn, repository_id(api_root, reference)?)?
    } else {
        RepositoryStore::find_by_name(conn, reference)?
    };
    found.ok_or_else(|| DebRepoError::not_found("repository", reference))
}

pub fn repository_view(
    conn: &mut SqliteConnection,
    api_root: &str,
    id: i32,
) -> Result<RepositoryView> {
    let repo = RepositoryStore::find_by_id(conn, id)?
        .ok_or_else(|| DebRepoError::not_found("repository", id.to_string()))?;
    let latest = VersionStore::latest_complete(conn, id)?;
    let overrides = override_hrefs(conn, api_root, id)?;

    let pulp_href = ResourceRef::Repository(id).href(api_root);
    Ok(RepositoryView {
        versions_href: format!("{pulp_href}versions/"),
        pulp_href,
        pulp_created: repo.created,
        name: repo.name,
        description: repo.description,
        latest_version_href: latest.map(|v| {
            ResourceRef::RepositoryVersion {
                repository_id: id,
                number: v.number,
            }
            .href(api_root)
        }),
        signing_service: repo
            .signing_service_id
            .map(|service| ResourceRef::SigningService(service).href(api_root)),
        signing_service_release_overrides: overrides,
    })
}

pub fn list_repositories(
    conn: &mut SqliteConnection,
    api_root: &str,
) -> Result<Vec<RepositoryView>> {
    RepositoryStore::list_all(conn)?
        .into_iter()
        .map(|repo| repository_view(conn, api_root, repo.id))
        .collect()
}

pub fn version_view(
    conn: &mut SqliteConnection,
    api_root: &str,
    version: &RepositoryVersion,
) -> Result<VersionView> {
    let mut content_summary = BTreeMap::new();
    for item in version_content(conn, version.repository_id, version.number)? {
        *content_summary
            .entry(item.content_type().as_str().to_string())
            .or_insert(0) += 1;
    }

    Ok(VersionView {
        pulp_href: ResourceRef::RepositoryVersion {
            repository_id: version.repository_id,
            number: version.number,
        }
        .href(api_root),
        pulp_created: version.created.clone(),
        number: version.number,
        repository: ResourceRef::Repository(version.repository_id).href(api_root),
        content_summary,
    })
}

/// Complete versions of a repository, oldest first.
pub fn list_versions(
    conn: &mut SqliteConnection,
    api_root: &str,
    repository_id: i32,
) -> Result<Vec<VersionView>> {
    VersionStore::list_complete(conn, repository_id)?
        .iter()
        .map(|version| version_view(conn, api_root, version))
        .collect()
}
