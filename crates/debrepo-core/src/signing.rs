//! Release signing services and per-distribution overrides.

use std::collections::BTreeMap;

use debrepo_db::{
    models::{
        repository::AptRepository,
        signing::{NewReleaseServiceOverride, NewSigningService, SigningService},
    },
    store::{OverrideStore, SigningServiceStore},
};
use diesel::{Connection, SqliteConnection};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    content::Release,
    error::{DebRepoError, Result},
    href::{signing_service_id, ResourceRef},
};

/// API representation of a signing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningServiceView {
    pub pulp_href: String,
    pub name: String,
    pub public_key: String,
    pub pubkey_fingerprint: String,
    pub script: String,
}

impl SigningServiceView {
    pub fn new(api_root: &str, service: SigningService) -> Self {
        Self {
            pulp_href: ResourceRef::SigningService(service.id).href(api_root),
            name: service.name,
            public_key: service.public_key,
            pubkey_fingerprint: service.pubkey_fingerprint,
            script: service.script,
        }
    }
}

/// Registers a signing service. The script is only recorded, never run here.
pub fn add_signing_service(
    conn: &mut SqliteConnection,
    api_root: &str,
    service: &NewSigningService,
) -> Result<SigningServiceView> {
    for (field, value) in [
        ("name", service.name),
        ("public_key", service.public_key),
        ("pubkey_fingerprint", service.pubkey_fingerprint),
        ("script", service.script),
    ] {
        if value.trim().is_empty() {
            return Err(DebRepoError::Validation(format!(
                "Signing service {} must not be empty",
                field
            )));
        }
    }
    if !service
        .pubkey_fingerprint
        .chars()
        .all(|c| c.is_ascii_hexdigit())
    {
        return Err(DebRepoError::Validation(format!(
            "'{}' is not a hexadecimal key fingerprint",
            service.pubkey_fingerprint
        )));
    }

    conn.transaction(|conn| {
        if SigningServiceStore::find_by_name(conn, service.name)?.is_some() {
            return Err(DebRepoError::Validation(format!(
                "A signing service named '{}' already exists",
                service.name
            )));
        }
        let id = SigningServiceStore::insert(conn, service)?;
        let stored = SigningServiceStore::find_by_id(conn, id)?
            .ok_or_else(|| DebRepoError::not_found("signing service", id.to_string()))?;
        debug!("registered signing service {} ({})", stored.name, id);
        Ok(SigningServiceView::new(api_root, stored))
    })
}

pub fn list_signing_services(
    conn: &mut SqliteConnection,
    api_root: &str,
) -> Result<Vec<SigningServiceView>> {
    Ok(SigningServiceStore::list_all(conn)?
        .into_iter()
        .map(|service| SigningServiceView::new(api_root, service))
        .collect())
}

/// Picks the signing service for `release` in `repository`.
///
/// An override for the release's distribution wins over the repository
/// default. `None` means the release is published unsigned.
pub fn release_signing_service(
    conn: &mut SqliteConnection,
    repository: &AptRepository,
    release: &Release,
) -> Result<Option<SigningService>> {
    let service_id = match OverrideStore::find(conn, repository.id, &release.distribution)? {
        Some(entry) => {
            trace!(
                "distribution {} of repository {} overrides its signing service",
                release.distribution,
                repository.name
            );
            entry.signing_service_id
        }
        None => match repository.signing_service_id {
            Some(id) => id,
            None => return Ok(None),
        },
    };

    SigningServiceStore::find_by_id(conn, service_id)?
        .map(Some)
        .ok_or_else(|| DebRepoError::not_found("signing service", service_id.to_string()))
}

/// Resolves a signing service href to the id of an existing service.
pub(crate) fn resolve_signing_service_href(
    conn: &mut SqliteConnection,
    api_root: &str,
    href: &str,
) -> Result<i32> {
    let id = signing_service_id(api_root, href)?;
    if SigningServiceStore::find_by_id(conn, id)?.is_none() {
        return Err(DebRepoError::Validation(format!(
            "Invalid hyperlink - Object does not exist: '{}'",
            href
        )));
    }
    Ok(id)
}

/// Replaces the signing service overrides of a repository.
///
/// `None` leaves the table untouched; `Some` of an empty map clears it. Every
/// href must name an existing signing service, otherwise nothing changes.
pub fn update_overrides(
    conn: &mut SqliteConnection,
    api_root: &str,
    repository_id: i32,
    overrides: Option<&BTreeMap<String, String>>,
) -> Result<()> {
    let Some(overrides) = overrides else {
        return Ok(());
    };

    conn.transaction(|conn| {
        let removed = OverrideStore::delete_for_repository(conn, repository_id)?;
        for (distribution, href) in overrides {
            let signing_service_id = resolve_signing_service_href(conn, api_root, href)?;
            OverrideStore::insert(
                conn,
                &NewReleaseServiceOverride {
                    repository_id,
                    release_distribution: distribution,
                    signing_service_id,
                },
            )?;
        }
        debug!(
            "replaced {} signing service override(s) of repository {} with {}",
            removed,
            repository_id,
            overrides.len()
        );
        Ok(())
    })
}

/// The overrides of a repository as `{distribution: signing service href}`.
pub fn override_hrefs(
    conn: &mut SqliteConnection,
    api_root: &str,
    repository_id: i32,
) -> Result<BTreeMap<String, String>> {
    Ok(OverrideStore::list_with_services(conn, repository_id)?
        .into_iter()
        .map(|(entry, service)| {
            (
                entry.release_distribution,
                ResourceRef::SigningService(service.id).href(api_root),
            )
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use debrepo_db::models::signing::NewSigningService;
    use diesel::SqliteConnection;

    use super::add_signing_service;

    pub const API_ROOT: &str = "/debrepo/api/v3/";

    /// Registers a signing service and returns its href.
    pub fn signing_service(conn: &mut SqliteConnection, name: &str) -> String {
        add_signing_service(
            conn,
            API_ROOT,
            &NewSigningService {
                name,
                public_key: "-----BEGIN PGP PUBLIC KEY BLOCK-----",
                pubkey_fingerprint: "6EDF301256480B9B801EBA3D05A5E6DA269D9D98",
                script: "/usr/local/bin/sign-release.sh",
            },
        )
        .unwrap()
        .pulp_href
    }
}

#[cfg(test)]
mod tests {
    use debrepo_db::{
        models::repository::AptRepositoryChangeset, store::RepositoryStore, DbConnection,
    };

    use super::{test_support::*, *};
    use crate::{href::ResourceRef, version::test_support::repository};

    fn release(distribution: &str) -> Release {
        Release {
            codename: distribution.into(),
            suite: "stable".into(),
            distribution: distribution.into(),
        }
    }

    fn id_of(href: &str) -> i32 {
        signing_service_id(API_ROOT, href).unwrap()
    }

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_override_wins_over_default() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let default = signing_service(conn, "default");
        let special = signing_service(conn, "bionic-signer");
        let repo_id = repository(conn, "ubuntu");
        RepositoryStore::update(
            conn,
            repo_id,
            &AptRepositoryChangeset {
                signing_service_id: Some(Some(id_of(&default))),
                ..Default::default()
            },
        )
        .unwrap();
        let bionic_only = overrides(&[("bionic", special.as_str())]);
        update_overrides(conn, API_ROOT, repo_id, Some(&bionic_only)).unwrap();

        let repo = RepositoryStore::find_by_id(conn, repo_id).unwrap().unwrap();
        let bionic = release_signing_service(conn, &repo, &release("bionic"))
            .unwrap()
            .unwrap();
        let focal = release_signing_service(conn, &repo, &release("focal"))
            .unwrap()
            .unwrap();
        assert_eq!(bionic.name, "bionic-signer");
        assert_eq!(focal.name, "default");
    }

    #[test]
    fn test_unsigned_without_default() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let repo_id = repository(conn, "ubuntu");
        let repo = RepositoryStore::find_by_id(conn, repo_id).unwrap().unwrap();

        assert!(release_signing_service(conn, &repo, &release("focal"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_none_leaves_overrides_unchanged_and_empty_clears() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let service = signing_service(conn, "signer");
        let repo_id = repository(conn, "ubuntu");
        let initial = overrides(&[("bionic", service.as_str()), ("focal", service.as_str())]);
        update_overrides(conn, API_ROOT, repo_id, Some(&initial)).unwrap();

        let before = OverrideStore::list_with_services(conn, repo_id).unwrap();
        update_overrides(conn, API_ROOT, repo_id, None).unwrap();
        assert_eq!(OverrideStore::list_with_services(conn, repo_id).unwrap(), before);
        assert_eq!(override_hrefs(conn, API_ROOT, repo_id).unwrap(), initial);

        update_overrides(conn, API_ROOT, repo_id, Some(&BTreeMap::new())).unwrap();
        assert!(override_hrefs(conn, API_ROOT, repo_id).unwrap().is_empty());
    }

    #[test]
    fn test_unresolvable_override_changes_nothing() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let service = signing_service(conn, "signer");
        let repo_id = repository(conn, "ubuntu");
        let initial = overrides(&[("focal", service.as_str())]);
        update_overrides(conn, API_ROOT, repo_id, Some(&initial)).unwrap();

        let missing = ResourceRef::SigningService(id_of(&service) + 41).href(API_ROOT);
        let err = update_overrides(
            conn,
            API_ROOT,
            repo_id,
            Some(&overrides(&[("bionic", missing.as_str()), ("focal", service.as_str())])),
        )
        .unwrap_err();
        assert!(matches!(err, DebRepoError::Validation(_)));
        assert_eq!(override_hrefs(conn, API_ROOT, repo_id).unwrap(), initial);

        let wrong_kind = ResourceRef::Repository(repo_id).href(API_ROOT);
        let err = update_overrides(
            conn,
            API_ROOT,
            repo_id,
            Some(&overrides(&[("bionic", wrong_kind.as_str())])),
        )
        .unwrap_err();
        assert!(matches!(err, DebRepoError::Validation(_)));
        assert_eq!(override_hrefs(conn, API_ROOT, repo_id).unwrap(), initial);
    }

    #[test]
    fn test_add_signing_service_validation() {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        signing_service(conn, "signer");

        let duplicate = add_signing_service(
            conn,
            API_ROOT,
            &NewSigningService {
                name: "signer",
                public_key: "key",
                pubkey_fingerprint: "ABCDEF",
                script: "/bin/true",
            },
        );
        assert!(matches!(duplicate, Err(DebRepoError::Validation(_))));

        let bad_fingerprint = add_signing_service(
            conn,
            API_ROOT,
            &NewSigningService {
                name: "other",
                public_key: "key",
                pubkey_fingerprint: "not-hex",
                script: "/bin/true",
            },
        );
        assert!(matches!(bad_fingerprint, Err(DebRepoError::Validation(_))));

        let listed = list_signing_services(conn, API_ROOT).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pulp_href, format!("{API_ROOT}signing-services/1/"));
    }
}
