use std::collections::{BTreeSet, HashSet};

use debrepo_db::models::version::RepositoryVersion;
use diesel::SqliteConnection;
use tracing::{debug, info};

use super::validate::{CopyEntry, ValidatedCopyRequest};
use crate::{
    content::{ContentUnit, StoredContent},
    error::{DebRepoError, Result},
    href::{content_id, repository_id, repository_version},
    version::{create_version_on, version_content},
};

/// Runs a validated copy request, one new destination version per entry.
///
/// Each entry is its own transaction: a failing entry leaves the versions
/// created by earlier entries in place.
pub fn copy_content(
    conn: &mut SqliteConnection,
    api_root: &str,
    request: &ValidatedCopyRequest,
) -> Result<Vec<RepositoryVersion>> {
    let mut versions = Vec::with_capacity(request.config.len());
    for entry in &request.config {
        versions.push(copy_entry(conn, api_root, entry, request.structured)?);
    }
    Ok(versions)
}

fn copy_entry(
    conn: &mut SqliteConnection,
    api_root: &str,
    entry: &CopyEntry,
    structured: bool,
) -> Result<RepositoryVersion> {
    let (source_repo, source_number) = repository_version(api_root, &entry.source_repo_version)?;
    let dest_repo = repository_id(api_root, &entry.dest_repo)?;
    let source = version_content(conn, source_repo, source_number)?;

    let mut selected = match &entry.content {
        Some(hrefs) => select_listed(api_root, &source, hrefs, &entry.source_repo_version)?,
        None => source.iter().map(|c| c.id).collect(),
    };
    if structured {
        for id in release_structure(&source, &selected) {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
    }

    debug!(
        "copying {} unit(s) from {} into {}",
        selected.len(),
        entry.source_repo_version,
        entry.dest_repo
    );

    let version = create_version_on(conn, dest_repo, entry.dest_base_version, |pending| {
        pending.add_content(&selected)?;
        Ok(())
    })?;

    info!("copied into version {} of {}", version.number, entry.dest_repo);
    Ok(version)
}

/// Resolves content hrefs against the source version, keeping their order.
fn select_listed(
    api_root: &str,
    source: &[StoredContent],
    hrefs: &[String],
    source_href: &str,
) -> Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(hrefs.len());
    for href in hrefs {
        let (content_type, id) = content_id(api_root, href)?;
        let present = source
            .iter()
            .any(|c| c.id == id && c.content_type() == content_type);
        if !present {
            return Err(DebRepoError::Validation(format!(
                "Content '{}' is not part of '{}'",
                href, source_href
            )));
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Release structure of the selected packages, taken from the source version.
///
/// That is the package/component associations of the packages, their
/// components, the releases of those distributions and the release
/// architectures matching the packages (`all` included).
fn release_structure(source: &[StoredContent], selected: &[i32]) -> Vec<i32> {
    let selected: HashSet<i32> = selected.iter().copied().collect();

    let mut package_digests = HashSet::new();
    let mut architectures: BTreeSet<&str> = BTreeSet::from(["all"]);
    for item in source.iter().filter(|c| selected.contains(&c.id)) {
        if let ContentUnit::Package(package) = &item.unit {
            package_digests.insert(item.digest.as_str());
            architectures.insert(&package.architecture);
        }
    }
    if package_digests.is_empty() {
        return Vec::new();
    }

    let mut structure = Vec::new();
    let mut component_digests = HashSet::new();
    for item in source {
        if let ContentUnit::PackageReleaseComponent(prc) = &item.unit {
            if package_digests.contains(prc.package.as_str()) {
                structure.push(item.id);
                component_digests.insert(prc.release_component.as_str());
            }
        }
    }

    let mut distributions = HashSet::new();
    for item in source {
        if let ContentUnit::ReleaseComponent(component) = &item.unit {
            if component_digests.contains(item.digest.as_str()) {
                structure.push(item.id);
                distributions.insert(component.distribution.as_str());
            }
        }
    }

    for item in source {
        let wanted = match &item.unit {
            ContentUnit::Release(release) => distributions.contains(release.distribution.as_str()),
            ContentUnit::ReleaseArchitecture(arch) => {
                distributions.contains(arch.distribution.as_str())
                    && architectures.contains(arch.architecture.as_str())
            }
            _ => false,
        };
        if wanted {
            structure.push(item.id);
        }
    }

    structure
}

#[cfg(test)]
mod tests {
    use debrepo_db::DbConnection;
    use serde_json::json;

    use super::*;
    use crate::{
        content::{fixtures::*, ContentType},
        copy::CopyRequest,
        href::ResourceRef,
        signing::test_support::API_ROOT,
        version::test_support::{add, repository, units_at},
    };

    struct Fixture {
        db: DbConnection,
        source: i32,
        dest: i32,
    }

    /// Source repository with one structured package and a loose one.
    fn fixture() -> Fixture {
        let mut db = DbConnection::open_in_memory().unwrap();
        let conn = db.conn();
        let source = repository(conn, "source");
        let dest = repository(conn, "dest");

        let hello = package("hello", "2.10", "amd64");
        let main = component("bionic", "main");
        add(
            conn,
            source,
            &[
                hello.clone(),
                package("curl", "8.5", "arm64"),
                main.clone(),
                link(&hello, &main),
                release("bionic"),
                architecture("bionic", "amd64"),
                architecture("bionic", "arm64"),
                architecture("bionic", "all"),
                release("focal"),
                release_file("bionic"),
            ],
        )
        .unwrap();

        Fixture { db, source, dest }
    }

    fn version_href(repo: i32, number: i32) -> String {
        ResourceRef::RepositoryVersion {
            repository_id: repo,
            number,
        }
        .href(API_ROOT)
    }

    fn content_href(conn: &mut SqliteConnection, repo: i32, unit: &ContentUnit) -> String {
        let id = version_content(conn, repo, 1)
            .unwrap()
            .into_iter()
            .find(|c| &c.unit == unit)
            .unwrap()
            .id;
        ResourceRef::Content {
            content_type: unit.content_type(),
            id,
        }
        .href(API_ROOT)
    }

    fn request(value: serde_json::Value) -> ValidatedCopyRequest {
        CopyRequest::validate(&value).unwrap()
    }

    #[test]
    fn test_structured_copy_carries_release_structure() {
        let mut f = fixture();
        let conn = f.db.conn();
        let hello = package("hello", "2.10", "amd64");
        let href = content_href(conn, f.source, &hello);

        let versions = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "content": [href],
                }],
            })),
        )
        .unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].number, 1);

        let main = component("bionic", "main");
        assert_eq!(
            units_at(conn, f.dest, 1),
            vec![
                hello.clone(),
                link(&hello, &main),
                main,
                release("bionic"),
                architecture("bionic", "amd64"),
                architecture("bionic", "all"),
            ]
        );
    }

    #[test]
    fn test_unstructured_copy_takes_only_listed_content() {
        let mut f = fixture();
        let conn = f.db.conn();
        let hello = package("hello", "2.10", "amd64");
        let href = content_href(conn, f.source, &hello);

        copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "content": [href],
                }],
                "structured": false,
            })),
        )
        .unwrap();

        assert_eq!(units_at(conn, f.dest, 1), vec![hello]);
    }

    #[test]
    fn test_copy_everything() {
        let mut f = fixture();
        let conn = f.db.conn();

        copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                }],
            })),
        )
        .unwrap();

        assert_eq!(units_at(conn, f.dest, 1), units_at(conn, f.source, 1));
    }

    #[test]
    fn test_content_outside_source_is_rejected() {
        let mut f = fixture();
        let conn = f.db.conn();
        add(conn, f.dest, &[generic("README")]).unwrap();
        let foreign = ResourceRef::Content {
            content_type: ContentType::Generic,
            id: units_at_ids(conn, f.dest, 1)[0],
        }
        .href(API_ROOT);

        let err = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "content": [foreign],
                }],
            })),
        )
        .unwrap_err();
        assert!(matches!(err, DebRepoError::Validation(_)));
        assert_eq!(units_at(conn, f.dest, 1), vec![generic("README")]);
    }

    #[test]
    fn test_dest_base_version() {
        let mut f = fixture();
        let conn = f.db.conn();
        add(conn, f.dest, &[generic("README")]).unwrap();
        let curl = package("curl", "8.5", "arm64");
        let href = content_href(conn, f.source, &curl);

        let versions = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "dest_base_version": 0,
                    "content": [href],
                }],
                "structured": false,
            })),
        )
        .unwrap();

        assert_eq!(versions[0].number, 2);
        assert_eq!(units_at(conn, f.dest, 2), vec![curl]);
    }

    #[test]
    fn test_dest_base_version_leaves_its_release_files_behind() {
        let mut f = fixture();
        let conn = f.db.conn();
        add(conn, f.dest, &[generic("README"), release_file("focal")]).unwrap();
        add(conn, f.dest, &[generic("NEWS")]).unwrap();
        let curl = package("curl", "8.5", "arm64");
        let href = content_href(conn, f.source, &curl);

        let versions = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "dest_base_version": 1,
                    "content": [href],
                }],
                "structured": false,
            })),
        )
        .unwrap();

        assert_eq!(versions[0].number, 3);
        assert_eq!(units_at(conn, f.dest, 3), vec![generic("README"), curl]);
    }

    #[test]
    fn test_dest_base_version_equal_to_result_still_creates_version() {
        let mut f = fixture();
        let conn = f.db.conn();
        let curl = package("curl", "8.5", "arm64");
        add(conn, f.dest, &[curl.clone()]).unwrap();
        add(conn, f.dest, &[generic("NEWS")]).unwrap();
        let href = content_href(conn, f.source, &curl);

        let versions = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                    "dest_base_version": 1,
                    "content": [href],
                }],
                "structured": false,
            })),
        )
        .unwrap();

        assert_eq!(versions[0].number, 3);
        assert_eq!(units_at(conn, f.dest, 3), vec![curl]);
        assert_eq!(units_at(conn, f.dest, 2).len(), 2);
    }

    #[test]
    fn test_duplicate_distribution_from_copy_aborts() {
        let mut f = fixture();
        let conn = f.db.conn();
        add(
            conn,
            f.dest,
            &[ContentUnit::Release(crate::content::Release {
                codename: "bionic-proposed".into(),
                suite: "proposed".into(),
                distribution: "bionic".into(),
            })],
        )
        .unwrap();

        let err = copy_content(
            conn,
            API_ROOT,
            &request(json!({
                "config": [{
                    "source_repo_version": version_href(f.source, 1),
                    "dest_repo": ResourceRef::Repository(f.dest).href(API_ROOT),
                }],
            })),
        )
        .unwrap_err();
        assert!(matches!(err, DebRepoError::DuplicateDistribution(d) if d == "bionic"));
        assert_eq!(units_at(conn, f.dest, 1).len(), 1);
    }

    fn units_at_ids(conn: &mut SqliteConnection, repo: i32, number: i32) -> Vec<i32> {
        version_content(conn, repo, number)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }
}
