//! The closed set of APT content types.
//!
//! Every unit knows its uniqueness key within a repository version and, for
//! published files, its relative publication path. A unit's identity is the
//! blake3 digest of its canonical JSON encoding, so storing the same unit twice
//! yields the same row.

use std::fmt;

use debrepo_db::{
    models::{content::NewContent, content::ContentRow, version::RepositoryContent},
    store::ContentStore,
};
use debrepo_utils::hash::digest_bytes;
use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::error::{DebRepoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    Generic,
    Package,
    InstallerPackage,
    PackageIndex,
    InstallerFileIndex,
    ReleaseFile,
    Release,
    ReleaseArchitecture,
    ReleaseComponent,
    PackageReleaseComponent,
}

impl ContentType {
    pub const ALL: [ContentType; 10] = [
        ContentType::Generic,
        ContentType::Package,
        ContentType::InstallerPackage,
        ContentType::PackageIndex,
        ContentType::InstallerFileIndex,
        ContentType::ReleaseFile,
        ContentType::Release,
        ContentType::ReleaseArchitecture,
        ContentType::ReleaseComponent,
        ContentType::PackageReleaseComponent,
    ];

    /// Derived metadata that every new version must regenerate.
    pub const DERIVED_METADATA: [ContentType; 3] = [
        ContentType::ReleaseFile,
        ContentType::PackageIndex,
        ContentType::InstallerFileIndex,
    ];

    /// Value of the `content_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Generic => "deb.generic",
            ContentType::Package => "deb.package",
            ContentType::InstallerPackage => "deb.installer_package",
            ContentType::PackageIndex => "deb.package_index",
            ContentType::InstallerFileIndex => "deb.installer_file_index",
            ContentType::ReleaseFile => "deb.release_file",
            ContentType::Release => "deb.release",
            ContentType::ReleaseArchitecture => "deb.release_architecture",
            ContentType::ReleaseComponent => "deb.release_component",
            ContentType::PackageReleaseComponent => "deb.package_release_component",
        }
    }

    /// Path segment used in content hrefs.
    pub fn kind(self) -> &'static str {
        match self {
            ContentType::Generic => "generic_contents",
            ContentType::Package => "packages",
            ContentType::InstallerPackage => "installer_packages",
            ContentType::PackageIndex => "package_indices",
            ContentType::InstallerFileIndex => "installer_file_indices",
            ContentType::ReleaseFile => "release_files",
            ContentType::Release => "releases",
            ContentType::ReleaseArchitecture => "release_architectures",
            ContentType::ReleaseComponent => "release_components",
            ContentType::PackageReleaseComponent => "package_release_components",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.kind() == kind)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Whether units of this type are published as files.
    pub fn is_publishable(self) -> bool {
        matches!(
            self,
            ContentType::Generic
                | ContentType::Package
                | ContentType::InstallerPackage
                | ContentType::PackageIndex
                | ContentType::InstallerFileIndex
                | ContentType::ReleaseFile
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An arbitrary file published as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericContent {
    pub relative_path: String,
    pub checksum: String,
}

/// A binary package, or an installer (udeb) package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub package: String,
    pub version: String,
    pub architecture: String,
    pub relative_path: String,
    pub checksum: String,
}

/// A `Packages` index, or an installer file index (`MD5SUMS`/`SHA256SUMS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataIndex {
    pub distribution: String,
    pub component: String,
    pub architecture: String,
    pub relative_path: String,
    pub checksum: String,
}

/// A `Release`/`InRelease` file of one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub codename: String,
    pub suite: String,
    pub distribution: String,
    pub relative_path: String,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub codename: String,
    pub suite: String,
    pub distribution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArchitecture {
    pub architecture: String,
    pub distribution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseComponent {
    pub component: String,
    pub distribution: String,
}

/// Places a package in a component of a distribution.
///
/// `package` and `release_component` hold the digests of the linked units.
/// The package coordinates are repeated so that two associations referring to
/// logically equal packages share a uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReleaseComponent {
    pub package: String,
    pub release_component: String,
    pub package_name: String,
    pub version: String,
    pub architecture: String,
    pub component: String,
    pub distribution: String,
}

impl PackageReleaseComponent {
    /// Links already stored `package` and `component` units.
    pub fn link(
        package: &Package,
        package_digest: &str,
        component: &ReleaseComponent,
        component_digest: &str,
    ) -> Self {
        Self {
            package: package_digest.to_string(),
            release_component: component_digest.to_string(),
            package_name: package.package.clone(),
            version: package.version.clone(),
            architecture: package.architecture.clone(),
            component: component.component.clone(),
            distribution: component.distribution.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentUnit {
    Generic(GenericContent),
    Package(Package),
    InstallerPackage(Package),
    PackageIndex(MetadataIndex),
    InstallerFileIndex(MetadataIndex),
    ReleaseFile(ReleaseFile),
    Release(Release),
    ReleaseArchitecture(ReleaseArchitecture),
    ReleaseComponent(ReleaseComponent),
    PackageReleaseComponent(PackageReleaseComponent),
}

impl ContentUnit {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentUnit::Generic(_) => ContentType::Generic,
            ContentUnit::Package(_) => ContentType::Package,
            ContentUnit::InstallerPackage(_) => ContentType::InstallerPackage,
            ContentUnit::PackageIndex(_) => ContentType::PackageIndex,
            ContentUnit::InstallerFileIndex(_) => ContentType::InstallerFileIndex,
            ContentUnit::ReleaseFile(_) => ContentType::ReleaseFile,
            ContentUnit::Release(_) => ContentType::Release,
            ContentUnit::ReleaseArchitecture(_) => ContentType::ReleaseArchitecture,
            ContentUnit::ReleaseComponent(_) => ContentType::ReleaseComponent,
            ContentUnit::PackageReleaseComponent(_) => ContentType::PackageReleaseComponent,
        }
    }

    /// Values of the fields that make a unit unique within one version.
    pub fn repo_key(&self) -> Vec<&str> {
        match self {
            ContentUnit::Generic(c) => vec![c.relative_path.as_str()],
            ContentUnit::Package(p) | ContentUnit::InstallerPackage(p) => {
                vec![
                    p.package.as_str(),
                    p.version.as_str(),
                    p.architecture.as_str(),
                ]
            }
            ContentUnit::PackageIndex(i) | ContentUnit::InstallerFileIndex(i) => {
                vec![i.relative_path.as_str()]
            }
            ContentUnit::ReleaseFile(r) => vec![r.distribution.as_str()],
            ContentUnit::Release(r) => {
                vec![r.codename.as_str(), r.suite.as_str(), r.distribution.as_str()]
            }
            ContentUnit::ReleaseArchitecture(a) => {
                vec![a.architecture.as_str(), a.distribution.as_str()]
            }
            ContentUnit::ReleaseComponent(c) => vec![c.component.as_str(), c.distribution.as_str()],
            ContentUnit::PackageReleaseComponent(prc) => vec![
                prc.package_name.as_str(),
                prc.version.as_str(),
                prc.architecture.as_str(),
                prc.component.as_str(),
                prc.distribution.as_str(),
            ],
        }
    }

    /// Publication path, for publishable types only.
    pub fn relative_path(&self) -> Option<&str> {
        match self {
            ContentUnit::Generic(c) => Some(&c.relative_path),
            ContentUnit::Package(p) | ContentUnit::InstallerPackage(p) => Some(&p.relative_path),
            ContentUnit::PackageIndex(i) | ContentUnit::InstallerFileIndex(i) => {
                Some(&i.relative_path)
            }
            ContentUnit::ReleaseFile(r) => Some(&r.relative_path),
            ContentUnit::Release(_)
            | ContentUnit::ReleaseArchitecture(_)
            | ContentUnit::ReleaseComponent(_)
            | ContentUnit::PackageReleaseComponent(_) => None,
        }
    }

    /// Content-addressed identity of the unit.
    pub fn digest(&self) -> Result<String> {
        Ok(digest_bytes(&serde_json::to_vec(self)?))
    }

    pub fn from_row(row: &ContentRow) -> Result<Self> {
        let unit: ContentUnit = serde_json::from_value(row.body.clone())?;
        if unit.content_type().as_str() != row.content_type {
            return Err(DebRepoError::Custom(format!(
                "content {} is stored as {} but decodes as {}",
                row.id,
                row.content_type,
                unit.content_type()
            )));
        }
        Ok(unit)
    }
}

/// A unit as it is found in a repository version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub id: i32,
    pub digest: String,
    /// Version in which the unit entered the repository.
    pub version_added: i32,
    /// Staging order within the repository.
    pub membership_id: i32,
    pub unit: ContentUnit,
}

impl StoredContent {
    pub fn from_rows(membership: &RepositoryContent, row: &ContentRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            digest: row.digest.clone(),
            version_added: membership.version_added,
            membership_id: membership.id,
            unit: ContentUnit::from_row(row)?,
        })
    }

    pub fn content_type(&self) -> ContentType {
        self.unit.content_type()
    }
}

/// Stores `unit`, returning the existing row if an identical unit is known.
pub fn store_unit(conn: &mut SqliteConnection, unit: &ContentUnit) -> Result<ContentRow> {
    let digest = unit.digest()?;
    let row = ContentStore::get_or_create(
        conn,
        &NewContent {
            content_type: unit.content_type().as_str(),
            digest: &digest,
            relative_path: unit.relative_path(),
            body: serde_json::to_value(unit)?,
        },
    )?;
    Ok(row)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn package(name: &str, version: &str, arch: &str) -> ContentUnit {
        ContentUnit::Package(Package {
            package: name.into(),
            version: version.into(),
            architecture: arch.into(),
            relative_path: format!(
                "pool/main/{}/{name}/{name}_{version}_{arch}.deb",
                &name[..1]
            ),
            checksum: digest_bytes(format!("{name}{version}{arch}").as_bytes()),
        })
    }

    pub fn release(distribution: &str) -> ContentUnit {
        ContentUnit::Release(Release {
            codename: distribution.into(),
            suite: "stable".into(),
            distribution: distribution.into(),
        })
    }

    pub fn release_file(distribution: &str) -> ContentUnit {
        ContentUnit::ReleaseFile(ReleaseFile {
            codename: distribution.into(),
            suite: "stable".into(),
            distribution: distribution.into(),
            relative_path: format!("dists/{distribution}/Release"),
            checksum: digest_bytes(distribution.as_bytes()),
        })
    }

    pub fn package_index(distribution: &str, component: &str, arch: &str) -> ContentUnit {
        ContentUnit::PackageIndex(MetadataIndex {
            distribution: distribution.into(),
            component: component.into(),
            architecture: arch.into(),
            relative_path: format!("dists/{distribution}/{component}/binary-{arch}/Packages"),
            checksum: digest_bytes(format!("{distribution}{component}{arch}").as_bytes()),
        })
    }

    pub fn installer_index(distribution: &str, component: &str, arch: &str) -> ContentUnit {
        ContentUnit::InstallerFileIndex(MetadataIndex {
            distribution: distribution.into(),
            component: component.into(),
            architecture: arch.into(),
            relative_path: format!(
                "dists/{distribution}/{component}/installer-{arch}/current/images/SHA256SUMS"
            ),
            checksum: digest_bytes(format!("installer{distribution}{arch}").as_bytes()),
        })
    }

    pub fn component(distribution: &str, component: &str) -> ContentUnit {
        ContentUnit::ReleaseComponent(ReleaseComponent {
            component: component.into(),
            distribution: distribution.into(),
        })
    }

    pub fn architecture(distribution: &str, arch: &str) -> ContentUnit {
        ContentUnit::ReleaseArchitecture(ReleaseArchitecture {
            architecture: arch.into(),
            distribution: distribution.into(),
        })
    }

    pub fn generic(path: &str) -> ContentUnit {
        ContentUnit::Generic(GenericContent {
            relative_path: path.into(),
            checksum: digest_bytes(path.as_bytes()),
        })
    }

    /// Association of two units, both given as fixtures.
    pub fn link(package: &ContentUnit, component: &ContentUnit) -> ContentUnit {
        match (package, component) {
            (ContentUnit::Package(p), ContentUnit::ReleaseComponent(c)) => {
                ContentUnit::PackageReleaseComponent(PackageReleaseComponent::link(
                    p,
                    &package.digest().unwrap(),
                    c,
                    &component.digest().unwrap(),
                ))
            }
            _ => panic!("link needs a package and a release component"),
        }
    }
}
