//! API resource references.
//!
//! Resources are addressed by hrefs rooted at the configured `api_root`, e.g.
//! `/debrepo/api/v3/signing-services/3/`. Parsing an href yields a typed
//! [`ResourceRef`] which is then looked up by primary key.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    content::ContentType,
    error::{DebRepoError, Result},
};

static HREF_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    SigningService(i32),
    Repository(i32),
    Remote(i32),
    RepositoryVersion { repository_id: i32, number: i32 },
    Content { content_type: ContentType, id: i32 },
}

impl ResourceRef {
    pub fn parse(api_root: &str, href: &str) -> Result<Self> {
        let re = HREF_RE.get_or_init(|| {
            Regex::new(
                r"(?x)^(?:
                signing-services/(?P<service>\d+)
                | repositories/deb/apt/(?P<repo>\d+)(?:/versions/(?P<number>\d+))?
                | remotes/deb/apt/(?P<remote>\d+)
                | content/deb/(?P<kind>[a-z_]+)/(?P<content>\d+)
                )/$",
            )
            .unwrap()
        });

        let invalid = || DebRepoError::Validation(format!("Invalid href '{}'", href));
        let rest = href.strip_prefix(api_root).ok_or_else(invalid)?;
        let caps = re.captures(rest).ok_or_else(invalid)?;
        let id = |name: &str| -> Result<Option<i32>> {
            caps.name(name)
                .map(|m| m.as_str().parse::<i32>().map_err(|_| invalid()))
                .transpose()
        };

        if let Some(service) = id("service")? {
            return Ok(ResourceRef::SigningService(service));
        }
        if let Some(remote) = id("remote")? {
            return Ok(ResourceRef::Remote(remote));
        }
        if let Some(repository_id) = id("repo")? {
            return Ok(match id("number")? {
                Some(number) => ResourceRef::RepositoryVersion {
                    repository_id,
                    number,
                },
                None => ResourceRef::Repository(repository_id),
            });
        }

        let content_type = caps
            .name("kind")
            .and_then(|m| ContentType::from_kind(m.as_str()))
            .ok_or_else(invalid)?;
        let id = id("content")?.ok_or_else(invalid)?;
        Ok(ResourceRef::Content { content_type, id })
    }

    pub fn href(&self, api_root: &str) -> String {
        match self {
            ResourceRef::SigningService(id) => format!("{api_root}signing-services/{id}/"),
            ResourceRef::Repository(id) => format!("{api_root}repositories/deb/apt/{id}/"),
            ResourceRef::Remote(id) => format!("{api_root}remotes/deb/apt/{id}/"),
            ResourceRef::RepositoryVersion {
                repository_id,
                number,
            } => format!("{api_root}repositories/deb/apt/{repository_id}/versions/{number}/"),
            ResourceRef::Content { content_type, id } => {
                format!("{api_root}content/deb/{}/{id}/", content_type.kind())
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ResourceRef::SigningService(_) => "signing service",
            ResourceRef::Repository(_) => "repository",
            ResourceRef::Remote(_) => "remote",
            ResourceRef::RepositoryVersion { .. } => "repository version",
            ResourceRef::Content { .. } => "content",
        }
    }
}

fn wrong_kind(href: &str, expected: &str, found: &ResourceRef) -> DebRepoError {
    DebRepoError::Validation(format!(
        "'{}' refers to a {}, expected a {}",
        href,
        found.kind_name(),
        expected
    ))
}

/// Parses an href that must name a signing service.
pub fn signing_service_id(api_root: &str, href: &str) -> Result<i32> {
    match ResourceRef::parse(api_root, href)? {
        ResourceRef::SigningService(id) => Ok(id),
        other => Err(wrong_kind(href, "signing service", &other)),
    }
}

/// Parses an href that must name an APT repository.
pub fn repository_id(api_root: &str, href: &str) -> Result<i32> {
    match ResourceRef::parse(api_root, href)? {
        ResourceRef::Repository(id) => Ok(id),
        other => Err(wrong_kind(href, "repository", &other)),
    }
}

/// Parses an href that must name an APT remote.
pub fn remote_id(api_root: &str, href: &str) -> Result<i32> {
    match ResourceRef::parse(api_root, href)? {
        ResourceRef::Remote(id) => Ok(id),
        other => Err(wrong_kind(href, "remote", &other)),
    }
}

/// Parses an href that must name a repository version, as `(repository_id, number)`.
pub fn repository_version(api_root: &str, href: &str) -> Result<(i32, i32)> {
    match ResourceRef::parse(api_root, href)? {
        ResourceRef::RepositoryVersion {
            repository_id,
            number,
        } => Ok((repository_id, number)),
        other => Err(wrong_kind(href, "repository version", &other)),
    }
}

/// Parses an href that must name a content unit.
pub fn content_id(api_root: &str, href: &str) -> Result<(ContentType, i32)> {
    match ResourceRef::parse(api_root, href)? {
        ResourceRef::Content { content_type, id } => Ok((content_type, id)),
        other => Err(wrong_kind(href, "content unit", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/debrepo/api/v3/";

    #[test]
    fn test_parse_each_kind() {
        assert_eq!(
            ResourceRef::parse(ROOT, "/debrepo/api/v3/signing-services/3/").unwrap(),
            ResourceRef::SigningService(3)
        );
        assert_eq!(
            ResourceRef::parse(ROOT, "/debrepo/api/v3/repositories/deb/apt/12/").unwrap(),
            ResourceRef::Repository(12)
        );
        assert_eq!(
            ResourceRef::parse(ROOT, "/debrepo/api/v3/repositories/deb/apt/12/versions/0/")
                .unwrap(),
            ResourceRef::RepositoryVersion {
                repository_id: 12,
                number: 0
            }
        );
        assert_eq!(
            ResourceRef::parse(ROOT, "/debrepo/api/v3/content/deb/packages/7/").unwrap(),
            ResourceRef::Content {
                content_type: ContentType::Package,
                id: 7
            }
        );
    }

    #[test]
    fn test_href_round_trip() {
        let refs = [
            ResourceRef::SigningService(1),
            ResourceRef::Repository(2),
            ResourceRef::Remote(4),
            ResourceRef::RepositoryVersion {
                repository_id: 2,
                number: 5,
            },
            ResourceRef::Content {
                content_type: ContentType::ReleaseComponent,
                id: 9,
            },
        ];
        for r in refs {
            assert_eq!(ResourceRef::parse(ROOT, &r.href(ROOT)).unwrap(), r);
        }
    }

    #[test]
    fn test_rejects_malformed_hrefs() {
        for href in [
            "",
            "signing-services/3/",
            "/other/api/signing-services/3/",
            "/debrepo/api/v3/signing-services/3",
            "/debrepo/api/v3/signing-services/abc/",
            "/debrepo/api/v3/content/deb/widgets/1/",
            "/debrepo/api/v3/signing-services/99999999999/",
        ] {
            let err = ResourceRef::parse(ROOT, href).unwrap_err();
            assert!(matches!(err, DebRepoError::Validation(_)), "{href}");
        }
    }

    #[test]
    fn test_wrong_kind_is_a_validation_error() {
        let err = signing_service_id(ROOT, "/debrepo/api/v3/repositories/deb/apt/1/").unwrap_err();
        assert!(matches!(
            err,
            DebRepoError::Validation(msg) if msg.contains("expected a signing service")
        ));

        assert_eq!(
            repository_version(ROOT, "/debrepo/api/v3/repositories/deb/apt/1/versions/4/")
                .unwrap(),
            (1, 4)
        );
        assert!(repository_id(ROOT, "/debrepo/api/v3/repositories/deb/apt/1/versions/4/").is_err());
    }
}
