use debrepo_core::{
    content::Release,
    repository::{
        create_repository, list_repositories, lookup_repository, repository_view,
        update_repository, RepositoryCreate, RepositoryUpdate, RepositoryView,
    },
    signing::release_signing_service,
    DebRepoResult,
};
use nu_ansi_term::Color::{Blue, Cyan, Green};
use tracing::info;

use crate::{
    context::AppContext,
    utils::{parse_overrides, print_json, Colored},
};

fn show_view(view: &RepositoryView, json: bool) -> DebRepoResult<()> {
    if json {
        return print_json(view);
    }

    info!("{} {}", Colored(Blue, &view.name), Colored(Cyan, &view.pulp_href));
    if let Some(description) = &view.description {
        info!("  description: {description}");
    }
    info!(
        "  latest version: {}",
        view.latest_version_href.as_deref().unwrap_or("-")
    );
    info!(
        "  signing service: {}",
        view.signing_service.as_deref().unwrap_or("unsigned")
    );
    for (distribution, service) in &view.signing_service_release_overrides {
        info!("  {} -> {}", Colored(Green, distribution), service);
    }
    Ok(())
}

pub fn create(
    ctx: &AppContext,
    request: RepositoryCreate,
    json: bool,
) -> DebRepoResult<()> {
    let view = ctx
        .db
        .with_conn(|conn| create_repository(conn, &ctx.api_root, &request))?;
    show_view(&view, json)
}

/// Builds a repository update from command line flags.
#[allow(clippy::too_many_arguments)]
pub fn update_request(
    name: Option<String>,
    description: Option<String>,
    clear_description: bool,
    signing_service: Option<String>,
    unsigned: bool,
    overrides: &[String],
    clear_overrides: bool,
) -> DebRepoResult<RepositoryUpdate> {
    let signing_service_release_overrides = if clear_overrides {
        Some(Default::default())
    } else if overrides.is_empty() {
        None
    } else {
        Some(parse_overrides(overrides)?)
    };

    Ok(RepositoryUpdate {
        name,
        description: if clear_description {
            Some(None)
        } else {
            description.map(Some)
        },
        signing_service: if unsigned {
            Some(None)
        } else {
            signing_service.map(Some)
        },
        signing_service_release_overrides,
    })
}

pub fn update(
    ctx: &AppContext,
    repo: &str,
    request: RepositoryUpdate,
    json: bool,
) -> DebRepoResult<()> {
    let view = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        update_repository(conn, &ctx.api_root, found.id, &request)
    })?;
    show_view(&view, json)
}

pub fn show(ctx: &AppContext, repo: &str, json: bool) -> DebRepoResult<()> {
    let view = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        repository_view(conn, &ctx.api_root, found.id)
    })?;
    show_view(&view, json)
}

pub fn list(ctx: &AppContext, json: bool) -> DebRepoResult<()> {
    let views = ctx
        .db
        .with_conn(|conn| list_repositories(conn, &ctx.api_root))?;
    if json {
        return print_json(&views);
    }

    if views.is_empty() {
        info!("No repositories");
    }
    for view in views {
        info!(
            "{} {} {}",
            Colored(Blue, &view.name),
            Colored(Cyan, &view.pulp_href),
            view.latest_version_href.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn resolve_signing(
    ctx: &AppContext,
    repo: &str,
    distribution: &str,
    json: bool,
) -> DebRepoResult<()> {
    let service = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        let release = Release {
            codename: distribution.to_string(),
            suite: distribution.to_string(),
            distribution: distribution.to_string(),
        };
        release_signing_service(conn, &found, &release)
    })?;

    match service {
        Some(service) if json => print_json(&serde_json::json!({
            "distribution": distribution,
            "signing_service": service.name,
            "pubkey_fingerprint": service.pubkey_fingerprint,
        })),
        Some(service) => {
            info!(
                "{} is signed by {} [{}]",
                Colored(Green, distribution),
                Colored(Blue, &service.name),
                service.pubkey_fingerprint
            );
            Ok(())
        }
        None if json => print_json(&serde_json::json!({
            "distribution": distribution,
            "signing_service": null,
        })),
        None => {
            info!("{} is published unsigned", Colored(Green, distribution));
            Ok(())
        }
    }
}
