use debrepo_core::{
    content::{ContentUnit, GenericContent},
    href::{content_id, ResourceRef},
    repository::lookup_repository,
    version::create_version,
    DebRepoResult,
};
use debrepo_db::models::version::RepositoryVersion;
use debrepo_utils::{error::UtilsError, hash::calculate_checksum};
use nu_ansi_term::Color::{Blue, Cyan};
use tracing::info;

use crate::{
    context::AppContext,
    utils::{read_json, Colored},
};

fn report(ctx: &AppContext, version: &RepositoryVersion) {
    let href = ResourceRef::RepositoryVersion {
        repository_id: version.repository_id,
        number: version.number,
    }
    .href(&ctx.api_root);
    info!(
        "Repository is at version {} ({})",
        Colored(Blue, version.number),
        Colored(Cyan, href)
    );
}

pub fn add(ctx: &AppContext, repo: &str, source: &str) -> DebRepoResult<()> {
    let units: Vec<ContentUnit> = serde_json::from_value(read_json(source)?)?;

    let version = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        create_version(conn, found.id, |pending| {
            let added = pending.add_units(&units)?;
            info!("staged {} of {} units", added.len(), units.len());
            Ok(())
        })
    })?;

    report(ctx, &version);
    Ok(())
}

pub fn add_file(
    ctx: &AppContext,
    repo: &str,
    file: &str,
    relative_path: &str,
) -> DebRepoResult<()> {
    let checksum = calculate_checksum(file).map_err(UtilsError::from)?;
    let unit = ContentUnit::Generic(GenericContent {
        relative_path: relative_path.trim_start_matches('/').to_string(),
        checksum,
    });

    let version = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        create_version(conn, found.id, |pending| {
            pending.add_units(std::slice::from_ref(&unit))?;
            Ok(())
        })
    })?;

    report(ctx, &version);
    Ok(())
}

pub fn remove(ctx: &AppContext, repo: &str, hrefs: &[String]) -> DebRepoResult<()> {
    let ids = hrefs
        .iter()
        .map(|href| content_id(&ctx.api_root, href).map(|(_, id)| id))
        .collect::<DebRepoResult<Vec<i32>>>()?;

    let version = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        create_version(conn, found.id, |pending| {
            let removed = pending.remove_content(&ids)?;
            info!("removed {} of {} units", removed, ids.len());
            Ok(())
        })
    })?;

    report(ctx, &version);
    Ok(())
}
