use debrepo_core::{
    copy::{copy_content, CopyRequest},
    href::ResourceRef,
    repository::lookup_repository,
    sync::SyncRequest,
    DebRepoResult,
};
use nu_ansi_term::Color::{Blue, Cyan};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    context::AppContext,
    utils::{print_json, read_json, Colored},
};

/// Assembles the body of a copy request from a config document.
pub fn copy_document(config: Value, unstructured: bool, dependency_solving: bool) -> Value {
    json!({
        "config": config,
        "structured": !unstructured,
        "dependency_solving": dependency_solving,
    })
}

pub fn copy(
    ctx: &AppContext,
    file: &str,
    unstructured: bool,
    dependency_solving: bool,
    json: bool,
) -> DebRepoResult<()> {
    let document = copy_document(read_json(file)?, unstructured, dependency_solving);
    let request = CopyRequest::validate(&document)?;

    let versions = ctx
        .db
        .with_conn(|conn| copy_content(conn, &ctx.api_root, &request))?;

    let hrefs: Vec<String> = versions
        .iter()
        .map(|version| {
            ResourceRef::RepositoryVersion {
                repository_id: version.repository_id,
                number: version.number,
            }
            .href(&ctx.api_root)
        })
        .collect();

    if json {
        return print_json(&json!({ "created_resources": hrefs }));
    }
    for href in hrefs {
        info!("Copied into {}", Colored(Cyan, href));
    }
    Ok(())
}

pub fn sync(
    ctx: &AppContext,
    repo: &str,
    remote: Option<String>,
    mirror: bool,
    no_optimize: bool,
    json: bool,
) -> DebRepoResult<()> {
    let document = json!({
        "remote": remote,
        "mirror": mirror,
        "optimize": !no_optimize,
    });
    let request = SyncRequest::from_value(&ctx.api_root, &document)?;
    let found = ctx
        .db
        .with_conn(|conn| lookup_repository(conn, &ctx.api_root, repo))?;

    if json {
        return print_json(&json!({
            "repository": ResourceRef::Repository(found.id).href(&ctx.api_root),
            "request": request,
        }));
    }
    info!(
        "Sync of {} accepted: remote={} mirror={} optimize={}",
        Colored(Blue, &found.name),
        request.remote.as_deref().unwrap_or("-"),
        request.mirror,
        request.optimize
    );
    Ok(())
}
