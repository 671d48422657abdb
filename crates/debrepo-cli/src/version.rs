use debrepo_core::{
    error::DebRepoError,
    href::ResourceRef,
    repository::{list_versions, lookup_repository, version_view},
    version::version_content,
    DebRepoResult,
};
use debrepo_db::store::VersionStore;
use nu_ansi_term::Color::{Blue, Cyan, Green};
use serde_json::json;
use tracing::info;

use crate::{
    context::AppContext,
    utils::{print_json, Colored},
};

pub fn list(ctx: &AppContext, repo: &str, json: bool) -> DebRepoResult<()> {
    let views = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        list_versions(conn, &ctx.api_root, found.id)
    })?;

    if json {
        return print_json(&views);
    }
    for view in views {
        let total: usize = view.content_summary.values().sum();
        info!(
            "{} {} ({} units)",
            Colored(Blue, view.number),
            Colored(Cyan, &view.pulp_href),
            total
        );
    }
    Ok(())
}

pub fn show(
    ctx: &AppContext,
    repo: &str,
    number: Option<i32>,
    list_content: bool,
    json: bool,
) -> DebRepoResult<()> {
    let (view, content) = ctx.db.with_conn(|conn| {
        let found = lookup_repository(conn, &ctx.api_root, repo)?;
        let version = match number {
            Some(number) => VersionStore::find_by_number(conn, found.id, number)?
                .filter(|version| version.complete),
            None => VersionStore::latest_complete(conn, found.id)?,
        }
        .ok_or_else(|| {
            DebRepoError::Custom(format!(
                "Repository '{}' has no version {}",
                found.name,
                number.map_or_else(|| "yet".to_string(), |n| n.to_string())
            ))
        })?;

        let view = version_view(conn, &ctx.api_root, &version)?;
        let content = if list_content {
            version_content(conn, found.id, version.number)?
        } else {
            Vec::new()
        };
        Ok((view, content))
    })?;

    if json {
        if !list_content {
            return print_json(&view);
        }
        let units: Vec<_> = content
            .iter()
            .map(|item| {
                json!({
                    "pulp_href": ResourceRef::Content {
                        content_type: item.content_type(),
                        id: item.id,
                    }
                    .href(&ctx.api_root),
                    "unit": item.unit,
                })
            })
            .collect();
        return print_json(&json!({ "version": view, "content": units }));
    }

    info!(
        "Version {} of {}",
        Colored(Blue, view.number),
        Colored(Cyan, &view.repository)
    );
    for (content_type, count) in &view.content_summary {
        info!("  {}: {}", Colored(Green, content_type), count);
    }
    for item in &content {
        let href = ResourceRef::Content {
            content_type: item.content_type(),
            id: item.id,
        }
        .href(&ctx.api_root);
        info!(
            "  {} {}",
            Colored(Cyan, href),
            item.unit.relative_path().unwrap_or_else(|| item.content_type().as_str())
        );
    }
    Ok(())
}
