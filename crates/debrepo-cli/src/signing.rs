use std::fs;

use debrepo_core::{
    error::DebRepoError,
    signing::{add_signing_service, list_signing_services},
    DebRepoResult,
};
use debrepo_db::models::signing::NewSigningService;
use nu_ansi_term::Color::{Blue, Cyan};
use tracing::info;

use crate::{context::AppContext, utils::Colored};

pub fn add_service(
    ctx: &AppContext,
    name: &str,
    public_key: &str,
    fingerprint: &str,
    script: &str,
) -> DebRepoResult<()> {
    let public_key = fs::read_to_string(public_key)
        .map_err(|err| DebRepoError::Custom(format!("reading {public_key}: {err}")))?;

    let view = ctx.db.transaction(|conn| {
        add_signing_service(
            conn,
            &ctx.api_root,
            &NewSigningService {
                name,
                public_key: public_key.trim(),
                pubkey_fingerprint: fingerprint,
                script,
            },
        )
    })?;

    info!(
        "Registered signing service {} at {}",
        Colored(Blue, &view.name),
        Colored(Cyan, &view.pulp_href)
    );
    Ok(())
}

pub fn list_services(ctx: &AppContext, json: bool) -> DebRepoResult<()> {
    let services = ctx
        .db
        .with_conn(|conn| list_signing_services(conn, &ctx.api_root))?;

    if json {
        return crate::utils::print_json(&services);
    }
    if services.is_empty() {
        info!("No signing services registered");
    }
    for service in services {
        info!(
            "{} {} [{}]",
            Colored(Blue, &service.name),
            Colored(Cyan, &service.pulp_href),
            service.pubkey_fingerprint
        );
    }
    Ok(())
}
