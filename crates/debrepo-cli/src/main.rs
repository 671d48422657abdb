use std::{env, fs};

use clap::Parser;
use cli::{Args, Commands, ContentCommand, RepoCommand, SigningServiceCommand, VersionCommand};
use context::AppContext;
use debrepo_config::{
    config::{self, generate_default_config, get_config, Config, CONFIG_PATH},
    error::ConfigError,
};
use debrepo_core::{
    error::DebRepoError,
    repository::RepositoryCreate,
    DebRepoResult,
};
use debrepo_utils::{error::UtilsError, path::resolve_path};
use logging::setup_logging;
use tracing::{info, warn};
use utils::{parse_overrides, COLOR};

mod cli;
mod content;
mod context;
mod copy;
mod logging;
mod repo;
mod signing;
mod utils;
mod version;

fn set_config_path(path: &str) -> DebRepoResult<()> {
    let path = resolve_path(path).map_err(UtilsError::from)?;
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .map_err(|err| DebRepoError::Custom(format!("retrieving current directory: {err}")))?
            .join(path)
    };
    *CONFIG_PATH.write()? = path;
    Ok(())
}

fn print_config() -> DebRepoResult<()> {
    let config_path = CONFIG_PATH.read()?.clone();
    let content = match fs::read_to_string(&config_path) {
        Ok(v) => v,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found", config_path.display());
            toml::to_string_pretty(&Config::default_config()).map_err(ConfigError::from)?
        }
        Err(err) => return Err(ConfigError::IoError(err).into()),
    };
    info!("{}", content);
    Ok(())
}

fn handle_cli() -> DebRepoResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        *COLOR.write()? = false;
    }

    if let Some(ref c) = args.config {
        set_config_path(c)?;
    }

    match args.command {
        Commands::DefConfig => generate_default_config()?,
        Commands::Config => print_config()?,
        command => {
            config::init()?;
            let config = get_config();
            let json = args.json;

            if let Commands::Env = command {
                info!("DEBREPO_CONFIG={}", CONFIG_PATH.read()?.display());
                info!("DEBREPO_DB={}", config.get_db_path()?.display());
                info!("DEBREPO_API_ROOT={}", config.api_root());
                return Ok(());
            }

            let ctx = AppContext::new(&config)?;

            match command {
                Commands::SigningService(SigningServiceCommand::Add {
                    name,
                    public_key,
                    fingerprint,
                    script,
                }) => signing::add_service(&ctx, &name, &public_key, &fingerprint, &script)?,
                Commands::SigningService(SigningServiceCommand::List) => {
                    signing::list_services(&ctx, json)?
                }
                Commands::Repo(RepoCommand::Create {
                    name,
                    description,
                    signing_service,
                    overrides,
                }) => {
                    let request = RepositoryCreate {
                        name,
                        description,
                        signing_service,
                        signing_service_release_overrides: if overrides.is_empty() {
                            None
                        } else {
                            Some(parse_overrides(&overrides)?)
                        },
                    };
                    repo::create(&ctx, request, json)?;
                }
                Commands::Repo(RepoCommand::Update {
                    repo,
                    name,
                    description,
                    clear_description,
                    signing_service,
                    unsigned,
                    overrides,
                    clear_overrides,
                }) => {
                    let request = repo::update_request(
                        name,
                        description,
                        clear_description,
                        signing_service,
                        unsigned,
                        &overrides,
                        clear_overrides,
                    )?;
                    repo::update(&ctx, &repo, request, json)?;
                }
                Commands::Repo(RepoCommand::Show {
                    repo,
                }) => repo::show(&ctx, &repo, json)?,
                Commands::Repo(RepoCommand::List) => repo::list(&ctx, json)?,
                Commands::Repo(RepoCommand::ResolveSigning {
                    repo,
                    distribution,
                }) => repo::resolve_signing(&ctx, &repo, &distribution, json)?,
                Commands::Version(VersionCommand::List {
                    repo,
                }) => version::list(&ctx, &repo, json)?,
                Commands::Version(VersionCommand::Show {
                    repo,
                    number,
                    content,
                }) => version::show(&ctx, &repo, number, content, json)?,
                Commands::Content(ContentCommand::Add {
                    repo,
                    units,
                }) => content::add(&ctx, &repo, &units)?,
                Commands::Content(ContentCommand::AddFile {
                    repo,
                    file,
                    relative_path,
                }) => content::add_file(&ctx, &repo, &file, &relative_path)?,
                Commands::Content(ContentCommand::Remove {
                    repo,
                    content,
                }) => content::remove(&ctx, &repo, &content)?,
                Commands::Copy {
                    file,
                    unstructured,
                    dependency_solving,
                } => copy::copy(&ctx, &file, unstructured, dependency_solving, json)?,
                Commands::Sync {
                    repo,
                    remote,
                    mirror,
                    no_optimize,
                } => copy::sync(&ctx, &repo, remote, mirror, no_optimize, json)?,
                Commands::Config | Commands::DefConfig | Commands::Env => unreachable!(),
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
