use debrepo_config::config::Config;
use debrepo_core::{database::Database, DebRepoResult};
use tracing::debug;

/// Everything a command needs: the open database and the href prefix.
pub struct AppContext {
    pub db: Database,
    pub api_root: String,
}

impl AppContext {
    pub fn new(config: &Config) -> DebRepoResult<Self> {
        let db_path = config.get_db_path()?;
        debug!("using database {}", db_path.display());

        Ok(Self {
            db: Database::open(&db_path)?,
            api_root: config.api_root().to_string(),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            db: Database::open_in_memory().unwrap(),
            api_root: debrepo_config::config::DEFAULT_API_ROOT.to_string(),
        }
    }
}
