use std::{
    collections::BTreeMap,
    fmt::Display,
    fs,
    io::Read,
    sync::{LazyLock, RwLock},
};

use debrepo_core::{error::DebRepoError, DebRepoResult};
use nu_ansi_term::Color;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().map(|c| *c).unwrap_or(false);
        if color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Reads a JSON document from a file, or from stdin when `source` is `-`.
pub fn read_json(source: &str) -> DebRepoResult<Value> {
    let content = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| DebRepoError::Custom(format!("reading stdin: {err}")))?;
        buffer
    } else {
        fs::read_to_string(source)
            .map_err(|err| DebRepoError::Custom(format!("reading {source}: {err}")))?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Parses repeated `DISTRIBUTION=HREF` arguments.
pub fn parse_overrides(pairs: &[String]) -> DebRepoResult<BTreeMap<String, String>> {
    let mut overrides = BTreeMap::new();
    for pair in pairs {
        let (distribution, href) = pair
            .split_once('=')
            .filter(|(d, h)| !d.is_empty() && !h.is_empty())
            .ok_or_else(|| {
                DebRepoError::Validation(format!(
                    "Invalid override '{pair}', expected DISTRIBUTION=HREF"
                ))
            })?;
        if overrides
            .insert(distribution.to_string(), href.to_string())
            .is_some()
        {
            return Err(DebRepoError::Validation(format!(
                "Distribution '{distribution}' is overridden more than once"
            )));
        }
    }
    Ok(overrides)
}

/// Prints a resource as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> DebRepoResult<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
