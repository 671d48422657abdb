//! Path helpers for configuration values.

use std::{env, path::PathBuf};

use crate::error::{PathError, PathResult};

/// `$HOME`, or the working directory when it is unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from)
}

/// `$XDG_CONFIG_HOME`, defaulting to `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME").map_or_else(|| home_dir().join(".config"), PathBuf::from)
}

/// `$XDG_DATA_HOME`, defaulting to `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    env::var_os("XDG_DATA_HOME").map_or_else(|| home_dir().join(".local/share"), PathBuf::from)
}

fn lookup(name: &str, input: &str) -> PathResult<String> {
    let value = match name {
        "HOME" => home_dir(),
        "XDG_CONFIG_HOME" => xdg_config_home(),
        "XDG_DATA_HOME" => xdg_data_home(),
        _ => {
            return env::var(name).map_err(|_| PathError::MissingEnvVar {
                var: name.to_string(),
                input: input.to_string(),
            })
        }
    };
    Ok(value.to_string_lossy().into_owned())
}

/// Expands `$VAR`, `${VAR}` and a leading `~`.
fn expand(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(stripped) = rest.strip_prefix('~') {
        out.push_str(&home_dir().to_string_lossy());
        rest = stripped;
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| PathError::UnclosedVariable {
                input: format!("${{{braced}"),
            })?;
            out.push_str(&lookup(&braced[..end], input)?);
            rest = &braced[end + 1..];
            continue;
        }

        let len = after
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&lookup(&after[..len], input)?);
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Resolves a configured path to an absolute one.
///
/// Environment variables are expanded first; relative results are joined to
/// the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] for a blank input
/// * [`PathError::MissingEnvVar`] for an undefined variable
/// * [`PathError::UnclosedVariable`] for a `${` without `}`
/// * [`PathError::CurrentDir`] if the working directory is unavailable
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|source| PathError::CurrentDir { source })
}
