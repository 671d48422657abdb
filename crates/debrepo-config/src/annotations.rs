//! Doc comments for generated TOML files.

use documented::{Documented, DocumentedFields};
use toml_edit::{DocumentMut, Item};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Renders `docs` as `#` comment lines.
pub fn toml_comment(docs: &str) -> String {
    docs.lines()
        .map(|line| match line.trim_end() {
            "" => "#\n".to_string(),
            line => format!("# {line}\n"),
        })
        .collect()
}

/// Writes the struct docs of `T` as a file header and each field's docs above its key.
///
/// The header goes into the prefix of the first key. Later keys are separated
/// from the previous entry by a blank line.
pub fn annotate_document<T>(doc: &mut DocumentMut) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    let header = format!("{}\n", toml_comment(T::DOCS));

    for (index, (mut key, item)) in doc.as_table_mut().iter_mut().enumerate() {
        let name = key.get().to_string();
        if matches!(item, Item::None) {
            return Err(ConfigError::UnexpectedTomlItem(name));
        }

        let Ok(docs) = T::get_field_docs(&name) else {
            warn!("no documentation for config key '{}'", name);
            continue;
        };
        let spacer = if index == 0 { header.as_str() } else { "\n" };
        key.leaf_decor_mut()
            .set_prefix(format!("{spacer}{}", toml_comment(docs)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_toml_comment() {
        assert_eq!(toml_comment("Path of the db"), "# Path of the db\n");
        assert_eq!(toml_comment("Line 1\n\nLine 2"), "# Line 1\n#\n# Line 2\n");
    }

    #[test]
    fn test_annotate_config_document() {
        let doc = Config::default_config().to_annotated_document().unwrap();

        let rendered = doc.to_string();
        assert!(rendered.starts_with("# Application's configuration\n"));
        assert!(rendered.contains("# Path of the SQLite database"));
        assert!(rendered.contains("\n# Prefix of every resource href"));

        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.api_root(), crate::config::DEFAULT_API_ROOT);
    }
}
