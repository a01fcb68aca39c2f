use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Module text lookup table loaded from `locale/<lang>.ini`.
///
/// Lines have the form `Key="Value"` (quotes optional). `#` and `;` start
/// comments. Unknown keys resolve to the key itself.
#[derive(Debug, Clone, Default)]
pub struct Locale {
    entries: HashMap<String, String>,
}

impl Locale {
    pub fn parse(source: &str) -> Self {
        let mut entries = HashMap::new();
        for (index, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                tracing::debug!(line = index + 1, "skipping malformed locale line");
                continue;
            };
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .unwrap_or(value);
            entries.insert(key.trim().to_string(), value.replace("\\n", "\n"));
        }
        Self { entries }
    }

    /// Loads `<data_dir>/locale/<lang>.ini`, layering it over the default locale.
    pub fn load(data_dir: &Path, lang: &str) -> Result<Self> {
        let default_path = data_dir.join("locale").join(format!("{DEFAULT_LOCALE}.ini"));
        let mut locale = match std::fs::read_to_string(&default_path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                tracing::warn!(
                    path = %default_path.display(),
                    error = %err,
                    "default locale missing; falling back to raw keys"
                );
                Self::default()
            }
        };

        if lang != DEFAULT_LOCALE {
            let path = data_dir.join("locale").join(format!("{lang}.ini"));
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read locale file at {}", path.display()))?;
            locale.entries.extend(Self::parse(&contents).entries);
        }

        Ok(locale)
    }

    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_values() {
        let locale = Locale::parse(
            "# comment\nGBIHFFilter=\"Mirror\"\nSwitchLeftToRight = Switch Left To Right\n; other\nbroken line\n",
        );
        assert_eq!(locale.text("GBIHFFilter"), "Mirror");
        assert_eq!(locale.text("SwitchLeftToRight"), "Switch Left To Right");
        assert!(!locale.contains("broken line"));
    }

    #[test]
    fn unknown_keys_resolve_to_themselves() {
        let locale = Locale::default();
        assert_eq!(locale.text("GBIHFFilter"), "GBIHFFilter");
    }

    #[test]
    fn layers_requested_language_over_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let locale_dir = dir.path().join("locale");
        std::fs::create_dir_all(&locale_dir).unwrap();
        std::fs::write(
            locale_dir.join("en-US.ini"),
            "GBIHFFilter=\"Mirror\"\nSwitchLeftToRight=\"Switch Left To Right\"\n",
        )
        .unwrap();
        std::fs::write(locale_dir.join("de-DE.ini"), "GBIHFFilter=\"Spiegel\"\n").unwrap();

        let locale = Locale::load(dir.path(), "de-DE").unwrap();
        assert_eq!(locale.text("GBIHFFilter"), "Spiegel");
        assert_eq!(locale.text("SwitchLeftToRight"), "Switch Left To Right");

        assert!(Locale::load(dir.path(), "fr-FR").is_err());
    }
}
