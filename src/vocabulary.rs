use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Keyword, extension and shortener lists the heuristics match against.
///
/// Loaded once at startup and never mutated afterwards. Entries are
/// normalized to lowercase on load so matching can run against lowercased
/// text directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vocabulary {
    pub phishing_keywords: Vec<String>,
    pub risky_extensions: Vec<String>,
    pub url_shorteners: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let to_vec =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            phishing_keywords: to_vec(&[
                "urgent",
                "verify your account",
                "account suspended",
                "confirm your identity",
                "update your payment",
                "unusual activity",
                "password expired",
                "click here",
                "act now",
                "limited time",
                "you have won",
                "wire transfer",
                "gift card",
                "login immediately",
            ]),
            risky_extensions: to_vec(&[
                ".exe", ".scr", ".bat", ".cmd", ".js", ".vbs", ".jar", ".msi", ".iso", ".docm",
                ".xlsm", ".zip", ".rar",
            ]),
            url_shorteners: to_vec(&[
                "bit.ly",
                "tinyurl.com",
                "goo.gl",
                "t.co",
                "ow.ly",
                "is.gd",
                "buff.ly",
                "cutt.ly",
                "rebrand.ly",
                "shorturl.at",
            ]),
        }
    }
}

impl Vocabulary {
    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let vocabulary: Vocabulary = if is_json {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        let vocabulary = vocabulary.normalized();
        log::info!(
            "Loaded vocabulary from {}: {} keywords, {} extensions, {} shorteners",
            path.display(),
            vocabulary.phishing_keywords.len(),
            vocabulary.risky_extensions.len(),
            vocabulary.url_shorteners.len()
        );
        Ok(vocabulary)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lowercase every entry and drop blanks. An empty entry would match
    /// every text as a substring.
    pub fn normalized(self) -> Self {
        fn clean(items: Vec<String>) -> Vec<String> {
            items
                .into_iter()
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        }

        Self {
            phishing_keywords: clean(self.phishing_keywords),
            risky_extensions: clean(self.risky_extensions),
            url_shorteners: clean(self.url_shorteners),
        }
    }
}
