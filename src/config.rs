use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_vocabulary_path")]
    pub vocabulary_path: PathBuf,
    #[serde(default)]
    pub model: Option<ModelConfig>,
    #[serde(default)]
    pub spelling: Option<SpellingConfig>,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Paths of the exported vectorizer and classifier. Both must load for the
/// ML verdict to appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellingConfig {
    pub dictionary_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_vocabulary_path() -> PathBuf {
    PathBuf::from("keywords.json")
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vocabulary_path: default_vocabulary_path(),
            model: Some(ModelConfig {
                vectorizer_path: PathBuf::from("vectorizer.json"),
                classifier_path: PathBuf::from("phish_model.json"),
            }),
            spelling: Some(SpellingConfig {
                dictionary_path: PathBuf::from("/usr/share/dict/words"),
            }),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.relative_to(path.parent()))
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve relative artifact paths against the directory holding the
    /// config file.
    fn relative_to(mut self, base: Option<&Path>) -> Self {
        let Some(base) = base.filter(|b| !b.as_os_str().is_empty()) else {
            return self;
        };
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.vocabulary_path);
        if let Some(model) = self.model.as_mut() {
            resolve(&mut model.vectorizer_path);
            resolve(&mut model.classifier_path);
        }
        if let Some(spelling) = self.spelling.as_mut() {
            resolve(&mut spelling.dictionary_path);
        }
        self
    }
}
