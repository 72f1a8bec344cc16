use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("vectorizer has {vocabulary} terms but {idf} idf weights")]
    IdfLength { vocabulary: usize, idf: usize },
    #[error("vocabulary index {index} is out of range for {features} features")]
    TermIndex { index: usize, features: usize },
    #[error("classifier expects {classifier} features, vectorizer produces {vectorizer}")]
    FeatureCount { classifier: usize, vectorizer: usize },
    #[error("classifier must have exactly two classes, found {0}")]
    ClassCount(usize),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}
