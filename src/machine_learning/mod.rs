//! Inference for the optional statistical classifier.
//!
//! The model is trained offline (TF-IDF features, binary logistic
//! regression) and exported as two JSON artifacts. Only prediction happens
//! here.
//!
//! `vectorizer.json` holds `vocabulary` (term to column index), `idf`, and
//! optionally `stop_words`, `lowercase`, `norm` (`"l2"` or `"none"`) and
//! `sublinear_tf`. `phish_model.json` holds `classes`, `coef` (one weight
//! per column) and `intercept`. From a fitted scikit-learn
//! `TfidfVectorizer` / `LogisticRegression` pair:
//!
//! ```python
//! import json
//! json.dump({"vocabulary": {t: int(i) for t, i in vectorizer.vocabulary_.items()},
//!            "idf": vectorizer.idf_.tolist(),
//!            "stop_words": sorted(vectorizer.get_stop_words() or []),
//!            "lowercase": vectorizer.lowercase, "norm": vectorizer.norm or "none",
//!            "sublinear_tf": vectorizer.sublinear_tf},
//!           open("vectorizer.json", "w"))
//! json.dump({"classes": model.classes_.tolist(), "coef": model.coef_[0].tolist(),
//!            "intercept": float(model.intercept_[0])},
//!           open("phish_model.json", "w"))
//! ```

use crate::error::ModelError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Class value the training pipeline uses for phishing samples.
pub const POSITIVE_CLASS: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlVerdict {
    pub label: String,
    pub confidence_percent: f64,
}

impl MlVerdict {
    pub fn is_phishing(&self) -> bool {
        self.label == PHISHING_LABEL
    }
}

const PHISHING_LABEL: &str = "Phishing (ML)";
const SAFE_LABEL: &str = "Safe (ML)";

/// A classifier that labels raw email text independently of the heuristics.
pub trait TextClassifier {
    fn classify(&self, text: &str) -> MlVerdict;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default)]
    pub sublinear_tf: bool,
}

pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    stop_words: HashSet<String>,
    lowercase: bool,
    norm: Norm,
    sublinear_tf: bool,
    token_regex: Regex,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ModelError> {
        let features = artifact.idf.len();
        if artifact.vocabulary.len() > features {
            return Err(ModelError::IdfLength {
                vocabulary: artifact.vocabulary.len(),
                idf: features,
            });
        }
        if let Some(&index) = artifact.vocabulary.values().find(|&&i| i >= features) {
            return Err(ModelError::TermIndex { index, features });
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            stop_words: artifact.stop_words.into_iter().collect(),
            lowercase: artifact.lowercase,
            norm: artifact.norm,
            sublinear_tf: artifact.sublinear_tf,
            token_regex: Regex::new(r"\b\w\w+\b").expect("token pattern is valid"),
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::from_artifact(read_artifact(path.as_ref())?)
    }

    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    /// Sparse TF-IDF row as `(feature index, weight)`, sorted by index.
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in self.token_regex.find_iter(&text) {
            let token = token.as_str();
            if self.stop_words.contains(token) {
                continue;
            }
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
                (index, tf * self.idf[index])
            })
            .collect();
        row.sort_by_key(|(index, _)| *index);

        if self.norm == Norm::L2 {
            let length = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if length > 0.0 {
                for (_, weight) in &mut row {
                    *weight /= length;
                }
            }
        }
        row
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionArtifact {
    pub classes: Vec<i64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

pub struct LogisticRegression {
    classes: [i64; 2],
    coef: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn from_artifact(artifact: LogisticRegressionArtifact) -> Result<Self, ModelError> {
        let classes: [i64; 2] = artifact
            .classes
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::ClassCount(artifact.classes.len()))?;
        Ok(Self {
            classes,
            coef: artifact.coef,
            intercept: artifact.intercept,
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::from_artifact(read_artifact(path.as_ref())?)
    }

    pub fn feature_count(&self) -> usize {
        self.coef.len()
    }

    /// Probabilities for `[classes[0], classes[1]]`.
    pub fn predict_proba(&self, row: &[(usize, f64)]) -> [f64; 2] {
        let decision = self.intercept
            + row
                .iter()
                .filter_map(|&(index, weight)| self.coef.get(index).map(|c| c * weight))
                .sum::<f64>();
        let positive = 1.0 / (1.0 + (-decision).exp());
        [1.0 - positive, positive]
    }

    pub fn predict(&self, row: &[(usize, f64)]) -> i64 {
        let [negative, positive] = self.predict_proba(row);
        if positive > negative {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }
}

/// TF-IDF vectorizer and logistic regression used together.
pub struct LinearTextClassifier {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
}

impl LinearTextClassifier {
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticRegression) -> Result<Self, ModelError> {
        if vectorizer.feature_count() != model.feature_count() {
            return Err(ModelError::FeatureCount {
                classifier: model.feature_count(),
                vectorizer: vectorizer.feature_count(),
            });
        }
        Ok(Self { vectorizer, model })
    }

    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self, ModelError> {
        let vectorizer = TfidfVectorizer::load_from_file(vectorizer_path)?;
        let model = LogisticRegression::load_from_file(classifier_path)?;
        let classifier = Self::new(vectorizer, model)?;
        log::info!(
            "Loaded ML classifier with {} features",
            classifier.vectorizer.feature_count()
        );
        Ok(classifier)
    }
}

impl TextClassifier for LinearTextClassifier {
    fn classify(&self, text: &str) -> MlVerdict {
        let row = self.vectorizer.transform(text);
        let probabilities = self.model.predict_proba(&row);
        let predicted = self.model.predict(&row);
        let confidence = probabilities[0].max(probabilities[1]);

        MlVerdict {
            label: if predicted == POSITIVE_CLASS {
                PHISHING_LABEL.to_string()
            } else {
                SAFE_LABEL.to_string()
            },
            confidence_percent: (confidence * 100.0 * 100.0).round() / 100.0,
        }
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
