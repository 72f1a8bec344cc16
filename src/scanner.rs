use crate::config::Config;
use crate::error::ConfigError;
use crate::heuristics::{HeuristicAnalysis, HeuristicScorer};
use crate::machine_learning::{LinearTextClassifier, MlVerdict, TextClassifier};
use crate::spelling::{SpellChecker, SpellingAnalyzer, SpellingSummary, WordListSpellChecker};
use crate::vocabulary::Vocabulary;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub heuristics: HeuristicAnalysis,
    pub ml: Option<MlVerdict>,
    pub spelling: Option<SpellingSummary>,
}

/// Runs one scan per call over the heuristics and whichever optional
/// collaborators were available at startup.
pub struct Scanner {
    scorer: HeuristicScorer,
    classifier: Option<Box<dyn TextClassifier>>,
    spell_checker: Option<Box<dyn SpellChecker>>,
    spelling: SpellingAnalyzer,
}

impl Scanner {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            scorer: HeuristicScorer::new(vocabulary),
            classifier: None,
            spell_checker: None,
            spelling: SpellingAnalyzer::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn TextClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_spell_checker(mut self, checker: Box<dyn SpellChecker>) -> Self {
        self.spell_checker = Some(checker);
        self
    }

    /// Build from configuration. Only the vocabulary is required; the
    /// model and dictionary are dropped with a log line when they fail to
    /// load.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let vocabulary = Vocabulary::load_from_file(&config.vocabulary_path)?;
        let mut scanner = Self::new(vocabulary);

        match &config.model {
            Some(model) if model.vectorizer_path.exists() && model.classifier_path.exists() => {
                match LinearTextClassifier::load(&model.vectorizer_path, &model.classifier_path) {
                    Ok(classifier) => scanner = scanner.with_classifier(Box::new(classifier)),
                    Err(e) => log::warn!("ML classification disabled: {}", e),
                }
            }
            Some(model) => log::info!(
                "Model artifacts not found ({}, {}), ML classification disabled",
                model.vectorizer_path.display(),
                model.classifier_path.display()
            ),
            None => log::debug!("No model configured"),
        }

        if let Some(spelling) = &config.spelling {
            match WordListSpellChecker::load_from_file(&spelling.dictionary_path) {
                Ok(checker) if !checker.is_empty() => {
                    scanner = scanner.with_spell_checker(Box::new(checker))
                }
                Ok(_) => log::warn!(
                    "Dictionary {} is empty, spelling check disabled",
                    spelling.dictionary_path.display()
                ),
                Err(e) => log::warn!(
                    "Spelling check disabled, cannot read {}: {}",
                    spelling.dictionary_path.display(),
                    e
                ),
            }
        }

        Ok(scanner)
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_spell_checker(&self) -> bool {
        self.spell_checker.is_some()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.scorer.vocabulary()
    }

    pub fn scan(&self, text: &str) -> ScanOutcome {
        let heuristics = self.scorer.analyze(text);
        let ml = self.classifier.as_ref().map(|c| c.classify(text));
        let spelling = self.spelling.check(text, self.spell_checker.as_deref());

        log::debug!(
            "Scan complete: {} (score {}), ml: {:?}",
            heuristics.verdict.label,
            heuristics.verdict.score,
            ml.as_ref().map(|m| m.label.as_str())
        );

        ScanOutcome {
            heuristics,
            ml,
            spelling,
        }
    }
}
