use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

const MAX_TOKENS: usize = 2000;
const MAX_SAMPLES: usize = 10;

/// Dictionary lookup used by the optional spelling check.
pub trait SpellChecker {
    /// Words from `words` the dictionary does not know. Input is already
    /// lowercased.
    fn unknown_words(&self, words: &[String]) -> Vec<String>;
}

/// Spellchecker backed by a plain word list, one word per line.
pub struct WordListSpellChecker {
    words: HashSet<String>,
}

impl WordListSpellChecker {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let checker = Self::new(content.lines());
        log::info!(
            "Loaded spelling dictionary {} ({} words)",
            path.as_ref().display(),
            checker.len()
        );
        Ok(checker)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SpellChecker for WordListSpellChecker {
    fn unknown_words(&self, words: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        words
            .iter()
            .filter(|w| !self.words.contains(w.as_str()))
            .filter(|w| seen.insert(w.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellingSummary {
    pub count: usize,
    pub samples: Vec<String>,
}

pub struct SpellingAnalyzer {
    word_regex: Regex,
}

impl Default for SpellingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpellingAnalyzer {
    pub fn new() -> Self {
        Self {
            word_regex: Regex::new(r"\b[a-zA-Z']{2,}\b").expect("word pattern is valid"),
        }
    }

    /// First 2000 word tokens, lowercased.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_regex
            .find_iter(text)
            .take(MAX_TOKENS)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// `None` when no checker is available.
    pub fn check(&self, text: &str, checker: Option<&dyn SpellChecker>) -> Option<SpellingSummary> {
        let checker = checker?;
        let unknown = checker.unknown_words(&self.tokenize(text));
        Some(SpellingSummary {
            count: unknown.len(),
            samples: unknown.into_iter().take(MAX_SAMPLES).collect(),
        })
    }
}
