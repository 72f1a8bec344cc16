use crate::domain_utils::DomainUtils;
use crate::headers::parse_headers;
use crate::link_analyzer::LinkAnalyzer;
use crate::vocabulary::Vocabulary;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLabel {
    Safe,
    Suspicious,
    #[serde(rename = "Likely Phishing")]
    LikelyPhishing,
}

impl RiskLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=40 => RiskLabel::Safe,
            41..=70 => RiskLabel::Suspicious,
            _ => RiskLabel::LikelyPhishing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "Safe",
            RiskLabel::Suspicious => "Suspicious",
            RiskLabel::LikelyPhishing => "Likely Phishing",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based checks, in the order they are evaluated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    LinksPresent,
    DomainMismatch,
    SuspiciousKeywords,
    RiskyAttachment,
    ShortenedUrl,
    NonHttpsLinks,
    GrammarAnomalies,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::LinksPresent,
        Signal::DomainMismatch,
        Signal::SuspiciousKeywords,
        Signal::RiskyAttachment,
        Signal::ShortenedUrl,
        Signal::NonHttpsLinks,
        Signal::GrammarAnomalies,
    ];

    pub fn weight(&self) -> u32 {
        match self {
            Signal::LinksPresent => 10,
            Signal::DomainMismatch => 25,
            Signal::SuspiciousKeywords => 15,
            Signal::RiskyAttachment => 25,
            Signal::ShortenedUrl => 15,
            Signal::NonHttpsLinks => 5,
            Signal::GrammarAnomalies => 8,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Signal::LinksPresent => "Links present",
            Signal::DomainMismatch => "Domain mismatch",
            Signal::SuspiciousKeywords => "Suspicious keywords found",
            Signal::RiskyAttachment => "Risky attachment mention",
            Signal::ShortenedUrl => "Shortened URL used",
            Signal::NonHttpsLinks => "Non-HTTPS links",
            Signal::GrammarAnomalies => "Grammar anomalies",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskVerdict {
    pub label: RiskLabel,
    pub score: u32,
    pub reasons: Vec<String>,
}

impl RiskVerdict {
    pub fn from_signals(signals: &[Signal]) -> Self {
        let score = signals
            .iter()
            .map(Signal::weight)
            .sum::<u32>()
            .min(MAX_SCORE);
        Self {
            label: RiskLabel::from_score(score),
            score,
            reasons: signals.iter().map(|s| s.reason().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainMismatch {
    pub link: String,
    pub link_domain: String,
}

/// Verdict plus the evidence each signal was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeuristicAnalysis {
    pub verdict: RiskVerdict,
    pub from: String,
    pub subject: String,
    pub links: Vec<String>,
    pub keywords: Vec<String>,
    pub mismatches: Vec<DomainMismatch>,
    pub risky_extensions: Vec<String>,
    pub shortened_links: Vec<String>,
    pub non_https_links: Vec<String>,
    /// One point per anomaly kind: repeated `!`/`?`, and all-caps words.
    pub grammar_anomalies: u8,
}

impl HeuristicAnalysis {
    pub fn signals(&self) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|signal| match signal {
                Signal::LinksPresent => !self.links.is_empty(),
                Signal::DomainMismatch => !self.mismatches.is_empty(),
                Signal::SuspiciousKeywords => !self.keywords.is_empty(),
                Signal::RiskyAttachment => !self.risky_extensions.is_empty(),
                Signal::ShortenedUrl => !self.shortened_links.is_empty(),
                Signal::NonHttpsLinks => !self.non_https_links.is_empty(),
                Signal::GrammarAnomalies => self.grammar_anomalies > 0,
            })
            .collect()
    }
}

pub struct HeuristicScorer {
    vocabulary: Vocabulary,
    link_analyzer: LinkAnalyzer,
    repeated_punctuation: Regex,
    shouted_word: Regex,
}

impl HeuristicScorer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary: vocabulary.normalized(),
            link_analyzer: LinkAnalyzer::new(),
            repeated_punctuation: Regex::new(r"!{2,}|\?{2,}").expect("punctuation pattern is valid"),
            shouted_word: Regex::new(r"\b[A-Z]{3,}\b").expect("caps pattern is valid"),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Score raw email text. Total over all inputs, including the empty
    /// string.
    pub fn analyze(&self, text: &str) -> HeuristicAnalysis {
        let lower = text.to_lowercase();
        let headers = parse_headers(text);
        let links = self.link_analyzer.extract_links(text);

        let keywords = matching_entries(&lower, &self.vocabulary.phishing_keywords);
        let risky_extensions = matching_entries(&lower, &self.vocabulary.risky_extensions);

        let shortened_links: Vec<String> = links
            .iter()
            .filter(|link| LinkAnalyzer::is_shortened(link, &self.vocabulary.url_shorteners))
            .cloned()
            .collect();
        let non_https_links: Vec<String> = links
            .iter()
            .filter(|link| LinkAnalyzer::is_non_https(link))
            .cloned()
            .collect();

        let mismatches = match DomainUtils::sender_domain(&headers.from) {
            Some(sender_domain) => links
                .iter()
                .filter_map(|link| {
                    let link_domain = DomainUtils::domain_of(link);
                    (!DomainUtils::contains_domain(&link_domain, &sender_domain)).then(|| {
                        DomainMismatch {
                            link: link.clone(),
                            link_domain,
                        }
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        let mut grammar_anomalies = 0;
        if self.repeated_punctuation.is_match(text) {
            grammar_anomalies += 1;
        }
        if self.shouted_word.is_match(text) {
            grammar_anomalies += 1;
        }

        let mut analysis = HeuristicAnalysis {
            verdict: RiskVerdict::from_signals(&[]),
            from: headers.from,
            subject: headers.subject,
            links,
            keywords,
            mismatches,
            risky_extensions,
            shortened_links,
            non_https_links,
            grammar_anomalies,
        };
        analysis.verdict = RiskVerdict::from_signals(&analysis.signals());

        log::debug!(
            "Heuristic verdict: {} (score {}), reasons: {:?}",
            analysis.verdict.label,
            analysis.verdict.score,
            analysis.verdict.reasons
        );
        analysis
    }

    pub fn score(&self, text: &str) -> RiskVerdict {
        self.analyze(text).verdict
    }
}

fn matching_entries(lower_text: &str, entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| lower_text.contains(entry.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            phishing_keywords: vec!["urgent".to_string(), "verify your account".to_string()],
            risky_extensions: vec![".exe".to_string(), ".scr".to_string()],
            url_shorteners: vec!["bit.ly".to_string(), "tinyurl.com".to_string()],
        }
    }

    fn scorer() -> HeuristicScorer {
        HeuristicScorer::new(vocabulary())
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(RiskLabel::from_score(0), RiskLabel::Safe);
        assert_eq!(RiskLabel::from_score(40), RiskLabel::Safe);
        assert_eq!(RiskLabel::from_score(41), RiskLabel::Suspicious);
        assert_eq!(RiskLabel::from_score(70), RiskLabel::Suspicious);
        assert_eq!(RiskLabel::from_score(71), RiskLabel::LikelyPhishing);
        assert_eq!(RiskLabel::from_score(100), RiskLabel::LikelyPhishing);
    }

    #[test]
    fn test_empty_text_is_safe() {
        let analysis = scorer().analyze("");
        assert_eq!(analysis.verdict.score, 0);
        assert_eq!(analysis.verdict.label, RiskLabel::Safe);
        assert!(analysis.verdict.reasons.is_empty());
        assert!(analysis.links.is_empty());
        assert!(analysis.keywords.is_empty());
        assert!(analysis.from.is_empty());
        assert!(analysis.subject.is_empty());
    }

    #[test]
    fn test_shortened_http_link_with_foreign_sender() {
        let analysis = scorer().analyze("From: a@example.com\n\nSee http://bit.ly/x");
        assert_eq!(analysis.links, vec!["http://bit.ly/x"]);
        assert_eq!(analysis.shortened_links, vec!["http://bit.ly/x"]);
        assert_eq!(analysis.non_https_links, vec!["http://bit.ly/x"]);
        assert_eq!(
            analysis.mismatches,
            vec![DomainMismatch {
                link: "http://bit.ly/x".to_string(),
                link_domain: "bit.ly".to_string(),
            }]
        );
        assert_eq!(analysis.verdict.score, 55);
        assert_eq!(analysis.verdict.label, RiskLabel::Suspicious);
        assert_eq!(
            analysis.verdict.reasons,
            vec![
                "Links present",
                "Domain mismatch",
                "Shortened URL used",
                "Non-HTTPS links"
            ]
        );
    }

    #[test]
    fn test_urgent_www_link_stays_safe_at_boundary() {
        let scorer = HeuristicScorer::new(Vocabulary {
            phishing_keywords: vec!["urgent".to_string()],
            risky_extensions: vec![],
            url_shorteners: vec![],
        });
        let verdict = scorer.score("URGENT!! Verify your account now www.paypal-secure-login.com");
        assert_eq!(verdict.score, 33);
        assert_eq!(verdict.label, RiskLabel::Safe);
        assert_eq!(
            verdict.reasons,
            vec!["Links present", "Suspicious keywords found", "Grammar anomalies"]
        );
    }

    #[test]
    fn test_aligned_https_link_has_no_mismatch() {
        let analysis = scorer().analyze("From: user@bank.com\nPlease log in at https://bank.com/login");
        assert!(analysis.mismatches.is_empty());
        assert!(analysis.non_https_links.is_empty());
        assert_eq!(analysis.verdict.score, 10);
        assert_eq!(analysis.verdict.reasons, vec!["Links present"]);
    }

    #[test]
    fn test_substring_alignment_is_preserved() {
        let analysis = scorer().analyze("From: a@example.com\nhttps://notexample.com/x");
        assert!(analysis.mismatches.is_empty());
    }

    #[test]
    fn test_sender_without_at_skips_mismatch() {
        let analysis = scorer().analyze("From: Bank Support\nhttps://evil.example/x");
        assert!(analysis.mismatches.is_empty());
    }

    #[test]
    fn test_bracketed_sender_keeps_closing_bracket_in_domain() {
        let analysis = scorer().analyze("From: Bank <support@bank.com>\nhttps://bank.com/login");
        assert_eq!(
            analysis.mismatches,
            vec![DomainMismatch {
                link: "https://bank.com/login".to_string(),
                link_domain: "bank.com".to_string(),
            }]
        );
        assert_eq!(analysis.verdict.score, 35);
        assert_eq!(analysis.verdict.reasons, vec!["Links present", "Domain mismatch"]);
    }

    #[test]
    fn test_uppercase_scheme_is_not_flagged_as_non_https() {
        let analysis = scorer().analyze("HTTP://example.com/a");
        assert!(analysis.non_https_links.is_empty());
        assert_eq!(analysis.verdict.score, 18);
        assert_eq!(analysis.verdict.reasons, vec!["Links present", "Grammar anomalies"]);

        let analysis = scorer().analyze("see https://BIT.LY/x");
        assert!(analysis.shortened_links.is_empty());
        assert_eq!(analysis.verdict.score, 10);
    }

    #[test]
    fn test_each_signal_in_isolation() {
        let scorer = scorer();
        let cases: [(&str, u32, &str); 6] = [
            ("visit https://example.com/a today", 10, "Links present"),
            ("this is urgent please", 15, "Suspicious keywords found"),
            ("open the attached invoice.exe file", 25, "Risky attachment mention"),
            ("what is this?? hm", 8, "Grammar anomalies"),
            ("this is VERY bad", 8, "Grammar anomalies"),
            ("wow!! ok", 8, "Grammar anomalies"),
        ];
        for (text, score, reason) in cases {
            let verdict = scorer.score(text);
            assert_eq!(verdict.score, score, "score for {text:?}");
            assert_eq!(verdict.reasons, vec![reason], "reasons for {text:?}");
        }

        // shortener, non-https and mismatch always ride on top of link presence
        let verdict = scorer.score("https://bit.ly/abc");
        assert_eq!(verdict.score, 10 + 15);
        assert_eq!(verdict.reasons, vec!["Links present", "Shortened URL used"]);

        let verdict = scorer.score("http://example.com/a");
        assert_eq!(verdict.score, 10 + 5);
        assert_eq!(verdict.reasons, vec!["Links present", "Non-HTTPS links"]);

        let verdict = scorer.score("From: a@bank.com\nhttps://other.com/a");
        assert_eq!(verdict.score, 10 + 25);
        assert_eq!(verdict.reasons, vec!["Links present", "Domain mismatch"]);
    }

    #[test]
    fn test_two_letter_caps_and_single_punctuation_are_fine() {
        let verdict = scorer().score("Hi! Is it OK? Yes.");
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn test_grammar_counts_both_kinds_once() {
        let analysis = scorer().analyze("WHAT!!! WHY??? NOW");
        assert_eq!(analysis.grammar_anomalies, 2);
        assert_eq!(analysis.verdict.score, 8);
    }

    #[test]
    fn test_score_is_capped() {
        let text = "From: x@corp.com\nURGENT!! run setup.exe from http://bit.ly/a http://tinyurl.com/b";
        let verdict = scorer().score(text);
        // 10 + 25 + 15 + 25 + 15 + 5 + 8 = 103
        assert_eq!(verdict.score, 100);
        assert_eq!(verdict.label, RiskLabel::LikelyPhishing);
        assert_eq!(verdict.reasons.len(), 7);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = scorer();
        let text = "From: a@b.com\nSubject: hi\nURGENT http://bit.ly/x";
        assert_eq!(scorer.analyze(text), scorer.analyze(text));
    }

    #[test]
    fn test_keywords_listed_in_vocabulary_order() {
        let analysis = scorer().analyze("Please VERIFY YOUR ACCOUNT, it is Urgent");
        assert_eq!(analysis.keywords, vec!["urgent", "verify your account"]);
    }

    #[test]
    fn test_vocabulary_is_normalized_on_construction() {
        let scorer = HeuristicScorer::new(Vocabulary {
            phishing_keywords: vec!["URGENT".to_string(), "".to_string()],
            risky_extensions: vec![],
            url_shorteners: vec!["Bit.Ly".to_string()],
        });
        assert_eq!(scorer.vocabulary().phishing_keywords, vec!["urgent"]);
        assert_eq!(scorer.score("nothing to see").score, 0);
        assert_eq!(scorer.score("https://bit.ly/x").score, 25);
    }

    #[test]
    fn test_score_stays_in_bounds_for_odd_inputs() {
        let scorer = scorer();
        for text in ["\0\0\0", "ÄÖÜ!!", "http://", "www.", "From:\nSubject:", "@@@ http://@/"] {
            let verdict = scorer.score(text);
            assert!(verdict.score <= MAX_SCORE);
            assert_eq!(verdict.label, RiskLabel::from_score(verdict.score));
        }
    }
}
