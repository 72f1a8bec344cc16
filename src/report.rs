use crate::heuristics::RiskLabel;
use crate::scanner::ScanOutcome;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const RULE_WIDTH: usize = 60;

/// Reason substring and the explanation shown when a reason contains it.
const INSIGHTS: [(&str, &str); 5] = [
    (
        "domain",
        "Domain mismatch: sender and link domains differ, a strong phishing sign.",
    ),
    ("short", "Shortened URLs hide the true destination."),
    ("keyword", "Urgent keywords are designed to pressure victims."),
    ("attach", "Attachments with risky extensions may carry malware."),
    ("grammar", "Poor grammar is common in phishing emails."),
];

pub fn suggested_action(label: RiskLabel) -> &'static str {
    match label {
        RiskLabel::Safe => "Likely safe, but stay cautious.",
        RiskLabel::Suspicious => "Be cautious: verify sender, don't click unknown links.",
        RiskLabel::LikelyPhishing => "Likely phishing: do not click links or open attachments.",
    }
}

/// Educational bullets for the reasons that fired, in reason order.
pub fn insights_for(reasons: &[String]) -> Vec<&'static str> {
    let mut insights = Vec::new();
    for reason in reasons {
        let reason = reason.to_lowercase();
        for (needle, insight) in INSIGHTS {
            if reason.contains(needle) && !insights.contains(&insight) {
                insights.push(insight);
            }
        }
    }
    insights
}

/// Current local time rendered with `format`, falling back to the default
/// format when `format` is not a valid strftime string.
pub fn timestamp_now(format: &str) -> String {
    let now = Local::now();
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        log::warn!("Invalid timestamp format {:?}, using default", format);
        return now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
    }
    now.format_with_items(items.into_iter()).to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: String,
    #[serde(flatten)]
    pub outcome: ScanOutcome,
    pub insights: Vec<String>,
    pub suggested_action: String,
    #[serde(skip)]
    lines: Vec<String>,
}

impl Report {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Whole percentages keep one decimal place, so `100.0` prints as `100.0`
/// rather than `100`.
fn format_confidence(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{percent:.1}")
    } else {
        percent.to_string()
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

pub fn build_report(outcome: &ScanOutcome, generated_at: &str) -> Report {
    let heur = &outcome.heuristics;
    let verdict = &heur.verdict;
    let insights = insights_for(&verdict.reasons);
    let action = suggested_action(verdict.label);

    let mut lines = vec![
        format!("Phishing Detector Report - {generated_at}"),
        "=".repeat(RULE_WIDTH),
        format!("From: {}", heur.from),
        format!("Subject: {}", heur.subject),
        format!("Heuristics Result: {} (score {})", verdict.label, verdict.score),
    ];
    if let Some(ml) = &outcome.ml {
        lines.push(format!(
            "ML Result: {} (confidence {}%)",
            ml.label,
            format_confidence(ml.confidence_percent)
        ));
    }

    lines.push(String::new());
    lines.push("Reasons:".to_string());
    lines.extend(verdict.reasons.iter().map(|r| format!("- {r}")));

    lines.push(String::new());
    lines.push(format!("Keywords: {}", list_or_none(&heur.keywords)));
    lines.push(format!("Links: {}", list_or_none(&heur.links)));

    if !heur.mismatches.is_empty() {
        lines.push("Domain mismatches:".to_string());
        lines.extend(
            heur.mismatches
                .iter()
                .map(|m| format!("- {} vs {}", m.link, m.link_domain)),
        );
    }

    lines.push(String::new());
    match &outcome.spelling {
        Some(spelling) => lines.push(format!(
            "Spelling mistakes: {}, samples: {}",
            spelling.count,
            spelling.samples.join(", ")
        )),
        None => lines.push("Spelling check not available.".to_string()),
    }

    lines.push(String::new());
    lines.push("Educational insights:".to_string());
    lines.extend(insights.iter().map(|i| format!("- {i}")));

    lines.push(String::new());
    lines.push("Suggested action:".to_string());
    lines.push(action.to_string());

    Report {
        generated_at: generated_at.to_string(),
        outcome: outcome.clone(),
        insights: insights.into_iter().map(str::to_string).collect(),
        suggested_action: action.to_string(),
        lines,
    }
}
