pub mod config;
pub mod domain_utils;
pub mod error;
pub mod headers;
pub mod heuristics;
pub mod input;
pub mod link_analyzer;
pub mod machine_learning;
pub mod pdf_export;
pub mod report;
pub mod scanner;
pub mod spelling;
pub mod vocabulary;

pub use config::Config;
pub use heuristics::{HeuristicAnalysis, HeuristicScorer, RiskLabel, RiskVerdict};
pub use report::{build_report, Report};
pub use scanner::{ScanOutcome, Scanner};
pub use vocabulary::Vocabulary;
