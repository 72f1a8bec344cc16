use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use log::LevelFilter;
use phishlens::config::Config;
use phishlens::input::{prepare_input, read_email_file, read_email_stdin};
use phishlens::pdf_export::export_pdf;
use phishlens::report::{build_report, timestamp_now};
use phishlens::scanner::Scanner;
use phishlens::vocabulary::Vocabulary;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("phishlens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing risk scanner for raw email text")
        .long_about(
            "Scores raw email text with rule-based phishing heuristics, optionally\n\
             adds a verdict from a pretrained classifier and a spelling summary,\n\
             and prints a risk report that can also be exported as PDF.",
        )
        .arg(
            Arg::new("email")
                .value_name("FILE")
                .help("Email file to scan (.txt/.eml); reads stdin when omitted"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishlens.yaml"),
        )
        .arg(
            Arg::new("vocabulary")
                .long("vocabulary")
                .value_name("FILE")
                .help("Override the vocabulary file from the configuration"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Report output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("pdf")
                .long("pdf")
                .value_name("FILE")
                .help("Also save the report as a PDF document"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file"),
        )
        .arg(
            Arg::new("generate-vocabulary")
                .long("generate-vocabulary")
                .value_name("FILE")
                .help("Write the built-in keyword vocabulary to a file"),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load configuration, vocabulary and optional model, then exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(path) = matches.get_one::<String>("generate-config") {
        Config::default()
            .to_file(path)
            .with_context(|| format!("writing configuration to {path}"))?;
        println!("Default configuration written to: {path}");
        println!("Please edit the configuration file to suit your needs.");
        return Ok(());
    }

    if let Some(path) = matches.get_one::<String>("generate-vocabulary") {
        Vocabulary::default()
            .to_file(path)
            .with_context(|| format!("writing vocabulary to {path}"))?;
        println!("Default vocabulary written to: {path}");
        return Ok(());
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("phishlens.yaml");
    let mut config = load_config(config_path)?;
    if let Some(vocabulary) = matches.get_one::<String>("vocabulary") {
        config.vocabulary_path = vocabulary.into();
    }

    let scanner = Scanner::from_config(&config).context("loading keyword vocabulary")?;

    if matches.get_flag("test-config") {
        let vocabulary = scanner.vocabulary();
        println!("Configuration OK");
        println!("  Vocabulary: {}", config.vocabulary_path.display());
        println!("    Phishing keywords: {}", vocabulary.phishing_keywords.len());
        println!("    Risky extensions:  {}", vocabulary.risky_extensions.len());
        println!("    URL shorteners:    {}", vocabulary.url_shorteners.len());
        println!("  ML classifier:  {}", availability(scanner.has_classifier()));
        println!("  Spelling check: {}", availability(scanner.has_spell_checker()));
        return Ok(());
    }

    let raw = match matches.get_one::<String>("email") {
        Some(path) => {
            read_email_file(path).with_context(|| format!("reading email file {path}"))?
        }
        None => read_email_stdin().context("reading email from stdin")?,
    };
    let Some(text) = prepare_input(&raw) else {
        anyhow::bail!("No email text provided.");
    };

    let outcome = scanner.scan(text);
    let report = build_report(&outcome, &timestamp_now(&config.report.timestamp_format));

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!("{}", report.to_json()?),
        _ => println!("{report}"),
    }

    if let Some(pdf_path) = matches.get_one::<String>("pdf") {
        export_pdf(report.lines(), pdf_path)?;
        eprintln!("Report saved as {pdf_path}");
    }

    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path).with_context(|| format!("loading configuration {path}"))
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn availability(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "not available"
    }
}
