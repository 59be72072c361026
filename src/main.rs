//! # Versewright Command Driver
//!
//! ## Purpose
//! Command-line entry point for the corpus normalization pipeline. Each
//! subcommand is one boundary operation: restore preferred terms, modernize
//! diction, process extras with structure preservation, parse a source
//! document, or fetch one.
//!
//! ## Input/Output Specification
//! - **Input**: positional/flagged file paths, JSON configuration
//! - **Output**: corpus JSON, serialized verse lines, CSV replacement report
//! - **Exit status**: 0 on success, 2 on missing/invalid input or
//!   configuration
//!
//! ## Architecture Flow
//! 1. Parse command line arguments
//! 2. Initialize logging (verbosity flags, `RUST_LOG` override)
//! 3. Load and validate configuration (fatal before any output is written)
//! 4. Run the requested pipeline stage
//! 5. Write all outputs, then the run summary

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use versewright::{
    config::{OverrideConfig, RuleConfig},
    errors::Result,
    ingestion::{self, SourceFormat},
    modernize,
    overrides::{LiteralOverrides, OverrideMap},
    pipeline, rules, storage,
};

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("restore", sub)) => run_restore(sub),
        Some(("modernize", sub)) => run_modernize(sub),
        Some(("process-extras", sub)) => run_process_extras(sub),
        Some(("parse", sub)) => run_parse(sub),
        Some(("fetch", sub)) => run_fetch(sub),
        _ => unreachable!("subcommand required"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} error: {}", e.category(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_cli() -> Command {
    Command::new("versewright")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based normalization pipeline for book/chapter/verse corpora")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase verbosity (-v, -vv)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("restore")
                .about("Apply restored-name rules and verse overrides to a corpus")
                .arg(arg_path("input", "Corpus JSON to process", true))
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_name("FILE")
                        .help("Rule configuration JSON")
                        .default_value("config/restored_names_config.json"),
                )
                .arg(
                    Arg::new("overrides")
                        .long("overrides")
                        .value_name("FILE")
                        .help("Verse-level override JSON")
                        .default_value("config/restored_overrides.json"),
                )
                .arg(
                    Arg::new("out-json")
                        .long("out-json")
                        .value_name("FILE")
                        .help("Path to write the restored corpus JSON")
                        .default_value("build/restored.json"),
                )
                .arg(
                    Arg::new("out-text")
                        .long("out-text")
                        .value_name("FILE")
                        .help("Also write the corpus as verse lines"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("FILE")
                        .help("Path to write the replacement report CSV")
                        .default_value("build/replacements_report.csv"),
                )
                .arg(
                    Arg::new("line-mode")
                        .long("line-mode")
                        .help(
                            "Apply rules to whole serialized lines (address prefix \
                             included) instead of verse text only",
                        )
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("modernize")
                .about("Modernize archaic English across a corpus")
                .arg(arg_path("input", "Corpus JSON to modernize", true))
                .arg(arg_path("output", "Path for the modernized corpus", true)),
        )
        .subcommand(
            Command::new("process-extras")
                .about(
                    "Apply rules, literal overrides, and modernization while \
                     preserving empty chapters",
                )
                .arg(arg_path("input", "Extras corpus JSON", true))
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_name("FILE")
                        .help("Rule configuration JSON")
                        .default_value("config/restored_names_config.json"),
                )
                .arg(
                    Arg::new("overrides")
                        .long("overrides")
                        .value_name("FILE")
                        .help("Override JSON (flat replacements variant)")
                        .default_value("config/restored_overrides.json"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_name("FILE")
                        .help("Output path (defaults to rewriting the input in place)"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a source document into the canonical corpus JSON")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .help("Source format: plain-lines, chapter-text, enoch-markdown")
                        .required(true),
                )
                .arg(arg_path("input", "Source document", true))
                .arg(arg_path("output", "Path for the corpus JSON", true)),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download a source document with a bounded wait")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .value_name("URL")
                        .help("Source URL")
                        .required(true),
                )
                .arg(arg_path("output", "Path to write the fetched body", true))
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Bounded wait before the fetch fails")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("60"),
                ),
        )
}

fn arg_path(name: &'static str, help: &'static str, required: bool) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("FILE")
        .help(help)
        .required(required)
}

/// Map `-v` flags to a default filter, with `RUST_LOG` taking precedence
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("versewright={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_restore(matches: &ArgMatches) -> Result<()> {
    // Configuration is loaded and validated before the corpus is touched; a
    // bad rule table must never produce partial output.
    let rule_config = RuleConfig::from_file(matches.get_one::<String>("rules").unwrap())?;
    let override_config =
        OverrideConfig::from_file(matches.get_one::<String>("overrides").unwrap())?;
    let compiled = rules::compile_rules(&rule_config)?;
    let override_map = OverrideMap::from_config(&override_config)?;

    let corpus = storage::load_corpus(matches.get_one::<String>("input").unwrap())?;

    let (restored, outcome) = if matches.get_flag("line-mode") {
        pipeline::process_corpus(&corpus, &compiled, &override_map)?
    } else {
        pipeline::process_corpus_preserving_structure(
            &corpus,
            &compiled,
            &override_map,
            &LiteralOverrides::default(),
            false,
        )?
    };

    storage::save_corpus(matches.get_one::<String>("out-json").unwrap(), &restored)?;
    if let Some(out_text) = matches.get_one::<String>("out-text") {
        storage::save_corpus_lines(out_text, &restored)?;
    }
    storage::save_report_csv(matches.get_one::<String>("report").unwrap(), &outcome.report)?;
    Ok(())
}

fn run_modernize(matches: &ArgMatches) -> Result<()> {
    let corpus = storage::load_corpus(matches.get_one::<String>("input").unwrap())?;
    let (modernized, modified) = modernize::modernize_corpus(&corpus);
    storage::save_corpus(matches.get_one::<String>("output").unwrap(), &modernized)?;
    info!("Modernized {} of {} verses", modified, corpus.verse_count());
    Ok(())
}

fn run_process_extras(matches: &ArgMatches) -> Result<()> {
    let rule_config = RuleConfig::from_file(matches.get_one::<String>("rules").unwrap())?;
    let override_config =
        OverrideConfig::from_file(matches.get_one::<String>("overrides").unwrap())?;
    let compiled = rules::compile_rules(&rule_config)?;
    let literals = LiteralOverrides::from_config(&override_config);

    let input = matches.get_one::<String>("input").unwrap();
    let corpus = storage::load_corpus(input)?;
    let (processed, outcome) = pipeline::process_corpus_preserving_structure(
        &corpus,
        &compiled,
        &OverrideMap::default(),
        &literals,
        true,
    )?;

    let output = matches.get_one::<String>("output").unwrap_or(input);
    storage::save_corpus(output, &processed)?;
    info!(
        "Processed {} verses across {} chapters",
        outcome.verses_out,
        processed.chapter_count()
    );
    Ok(())
}

fn run_parse(matches: &ArgMatches) -> Result<()> {
    let format: SourceFormat = matches.get_one::<String>("format").unwrap().parse()?;
    let text = storage::load_text(matches.get_one::<String>("input").unwrap())?;
    let corpus = ingestion::parse_source(format, &text)?;
    storage::save_corpus(matches.get_one::<String>("output").unwrap(), &corpus)
}

fn run_fetch(matches: &ArgMatches) -> Result<()> {
    let url = matches.get_one::<String>("url").unwrap();
    let timeout = Duration::from_secs(*matches.get_one::<u64>("timeout").unwrap());
    let body = ingestion::fetch_text(url, timeout)?;
    let output = matches.get_one::<String>("output").unwrap();
    std::fs::write(output, &body)?;
    info!("Saved fetched document: {}", output);
    Ok(())
}
