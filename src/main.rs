//! `mod-licenses`: group a Go project's dependencies by license file and
//! report the license of each group.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and initialise logging.
//! 2. Load config ([`config::load_config`]); CLI flags override it.
//! 3. Load the package graph ([`graph`]).
//! 4. Filter, locate licenses and group into libraries ([`scan::libraries`]).
//! 5. Identify licenses and resolve license URLs ([`report::build_report`]).
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0`, or `1` when any library's license is unknown.

mod cli;
mod config;
mod error;
mod graph;
mod license;
mod locator;
mod models;
mod report;
mod scan;
mod source;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;
use graph::go_list::{GoListLoader, RecordedGraph};
use graph::{detect_go_root, GraphLoader};
use license::classifier::PhraseClassifier;
use locator::FsLicenseLocator;
use scan::FilterOptions;
use source::remote::RemoteSourceHost;
use source::SourceHost;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.dir.canonicalize().unwrap_or_else(|_| cli.dir.clone());
    let config = load_config(&dir, cli.config.as_deref())?;

    let include_tests = cli.include_tests || config.scan.include_tests;
    let mut ignored = config.scan.ignore.clone();
    ignored.extend(cli.ignore.iter().cloned());
    let threshold = cli
        .confidence_threshold
        .unwrap_or(config.classifier.confidence_threshold);

    let loader: Box<dyn GraphLoader> = match &cli.graph {
        Some(path) => Box::new(RecordedGraph { path: path.clone() }),
        None => Box::new(GoListLoader::new(include_tests, Some(dir.clone()))),
    };
    let graph = loader.load(&cli.packages)?;
    if !cli.quiet {
        eprintln!(
            "  {} loaded {} packages ({} roots)",
            "→".cyan(),
            graph.packages.len(),
            graph.roots.len()
        );
    }

    let options = FilterOptions {
        include_tests,
        ignored,
        stdlib_root: detect_go_root(config.scan.go_root.as_deref(), "go"),
    };
    let classifier = PhraseClassifier::new(threshold)?;
    let locator = FsLicenseLocator::new(&classifier)?;
    let libraries = scan::libraries(&graph, &options, &locator)?;
    if !cli.quiet {
        eprintln!("  {} {} libraries", "→".cyan(), libraries.len());
    }

    let remote = if cli.offline {
        None
    } else {
        Some(RemoteSourceHost::new(Duration::from_secs(
            config.source.timeout_secs,
        ))?)
    };
    let host = remote.as_ref().map(|r| r as &dyn SourceHost);
    let rows = report::build_report(&libraries, &classifier, host, !cli.quiet).await?;

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&rows, &cli.packages, cli.quiet)?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }

    if rows.iter().any(|r| r.has_unknown_license()) {
        std::process::exit(1);
    }

    Ok(())
}
