use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mod-licenses",
    about = "Report the licenses of a Go project's dependencies, grouped by license file",
    version
)]
pub struct Cli {
    /// Import paths or patterns to scan
    #[arg(default_value = "./...")]
    pub packages: Vec<String>,

    /// Read a recorded `go list -e -json -deps` stream instead of running go
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Directory to run `go list` in (and to look for .mod-licenses/config.toml)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Include test packages and their dependencies
    #[arg(long)]
    pub include_tests: bool,

    /// Import-path prefix to skip (repeatable); its dependencies are still scanned
    #[arg(long, value_name = "PREFIX")]
    pub ignore: Vec<String>,

    /// Config file [default: ./.mod-licenses/config.toml, fallback ~/.config/mod-licenses/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum confidence for a file to count as a license (0.0 - 1.0)
    #[arg(long)]
    pub confidence_threshold: Option<f64>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Don't contact source hosts; license URLs are reported as Unknown
    #[arg(long)]
    pub offline: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
