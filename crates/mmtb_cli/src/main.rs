//! mmtb CLI: runs clock/reset/stimulus testbenches against memory-mapped designs.
//!
//! `mmtb test` runs the testbenches declared in `mmtb.toml` (or the built-in
//! `mm_axi` and `mm_mod` scenarios when no configuration is found) and
//! `mmtb list` prints their names.

#![warn(missing_docs)]

mod list;
mod project;
mod test;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

/// Command line of the `mmtb` binary.
#[derive(Parser, Debug)]
#[command(name = "mmtb", version, about = "Memory-mapped peripheral testbench runner")]
pub struct Cli {
    /// Only report errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level and show more detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an `mmtb.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Simulated time limit per test (e.g., "100ns", "1us").
    #[arg(long, global = true)]
    pub time_limit: Option<String>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run testbenches and report pass/fail.
    Test(TestArgs),
    /// Print the testbench names.
    List,
}

/// Arguments for the `mmtb test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Run only the testbench with exactly this name.
    pub name: Option<String>,

    /// Run only testbenches whose name contains this text.
    #[arg(long)]
    pub filter: Option<String>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Test report format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Status lines on stderr.
    Text,
    /// A JSON report on stdout.
    Json,
}

/// The flags every subcommand sees.
pub struct GlobalArgs {
    /// `--quiet`.
    pub quiet: bool,
    /// `--verbose`.
    pub verbose: bool,
    /// Optional path to a config file or its directory.
    pub config: Option<String>,
    /// Optional time limit overriding the configured one.
    pub time_limit: Option<String>,
}

/// Log level implied by `--quiet` / `--verbose`. `RUST_LOG` still overrides it.
fn log_level(global: &GlobalArgs) -> LevelFilter {
    if global.quiet {
        LevelFilter::Error
    } else if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn main() {
    let Cli {
        quiet,
        verbose,
        config,
        time_limit,
        command,
    } = Cli::parse();
    let global = GlobalArgs {
        quiet,
        verbose,
        config,
        time_limit,
    };

    env_logger::Builder::new()
        .filter_level(log_level(&global))
        .parse_default_env()
        .init();

    let code = match command {
        Command::Test(args) => test::run(&args, &global),
        Command::List => list::run(&global),
    }
    .unwrap_or_else(|err| {
        eprintln!("error: {err}");
        1
    });
    process::exit(code);
}
