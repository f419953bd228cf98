//! # bitsat
//!
//! `bitsat` is a command-line SAT solver. It reads problems in DIMACS CNF
//! format and decides them with a conflict-driven clause-learning search over
//! bitset clauses.
//!
//! ## Usage
//!
//! ```sh
//! bitsat [OPTIONS] <PATH>
//! bitsat file --path <PATH> [OPTIONS]
//! bitsat text --input "<cnf_string>" [OPTIONS]
//! bitsat dir --path <DIR> [--expect sat|unsat] [OPTIONS]
//! bitsat completions <SHELL>
//! ```
//!
//! ### Common options
//!
//! -   `-d, --debug`: Log decisions, learned clauses and backjumps to stderr.
//! -   `-v, --verify[=<BOOL>]`: Check the model against the original clauses (default: `true`).
//! -   `-s, --stats[=<BOOL>]`: Print problem and search statistics (default: `true`).
//! -   `-p, --print-solution`: Print the satisfying assignment.
//! -   `--max-conflicts <N>`: Stop with `UNKNOWN` after `N` conflicts.
//!
//! The final line of a solve is the verdict: `SAT`, `UNSAT` or `UNKNOWN`.
//! `RUST_LOG` overrides the log filter chosen by `--debug`.

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, parse_textual_cnf, solve_and_report, solve_dir, solve_file,
};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            init_tracing(common.debug);
            solve_file(&path, &common)?;
        }
        Some(Commands::Text { input, common }) => {
            init_tracing(common.debug);
            let time = Instant::now();
            let cnf = parse_textual_cnf(&input)?;
            let parse_time = time.elapsed();
            solve_and_report(&cnf, &common, None, parse_time)?;
        }
        Some(Commands::Dir {
            path,
            expect,
            common,
        }) => {
            init_tracing(common.debug);
            solve_dir(&path, expect, &common)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "bitsat", &mut std::io::stdout());
        }
        None => {
            let common: CommonOptions = cli.common;
            init_tracing(common.debug);
            let Some(path) = cli.path else {
                anyhow::bail!("no input provided, use --help for more information");
            };
            solve_file(&path, &common)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
