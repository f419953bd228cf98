#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result, bail};
use bitsat::sat::cdcl::Cdcl;
use bitsat::sat::cnf::Cnf;
use bitsat::sat::dimacs::{parse_dimacs, parse_file};
use bitsat::sat::solver::{SolutionStats, SolveResult, Solver};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{info, warn};

/// Defines the command-line interface for the bitsat solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "bitsat",
    version,
    about = "A CDCL SAT solver over bitset clauses",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file, solved when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `dir`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to the bare path form.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input as a string (e.g. "1 -2 0\n2 3 0").
        /// Each line represents a clause, literals are space-separated, and 0 terminates a clause.
        /// A `p cnf` header is optional; without one the variable count is inferred.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` file below a directory.
    Dir {
        /// The directory to walk.
        #[arg(long)]
        path: PathBuf,

        /// Fail as soon as a file's answer differs from this one.
        #[arg(long, value_enum)]
        expect: Option<Expectation>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// The answer a batch of instances is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Expectation {
    Sat,
    Unsat,
}

impl Expectation {
    const fn matches(self, result: &SolveResult) -> bool {
        match self {
            Self::Sat => result.is_sat(),
            Self::Unsat => !result.is_sat(),
        }
    }
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging of the search (decisions, learned clauses, backjumps).
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enable verification of the found solution against the original clauses.
    /// Pass `--verify=false` to turn it off.
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub(crate) verify: bool,

    /// Enable printing of performance and problem statistics after solving.
    /// Pass `--stats=false` to turn it off.
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub(crate) stats: bool,

    /// Enable printing of the satisfying assignment if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Give up with UNKNOWN after this many conflicts.
    #[arg(long)]
    pub(crate) max_conflicts: Option<usize>,
}

/// Parses a textual CNF formula.
///
/// With a `p cnf` header the text is held to the full DIMACS rules. Without
/// one, every non-comment line up to its first `0` is a clause and the
/// variable count is the largest variable mentioned.
///
/// # Errors
///
/// If a token is not an integer, or the DIMACS form is malformed.
pub(crate) fn parse_textual_cnf(input: &str) -> Result<Cnf> {
    if input.lines().any(|line| line.trim_start().starts_with('p')) {
        return parse_dimacs(Cursor::new(input)).context("invalid DIMACS text");
    }

    let mut clauses = Vec::new();
    for line in input.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        let mut clause = Vec::new();
        for token in line.split_whitespace() {
            let lit: i32 = token
                .parse()
                .with_context(|| format!("failed to parse literal `{token}`"))?;
            if lit == 0 {
                break;
            }
            clause.push(lit);
        }
        clauses.push(clause);
    }

    Ok(Cnf::from_clauses(clauses))
}

/// Solves one DIMACS file and reports on it.
///
/// # Errors
///
/// If the file cannot be read or parsed, or its model fails verification.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<Option<SolveResult>> {
    let time = Instant::now();
    let cnf = parse_file(path).with_context(|| format!("failed to parse {}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, Some(path), parse_time)
}

/// Solves every `.cnf` file below `path`, in walk order.
///
/// # Errors
///
/// If `path` is not a directory, any file fails to parse or verify, or an
/// answer contradicts `expect`.
pub(crate) fn solve_dir(
    path: &Path,
    expect: Option<Expectation>,
    common: &CommonOptions,
) -> Result<()> {
    if !path.is_dir() {
        bail!("provided path is not a directory: {}", path.display());
    }

    let start = Instant::now();
    let mut solved = 0usize;
    let mut unknown = 0usize;

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() || file_path.extension().is_none_or(|ext| ext != "cnf") {
            continue;
        }

        match (solve_file(file_path, common)?, expect) {
            (None, _) => unknown += 1,
            (Some(result), Some(expected)) if !expected.matches(&result) => {
                bail!(
                    "wrong answer for {}: got {result}, expected {expected:?}",
                    file_path.display()
                );
            }
            (Some(_), _) => solved += 1,
        }
    }

    info!(solved, unknown, elapsed = ?start.elapsed(), "directory done");
    println!(
        "Solved {solved} instance(s), {unknown} unknown, in {:.3}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Runs the solver on `cnf`, honouring the conflict budget.
pub(crate) fn solve(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> (Option<SolveResult>, Duration, SolutionStats) {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    info!(
        variables = cnf.num_vars,
        clauses = cnf.len(),
        literals = cnf.num_literals(),
        "loaded instance"
    );

    let time = Instant::now();
    let mut solver = Cdcl::new(cnf);
    let result = match common.max_conflicts {
        Some(limit) => solver.solve_limited(limit),
        None => Some(solver.solve()),
    };
    let elapsed = time.elapsed();

    info!(result = ?result, elapsed = ?elapsed, "search finished");
    (result, elapsed, solver.stats())
}

/// Solves, verifies and prints statistics and the verdict.
///
/// # Errors
///
/// If verification is enabled and the model does not satisfy `cnf`.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Option<SolveResult>> {
    advance_epoch();

    let (result, elapsed, solver_stats) = solve(cnf, label, common);

    let (allocated_mib, resident_mib) = memory_usage();

    if common.verify {
        verify_solution(cnf, result.as_ref())?;
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            cnf,
            &solver_stats,
            allocated_mib,
            resident_mib,
        );
    }

    match &result {
        Some(SolveResult::Sat(solutions)) => {
            if common.print_solution {
                println!("Solutions: {solutions}");
            }
            println!("SAT");
        }
        Some(SolveResult::Unsat) => println!("UNSAT"),
        None => println!("UNKNOWN"),
    }

    Ok(result)
}

/// Checks a model against the original clauses.
///
/// # Errors
///
/// If some clause has no true literal under the model.
pub(crate) fn verify_solution(cnf: &Cnf, result: Option<&SolveResult>) -> Result<()> {
    if let Some(solutions) = result.and_then(SolveResult::solutions) {
        let ok = cnf.verify(solutions);
        println!("Verified: {ok:?}");
        if !ok {
            bail!("solution failed verification");
        }
    }
    Ok(())
}

fn advance_epoch() {
    if let Err(e) = epoch::advance() {
        warn!(error = %e, "failed to refresh allocator statistics");
    }
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
fn memory_usage() -> (f64, f64) {
    advance_epoch();

    let read = |value: tikv_jemalloc_ctl::Result<usize>| value.unwrap_or(0) as f64 / (1024.0 * 1024.0);
    let allocated = read(stats::allocated::mib().and_then(|mib| mib.read()));
    let resident = read(stats::resident::mib().and_then(|mib| mib.read()));
    (allocated, resident)
}

/// Prints one statistic as a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints a statistic together with its rate per second.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses (original)", cnf.len());
    stat_line("Literals (original)", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", s.learnt_clauses);
    stat_line("Total clauses (incl. learnt)", cnf.len() + s.learnt_clauses);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Dropped duplicate units", s.dropped_units);
    stat_line("Longest trail", s.max_trail);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_path_parses() {
        let cli = Cli::try_parse_from(["bitsat", "problem.cnf"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_dir_with_expectation_parses() {
        let cli = Cli::try_parse_from([
            "bitsat", "dir", "--path", "cnfs", "--expect", "unsat", "--max-conflicts", "50",
        ])
        .unwrap();
        let Some(Commands::Dir { path, expect, common }) = cli.command else {
            panic!("expected the dir subcommand");
        };
        assert_eq!(path, PathBuf::from("cnfs"));
        assert_eq!(expect, Some(Expectation::Unsat));
        assert_eq!(common.max_conflicts, Some(50));
    }

    #[test]
    fn test_verify_and_stats_default_on() {
        let cli = Cli::try_parse_from(["bitsat", "file", "--path", "x.cnf"]).unwrap();
        let Some(Commands::File { common, .. }) = cli.command else {
            panic!("expected the file subcommand");
        };
        assert!(common.verify);
        assert!(common.stats);

        let cli = Cli::try_parse_from(["bitsat", "-v", "--stats", "x.cnf"]).unwrap();
        assert!(cli.common.verify);
        assert!(cli.common.stats);
    }

    #[test]
    fn test_verify_and_stats_can_be_turned_off() {
        let cli = Cli::try_parse_from([
            "bitsat", "file", "--path", "x.cnf", "--stats=false", "--verify=false",
        ])
        .unwrap();
        let Some(Commands::File { common, .. }) = cli.command else {
            panic!("expected the file subcommand");
        };
        assert!(!common.verify);
        assert!(!common.stats);

        let cli = Cli::try_parse_from(["bitsat", "dir", "--path", "cnfs", "--stats=false"]).unwrap();
        let Some(Commands::Dir { common, .. }) = cli.command else {
            panic!("expected the dir subcommand");
        };
        assert!(!common.stats);
        assert!(common.verify);

        let cli = Cli::try_parse_from(["bitsat", "--verify=false", "x.cnf"]).unwrap();
        assert!(!cli.common.verify);
        assert_eq!(cli.path, Some(PathBuf::from("x.cnf")));
    }

    #[test]
    fn test_parse_textual_cnf_simple() {
        let cnf = parse_textual_cnf("1 -2 0\n3 4 0").unwrap();
        assert_eq!(cnf.clauses, vec![vec![1, -2], vec![3, 4]]);
        assert_eq!(cnf.num_vars, 4);
    }

    #[test]
    fn test_parse_textual_cnf_with_header_uses_dimacs_rules() {
        let cnf = parse_textual_cnf("c comment\np cnf 5 2\n1 0\n-2 0").unwrap();
        assert_eq!(cnf.num_vars, 5);
        assert_eq!(cnf.clauses, vec![vec![1], vec![-2]]);
        assert!(parse_textual_cnf("p cnf 1 1\n2 0").is_err());
    }

    #[test]
    fn test_parse_textual_cnf_skips_blank_lines() {
        let cnf = parse_textual_cnf("1 0\n\n-2 0").unwrap();
        assert_eq!(cnf.clauses, vec![vec![1], vec![-2]]);
    }

    #[test]
    fn test_parse_textual_cnf_stops_at_first_zero() {
        let cnf = parse_textual_cnf("1 2 0 3 4 0").unwrap();
        assert_eq!(cnf.clauses, vec![vec![1, 2]]);
    }

    #[test]
    fn test_parse_textual_cnf_rejects_garbage() {
        assert!(parse_textual_cnf("1 x 0").is_err());
    }

    #[test]
    fn test_expectation_matches() {
        assert!(Expectation::Unsat.matches(&SolveResult::Unsat));
        assert!(!Expectation::Sat.matches(&SolveResult::Unsat));
    }

    #[test]
    fn test_verify_solution_rejects_bad_model() {
        use bitsat::sat::solver::Solutions;

        let cnf = Cnf::new(1, vec![vec![1]]);
        let bad = SolveResult::Sat(Solutions::new(&[-1]));
        assert!(verify_solution(&cnf, Some(&bad)).is_err());
        assert!(verify_solution(&cnf, Some(&SolveResult::Unsat)).is_ok());
    }
}
