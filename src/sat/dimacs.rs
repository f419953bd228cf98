#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The accepted layout is:
//! - comment lines starting with `c`, anywhere before the last clause;
//! - a mandatory problem line `p cnf <num_variables> <num_clauses>`;
//! - exactly `<num_clauses>` clause lines, each a whitespace-separated list
//!   of literals terminated by `0`. A line holding only `0` is the empty
//!   clause. Blank lines are skipped.
//!
//! Anything after the last declared clause (such as a `%` trailer) is
//! ignored. Malformed input is rejected with a [`DimacsError`] before any
//! solving starts.

use crate::sat::cnf::Cnf;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("missing `p cnf` problem line")]
    MissingHeader,

    #[error("line {line}: malformed problem line `{text}`")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: failed to parse literal `{token}`")]
    InvalidLiteral { line: usize, token: String },

    #[error("line {line}: clause is not terminated by 0")]
    MissingTerminator { line: usize },

    #[error("line {line}: literal {literal} names a variable outside 1..={num_vars}")]
    VariableOutOfRange {
        line: usize,
        literal: i32,
        num_vars: usize,
    },

    #[error("expected {expected} clauses, found {found}")]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// Parses DIMACS text from `reader`.
///
/// # Errors
///
/// Any I/O failure, and every malformation listed on [`DimacsError`].
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }

        let Some((num_vars, num_clauses)) = header else {
            if trimmed.starts_with('p') {
                header = Some(parse_header(trimmed, line_no)?);
                continue;
            }
            return Err(DimacsError::MissingHeader);
        };

        if clauses.len() == num_clauses {
            break;
        }
        clauses.push(parse_clause(trimmed, line_no, num_vars)?);
    }

    let (num_vars, num_clauses) = header.ok_or(DimacsError::MissingHeader)?;
    if clauses.len() != num_clauses {
        return Err(DimacsError::ClauseCountMismatch {
            expected: num_clauses,
            found: clauses.len(),
        });
    }

    Ok(Cnf::new(num_vars, clauses))
}

/// Opens and parses a DIMACS CNF file.
///
/// # Errors
///
/// If the file cannot be opened, or its contents are rejected by [`parse_dimacs`].
pub fn parse_file<P: AsRef<Path>>(file_path: P) -> Result<Cnf, DimacsError> {
    let file = std::fs::File::open(file_path)?;
    parse_dimacs(io::BufReader::new(file))
}

fn parse_header(text: &str, line: usize) -> Result<(usize, usize), DimacsError> {
    let malformed = || DimacsError::MalformedHeader {
        line,
        text: text.to_string(),
    };

    let parts: Vec<&str> = text.split_whitespace().collect();
    let ["p", "cnf", vars, count] = parts.as_slice() else {
        return Err(malformed());
    };

    let num_vars = vars.parse().map_err(|_| malformed())?;
    let num_clauses = count.parse().map_err(|_| malformed())?;
    Ok((num_vars, num_clauses))
}

fn parse_clause(text: &str, line: usize, num_vars: usize) -> Result<Vec<i32>, DimacsError> {
    let mut literals = text
        .split_whitespace()
        .map(|token| {
            token.parse::<i32>().map_err(|_| DimacsError::InvalidLiteral {
                line,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if literals.pop() != Some(0) {
        return Err(DimacsError::MissingTerminator { line });
    }

    if let Some(&literal) = literals
        .iter()
        .find(|&&lit| lit == 0 || lit.unsigned_abs() as usize > num_vars)
    {
        return Err(DimacsError::VariableOutOfRange {
            line,
            literal,
            num_vars,
        });
    }

    Ok(literals)
}
