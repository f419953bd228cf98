#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver interface and its typed outcome.

use crate::sat::cnf::Cnf;
use itertools::Itertools;
use std::fmt;

/// A satisfying assignment, as DIMACS literals sorted by variable.
///
/// Only variables the search actually assigned are present; any other
/// variable may take either value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Solutions {
    assignments: Vec<i32>,
}

impl Solutions {
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        literals.iter().copied().collect()
    }

    /// The value of DIMACS variable `var`, if assigned.
    #[must_use]
    pub fn value(&self, var: i32) -> Option<bool> {
        let var = var.abs();
        self.assignments
            .binary_search_by_key(&var, |lit| lit.abs())
            .ok()
            .map(|i| self.assignments[i] > 0)
    }

    /// Whether `literal` is true under this assignment.
    #[must_use]
    pub fn check(&self, literal: i32) -> bool {
        self.value(literal) == Some(literal > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.assignments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl FromIterator<i32> for Solutions {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self {
            assignments: iter.into_iter().sorted_by_key(|lit| lit.abs()).collect(),
        }
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.assignments.iter().join(" "))
    }
}

/// The two outcomes of a solve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolveResult {
    Sat(Solutions),
    Unsat,
}

impl SolveResult {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    #[must_use]
    pub const fn solutions(&self) -> Option<&Solutions> {
        match self {
            Self::Sat(solutions) => Some(solutions),
            Self::Unsat => None,
        }
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat(_) => write!(f, "SAT"),
            Self::Unsat => write!(f, "UNSAT"),
        }
    }
}

/// Counters collected during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SolutionStats {
    pub conflicts: usize,
    pub decisions: usize,
    /// Trail entries forced by unit clauses.
    pub propagations: usize,
    pub learnt_clauses: usize,
    /// Units dropped because an earlier unit in the same batch named the same variable.
    pub dropped_units: usize,
    pub max_trail: usize,
}

pub trait Solver {
    fn new(cnf: &Cnf) -> Self;
    fn solve(&mut self) -> SolveResult;
    fn stats(&self) -> SolutionStats;
}
