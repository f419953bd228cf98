#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The input instance: a variable count and the literal lists of each clause.

use crate::sat::clause::is_tautology;
use crate::sat::solver::Solutions;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i32>>,
}

impl Cnf {
    /// # Panics
    ///
    /// In debug builds, if a literal is zero or names a variable above `num_vars`.
    #[must_use]
    pub fn new(num_vars: usize, clauses: Vec<Vec<i32>>) -> Self {
        debug_assert!(
            clauses
                .iter()
                .flatten()
                .all(|&lit| lit != 0 && lit.unsigned_abs() as usize <= num_vars),
            "literal outside 1..={num_vars}"
        );
        Self { num_vars, clauses }
    }

    /// Builds an instance whose variable count is the largest variable mentioned.
    #[must_use]
    pub fn from_clauses(clauses: Vec<Vec<i32>>) -> Self {
        let num_vars = clauses
            .iter()
            .flatten()
            .map(|lit| lit.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        Self::new(num_vars, clauses)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<i32>> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Vec::len).sum()
    }

    /// Whether every clause has a literal made true by `solutions`.
    ///
    /// Tautologies hold under any completion of the assignment and are
    /// accepted without looking at it.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses.iter().all(|clause| {
            is_tautology(clause) || clause.iter().any(|&lit| solutions.check(lit))
        })
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            if clause.is_empty() {
                writeln!(f, "0")?;
            } else {
                writeln!(f, "{} 0", clause.iter().join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_clauses_counts_variables() {
        let cnf = Cnf::from_clauses(vec![vec![1, -4], vec![2]]);
        assert_eq!(cnf.num_vars, 4);
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_literals(), 3);
        assert_eq!(Cnf::from_clauses(Vec::new()).num_vars, 0);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::new(3, vec![vec![1, 2], vec![-1, 3]]);
        assert!(cnf.verify(&Solutions::new(&[1, 3])));
        assert!(cnf.verify(&Solutions::new(&[-1, 2])));
        assert!(!cnf.verify(&Solutions::new(&[1, -3])));
        // An unassigned variable makes no literal true.
        assert!(!cnf.verify(&Solutions::new(&[1])));
    }

    #[test]
    fn test_tautology_verifies_without_assignment() {
        let cnf = Cnf::new(2, vec![vec![2, -2], vec![1]]);
        assert!(cnf.verify(&Solutions::new(&[1])));
    }

    #[test]
    fn test_empty_clause_never_verifies() {
        let cnf = Cnf::new(1, vec![vec![]]);
        assert!(!cnf.verify(&Solutions::new(&[1])));
    }

    #[test]
    fn test_display_is_dimacs() {
        let cnf = Cnf::new(2, vec![vec![1, -2], vec![]]);
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n0\n");
    }
}
