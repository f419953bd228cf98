#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The clause database.
//!
//! Every live clause, original or learned, sits in exactly one of four
//! buckets matching its [`ClauseStatus`]. Clauses are addressed by their
//! insertion index and are never removed.
//!
//! Forward assignment only touches the unit and incomplete buckets: a
//! complete or conflicting clause cannot change class until some of its
//! variables are cancelled, so [`Formula::assign_all`] leaves them frozen.
//! Cancellation can move any clause, so [`Formula::cancel_all`] visits all of
//! them and rebuilds the buckets.

use crate::sat::bitset::Bitset;
use crate::sat::clause::{Clause, ClauseStatus};
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_vars: usize,
    clauses: Vec<Clause>,
    status: Vec<ClauseStatus>,
    buckets: [Vec<usize>; 4],
    num_original: usize,
}

impl Formula {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            clauses: Vec::new(),
            status: Vec::new(),
            buckets: Default::default(),
            num_original: 0,
        }
    }

    /// Builds the initial database; every clause given here counts as original.
    #[must_use]
    pub fn from_clauses<I: IntoIterator<Item = Clause>>(num_vars: usize, clauses: I) -> Self {
        let mut formula = Self::new(num_vars);
        for clause in clauses {
            formula.insert(clause);
        }
        formula.num_original = formula.len();
        formula
    }

    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub const fn num_original(&self) -> usize {
        self.num_original
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Clauses added after the initial database was built.
    pub fn learned(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().skip(self.num_original)
    }

    /// Classifies `clause`, files it and returns its index.
    pub fn insert(&mut self, clause: Clause) -> usize {
        debug_assert_eq!(clause.members().width(), self.num_vars);
        let c_ref = self.clauses.len();
        let status = clause.status();
        self.clauses.push(clause);
        self.status.push(status);
        self.buckets[status.index()].push(c_ref);
        c_ref
    }

    #[must_use]
    pub fn status_of(&self, c_ref: usize) -> ClauseStatus {
        self.status[c_ref]
    }

    /// Indices of the clauses currently filed under `status`.
    #[must_use]
    pub fn bucket(&self, status: ClauseStatus) -> &[usize] {
        &self.buckets[status.index()]
    }

    #[must_use]
    pub fn units(&self) -> &[usize] {
        self.bucket(ClauseStatus::Unit)
    }

    #[must_use]
    pub fn has_unit(&self) -> bool {
        !self.units().is_empty()
    }

    #[must_use]
    pub fn has_conflict(&self) -> bool {
        !self.bucket(ClauseStatus::Conflict).is_empty()
    }

    /// Every live clause is complete.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        !self.has_unit()
            && !self.has_conflict()
            && self.bucket(ClauseStatus::Incomplete).is_empty()
    }

    /// Some clause currently falsified; no ordering among several is implied.
    #[must_use]
    pub fn first_conflict(&self) -> Option<usize> {
        self.bucket(ClauseStatus::Conflict).first().copied()
    }

    /// Applies a batch of assignments to every unit and incomplete clause.
    pub fn assign_all(&mut self, vars: &Bitset, values: &Bitset) {
        let units = std::mem::take(&mut self.buckets[ClauseStatus::Unit.index()]);
        let incomplete = std::mem::take(&mut self.buckets[ClauseStatus::Incomplete.index()]);

        for c_ref in units.into_iter().chain(incomplete) {
            let clause = &mut self.clauses[c_ref];
            clause.assign(vars, values);
            let status = clause.status();
            self.status[c_ref] = status;
            self.buckets[status.index()].push(c_ref);
        }
    }

    /// Undoes a batch of assignments across the whole database.
    pub fn cancel_all(&mut self, vars: &Bitset) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }

        for (c_ref, clause) in self.clauses.iter_mut().enumerate() {
            clause.cancel(vars);
            let status = clause.status();
            self.status[c_ref] = status;
            self.buckets[status.index()].push(c_ref);
        }
    }

    /// Checks the partition and per-clause bit invariants.
    ///
    /// Every clause is filed exactly once, under its actual classification,
    /// and its unassigned and satisfied bits are subsets of its members.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let filed: usize = self.buckets.iter().map(Vec::len).sum();
        if filed != self.clauses.len() {
            return false;
        }

        let mut seen = vec![false; self.clauses.len()];
        for status in ClauseStatus::ALL {
            for &c_ref in self.bucket(status) {
                if seen[c_ref] || self.status[c_ref] != status {
                    return false;
                }
                seen[c_ref] = true;
            }
        }

        self.clauses.iter().zip(&self.status).all(|(clause, &status)| {
            clause.status() == status
                && clause.unassigned().is_subset(clause.members())
                && clause.satisfied().is_subset(clause.members())
        })
    }
}

impl Index<usize> for Formula {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(num_vars: usize, clauses: &[&[i32]]) -> Formula {
        Formula::from_clauses(
            num_vars,
            clauses.iter().map(|lits| Clause::new(num_vars, lits)),
        )
    }

    fn single(width: usize, bit: usize) -> Bitset {
        Bitset::singleton(width, bit)
    }

    #[test]
    fn test_insert_classifies() {
        let f = formula(3, &[&[1], &[1, 2], &[]]);
        assert_eq!(f.len(), 3);
        assert_eq!(f.num_original(), 3);
        assert_eq!(f.units(), &[0]);
        assert_eq!(f.bucket(ClauseStatus::Incomplete), &[1]);
        assert_eq!(f.first_conflict(), Some(2));
        assert!(f.has_unit());
        assert!(f.has_conflict());
        assert!(!f.is_fully_resolved());
        assert!(f.is_consistent());
    }

    #[test]
    fn test_empty_formula_is_resolved() {
        let f = Formula::new(0);
        assert!(f.is_fully_resolved());
        assert!(f.is_empty());
    }

    #[test]
    fn test_assign_all_reclassifies() {
        let mut f = formula(3, &[&[1, 2], &[-1, 2, 3], &[-1, -2]]);
        f.assign_all(&single(3, 0), &single(3, 0));

        assert_eq!(f.status_of(0), ClauseStatus::Complete);
        assert_eq!(f.status_of(1), ClauseStatus::Incomplete);
        assert_eq!(f.status_of(2), ClauseStatus::Unit);
        assert!(f.is_consistent());

        f.assign_all(&single(3, 1), &single(3, 1));
        assert_eq!(f.status_of(1), ClauseStatus::Complete);
        assert_eq!(f.status_of(2), ClauseStatus::Conflict);
        assert_eq!(f.first_conflict(), Some(2));
        assert!(f.is_consistent());
    }

    #[test]
    fn test_assign_all_leaves_frozen_clauses_alone() {
        let mut f = formula(2, &[&[1, 2]]);
        f.assign_all(&single(2, 0), &single(2, 0));
        assert_eq!(f.status_of(0), ClauseStatus::Complete);

        f.assign_all(&single(2, 1), &Bitset::new(2));
        // Variable 2 was assigned after the clause froze.
        assert!(f[0].unassigned().test(1));
        assert!(f.is_fully_resolved());
    }

    #[test]
    fn test_cancel_all_restores() {
        let mut f = formula(2, &[&[1, 2], &[-1, -2]]);
        let both = &single(2, 0) | &single(2, 1);
        f.assign_all(&both, &both);
        assert_eq!(f.status_of(1), ClauseStatus::Conflict);

        f.cancel_all(&single(2, 1));
        assert_eq!(f.status_of(0), ClauseStatus::Complete);
        assert_eq!(f.status_of(1), ClauseStatus::Unit);
        assert!(f.is_consistent());

        f.cancel_all(&single(2, 0));
        assert_eq!(f.bucket(ClauseStatus::Incomplete), &[0, 1]);
        assert!(f.is_consistent());
    }

    #[test]
    fn test_learned_follow_originals() {
        let mut f = formula(2, &[&[1, 2]]);
        let c_ref = f.insert(Clause::new(2, &[-1]));
        assert_eq!(c_ref, 1);
        assert_eq!(f.learned().count(), 1);
        assert_eq!(f.num_original(), 1);
    }
}
