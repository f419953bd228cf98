#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The conflict-driven clause-learning search loop.
//!
//! The driver is an explicit state machine:
//!
//! ```text
//! Propagate -> CheckTerminal -> Done(Sat)
//!                            -> Analyze -> Done(Unsat)
//!                                       -> Backjump -> Propagate
//!                            -> Decide -> Propagate
//! ```
//!
//! Propagation works in batches: all unit clauses present at the start of a
//! batch are decoded, and a single [`Formula::assign_all`] call applies them.
//! When two units of one batch name the same variable, only the first is
//! kept; a real clash resurfaces as a conflicting clause after the batch.
//!
//! Decisions take the lowest free variable and assign it `true`. There are no
//! restarts and learned clauses are never deleted.

use crate::sat::backjump::backjump;
use crate::sat::bitset::Bitset;
use crate::sat::clause::{Clause, is_tautology};
use crate::sat::cnf::Cnf;
use crate::sat::conflict_analysis::{Conflict, analyse_conflict};
use crate::sat::formula::Formula;
use crate::sat::solver::{SolutionStats, SolveResult, Solver};
use crate::sat::trail::{Reason, Trail};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Where the search loop currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Propagate,
    CheckTerminal,
    Analyze,
    Backjump(Clause),
    Decide,
    Done(SolveResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdcl {
    formula: Formula,
    trail: Trail,
    state: SearchState,
    stats: SolutionStats,
}

impl Cdcl {
    #[must_use]
    pub const fn formula(&self) -> &Formula {
        &self.formula
    }

    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, SearchState::Done(_))
    }

    /// Performs one transition of the search loop and returns the new state.
    ///
    /// Once a terminal state is reached, further calls leave it unchanged.
    pub fn step(&mut self) -> &SearchState {
        let state = std::mem::replace(&mut self.state, SearchState::CheckTerminal);
        self.state = match state {
            SearchState::Propagate => {
                self.propagate();
                SearchState::CheckTerminal
            }
            SearchState::CheckTerminal => self.check_terminal(),
            SearchState::Analyze => self.analyze(),
            SearchState::Backjump(learned) => {
                self.install(learned);
                SearchState::Propagate
            }
            SearchState::Decide => {
                self.decide();
                SearchState::Propagate
            }
            done @ SearchState::Done(_) => done,
        };
        &self.state
    }

    /// Runs until a verdict or until `max_conflicts` conflicts have been analysed.
    ///
    /// Returns `None` when the budget runs out first; the search can be
    /// resumed by calling this again or [`Solver::solve`].
    pub fn solve_limited(&mut self, max_conflicts: usize) -> Option<SolveResult> {
        let budget = self.stats.conflicts.saturating_add(max_conflicts);
        loop {
            if let SearchState::Done(result) = &self.state {
                return Some(result.clone());
            }
            if matches!(self.state, SearchState::Analyze) && self.stats.conflicts >= budget {
                debug!(conflicts = self.stats.conflicts, "conflict budget exhausted");
                return None;
            }
            self.step();
        }
    }

    /// Drains every pending unit clause onto the trail.
    fn propagate(&mut self) {
        let num_vars = self.formula.num_vars();

        while self.formula.has_unit() {
            let mut vars = Bitset::new(num_vars);
            let mut values = Bitset::new(num_vars);
            let mut batch: SmallVec<[(usize, bool, usize); 16]> = SmallVec::new();

            for &c_ref in self.formula.units() {
                let Some((var, value)) = self.formula[c_ref].unit_literal() else {
                    continue;
                };
                if vars.test(var) {
                    trace!(variable = var + 1, clause = c_ref, "duplicate unit dropped");
                    self.stats.dropped_units += 1;
                    continue;
                }
                vars.set(var);
                if value {
                    values.set(var);
                }
                batch.push((var, value, c_ref));
            }

            for (var, value, c_ref) in batch {
                trace!(variable = var + 1, value, clause = c_ref, "propagate");
                self.trail.push(var, value, Reason::Implied(c_ref));
                self.stats.propagations += 1;
            }
            self.formula.assign_all(&vars, &values);
        }

        self.stats.max_trail = self.stats.max_trail.max(self.trail.len());
    }

    fn check_terminal(&self) -> SearchState {
        if self.formula.is_fully_resolved() {
            debug!(assigned = self.trail.len(), "all clauses satisfied");
            SearchState::Done(SolveResult::Sat(self.trail.solutions()))
        } else if self.formula.has_conflict() {
            SearchState::Analyze
        } else {
            SearchState::Decide
        }
    }

    fn analyze(&mut self) -> SearchState {
        let Some(c_ref) = self.formula.first_conflict() else {
            unreachable!("analysis entered without a conflicting clause");
        };
        self.stats.conflicts += 1;

        match analyse_conflict(&self.formula, &self.trail, c_ref) {
            Conflict::Ground => {
                debug!(conflicts = self.stats.conflicts, "empty clause derived");
                SearchState::Done(SolveResult::Unsat)
            }
            Conflict::Learned(learned) => {
                debug!(clause = %learned, conflict = c_ref, "learned clause");
                SearchState::Backjump(learned)
            }
        }
    }

    fn install(&mut self, learned: Clause) {
        let (c_ref, popped) = backjump(&mut self.formula, &mut self.trail, learned);
        self.stats.learnt_clauses += 1;
        debug!(
            clause = c_ref,
            popped,
            trail = self.trail.len(),
            "backjumped"
        );
    }

    fn decide(&mut self) {
        let num_vars = self.formula.num_vars();
        let Some(var) = self.trail.free_variables().lowest_set_bit() else {
            unreachable!("no free variable left but some clause is still open");
        };

        self.stats.decisions += 1;
        debug!(
            variable = var + 1,
            level = self.trail.decision_level() + 1,
            "decide"
        );

        let bit = Bitset::singleton(num_vars, var);
        self.trail.push(var, true, Reason::Decision);
        self.formula.assign_all(&bit, &bit);
    }
}

impl Solver for Cdcl {
    fn new(cnf: &Cnf) -> Self {
        let clauses = cnf
            .iter()
            .filter(|literals| !is_tautology(literals))
            .map(|literals| Clause::new(cnf.num_vars, literals));

        let formula = Formula::from_clauses(cnf.num_vars, clauses);
        if formula.len() < cnf.len() {
            debug!(dropped = cnf.len() - formula.len(), "tautologies dropped");
        }

        Self {
            formula,
            trail: Trail::new(cnf.num_vars),
            state: SearchState::Propagate,
            stats: SolutionStats::default(),
        }
    }

    fn solve(&mut self) -> SolveResult {
        loop {
            if let SearchState::Done(result) = self.step() {
                return result.clone();
            }
        }
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}
