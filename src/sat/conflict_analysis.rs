#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clause learning by resolution along the trail.
//!
//! Starting from a falsified clause, every implied variable still mentioned
//! by the working clause is resolved away against the clause that forced it,
//! walking the trail from newest to oldest. What remains mentions only
//! decision variables. If nothing remains, the formula is unsatisfiable
//! regardless of any decision.

use crate::sat::clause::Clause;
use crate::sat::formula::Formula;
use crate::sat::trail::{Reason, Trail};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Conflict {
    /// The empty clause was derived.
    Ground,
    /// A non-empty clause, falsified by the current trail.
    Learned(Clause),
}

#[must_use]
pub fn analyse_conflict(formula: &Formula, trail: &Trail, c_ref: usize) -> Conflict {
    let conflict = &formula[c_ref];
    let mut learned = Clause::falsified(conflict.members().clone(), conflict.polarity().clone());

    for step in trail.iter().rev() {
        let Reason::Implied(ante) = step.reason else {
            continue;
        };
        if learned.contains(step.var) {
            learned = learned.resolve_with(&formula[ante], step.var);
        }
    }

    if learned.is_empty_shape() {
        Conflict::Ground
    } else {
        Conflict::Learned(learned)
    }
}
