#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::bitset::Bitset;
use crate::sat::solver::Solutions;
use std::ops::Index;

/// Why a variable holds its value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Chosen freely by the decision step.
    #[default]
    Decision,
    /// Forced by the unit clause at this index of the formula.
    Implied(usize),
}

/// One assignment on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    pub var: usize,
    pub value: bool,
    pub reason: Reason,
}

impl Step {
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        matches!(self.reason, Reason::Decision)
    }
}

/// Chronological record of assignments, the only structure used to undo them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    t: Vec<Step>,
    assigned: Bitset,
    decisions: usize,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            assigned: Bitset::new(num_vars),
            decisions: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Step> {
        self.t.iter()
    }

    /// Number of decisions currently on the trail.
    #[must_use]
    pub const fn decision_level(&self) -> usize {
        self.decisions
    }

    #[must_use]
    pub fn is_assigned(&self, var: usize) -> bool {
        self.assigned.test(var)
    }

    pub fn push(&mut self, var: usize, value: bool, reason: Reason) {
        debug_assert!(!self.is_assigned(var), "variable {} already on the trail", var + 1);
        self.assigned.set(var);
        if matches!(reason, Reason::Decision) {
            self.decisions += 1;
        }
        self.t.push(Step { var, value, reason });
    }

    /// Removes the most recent step.
    ///
    /// # Panics
    ///
    /// If the trail is empty.
    pub fn pop(&mut self) -> Step {
        let step = self
            .t
            .pop()
            .unwrap_or_else(|| panic!("pop from an empty trail"));
        self.assigned.clear(step.var);
        if step.is_decision() {
            self.decisions -= 1;
        }
        step
    }

    /// Variables not on the trail.
    #[must_use]
    pub fn free_variables(&self) -> Bitset {
        !&self.assigned
    }

    /// The current assignment as DIMACS literals.
    #[must_use]
    pub fn solutions(&self) -> Solutions {
        self.t
            .iter()
            .map(|step| {
                let var = i32::try_from(step.var + 1).unwrap_or(i32::MAX);
                if step.value { var } else { -var }
            })
            .collect()
    }
}
