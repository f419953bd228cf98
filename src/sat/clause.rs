#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A single disjunction stored as bitsets.
//!
//! A clause has a fixed *shape* (the variables it mentions and the polarity
//! each appears with) and a mutable *state* (which of its variables are still
//! unassigned, and which assigned variables satisfy it). Assignments are
//! applied as masks so one call can be broadcast to every clause of a formula.

use crate::sat::bitset::Bitset;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// Classification of a clause under the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClauseStatus {
    /// Exactly one unassigned variable and nothing satisfied.
    Unit,
    /// Two or more unassigned variables and nothing satisfied.
    Incomplete,
    /// At least one literal is true.
    Complete,
    /// Every variable assigned, no literal true.
    Conflict,
}

impl ClauseStatus {
    pub const ALL: [Self; 4] = [Self::Unit, Self::Incomplete, Self::Complete, Self::Conflict];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    members: Bitset,
    polarity: Bitset,
    unassigned: Bitset,
    satisfied: Bitset,
}

impl Clause {
    /// Builds a clause over `num_vars` variables from DIMACS literals.
    ///
    /// A positive literal `v` sets bit `v - 1` in both the member and polarity
    /// sets, a negative one only in the member set. Every member starts
    /// unassigned.
    ///
    /// # Panics
    ///
    /// If a literal is zero or names a variable above `num_vars`.
    #[must_use]
    pub fn new(num_vars: usize, literals: &[i32]) -> Self {
        let mut members = Bitset::new(num_vars);
        let mut polarity = Bitset::new(num_vars);

        for &lit in literals {
            assert_ne!(lit, 0, "literal 0 is not a variable");
            let bit = lit.unsigned_abs() as usize - 1;
            members.set(bit);
            if lit > 0 {
                polarity.set(bit);
            }
        }

        let unassigned = members.clone();
        Self {
            members,
            polarity,
            unassigned,
            satisfied: Bitset::new(num_vars),
        }
    }

    /// A clause whose members are all assigned and none of them true.
    ///
    /// This is the state of every clause produced by resolution: each of its
    /// literals is false under the trail that produced it.
    #[must_use]
    pub fn falsified(members: Bitset, polarity: Bitset) -> Self {
        debug_assert!(polarity.is_subset(&members));
        let width = members.width();
        Self {
            members,
            polarity,
            unassigned: Bitset::new(width),
            satisfied: Bitset::new(width),
        }
    }

    #[must_use]
    pub fn contains(&self, var: usize) -> bool {
        self.members.test(var)
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.unassigned.is_single()
    }

    /// True when the clause mentions no variable at all.
    #[must_use]
    pub fn is_empty_shape(&self) -> bool {
        self.members.is_zero()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_empty_shape()
    }

    #[must_use]
    pub fn status(&self) -> ClauseStatus {
        if !self.satisfied.is_zero() {
            ClauseStatus::Complete
        } else if self.unassigned.is_zero() {
            ClauseStatus::Conflict
        } else if self.unassigned.is_single() {
            ClauseStatus::Unit
        } else {
            ClauseStatus::Incomplete
        }
    }

    /// Applies a batch of assignments.
    ///
    /// `vars` names the assigned variables and `values` holds `true` for each
    /// of them assigned true. Bits outside this clause, or already assigned
    /// here, have no effect.
    pub fn assign(&mut self, vars: &Bitset, values: &Bitset) {
        let hit = vars & &self.unassigned;
        if hit.is_zero() {
            return;
        }
        self.unassigned.clear_bits(&hit);

        // A literal is true when the value agrees with its polarity.
        let disagree = values ^ &self.polarity;
        self.satisfied.set_bits(&(&hit - &disagree));
    }

    /// Undoes assignments of `vars`, restricted to this clause's members.
    pub fn cancel(&mut self, vars: &Bitset) {
        self.satisfied.clear_bits(vars);
        let back = vars & &self.members;
        self.unassigned.set_bits(&back);
    }

    /// Binary resolution on `pivot`.
    ///
    /// Returns a new falsified clause over the union of both shapes without
    /// `pivot`. Neither input is modified.
    #[must_use]
    pub fn resolve_with(&self, other: &Self, pivot: usize) -> Self {
        let mut members = &self.members | &other.members;
        let mut polarity = &self.polarity | &other.polarity;
        members.clear(pivot);
        polarity.clear(pivot);
        Self::falsified(members, polarity)
    }

    /// The variable a unit clause forces and the value that satisfies it.
    #[must_use]
    pub fn unit_literal(&self) -> Option<(usize, bool)> {
        if !self.is_unit() {
            return None;
        }
        self.unassigned
            .lowest_set_bit()
            .map(|var| (var, self.polarity.test(var)))
    }

    /// The clause as DIMACS literals, ordered by variable.
    #[must_use]
    pub fn literals(&self) -> SmallVec<[i32; 8]> {
        self.members
            .iter_ones()
            .map(|bit| {
                let var = i32::try_from(bit + 1).unwrap_or(i32::MAX);
                if self.polarity.test(bit) { var } else { -var }
            })
            .collect()
    }

    /// Whether the clause holds under a total assignment, indexed by bit.
    #[must_use]
    pub fn is_satisfied_by(&self, model: &Bitset) -> bool {
        // Some member whose value matches its polarity.
        let disagree = model ^ &self.polarity;
        !(&self.members - &disagree).is_zero()
    }

    #[must_use]
    pub const fn members(&self) -> &Bitset {
        &self.members
    }

    #[must_use]
    pub const fn polarity(&self) -> &Bitset {
        &self.polarity
    }

    #[must_use]
    pub const fn unassigned(&self) -> &Bitset {
        &self.unassigned
    }

    #[must_use]
    pub const fn satisfied(&self) -> &Bitset {
        &self.satisfied
    }
}

/// Whether a literal list mentions some variable with both signs.
#[must_use]
pub fn is_tautology(literals: &[i32]) -> bool {
    literals
        .iter()
        .tuple_combinations()
        .any(|(&a, &b)| a == -b)
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.literals().iter().join(" "))
    }
}
