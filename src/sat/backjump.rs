#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::bitset::Bitset;
use crate::sat::clause::Clause;
use crate::sat::formula::Formula;
use crate::sat::trail::Trail;

/// Undoes the trail until `learned` has a free variable again, then installs it.
///
/// Each popped variable is cancelled on the learned clause as it goes, and
/// the whole popped set is cancelled across the formula in a single call.
/// Returns the index of the inserted clause and the number of steps undone.
///
/// # Panics
///
/// If `learned` is empty, or the trail runs out before any of its variables
/// is freed.
pub fn backjump(formula: &mut Formula, trail: &mut Trail, mut learned: Clause) -> (usize, usize) {
    assert!(!learned.is_empty_shape(), "cannot backjump on the empty clause");

    let mut undone = Bitset::new(formula.num_vars());
    let mut popped = 0;

    while learned.unassigned().is_zero() {
        let step = trail.pop();
        undone.set(step.var);
        popped += 1;
        if learned.contains(step.var) {
            learned.cancel(&undone);
        }
    }

    formula.cancel_all(&undone);
    (formula.insert(learned), popped)
}
