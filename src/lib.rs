//! This crate provides a conflict-driven clause-learning SAT solver whose clauses
//! are fixed-width bitsets over the formula's variables.
//!
//! ```
//! use bitsat::sat::cdcl::Cdcl;
//! use bitsat::sat::cnf::Cnf;
//! use bitsat::sat::solver::{SolveResult, Solver};
//!
//! let cnf = Cnf::new(3, vec![vec![1, 2, 3], vec![-1], vec![-2]]);
//! let mut solver = Cdcl::new(&cnf);
//! match solver.solve() {
//!     SolveResult::Sat(model) => assert_eq!(model.value(3), Some(true)),
//!     SolveResult::Unsat => unreachable!(),
//! }
//! ```

/// The `sat` module implements the solver: bitset clauses, the partitioned clause
/// database, the trail, conflict analysis, backjumping and the search loop, plus
/// DIMACS loading.
pub mod sat;
