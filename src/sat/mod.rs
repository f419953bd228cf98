#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod backjump;
pub mod bitset;
pub mod cdcl;
pub mod clause;
pub mod cnf;
pub mod conflict_analysis;
pub mod dimacs;
pub mod formula;
pub mod solver;
pub mod trail;
