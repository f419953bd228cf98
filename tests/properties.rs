//! Property-based tests for the CDCL solver.
//!
//! Small random instances are checked against brute-force enumeration of
//! every assignment.

use bitsat::sat::bitset::Bitset;
use bitsat::sat::cdcl::Cdcl;
use bitsat::sat::cnf::Cnf;
use bitsat::sat::solver::{SolveResult, Solutions, Solver};
use proptest::prelude::*;

// ============================================================================
// Helper functions
// ============================================================================

/// A random formula over 1..=8 variables with clauses of 1..=3 literals.
fn arb_cnf() -> impl Strategy<Value = Cnf> {
    (1usize..=8).prop_flat_map(|num_vars| {
        let max_var = i32::try_from(num_vars).unwrap();
        let literal = (1..=max_var, any::<bool>()).prop_map(|(v, neg)| if neg { -v } else { v });
        prop::collection::vec(prop::collection::vec(literal, 1..=3), 0..=24)
            .prop_map(move |clauses| Cnf::new(num_vars, clauses))
    })
}

/// Every total assignment of `num_vars` variables, as bitsets.
fn all_models(num_vars: usize) -> impl Iterator<Item = Bitset> {
    (0u32..1 << num_vars).map(move |mask| {
        let mut model = Bitset::new(num_vars);
        for bit in 0..num_vars {
            if mask & (1 << bit) != 0 {
                model.set(bit);
            }
        }
        model
    })
}

fn satisfies(cnf: &Cnf, model: &Bitset) -> bool {
    cnf.iter().all(|clause| {
        clause.iter().any(|&lit| {
            let bit = lit.unsigned_abs() as usize - 1;
            model.test(bit) == (lit > 0)
        })
    })
}

fn brute_force_sat(cnf: &Cnf) -> bool {
    all_models(cnf.num_vars).any(|model| satisfies(cnf, &model))
}

fn solve(cnf: &Cnf) -> (SolveResult, Cdcl) {
    let mut solver = Cdcl::new(cnf);
    (solver.solve(), solver)
}

// ============================================================================
// Literal scenarios
// ============================================================================

#[test]
fn empty_instance_is_sat() {
    let (result, _) = solve(&Cnf::new(0, vec![]));
    assert_eq!(result, SolveResult::Sat(Solutions::default()));
}

#[test]
fn single_positive_unit() {
    let (result, _) = solve(&Cnf::new(1, vec![vec![1]]));
    assert_eq!(result, SolveResult::Sat(Solutions::new(&[1])));
}

#[test]
fn every_binary_clause_over_two_variables_is_unsat() {
    let cnf = Cnf::new(2, vec![vec![1, 2], vec![-1, 2], vec![1, -2], vec![-1, -2]]);
    assert_eq!(solve(&cnf).0, SolveResult::Unsat);
}

#[test]
fn negative_units_force_the_remaining_literal() {
    let cnf = Cnf::new(3, vec![vec![1, 2, 3], vec![-1], vec![-2]]);
    assert_eq!(solve(&cnf).0, SolveResult::Sat(Solutions::new(&[-1, -2, 3])));
}

#[test]
fn opposite_units_are_unsat() {
    let cnf = Cnf::new(2, vec![vec![1], vec![-1]]);
    assert_eq!(solve(&cnf).0, SolveResult::Unsat);
}

#[test]
fn implication_chain_across_word_boundaries() {
    let n = 130;
    let mut clauses: Vec<Vec<i32>> = (1..130).map(|v| vec![-v, v + 1]).collect();
    clauses.push(vec![1]);
    let cnf = Cnf::new(n, clauses);

    let (result, solver) = solve(&cnf);
    let solutions = result.solutions().unwrap();
    assert_eq!(solutions.len(), n);
    assert!(solutions.iter().all(|&lit| lit > 0));
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn pigeonhole_four_into_three_is_unsat() {
    // Variable p(i, h) = i * 3 + h + 1: pigeon i sits in hole h.
    let var = |i: i32, h: i32| i * 3 + h + 1;
    let mut clauses: Vec<Vec<i32>> = (0..4).map(|i| (0..3).map(|h| var(i, h)).collect()).collect();
    for h in 0..3 {
        for i in 0..4 {
            for j in (i + 1)..4 {
                clauses.push(vec![-var(i, h), -var(j, h)]);
            }
        }
    }
    let cnf = Cnf::new(12, clauses);

    let (result, solver) = solve(&cnf);
    assert_eq!(result, SolveResult::Unsat);
    assert!(solver.stats().learnt_clauses > 0);
}

// ============================================================================
// Random instances
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every SAT answer comes with a model satisfying each original clause.
    #[test]
    fn sat_models_satisfy_every_clause(cnf in arb_cnf()) {
        if let SolveResult::Sat(solutions) = solve(&cnf).0 {
            prop_assert!(cnf.verify(&solutions), "model {solutions} fails {cnf}");
        }
    }

    /// The verdict agrees with exhaustive enumeration.
    #[test]
    fn verdict_matches_brute_force(cnf in arb_cnf()) {
        let (result, _) = solve(&cnf);
        prop_assert_eq!(result.is_sat(), brute_force_sat(&cnf), "instance:\n{}", cnf);
    }

    /// Two solves of the same input give the same answer by the same path.
    #[test]
    fn solving_is_deterministic(cnf in arb_cnf()) {
        let (first, a) = solve(&cnf);
        let (second, b) = solve(&cnf);
        prop_assert_eq!(first, second);
        prop_assert_eq!(a.stats(), b.stats());
    }

    /// The database partition and per-clause bit invariants hold after every step.
    #[test]
    fn invariants_hold_between_steps(cnf in arb_cnf()) {
        let mut solver = Cdcl::new(&cnf);
        prop_assert!(solver.formula().is_consistent());
        while !solver.is_done() {
            solver.step();
            prop_assert!(solver.formula().is_consistent());
        }
    }

    /// Learned clauses are implied by the original formula.
    #[test]
    fn learned_clauses_are_entailed(cnf in arb_cnf()) {
        let (_, solver) = solve(&cnf);
        for model in all_models(cnf.num_vars).filter(|m| satisfies(&cnf, m)) {
            for learned in solver.formula().learned() {
                prop_assert!(
                    learned.is_satisfied_by(&model),
                    "learned {} violated by a model of\n{}", learned, cnf
                );
            }
        }
    }

    /// The trail never records a variable twice.
    #[test]
    fn trail_holds_each_variable_once(cnf in arb_cnf()) {
        let mut solver = Cdcl::new(&cnf);
        while !solver.is_done() {
            solver.step();
            let trail = solver.trail();
            let mut seen = Bitset::new(cnf.num_vars);
            for step in trail.iter() {
                prop_assert!(!seen.test(step.var));
                seen.set(step.var);
            }
        }
    }
}
