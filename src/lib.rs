//! # lcg-seed: recovering generator states from scripted outcomes
//!
//! **`lcg-seed`** finds initial register states of an 8-bit linear congruential
//! generator that, when replayed through a fixed script of random draws,
//! produce a required sequence of outcomes.
//!
//! ## The model
//!
//! The generator steps as `next(x) = (5x + 1) mod 256`. The script consumes a
//! series of *slots*: the first few are free *roots*, every later slot is one
//! step past an earlier one. Each decision in the script reads the slot's
//! *advanced value* `next(slot)` and compares it with a table constant, a
//! probability cutoff, a masked count or a rotated threshold.
//!
//! Finding roots is then a bit-vector satisfiability problem. The crate ships
//! its own decision procedure: constraints are bit-blasted into a reduced
//! ordered BDD with complement edges, which also gives exact model counts and
//! minimal conflicting label sets for free.
//!
//! ## Basic Usage
//!
//! ```rust
//! use lcg_seed::catalog::Catalog;
//! use lcg_seed::graph::StateGraph;
//! use lcg_seed::solve::{solve, Outcome, SolveOptions};
//! use lcg_seed::solver::BddSolver;
//!
//! let graph = StateGraph::script();
//! let catalog = Catalog::script(&graph).unwrap();
//!
//! let mut backend = BddSolver::new();
//! match solve(&mut backend, &graph, &catalog, &SolveOptions::default()).unwrap() {
//!     Outcome::Sat(assignment) => {
//!         assert!(assignment.verify(&graph, &catalog).unwrap().is_empty());
//!         println!("{}", assignment);
//!     }
//!     Outcome::Unsat(labels) => panic!("conflict: {:?}", labels),
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`lcg`]**: the step function, its inverse and a concrete iterator.
//! - **[`graph`]**, **[`catalog`]**: slots, their links and the labeled predicates.
//! - **[`solve`]**: the pipeline from constraints to an [`Outcome`][crate::solve::Outcome].
//! - **[`backend`]**, **[`solver`]**: the decision-procedure trait and its BDD implementation.
//! - **[`bdd`]**, **[`bitvec`]**, **[`sat`]**: the underlying BDD engine and bit-blaster.

pub mod backend;
pub mod bdd;
pub mod bitvec;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod lcg;
pub mod order;
pub mod reference;
pub mod sat;
pub mod solve;
pub mod solver;
pub mod table;
pub mod term;
pub mod utils;
