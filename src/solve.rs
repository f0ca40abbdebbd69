//! The solve pipeline: graph and catalog in, root assignment or conflict out.

use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, info};
use num_bigint::BigUint;

use crate::backend::{Backend, SatResult};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::graph::{Slot, StateGraph};
use crate::lcg::next;
use crate::term::VarId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Wall-clock budget for the whole solve, core extraction included.
    pub deadline: Option<Duration>,
    /// Also count the root assignments satisfying the catalog.
    pub count: bool,
}

/// Concrete root values found by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    roots: Vec<u8>,
    count: Option<BigUint>,
}

/// One slot of a concrete replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub slot: Slot,
    pub value: u8,
    pub advanced: u8,
    pub checks: Vec<(String, bool)>,
}

impl Display for TraceRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>3} = {:>3} -> {:>3}", self.slot.to_string(), self.value, self.advanced)?;
        for (label, ok) in &self.checks {
            write!(f, "  [{}] {}", if *ok { "ok" } else { "FAIL" }, label)?;
        }
        Ok(())
    }
}

impl Assignment {
    pub fn new(roots: Vec<u8>) -> Self {
        Self { roots, count: None }
    }

    pub fn roots(&self) -> &[u8] {
        &self.roots
    }

    /// Number of satisfying root assignments, when counting was requested.
    pub fn count(&self) -> Option<&BigUint> {
        self.count.as_ref()
    }

    /// Replay the roots through the graph and return the labels that fail.
    pub fn verify(&self, graph: &StateGraph, catalog: &Catalog) -> Result<Vec<String>> {
        let values = graph.resolve(&self.roots)?;
        Ok(catalog
            .iter()
            .filter(|p| !p.evaluate(&values))
            .map(|p| p.label().to_string())
            .collect())
    }

    pub fn trace(&self, graph: &StateGraph, catalog: &Catalog) -> Result<Vec<TraceRow>> {
        let values = graph.resolve(&self.roots)?;
        Ok(graph
            .slots()
            .map(|slot| TraceRow {
                slot,
                value: values[slot.index()],
                advanced: next(values[slot.index()]),
                checks: catalog
                    .at(slot)
                    .map(|p| (p.label().to_string(), p.evaluate(&values)))
                    .collect(),
            })
            .collect())
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, r) in self.roots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", r)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sat(Assignment),
    /// Labels of an irreducible conflicting subset, in catalog order.
    Unsat(Vec<String>),
}

/// Submit every structural relation and every labeled predicate to `backend`
/// and report exactly one outcome.
pub fn solve<B: Backend>(
    backend: &mut B,
    graph: &StateGraph,
    catalog: &Catalog,
    options: &SolveOptions,
) -> Result<Outcome> {
    let deadline = options.deadline.map(|d| Instant::now() + d);

    for slot in graph.slots() {
        backend.declare_var(slot.var(), &slot.to_string())?;
    }
    for term in graph.relation_terms() {
        debug!("relation {}", term);
        backend.assert(&term)?;
    }
    for p in catalog {
        debug!("{} [{}]: {}", p.label(), p.family(), p.term());
        backend.assert_and_track(p.term(), p.label())?;
    }
    info!(
        "submitted {} slots, {} relations and {} predicates",
        graph.num_slots(),
        graph.relations().count(),
        catalog.len()
    );

    match backend.check(deadline)? {
        SatResult::Sat => {
            let roots: Vec<VarId> = graph.roots().map(|s| s.var()).collect();
            let mut assignment = Assignment::new(backend.model(&roots)?);
            info!("satisfiable: {}", assignment);

            let failing = assignment.verify(graph, catalog)?;
            if !failing.is_empty() {
                return Err(Error::Backend(format!(
                    "model {} fails replay on {:?}",
                    assignment, failing
                )));
            }

            if options.count {
                let count = backend.count_models(&roots)?;
                info!("{} satisfying root assignments", count);
                assignment.count = Some(count);
            }
            Ok(Outcome::Sat(assignment))
        }
        SatResult::Unsat => {
            let core = backend.unsat_core()?;
            info!("unsatisfiable, core of {} labels", core.len());
            Ok(Outcome::Unsat(core))
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::catalog::{Bound, Predicate};
    use crate::solver::BddSolver;

    #[test]
    fn test_assignment_display() {
        assert_eq!(Assignment::new(vec![14, 0, 255]).to_string(), "14, 0, 255");
        assert_eq!(Assignment::new(vec![]).to_string(), "");
    }

    #[test]
    fn test_verify_reports_failing_labels() {
        let graph = StateGraph::new(2, 1).unwrap();
        let mut catalog = Catalog::new();
        catalog
            .push(Predicate::exact(graph.slot(0).unwrap(), "root picks 6", 6))
            .unwrap();
        catalog
            .push(Predicate::exact(graph.slot(1).unwrap(), "child picks 31", 31))
            .unwrap();

        // 1 -> 6 -> 31
        assert!(Assignment::new(vec![1]).verify(&graph, &catalog).unwrap().is_empty());
        assert_eq!(
            Assignment::new(vec![2]).verify(&graph, &catalog).unwrap(),
            vec!["root picks 6".to_string(), "child picks 31".to_string()]
        );
    }

    #[test]
    fn test_solve_small_chain() {
        let graph = StateGraph::new(3, 1).unwrap();
        let mut catalog = Catalog::new();
        catalog
            .push(Predicate::threshold(graph.slot(2).unwrap(), "late draw", Bound::Exactly(156)))
            .unwrap();

        let options = SolveOptions {
            count: true,
            ..Default::default()
        };
        let outcome = solve(&mut BddSolver::new(), &graph, &catalog, &options).unwrap();
        // next^3(1) = 156
        match outcome {
            Outcome::Sat(a) => {
                assert_eq!(a.roots(), &[1]);
                assert_eq!(a.count(), Some(&BigUint::from(1u32)));
                let trace = a.trace(&graph, &catalog).unwrap();
                assert_eq!(trace.len(), 3);
                assert_eq!(trace[2].advanced, 156);
                assert_eq!(trace[2].checks, vec![("late draw".to_string(), true)]);
            }
            other => panic!("expected Sat, got {:?}", other),
        }
    }

    #[test]
    fn test_solve_conflict() {
        let graph = StateGraph::new(2, 1).unwrap();
        let root = graph.slot(0).unwrap();
        let child = graph.slot(1).unwrap();
        let mut catalog = Catalog::new();
        catalog.push(Predicate::self_hit_avoidance(root, "calm")).unwrap();
        catalog.push(Predicate::exact(child, "child one way", 10)).unwrap();
        catalog.push(Predicate::exact(child, "child other way", 11)).unwrap();

        let outcome = solve(&mut BddSolver::new(), &graph, &catalog, &SolveOptions::default()).unwrap();
        assert_eq!(
            outcome,
            Outcome::Unsat(vec!["child one way".to_string(), "child other way".to_string()])
        );
    }

    #[test]
    fn test_solve_zero_deadline() {
        let graph = StateGraph::new(2, 1).unwrap();
        let options = SolveOptions {
            deadline: Some(Duration::ZERO),
            count: false,
        };
        let res = solve(&mut BddSolver::new(), &graph, &Catalog::new(), &options);
        assert_eq!(res, Err(Error::Timeout));
    }
}
