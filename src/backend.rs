//! Abstract decision-procedure interface.
//!
//! The orchestrator talks to a backend only through [`Backend`], so the
//! constraint model stays independent of any particular solver.

use std::time::Instant;

use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::term::{BoolTerm, VarId};

/// Verdict of a satisfiability check.
///
/// Running out of time is not a verdict: backends report it as
/// [`Error::Timeout`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
}

pub trait Backend {
    /// Declare a fixed-width unsigned variable.
    fn declare_var(&mut self, var: VarId, name: &str) -> Result<()>;

    /// Assert an unlabeled constraint. It never appears in an unsat core.
    fn assert(&mut self, term: &BoolTerm) -> Result<()>;

    /// Assert a constraint tracked under `label`.
    fn assert_and_track(&mut self, term: &BoolTerm, label: &str) -> Result<()>;

    /// Decide the conjunction of everything asserted so far.
    fn check(&mut self, deadline: Option<Instant>) -> Result<SatResult>;

    /// Values of `vars` in a satisfying assignment, after a `Sat` check.
    fn model(&self, vars: &[VarId]) -> Result<Vec<u8>>;

    /// Labels of a minimal unsatisfiable subset, after an `Unsat` check.
    fn unsat_core(&mut self) -> Result<Vec<String>>;

    /// Number of distinct assignments to `vars` extendable to a full model.
    fn count_models(&self, _vars: &[VarId]) -> Result<BigUint> {
        Err(Error::Backend("model counting is not supported".to_string()))
    }
}

/// Fail with [`Error::Timeout`] once `deadline` has passed.
pub fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(Error::Timeout),
        _ => Ok(()),
    }
}
