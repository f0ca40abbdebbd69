use thiserror::Error;

/// Errors raised while building or solving a constraint model.
///
/// An infeasible predicate set is not an error: it is reported as
/// [`Outcome::Unsat`][crate::solve::Outcome::Unsat].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid state graph: {0}")]
    InvalidGraph(String),
    #[error("duplicate predicate label: {0:?}")]
    DuplicateLabel(String),
    #[error("unknown variable: v{0}")]
    UnknownVariable(usize),
    #[error("solver deadline expired before a verdict was reached")]
    Timeout,
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
