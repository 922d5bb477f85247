use thiserror::Error;

use crate::lp::LpStatus;

/// Errors surfaced by problem construction and the decomposition run.
///
/// Exhausting the iteration budget is deliberately *not* an error; it is
/// reported as [`crate::stochastic::LShapedStatus::IterationLimitReached`] on
/// the returned solution.
#[derive(Debug, Error)]
pub enum Error {
    /// Problem data failed construction-time validation.
    #[error("invalid problem data: {0}")]
    InvalidProblem(String),

    /// A model came back with a status the caller cannot proceed from,
    /// e.g. an infeasible scenario dual or a non-optimal master.
    #[error("{model}: unexpected status {status}")]
    ModelStatus { model: String, status: LpStatus },

    /// The oracle violated its contract, e.g. reported unbounded without
    /// producing an extreme ray certificate.
    #[error("{model}: oracle contract violation: {reason}")]
    Oracle { model: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
