pub mod cuts;
pub mod driver;
pub mod dual;
pub mod extensive;
pub mod master;
pub mod problem;

#[cfg(test)]
mod tests;

pub use cuts::{Cut, CutKind};
pub use driver::LShaped;
pub use dual::{DualOutcome, ScenarioDual, ScenarioDualSolution, ScenarioRay};
pub use extensive::{ExtensiveForm, ExtensiveSolution};
pub use master::{MasterProblem, MasterSolution};
pub use problem::{ProblemData, Scenario};

/// Terminal state of a decomposition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LShapedStatus {
    /// The expected recourse cost matched the master's estimate within
    /// tolerance; the first-stage solution is optimal.
    Converged,
    /// The iteration budget ran out first; the solution carries the best
    /// iterate seen.
    IterationLimitReached,
}

/// Outcome of a decomposition run.
#[derive(Debug, Clone)]
pub struct LShapedSolution {
    pub status: LShapedStatus,
    /// First-stage resource acquisition.
    pub x: Vec<f64>,
    /// The master's recourse-cost estimate at the final iterate.
    pub theta: f64,
    /// Master objective: first-stage cost plus theta.
    pub objective: f64,
    /// Expected recourse cost at the final iterate, when the last iteration
    /// got far enough to evaluate it.
    pub expected_recourse: Option<f64>,
    pub iterations: usize,
    /// Total cuts installed into the master.
    pub cuts: usize,
}
