pub mod error;
pub mod lp;
pub mod stochastic;

pub use error::{Error, Result};
pub use lp::{LpModel, LpOracle, LpSolution, LpStatus, SimplexOracle};
pub use stochastic::{
    ExtensiveForm, LShaped, LShapedSolution, LShapedStatus, MasterProblem, ProblemData, Scenario,
};
