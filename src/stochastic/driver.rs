use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::lp::LpOracle;
use crate::stochastic::cuts;
use crate::stochastic::dual::{DualOutcome, ScenarioDual};
use crate::stochastic::master::{MasterProblem, MasterSolution};
use crate::stochastic::problem::ProblemData;
use crate::stochastic::{LShapedSolution, LShapedStatus};

/// The L-shaped decomposition driver.
///
/// Alternates between the master problem and the per-scenario duals: an
/// unbounded dual short-circuits the sweep into a single feasibility cut,
/// an all-optimal sweep either converges or contributes one aggregated
/// optimality cut. Cuts only accumulate, so the master's recourse estimate
/// tightens monotonically; the iteration ceiling guards against
/// floating-point cycling, which exact arithmetic would rule out.
///
/// # Examples
///
/// ```
/// use lshaped::lp::SimplexOracle;
/// use lshaped::stochastic::{LShaped, LShapedStatus, ProblemData, Scenario};
///
/// // One product, one resource, no demand: acquiring anything is wasted,
/// // so the optimal plan spends nothing.
/// let data = ProblemData::new(
///     vec!["widget".to_string()],
///     vec!["steel".to_string()],
///     vec![vec![1.0]],
///     vec![1.0],
///     vec![5.0],
///     vec![0.0],
///     vec![Scenario { probability: 1.0, demand: vec![0.0] }],
/// )
/// .unwrap();
///
/// let solution = LShaped::default()
///     .solve(&data, &SimplexOracle::default())
///     .unwrap();
/// assert_eq!(solution.status, LShapedStatus::Converged);
/// assert!(solution.objective.abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct LShaped {
    /// Ceiling on master iterations before giving up.
    pub max_iterations: usize,
    /// Convergence tolerance for `value <= theta + tolerance`. Too tight
    /// invites false non-convergence from dual-value noise, too loose stops
    /// at a suboptimal first stage.
    pub tolerance: f64,
    /// Finite lower bound standing in for minus infinity on theta.
    pub theta_min: f64,
}

impl Default for LShaped {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            theta_min: -1e8,
        }
    }
}

impl LShaped {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Self::default()
        }
    }

    pub fn solve<O>(&self, data: &ProblemData, oracle: &O) -> Result<LShapedSolution>
    where
        O: LpOracle + Sync,
    {
        let mut master = MasterProblem::new(data, self.theta_min);
        let mut last: Option<(MasterSolution, Option<f64>)> = None;

        for iteration in 0..self.max_iterations {
            let mp = master.solve(oracle)?;

            // Scenario duals depend only on this iteration's x, so they are
            // solved in parallel; the collect is the barrier, and no cut is
            // installed until every outcome is in.
            let outcomes: Vec<Result<DualOutcome>> = (0..data.num_scenarios())
                .into_par_iter()
                .map(|k| ScenarioDual::build(data, k, &mp.x).solve(oracle))
                .collect();

            // Classify in enumeration order; the first unbounded scenario
            // wins and the rest of the sweep is discarded.
            let mut optimal = Vec::with_capacity(outcomes.len());
            let mut infeasible = None;
            for outcome in outcomes {
                match outcome? {
                    DualOutcome::Unbounded(ray) => {
                        infeasible = Some(ray);
                        break;
                    }
                    DualOutcome::Optimal(sol) => optimal.push(sol),
                }
            }

            if let Some(ray) = infeasible {
                info!(
                    "iteration {}: recourse infeasible for scenario {}, adding a feasibility cut",
                    iteration, ray.scenario
                );
                master.add_cut(&cuts::feasibility_cut(data, &ray));
                last = Some((mp, None));
                continue;
            }

            let value: f64 = optimal
                .iter()
                .map(|sol| data.probability(sol.scenario) * sol.objective)
                .sum();
            debug!(
                "iteration {}: all subproblems feasible, value {:.6}, theta {:.6}",
                iteration, value, mp.theta
            );

            if value <= mp.theta + self.tolerance {
                info!(
                    "iteration {}: converged, master objective {:.6}",
                    iteration, mp.objective
                );
                for sol in &optimal {
                    debug!("scenario {}: recourse {:.6}", sol.scenario, sol.objective);
                }
                return Ok(LShapedSolution {
                    status: LShapedStatus::Converged,
                    x: mp.x,
                    theta: mp.theta,
                    objective: mp.objective,
                    expected_recourse: Some(value),
                    iterations: iteration + 1,
                    cuts: master.num_cuts(),
                });
            }

            info!(
                "iteration {}: adding an optimality cut, value {:.6} above theta {:.6}",
                iteration, value, mp.theta
            );
            master.add_cut(&cuts::optimality_cut(data, &optimal));
            last = Some((mp, Some(value)));
        }

        warn!(
            "iteration budget {} exhausted before convergence",
            self.max_iterations
        );
        let (mp, value) = match last {
            Some(last) => last,
            // A zero-iteration budget never touched the master; solve it
            // once so the report has something to say.
            None => (master.solve(oracle)?, None),
        };
        Ok(LShapedSolution {
            status: LShapedStatus::IterationLimitReached,
            x: mp.x,
            theta: mp.theta,
            objective: mp.objective,
            expected_recourse: value,
            iterations: self.max_iterations,
            cuts: master.num_cuts(),
        })
    }
}
