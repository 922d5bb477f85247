use crate::error::{Error, Result};
use crate::lp::{LpModel, LpOracle, LpStatus, Relation, Sense, Var};
use crate::stochastic::problem::ProblemData;

/// Dual of one scenario's recourse subproblem, parameterized by the current
/// first-stage solution.
///
/// Only the dual is ever solved: its optimal point prices the recourse
/// cost's sensitivity to `x` (optimality cuts), and its unbounded ray
/// certifies recourse infeasibility (feasibility cuts). Because the dual's
/// objective carries `x_bar`, the model is rebuilt from scratch each
/// iteration rather than persisted.
pub struct ScenarioDual {
    model: LpModel,
    lambda: Vec<Var>,
    mu: Vec<Var>,
    scenario: usize,
}

/// Optimal dual multipliers for one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioDualSolution {
    pub scenario: usize,
    /// Multipliers on the resource-balance rows, one per resource.
    pub lambda: Vec<f64>,
    /// Multipliers on the demand caps, one per product, nonpositive.
    pub mu: Vec<f64>,
    pub objective: f64,
}

/// Extreme ray of an unbounded scenario dual.
#[derive(Debug, Clone)]
pub struct ScenarioRay {
    pub scenario: usize,
    pub lambda: Vec<f64>,
    pub mu: Vec<f64>,
}

/// What a scenario dual solve can structurally produce. The dual is always
/// feasible (mu at zero with lambda pushed negative satisfies every row), so
/// optimal and unbounded are the only non-fatal outcomes.
#[derive(Debug, Clone)]
pub enum DualOutcome {
    Optimal(ScenarioDualSolution),
    Unbounded(ScenarioRay),
}

impl ScenarioDual {
    /// Builds, for scenario `k` at first-stage solution `x_bar`:
    ///
    /// maximize `x_bar * lambda + d[k] * mu`
    /// subject to `m[i] * lambda + mu[i] <= -q[i]` per product,
    /// `lambda[j] <= -s[j]` per resource, `mu <= 0`, `lambda` free.
    pub fn build(data: &ProblemData, scenario: usize, x_bar: &[f64]) -> Self {
        let mut model = LpModel::new(format!("scenario dual {}", scenario), Sense::Maximize);
        let lambda: Vec<Var> = (0..data.num_resources())
            .map(|j| model.add_var(f64::NEG_INFINITY, f64::INFINITY, x_bar[j]))
            .collect();
        let mu: Vec<Var> = (0..data.num_products())
            .map(|i| model.add_var(f64::NEG_INFINITY, 0.0, data.demand(scenario, i)))
            .collect();
        for i in 0..data.num_products() {
            let mut coeffs: Vec<(Var, f64)> = lambda
                .iter()
                .copied()
                .enumerate()
                .map(|(j, l)| (l, data.technology(i, j)))
                .collect();
            coeffs.push((mu[i], 1.0));
            model.add_constr(coeffs, Relation::LessEq, -data.product_profit(i));
        }
        for (j, &l) in lambda.iter().enumerate() {
            model.add_constr(vec![(l, 1.0)], Relation::LessEq, -data.salvage_value(j));
        }
        Self {
            model,
            lambda,
            mu,
            scenario,
        }
    }

    pub fn scenario(&self) -> usize {
        self.scenario
    }

    /// Solves the dual and classifies the outcome; any status other than
    /// optimal or unbounded is fatal.
    pub fn solve<O: LpOracle>(&self, oracle: &O) -> Result<DualOutcome> {
        let sol = oracle.solve(&self.model)?;
        match sol.status {
            LpStatus::Optimal => Ok(DualOutcome::Optimal(ScenarioDualSolution {
                scenario: self.scenario,
                lambda: self.lambda.iter().map(|v| sol.primal[v.index()]).collect(),
                mu: self.mu.iter().map(|v| sol.primal[v.index()]).collect(),
                objective: sol.objective,
            })),
            LpStatus::Unbounded => {
                let ray = sol.ray.ok_or_else(|| Error::Oracle {
                    model: self.model.name().to_string(),
                    reason: "unbounded status without an extreme ray".to_string(),
                })?;
                Ok(DualOutcome::Unbounded(ScenarioRay {
                    scenario: self.scenario,
                    lambda: self.lambda.iter().map(|v| ray[v.index()]).collect(),
                    mu: self.mu.iter().map(|v| ray[v.index()]).collect(),
                }))
            }
            status => Err(Error::ModelStatus {
                model: self.model.name().to_string(),
                status,
            }),
        }
    }
}
