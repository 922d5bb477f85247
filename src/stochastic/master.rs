use crate::error::{Error, Result};
use crate::lp::{LpModel, LpOracle, LpStatus, Relation, Sense, Var};
use crate::stochastic::cuts::{Cut, CutKind};
use crate::stochastic::problem::ProblemData;

/// The master problem: first-stage acquisition cost plus the recourse
/// estimate, over an append-only cut set.
///
/// One model handle persists for the whole run; cuts are installed as new
/// constraint rows and never re-added or removed.
pub struct MasterProblem {
    model: LpModel,
    x: Vec<Var>,
    theta: Var,
    cuts: Vec<Cut>,
}

/// First-stage values read back through the typed handles.
#[derive(Debug, Clone)]
pub struct MasterSolution {
    pub x: Vec<f64>,
    pub theta: f64,
    pub objective: f64,
}

impl MasterProblem {
    /// Builds `min sum c * x + theta` with `x >= 0` and `theta >= theta_min`.
    ///
    /// `theta_min` is a large negative finite stand-in for minus infinity;
    /// the oracle needs finite bounds to keep the initial master bounded.
    pub fn new(data: &ProblemData, theta_min: f64) -> Self {
        let mut model = LpModel::new("master", Sense::Minimize);
        let x = (0..data.num_resources())
            .map(|j| model.add_var(0.0, f64::INFINITY, data.resource_cost(j)))
            .collect();
        let theta = model.add_var(theta_min, f64::INFINITY, 1.0);
        Self {
            model,
            x,
            theta,
            cuts: Vec::new(),
        }
    }

    /// Installs a cut as a constraint row. Append-only.
    pub fn add_cut(&mut self, cut: &Cut) {
        match cut.kind {
            CutKind::Feasibility => {
                // sum a * x + constant <= 0
                let coeffs = self
                    .x
                    .iter()
                    .copied()
                    .zip(cut.x_coeffs.iter().copied())
                    .collect();
                self.model
                    .add_constr(coeffs, Relation::LessEq, -cut.constant);
            }
            CutKind::Optimality => {
                // theta - sum a * x >= constant
                let mut coeffs: Vec<(Var, f64)> = self
                    .x
                    .iter()
                    .copied()
                    .zip(cut.x_coeffs.iter().map(|a| -a))
                    .collect();
                coeffs.push((self.theta, 1.0));
                self.model
                    .add_constr(coeffs, Relation::GreaterEq, cut.constant);
            }
        }
        self.cuts.push(cut.clone());
    }

    pub fn num_cuts(&self) -> usize {
        self.cuts.len()
    }

    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Solves the master; anything other than optimal is fatal.
    pub fn solve<O: LpOracle>(&self, oracle: &O) -> Result<MasterSolution> {
        let sol = oracle.solve(&self.model)?;
        if sol.status != LpStatus::Optimal {
            return Err(Error::ModelStatus {
                model: self.model.name().to_string(),
                status: sol.status,
            });
        }
        Ok(MasterSolution {
            x: self.x.iter().map(|v| sol.primal[v.index()]).collect(),
            theta: sol.primal[self.theta.index()],
            objective: sol.objective,
        })
    }
}
