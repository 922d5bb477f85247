use crate::stochastic::dual::{ScenarioDualSolution, ScenarioRay};
use crate::stochastic::problem::ProblemData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// `sum x_coeffs * x + constant <= 0`: excludes first-stage decisions
    /// whose recourse subproblem has no feasible plan.
    Feasibility,
    /// `theta >= sum x_coeffs * x + constant`: a supporting affine lower
    /// bound on the expected recourse cost.
    Optimality,
}

/// A linear inequality over the master's variables, frozen at creation.
///
/// Cuts are created once from a dual solution or ray, installed into the
/// master once, and never modified or removed.
#[derive(Debug, Clone)]
pub struct Cut {
    pub kind: CutKind,
    /// Scenario whose ray produced a feasibility cut.
    pub scenario: Option<usize>,
    pub x_coeffs: Vec<f64>,
    pub constant: f64,
}

impl Cut {
    /// The affine part `sum x_coeffs * x + constant` evaluated at `x`.
    pub fn affine_value(&self, x: &[f64]) -> f64 {
        self.x_coeffs
            .iter()
            .zip(x.iter())
            .map(|(a, v)| a * v)
            .sum::<f64>()
            + self.constant
    }
}

/// Builds the feasibility cut for a scenario whose dual went unbounded.
///
/// The ray is a recession direction of the dual feasible region, so its
/// objective `x * lambda_ray + d * mu_ray` must stay nonpositive for any
/// first-stage `x` that leaves the recourse subproblem feasible; the cut
/// excludes exactly the `x` that reproduce the blow-up.
pub fn feasibility_cut(data: &ProblemData, ray: &ScenarioRay) -> Cut {
    let constant = (0..data.num_products())
        .map(|i| data.demand(ray.scenario, i) * ray.mu[i])
        .sum();
    Cut {
        kind: CutKind::Feasibility,
        scenario: Some(ray.scenario),
        x_coeffs: ray.lambda.clone(),
        constant,
    }
}

/// Builds the aggregated optimality cut from one optimal dual per scenario.
///
/// By weak duality each scenario's dual optimum, frozen at its current
/// `(lambda, mu)`, under-estimates that scenario's true recourse cost at any
/// `x`; the probability-weighted sum is a valid lower bound on theta.
pub fn optimality_cut(data: &ProblemData, duals: &[ScenarioDualSolution]) -> Cut {
    let mut x_coeffs = vec![0.0; data.num_resources()];
    let mut constant = 0.0;
    for dual in duals {
        let p = data.probability(dual.scenario);
        for (coeff, lambda) in x_coeffs.iter_mut().zip(dual.lambda.iter()) {
            *coeff += p * lambda;
        }
        for (i, mu) in dual.mu.iter().enumerate() {
            constant += p * data.demand(dual.scenario, i) * mu;
        }
    }
    Cut {
        kind: CutKind::Optimality,
        scenario: None,
        x_coeffs,
        constant,
    }
}
