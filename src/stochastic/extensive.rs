use crate::error::{Error, Result};
use crate::lp::{LpModel, LpOracle, LpStatus, Relation, Sense, Var};
use crate::stochastic::problem::ProblemData;

/// The extensive form: one monolithic LP enumerating every scenario's
/// recourse variables next to the shared first stage.
///
/// Tractable only for small scenario counts; it exists to cross-validate
/// the decomposition, whose converged master objective must match this
/// model's optimum.
pub struct ExtensiveForm {
    model: LpModel,
    x: Vec<Var>,
}

#[derive(Debug, Clone)]
pub struct ExtensiveSolution {
    pub x: Vec<f64>,
    pub objective: f64,
}

impl ExtensiveForm {
    /// Minimizes first-stage cost minus probability-weighted second-stage
    /// revenue, with per-scenario production `y`, leftovers `z`, resource
    /// balance `z = x - m y`, and demand caps as bounds on `y`.
    pub fn build(data: &ProblemData) -> Self {
        let mut model = LpModel::new("extensive form", Sense::Minimize);
        let x: Vec<Var> = (0..data.num_resources())
            .map(|j| model.add_var(0.0, f64::INFINITY, data.resource_cost(j)))
            .collect();
        for k in 0..data.num_scenarios() {
            let p = data.probability(k);
            let y: Vec<Var> = (0..data.num_products())
                .map(|i| model.add_var(0.0, data.demand(k, i), -p * data.product_profit(i)))
                .collect();
            let z: Vec<Var> = (0..data.num_resources())
                .map(|j| model.add_var(0.0, f64::INFINITY, -p * data.salvage_value(j)))
                .collect();
            for j in 0..data.num_resources() {
                // z[j] - x[j] + sum_i m[i][j] y[i] = 0
                let mut coeffs = vec![(z[j], 1.0), (x[j], -1.0)];
                for (i, &yi) in y.iter().enumerate() {
                    let a = data.technology(i, j);
                    if a != 0.0 {
                        coeffs.push((yi, a));
                    }
                }
                model.add_constr(coeffs, Relation::Equal, 0.0);
            }
        }
        Self { model, x }
    }

    pub fn solve<O: LpOracle>(&self, oracle: &O) -> Result<ExtensiveSolution> {
        let sol = oracle.solve(&self.model)?;
        if sol.status != LpStatus::Optimal {
            return Err(Error::ModelStatus {
                model: self.model.name().to_string(),
                status: sol.status,
            });
        }
        Ok(ExtensiveSolution {
            x: self.x.iter().map(|v| sol.primal[v.index()]).collect(),
            objective: sol.objective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::SimplexOracle;
    use crate::stochastic::problem::{ProblemData, Scenario};

    #[test]
    fn test_single_scenario_analytic_optimum() {
        // One product from one resource, deterministic demand of 10 at
        // profit 5 against cost 1: buy exactly 10 and produce all of it.
        let data = ProblemData::new(
            vec!["widget".to_string()],
            vec!["steel".to_string()],
            vec![vec![1.0]],
            vec![1.0],
            vec![5.0],
            vec![0.0],
            vec![Scenario {
                probability: 1.0,
                demand: vec![10.0],
            }],
        )
        .unwrap();

        let sol = ExtensiveForm::build(&data)
            .solve(&SimplexOracle::default())
            .unwrap();
        assert!((sol.x[0] - 10.0).abs() < 1e-6);
        assert!((sol.objective + 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_salvage_only_never_pays() {
        // No demand anywhere: with salvage below cost the optimum acquires
        // nothing.
        let data = ProblemData::new(
            vec!["widget".to_string()],
            vec!["steel".to_string(), "glass".to_string()],
            vec![vec![1.0, 2.0]],
            vec![2.0, 3.0],
            vec![9.0],
            vec![1.0, 0.5],
            vec![Scenario {
                probability: 1.0,
                demand: vec![0.0],
            }],
        )
        .unwrap();

        let sol = ExtensiveForm::build(&data)
            .solve(&SimplexOracle::default())
            .unwrap();
        assert!(sol.x.iter().all(|&v| v.abs() < 1e-6));
        assert!(sol.objective.abs() < 1e-6);
    }
}
