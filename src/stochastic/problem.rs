use crate::error::{Error, Result};

const PROBABILITY_TOL: f64 = 1e-6;

/// One realization of demand, with its probability.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub probability: f64,
    /// Demand cap per product.
    pub demand: Vec<f64>,
}

/// Static description of the two-stage production problem: which resources
/// can be acquired in the first stage, what the products made from them earn
/// in the second, and the demand scenarios the second stage must adapt to.
///
/// Immutable after construction; [`ProblemData::new`] validates dimensions,
/// nonnegativity, and that scenario probabilities are positive and sum to 1.
#[derive(Debug, Clone)]
pub struct ProblemData {
    products: Vec<String>,
    resources: Vec<String>,
    /// `technology[i][j]`: units of resource `j` consumed per unit of
    /// product `i`.
    technology: Vec<Vec<f64>>,
    resource_cost: Vec<f64>,
    product_profit: Vec<f64>,
    salvage_value: Vec<f64>,
    scenarios: Vec<Scenario>,
}

impl ProblemData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Vec<String>,
        resources: Vec<String>,
        technology: Vec<Vec<f64>>,
        resource_cost: Vec<f64>,
        product_profit: Vec<f64>,
        salvage_value: Vec<f64>,
        scenarios: Vec<Scenario>,
    ) -> Result<Self> {
        let p = products.len();
        let r = resources.len();
        if p == 0 || r == 0 {
            return Err(Error::InvalidProblem(
                "at least one product and one resource required".into(),
            ));
        }
        if scenarios.is_empty() {
            return Err(Error::InvalidProblem("at least one scenario required".into()));
        }
        if technology.len() != p || technology.iter().any(|row| row.len() != r) {
            return Err(Error::InvalidProblem(format!(
                "technology matrix must be {} x {}",
                p, r
            )));
        }
        if technology.iter().flatten().any(|&a| !(a >= 0.0) || !a.is_finite()) {
            return Err(Error::InvalidProblem(
                "technology coefficients must be finite and nonnegative".into(),
            ));
        }
        if resource_cost.len() != r || salvage_value.len() != r {
            return Err(Error::InvalidProblem(format!(
                "expected {} resource costs and salvage values",
                r
            )));
        }
        if product_profit.len() != p {
            return Err(Error::InvalidProblem(format!("expected {} product profits", p)));
        }
        if salvage_value.iter().any(|&s| !(s >= 0.0)) {
            return Err(Error::InvalidProblem("salvage values must be nonnegative".into()));
        }
        let mut total = 0.0;
        for (k, scenario) in scenarios.iter().enumerate() {
            if !(scenario.probability > 0.0) || scenario.probability > 1.0 {
                return Err(Error::InvalidProblem(format!(
                    "scenario {} probability must lie in (0, 1]",
                    k
                )));
            }
            if scenario.demand.len() != p {
                return Err(Error::InvalidProblem(format!(
                    "scenario {} must cap demand for all {} products",
                    k, p
                )));
            }
            if scenario.demand.iter().any(|&d| !(d >= 0.0)) {
                return Err(Error::InvalidProblem(format!(
                    "scenario {} demands must be nonnegative",
                    k
                )));
            }
            total += scenario.probability;
        }
        if (total - 1.0).abs() > PROBABILITY_TOL {
            return Err(Error::InvalidProblem(format!(
                "scenario probabilities sum to {}, expected 1",
                total
            )));
        }
        Ok(Self {
            products,
            resources,
            technology,
            resource_cost,
            product_profit,
            salvage_value,
            scenarios,
        })
    }

    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn num_scenarios(&self) -> usize {
        self.scenarios.len()
    }

    pub fn product_name(&self, i: usize) -> &str {
        &self.products[i]
    }

    pub fn resource_name(&self, j: usize) -> &str {
        &self.resources[j]
    }

    /// Units of resource `j` consumed per unit of product `i`.
    pub fn technology(&self, i: usize, j: usize) -> f64 {
        self.technology[i][j]
    }

    pub fn resource_cost(&self, j: usize) -> f64 {
        self.resource_cost[j]
    }

    pub fn product_profit(&self, i: usize) -> f64 {
        self.product_profit[i]
    }

    pub fn salvage_value(&self, j: usize) -> f64 {
        self.salvage_value[j]
    }

    pub fn probability(&self, k: usize) -> f64 {
        self.scenarios[k].probability
    }

    /// Demand cap for product `i` under scenario `k`.
    pub fn demand(&self, k: usize, i: usize) -> f64 {
        self.scenarios[k].demand[i]
    }

    pub fn scenario(&self, k: usize) -> &Scenario {
        &self.scenarios[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Result<ProblemData> {
        ProblemData::new(
            vec!["A".to_string(), "B".to_string()],
            vec!["alpha".to_string(), "beta".to_string()],
            vec![vec![1.0, 3.0], vec![1.0, 4.0]],
            vec![10.0, 1.0],
            vec![40.0, 50.0],
            vec![0.0, 0.1],
            vec![
                Scenario {
                    probability: 0.4,
                    demand: vec![10.0, 30.0],
                },
                Scenario {
                    probability: 0.6,
                    demand: vec![20.0, 60.0],
                },
            ],
        )
    }

    #[test]
    fn test_valid_data_builds() {
        let data = two_by_two().unwrap();
        assert_eq!(data.num_products(), 2);
        assert_eq!(data.num_resources(), 2);
        assert_eq!(data.num_scenarios(), 2);
        assert_eq!(data.technology(1, 1), 4.0);
        assert_eq!(data.demand(1, 0), 20.0);
    }

    #[test]
    fn test_probabilities_must_sum_to_one() {
        let err = ProblemData::new(
            vec!["A".to_string()],
            vec!["alpha".to_string()],
            vec![vec![1.0]],
            vec![1.0],
            vec![5.0],
            vec![0.0],
            vec![
                Scenario {
                    probability: 0.5,
                    demand: vec![1.0],
                },
                Scenario {
                    probability: 0.4,
                    demand: vec![2.0],
                },
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("probabilities"));
    }

    #[test]
    fn test_probability_must_be_positive() {
        let err = ProblemData::new(
            vec!["A".to_string()],
            vec!["alpha".to_string()],
            vec![vec![1.0]],
            vec![1.0],
            vec![5.0],
            vec![0.0],
            vec![
                Scenario {
                    probability: 0.0,
                    demand: vec![1.0],
                },
                Scenario {
                    probability: 1.0,
                    demand: vec![2.0],
                },
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("probability"));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = ProblemData::new(
            vec!["A".to_string(), "B".to_string()],
            vec!["alpha".to_string()],
            vec![vec![1.0]],
            vec![1.0],
            vec![5.0, 6.0],
            vec![0.0],
            vec![Scenario {
                probability: 1.0,
                demand: vec![1.0, 2.0],
            }],
        )
        .unwrap_err();
        assert!(err.to_string().contains("technology"));
    }

    #[test]
    fn test_negative_demand_rejected() {
        let err = ProblemData::new(
            vec!["A".to_string()],
            vec!["alpha".to_string()],
            vec![vec![1.0]],
            vec![1.0],
            vec![5.0],
            vec![0.0],
            vec![Scenario {
                probability: 1.0,
                demand: vec![-1.0],
            }],
        )
        .unwrap_err();
        assert!(err.to_string().contains("nonnegative"));
    }
}
