use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::lp::{LpModel, LpOracle, LpStatus, Relation, Sense, SimplexOracle};
use crate::stochastic::cuts;
use crate::stochastic::dual::{DualOutcome, ScenarioDual, ScenarioDualSolution};
use crate::stochastic::extensive::ExtensiveForm;
use crate::stochastic::problem::{ProblemData, Scenario};
use crate::stochastic::{LShaped, LShapedStatus};

/// Two products, three resources, three demand scenarios.
fn production() -> ProblemData {
    ProblemData::new(
        vec!["A".to_string(), "B".to_string()],
        vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
        vec![vec![1.0, 3.0, 0.0], vec![1.0, 4.0, 1.0]],
        vec![10.0, 1.0, 1.0],
        vec![40.0, 50.0],
        vec![0.0, 0.1, 0.1],
        vec![
            Scenario {
                probability: 0.3,
                demand: vec![10.0, 30.0],
            },
            Scenario {
                probability: 0.5,
                demand: vec![20.0, 60.0],
            },
            Scenario {
                probability: 0.2,
                demand: vec![40.0, 80.0],
            },
        ],
    )
    .unwrap()
}

/// True recourse cost of scenario `k` at first stage `x`, from the primal:
/// min -q y - s z  s.t.  z = x - m y, 0 <= y <= d, z >= 0.
fn recourse_cost(data: &ProblemData, k: usize, x: &[f64], oracle: &SimplexOracle) -> f64 {
    let mut model = LpModel::new("scenario primal", Sense::Minimize);
    let y: Vec<_> = (0..data.num_products())
        .map(|i| model.add_var(0.0, data.demand(k, i), -data.product_profit(i)))
        .collect();
    let z: Vec<_> = (0..data.num_resources())
        .map(|j| model.add_var(0.0, f64::INFINITY, -data.salvage_value(j)))
        .collect();
    for j in 0..data.num_resources() {
        let mut coeffs = vec![(z[j], 1.0)];
        for (i, &yi) in y.iter().enumerate() {
            coeffs.push((yi, data.technology(i, j)));
        }
        model.add_constr(coeffs, Relation::Equal, x[j]);
    }
    let sol = oracle.solve(&model).unwrap();
    assert_eq!(sol.status, LpStatus::Optimal);
    sol.objective
}

fn solve_duals(
    data: &ProblemData,
    x: &[f64],
    oracle: &SimplexOracle,
) -> Vec<ScenarioDualSolution> {
    (0..data.num_scenarios())
        .map(|k| {
            match ScenarioDual::build(data, k, x).solve(oracle).unwrap() {
                DualOutcome::Optimal(sol) => sol,
                DualOutcome::Unbounded(_) => {
                    panic!("recourse is feasible for any x >= 0 in this family")
                }
            }
        })
        .collect()
}

#[test]
fn test_converges_to_extensive_form_objective() {
    let data = production();
    let oracle = SimplexOracle::default();

    let extensive = ExtensiveForm::build(&data).solve(&oracle).unwrap();
    let solution = LShaped::default().solve(&data, &oracle).unwrap();

    assert_eq!(solution.status, LShapedStatus::Converged);
    assert!(solution.cuts >= 1);
    assert!(solution.x.iter().all(|&v| v >= -1e-9));
    assert_relative_eq!(
        solution.objective,
        extensive.objective,
        max_relative = 1e-4,
        epsilon = 1e-6
    );
}

#[test]
fn test_converged_estimate_matches_expected_recourse() {
    let data = production();
    let oracle = SimplexOracle::default();
    let solution = LShaped::default().solve(&data, &oracle).unwrap();

    // At convergence theta has caught up with the true expected recourse
    // cost of the final first-stage solution.
    let value: f64 = (0..data.num_scenarios())
        .map(|k| data.probability(k) * recourse_cost(&data, k, &solution.x, &oracle))
        .sum();
    assert_abs_diff_eq!(solution.theta, value, epsilon = 1e-4);
    assert_abs_diff_eq!(solution.expected_recourse.unwrap(), value, epsilon = 1e-4);
}

#[test]
fn test_repeated_runs_are_reproducible() {
    let data = production();
    let oracle = SimplexOracle::default();

    let first = LShaped::default().solve(&data, &oracle).unwrap();
    let second = LShaped::default().solve(&data, &oracle).unwrap();

    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.cuts, second.cuts);
    for (a, b) in first.x.iter().zip(second.x.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(first.theta, second.theta, epsilon = 1e-12);
}

#[test]
fn test_optimality_cut_underestimates_expected_recourse() {
    let data = production();
    let oracle = SimplexOracle::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..4 {
        let x_bar: Vec<f64> = (0..data.num_resources())
            .map(|_| rng.gen_range(0.0..120.0))
            .collect();
        let cut = cuts::optimality_cut(&data, &solve_duals(&data, &x_bar, &oracle));

        // The frozen cut must stay below the true expected recourse cost at
        // other first-stage points, not just at the one that produced it.
        for _ in 0..4 {
            let probe: Vec<f64> = (0..data.num_resources())
                .map(|_| rng.gen_range(0.0..120.0))
                .collect();
            let bound = cut.affine_value(&probe);
            let actual: f64 = (0..data.num_scenarios())
                .map(|k| data.probability(k) * recourse_cost(&data, k, &probe, &oracle))
                .sum();
            assert!(
                bound <= actual + 1e-6,
                "cut value {} exceeds expected recourse {}",
                bound,
                actual
            );
        }
    }
}

#[test]
fn test_dual_matches_primal_recourse_cost() {
    let data = production();
    let oracle = SimplexOracle::default();
    let x_bar = [30.0, 100.0, 40.0];

    for dual in solve_duals(&data, &x_bar, &oracle) {
        let primal = recourse_cost(&data, dual.scenario, &x_bar, &oracle);
        assert_abs_diff_eq!(dual.objective, primal, epsilon = 1e-6);
    }
}

#[test]
fn test_single_scenario_matches_extensive() {
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
    let oracle = SimplexOracle::default();

    let extensive = ExtensiveForm::build(&data).solve(&oracle).unwrap();
    let solution = LShaped::default().solve(&data, &oracle).unwrap();

    assert_eq!(solution.status, LShapedStatus::Converged);
    assert_abs_diff_eq!(solution.objective, -40.0, epsilon = 1e-6);
    assert_abs_diff_eq!(extensive.objective, -40.0, epsilon = 1e-6);
}

#[test]
fn test_iteration_budget_reports_best_iterate() {
    let data = production();
    let oracle = SimplexOracle::default();

    // One iteration is never enough here: theta starts at its artificial
    // floor and needs at least one optimality cut to climb.
    let starved = LShaped::new(1, 1e-6);
    let solution = starved.solve(&data, &oracle).unwrap();
    assert_eq!(solution.status, LShapedStatus::IterationLimitReached);
    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.cuts, 1);
    assert!(solution.expected_recourse.is_some());
}
