use lshaped::lp::SimplexOracle;
use lshaped::stochastic::{ExtensiveForm, LShaped, ProblemData, Scenario};

/// Resource acquisition for a two-product plant under three demand
/// scenarios, solved both ways for comparison.
fn production() -> lshaped::Result<ProblemData> {
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
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data = production()?;
    let oracle = SimplexOracle::default();

    let extensive = ExtensiveForm::build(&data).solve(&oracle)?;
    let solution = LShaped::default().solve(&data, &oracle)?;

    println!("Extensive: {}", extensive.objective);
    println!("Two-stage: {}", solution.objective);
    println!(
        "Converged in {} iterations with {} cuts",
        solution.iterations, solution.cuts
    );
    for (j, &amount) in solution.x.iter().enumerate() {
        println!("  acquire {:.4} of {}", amount, data.resource_name(j));
    }
    Ok(())
}
