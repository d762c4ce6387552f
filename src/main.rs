// Knapsack demo: build a 0/1 model, solve it, then pin one item and re-solve
//
// Item   | Weight (kg) | Value ($)
// -------|-------------|----------
// Tent   |     7       |   150
// Stove  |     3       |    90
// Food   |     4       |   120
// Water  |     5       |   100
// Camera |     2       |    80
//
// Run with `--features cbc` (or `highs`); RUST_LOG=sonnet=debug shows the
// bound updates flowing to the solver.

use sonnet::{
    Expression, Model, Objective, Solver, SolverConfig, Variable, VariableType,
};
use tracing_subscriber::EnvFilter;

const ITEMS: [(&str, f64, f64); 5] = [
    ("Tent", 7.0, 150.0),
    ("Stove", 3.0, 90.0),
    ("Food", 4.0, 120.0),
    ("Water", 5.0, 100.0),
    ("Camera", 2.0, 80.0),
];

const CAPACITY: f64 = 15.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let take = Variable::new_map(
        ITEMS.iter().map(|(name, _, _)| *name),
        "take",
        0.0,
        1.0,
        VariableType::Integer,
    );

    let mut value = Expression::new();
    let mut weight = Expression::new();
    for (name, kg, dollars) in ITEMS {
        value = value.plus(take[name].times(dollars));
        weight = weight.plus(take[name].times(kg));
    }

    let model = Model::new("knapsack")
        .with_objective(Objective::maximize(value))
        .add_constraint(weight.less_equal(CAPACITY).with_name("capacity"));

    let solver = Solver::from_config(model, SolverConfig::default())?;
    println!("=== Knapsack ({}) ===\n", solver.borrow().backend_name());

    let status = solver.borrow_mut().solve()?;
    println!("Status: {status}");
    report(&solver.borrow())?;

    // Keep the current camera decision whatever happens to its bounds, and
    // forbid the tent.
    let camera = &take["Camera"];
    camera.freeze()?;
    take["Tent"].set_upper(0.0)?;

    let status = solver.borrow_mut().solve()?;
    println!("\nWithout the tent, camera pinned: {status}");
    report(&solver.borrow())?;

    camera.unfreeze()?;
    Ok(())
}

fn report(solver: &Solver) -> Result<(), Box<dyn std::error::Error>> {
    for variable in solver.variables() {
        println!("  {}", variable.to_level_string());
    }
    println!("  Total value: ${:.0}", solver.objective_value()?);
    Ok(())
}
