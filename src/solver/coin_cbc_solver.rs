// COIN-OR CBC adapter
// Translates a generated problem into good_lp's model and runs it through CBC

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, VariableType,
    },
};
use good_lp::{
    solvers::coin_cbc, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();

        let mut vars = variables!();
        let lp_variables: Vec<GoodLpVariable> = problem
            .columns
            .iter()
            .map(|column| {
                let definition = variable()
                    .name(column.name.clone())
                    .min(column.lower_bound)
                    .max(column.upper_bound);
                match column.variable_type {
                    VariableType::Integer => vars.add(definition.integer()),
                    VariableType::Continuous => vars.add(definition),
                }
            })
            .collect();

        // good_lp minimises, so negate for maximization
        let is_maximize = problem.objective.optimization_type == OptimizationType::Maximize;
        let mut obj_expr: Expression = 0.into();
        for (i, &coeff) in problem.objective.coefficients.iter().enumerate() {
            if coeff != 0.0 {
                let c = if is_maximize { -coeff } else { coeff };
                obj_expr += c * lp_variables[i];
            }
        }

        let mut lp_model = vars.minimise(obj_expr).using(coin_cbc::coin_cbc);

        let config = &problem.solver_config;
        if let Some(seconds) = config.time_limit {
            lp_model.set_parameter("sec", &seconds.to_string());
        }
        if let Some(gap) = config.gap_tolerance {
            lp_model.set_parameter("ratioGap", &gap.to_string());
        }
        lp_model.set_parameter("log", if config.verbose { "1" } else { "0" });

        for row in &problem.rows {
            let mut lhs: Expression = 0.into();
            for &(offset, coeff) in &row.terms {
                lhs += coeff * lp_variables[offset];
            }

            lp_model = match row.constraint_type {
                ConstraintType::LessThanOrEqual => lp_model.with(lhs.leq(row.bound)),
                ConstraintType::Equal => lp_model.with(lhs.eq(row.bound)),
                ConstraintType::GreaterThanOrEqual => lp_model.with(lhs.geq(row.bound)),
            };
        }

        let solution_result = lp_model.solve();
        let statistics = SolverStatistics::for_problem(
            problem,
            start_time.elapsed().as_secs_f64() * 1000.0,
        );

        match solution_result {
            Ok(sol) => {
                let variable_values: Vec<f64> =
                    lp_variables.iter().map(|&var| sol.value(var)).collect();
                let objective_value = problem.objective.evaluate(&variable_values);
                let status = problem.finished_status();

                // CBC through good_lp reports no duals; zeros stand in for them
                let mut solution = DomainSolution::found(status, objective_value, variable_values)
                    .with_reduced_costs(vec![0.0; problem.num_columns()])
                    .with_dual_values(vec![0.0; problem.num_rows()])
                    .with_statistics(statistics);
                solution.message = format!("{status} solution found for '{}'", problem.name);

                Ok(solution)
            }
            // good_lp drops CBC's incumbent when a limit stops the search
            Err(ResolutionError::Other("Stopped")) => Ok(DomainSolution::new(
                DomainSolutionStatus::TimeLimit,
                "CBC stopped at its limit; no solution was returned",
            )
            .with_statistics(statistics)),
            Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
                DomainSolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            )
            .with_statistics(statistics)),
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
