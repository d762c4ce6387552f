// HiGHS adapter
// Translates a generated problem into a HiGHS row problem; reports duals too

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, VariableType,
    },
};
use highs::{HighsModelStatus, RowProblem, Sense, SolvedModel};
use std::time::Instant;

// Tolerance for accepting an incumbent left behind by a time limit
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();

        // Add columns first, then rows
        let mut pb = RowProblem::default();
        let cols: Vec<_> = problem
            .columns
            .iter()
            .zip(&problem.objective.coefficients)
            .map(|(column, &obj_coeff)| {
                let bounds = column.lower_bound..=column.upper_bound;
                match column.variable_type {
                    VariableType::Integer => pb.add_integer_column(obj_coeff, bounds),
                    VariableType::Continuous => pb.add_column(obj_coeff, bounds),
                }
            })
            .collect();

        for row in &problem.rows {
            let terms: Vec<_> = row
                .terms
                .iter()
                .map(|&(offset, coeff)| (cols[offset], coeff))
                .collect();

            match row.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=row.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(row.bound..=row.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(row.bound.., &terms);
                }
            }
        }

        let sense = if problem.objective.optimization_type == OptimizationType::Maximize {
            Sense::Maximise
        } else {
            Sense::Minimise
        };

        let mut model = pb.optimise(sense);
        let config = &problem.solver_config;
        model.set_option("output_flag", config.verbose);
        if let Some(seconds) = config.time_limit {
            model.set_option("time_limit", seconds);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        let statistics = SolverStatistics::for_problem(
            problem,
            start_time.elapsed().as_secs_f64() * 1000.0,
        );

        match solved.status() {
            HighsModelStatus::Optimal => {
                let status = problem.finished_status();
                let mut solution =
                    read_solution(problem, &solved, status).with_statistics(statistics);
                solution.message = format!("{status} solution found for '{}'", problem.name);

                Ok(solution)
            }
            HighsModelStatus::ReachedTimeLimit => {
                let incumbent = read_solution(problem, &solved, DomainSolutionStatus::TimeLimit);
                let solution = if problem.accepts(&incumbent.variable_values, FEASIBILITY_TOLERANCE)
                {
                    incumbent
                } else {
                    DomainSolution::new(
                        DomainSolutionStatus::TimeLimit,
                        "HiGHS reached its time limit without a feasible solution",
                    )
                };
                Ok(solution.with_statistics(statistics))
            }
            HighsModelStatus::Infeasible => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(DomainSolution::new(
                    DomainSolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

fn read_solution(
    problem: &OptimizationProblem,
    solved: &SolvedModel,
    status: DomainSolutionStatus,
) -> DomainSolution {
    let solution_data = solved.get_solution();
    let variable_values = solution_data.columns().to_vec();
    let objective_value = problem.objective.evaluate(&variable_values);

    DomainSolution::found(status, objective_value, variable_values)
        .with_reduced_costs(solution_data.dual_columns().to_vec())
        .with_dual_values(solution_data.dual_rows().to_vec())
}
