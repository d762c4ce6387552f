// Backend interface for solving a generated optimization problem
// Any numerical engine (CBC, HiGHS, a test double) plugs in behind this trait

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver backends
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Contract every numerical backend follows.
///
/// The modeling layer never runs an algorithm itself; it hands a flat
/// [`OptimizationProblem`] to a `SolverService` and maps the returned
/// [`Solution`] back onto its variables by column offset.
pub trait SolverService {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();

        let num_columns = problem.num_columns();

        if problem.objective.coefficients.len() != num_columns {
            errors.push(format!(
                "Objective has {} coefficients but problem has {} columns",
                problem.objective.coefficients.len(),
                num_columns
            ));
        }

        for (i, row) in problem.rows.iter().enumerate() {
            if let Some(&(offset, _)) = row.terms.iter().find(|(offset, _)| *offset >= num_columns) {
                errors.push(format!(
                    "Row {} '{}' references column {} but problem has {} columns",
                    i, row.name, offset, num_columns
                ));
            }
            if row.bound.is_nan() {
                errors.push(format!("Row {} '{}' has a NaN bound", i, row.name));
            }
        }

        for (i, column) in problem.columns.iter().enumerate() {
            if column.lower_bound > column.upper_bound {
                errors.push(format!(
                    "Column {} '{}' has lower bound ({}) > upper bound ({})",
                    i, column.name, column.lower_bound, column.upper_bound
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;
}
