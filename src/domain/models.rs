use super::value_objects::{
    ConstraintType, OptimizationType, SolutionStatus, SolverBackend, VariableType,
};

/// Column of a generated problem, one per modeling variable
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Column {
    pub fn new(name: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            name: name.into(),
            variable_type,
            lower_bound: 0.0,
            upper_bound: f64::INFINITY,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type == VariableType::Integer
    }
}

/// Objective function to minimize or maximize, dense over the columns
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub coefficients: Vec<f64>,
    pub constant: f64,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, coefficients: Vec<f64>) -> Self {
        Self {
            optimization_type,
            coefficients,
            constant: 0.0,
        }
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Objective value at the given column values, constant included
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.constant
    }
}

/// Linear row `sum(coef * column) <type> bound`, sparse over column offsets
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub constraint_type: ConstraintType,
    pub terms: Vec<(usize, f64)>,
    pub bound: f64,
    pub name: String,
}

impl Row {
    pub fn new(constraint_type: ConstraintType, terms: Vec<(usize, f64)>, bound: f64) -> Self {
        Self {
            constraint_type,
            terms,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Left-hand side at the given column values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(offset, coef)| coef * values.get(offset).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let activity = self.activity(values);
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => activity <= self.bound + tolerance,
            ConstraintType::Equal => (activity - self.bound).abs() <= tolerance,
            ConstraintType::GreaterThanOrEqual => activity >= self.bound - tolerance,
        }
    }
}

/// Configuration for the solver
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which branch-and-bound stops
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = Some(gap);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

/// Complete, solver-agnostic optimization problem handed to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            objective,
            columns: Vec::new(),
            rows: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn add_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_integer_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_integer()).count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_columns() > 0
    }

    /// Status for a solve the backend finished normally. A mixed-integer
    /// search stopped by a gap tolerance is only proven within that gap.
    pub fn finished_status(&self) -> SolutionStatus {
        match self.solver_config.gap_tolerance {
            Some(gap) if gap > 0.0 && self.is_mixed_integer() => SolutionStatus::Feasible,
            _ => SolutionStatus::Optimal,
        }
    }

    /// Whether `values` respects every column bound, integrality and row.
    pub fn accepts(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.num_columns()
            && self.columns.iter().zip(values).all(|(column, &value)| {
                value >= column.lower_bound - tolerance
                    && value <= column.upper_bound + tolerance
                    && (!column.is_integer() || (value - value.round()).abs() <= tolerance)
            })
            && self.rows.iter().all(|row| row.is_satisfied(values, tolerance))
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: problem.num_columns() as u32,
            num_constraints: problem.num_rows() as u32,
            num_integer_vars: problem.num_integer_columns() as u32,
        }
    }
}

/// Solution to an optimization problem, indexed by column and row offsets
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    /// Column duals; zeros when the backend does not report them
    pub reduced_costs: Vec<f64>,
    /// Row duals; zeros when the backend does not report them
    pub dual_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            reduced_costs: Vec::new(),
            dual_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self::found(SolutionStatus::Optimal, value, variable_values)
    }

    /// Solution carrying column values, with whatever status the backend
    /// stopped on.
    pub fn found(status: SolutionStatus, value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status,
            optimal_value: Some(value),
            variable_values,
            reduced_costs: Vec::new(),
            dual_values: Vec::new(),
            message: format!("{status} solution found"),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_reduced_costs(mut self, reduced_costs: Vec<f64>) -> Self {
        self.reduced_costs = reduced_costs;
        self
    }

    pub fn with_dual_values(mut self, dual_values: Vec<f64>) -> Self {
        self.dual_values = dual_values;
        self
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Whether there are column values to assign. A time-limited solve
    /// qualifies only when it kept an incumbent.
    pub fn is_feasible(&self) -> bool {
        match self.status {
            SolutionStatus::TimeLimit => !self.variable_values.is_empty(),
            status => status.has_solution(),
        }
    }

    pub fn reduced_cost_at(&self, offset: usize) -> f64 {
        self.reduced_costs.get(offset).copied().unwrap_or(0.0)
    }

    pub fn dual_at(&self, row: usize) -> f64 {
        self.dual_values.get(row).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn objective_includes_constant() {
        let objective =
            ObjectiveFunction::new(OptimizationType::Minimize, vec![2.0, 3.0]).with_constant(1.5);
        assert_relative_eq!(objective.evaluate(&[1.0, 2.0]), 9.5);
    }

    #[test]
    fn row_activity_ignores_missing_columns() {
        let row = Row::new(ConstraintType::LessThanOrEqual, vec![(0, 2.0), (5, 4.0)], 10.0);
        assert_relative_eq!(row.activity(&[3.0]), 6.0);
    }

    #[test]
    fn problem_counts_integer_columns() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![1.0, 1.0],
        ))
        .with_columns(vec![
            Column::new("x", VariableType::Integer).with_bounds(0.0, 4.0),
            Column::new("y", VariableType::Continuous),
        ]);

        assert_eq!(problem.num_columns(), 2);
        assert_eq!(problem.num_integer_columns(), 1);
        assert!(problem.is_mixed_integer());
    }

    #[test]
    fn missing_duals_read_as_zero() {
        let solution = Solution::optimal(4.0, vec![1.0, 2.0]);
        assert_eq!(solution.reduced_cost_at(1), 0.0);
        assert_eq!(solution.dual_at(0), 0.0);
    }

    #[test]
    fn time_limit_counts_as_feasible_only_with_an_incumbent() {
        let empty = Solution::new(SolutionStatus::TimeLimit, "stopped");
        assert!(!empty.is_feasible());

        let incumbent = Solution::found(SolutionStatus::TimeLimit, 3.0, vec![1.0]);
        assert!(incumbent.is_feasible());
        assert!(!incumbent.is_optimal());
        assert_eq!(incumbent.optimal_value, Some(3.0));
    }

    fn knapsack(gap_tolerance: Option<f64>) -> OptimizationProblem {
        let config = SolverConfig {
            gap_tolerance,
            ..SolverConfig::default()
        };
        OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![5.0, 4.0],
        ))
        .with_columns(vec![
            Column::new("a", VariableType::Integer).with_bounds(0.0, 1.0),
            Column::new("b", VariableType::Continuous).with_bounds(0.0, 2.0),
        ])
        .add_row(Row::new(
            ConstraintType::LessThanOrEqual,
            vec![(0, 3.0), (1, 2.0)],
            5.0,
        ))
        .add_row(Row::new(ConstraintType::Equal, vec![(1, 1.0)], 1.0))
        .with_config(config)
    }

    #[test]
    fn gap_tolerance_downgrades_mixed_integer_results() {
        assert_eq!(knapsack(None).finished_status(), SolutionStatus::Optimal);
        assert_eq!(knapsack(Some(0.0)).finished_status(), SolutionStatus::Optimal);
        assert_eq!(knapsack(Some(0.05)).finished_status(), SolutionStatus::Feasible);

        let mut continuous = knapsack(Some(0.05));
        continuous.columns[0].variable_type = VariableType::Continuous;
        assert_eq!(continuous.finished_status(), SolutionStatus::Optimal);
    }

    #[test]
    fn accepts_checks_bounds_integrality_and_rows() {
        let problem = knapsack(None);
        assert!(problem.accepts(&[1.0, 1.0], 1e-6));
        assert!(!problem.accepts(&[0.5, 1.0], 1e-6));
        assert!(!problem.accepts(&[1.0, 1.5], 1e-6));
        assert!(!problem.accepts(&[0.0, 3.0], 1e-6));
        assert!(!problem.accepts(&[1.0], 1e-6));
        assert!(!problem.accepts(&[0.0, 0.0], 1e-6));
    }

    #[test]
    fn config_builders_compose() {
        let config = SolverConfig::default()
            .with_backend(SolverBackend::CoinCbc)
            .with_time_limit(30.0)
            .with_gap_tolerance(0.01)
            .with_verbose(true);

        assert_eq!(config.backend, SolverBackend::CoinCbc);
        assert_eq!(config.time_limit, Some(30.0));
        assert_eq!(config.gap_tolerance, Some(0.01));
        assert!(config.verbose);
    }
}
