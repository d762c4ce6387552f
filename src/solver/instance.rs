// Solver instance: keeps a generated problem in sync with the model's variables
// and writes the backend's solution back onto them

use crate::domain::{
    Column, ObjectiveFunction, OptimizationProblem, Row, Solution, SolutionStatus, SolverConfig,
    SolverError, SolverService, VariableType,
};
use crate::modeling::{
    Constraint, ConstraintId, Model, ModelError, Result, SolverHandle, SolverId, Variable,
    VariableId, VariableObserver,
};
use crate::solver::SolverFactory;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Instant;

struct Generated {
    problem: OptimizationProblem,
    variables: Vec<Variable>,
    offsets: HashMap<VariableId, usize>,
    rows: HashMap<ConstraintId, usize>,
}

/// A model bound to one numerical backend.
///
/// Created behind `Rc<RefCell<_>>` so the variables it generates columns for
/// can notify it of later changes. Several solvers may share variables; each
/// keeps its own columns.
pub struct Solver {
    id: SolverId,
    model: Model,
    backend: Box<dyn SolverService>,
    config: SolverConfig,
    generated: Option<Generated>,
    solution: Option<Solution>,
    this: Weak<RefCell<Solver>>,
}

impl Solver {
    pub fn new(model: Model, backend: Box<dyn SolverService>) -> Rc<RefCell<Self>> {
        Self::with_config(model, backend, SolverConfig::default())
    }

    pub fn with_config(
        model: Model,
        backend: Box<dyn SolverService>,
        config: SolverConfig,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                id: SolverId::next(),
                model,
                backend,
                config,
                generated: None,
                solution: None,
                this: this.clone(),
            })
        })
    }

    /// Solver using the backend named in `config`.
    pub fn from_config(model: Model, config: SolverConfig) -> Result<Rc<RefCell<Self>>> {
        let backend = SolverFactory::create_solver(&config)?;
        Ok(Self::with_config(model, backend, config))
    }

    pub fn id(&self) -> SolverId {
        self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    /// The generated problem, as the backend will see it.
    pub fn problem(&self) -> Option<&OptimizationProblem> {
        self.generated.as_ref().map(|g| &g.problem)
    }

    /// Variables in column order.
    pub fn variables(&self) -> &[Variable] {
        self.generated
            .as_ref()
            .map(|g| g.variables.as_slice())
            .unwrap_or_default()
    }

    pub fn offset_of(&self, variable: &Variable) -> Option<usize> {
        self.generated
            .as_ref()
            .and_then(|g| g.offsets.get(&variable.id()).copied())
    }

    /// Builds columns, rows and objective from the model and attaches this
    /// solver to every variable. Regenerating detaches variables the model
    /// no longer uses.
    pub fn generate(&mut self) -> Result<()> {
        if let Some(previous) = self.generated.take() {
            for variable in &previous.variables {
                variable.detach(self.id);
            }
        }

        let variables = self.model.variables();
        let offsets: HashMap<VariableId, usize> = variables
            .iter()
            .enumerate()
            .map(|(offset, variable)| (variable.id(), offset))
            .collect();
        let offset = |variable: &Variable| {
            offsets.get(&variable.id()).copied().ok_or_else(|| {
                ModelError::InvalidState(format!(
                    "variable '{}' is not part of model '{}'",
                    variable.name(),
                    self.model.name()
                ))
            })
        };

        let columns = variables
            .iter()
            .map(|variable| {
                let (lower, upper) = variable.effective_bounds();
                Column::new(variable.name(), variable.variable_type()).with_bounds(lower, upper)
            })
            .collect();

        let objective = self.model.objective();
        let assembled = objective.expression().clone().assemble();
        let mut coefficients = vec![0.0; variables.len()];
        for (variable, coefficient) in assembled.terms() {
            coefficients[offset(variable)?] += coefficient;
        }

        let mut problem = OptimizationProblem::new(
            ObjectiveFunction::new(objective.sense(), coefficients)
                .with_constant(assembled.constant()),
        )
        .with_name(self.model.name())
        .with_columns(columns)
        .with_config(self.config.clone());

        let mut rows = HashMap::new();
        for constraint in self.model.constraints() {
            let (terms, bound) = constraint.normalized();
            let terms = terms
                .iter()
                .map(|(variable, coefficient)| -> Result<(usize, f64)> {
                    Ok((offset(variable)?, *coefficient))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.insert(constraint.id(), problem.num_rows());
            problem = problem.add_row(
                Row::new(constraint.sense(), terms, bound).with_name(constraint.name()),
            );
        }

        let handle = SolverHandle::new(self.id, self.this.clone());
        for variable in &variables {
            variable.attach(handle.clone());
        }

        tracing::info!(
            component = "solver",
            operation = "generate",
            solver = %self.id,
            model = %self.model.name(),
            columns = problem.num_columns(),
            rows = problem.num_rows(),
            integer_columns = problem.num_integer_columns()
        );

        self.generated = Some(Generated {
            problem,
            variables,
            offsets,
            rows,
        });
        self.solution = None;
        Ok(())
    }

    /// Runs the backend and assigns values and reduced costs to the
    /// variables. Generates the problem first if needed.
    ///
    /// Infeasible or unbounded outcomes are returned as a status, not an
    /// error, and leave the variables' previous assignment untouched. The
    /// previous solution is discarded even when this solve fails.
    pub fn solve(&mut self) -> Result<SolutionStatus> {
        self.solution = None;
        if self.generated.is_none() {
            self.generate()?;
        }
        let generated = self
            .generated
            .as_ref()
            .ok_or_else(|| ModelError::InvalidState("problem was not generated".to_string()))?;
        let problem = &generated.problem;

        if problem.is_mixed_integer() && !self.backend.supports_mip() {
            return Err(SolverError::InvalidProblem(format!(
                "backend {} cannot solve integer variables",
                self.backend.name()
            ))
            .into());
        }

        tracing::info!(
            component = "solver",
            operation = "solve",
            status = "start",
            solver = %self.id,
            backend = self.backend.name(),
            columns = problem.num_columns(),
            rows = problem.num_rows()
        );
        let started = Instant::now();
        let solution = self.backend.solve(problem)?;

        if solution.is_feasible() {
            if solution.variable_values.len() != generated.variables.len() {
                return Err(SolverError::ExecutionFailed(format!(
                    "backend {} returned {} values for {} columns",
                    self.backend.name(),
                    solution.variable_values.len(),
                    generated.variables.len()
                ))
                .into());
            }
            for (offset, variable) in generated.variables.iter().enumerate() {
                variable.assign(
                    self.id,
                    offset,
                    solution.variable_values[offset],
                    solution.reduced_cost_at(offset),
                );
            }
        }

        tracing::info!(
            component = "solver",
            operation = "solve",
            status = %solution.status,
            solver = %self.id,
            objective = solution.optimal_value,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "{}",
            solution.message
        );

        let status = solution.status;
        self.solution = Some(solution);
        Ok(status)
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn is_proven_optimal(&self) -> bool {
        self.solution.as_ref().is_some_and(Solution::is_optimal)
    }

    pub fn objective_value(&self) -> Result<f64> {
        self.solved()?.optimal_value.ok_or_else(|| {
            ModelError::InvalidState(format!(
                "solver {} found no solution for model '{}'",
                self.id,
                self.model.name()
            ))
        })
    }

    /// Shadow price of a model constraint in the last solution.
    pub fn constraint_dual(&self, constraint: &Constraint) -> Result<f64> {
        let row = self.row_of(constraint)?;
        Ok(self.solved()?.dual_at(row))
    }

    /// Left-hand side of a model constraint, constants moved right, at the
    /// last solution.
    pub fn constraint_activity(&self, constraint: &Constraint) -> Result<f64> {
        let row = self.row_of(constraint)?;
        let solution = self.solved()?;
        let generated = self.generated()?;
        Ok(generated.problem.rows[row].activity(&solution.variable_values))
    }

    fn generated(&self) -> Result<&Generated> {
        self.generated.as_ref().ok_or_else(|| {
            ModelError::InvalidState(format!("solver {} has not generated its problem", self.id))
        })
    }

    fn solved(&self) -> Result<&Solution> {
        self.solution
            .as_ref()
            .filter(|s| s.is_feasible())
            .ok_or_else(|| {
                ModelError::InvalidState(format!(
                    "solver {} has no solution for model '{}'",
                    self.id,
                    self.model.name()
                ))
            })
    }

    fn row_of(&self, constraint: &Constraint) -> Result<usize> {
        self.generated()?
            .rows
            .get(&constraint.id())
            .copied()
            .ok_or_else(|| {
                ModelError::InvalidArgument(format!(
                    "constraint '{}' is not part of model '{}'",
                    constraint.name(),
                    self.model.name()
                ))
            })
    }

    fn column_mut(&mut self, variable: &Variable, operation: &'static str) -> Option<&mut Column> {
        let column = self.generated.as_mut().and_then(|g| {
            let offset = *g.offsets.get(&variable.id())?;
            g.problem.columns.get_mut(offset)
        });
        if column.is_none() {
            tracing::debug!(
                component = "solver",
                operation,
                solver = %self.id,
                variable = %variable.name(),
                "variable has no column in this solver"
            );
        }
        column
    }
}

impl VariableObserver for Solver {
    fn set_variable_upper(&mut self, variable: &Variable, upper: f64) -> Result<()> {
        if let Some(column) = self.column_mut(variable, "set_variable_upper") {
            column.upper_bound = upper;
        }
        Ok(())
    }

    fn set_variable_lower(&mut self, variable: &Variable, lower: f64) -> Result<()> {
        if let Some(column) = self.column_mut(variable, "set_variable_lower") {
            column.lower_bound = lower;
        }
        Ok(())
    }

    fn set_variable_bounds(&mut self, variable: &Variable, lower: f64, upper: f64) -> Result<()> {
        if let Some(column) = self.column_mut(variable, "set_variable_bounds") {
            column.lower_bound = lower;
            column.upper_bound = upper;
        }
        Ok(())
    }

    fn set_variable_type(
        &mut self,
        variable: &Variable,
        variable_type: VariableType,
    ) -> Result<()> {
        if let Some(column) = self.column_mut(variable, "set_variable_type") {
            column.variable_type = variable_type;
        }
        Ok(())
    }

    fn set_variable_name(&mut self, variable: &Variable, name: &str) -> Result<()> {
        if let Some(column) = self.column_mut(variable, "set_variable_name") {
            column.name = name.to_string();
        }
        Ok(())
    }
}

impl Drop for Solver {
    fn drop(&mut self) {
        if let Some(generated) = &self.generated {
            for variable in &generated.variables {
                variable.detach(self.id);
            }
        }
    }
}
