#![allow(dead_code)]

use sonnet::domain::{OptimizationProblem, Solution, SolutionStatus, SolverError, SolverService};
use sonnet::modeling::{ModelError, SolverHandle, SolverId, Variable, VariableObserver};
use sonnet::VariableType;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Upper(f64),
    Lower(f64),
    Bounds(f64, f64),
    Type(VariableType),
    Name(String),
}

/// Shared, ordered record of `(observer label, notification)` pairs.
pub type Log = Rc<RefCell<Vec<(String, Notification)>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Observer that records every notification it receives.
pub struct RecordingObserver {
    pub id: SolverId,
    label: String,
    log: Log,
    pub fail: bool,
}

impl RecordingObserver {
    fn record(&mut self, notification: Notification) -> Result<(), ModelError> {
        if self.fail {
            return Err(ModelError::InvalidState(format!("{} refused", self.label)));
        }
        self.log
            .borrow_mut()
            .push((self.label.clone(), notification));
        Ok(())
    }
}

impl VariableObserver for RecordingObserver {
    fn set_variable_upper(&mut self, _variable: &Variable, upper: f64) -> Result<(), ModelError> {
        self.record(Notification::Upper(upper))
    }

    fn set_variable_lower(&mut self, _variable: &Variable, lower: f64) -> Result<(), ModelError> {
        self.record(Notification::Lower(lower))
    }

    fn set_variable_bounds(
        &mut self,
        _variable: &Variable,
        lower: f64,
        upper: f64,
    ) -> Result<(), ModelError> {
        self.record(Notification::Bounds(lower, upper))
    }

    fn set_variable_type(
        &mut self,
        _variable: &Variable,
        variable_type: VariableType,
    ) -> Result<(), ModelError> {
        self.record(Notification::Type(variable_type))
    }

    fn set_variable_name(&mut self, variable: &Variable, name: &str) -> Result<(), ModelError> {
        // The variable already carries the new name while observers run.
        assert_eq!(variable.name(), name);
        self.record(Notification::Name(name.to_string()))
    }
}

/// Creates a recording observer and attaches it to `variable`.
pub fn attach_recorder(
    variable: &Variable,
    label: &str,
    log: &Log,
) -> Rc<RefCell<RecordingObserver>> {
    let id = SolverId::next();
    let observer = Rc::new(RefCell::new(RecordingObserver {
        id,
        label: label.to_string(),
        log: Rc::clone(log),
        fail: false,
    }));
    variable.attach(SolverHandle::from_rc(id, &observer));
    observer
}

pub fn notifications(log: &Log) -> Vec<(String, Notification)> {
    log.borrow().clone()
}

/// Backend that answers with fixed values per column name and keeps a copy
/// of every problem it was asked to solve.
pub struct ScriptedBackend {
    status: SolutionStatus,
    values: HashMap<String, f64>,
    reduced_costs: HashMap<String, f64>,
    row_duals: Vec<f64>,
    supports_mip: bool,
    pub seen: Rc<RefCell<Vec<OptimizationProblem>>>,
}

impl ScriptedBackend {
    pub fn optimal(values: &[(&str, f64)]) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values: values.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            reduced_costs: HashMap::new(),
            row_duals: Vec::new(),
            supports_mip: true,
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_status(status: SolutionStatus) -> Self {
        Self {
            status,
            ..Self::optimal(&[])
        }
    }

    /// Stopped by a time limit, keeping the given incumbent.
    pub fn time_limited(values: &[(&str, f64)]) -> Self {
        Self {
            status: SolutionStatus::TimeLimit,
            ..Self::optimal(values)
        }
    }

    pub fn with_reduced_costs(mut self, reduced_costs: &[(&str, f64)]) -> Self {
        self.reduced_costs = reduced_costs
            .iter()
            .map(|(n, v)| (n.to_string(), *v))
            .collect();
        self
    }

    pub fn with_row_duals(mut self, duals: Vec<f64>) -> Self {
        self.row_duals = duals;
        self
    }

    pub fn without_mip(mut self) -> Self {
        self.supports_mip = false;
        self
    }
}

impl SolverService for ScriptedBackend {
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution, SolverError> {
        self.validate(problem)?;
        self.seen.borrow_mut().push(problem.clone());

        let keeps_incumbent = self.status == SolutionStatus::TimeLimit && !self.values.is_empty();
        if !self.status.has_solution() && !keeps_incumbent {
            return Ok(Solution::new(self.status, "scripted failure"));
        }

        let lookup = |table: &HashMap<String, f64>| -> Vec<f64> {
            problem
                .columns
                .iter()
                .map(|c| table.get(&c.name).copied().unwrap_or(0.0))
                .collect()
        };
        let values = lookup(&self.values);
        let objective = problem.objective.evaluate(&values);

        Ok(Solution::found(self.status, objective, values)
            .with_reduced_costs(lookup(&self.reduced_costs))
            .with_dual_values(self.row_duals.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_mip(&self) -> bool {
        self.supports_mip
    }
}
