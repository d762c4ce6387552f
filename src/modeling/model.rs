// Model: one objective and its constraints
// Variables are collected from the expressions, never added explicitly

use super::constraint::Constraint;
use super::objective::Objective;
use super::variable::Variable;
use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Debug, Default)]
pub struct Model {
    name: String,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Every variable the objective and constraints use, without repeats,
    /// objective first and then constraints in the order they were added.
    pub fn variables(&self) -> Vec<Variable> {
        let mut seen = HashSet::new();
        let candidates = self
            .objective
            .expression()
            .variables()
            .into_iter()
            .chain(self.constraints.iter().flat_map(Constraint::variables));

        candidates
            .filter(|variable| seen.insert(variable.id()))
            .collect()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.variables().iter().any(Variable::is_integer)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model '{}'", self.name)?;
        writeln!(f, "{}", self.objective)?;
        writeln!(f, "Subject to:")?;
        for constraint in &self.constraints {
            writeln!(f, "  {constraint}")?;
        }
        writeln!(f, "Variables:")?;
        for variable in self.variables() {
            writeln!(f, "  {variable}")?;
        }
        Ok(())
    }
}
