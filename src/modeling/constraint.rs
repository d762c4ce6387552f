// Linear constraints built from expressions
// Named Con_<id> unless given a name

use super::entity::{ConstraintId, ModelEntity};
use super::error::Result;
use super::expression::Expression;
use super::math::compare_to_eps;
use super::variable::Variable;
use crate::domain::ConstraintType;
use std::cmp::Ordering;
use std::fmt;

/// `lhs <sense> rhs`, named `Con_<id>` unless given a name.
#[derive(Clone)]
pub struct Constraint {
    entity: ModelEntity<ConstraintId>,
    lhs: Expression,
    sense: ConstraintType,
    rhs: Expression,
}

impl Constraint {
    pub fn new(lhs: Expression, sense: ConstraintType, rhs: Expression) -> Self {
        let id = ConstraintId::next();
        Self {
            entity: ModelEntity::new(id, format!("Con_{id}")),
            lhs,
            sense,
            rhs,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.entity.set_name(name);
        self
    }

    pub fn id(&self) -> ConstraintId {
        self.entity.id()
    }

    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn sense(&self) -> ConstraintType {
        self.sense
    }

    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }

    /// Moves every variable left and every constant right:
    /// `sum(coefficient * variable) <sense> bound`.
    pub fn normalized(&self) -> (Vec<(Variable, f64)>, f64) {
        let difference = self.lhs.clone().minus(self.rhs.clone()).assemble();
        let bound = -difference.constant();
        (difference.terms().to_vec(), bound)
    }

    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = self.lhs.variables();
        for variable in self.rhs.variables() {
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        variables
    }

    /// Whether the current variable values satisfy this constraint, within
    /// tolerance.
    pub fn is_satisfied(&self) -> Result<bool> {
        let lhs = self.lhs.value()?;
        let rhs = self.rhs.value()?;
        let ordering = compare_to_eps(lhs, rhs);
        Ok(match self.sense {
            ConstraintType::LessThanOrEqual => ordering != Ordering::Greater,
            ConstraintType::GreaterThanOrEqual => ordering != Ordering::Less,
            ConstraintType::Equal => ordering == Ordering::Equal,
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} {} {}", self.name(), self.lhs, self.sense, self.rhs)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constraint({self})")
    }
}
