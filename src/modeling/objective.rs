use super::error::Result;
use super::expression::Expression;
use crate::domain::OptimizationType;
use std::fmt;

/// Expression to minimize or maximize.
#[derive(Clone, Debug, Default)]
pub struct Objective {
    sense: OptimizationType,
    expression: Expression,
}

impl Objective {
    pub fn new(sense: OptimizationType, expression: impl Into<Expression>) -> Self {
        Self {
            sense,
            expression: expression.into(),
        }
    }

    pub fn minimize(expression: impl Into<Expression>) -> Self {
        Self::new(OptimizationType::Minimize, expression)
    }

    pub fn maximize(expression: impl Into<Expression>) -> Self {
        Self::new(OptimizationType::Maximize, expression)
    }

    pub fn sense(&self) -> OptimizationType {
        self.sense
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn value(&self) -> Result<f64> {
        self.expression.value()
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sense, self.expression)
    }
}
