// Linear expressions over variables
// A constant plus (variable, coefficient) terms, merged on assembly

use super::constraint::Constraint;
use super::entity::VariableId;
use super::error::{ModelError, Result};
use super::math::approx_eq;
use super::variable::Variable;
use crate::domain::ConstraintType;
use std::collections::HashMap;
use std::fmt;

/// `constant + sum(coefficient * variable)`.
///
/// Terms keep the order they were added in; the same variable may appear more
/// than once until [`Expression::assemble`] merges it.
#[derive(Clone, Default)]
pub struct Expression {
    constant: f64,
    terms: Vec<(Variable, f64)>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            terms: Vec::new(),
        }
    }

    /// Single term `coefficient * variable`.
    pub fn term(coefficient: f64, variable: &Variable) -> Self {
        Self {
            constant: 0.0,
            terms: vec![(variable.clone(), coefficient)],
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    // ── Builders ────────────────────────────────────────────

    pub fn plus(mut self, rhs: impl Into<Expression>) -> Self {
        let rhs = rhs.into();
        self.constant += rhs.constant;
        self.terms.extend(rhs.terms);
        self
    }

    pub fn minus(self, rhs: impl Into<Expression>) -> Self {
        self.plus(rhs.into().negate())
    }

    pub fn times(mut self, factor: f64) -> Self {
        self.constant *= factor;
        for (_, coefficient) in &mut self.terms {
            *coefficient *= factor;
        }
        self
    }

    pub fn divided_by(self, divisor: f64) -> Result<Self> {
        if divisor == 0.0 {
            return Err(ModelError::InvalidArgument(format!(
                "cannot divide expression '{self}' by zero"
            )));
        }
        Ok(self.times(1.0 / divisor))
    }

    pub fn negate(self) -> Self {
        self.times(-1.0)
    }

    /// Merges repeated variables into one term and drops zero coefficients.
    pub fn assemble(self) -> Self {
        let mut positions: HashMap<VariableId, usize> = HashMap::new();
        let mut merged: Vec<(Variable, f64)> = Vec::with_capacity(self.terms.len());

        for (variable, coefficient) in self.terms {
            match positions.get(&variable.id()) {
                Some(&at) => merged[at].1 += coefficient,
                None => {
                    positions.insert(variable.id(), merged.len());
                    merged.push((variable, coefficient));
                }
            }
        }
        merged.retain(|&(_, coefficient)| !approx_eq(coefficient, 0.0));

        Self {
            constant: self.constant,
            terms: merged,
        }
    }

    /// Distinct variables in order of first appearance.
    pub fn variables(&self) -> Vec<Variable> {
        let mut seen = Vec::new();
        let mut variables = Vec::new();
        for (variable, _) in &self.terms {
            let id = variable.id();
            if !seen.contains(&id) {
                seen.push(id);
                variables.push(variable.clone());
            }
        }
        variables
    }

    /// Value at the variables' current solution.
    pub fn value(&self) -> Result<f64> {
        self.terms
            .iter()
            .try_fold(self.constant, |sum, (variable, coefficient)| {
                Ok(sum + coefficient * variable.value()?)
            })
    }

    // ── Comparisons ─────────────────────────────────────────

    pub fn less_equal(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self, ConstraintType::LessThanOrEqual, rhs.into())
    }

    pub fn greater_equal(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self, ConstraintType::GreaterThanOrEqual, rhs.into())
    }

    pub fn equal(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self, ConstraintType::Equal, rhs.into())
    }

    /// Always fails: there is no linear "not equal" constraint.
    pub fn not_equal(self, rhs: impl Into<Expression>) -> Result<Constraint> {
        Err(ModelError::Unsupported(format!(
            "cannot use != between '{}' and '{}': linear models have no not-equal constraint",
            self,
            rhs.into()
        )))
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Self::from_constant(constant)
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Self::term(1.0, variable)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Self {
            constant: 0.0,
            terms: vec![(variable, 1.0)],
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (variable, coefficient) in &self.terms {
            let name = variable.name();
            match (first, *coefficient) {
                (true, c) if c == 1.0 => write!(f, "{name}")?,
                (true, c) if c == -1.0 => write!(f, "-{name}")?,
                (true, c) => write!(f, "{c} {name}")?,
                (false, c) if c == 1.0 => write!(f, " + {name}")?,
                (false, c) if c == -1.0 => write!(f, " - {name}")?,
                (false, c) if c < 0.0 => write!(f, " - {} {name}", -c)?,
                (false, c) => write!(f, " + {c} {name}")?,
            }
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({self})")
    }
}
