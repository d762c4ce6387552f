// Decision variables and their synchronization with attached solvers
// Every clone of a Variable shares one state; changes reach attached solvers in order

use super::constraint::Constraint;
use super::entity::{Assignment, ModelEntity, SolverId, VariableId};
use super::error::{ModelError, Result};
use super::expression::Expression;
use super::math::{approx_eq, is_between, is_integer};
use super::observer::{SolverHandle, VariableObserver};
use crate::domain::VariableType;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Reference-counted bound pinning.
///
/// Only the `Unfrozen -> Frozen(1)` and `Frozen(1) -> Unfrozen` transitions
/// touch the solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreezeState {
    #[default]
    Unfrozen,
    Frozen(u32),
}

impl FreezeState {
    fn frozen(self) -> Self {
        match self {
            FreezeState::Unfrozen => FreezeState::Frozen(1),
            FreezeState::Frozen(n) => FreezeState::Frozen(n + 1),
        }
    }

    fn thawed(self) -> Self {
        match self {
            FreezeState::Unfrozen | FreezeState::Frozen(1) => FreezeState::Unfrozen,
            FreezeState::Frozen(n) => FreezeState::Frozen(n - 1),
        }
    }

    pub fn count(self) -> u32 {
        match self {
            FreezeState::Unfrozen => 0,
            FreezeState::Frozen(n) => n,
        }
    }

    pub fn is_frozen(self) -> bool {
        self != FreezeState::Unfrozen
    }
}

struct VariableState {
    entity: ModelEntity<VariableId>,
    lower: f64,
    upper: f64,
    variable_type: VariableType,
    freeze: FreezeState,
    value: f64,
    reduced_cost: f64,
    solvers: Vec<SolverHandle>,
}

impl VariableState {
    fn value(&self) -> Result<f64> {
        if self.entity.is_assigned() {
            Ok(self.value)
        } else {
            Err(unassigned(&self.entity))
        }
    }
}

fn unassigned(entity: &ModelEntity<VariableId>) -> ModelError {
    ModelError::InvalidState(format!(
        "variable '{}' has no value: it has not been assigned by a solver",
        entity.name()
    ))
}

/// Decision variable with a name, bounds and a type.
///
/// Variables are never added to a model explicitly; a model uses whatever
/// variables appear in its objective and constraints.
#[derive(Clone)]
pub struct Variable {
    inner: Rc<RefCell<VariableState>>,
}

impl Variable {
    /// Continuous or integer variable with the given bounds and a default name.
    pub fn new(lower: f64, upper: f64, variable_type: VariableType) -> Self {
        Self::init("", lower, upper, variable_type)
    }

    /// Variable of the given type in `[0, +inf)` with a default name.
    pub fn with_type(variable_type: VariableType) -> Self {
        Self::init("", 0.0, f64::INFINITY, variable_type)
    }

    /// Named variable of the given type in `[0, +inf)`.
    pub fn named(name: &str, variable_type: VariableType) -> Self {
        Self::init(name, 0.0, f64::INFINITY, variable_type)
    }

    pub fn named_with_bounds(
        name: &str,
        lower: f64,
        upper: f64,
        variable_type: VariableType,
    ) -> Self {
        Self::init(name, lower, upper, variable_type)
    }

    /// Integer variable in `[0, 1]`.
    pub fn binary(name: &str) -> Self {
        Self::init(name, 0.0, 1.0, VariableType::Integer)
    }

    fn init(name: &str, lower: f64, upper: f64, variable_type: VariableType) -> Self {
        let id = VariableId::next();
        let name = if name.is_empty() {
            format!("Var_{id}")
        } else {
            name.to_string()
        };

        Self {
            inner: Rc::new(RefCell::new(VariableState {
                entity: ModelEntity::new(id, name),
                lower,
                upper,
                variable_type,
                freeze: FreezeState::Unfrozen,
                value: 0.0,
                reduced_cost: 0.0,
                solvers: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> VariableId {
        self.inner.borrow().entity.id()
    }

    pub fn name(&self) -> String {
        self.inner.borrow().entity.name().to_string()
    }

    pub fn lower(&self) -> f64 {
        self.inner.borrow().lower
    }

    pub fn upper(&self) -> f64 {
        self.inner.borrow().upper
    }

    pub fn variable_type(&self) -> VariableType {
        self.inner.borrow().variable_type
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type() == VariableType::Integer
    }

    // ── Mutators ────────────────────────────────────────────

    pub fn set_name(&self, name: &str) -> Result<()> {
        {
            let mut state = self.inner.borrow_mut();
            if state.entity.name() == name {
                return Ok(());
            }
            state.entity.set_name(name);
        }
        self.fan_out("set_name", |solver| solver.set_variable_name(self, name))
    }

    pub fn set_upper(&self, upper: f64) -> Result<()> {
        self.check_bound("upper", upper)?;
        let frozen = {
            let mut state = self.inner.borrow_mut();
            if approx_eq(state.upper, upper) {
                return Ok(());
            }
            state.upper = upper;
            state.freeze.is_frozen()
        };
        if frozen {
            self.log_held("set_upper");
            return Ok(());
        }
        self.fan_out("set_upper", |solver| solver.set_variable_upper(self, upper))
    }

    pub fn set_lower(&self, lower: f64) -> Result<()> {
        self.check_bound("lower", lower)?;
        let frozen = {
            let mut state = self.inner.borrow_mut();
            if approx_eq(state.lower, lower) {
                return Ok(());
            }
            state.lower = lower;
            state.freeze.is_frozen()
        };
        if frozen {
            self.log_held("set_lower");
            return Ok(());
        }
        self.fan_out("set_lower", |solver| solver.set_variable_lower(self, lower))
    }

    pub fn set_type(&self, variable_type: VariableType) -> Result<()> {
        {
            let mut state = self.inner.borrow_mut();
            if state.variable_type == variable_type {
                return Ok(());
            }
            state.variable_type = variable_type;
        }
        self.fan_out("set_type", |solver| {
            solver.set_variable_type(self, variable_type)
        })
    }

    // ── Freezing ────────────────────────────────────────────

    pub fn is_frozen(&self) -> bool {
        self.inner.borrow().freeze.is_frozen()
    }

    pub fn frozen_count(&self) -> u32 {
        self.inner.borrow().freeze.count()
    }

    /// Pins the bounds seen by every attached solver to the current value.
    ///
    /// Returns `true` if the variable was not frozen before. Nested calls only
    /// bump the count. The variable's own bounds are left untouched.
    pub fn freeze(&self) -> Result<bool> {
        let pinned = {
            let mut state = self.inner.borrow_mut();
            if state.freeze.is_frozen() {
                state.freeze = state.freeze.frozen();
                return Ok(false);
            }
            let value = state.value()?;
            state.freeze = state.freeze.frozen();
            value
        };
        self.fan_out("freeze", |solver| {
            solver.set_variable_bounds(self, pinned, pinned)
        })?;
        Ok(true)
    }

    /// Releases one freeze. Must be called as often as [`Variable::freeze`].
    ///
    /// Returns `true` only on the call that restores the original bounds.
    pub fn unfreeze(&self) -> Result<bool> {
        let (lower, upper) = {
            let mut state = self.inner.borrow_mut();
            if state.freeze != FreezeState::Frozen(1) {
                state.freeze = state.freeze.thawed();
                return Ok(false);
            }
            state.freeze = FreezeState::Unfrozen;
            (state.lower, state.upper)
        };
        self.fan_out("unfreeze", |solver| {
            solver.set_variable_bounds(self, lower, upper)
        })?;
        Ok(true)
    }

    /// Bounds a solver should use: the pinned value while frozen, otherwise
    /// the variable's own bounds.
    pub fn effective_bounds(&self) -> (f64, f64) {
        let state = self.inner.borrow();
        match (state.freeze.is_frozen(), state.value()) {
            (true, Ok(value)) => (value, value),
            _ => (state.lower, state.upper),
        }
    }

    // ── Solution ────────────────────────────────────────────

    /// Stores the solution of a solver that just finished.
    ///
    /// Called by solvers only, once per variable per solve. The most recent
    /// call determines [`Variable::value`] and [`Variable::reduced_cost`].
    pub fn assign(&self, solver: SolverId, offset: usize, value: f64, reduced_cost: f64) {
        let mut state = self.inner.borrow_mut();
        state.entity.assign(solver, offset);
        state.value = value;
        state.reduced_cost = reduced_cost;
        tracing::trace!(
            component = "variable",
            operation = "assign",
            variable = %state.entity.name(),
            solver = %solver,
            offset,
            value,
            reduced_cost
        );
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.inner.borrow().entity.assignment()
    }

    pub fn is_assigned(&self) -> bool {
        self.inner.borrow().entity.is_assigned()
    }

    pub fn value(&self) -> Result<f64> {
        self.inner.borrow().value()
    }

    pub fn reduced_cost(&self) -> Result<f64> {
        let state = self.inner.borrow();
        if state.entity.is_assigned() {
            Ok(state.reduced_cost)
        } else {
            Err(unassigned(&state.entity))
        }
    }

    /// Whether the current value is within bounds and, for integer
    /// variables, integral. Unassigned variables are never feasible.
    pub fn is_feasible(&self) -> bool {
        let state = self.inner.borrow();
        let Ok(value) = state.value() else {
            return false;
        };
        if !is_between(value, state.lower, state.upper) {
            return false;
        }
        state.variable_type != VariableType::Integer || is_integer(value)
    }

    /// `<name> : <type> : [<lower>, <upper>] = <value>   ( <reduced cost> )`
    pub fn to_level_string(&self) -> String {
        let state = self.inner.borrow();
        if state.entity.is_assigned() {
            format!("{self} = {}   ( {} )", state.value, state.reduced_cost)
        } else {
            format!("{self} = unassigned   ( unassigned )")
        }
    }

    // ── Solver attachment ───────────────────────────────────

    /// Registers a solver to be notified of changes. Attaching the same
    /// solver twice keeps the original position.
    pub fn attach(&self, handle: SolverHandle) {
        let mut state = self.inner.borrow_mut();
        if state.solvers.iter().any(|h| h.id() == handle.id()) {
            return;
        }
        tracing::debug!(
            component = "variable",
            operation = "attach",
            variable = %state.entity.name(),
            solver = %handle.id()
        );
        state.solvers.push(handle);
    }

    pub fn detach(&self, solver: SolverId) {
        let mut state = self.inner.borrow_mut();
        state.solvers.retain(|h| h.id() != solver);
    }

    pub fn attached_solvers(&self) -> Vec<SolverId> {
        self.inner.borrow().solvers.iter().map(SolverHandle::id).collect()
    }

    pub fn is_attached_to(&self, solver: SolverId) -> bool {
        self.inner.borrow().solvers.iter().any(|h| h.id() == solver)
    }

    fn fan_out(
        &self,
        operation: &'static str,
        mut notify: impl FnMut(&mut dyn VariableObserver) -> Result<()>,
    ) -> Result<()> {
        // Cloned so observers can read the variable while being notified.
        let handles = self.inner.borrow().solvers.clone();
        let mut dead = Vec::new();

        for handle in &handles {
            if handle.notify(&mut notify)? {
                tracing::debug!(
                    component = "variable",
                    operation,
                    variable = %self.name(),
                    solver = %handle.id()
                );
            } else {
                dead.push(handle.id());
            }
        }

        if !dead.is_empty() {
            tracing::warn!(
                component = "variable",
                operation,
                variable = %self.name(),
                dropped = dead.len(),
                "pruning handles of dropped solvers"
            );
            self.inner
                .borrow_mut()
                .solvers
                .retain(|h| !dead.contains(&h.id()));
        }
        Ok(())
    }

    fn check_bound(&self, side: &str, bound: f64) -> Result<()> {
        if bound.is_nan() {
            return Err(ModelError::InvalidArgument(format!(
                "{side} bound of variable '{}' cannot be NaN",
                self.name()
            )));
        }
        Ok(())
    }

    fn log_held(&self, operation: &'static str) {
        tracing::debug!(
            component = "variable",
            operation,
            variable = %self.name(),
            "variable is frozen; bound change held until unfreeze"
        );
    }

    // ── Builders ────────────────────────────────────────────

    pub fn plus(&self, rhs: impl Into<Expression>) -> Expression {
        Expression::from(self).plus(rhs)
    }

    pub fn minus(&self, rhs: impl Into<Expression>) -> Expression {
        Expression::from(self).minus(rhs)
    }

    pub fn times(&self, factor: f64) -> Expression {
        Expression::term(factor, self)
    }

    pub fn divided_by(&self, divisor: f64) -> Result<Expression> {
        Expression::from(self).divided_by(divisor)
    }

    pub fn less_equal(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).less_equal(rhs)
    }

    pub fn greater_equal(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).greater_equal(rhs)
    }

    pub fn equal(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).equal(rhs)
    }

    /// Always fails: there is no linear "not equal" constraint.
    pub fn not_equal(&self, rhs: impl Into<Expression>) -> Result<Constraint> {
        Expression::from(self).not_equal(rhs)
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::init("", 0.0, f64::INFINITY, VariableType::Continuous)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// `<name> : <type> : [<lower>, <upper>]`
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        write!(
            f,
            "{} : {} : [{}, {}]",
            state.entity.name(),
            state.variable_type,
            state.lower,
            state.upper
        )
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Variable")
            .field("id", &state.entity.id())
            .field("name", &state.entity.name())
            .field("lower", &state.lower)
            .field("upper", &state.upper)
            .field("type", &state.variable_type)
            .field("freeze", &state.freeze)
            .finish()
    }
}
