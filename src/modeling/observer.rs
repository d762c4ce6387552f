// Observer contract between variables and the solvers they are attached to
// Variables hold weak handles; solvers own their own column copies

use super::entity::SolverId;
use super::error::{ModelError, Result};
use super::variable::Variable;
use crate::domain::VariableType;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Receives every change a caller makes to a variable the solver holds.
///
/// Implementations update their own copy of the variable (a column, usually)
/// and must not call back into the variable's mutators.
pub trait VariableObserver {
    fn set_variable_upper(&mut self, variable: &Variable, upper: f64) -> Result<()>;

    fn set_variable_lower(&mut self, variable: &Variable, lower: f64) -> Result<()>;

    /// Both bounds in one update. Used by freeze and unfreeze.
    fn set_variable_bounds(&mut self, variable: &Variable, lower: f64, upper: f64) -> Result<()>;

    fn set_variable_type(&mut self, variable: &Variable, variable_type: VariableType)
        -> Result<()>;

    fn set_variable_name(&mut self, variable: &Variable, name: &str) -> Result<()>;
}

/// Non-owning reference from a variable to a solver it is attached to.
#[derive(Clone)]
pub struct SolverHandle {
    id: SolverId,
    observer: Weak<RefCell<dyn VariableObserver>>,
}

impl SolverHandle {
    pub fn new(id: SolverId, observer: Weak<RefCell<dyn VariableObserver>>) -> Self {
        Self { id, observer }
    }

    /// Handle to an observer owned by the given `Rc`.
    pub fn from_rc<O: VariableObserver + 'static>(id: SolverId, observer: &Rc<RefCell<O>>) -> Self {
        let weak: Weak<RefCell<O>> = Rc::downgrade(observer);
        Self {
            id,
            observer: weak,
        }
    }

    pub fn id(&self) -> SolverId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.observer.strong_count() > 0
    }

    /// Runs `notify` against the observer.
    ///
    /// Returns `Ok(false)` when the solver has been dropped, and
    /// `InvalidState` when it is already borrowed (a solve in progress).
    pub(crate) fn notify(
        &self,
        notify: impl FnOnce(&mut dyn VariableObserver) -> Result<()>,
    ) -> Result<bool> {
        let Some(observer) = self.observer.upgrade() else {
            return Ok(false);
        };
        let mut observer = observer.try_borrow_mut().map_err(|_| {
            ModelError::InvalidState(format!(
                "solver {} is busy and cannot be notified",
                self.id
            ))
        })?;
        notify(&mut *observer)?;
        Ok(true)
    }
}

impl fmt::Debug for SolverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
