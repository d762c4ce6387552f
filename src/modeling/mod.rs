// Modeling layer: variables, expressions, constraints and models
// Variables stay in sync with every solver they are attached to

pub mod bulk;
pub mod constraint;
pub mod entity;
pub mod error;
pub mod expression;
pub mod math;
pub mod model;
pub mod objective;
pub mod observer;
pub mod variable;

pub use bulk::Enumeration;
pub use constraint::Constraint;
pub use entity::{Assignment, ConstraintId, ModelEntity, SolverId, VariableId};
pub use error::{ModelError, Result};
pub use expression::Expression;
pub use model::Model;
pub use objective::Objective;
pub use observer::{SolverHandle, VariableObserver};
pub use variable::{FreezeState, Variable};
