// Identity and solver-assignment bookkeeping shared by model entities
// Ids come from process-wide counters and are never reused

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_id_type {
    ($name:ident, $counter:ident) => {
        static $counter: AtomicU64 = AtomicU64::new(0);

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Get the inner u64 value.
            pub fn inner(self) -> u64 {
                self.0
            }

            /// Next value of the process-wide counter. Values are never reused.
            pub fn next() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(VariableId, NEXT_VARIABLE_ID);
define_id_type!(ConstraintId, NEXT_CONSTRAINT_ID);
define_id_type!(SolverId, NEXT_SOLVER_ID);

/// Where an entity sits inside the solver that last assigned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub solver: SolverId,
    pub offset: usize,
}

/// Name, id and current solver assignment of a model entity.
#[derive(Debug, Clone)]
pub struct ModelEntity<I> {
    id: I,
    name: String,
    assignment: Option<Assignment>,
}

impl<I: Copy> ModelEntity<I> {
    pub fn new(id: I, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            assignment: None,
        }
    }

    pub fn id(&self) -> I {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn assign(&mut self, solver: SolverId, offset: usize) {
        self.assignment = Some(Assignment { solver, offset });
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    pub fn is_assigned(&self) -> bool {
        self.assignment.is_some()
    }

    pub fn clear_assignment(&mut self) {
        self.assignment = None;
    }
}
