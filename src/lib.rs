// Domain layer: solver-agnostic problem data and the backend contract
pub mod domain;

// Modeling layer: variables, expressions, constraints, models
pub mod modeling;

// Solver layer: model-bound solver instances and backend adapters
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConstraintType, OptimizationProblem, OptimizationType, Solution, SolutionStatus,
    SolverBackend, SolverConfig, SolverError, SolverService, VariableType,
};

pub use modeling::{
    Constraint, Enumeration, Expression, Model, ModelError, Objective, Variable, VariableObserver,
};

pub use solver::{Solver, SolverFactory};

#[cfg(feature = "cbc")]
pub use solver::CoinCbcSolver;

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
