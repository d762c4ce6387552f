use crate::domain::{
    models::SolverConfig,
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};

/// Factory for creating backends based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create the backend named in the configuration
    pub fn create_solver(config: &SolverConfig) -> Result<Box<dyn SolverService>> {
        Self::create_from_backend(config.backend)
    }

    /// Create a backend, failing if it was not compiled into this build
    pub fn create_from_backend(backend: SolverBackend) -> Result<Box<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Self::default_solver(),
            SolverBackend::CoinCbc => Self::coin_cbc(),
            SolverBackend::Highs => Self::highs(),
        }
    }

    /// CBC when available, HiGHS otherwise
    pub fn default_solver() -> Result<Box<dyn SolverService>> {
        Self::coin_cbc().or_else(|_| Self::highs()).map_err(|_| {
            SolverError::SolverNotAvailable(
                "no backend compiled in; enable the `cbc` or `highs` feature".to_string(),
            )
        })
    }

    /// Backends compiled into this build
    pub fn available() -> Vec<SolverBackend> {
        [SolverBackend::CoinCbc, SolverBackend::Highs]
            .into_iter()
            .filter(|&backend| Self::create_from_backend(backend).is_ok())
            .collect()
    }

    #[cfg(feature = "cbc")]
    fn coin_cbc() -> Result<Box<dyn SolverService>> {
        Ok(Box::new(crate::solver::CoinCbcSolver::new()))
    }

    #[cfg(not(feature = "cbc"))]
    fn coin_cbc() -> Result<Box<dyn SolverService>> {
        Err(SolverError::SolverNotAvailable(
            "COIN-OR CBC support requires the `cbc` feature".to_string(),
        ))
    }

    #[cfg(feature = "highs")]
    fn highs() -> Result<Box<dyn SolverService>> {
        Ok(Box::new(crate::solver::HighsSolver::new()))
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Result<Box<dyn SolverService>> {
        Err(SolverError::SolverNotAvailable(
            "HiGHS support requires the `highs` feature".to_string(),
        ))
    }
}
