//! Error types for simulation runs.

use crate::invariants::InvariantViolation;
use chemlab_core::ConfigError;
use chemlab_env::EnvError;
use thiserror::Error;

/// Why a scenario run failed.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// A scenario expectation did not hold
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The async runtime could not be built
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Fails with an assertion error unless `condition` holds.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), SimError> {
    if condition {
        Ok(())
    } else {
        Err(SimError::Assertion(message()))
    }
}
