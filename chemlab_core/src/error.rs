//! Error types for the lab simulation.
//!
//! Nothing in the lab fails hard. Precondition violations are
//! [`LabWarning`]s, surfaced to the student as warning notifications and
//! leaving the state untouched. [`ConfigError`] covers loading settings.

use thiserror::Error;

/// A precondition the student has not met yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabWarning {
    /// Titration needs both the burette and the conical flask on the bench.
    #[error("Place both the burette and the conical flask on the workbench before starting the titration")]
    MissingApparatus,

    /// The burette holds no base to titrate with.
    #[error("Fill the burette with NaOH before starting the titration")]
    BuretteEmpty,

    /// Manual step navigation on an experiment that tracks steps itself.
    #[error("{0} steps complete automatically as you work")]
    StepsTrackedAutomatically(String),
}

/// Failure to load lab configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but cannot drive a run
    #[error("invalid config: {0}")]
    Invalid(String),
}
