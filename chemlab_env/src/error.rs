//! Error types for the ChemLab environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A spawned task went away without reporting (runtime shut down)
    #[error("Task dropped: {0}")]
    TaskDropped(String),
}

impl EnvError {
    /// Creates a dropped-task error.
    pub fn dropped(task: impl std::fmt::Display) -> Self {
        Self::TaskDropped(task.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EnvError::dropped("drop-timer").to_string(),
            "Task dropped: drop-timer"
        );
    }
}
