//! Lab configuration.

use crate::error::ConfigError;
use crate::experiment::ExperimentKind;
use crate::titration::TitrationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one lab run.
///
/// Missing fields fall back to the authored defaults, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub experiment: ExperimentKind,
    pub titration: TitrationConfig,
}

impl LabConfig {
    pub fn for_experiment(experiment: ExperimentKind) -> Self {
        Self {
            experiment,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.titration.validate()
    }

    /// Parses and validates a config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = LabConfig::from_json_str(
            r#"{ "experiment": "aspirin_synthesis", "titration": { "settle_delay_ms": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.experiment, ExperimentKind::AspirinSynthesis);
        assert_eq!(config.titration.settle_delay_ms, 0);
        assert_eq!(config.titration.cycle_duration_ms, 8000);
    }

    #[test]
    fn test_bad_config_is_parse_error() {
        let err = LabConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_drop_interval_rejected() {
        let err = LabConfig::from_json_str(r#"{ "titration": { "drop_interval_ms": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let mut config = LabConfig::default();
        config.titration.volume_per_cycle_ml = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LabConfig::from_file("/nonexistent/chemlab.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
