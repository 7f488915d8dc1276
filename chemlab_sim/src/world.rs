//! SimWorld - The simulation harness container.

use crate::context::SimContext;
use crate::driver::{SharedLab, TaskOutcome, TitrationHandle, TitrationTask, MAX_FRAME_RATE_HZ};
use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::invariants::InvariantChecker;

use chemlab_core::{ConfigError, DispatchOutcome, Lab, LabConfig, LabEvent, LabSnapshot, Notification, NotificationLevel};
use chemlab_env::{LabContext, RunId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Titration frame loop rate in Hz
    pub frame_rate_hz: f64,

    /// Lab settings
    pub lab: LabConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frame_rate_hz: 60.0,
            lab: LabConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parses a config from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1.0..=MAX_FRAME_RATE_HZ).contains(&self.frame_rate_hz) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate_hz must be within [1, {}], got {}",
                MAX_FRAME_RATE_HZ, self.frame_rate_hz
            )));
        }
        self.lab.validate()
    }
}

/// Counters kept while a world runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldStats {
    pub events_dispatched: u64,
    pub events_ignored: u64,
    pub warnings: u64,
    pub cycles_completed: u64,
    pub cycles_cancelled: u64,
}

/// The SimWorld - one lab, a virtual clock and the invariant checker.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared simulation context (virtual clock)
    pub context: Arc<SimContext>,

    lab: SharedLab,
    checker: InvariantChecker,
    stats: WorldStats,
    export: Option<SimExport>,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        let context = SimContext::shared(config.seed);
        let lab = Lab::new(config.lab.clone(), RunId::from_seed(config.seed));
        Self {
            config,
            context,
            lab: Arc::new(Mutex::new(lab)),
            checker: InvariantChecker::new(),
            stats: WorldStats::default(),
            export: None,
        }
    }

    /// Records a snapshot frame after every operation.
    pub fn with_export(mut self, scenario: &str) -> Self {
        self.export = Some(SimExport::new(scenario, self.config.seed));
        self
    }

    pub fn lab(&self) -> SharedLab {
        Arc::clone(&self.lab)
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    pub fn invariant_checks(&self) -> u64 {
        self.checker.checks()
    }

    pub fn take_export(&mut self) -> Option<SimExport> {
        self.export.take()
    }

    /// Advances virtual time without any event.
    pub fn advance(&self, duration: Duration) {
        self.context.advance_time(duration);
    }

    /// Dispatches one event at the current virtual time and checks invariants.
    pub async fn dispatch(&mut self, event: LabEvent) -> Result<DispatchOutcome, SimError> {
        let label = event_label(&event);
        let resets = matches!(event, LabEvent::Reset | LabEvent::SelectExperiment { .. });

        let outcome = {
            let mut lab = self.lab.lock().await;
            lab.dispatch(event, self.context.now())
        };

        self.stats.events_dispatched += 1;
        match &outcome {
            DispatchOutcome::Ignored => self.stats.events_ignored += 1,
            DispatchOutcome::Refused(_) => self.stats.warnings += 1,
            DispatchOutcome::CycleCompleted(_) => self.stats.cycles_completed += 1,
            _ => {}
        }
        debug!(event = label, ?outcome, "dispatched");

        if resets {
            self.checker.note_reset();
        }
        self.observe(label).await?;
        Ok(outcome)
    }

    /// Starts a titration driven by a background task.
    pub async fn start_titration(&mut self) -> TitrationHandle {
        TitrationTask::start(Arc::clone(&self.context), self.lab(), self.config.frame_rate_hz).await
    }

    /// Cancels a running task and checks the lab afterwards.
    pub async fn cancel_titration(&mut self, handle: TitrationHandle) -> Result<TaskOutcome, SimError> {
        handle.cancel().await;
        self.finish_titration(handle).await
    }

    /// Waits for a task and checks the lab afterwards.
    pub async fn finish_titration(&mut self, handle: TitrationHandle) -> Result<TaskOutcome, SimError> {
        let outcome = handle.finished().await?;
        match &outcome {
            TaskOutcome::Completed(_) => self.stats.cycles_completed += 1,
            TaskOutcome::Cancelled => self.stats.cycles_cancelled += 1,
            TaskOutcome::Refused(_) => self.stats.warnings += 1,
        }
        self.observe("titration").await?;
        Ok(outcome)
    }

    /// Runs one full titration cycle.
    pub async fn run_titration(&mut self) -> Result<TaskOutcome, SimError> {
        let handle = self.start_titration().await;
        self.finish_titration(handle).await
    }

    /// Yields until virtual time reaches `at`.
    ///
    /// Only returns early if the running titration ends first.
    pub async fn wait_until(&self, at: Duration) {
        while self.context.now() < at {
            if !self.lab.lock().await.is_titrating() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    pub async fn snapshot(&self) -> LabSnapshot {
        self.lab.lock().await.snapshot()
    }

    async fn observe(&mut self, label: &str) -> Result<(), SimError> {
        let mut lab = self.lab.lock().await;
        self.checker.check(&lab)?;

        let notifications = lab.take_notifications();
        for note in &notifications {
            if note.level == NotificationLevel::Warning {
                debug!(message = %note.message, "warning raised");
            }
        }

        if let Some(export) = self.export.as_mut() {
            export.add_frame(SimFrame {
                time_sec: self.context.now().as_secs_f64(),
                label: label.to_string(),
                snapshot: lab.snapshot(),
                notifications,
            });
        }
        Ok(())
    }
}

fn event_label(event: &LabEvent) -> &'static str {
    match event {
        LabEvent::SelectExperiment { .. } => "select_experiment",
        LabEvent::PlaceEquipment { .. } => "place_equipment",
        LabEvent::RemoveEquipment { .. } => "remove_equipment",
        LabEvent::DropChemical { .. } => "drop_chemical",
        LabEvent::StartTitration => "start_titration",
        LabEvent::StopTitration => "stop_titration",
        LabEvent::TitrationFrame { .. } => "titration_frame",
        LabEvent::DropTimer { .. } => "drop_timer",
        LabEvent::StartStirring => "start_stirring",
        LabEvent::StopStirring => "stop_stirring",
        LabEvent::NextStep => "next_step",
        LabEvent::PreviousStep => "previous_step",
        LabEvent::Reset => "reset",
    }
}

/// Collects warning messages, for scenario assertions on raised warnings.
pub fn warnings(notifications: &[Notification]) -> Vec<&str> {
    notifications
        .iter()
        .filter(|n| n.level == NotificationLevel::Warning)
        .map(|n| n.message.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemlab_core::equipment::BURETTE;

    #[tokio::test]
    async fn test_dispatch_records_frames() {
        let mut world = SimWorld::new(SimConfig::default()).with_export("unit");
        world
            .dispatch(LabEvent::PlaceEquipment { id: BURETTE.to_string(), x: 1.0, y: 2.0 })
            .await
            .unwrap();
        world.dispatch(LabEvent::StartTitration).await.unwrap();

        assert_eq!(world.stats().events_dispatched, 2);
        assert_eq!(world.stats().warnings, 1);

        let export = world.take_export().unwrap();
        assert_eq!(export.frames.len(), 2);
        assert_eq!(export.frames[0].label, "place_equipment");
        assert_eq!(warnings(&export.frames[1].notifications).len(), 1);
    }

    #[test]
    fn test_sim_config_rejects_unusable_values() {
        let err = SimConfig::from_json_str(r#"{ "frame_rate_hz": 1e12 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SimConfig::from_json_str(r#"{ "lab": { "titration": { "drop_interval_ms": 0 } } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = SimConfig { frame_rate_hz: f64::NAN, ..SimConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sim_config_from_partial_json() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7, "lab": { "titration": { "cycle_duration_ms": 2000 } } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.frame_rate_hz, 60.0);
        assert_eq!(config.lab.titration.cycle_duration_ms, 2000);
    }
}
