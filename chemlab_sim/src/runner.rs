//! Scenario runner - executes scripted lab sessions.

use crate::driver::TaskOutcome;
use crate::error::{ensure, SimError};
use crate::exporter::SimExport;
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld};

use chemlab_core::chemicals::{
    ACETIC_ANHYDRIDE, DISTILLED_WATER, HCL, IRON_NITRATE, NAOH, PHENOLPHTHALEIN, PHOSPHORIC_ACID,
    POTASSIUM_THIOCYANATE, SALICYLIC_ACID,
};
use chemlab_core::equipment::{BEAKER, BURETTE, CONICAL_FLASK, TEST_TUBE};
use chemlab_core::mixture::{BEIGE, BLOOD_RED};
use chemlab_core::{
    DispatchOutcome, ExperimentKind, LabConfig, LabEvent, LabWarning, MixedColor, ResultEntry, TitrationTicket,
};
use chemlab_env::LabContext;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// RNG stream for scripted student input
const CLICK_STREAM: u64 = 0xC11C;

const EPSILON: f64 = 1e-6;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Events dispatched to the lab
    pub total_events: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub events_ignored: u64,
    pub warnings: u64,
    pub cycles_completed: u64,
    pub cycles_cancelled: u64,
    pub drops_emitted: u64,
    pub results_recorded: usize,
    pub invariant_checks: u64,
    pub final_volume_ml: f64,
    pub final_color_intensity: f64,
    pub completion_percentage: f64,
}

/// Runs lab scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Titration frame rate in Hz
    frame_rate_hz: f64,

    /// Lab tunables; the experiment is chosen by each scenario
    lab: LabConfig,

    /// Event count for the random-click scenario
    fuzz_events: usize,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            frame_rate_hz: 60.0,
            lab: LabConfig::default(),
            fuzz_events: 500,
        }
    }

    /// Takes seed, frame rate and lab tunables from a config.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.seed)
            .with_frame_rate(config.frame_rate_hz)
            .with_lab_config(config.lab.clone())
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, hz: f64) -> Self {
        self.frame_rate_hz = hz;
        self
    }

    pub fn with_lab_config(mut self, lab: LabConfig) -> Self {
        self.lab = lab;
        self
    }

    pub fn with_fuzz_events(mut self, events: usize) -> Self {
        self.fuzz_events = events;
        self
    }

    fn sim_config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            frame_rate_hz: self.frame_rate_hz,
            lab: LabConfig {
                experiment: ExperimentKind::AcidBaseTitration,
                titration: self.lab.titration.clone(),
            },
        }
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.execute(scenario, false).0
    }

    /// Runs a scenario, recording a snapshot frame after every event.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, Option<SimExport>) {
        self.execute(scenario, true)
    }

    fn execute(&self, scenario: ScenarioId, export: bool) -> (ScenarioResult, Option<SimExport>) {
        if let Err(e) = self.sim_config().validate() {
            return (self.failed(scenario, SimError::from(e)), None);
        }

        // single-threaded so task interleaving is reproducible
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(e) => return (self.failed(scenario, SimError::from(e)), None),
        };
        runtime.block_on(self.run_async(scenario, export))
    }

    /// Runs a scenario on the caller's runtime.
    pub async fn run_async(&self, scenario: ScenarioId, export: bool) -> (ScenarioResult, Option<SimExport>) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mut world = SimWorld::new(self.sim_config());
        if export {
            world = world.with_export(scenario.name());
        }

        let outcome = match scenario {
            ScenarioId::StandardTitration => self.run_standard_titration(&mut world).await,
            ScenarioId::OverTitration => self.run_over_titration(&mut world).await,
            ScenarioId::InterruptedTitration => self.run_interrupted_titration(&mut world).await,
            ScenarioId::MissingApparatus => self.run_missing_apparatus(&mut world).await,
            ScenarioId::ResetAfterCycles => self.run_reset_after_cycles(&mut world).await,
            ScenarioId::AspirinSynthesis => self.run_aspirin_synthesis(&mut world).await,
            ScenarioId::Equilibrium => self.run_equilibrium(&mut world).await,
            ScenarioId::RandomClicks => self.run_random_clicks(&mut world).await,
        };

        let failure_reason = outcome.err().map(|e| e.to_string());
        if let Some(reason) = &failure_reason {
            warn!("Scenario {} failed: {}", scenario.name(), reason);
        }

        let snapshot = world.snapshot().await;
        let stats = world.stats().clone();
        let results_recorded = world.lab().lock().await.results().len();

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_events: stats.events_dispatched,
            final_time_secs: world.context.now_secs(),
            failure_reason: failure_reason.clone(),
            metrics: ScenarioMetrics {
                events_ignored: stats.events_ignored,
                warnings: stats.warnings,
                cycles_completed: stats.cycles_completed,
                cycles_cancelled: stats.cycles_cancelled,
                drops_emitted: snapshot.drops_emitted,
                results_recorded,
                invariant_checks: world.invariant_checks(),
                final_volume_ml: snapshot.cumulative_volume_ml,
                final_color_intensity: snapshot.cumulative_color_intensity,
                completion_percentage: snapshot.completion_percentage,
            },
        };

        let export = world.take_export().map(|mut e| {
            e.finalize(result.passed, failure_reason);
            e
        });
        (result, export)
    }

    fn failed(&self, scenario: ScenarioId, error: SimError) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: false,
            total_events: 0,
            final_time_secs: 0.0,
            failure_reason: Some(error.to_string()),
            metrics: ScenarioMetrics::default(),
        }
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    /// LAB-001: one full cycle from a clean bench.
    async fn run_standard_titration(&self, world: &mut SimWorld) -> Result<(), SimError> {
        setup_titration(world).await?;

        let record = expect_completed(world.run_titration().await?)?;
        let expected = self.lab.titration.initial_volume_ml + self.lab.titration.volume_per_cycle_ml;
        ensure((record.final_volume_ml - expected).abs() < EPSILON, || {
            format!("final volume {} mL, expected {} mL", record.final_volume_ml, expected)
        })?;
        ensure(!record.over_titration, || "first cycle flagged as over-titration".to_string())?;

        let shared = world.lab();
        let lab = shared.lock().await;
        let steps = lab.completed_steps();
        ensure(steps.len() == 6, || format!("completed steps {:?}, expected all six", steps))?;
        ensure(lab.drops_emitted() > 0, || "no drops emitted".to_string())?;
        ensure(
            matches!(lab.results().last(), Some(ResultEntry::TitrationCycle { .. })),
            || "cycle record missing from results".to_string(),
        )?;
        Ok(())
    }

    /// LAB-002: cumulative values carry across two cycles.
    async fn run_over_titration(&self, world: &mut SimWorld) -> Result<(), SimError> {
        setup_titration(world).await?;

        let first = expect_completed(world.run_titration().await?)?;
        let second = expect_completed(world.run_titration().await?)?;

        let step = self.lab.titration.volume_per_cycle_ml;
        ensure((second.final_volume_ml - first.final_volume_ml - step).abs() < EPSILON, || {
            format!(
                "volume went {} -> {} mL, expected +{}",
                first.final_volume_ml, second.final_volume_ml, step
            )
        })?;
        ensure(second.color_intensity > 1.0, || {
            format!("intensity {} after two cycles", second.color_intensity)
        })?;
        ensure(second.over_titration, || "second cycle not flagged".to_string())?;
        ensure(!first.over_titration, || "first cycle flagged".to_string())?;
        Ok(())
    }

    /// LAB-003: cancellation discards the in-flight cycle.
    async fn run_interrupted_titration(&self, world: &mut SimWorld) -> Result<(), SimError> {
        setup_titration(world).await?;
        let initial = self.lab.titration.initial_volume_ml;

        let handle = world.start_titration().await;
        ensure(handle.ticket().is_some(), || "titration did not start".to_string())?;
        let midpoint = world.context.now() + self.lab.titration.cycle_duration() / 2;
        world.wait_until(midpoint).await;

        let outcome = world.cancel_titration(handle).await?;
        ensure(outcome == TaskOutcome::Cancelled, || format!("cancel returned {:?}", outcome))?;
        {
            let shared = world.lab();
            let lab = shared.lock().await;
            ensure(!lab.is_titrating(), || "still titrating after cancel".to_string())?;
            ensure(lab.cumulative_volume_ml() == initial, || {
                format!("cumulative volume {} after cancel", lab.cumulative_volume_ml())
            })?;
            ensure(lab.cumulative_color_intensity() == 0.0, || "intensity moved after cancel".to_string())?;
            ensure(lab.results().is_empty(), || "cancelled cycle left a result".to_string())?;
        }

        let record = expect_completed(world.run_titration().await?)?;
        ensure((record.delivered_ml - self.lab.titration.volume_per_cycle_ml).abs() < EPSILON, || {
            format!("restart delivered {} mL", record.delivered_ml)
        })?;
        Ok(())
    }

    /// LAB-004: preconditions are checked in order.
    async fn run_missing_apparatus(&self, world: &mut SimWorld) -> Result<(), SimError> {
        place(world, BURETTE).await?;
        pour(world, NAOH, BURETTE, Some(50.0)).await?;

        let outcome = world.dispatch(LabEvent::StartTitration).await?;
        ensure(outcome == DispatchOutcome::Refused(LabWarning::MissingApparatus), || {
            format!("start without flask returned {:?}", outcome)
        })?;

        // a fresh burette has nothing in it
        world.dispatch(LabEvent::RemoveEquipment { id: BURETTE.to_string() }).await?;
        place(world, BURETTE).await?;
        place(world, CONICAL_FLASK).await?;
        pour(world, DISTILLED_WATER, BURETTE, Some(20.0)).await?;

        let outcome = world.dispatch(LabEvent::StartTitration).await?;
        ensure(outcome == DispatchOutcome::Refused(LabWarning::BuretteEmpty), || {
            format!("start with water in burette returned {:?}", outcome)
        })?;

        {
            let shared = world.lab();
            let lab = shared.lock().await;
            ensure(!lab.is_titrating(), || "refused start changed state".to_string())?;
            ensure(lab.cumulative_volume_ml() == self.lab.titration.initial_volume_ml, || {
                "refused start moved the volume".to_string()
            })?;
            let steps = lab.completed_steps();
            ensure(steps == BTreeSet::from([1]), || format!("completed steps {:?}", steps))?;
        }

        pour(world, NAOH, BURETTE, None).await?;
        let outcome = world.dispatch(LabEvent::StartTitration).await?;
        ensure(matches!(outcome, DispatchOutcome::Started(_)), || {
            format!("ready apparatus returned {:?}", outcome)
        })?;
        world.dispatch(LabEvent::StopTitration).await?;
        Ok(())
    }

    /// LAB-005: reset restores the initial titration state.
    async fn run_reset_after_cycles(&self, world: &mut SimWorld) -> Result<(), SimError> {
        setup_titration(world).await?;
        expect_completed(world.run_titration().await?)?;
        expect_completed(world.run_titration().await?)?;

        world.dispatch(LabEvent::Reset).await?;

        let shared = world.lab();
        let lab = shared.lock().await;
        ensure(lab.cumulative_volume_ml() == self.lab.titration.initial_volume_ml, || {
            format!("volume {} after reset", lab.cumulative_volume_ml())
        })?;
        ensure(lab.cumulative_color_intensity() == 0.0, || "intensity survived reset".to_string())?;
        ensure(lab.completed_steps().is_empty(), || "steps survived reset".to_string())?;
        ensure(lab.results().is_empty(), || "results survived reset".to_string())?;
        ensure(lab.workbench().is_empty(), || "equipment survived reset".to_string())?;
        Ok(())
    }

    /// LAB-006: esterification and the linear cursor.
    async fn run_aspirin_synthesis(&self, world: &mut SimWorld) -> Result<(), SimError> {
        world
            .dispatch(LabEvent::SelectExperiment { experiment: ExperimentKind::AspirinSynthesis })
            .await?;

        let outcome = place(world, BURETTE).await?;
        ensure(outcome == DispatchOutcome::Ignored, || "burette accepted in aspirin lab".to_string())?;

        place(world, CONICAL_FLASK).await?;
        pour(world, SALICYLIC_ACID, CONICAL_FLASK, None).await?;
        pour(world, ACETIC_ANHYDRIDE, CONICAL_FLASK, None).await?;
        pour(world, PHOSPHORIC_ACID, CONICAL_FLASK, None).await?;

        {
            let shared = world.lab();
            let lab = shared.lock().await;
            let Some(ResultEntry::Reaction { result, .. }) = lab.results().first() else {
                return Err(SimError::Assertion("no reaction recorded".to_string()));
            };
            ensure(result.reaction_type == "Esterification", || {
                format!("recorded {}", result.reaction_type)
            })?;
            ensure(result.yield_percent == 95.0, || format!("yield {}", result.yield_percent))?;
            ensure(lab.mixed_color(CONICAL_FLASK) == MixedColor::Solid(BEIGE), || {
                format!("flask color {}", lab.mixed_color(CONICAL_FLASK))
            })?;
        }

        let total = ExperimentKind::AspirinSynthesis.procedure().len();
        for _ in 0..total {
            world.dispatch(LabEvent::NextStep).await?;
        }
        let extra = world.dispatch(LabEvent::NextStep).await?;
        ensure(extra == DispatchOutcome::Ignored, || "cursor moved past the last step".to_string())?;
        ensure(world.snapshot().await.completion_percentage == 1.0, || "cursor incomplete".to_string())?;

        world.dispatch(LabEvent::PreviousStep).await?;
        let snapshot = world.snapshot().await;
        ensure(snapshot.completed_steps.len() == total - 1, || {
            format!("completed steps {:?} after stepping back", snapshot.completed_steps)
        })?;
        Ok(())
    }

    /// LAB-007: complex formation in a test tube.
    async fn run_equilibrium(&self, world: &mut SimWorld) -> Result<(), SimError> {
        world
            .dispatch(LabEvent::SelectExperiment { experiment: ExperimentKind::ChemicalEquilibrium })
            .await?;

        place(world, TEST_TUBE).await?;
        pour(world, IRON_NITRATE, TEST_TUBE, Some(5.0)).await?;
        pour(world, POTASSIUM_THIOCYANATE, TEST_TUBE, Some(5.0)).await?;
        place(world, BEAKER).await?;
        pour(world, DISTILLED_WATER, BEAKER, Some(50.0)).await?;

        {
            let shared = world.lab();
            let lab = shared.lock().await;
            ensure(lab.mixed_color(TEST_TUBE) == MixedColor::Solid(BLOOD_RED), || {
                format!("test tube color {}", lab.mixed_color(TEST_TUBE))
            })?;
            let reactions: Vec<_> = lab
                .results()
                .iter()
                .filter_map(|r| match r {
                    ResultEntry::Reaction { result, .. } => Some(result.reaction_type.as_str()),
                    _ => None,
                })
                .collect();
            ensure(reactions == ["Complex Formation"], || format!("reactions {:?}", reactions))?;
        }

        world.dispatch(LabEvent::NextStep).await?;
        world.dispatch(LabEvent::NextStep).await?;
        world.dispatch(LabEvent::Reset).await?;
        let snapshot = world.snapshot().await;
        ensure(snapshot.completed_steps.is_empty(), || "cursor survived reset".to_string())?;
        ensure(snapshot.experiment == ExperimentKind::ChemicalEquilibrium, || {
            "reset changed the experiment".to_string()
        })?;
        Ok(())
    }

    /// LAB-008: random input, invariants checked after every event.
    async fn run_random_clicks(&self, world: &mut SimWorld) -> Result<(), SimError> {
        let mut rng = world.context.derive_rng(CLICK_STREAM);
        let mut ticket: Option<TitrationTicket> = None;

        for i in 0..self.fuzz_events {
            world.advance(Duration::from_millis(rng.gen_range(0..400)));
            let experiment = world.lab().lock().await.experiment();
            let event = random_event(&mut rng, experiment, ticket);

            if let DispatchOutcome::Started(t) = world.dispatch(event).await? {
                ticket = Some(t);
            }
            if i % 100 == 0 {
                debug!("  event {} | t={:.1}s", i, world.context.now_secs());
            }
        }

        ensure(world.stats().events_dispatched == self.fuzz_events as u64, || {
            "event count mismatch".to_string()
        })?;
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn place(world: &mut SimWorld, id: &str) -> Result<DispatchOutcome, SimError> {
    world
        .dispatch(LabEvent::PlaceEquipment { id: id.to_string(), x: 0.0, y: 0.0 })
        .await
}

async fn pour(world: &mut SimWorld, chemical: &str, target: &str, amount_ml: Option<f64>) -> Result<DispatchOutcome, SimError> {
    world
        .dispatch(LabEvent::DropChemical {
            chemical_id: chemical.to_string(),
            target: target.to_string(),
            amount_ml,
        })
        .await
}

/// Burette with NaOH; flask with HCl and indicator.
async fn setup_titration(world: &mut SimWorld) -> Result<(), SimError> {
    place(world, BURETTE).await?;
    place(world, CONICAL_FLASK).await?;
    pour(world, NAOH, BURETTE, Some(50.0)).await?;
    pour(world, HCL, CONICAL_FLASK, Some(25.0)).await?;
    pour(world, PHENOLPHTHALEIN, CONICAL_FLASK, Some(1.0)).await?;

    let steps = world.snapshot().await.completed_steps;
    ensure(steps == [1, 2, 3], || format!("setup completed steps {:?}", steps))
}

fn expect_completed(outcome: TaskOutcome) -> Result<chemlab_core::CycleRecord, SimError> {
    match outcome {
        TaskOutcome::Completed(record) => Ok(record),
        other => Err(SimError::Assertion(format!("titration ended with {:?}", other))),
    }
}

fn random_event(rng: &mut ChaCha8Rng, experiment: ExperimentKind, ticket: Option<TitrationTicket>) -> LabEvent {
    let equipment = experiment.equipment();
    let chemicals = experiment.chemicals();

    let equipment_id = |rng: &mut ChaCha8Rng| {
        if rng.gen_bool(0.05) {
            "bunsen_burner".to_string()
        } else {
            equipment[rng.gen_range(0..equipment.len())].id.to_string()
        }
    };

    match rng.gen_range(0..16) {
        0..=2 => LabEvent::PlaceEquipment {
            id: equipment_id(rng),
            x: rng.gen_range(0.0..800.0),
            y: rng.gen_range(0.0..600.0),
        },
        3 => LabEvent::RemoveEquipment { id: equipment_id(rng) },
        4..=6 => {
            let chemical_id = if rng.gen_bool(0.05) {
                "unobtainium".to_string()
            } else {
                chemicals[rng.gen_range(0..chemicals.len())].id.to_string()
            };
            let amount_ml = if rng.gen_bool(0.3) { None } else { Some(rng.gen_range(-5.0..60.0)) };
            LabEvent::DropChemical { chemical_id, target: equipment_id(rng), amount_ml }
        }
        7 => LabEvent::StartTitration,
        8 => LabEvent::StopTitration,
        9..=11 => match ticket {
            Some(ticket) => LabEvent::TitrationFrame { ticket },
            None => LabEvent::StartTitration,
        },
        12 => match ticket {
            Some(ticket) => LabEvent::DropTimer { ticket },
            None => LabEvent::StartStirring,
        },
        13 => {
            if rng.gen_bool(0.5) {
                LabEvent::StartStirring
            } else {
                LabEvent::StopStirring
            }
        }
        14 => {
            if rng.gen_bool(0.5) {
                LabEvent::NextStep
            } else {
                LabEvent::PreviousStep
            }
        }
        _ => {
            if rng.gen_bool(0.2) {
                let all = ExperimentKind::all();
                LabEvent::SelectExperiment { experiment: all[rng.gen_range(0..all.len())] }
            } else if rng.gen_bool(0.25) {
                LabEvent::Reset
            } else {
                LabEvent::StartTitration
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass() {
        let runner = ScenarioRunner::new(42).with_fuzz_events(200);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
            assert!(result.metrics.invariant_checks > 0);
        }
    }

    #[test]
    fn test_over_titration_metrics() {
        let result = ScenarioRunner::new(7).run(ScenarioId::OverTitration);
        assert!(result.passed);
        assert_eq!(result.metrics.cycles_completed, 2);
        assert!((result.metrics.final_volume_ml - 45.0).abs() < 1e-6);
        assert!(result.metrics.final_color_intensity > 1.0);
    }

    #[test]
    fn test_fast_config_still_passes() {
        let mut lab = LabConfig::default();
        lab.titration.cycle_duration_ms = 2000;
        lab.titration.settle_delay_ms = 0;
        let runner = ScenarioRunner::new(1).with_lab_config(lab).with_frame_rate(30.0);

        for scenario in [ScenarioId::StandardTitration, ScenarioId::InterruptedTitration] {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
        }
    }

    #[test]
    fn test_unusable_config_fails_fast() {
        let mut lab = LabConfig::default();
        lab.titration.drop_interval_ms = 0;
        let result = ScenarioRunner::new(1).with_lab_config(lab).run(ScenarioId::StandardTitration);
        assert!(!result.passed);
        assert_eq!(result.total_events, 0);
        assert!(result.failure_reason.unwrap().contains("drop_interval_ms"));

        let result = ScenarioRunner::new(1).with_frame_rate(f64::INFINITY).run(ScenarioId::StandardTitration);
        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("frame_rate_hz"));
    }

    #[test]
    fn test_same_seed_same_run() {
        let runner = ScenarioRunner::new(99).with_fuzz_events(300);
        let a = runner.run(ScenarioId::RandomClicks);
        let b = runner.run(ScenarioId::RandomClicks);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.final_time_secs, b.final_time_secs);
    }

    #[test]
    fn test_export_frames_follow_events() {
        let (result, export) = ScenarioRunner::new(3).run_with_export(ScenarioId::MissingApparatus);
        let export = export.unwrap();
        assert!(export.passed);
        assert_eq!(export.frames.len() as u64, result.total_events);
        assert_eq!(export.frames[0].label, "place_equipment");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_clicks_hold_invariants(seed in any::<u64>()) {
            let result = ScenarioRunner::new(seed).with_fuzz_events(250).run(ScenarioId::RandomClicks);
            prop_assert!(result.passed, "seed {} failed: {:?}", seed, result.failure_reason);
        }
    }
}
