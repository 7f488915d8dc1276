//! The Lab - single state object for one experiment run.
//!
//! Every input from the presentation layer is a [`LabEvent`] applied through
//! [`Lab::dispatch`]. The named operations (`place_equipment`,
//! `drop_chemical`, `start_titration`, ...) are the same transitions exposed
//! as methods.
//!
//! # Titration tickets
//!
//! A successful start hands out a [`TitrationTicket`] stamped with the
//! current generation. Stop and reset bump the generation, so frame and
//! drop-timer events still carrying an old ticket are ignored. This is the
//! cancellation point for every scheduled callback.

use crate::chemicals::{self, Chemical, HCL, PHENOLPHTHALEIN};
use crate::color::MixedColor;
use crate::config::LabConfig;
use crate::equipment::{self, BURETTE, CONICAL_FLASK};
use crate::error::LabWarning;
use crate::experiment::ExperimentKind;
use crate::mixture::{self, ChemicalQuantity, Position, Workbench};
use crate::notify::Notification;
use crate::reaction::{AcidBaseBalance, Measurement, ReactionEngine, ReactionResult};
use crate::steps::{StepCursor, StepTracker, StepTrigger};
use crate::titration::{Advance, CycleRecord, TitrationAnimator, TitrationFrame};

use chemlab_env::RunId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

// =============================================================================
// EVENTS
// =============================================================================

/// Handle to one started titration cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitrationTicket {
    generation: u64,
}

impl TitrationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Named inputs from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LabEvent {
    SelectExperiment { experiment: ExperimentKind },
    PlaceEquipment { id: String, x: f64, y: f64 },
    RemoveEquipment { id: String },
    /// `amount_ml: None` uses the chemical's default volume
    DropChemical { chemical_id: String, target: String, amount_ml: Option<f64> },
    StartTitration,
    StopTitration,
    TitrationFrame { ticket: TitrationTicket },
    DropTimer { ticket: TitrationTicket },
    StartStirring,
    StopStirring,
    NextStep,
    PreviousStep,
    Reset,
}

/// What a dispatched event did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// State changed.
    Applied,
    /// Invalid target, stale ticket or redundant request; no state change.
    Ignored,
    /// A titration cycle started.
    Started(TitrationTicket),
    /// A precondition failed; a warning notification was queued.
    Refused(LabWarning),
    /// The in-flight titration cycle closed.
    CycleCompleted(CycleRecord),
}

// =============================================================================
// OUTPUTS
// =============================================================================

/// An entry in the ordered results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultEntry {
    Reaction { equipment_id: String, result: ReactionResult },
    TitrationCycle { record: CycleRecord },
}

/// Render data for one placed piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentView {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub chemicals: Vec<ChemicalQuantity>,
    pub color: MixedColor,
    pub total_volume_ml: f64,
    /// Nominal capacity from the equipment registry
    pub capacity_ml: f64,
    pub fill_percent: f64,
}

/// Serializable view of the whole lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSnapshot {
    pub run_id: RunId,
    pub experiment: ExperimentKind,
    pub equipment: Vec<EquipmentView>,
    pub measurement: Measurement,
    pub titrating: bool,
    pub stirring: bool,
    pub completed_steps: Vec<u32>,
    pub completion_percentage: f64,
    pub cumulative_volume_ml: f64,
    pub cumulative_color_intensity: f64,
    pub drops_emitted: u64,
    pub result_count: usize,
}

// =============================================================================
// LAB
// =============================================================================

pub struct Lab {
    run_id: RunId,
    experiment: ExperimentKind,
    workbench: Workbench,
    engine: ReactionEngine,
    animator: TitrationAnimator,
    /// Bumped on every stop/reset; tickets from older generations are stale
    generation: u64,
    /// Base loaded in the burette when the current cycle started
    titrant: Option<&'static Chemical>,
    steps: StepTracker,
    cursor: StepCursor,
    results: Vec<ResultEntry>,
    notifications: Vec<Notification>,
    measurement: Measurement,
    stirring: bool,
    drops_emitted: u64,
}

impl Lab {
    pub fn new(config: LabConfig, run_id: RunId) -> Self {
        let total = config.experiment.procedure().len() as u32;
        Self {
            run_id,
            experiment: config.experiment,
            workbench: Workbench::new(),
            engine: ReactionEngine::default(),
            animator: TitrationAnimator::new(config.titration),
            generation: 0,
            titrant: None,
            steps: StepTracker::new(total),
            cursor: StepCursor::new(total),
            results: Vec::new(),
            notifications: Vec::new(),
            measurement: Measurement::default(),
            stirring: false,
            drops_emitted: 0,
        }
    }

    /// Applies one event at time `now`.
    pub fn dispatch(&mut self, event: LabEvent, now: Duration) -> DispatchOutcome {
        match event {
            LabEvent::SelectExperiment { experiment } => self.select_experiment(experiment),
            LabEvent::PlaceEquipment { id, x, y } => self.place_equipment(&id, x, y),
            LabEvent::RemoveEquipment { id } => self.remove_equipment(&id),
            LabEvent::DropChemical { chemical_id, target, amount_ml } => {
                self.drop_chemical(&chemical_id, &target, amount_ml)
            }
            LabEvent::StartTitration => match self.start_titration(now) {
                Ok(ticket) => DispatchOutcome::Started(ticket),
                Err(Some(warning)) => DispatchOutcome::Refused(warning),
                Err(None) => DispatchOutcome::Ignored,
            },
            LabEvent::StopTitration => self.stop_titration(),
            LabEvent::TitrationFrame { ticket } => self.titration_frame(ticket, now),
            LabEvent::DropTimer { ticket } => self.drop_timer(ticket),
            LabEvent::StartStirring => self.set_stirring(true),
            LabEvent::StopStirring => self.set_stirring(false),
            LabEvent::NextStep => self.move_cursor(true),
            LabEvent::PreviousStep => self.move_cursor(false),
            LabEvent::Reset => {
                self.reset_experiment();
                DispatchOutcome::Applied
            }
        }
    }

    // -------------------------------------------------------------------------
    // Equipment & chemicals
    // -------------------------------------------------------------------------

    pub fn place_equipment(&mut self, id: &str, x: f64, y: f64) -> DispatchOutcome {
        let Some(def) = equipment::find(self.experiment.equipment(), id) else {
            debug!(id, "ignoring unknown equipment");
            return DispatchOutcome::Ignored;
        };

        if self.workbench.place(id, Position { x, y }) {
            self.notify(Notification::info(format!("{} placed on the workbench", def.name)));
            if id == BURETTE {
                self.trigger(StepTrigger::BurettePlaced);
            }
        }
        DispatchOutcome::Applied
    }

    pub fn remove_equipment(&mut self, id: &str) -> DispatchOutcome {
        if self.animator.is_titrating() && (id == BURETTE || id == CONICAL_FLASK) {
            self.stop_titration();
        }
        match self.workbench.remove(id) {
            Some(_) => DispatchOutcome::Applied,
            None => DispatchOutcome::Ignored,
        }
    }

    /// Drops a chemical into a container on the bench.
    ///
    /// Unknown chemicals, non-container targets and equipment that is not on
    /// the bench are silently ignored.
    pub fn drop_chemical(&mut self, chemical_id: &str, target: &str, amount_ml: Option<f64>) -> DispatchOutcome {
        let registry = self.experiment.chemicals();
        let Some(chemical) = chemicals::find(registry, chemical_id) else {
            debug!(chemical_id, "ignoring unknown chemical");
            return DispatchOutcome::Ignored;
        };
        let Some(def) = equipment::find(self.experiment.equipment(), target) else {
            debug!(target, "ignoring drop on unknown equipment");
            return DispatchOutcome::Ignored;
        };
        if !def.is_container() {
            debug!(target, "ignoring drop on non-container");
            return DispatchOutcome::Ignored;
        }

        let amount = amount_ml.unwrap_or(chemical.default_volume_ml);
        if !amount.is_finite() || amount <= 0.0 {
            debug!(amount, "ignoring non-positive amount");
            return DispatchOutcome::Ignored;
        }
        if !self.workbench.add_chemical(target, chemical, amount) {
            debug!(target, "ignoring drop on equipment not on the bench");
            return DispatchOutcome::Ignored;
        }

        self.notify(Notification::info(format!(
            "Added {:.1} mL of {} to the {}",
            amount, chemical.name, def.name
        )));

        if target == CONICAL_FLASK {
            match chemical.id {
                HCL => self.trigger(StepTrigger::HclAddedToFlask),
                PHENOLPHTHALEIN => self.trigger(StepTrigger::IndicatorAddedToFlask),
                _ => {}
            }
        }

        self.evaluate_container(target);
        DispatchOutcome::Applied
    }

    fn evaluate_container(&mut self, equipment_id: &str) {
        let registry = self.experiment.chemicals();
        let Some(instance) = self.workbench.get(equipment_id) else {
            return;
        };

        if instance.chemicals.len() >= 2 {
            if let Some(result) = self.engine.evaluate(&instance.chemicals, registry) {
                self.measurement = result.measurement;
                self.notify(Notification::success(format!(
                    "Reaction observed: {} ({})",
                    result.reaction_type, result.equation
                )));
                self.record(ResultEntry::Reaction {
                    equipment_id: equipment_id.to_string(),
                    result,
                });
                return;
            }
        }

        let balance = AcidBaseBalance::of(&instance.chemicals, registry);
        let (ph, molarity) = balance.ph_and_molarity();
        self.measurement = Measurement {
            volume_ml: balance.total_volume_ml,
            ph,
            molarity,
            moles: molarity * balance.total_volume_ml / 1000.0,
            temperature_c: self.measurement.temperature_c,
        };
    }

    // -------------------------------------------------------------------------
    // Titration
    // -------------------------------------------------------------------------

    /// The base loaded in the burette, if the apparatus is ready.
    pub fn check_titration_ready(&self) -> Result<&'static Chemical, LabWarning> {
        let registry = self.experiment.chemicals();
        let burette = self.workbench.get(BURETTE);
        let flask = self.workbench.get(CONICAL_FLASK);

        let (Some(burette), Some(_)) = (burette, flask) else {
            return Err(LabWarning::MissingApparatus);
        };

        burette
            .chemicals
            .iter()
            .filter_map(|q| chemicals::find(registry, &q.chemical_id))
            .find(|c| c.is_base())
            .ok_or(LabWarning::BuretteEmpty)
    }

    /// Idle -> Titrating.
    ///
    /// `Err(None)` means a cycle is already in flight (no-op);
    /// `Err(Some(_))` is a failed precondition, also queued as a warning.
    pub fn start_titration(&mut self, now: Duration) -> Result<TitrationTicket, Option<LabWarning>> {
        if self.animator.is_titrating() {
            debug!("titration already running");
            return Err(None);
        }

        let titrant = match self.check_titration_ready() {
            Ok(titrant) => titrant,
            Err(warning) => {
                self.notify(warning.clone().into());
                return Err(Some(warning));
            }
        };

        self.animator.begin(now, titrant.concentration_molar);
        self.titrant = Some(titrant);
        self.generation += 1;
        let ticket = TitrationTicket { generation: self.generation };

        info!(
            generation = self.generation,
            volume_ml = self.animator.cumulative_volume_ml(),
            "titration started"
        );
        self.notify(Notification::info("Titration started: NaOH is flowing into the flask"));
        self.trigger(StepTrigger::TitrationStarted);
        if let Some(frame) = self.animator.last_frame().copied() {
            self.apply_frame(&frame);
        }

        Ok(ticket)
    }

    /// Titrating -> Idle, discarding the in-flight frame. Idempotent.
    pub fn stop_titration(&mut self) -> DispatchOutcome {
        self.generation += 1;
        if !self.animator.cancel() {
            return DispatchOutcome::Ignored;
        }
        self.titrant = None;
        self.measurement.volume_ml = self.animator.cumulative_volume_ml();
        info!(volume_ml = self.measurement.volume_ml, "titration stopped");
        self.notify(Notification::info("Titration stopped"));
        DispatchOutcome::Applied
    }

    /// Ticket of the cycle in flight, if any.
    pub fn current_ticket(&self) -> Option<TitrationTicket> {
        self.animator
            .is_titrating()
            .then_some(TitrationTicket { generation: self.generation })
    }

    fn is_current(&self, ticket: TitrationTicket) -> bool {
        self.current_ticket() == Some(ticket)
    }

    /// Advances the in-flight cycle to `now`.
    pub fn titration_frame(&mut self, ticket: TitrationTicket, now: Duration) -> DispatchOutcome {
        if !self.is_current(ticket) {
            return DispatchOutcome::Ignored;
        }

        match self.animator.advance(now) {
            Advance::Idle => DispatchOutcome::Ignored,
            Advance::Settling(_) => DispatchOutcome::Applied,
            Advance::Frame(frame) => {
                self.apply_frame(&frame);
                DispatchOutcome::Applied
            }
            Advance::Completed(record) => {
                self.complete_cycle(&record);
                DispatchOutcome::CycleCompleted(record)
            }
        }
    }

    fn apply_frame(&mut self, frame: &TitrationFrame) {
        self.measurement = Measurement {
            volume_ml: frame.volume_ml,
            ph: frame.ph,
            molarity: frame.molarity,
            moles: frame.molarity * frame.volume_ml / 1000.0,
            temperature_c: self.measurement.temperature_c,
        };
        if frame.endpoint_reached {
            self.trigger(StepTrigger::EndpointReached);
        }
    }

    fn complete_cycle(&mut self, record: &CycleRecord) {
        if let Some(titrant) = self.titrant.take() {
            self.workbench.add_chemical(CONICAL_FLASK, titrant, record.delivered_ml);
        }

        info!(
            cycle = record.cycle,
            volume_ml = record.final_volume_ml,
            over_titration = record.over_titration,
            "titration cycle committed"
        );

        if record.over_titration {
            self.notify(Notification::warning(
                "Over-titration: excess base added, the solution turned deep pink",
            ));
        } else {
            self.notify(Notification::success(format!(
                "Titration cycle {} complete: {:.1} mL delivered",
                record.cycle, record.delivered_ml
            )));
        }

        self.record(ResultEntry::TitrationCycle { record: record.clone() });
    }

    /// One tick of the 800 ms drop emitter.
    pub fn drop_timer(&mut self, ticket: TitrationTicket) -> DispatchOutcome {
        if !self.is_current(ticket) || self.animator.is_settling() {
            return DispatchOutcome::Ignored;
        }
        self.drops_emitted += 1;
        DispatchOutcome::Applied
    }

    // -------------------------------------------------------------------------
    // Stirring, steps, reset
    // -------------------------------------------------------------------------

    fn set_stirring(&mut self, on: bool) -> DispatchOutcome {
        if self.stirring == on {
            return DispatchOutcome::Ignored;
        }
        self.stirring = on;
        self.notify(Notification::info(if on { "Stirring started" } else { "Stirring stopped" }));
        DispatchOutcome::Applied
    }

    pub fn start_stirring(&mut self) -> DispatchOutcome {
        self.set_stirring(true)
    }

    pub fn stop_stirring(&mut self) -> DispatchOutcome {
        self.set_stirring(false)
    }

    fn move_cursor(&mut self, forward: bool) -> DispatchOutcome {
        if self.experiment.tracks_completion() {
            let warning = LabWarning::StepsTrackedAutomatically(self.experiment.title().to_string());
            self.notify(warning.clone().into());
            return DispatchOutcome::Refused(warning);
        }

        let moved = if forward { self.cursor.advance() } else { self.cursor.retreat() };
        if !moved {
            return DispatchOutcome::Ignored;
        }

        let current = self.cursor.current() as usize;
        let message = match current.checked_sub(1).and_then(|i| self.experiment.procedure().get(i)) {
            Some(step) => format!("Step {}: {}", step.number, step.title),
            None => "Back to the start".to_string(),
        };
        self.notify(Notification::info(message));
        DispatchOutcome::Applied
    }

    /// Clears everything back to a fresh run of the current experiment.
    pub fn reset_experiment(&mut self) {
        self.generation += 1;
        self.workbench.clear();
        self.animator.reset();
        self.titrant = None;
        self.steps.reset();
        self.cursor.reset();
        self.results.clear();
        self.notifications.clear();
        self.measurement = Measurement::default();
        self.stirring = false;
        self.drops_emitted = 0;
        info!(experiment = self.experiment.name(), "experiment reset");
        self.notify(Notification::info("Experiment reset"));
    }

    fn select_experiment(&mut self, experiment: ExperimentKind) -> DispatchOutcome {
        if experiment == self.experiment {
            return DispatchOutcome::Ignored;
        }
        let total = experiment.procedure().len() as u32;
        self.experiment = experiment;
        self.steps = StepTracker::new(total);
        self.cursor = StepCursor::new(total);
        self.reset_experiment();
        DispatchOutcome::Applied
    }

    fn trigger(&mut self, trigger: StepTrigger) {
        if !self.experiment.tracks_completion() {
            return;
        }
        if let Some(note) = self.steps.observe(trigger) {
            self.notify(note);
        }
    }

    fn record(&mut self, entry: ResultEntry) {
        self.results.push(entry);
        self.trigger(StepTrigger::ResultRecorded);
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn experiment(&self) -> ExperimentKind {
        self.experiment
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    pub fn measurement(&self) -> Measurement {
        self.measurement
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn is_titrating(&self) -> bool {
        self.animator.is_titrating()
    }

    pub fn is_stirring(&self) -> bool {
        self.stirring
    }

    pub fn drops_emitted(&self) -> u64 {
        self.drops_emitted
    }

    pub fn animator(&self) -> &TitrationAnimator {
        &self.animator
    }

    pub fn cumulative_volume_ml(&self) -> f64 {
        self.animator.cumulative_volume_ml()
    }

    pub fn cumulative_color_intensity(&self) -> f64 {
        self.animator.cumulative_color_intensity()
    }

    /// Completed step numbers. For cursor experiments, every step up to the cursor.
    pub fn completed_steps(&self) -> BTreeSet<u32> {
        if self.experiment.tracks_completion() {
            self.steps.completed().clone()
        } else {
            (1..=self.cursor.current()).collect()
        }
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.experiment.tracks_completion() {
            self.steps.completion_percentage()
        } else {
            self.cursor.completion_percentage()
        }
    }

    /// Drains queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Mixed color of a placed container, including titrant still in flight.
    pub fn mixed_color(&self, equipment_id: &str) -> MixedColor {
        self.equipment_view(equipment_id)
            .map(|v| v.color)
            .unwrap_or(MixedColor::Transparent)
    }

    /// Render data for one placed piece of equipment.
    pub fn equipment_view(&self, equipment_id: &str) -> Option<EquipmentView> {
        let instance = self.workbench.get(equipment_id)?;
        let mut contents = instance.chemicals.clone();

        if instance.id == CONICAL_FLASK {
            if let (Some(titrant), Some(frame)) = (self.titrant, self.animator.last_frame()) {
                let in_flight = frame.progress * self.animator.config().volume_per_cycle_ml;
                contents.push(ChemicalQuantity::new(titrant, in_flight));
            }
        }

        let total = mixture::total_volume_ml(&contents);
        let def = equipment::find(self.experiment.equipment(), &instance.id);
        let name = def.map(|e| e.name.to_string()).unwrap_or_else(|| instance.id.clone());

        Some(EquipmentView {
            id: instance.id.clone(),
            name,
            position: instance.position,
            color: mixture::mixed_color(&contents, self.experiment.chemicals(), self.animator.color_progress()),
            chemicals: instance.chemicals.clone(),
            total_volume_ml: total,
            capacity_ml: def.map_or(0.0, |e| e.capacity_ml),
            fill_percent: mixture::solution_height_percent(total),
        })
    }

    /// Render data for every placed piece of equipment, in placement order.
    pub fn equipment_views(&self) -> Vec<EquipmentView> {
        self.workbench
            .instances()
            .iter()
            .filter_map(|i| self.equipment_view(&i.id))
            .collect()
    }

    pub fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            run_id: self.run_id,
            experiment: self.experiment,
            equipment: self.equipment_views(),
            measurement: self.measurement,
            titrating: self.is_titrating(),
            stirring: self.stirring,
            completed_steps: self.completed_steps().into_iter().collect(),
            completion_percentage: self.completion_percentage(),
            cumulative_volume_ml: self.cumulative_volume_ml(),
            cumulative_color_intensity: self.cumulative_color_intensity(),
            drops_emitted: self.drops_emitted,
            result_count: self.results.len(),
        }
    }
}
