//! Step Tracker
//!
//! The titration tracks completion independently of the order in which
//! students work: each trigger maps to a fixed step number and the set of
//! completed steps only ever grows until the experiment is reset.
//! The other experiments walk a plain linear cursor.

use crate::notify::Notification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// External events that complete titration steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTrigger {
    BurettePlaced,
    HclAddedToFlask,
    IndicatorAddedToFlask,
    TitrationStarted,
    EndpointReached,
    ResultRecorded,
}

/// Trigger -> (step number, completion message) for the Acid-Base Titration.
static TITRATION_STEP_TABLE: &[(StepTrigger, u32, &str)] = &[
    (StepTrigger::BurettePlaced, 1, "Burette set up"),
    (StepTrigger::HclAddedToFlask, 2, "HCl added to the conical flask"),
    (StepTrigger::IndicatorAddedToFlask, 3, "Phenolphthalein indicator added"),
    (StepTrigger::TitrationStarted, 4, "Titration started"),
    (StepTrigger::EndpointReached, 5, "Endpoint identified: the solution turned pink"),
    (StepTrigger::ResultRecorded, 6, "Result recorded"),
];

impl StepTrigger {
    /// Step number and message this trigger completes.
    pub fn titration_step(&self) -> (u32, &'static str) {
        TITRATION_STEP_TABLE
            .iter()
            .find(|(trigger, _, _)| trigger == self)
            .map(|(_, step, msg)| (*step, *msg))
            .unwrap_or((0, ""))
    }
}

/// Set of completed step numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepTracker {
    completed: BTreeSet<u32>,
    total_steps: u32,
}

impl StepTracker {
    pub fn new(total_steps: u32) -> Self {
        Self {
            completed: BTreeSet::new(),
            total_steps,
        }
    }

    /// Inserts `step` if not already present.
    ///
    /// Returns a notification only on first completion.
    pub fn mark_completed(&mut self, step: u32, message: &str) -> Option<Notification> {
        if !self.completed.insert(step) {
            return None;
        }
        tracing::debug!(step, completed = self.completed.len(), "step completed");
        Some(Notification::success(format!("Step {} completed: {}", step, message)))
    }

    /// Applies a titration trigger through the lookup table.
    pub fn observe(&mut self, trigger: StepTrigger) -> Option<Notification> {
        let (step, message) = trigger.titration_step();
        self.mark_completed(step, message)
    }

    pub fn is_completed(&self, step: u32) -> bool {
        self.completed.contains(&step)
    }

    pub fn completed(&self) -> &BTreeSet<u32> {
        &self.completed
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Completed share in [0, 1].
    pub fn completion_percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.completed.len() as f64 / self.total_steps as f64
    }

    pub fn reset(&mut self) {
        self.completed.clear();
    }
}

/// Linear step cursor for experiments without independent tracking.
///
/// `current` is the number of steps done; 0 means not started.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepCursor {
    current: u32,
    total_steps: u32,
}

impl StepCursor {
    pub fn new(total_steps: u32) -> Self {
        Self {
            current: 0,
            total_steps,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Moves forward one step; returns false at the end.
    pub fn advance(&mut self) -> bool {
        if self.current >= self.total_steps {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves back one step; returns false at the start.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.total_steps
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.current as f64 / self.total_steps as f64
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}
