//! Invariant checker - the ground truth every scenario is judged against.
//!
//! After each event the runner hands the lab to [`InvariantChecker::check`].
//! A violation fails the scenario with the first broken rule.

use chemlab_core::Lab;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// A broken lab invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("equipment {0} placed more than once")]
    DuplicateEquipment(String),

    #[error("cumulative volume {volume_ml} mL fell below the initial reading {initial_ml} mL")]
    VolumeBelowInitial { volume_ml: f64, initial_ml: f64 },

    #[error("cumulative color intensity {0} is negative")]
    NegativeIntensity(f64),

    #[error("pH {0} outside [0, 14]")]
    PhOutOfRange(f64),

    #[error("step {0} was un-completed without a reset")]
    StepLost(u32),

    #[error("completion percentage {0} outside [0, 1]")]
    CompletionOutOfRange(f64),
}

/// Checks lab state between events.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Completed steps seen at the previous check
    previous_steps: BTreeSet<u32>,
    checks: u64,
}

impl InvariantChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Forget step history. Call after a reset or experiment switch.
    pub fn note_reset(&mut self) {
        self.previous_steps.clear();
    }

    pub fn check(&mut self, lab: &Lab) -> Result<(), InvariantViolation> {
        self.checks += 1;

        let mut seen = HashSet::new();
        for instance in lab.workbench().instances() {
            if !seen.insert(instance.id.as_str()) {
                return Err(InvariantViolation::DuplicateEquipment(instance.id.clone()));
            }
        }

        let initial_ml = lab.animator().config().initial_volume_ml;
        let volume_ml = lab.cumulative_volume_ml();
        if volume_ml < initial_ml {
            return Err(InvariantViolation::VolumeBelowInitial { volume_ml, initial_ml });
        }

        let intensity = lab.cumulative_color_intensity();
        if intensity < 0.0 {
            return Err(InvariantViolation::NegativeIntensity(intensity));
        }

        let ph = lab.measurement().ph;
        if !(0.0..=14.0).contains(&ph) {
            return Err(InvariantViolation::PhOutOfRange(ph));
        }

        let completion = lab.completion_percentage();
        if !(0.0..=1.0).contains(&completion) {
            return Err(InvariantViolation::CompletionOutOfRange(completion));
        }

        // the cursor experiments may step backwards
        let steps = lab.completed_steps();
        if lab.experiment().tracks_completion() {
            if let Some(lost) = self.previous_steps.difference(&steps).next() {
                return Err(InvariantViolation::StepLost(*lost));
            }
        }
        self.previous_steps = steps;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemlab_core::chemicals::HCL;
    use chemlab_core::equipment::BEAKER;
    use chemlab_core::LabConfig;
    use chemlab_env::RunId;

    #[test]
    fn test_fresh_lab_holds() {
        let lab = Lab::new(LabConfig::default(), RunId::from_seed(0));
        let mut checker = InvariantChecker::new();
        assert!(checker.check(&lab).is_ok());
        assert_eq!(checker.checks(), 1);
    }

    #[test]
    fn test_filling_past_capacity_holds() {
        let mut lab = Lab::new(LabConfig::default(), RunId::from_seed(0));
        lab.place_equipment(BEAKER, 0.0, 0.0);
        for _ in 0..20 {
            lab.drop_chemical(HCL, BEAKER, Some(25.0));
        }
        let view = lab.equipment_view(BEAKER).unwrap();
        assert!(view.total_volume_ml > view.capacity_ml);
        assert!(InvariantChecker::new().check(&lab).is_ok());
    }

    #[test]
    fn test_reset_forgets_steps() {
        let mut lab = Lab::new(LabConfig::default(), RunId::from_seed(0));
        let mut checker = InvariantChecker::new();
        lab.place_equipment(chemlab_core::equipment::BURETTE, 0.0, 0.0);
        checker.check(&lab).unwrap();

        lab.reset_experiment();
        assert_eq!(checker.check(&lab), Err(InvariantViolation::StepLost(1)));

        checker.note_reset();
        assert!(checker.check(&lab).is_ok());
    }
}
