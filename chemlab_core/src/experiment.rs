//! Experiment catalogue.

use crate::chemicals::{self, Chemical};
use crate::equipment::{self, Equipment};
use serde::{Deserialize, Serialize};

/// One titled step of an experiment procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureStep {
    /// 1-based step number
    pub number: u32,
    pub title: &'static str,
    pub instruction: &'static str,
}

const fn step(number: u32, title: &'static str, instruction: &'static str) -> ProcedureStep {
    ProcedureStep { number, title, instruction }
}

static TITRATION_PROCEDURE: &[ProcedureStep] = &[
    step(1, "Set up the burette", "Place the burette on the workbench and fill it with 0.1 M NaOH."),
    step(2, "Add the analyte", "Transfer 25 mL of 0.1 M HCl into the conical flask."),
    step(3, "Add the indicator", "Add two to three drops of phenolphthalein to the flask."),
    step(4, "Start the titration", "Open the burette stopcock and add NaOH while swirling."),
    step(5, "Identify the endpoint", "Stop when a faint pink color persists for 30 seconds."),
    step(6, "Record the result", "Record the volume of NaOH used and compute the molarity."),
];

static ASPIRIN_PROCEDURE: &[ProcedureStep] = &[
    step(1, "Measure salicylic acid", "Weigh 2.0 g of salicylic acid into the conical flask."),
    step(2, "Add acetic anhydride", "Add 5 mL of acetic anhydride to the flask."),
    step(3, "Add the catalyst", "Add 5 drops of 85% phosphoric acid."),
    step(4, "Heat the mixture", "Heat in a water bath at 75 °C for 15 minutes while stirring."),
    step(5, "Crystallize and filter", "Cool in ice water and collect the crystals by vacuum filtration."),
];

static EQUILIBRIUM_PROCEDURE: &[ProcedureStep] = &[
    step(1, "Prepare the iron solution", "Add 10 mL of 0.1 M Fe(NO₃)₃ to the test tube."),
    step(2, "Add thiocyanate", "Add 10 mL of 0.1 M KSCN and observe the color."),
    step(3, "Observe the complex", "Note the blood-red FeSCN²⁺ complex."),
    step(4, "Disturb the equilibrium", "Dilute with distilled water or warm on the hot plate."),
    step(5, "Record observations", "Explain the color change with Le Chatelier's principle."),
];

/// The experiments offered by the lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    /// Fully step-tracked HCl/NaOH titration
    #[default]
    AcidBaseTitration,
    AspirinSynthesis,
    ChemicalEquilibrium,
}

impl ExperimentKind {
    /// Returns all experiments.
    pub fn all() -> Vec<ExperimentKind> {
        vec![
            ExperimentKind::AcidBaseTitration,
            ExperimentKind::AspirinSynthesis,
            ExperimentKind::ChemicalEquilibrium,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExperimentKind::AcidBaseTitration => "acid_base_titration",
            ExperimentKind::AspirinSynthesis => "aspirin_synthesis",
            ExperimentKind::ChemicalEquilibrium => "chemical_equilibrium",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExperimentKind::AcidBaseTitration => "Acid-Base Titration",
            ExperimentKind::AspirinSynthesis => "Aspirin Synthesis",
            ExperimentKind::ChemicalEquilibrium => "Chemical Equilibrium",
        }
    }

    pub fn chemicals(&self) -> &'static [Chemical] {
        match self {
            ExperimentKind::AcidBaseTitration => chemicals::TITRATION_CHEMICALS,
            ExperimentKind::AspirinSynthesis => chemicals::ASPIRIN_CHEMICALS,
            ExperimentKind::ChemicalEquilibrium => chemicals::EQUILIBRIUM_CHEMICALS,
        }
    }

    pub fn equipment(&self) -> &'static [Equipment] {
        match self {
            ExperimentKind::AcidBaseTitration => equipment::TITRATION_EQUIPMENT,
            ExperimentKind::AspirinSynthesis => equipment::ASPIRIN_EQUIPMENT,
            ExperimentKind::ChemicalEquilibrium => equipment::EQUILIBRIUM_EQUIPMENT,
        }
    }

    pub fn procedure(&self) -> &'static [ProcedureStep] {
        match self {
            ExperimentKind::AcidBaseTitration => TITRATION_PROCEDURE,
            ExperimentKind::AspirinSynthesis => ASPIRIN_PROCEDURE,
            ExperimentKind::ChemicalEquilibrium => EQUILIBRIUM_PROCEDURE,
        }
    }

    /// Only the titration tracks step completion independently of the cursor.
    pub fn tracks_completion(&self) -> bool {
        matches!(self, ExperimentKind::AcidBaseTitration)
    }
}

impl std::fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl std::str::FromStr for ExperimentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "acid_base_titration" | "titration" => Ok(ExperimentKind::AcidBaseTitration),
            "aspirin_synthesis" | "aspirin" => Ok(ExperimentKind::AspirinSynthesis),
            "chemical_equilibrium" | "equilibrium" => Ok(ExperimentKind::ChemicalEquilibrium),
            _ => Err(format!("Unknown experiment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedures_are_numbered_from_one() {
        for kind in ExperimentKind::all() {
            for (i, step) in kind.procedure().iter().enumerate() {
                assert_eq!(step.number as usize, i + 1, "{}", kind.name());
            }
        }
    }

    #[test]
    fn test_parse_roundtrip_names() {
        for kind in ExperimentKind::all() {
            assert_eq!(kind.name().parse::<ExperimentKind>().unwrap(), kind);
        }
        assert!("alchemy".parse::<ExperimentKind>().is_err());
    }

    #[test]
    fn test_titration_has_six_steps() {
        assert_eq!(ExperimentKind::AcidBaseTitration.procedure().len(), 6);
        assert!(ExperimentKind::AcidBaseTitration.tracks_completion());
        assert!(!ExperimentKind::AspirinSynthesis.tracks_completion());
    }
}
