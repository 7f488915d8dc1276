//! Scripted lab sessions for deterministic testing.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// LAB-001: Set up and run one full titration cycle
    StandardTitration,

    /// LAB-002: Two back-to-back cycles push past the endpoint
    OverTitration,

    /// LAB-003: Cancel mid-cycle, then run a clean cycle
    InterruptedTitration,

    /// LAB-004: Start refused until the apparatus is ready
    MissingApparatus,

    /// LAB-005: Reset after several cycles
    ResetAfterCycles,

    /// LAB-006: Aspirin synthesis with the step cursor
    AspirinSynthesis,

    /// LAB-007: Iron thiocyanate equilibrium
    Equilibrium,

    /// LAB-008: Seeded random clicks, invariants after every event
    RandomClicks,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::StandardTitration,
            ScenarioId::OverTitration,
            ScenarioId::InterruptedTitration,
            ScenarioId::MissingApparatus,
            ScenarioId::ResetAfterCycles,
            ScenarioId::AspirinSynthesis,
            ScenarioId::Equilibrium,
            ScenarioId::RandomClicks,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::StandardTitration => "standard_titration",
            ScenarioId::OverTitration => "over_titration",
            ScenarioId::InterruptedTitration => "interrupted_titration",
            ScenarioId::MissingApparatus => "missing_apparatus",
            ScenarioId::ResetAfterCycles => "reset_after_cycles",
            ScenarioId::AspirinSynthesis => "aspirin_synthesis",
            ScenarioId::Equilibrium => "equilibrium",
            ScenarioId::RandomClicks => "random_clicks",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::StandardTitration => "Burette, flask, HCl and indicator; one cycle reaches 25 mL with all six steps done",
            ScenarioId::OverTitration => "Two cycles: volume grows by exactly 20 mL and the second cycle is flagged over-titrated",
            ScenarioId::InterruptedTitration => "Cancel at 3 s keeps the committed values, a fresh start completes normally",
            ScenarioId::MissingApparatus => "Start is refused without the flask, then without base in the burette",
            ScenarioId::ResetAfterCycles => "Reset after two cycles restores 5 mL, zero intensity and no completed steps",
            ScenarioId::AspirinSynthesis => "Esterification of salicylic acid, cursor walked through every step",
            ScenarioId::Equilibrium => "Fe(NO3)3 + KSCN turns blood red and records a complex formation",
            ScenarioId::RandomClicks => "500 seeded random events including stale frames and resets",
        }
    }

    /// Returns true if the scenario is driven by random input.
    pub fn is_fuzz(&self) -> bool {
        matches!(self, ScenarioId::RandomClicks)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard_titration" | "standard" | "lab-001" => Ok(ScenarioId::StandardTitration),
            "over_titration" | "overtitration" | "lab-002" => Ok(ScenarioId::OverTitration),
            "interrupted_titration" | "interrupted" | "lab-003" => Ok(ScenarioId::InterruptedTitration),
            "missing_apparatus" | "lab-004" => Ok(ScenarioId::MissingApparatus),
            "reset_after_cycles" | "reset" | "lab-005" => Ok(ScenarioId::ResetAfterCycles),
            "aspirin_synthesis" | "aspirin" | "lab-006" => Ok(ScenarioId::AspirinSynthesis),
            "equilibrium" | "lab-007" => Ok(ScenarioId::Equilibrium),
            "random_clicks" | "random" | "fuzz" | "lab-008" => Ok(ScenarioId::RandomClicks),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
            assert_eq!(id.to_string(), id.name());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("LAB-003".parse::<ScenarioId>(), Ok(ScenarioId::InterruptedTitration));
        assert_eq!("fuzz".parse::<ScenarioId>(), Ok(ScenarioId::RandomClicks));
        assert!("time_warp".parse::<ScenarioId>().is_err());
    }
}
