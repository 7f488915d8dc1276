//! Reaction Engine
//!
//! Maps the chemical set of a mixture to a [`ReactionResult`]. Rules are a
//! declarative table checked in priority order. The arithmetic is the
//! classroom approximation: strong acid/base only, no activity
//! coefficients, authored thermodynamic constants.

use crate::chemicals::{self, Chemical, ACETIC_ANHYDRIDE, IRON_NITRATE, POTASSIUM_THIOCYANATE, SALICYLIC_ACID};
use crate::mixture::{self, ChemicalQuantity};
use serde::{Deserialize, Serialize};

/// pH of pure water at 25 °C.
pub const NEUTRAL_PH: f64 = 7.0;

/// Ambient bench temperature.
pub const AMBIENT_TEMPERATURE_C: f64 = 25.0;

/// Specific heat of dilute aqueous solution (J/g·K).
const SPECIFIC_HEAT_J_PER_G_K: f64 = 4.184;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Measurement snapshot shown on the lab's readout panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub volume_ml: f64,
    pub ph: f64,
    pub molarity: f64,
    pub moles: f64,
    pub temperature_c: f64,
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            volume_ml: 0.0,
            ph: NEUTRAL_PH,
            molarity: 0.0,
            moles: 0.0,
            temperature_c: AMBIENT_TEMPERATURE_C,
        }
    }
}

/// Authored thermodynamic constants for a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermodynamics {
    pub delta_h_kj_mol: f64,
    pub delta_g_kj_mol: f64,
    pub equilibrium_constant: f64,
}

/// Outcome of a fired reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionResult {
    pub reaction_type: String,
    pub equation: String,
    pub mechanism: Vec<String>,
    pub yield_percent: f64,
    pub measurement: Measurement,
    pub thermodynamics: Thermodynamics,
}

// =============================================================================
// RULES
// =============================================================================

/// What makes a rule fire.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any acid-role and any base-role chemical together.
    AcidAndBase,
    /// Every listed chemical present.
    AllOf(&'static [&'static str]),
}

/// A reaction the engine knows about.
#[derive(Debug, Clone, Copy)]
pub struct ReactionRule {
    pub reaction_type: &'static str,
    pub trigger: Trigger,
    pub equation: &'static str,
    pub mechanism: &'static [&'static str],
    pub yield_percent: f64,
    pub thermodynamics: Thermodynamics,
}

pub static REACTION_RULES: &[ReactionRule] = &[
    ReactionRule {
        reaction_type: "Neutralization",
        trigger: Trigger::AcidAndBase,
        equation: "HCl + NaOH → NaCl + H₂O",
        mechanism: &[
            "HCl dissociates completely: HCl → H⁺ + Cl⁻",
            "NaOH dissociates completely: NaOH → Na⁺ + OH⁻",
            "H⁺ and OH⁻ combine to form water: H⁺ + OH⁻ → H₂O",
            "Na⁺ and Cl⁻ remain as spectator ions (NaCl in solution)",
        ],
        yield_percent: 100.0,
        thermodynamics: Thermodynamics {
            delta_h_kj_mol: -57.3,
            delta_g_kj_mol: -79.9,
            equilibrium_constant: 1.0e14,
        },
    },
    ReactionRule {
        reaction_type: "Esterification",
        trigger: Trigger::AllOf(&[SALICYLIC_ACID, ACETIC_ANHYDRIDE]),
        equation: "C₇H₆O₃ + (CH₃CO)₂O → C₉H₈O₄ + CH₃COOH",
        mechanism: &[
            "Phosphoric acid protonates a carbonyl oxygen of acetic anhydride",
            "The phenolic -OH of salicylic acid attacks the activated carbonyl",
            "The tetrahedral intermediate collapses, expelling acetic acid",
            "Deprotonation yields acetylsalicylic acid (aspirin)",
        ],
        yield_percent: 95.0,
        thermodynamics: Thermodynamics {
            delta_h_kj_mol: -30.2,
            delta_g_kj_mol: -25.5,
            equilibrium_constant: 3.0e4,
        },
    },
    ReactionRule {
        reaction_type: "Complex Formation",
        trigger: Trigger::AllOf(&[IRON_NITRATE, POTASSIUM_THIOCYANATE]),
        equation: "Fe³⁺ + SCN⁻ ⇌ FeSCN²⁺",
        mechanism: &[
            "Fe(NO₃)₃ and KSCN dissociate in water",
            "SCN⁻ displaces a water ligand on hydrated Fe³⁺",
            "The blood-red FeSCN²⁺ complex forms in dynamic equilibrium",
        ],
        yield_percent: 100.0,
        thermodynamics: Thermodynamics {
            delta_h_kj_mol: -11.0,
            delta_g_kj_mol: -12.2,
            equilibrium_constant: 138.0,
        },
    },
];

// =============================================================================
// ARITHMETIC
// =============================================================================

/// Acid and base content of a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AcidBaseBalance {
    pub acid_moles: f64,
    pub base_moles: f64,
    pub total_volume_ml: f64,
}

impl AcidBaseBalance {
    pub fn of(mixture: &[ChemicalQuantity], registry: &[Chemical]) -> Self {
        let mut balance = Self {
            total_volume_ml: mixture::total_volume_ml(mixture),
            ..Default::default()
        };

        for q in mixture {
            if let Some(c) = chemicals::find(registry, &q.chemical_id) {
                let moles = moles_of(c, q.amount_ml);
                if c.is_acid() {
                    balance.acid_moles += moles;
                } else if c.is_base() {
                    balance.base_moles += moles;
                }
            }
        }

        balance
    }

    /// Moles neutralized (the limiting amount).
    pub fn reacted_moles(&self) -> f64 {
        self.acid_moles.min(self.base_moles)
    }

    /// Returns `(ph, molarity)` of the unreacted excess.
    ///
    /// Zero total volume reads as neutral with zero molarity.
    pub fn ph_and_molarity(&self) -> (f64, f64) {
        if self.total_volume_ml <= 0.0 {
            return (NEUTRAL_PH, 0.0);
        }

        let litres = self.total_volume_ml / 1000.0;
        let excess = self.acid_moles - self.base_moles;
        let molarity = excess.abs() / litres;

        if molarity <= 0.0 {
            return (NEUTRAL_PH, 0.0);
        }

        let p = -molarity.log10();
        let ph = if excess > 0.0 { p } else { 14.0 - p };
        (ph.clamp(0.0, 14.0), molarity)
    }
}

fn moles_of(chemical: &Chemical, amount_ml: f64) -> f64 {
    chemical.concentration_molar * amount_ml / 1000.0
}

/// Limiting moles among the listed reactants.
fn limiting_moles(mixture: &[ChemicalQuantity], registry: &[Chemical], ids: &[&str]) -> f64 {
    ids.iter()
        .map(|id| {
            mixture
                .iter()
                .filter(|q| q.chemical_id == *id)
                .filter_map(|q| chemicals::find(registry, id).map(|c| moles_of(c, q.amount_ml)))
                .sum::<f64>()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Temperature after the reaction heat is absorbed by the solution.
///
/// Density is taken as 1 g/mL.
pub fn temperature_after(delta_h_kj_mol: f64, moles: f64, total_volume_ml: f64) -> f64 {
    if total_volume_ml <= 0.0 {
        return AMBIENT_TEMPERATURE_C;
    }
    let heat_j = -delta_h_kj_mol * 1000.0 * moles;
    AMBIENT_TEMPERATURE_C + heat_j / (total_volume_ml * SPECIFIC_HEAT_J_PER_G_K)
}

// =============================================================================
// ENGINE
// =============================================================================

/// Stateless evaluator over a rule table.
#[derive(Debug, Clone, Copy)]
pub struct ReactionEngine {
    rules: &'static [ReactionRule],
}

impl Default for ReactionEngine {
    fn default() -> Self {
        Self { rules: REACTION_RULES }
    }
}

impl ReactionEngine {
    pub fn new(rules: &'static [ReactionRule]) -> Self {
        Self { rules }
    }

    /// Returns the first rule that fires for this mixture.
    pub fn matching_rule(&self, mixture: &[ChemicalQuantity], registry: &[Chemical]) -> Option<&'static ReactionRule> {
        let present = mixture::chemical_set(mixture);
        let rules: &'static [ReactionRule] = self.rules;
        rules.iter().find(|rule| match rule.trigger {
            Trigger::AcidAndBase => {
                let has = |pred: fn(&Chemical) -> bool| {
                    present
                        .iter()
                        .filter_map(|id| chemicals::find(registry, id))
                        .any(pred)
                };
                has(Chemical::is_acid) && has(Chemical::is_base)
            }
            Trigger::AllOf(ids) => ids.iter().all(|id| present.contains(id)),
        })
    }

    /// Evaluates a mixture; `None` when no reaction fires.
    pub fn evaluate(&self, mixture: &[ChemicalQuantity], registry: &[Chemical]) -> Option<ReactionResult> {
        let rule = self.matching_rule(mixture, registry)?;
        let balance = AcidBaseBalance::of(mixture, registry);
        let (ph, molarity) = balance.ph_and_molarity();

        let moles = match rule.trigger {
            Trigger::AcidAndBase => balance.reacted_moles(),
            Trigger::AllOf(ids) => limiting_moles(mixture, registry, ids),
        };

        let measurement = Measurement {
            volume_ml: balance.total_volume_ml,
            ph,
            molarity,
            moles,
            temperature_c: temperature_after(
                rule.thermodynamics.delta_h_kj_mol,
                moles,
                balance.total_volume_ml,
            ),
        };

        Some(ReactionResult {
            reaction_type: rule.reaction_type.to_string(),
            equation: rule.equation.to_string(),
            mechanism: rule.mechanism.iter().map(|s| s.to_string()).collect(),
            yield_percent: rule.yield_percent,
            measurement,
            thermodynamics: rule.thermodynamics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemicals::{
        find, ASPIRIN_CHEMICALS, EQUILIBRIUM_CHEMICALS, HCL, NAOH, PHENOLPHTHALEIN, PHOSPHORIC_ACID,
        TITRATION_CHEMICALS,
    };
    use approx::assert_relative_eq;

    fn drop_of(registry: &[Chemical], id: &str, amount_ml: f64) -> ChemicalQuantity {
        ChemicalQuantity::new(find(registry, id).unwrap(), amount_ml)
    }

    #[test]
    fn test_no_reaction_without_base() {
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(TITRATION_CHEMICALS, HCL, 25.0),
            drop_of(TITRATION_CHEMICALS, PHENOLPHTHALEIN, 1.0),
        ];
        assert!(engine.evaluate(&mixture, TITRATION_CHEMICALS).is_none());
    }

    #[test]
    fn test_neutralization_at_equivalence() {
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(TITRATION_CHEMICALS, HCL, 25.0),
            drop_of(TITRATION_CHEMICALS, NAOH, 25.0),
        ];
        let result = engine.evaluate(&mixture, TITRATION_CHEMICALS).unwrap();

        assert_eq!(result.reaction_type, "Neutralization");
        assert_eq!(result.equation, "HCl + NaOH → NaCl + H₂O");
        assert_relative_eq!(result.yield_percent, 100.0);
        assert_relative_eq!(result.measurement.ph, 7.0);
        assert_relative_eq!(result.measurement.molarity, 0.0);
        assert_relative_eq!(result.measurement.moles, 0.0025, epsilon = 1e-12);
        assert_relative_eq!(result.measurement.volume_ml, 50.0);
        assert_relative_eq!(result.thermodynamics.delta_h_kj_mol, -57.3);
        assert!(result.measurement.temperature_c > AMBIENT_TEMPERATURE_C);
    }

    #[test]
    fn test_acid_excess_ph() {
        // 0.0025 mol HCl vs 0.0015 mol NaOH in 40 mL -> 0.025 M H+
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(TITRATION_CHEMICALS, HCL, 25.0),
            drop_of(TITRATION_CHEMICALS, NAOH, 15.0),
        ];
        let m = engine.evaluate(&mixture, TITRATION_CHEMICALS).unwrap().measurement;
        assert_relative_eq!(m.molarity, 0.025, epsilon = 1e-12);
        assert_relative_eq!(m.ph, -(0.025f64).log10(), epsilon = 1e-9);
    }

    #[test]
    fn test_base_excess_ph() {
        // 0.001 mol excess OH- in 50 mL -> 0.02 M, pOH 1.699
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(TITRATION_CHEMICALS, HCL, 20.0),
            drop_of(TITRATION_CHEMICALS, NAOH, 30.0),
        ];
        let m = engine.evaluate(&mixture, TITRATION_CHEMICALS).unwrap().measurement;
        assert_relative_eq!(m.ph, 14.0 + (0.02f64).log10(), epsilon = 1e-9);
        assert!(m.ph > 12.0);
    }

    #[test]
    fn test_zero_volume_is_neutral() {
        let balance = AcidBaseBalance::default();
        assert_eq!(balance.ph_and_molarity(), (NEUTRAL_PH, 0.0));

        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(TITRATION_CHEMICALS, HCL, 0.0),
            drop_of(TITRATION_CHEMICALS, NAOH, 0.0),
        ];
        let m = engine.evaluate(&mixture, TITRATION_CHEMICALS).unwrap().measurement;
        assert!(!m.ph.is_nan());
        assert_relative_eq!(m.ph, NEUTRAL_PH);
        assert_relative_eq!(m.molarity, 0.0);
        assert_relative_eq!(m.temperature_c, AMBIENT_TEMPERATURE_C);
    }

    #[test]
    fn test_aspirin_esterification_yield() {
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(ASPIRIN_CHEMICALS, SALICYLIC_ACID, 2.0),
            drop_of(ASPIRIN_CHEMICALS, ACETIC_ANHYDRIDE, 5.0),
            drop_of(ASPIRIN_CHEMICALS, PHOSPHORIC_ACID, 0.5),
        ];
        let result = engine.evaluate(&mixture, ASPIRIN_CHEMICALS).unwrap();
        assert_eq!(result.reaction_type, "Esterification");
        assert_relative_eq!(result.yield_percent, 95.0);
        // salicylic acid is limiting
        assert_relative_eq!(result.measurement.moles, 0.01448, epsilon = 1e-9);
        assert!(result.measurement.ph < 1.0);
    }

    #[test]
    fn test_complex_formation() {
        let engine = ReactionEngine::default();
        let mixture = vec![
            drop_of(EQUILIBRIUM_CHEMICALS, IRON_NITRATE, 10.0),
            drop_of(EQUILIBRIUM_CHEMICALS, POTASSIUM_THIOCYANATE, 5.0),
        ];
        let result = engine.evaluate(&mixture, EQUILIBRIUM_CHEMICALS).unwrap();
        assert_eq!(result.reaction_type, "Complex Formation");
        assert_relative_eq!(result.measurement.moles, 0.0005, epsilon = 1e-12);
        assert_relative_eq!(result.measurement.ph, NEUTRAL_PH);
    }

    #[test]
    fn test_temperature_rise() {
        // 57.3 kJ/mol * 0.0025 mol = 143.25 J into 50 g of water
        let t = temperature_after(-57.3, 0.0025, 50.0);
        assert_relative_eq!(t, 25.0 + 143.25 / (50.0 * 4.184), epsilon = 1e-9);
    }
}
