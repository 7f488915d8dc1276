//! Chemical registry.
//!
//! Static, immutable tables of the reagents available in each experiment.
//! Amounts throughout the lab are expressed in millilitres; solids are
//! treated as their dissolved volume.

use crate::color::Rgb;
use serde::Serialize;

/// Chemical behaviour relevant to the reaction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalRole {
    Acid,
    Base,
    Indicator,
    Solvent,
    Reagent,
    Catalyst,
}

/// A chemical as offered on the lab shelf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chemical {
    pub id: &'static str,
    pub name: &'static str,
    pub formula: &'static str,
    pub color: Rgb,
    /// Human-readable concentration, e.g. `"0.1 M"`
    pub concentration_label: &'static str,
    /// Molar concentration used for arithmetic (mol/L)
    pub concentration_molar: f64,
    pub default_volume_ml: f64,
    pub role: ChemicalRole,
}

impl Chemical {
    pub fn is_acid(&self) -> bool {
        self.role == ChemicalRole::Acid
    }

    pub fn is_base(&self) -> bool {
        self.role == ChemicalRole::Base
    }
}

// =============================================================================
// IDS
// =============================================================================

pub const HCL: &str = "hcl";
pub const NAOH: &str = "naoh";
pub const PHENOLPHTHALEIN: &str = "phenolphthalein";
pub const DISTILLED_WATER: &str = "distilled_water";
pub const SALICYLIC_ACID: &str = "salicylic_acid";
pub const ACETIC_ANHYDRIDE: &str = "acetic_anhydride";
pub const PHOSPHORIC_ACID: &str = "phosphoric_acid";
pub const IRON_NITRATE: &str = "iron_nitrate";
pub const POTASSIUM_THIOCYANATE: &str = "potassium_thiocyanate";

// =============================================================================
// TABLES
// =============================================================================

const WATER: Chemical = Chemical {
    id: DISTILLED_WATER,
    name: "Distilled Water",
    formula: "H₂O",
    color: Rgb::new(0xE0, 0xF7, 0xFF),
    concentration_label: "Pure",
    concentration_molar: 0.0,
    default_volume_ml: 50.0,
    role: ChemicalRole::Solvent,
};

pub static TITRATION_CHEMICALS: &[Chemical] = &[
    Chemical {
        id: HCL,
        name: "Hydrochloric Acid",
        formula: "HCl",
        color: Rgb::new(0xFF, 0xF8, 0xDC),
        concentration_label: "0.1 M",
        concentration_molar: 0.1,
        default_volume_ml: 25.0,
        role: ChemicalRole::Acid,
    },
    Chemical {
        id: NAOH,
        name: "Sodium Hydroxide",
        formula: "NaOH",
        color: Rgb::new(0xF0, 0xF8, 0xFF),
        concentration_label: "0.1 M",
        concentration_molar: 0.1,
        default_volume_ml: 50.0,
        role: ChemicalRole::Base,
    },
    Chemical {
        id: PHENOLPHTHALEIN,
        name: "Phenolphthalein",
        formula: "C₂₀H₁₄O₄",
        color: Rgb::new(0xFF, 0xFF, 0xFF),
        concentration_label: "1% w/v",
        concentration_molar: 0.0,
        default_volume_ml: 1.0,
        role: ChemicalRole::Indicator,
    },
    WATER,
];

pub static ASPIRIN_CHEMICALS: &[Chemical] = &[
    Chemical {
        id: SALICYLIC_ACID,
        name: "Salicylic Acid",
        formula: "C₇H₆O₃",
        color: Rgb::new(0xFA, 0xFA, 0xF0),
        concentration_label: "2.0 g",
        // 2.0 g (0.0145 mol) per 2.0 mL of dissolved volume
        concentration_molar: 7.24,
        default_volume_ml: 2.0,
        role: ChemicalRole::Reagent,
    },
    Chemical {
        id: ACETIC_ANHYDRIDE,
        name: "Acetic Anhydride",
        formula: "(CH₃CO)₂O",
        color: Rgb::new(0xF5, 0xF5, 0xF5),
        concentration_label: "99%",
        concentration_molar: 10.6,
        default_volume_ml: 5.0,
        role: ChemicalRole::Reagent,
    },
    Chemical {
        id: PHOSPHORIC_ACID,
        name: "Phosphoric Acid",
        formula: "H₃PO₄",
        color: Rgb::new(0xFF, 0xFF, 0xE0),
        concentration_label: "85%",
        concentration_molar: 14.7,
        default_volume_ml: 0.5,
        role: ChemicalRole::Acid,
    },
    WATER,
];

pub static EQUILIBRIUM_CHEMICALS: &[Chemical] = &[
    Chemical {
        id: IRON_NITRATE,
        name: "Iron(III) Nitrate",
        formula: "Fe(NO₃)₃",
        color: Rgb::new(0xE8, 0xA3, 0x3D),
        concentration_label: "0.1 M",
        concentration_molar: 0.1,
        default_volume_ml: 10.0,
        role: ChemicalRole::Reagent,
    },
    Chemical {
        id: POTASSIUM_THIOCYANATE,
        name: "Potassium Thiocyanate",
        formula: "KSCN",
        color: Rgb::new(0xF8, 0xF8, 0xFF),
        concentration_label: "0.1 M",
        concentration_molar: 0.1,
        default_volume_ml: 10.0,
        role: ChemicalRole::Reagent,
    },
    WATER,
];

/// Finds a chemical by id in a registry.
pub fn find<'a>(registry: &'a [Chemical], id: &str) -> Option<&'a Chemical> {
    registry.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_ids_are_unique() {
        for registry in [TITRATION_CHEMICALS, ASPIRIN_CHEMICALS, EQUILIBRIUM_CHEMICALS] {
            let ids: HashSet<_> = registry.iter().map(|c| c.id).collect();
            assert_eq!(ids.len(), registry.len());
        }
    }

    #[test]
    fn test_find_titration_reagents() {
        let hcl = find(TITRATION_CHEMICALS, HCL).unwrap();
        assert!(hcl.is_acid());
        assert_eq!(hcl.concentration_label, "0.1 M");

        let naoh = find(TITRATION_CHEMICALS, NAOH).unwrap();
        assert!(naoh.is_base());
        assert!(find(TITRATION_CHEMICALS, IRON_NITRATE).is_none());
    }
}
