//! Mixture Model - what sits in each container on the workbench.
//!
//! Every drop appends a [`ChemicalQuantity`]; nothing is merged. The mixed
//! color is resolved against [`MIX_RULES`], a priority-ordered lookup of
//! known reaction colors, before falling back to an amount-weighted
//! average of the chemicals' own colors.

use crate::chemicals::{self, Chemical, HCL, NAOH, PHENOLPHTHALEIN};
use crate::color::{MixedColor, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fill height never exceeds this share of the container.
pub const MAX_FILL_PERCENT: f64 = 85.0;

/// Total volume at which a container reads as full.
pub const FULL_VOLUME_ML: f64 = 100.0;

pub const LIGHT_PINK: Rgb = Rgb::new(0xFF, 0xB6, 0xC1);
pub const MEDIUM_PINK: Rgb = Rgb::new(0xFF, 0x69, 0xB4);
pub const DEEP_PINK: Rgb = Rgb::new(0xFF, 0x14, 0x93);
pub const PALE_GREEN: Rgb = Rgb::new(0x98, 0xFB, 0x98);
pub const LIGHT_BLUE: Rgb = Rgb::new(0xAD, 0xD8, 0xE6);
pub const BLOOD_RED: Rgb = Rgb::new(0x8B, 0x00, 0x00);
pub const BEIGE: Rgb = Rgb::new(0xF5, 0xF5, 0xDC);

// =============================================================================
// DATA
// =============================================================================

/// Workbench coordinates of a placed piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One drop event's worth of a chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalQuantity {
    pub chemical_id: String,
    pub amount_ml: f64,
    pub concentration_label: String,
}

impl ChemicalQuantity {
    pub fn new(chemical: &Chemical, amount_ml: f64) -> Self {
        Self {
            chemical_id: chemical.id.to_string(),
            amount_ml,
            concentration_label: chemical.concentration_label.to_string(),
        }
    }
}

/// A piece of equipment placed on the workbench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInstance {
    pub id: String,
    pub position: Position,
    pub chemicals: Vec<ChemicalQuantity>,
}

impl EquipmentInstance {
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            chemicals: Vec::new(),
        }
    }

    pub fn total_volume_ml(&self) -> f64 {
        total_volume_ml(&self.chemicals)
    }

    pub fn contains(&self, chemical_id: &str) -> bool {
        self.chemicals.iter().any(|q| q.chemical_id == chemical_id)
    }
}

// =============================================================================
// COLOR RULES
// =============================================================================

/// A known chemical combination with a fixed color.
///
/// `color` receives the titration color progress so that the indicator
/// can deepen over time.
pub struct MixRule {
    pub name: &'static str,
    pub requires: &'static [&'static str],
    pub color: fn(f64) -> Rgb,
}

impl MixRule {
    /// True when every required chemical is present.
    pub fn matches(&self, present: &BTreeSet<&str>) -> bool {
        self.requires.iter().all(|id| present.contains(id))
    }
}

/// Indicator color as titrant accumulates.
///
/// Stage 1 covers (0, 1], light pink to medium pink. Stage 2 covers (1, 3]
/// and models over-titration, medium pink to deep pink.
pub fn titration_pink(progress: f64) -> Rgb {
    if progress <= 0.0 {
        LIGHT_PINK
    } else if progress <= 1.0 {
        LIGHT_PINK.lerp(MEDIUM_PINK, progress)
    } else {
        MEDIUM_PINK.lerp(DEEP_PINK, (progress - 1.0) / 2.0)
    }
}

fn pale_green(_: f64) -> Rgb {
    PALE_GREEN
}

fn light_blue(_: f64) -> Rgb {
    LIGHT_BLUE
}

fn blood_red(_: f64) -> Rgb {
    BLOOD_RED
}

fn beige(_: f64) -> Rgb {
    BEIGE
}

/// Priority order: first match wins.
pub static MIX_RULES: &[MixRule] = &[
    MixRule {
        name: "indicator_in_neutralization",
        requires: &[HCL, NAOH, PHENOLPHTHALEIN],
        color: titration_pink,
    },
    MixRule {
        name: "neutralization",
        requires: &[HCL, NAOH],
        color: pale_green,
    },
    MixRule {
        name: "indicator_in_acid",
        requires: &[HCL, PHENOLPHTHALEIN],
        color: light_blue,
    },
    MixRule {
        name: "thiocyanatoiron_complex",
        requires: &[chemicals::IRON_NITRATE, chemicals::POTASSIUM_THIOCYANATE],
        color: blood_red,
    },
    MixRule {
        name: "acetylation",
        requires: &[chemicals::SALICYLIC_ACID, chemicals::ACETIC_ANHYDRIDE],
        color: beige,
    },
];

// =============================================================================
// DERIVED VALUES
// =============================================================================

pub fn total_volume_ml(mixture: &[ChemicalQuantity]) -> f64 {
    mixture.iter().map(|q| q.amount_ml).sum()
}

/// Distinct chemical ids in a mixture.
pub fn chemical_set(mixture: &[ChemicalQuantity]) -> BTreeSet<&str> {
    mixture.iter().map(|q| q.chemical_id.as_str()).collect()
}

/// Resolves the rendered color of a mixture.
///
/// Chemicals missing from `registry` do not contribute to the blend.
pub fn mixed_color(mixture: &[ChemicalQuantity], registry: &[Chemical], color_progress: f64) -> MixedColor {
    let present = chemical_set(mixture);

    match present.len() {
        0 => return MixedColor::Transparent,
        1 => {
            return present
                .iter()
                .next()
                .and_then(|id| chemicals::find(registry, id))
                .map(|c| MixedColor::Solid(c.color))
                .unwrap_or(MixedColor::Transparent);
        }
        _ => {}
    }

    if let Some(rule) = MIX_RULES.iter().find(|r| r.matches(&present)) {
        return MixedColor::Solid((rule.color)(color_progress));
    }

    let samples = mixture
        .iter()
        .filter_map(|q| chemicals::find(registry, &q.chemical_id).map(|c| (c.color, q.amount_ml)));

    Rgb::weighted_average(samples)
        .map(MixedColor::Blended)
        .unwrap_or(MixedColor::Transparent)
}

/// Solution fill height as a percentage of the container.
pub fn solution_height_percent(total_volume_ml: f64) -> f64 {
    (total_volume_ml.max(0.0) / FULL_VOLUME_ML * MAX_FILL_PERCENT).min(MAX_FILL_PERCENT)
}

// =============================================================================
// WORKBENCH
// =============================================================================

/// The placed equipment instances, in placement order.
///
/// At most one instance exists per equipment id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbench {
    instances: Vec<EquipmentInstance>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places equipment, or moves it if it is already on the bench.
    ///
    /// Returns true when a new instance was created.
    pub fn place(&mut self, id: &str, position: Position) -> bool {
        match self.get_mut(id) {
            Some(instance) => {
                instance.position = position;
                false
            }
            None => {
                self.instances.push(EquipmentInstance::new(id, position));
                true
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<EquipmentInstance> {
        let idx = self.instances.iter().position(|i| i.id == id)?;
        Some(self.instances.remove(idx))
    }

    /// Appends a quantity to an existing instance.
    ///
    /// Returns false (no-op) if the equipment is not on the bench.
    pub fn add_chemical(&mut self, equipment_id: &str, chemical: &Chemical, amount_ml: f64) -> bool {
        match self.get_mut(equipment_id) {
            Some(instance) => {
                instance.chemicals.push(ChemicalQuantity::new(chemical, amount_ml));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&EquipmentInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EquipmentInstance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn instances(&self) -> &[EquipmentInstance] {
        &self.instances
    }

    pub fn mixed_color(&self, equipment_id: &str, registry: &[Chemical], color_progress: f64) -> MixedColor {
        self.get(equipment_id)
            .map(|i| mixed_color(&i.chemicals, registry, color_progress))
            .unwrap_or(MixedColor::Transparent)
    }

    pub fn solution_height_percent(&self, equipment_id: &str) -> f64 {
        self.get(equipment_id)
            .map(|i| solution_height_percent(i.total_volume_ml()))
            .unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
