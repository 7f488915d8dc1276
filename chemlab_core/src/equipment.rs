//! Equipment registry.

use serde::Serialize;

/// Whether a piece of equipment can hold chemicals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Container,
    Apparatus,
}

/// A piece of lab equipment as offered on the equipment shelf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equipment {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: EquipmentKind,
    /// Nominal capacity; zero for apparatus
    pub capacity_ml: f64,
}

impl Equipment {
    pub fn is_container(&self) -> bool {
        self.kind == EquipmentKind::Container
    }
}

pub const BURETTE: &str = "burette";
pub const CONICAL_FLASK: &str = "conical_flask";
pub const BEAKER: &str = "beaker";
pub const PIPETTE: &str = "pipette";
pub const TEST_TUBE: &str = "test_tube";
pub const GRADUATED_CYLINDER: &str = "graduated_cylinder";
pub const MAGNETIC_STIRRER: &str = "magnetic_stirrer";
pub const THERMOMETER: &str = "thermometer";
pub const HOT_PLATE: &str = "hot_plate";
pub const BUCHNER_FUNNEL: &str = "buchner_funnel";

const fn container(id: &'static str, name: &'static str, description: &'static str, capacity_ml: f64) -> Equipment {
    Equipment { id, name, description, kind: EquipmentKind::Container, capacity_ml }
}

const fn apparatus(id: &'static str, name: &'static str, description: &'static str) -> Equipment {
    Equipment { id, name, description, kind: EquipmentKind::Apparatus, capacity_ml: 0.0 }
}

const BEAKER_250: Equipment = container(BEAKER, "Beaker", "250 mL glass beaker", 250.0);
const THERMOMETER_EQ: Equipment = apparatus(THERMOMETER, "Thermometer", "Digital thermometer");

pub static TITRATION_EQUIPMENT: &[Equipment] = &[
    container(BURETTE, "Burette", "50 mL graduated burette for titrant delivery", 50.0),
    container(CONICAL_FLASK, "Conical Flask", "250 mL Erlenmeyer flask for the analyte", 250.0),
    BEAKER_250,
    container(PIPETTE, "Pipette", "25 mL volumetric pipette", 25.0),
    apparatus(MAGNETIC_STIRRER, "Magnetic Stirrer", "Keeps the analyte mixed during titration"),
    THERMOMETER_EQ,
];

pub static ASPIRIN_EQUIPMENT: &[Equipment] = &[
    container(CONICAL_FLASK, "Conical Flask", "125 mL Erlenmeyer flask for the reaction", 125.0),
    BEAKER_250,
    container(GRADUATED_CYLINDER, "Graduated Cylinder", "10 mL graduated cylinder", 10.0),
    apparatus(HOT_PLATE, "Hot Plate", "Water bath heater"),
    apparatus(BUCHNER_FUNNEL, "Büchner Funnel", "Vacuum filtration of the crystals"),
    THERMOMETER_EQ,
];

pub static EQUILIBRIUM_EQUIPMENT: &[Equipment] = &[
    container(TEST_TUBE, "Test Tube", "20 mL test tube", 20.0),
    BEAKER_250,
    container(GRADUATED_CYLINDER, "Graduated Cylinder", "25 mL graduated cylinder", 25.0),
    container(PIPETTE, "Pipette", "10 mL graduated pipette", 10.0),
    apparatus(HOT_PLATE, "Hot Plate", "Shifts the equilibrium with heat"),
    THERMOMETER_EQ,
];

/// Finds equipment by id in a registry.
pub fn find<'a>(registry: &'a [Equipment], id: &str) -> Option<&'a Equipment> {
    registry.iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titration_apparatus_present() {
        assert!(find(TITRATION_EQUIPMENT, BURETTE).unwrap().is_container());
        assert!(find(TITRATION_EQUIPMENT, CONICAL_FLASK).unwrap().is_container());
        assert!(!find(TITRATION_EQUIPMENT, MAGNETIC_STIRRER).unwrap().is_container());
    }

    #[test]
    fn test_apparatus_has_no_capacity() {
        for e in TITRATION_EQUIPMENT.iter().chain(ASPIRIN_EQUIPMENT).chain(EQUILIBRIUM_EQUIPMENT) {
            assert_eq!(e.is_container(), e.capacity_ml > 0.0, "{}", e.id);
        }
    }
}
