//! ChemLab Core - headless virtual chemistry lab
//!
//! The domain model behind an interactive lab bench:
//! 1. **Registries**: the chemicals and equipment each experiment offers
//! 2. **Mixtures**: what sits in each container and the color it renders as
//! 3. **Reactions**: rule-based outcomes with pH, molarity and temperature
//! 4. **Titration**: a time-driven delivery animation with cumulative state
//! 5. **Steps**: order-independent procedure tracking
//!
//! [`Lab`] ties them together as one state object driven by [`LabEvent`]s.

pub mod chemicals;
pub mod color;
pub mod config;
pub mod equipment;
pub mod error;
pub mod experiment;
pub mod lab;
pub mod mixture;
pub mod notify;
pub mod reaction;
pub mod steps;
pub mod titration;

// Re-export key types for convenience
pub use chemicals::{Chemical, ChemicalRole};
pub use color::{MixedColor, Rgb};
pub use config::LabConfig;
pub use equipment::{Equipment, EquipmentKind};
pub use error::{ConfigError, LabWarning};
pub use experiment::ExperimentKind;
pub use lab::{DispatchOutcome, EquipmentView, Lab, LabEvent, LabSnapshot, ResultEntry, TitrationTicket};
pub use mixture::{ChemicalQuantity, Position, Workbench};
pub use notify::{Notification, NotificationLevel};
pub use reaction::{Measurement, ReactionEngine, ReactionResult};
pub use steps::{StepCursor, StepTracker, StepTrigger};
pub use titration::{CycleRecord, TitrationAnimator, TitrationConfig, TitrationFrame};
