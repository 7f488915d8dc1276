//! ChemLab Deterministic Simulation Harness
//!
//! This crate drives `chemlab_core` the way a student (or an automated
//! grader) would, but on a virtual clock so every run replays exactly.
//!
//! # Core Principle
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: the virtual clock only moves when a driver sleeps
//! - **Scheduling**: a single-threaded runtime interleaves the titration task
//! - **Input**: scripted clicks come from ChaCha8 streams of one 64-bit seed
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      SimWorld                        │
//! │  ┌──────────────┐        ┌────────────────────────┐  │
//! │  │  SimContext  │◄───────│  TitrationTask (async) │  │
//! │  │ virtual time │        │  frames + drop timer   │  │
//! │  └──────────────┘        └───────────┬────────────┘  │
//! │                                      │               │
//! │                            Arc<Mutex<Lab>>           │
//! │                                      │               │
//! │                        ┌─────────────▼──────────┐    │
//! │                        │   InvariantChecker     │    │
//! │                        └────────────────────────┘    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use chemlab_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::OverTitration);
//! assert!(result.passed);
//! ```

mod context;
mod driver;
mod error;
mod exporter;
mod invariants;
mod runner;
mod world;
pub mod scenarios;

pub use context::SimContext;
pub use driver::{SharedLab, TaskOutcome, TitrationHandle, TitrationTask, MAX_FRAME_RATE_HZ};
pub use error::SimError;
pub use exporter::{SimExport, SimFrame};
pub use invariants::{InvariantChecker, InvariantViolation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimWorld, WorldStats};
