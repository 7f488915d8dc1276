//! ChemLab Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" seam allowing the lab simulation to be
//! driven in both **Production** (tokio) and **Simulation** (virtual clock)
//! environments.
//!
//! # Core Concept
//!
//! `chemlab_core` never reads a clock. Titration frames carry the timestamp
//! of the context that produced them:
//! - Time (`now()`, `sleep()`)
//! - Task spawning (`spawn()`)
//!
//! In simulation the clock only moves when a driver sleeps, so any run is
//! reproducible from its seed.
//!
//! # Example
//!
//! ```ignore
//! use chemlab_env::LabContext;
//!
//! async fn frame_loop<Ctx: LabContext>(ctx: &Ctx, lab: &mut Lab, ticket: TitrationTicket) {
//!     while lab.is_titrating() {
//!         lab.dispatch(LabEvent::TitrationFrame { ticket }, ctx.now());
//!         ctx.sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```

mod context;
mod types;
mod error;
mod tokio_impl;

pub use context::LabContext;
pub use types::RunId;
pub use error::EnvError;
pub use tokio_impl::TokioContext;
