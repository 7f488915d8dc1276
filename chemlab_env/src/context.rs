//! Core environment context trait for ChemLab drivers.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for Environment Interaction.
///
/// This trait abstracts the "real world" clock so that the lab simulation
/// can be driven both in production (tokio) and in deterministic
/// simulation (virtual clock).
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` - virtual clock advanced by sleeps
///
/// # Determinism
///
/// Every timestamp handed to `chemlab_core::Lab` comes from `now()`, so a
/// simulated run replays exactly from its seed.
#[async_trait]
pub trait LabContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Used as the timestamp for titration frames.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    ///
    /// The name is only used for diagnostics.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
